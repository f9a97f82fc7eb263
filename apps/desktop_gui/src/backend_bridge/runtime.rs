//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread, time::Duration};

use anyhow::{bail, Context, Result};
use client_core::{CartSnapshot, CartView, HttpCartApi, HttpCartApiConfig};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use shared::domain::ProductId;
use tokio::sync::watch;

use crate::{
    backend_bridge::{commands::BackendCommand, notifier::ChannelNotifier},
    controller::events::{UiError, UiErrorContext, UiEvent},
    ui::thumbnail::decode_thumbnail,
};

/// Upper bound on a downloaded thumbnail body.
const MAX_THUMBNAIL_BYTES: usize = 4 * 1024 * 1024;
const SNAPSHOT_RETRY_DELAY: Duration = Duration::from_millis(20);

pub fn launch(
    config: HttpCartApiConfig,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                report_startup_failure(&ui_tx, format!("failed to build runtime: {err}"));
                return;
            }
        };

        runtime.block_on(run_backend(config, cmd_rx, ui_tx));
    })
}

fn report_startup_failure(ui_tx: &Sender<UiEvent>, message: String) {
    tracing::error!("backend worker startup failure: {message}");
    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
        UiErrorContext::BackendStartup,
        message,
    )));
}

async fn run_backend(
    config: HttpCartApiConfig,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    let thumbnails = match thumbnail_client(&config) {
        Ok(client) => client,
        Err(err) => {
            report_startup_failure(&ui_tx, format!("{err:#}"));
            return;
        }
    };
    let api = match HttpCartApi::new(config) {
        Ok(api) => api,
        Err(err) => {
            report_startup_failure(&ui_tx, format!("{err:#}"));
            return;
        }
    };
    tracing::info!(url = %api.carts_url(), "cart backend ready");

    let view = CartView::new(
        Arc::new(api),
        Arc::new(ChannelNotifier::new(ui_tx.clone())),
    );
    let forwarder = tokio::spawn(forward_snapshots(view.subscribe(), ui_tx.clone()));

    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            BackendCommand::LoadCart => {
                let view = Arc::clone(&view);
                tokio::spawn(async move {
                    view.mount().await;
                });
            }
            BackendCommand::RemoveLine { product_id } => {
                let view = Arc::clone(&view);
                tokio::spawn(async move {
                    let outcome = view.remove(&product_id).await;
                    tracing::debug!(product_id = %product_id, ?outcome, "remove settled");
                });
            }
            BackendCommand::FetchThumbnail { product_id, url } => {
                tokio::spawn(fetch_thumbnail(
                    thumbnails.clone(),
                    product_id,
                    url,
                    ui_tx.clone(),
                ));
            }
            BackendCommand::Shutdown => break,
        }
    }

    view.unmount();
    forwarder.abort();
    tracing::info!("cart backend stopped");
}

fn thumbnail_client(config: &HttpCartApiConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().context("failed to build thumbnail http client")
}

/// Forwards every settled snapshot. A full UI queue is retried with the newest value so the
/// last state always reaches the window.
async fn forward_snapshots(mut updates: watch::Receiver<CartSnapshot>, ui_tx: Sender<UiEvent>) {
    while updates.changed().await.is_ok() {
        let mut snapshot = updates.borrow_and_update().clone();
        loop {
            match ui_tx.try_send(UiEvent::CartChanged(snapshot)) {
                Ok(()) => break,
                Err(TrySendError::Disconnected(_)) => return,
                Err(TrySendError::Full(UiEvent::CartChanged(pending))) => {
                    tracing::debug!("ui queue full; retrying cart snapshot");
                    tokio::time::sleep(SNAPSHOT_RETRY_DELAY).await;
                    snapshot = match updates.has_changed() {
                        Ok(true) => updates.borrow_and_update().clone(),
                        _ => pending,
                    };
                }
                Err(TrySendError::Full(_)) => break,
            }
        }
    }
}

async fn fetch_thumbnail(
    http: reqwest::Client,
    product_id: ProductId,
    url: String,
    ui_tx: Sender<UiEvent>,
) {
    let downloaded = download(&http, &url, MAX_THUMBNAIL_BYTES).await;
    let event = match downloaded.and_then(|bytes| decode_thumbnail(&bytes)) {
        Ok(image) => UiEvent::ThumbnailLoaded { product_id, image },
        Err(err) => UiEvent::ThumbnailFailed {
            product_id,
            reason: format!("{err:#}"),
        },
    };
    let _ = ui_tx.try_send(event);
}

async fn download(http: &reqwest::Client, url: &str, limit: usize) -> Result<Vec<u8>> {
    let mut response = http
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed to request thumbnail {url}"))?
        .error_for_status()?;
    if let Some(length) = response.content_length() {
        if length > limit as u64 {
            bail!("thumbnail {url} is {length} bytes, over the {limit} byte limit");
        }
    }

    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if bytes.len() + chunk.len() > limit {
            bail!("thumbnail {url} exceeds the {limit} byte limit");
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use client_core::Notice;
    use crossbeam_channel::bounded;
    use tokio::net::TcpListener;

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn thumbnail_downloads_stop_at_the_byte_limit() {
        let base = serve(
            Router::new()
                .route("/small.png", get(|| async { vec![7u8; 16] }))
                .route("/sized.png", get(|| async { vec![7u8; 64] }))
                .route(
                    "/streamed.png",
                    get(|| async {
                        let chunks = (0..8).map(|_| Ok::<_, std::io::Error>(vec![7u8; 16]));
                        Body::from_stream(futures::stream::iter(chunks))
                    }),
                ),
        )
        .await;
        let http = reqwest::Client::new();

        let small = download(&http, &format!("{base}/small.png"), 32)
            .await
            .expect("small thumbnail");
        assert_eq!(small.len(), 16);

        let sized = download(&http, &format!("{base}/sized.png"), 32).await;
        assert!(format!("{:#}", sized.expect_err("declared length")).contains("byte limit"));

        let streamed = download(&http, &format!("{base}/streamed.png"), 32).await;
        assert!(format!("{:#}", streamed.expect_err("streamed body")).contains("byte limit"));
    }

    #[tokio::test]
    async fn snapshots_survive_a_full_ui_queue() {
        let (ui_tx, ui_rx) = bounded(1);
        ui_tx
            .try_send(UiEvent::Notice(Notice::success("queued first")))
            .expect("fill queue");
        let (snapshots, updates) = watch::channel(CartSnapshot::Loading);
        let forwarder = tokio::spawn(forward_snapshots(updates, ui_tx));

        snapshots.send_replace(CartSnapshot::Empty);
        tokio::time::sleep(SNAPSHOT_RETRY_DELAY * 3).await;
        assert!(matches!(ui_rx.try_recv(), Ok(UiEvent::Notice(_))));

        let mut delivered = None;
        for _ in 0..50 {
            if let Ok(UiEvent::CartChanged(snapshot)) = ui_rx.try_recv() {
                delivered = Some(snapshot);
                break;
            }
            tokio::time::sleep(SNAPSHOT_RETRY_DELAY).await;
        }
        assert_eq!(delivered, Some(CartSnapshot::Empty));

        drop(snapshots);
        forwarder.await.expect("forwarder");
    }
}
