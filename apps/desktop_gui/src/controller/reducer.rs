//! Screen state for the cart window and the transitions driven by backend events.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use client_core::CartSnapshot;
use shared::domain::ProductId;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::events::UiEvent,
    ui::{thumbnail::PreviewImage, toasts::ToastQueue},
};

pub enum ThumbnailState {
    Loading,
    Ready(PreviewImage),
    Failed,
}

pub struct CartScreen {
    pub snapshot: CartSnapshot,
    pub thumbnails: HashMap<ProductId, ThumbnailState>,
    pub toasts: ToastQueue,
    pub status: String,
    pub banner: Option<String>,
}

impl CartScreen {
    pub fn new(toast_duration: Duration) -> Self {
        Self {
            snapshot: CartSnapshot::Loading,
            thumbnails: HashMap::new(),
            toasts: ToastQueue::new(toast_duration),
            status: String::new(),
            banner: None,
        }
    }

    /// Applies one backend event and returns the follow-up commands it calls for.
    pub fn apply(&mut self, event: UiEvent, now: Instant) -> Vec<BackendCommand> {
        match event {
            UiEvent::CartChanged(snapshot) => {
                self.snapshot = snapshot;
                return self.sync_thumbnails();
            }
            UiEvent::Notice(notice) => self.toasts.push(notice, now),
            UiEvent::ThumbnailLoaded { product_id, image } => {
                if let Some(state) = self.thumbnails.get_mut(&product_id) {
                    *state = ThumbnailState::Ready(image);
                }
            }
            UiEvent::ThumbnailFailed { product_id, reason } => {
                tracing::warn!(product_id = %product_id, "thumbnail unavailable: {reason}");
                if let Some(state) = self.thumbnails.get_mut(&product_id) {
                    *state = ThumbnailState::Failed;
                }
            }
            UiEvent::Error(err) => {
                tracing::error!(context = ?err.context(), "{}", err.message());
                self.banner = Some(err.banner_text());
            }
        }
        Vec::new()
    }

    /// Remove command for a row, unless its previous remove is still in flight.
    pub fn request_remove(&self, product_id: &ProductId) -> Option<BackendCommand> {
        let row = self
            .snapshot
            .rows()
            .iter()
            .find(|row| &row.product_id == product_id)?;
        if row.removing {
            return None;
        }
        Some(BackendCommand::RemoveLine {
            product_id: product_id.clone(),
        })
    }

    fn sync_thumbnails(&mut self) -> Vec<BackendCommand> {
        let rows = self.snapshot.rows();
        self.thumbnails
            .retain(|product_id, _| rows.iter().any(|row| &row.product_id == product_id));

        let mut commands = Vec::new();
        for row in rows {
            if row.thumbnail.trim().is_empty() || self.thumbnails.contains_key(&row.product_id) {
                continue;
            }
            self.thumbnails
                .insert(row.product_id.clone(), ThumbnailState::Loading);
            commands.push(BackendCommand::FetchThumbnail {
                product_id: row.product_id.clone(),
                url: row.thumbnail.clone(),
            });
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::events::{UiError, UiErrorContext};
    use client_core::{pricing::line_total, CartRow, Notice, Route};
    use rust_decimal::Decimal;

    fn row(id: &str, removing: bool) -> CartRow {
        let price = Decimal::new(250, 2);
        let quantity = Decimal::from(2);
        CartRow {
            product_id: ProductId::from(id),
            name: format!("Product {id}"),
            thumbnail: format!("https://cdn.shop.test/{id}.jpg"),
            detail_route: Route::product(format!("product-{id}")),
            unit_price: price,
            quantity,
            unit: "kg".to_string(),
            line_total: line_total(price, quantity),
            removing,
        }
    }

    fn screen() -> CartScreen {
        CartScreen::new(Duration::from_secs(5))
    }

    #[test]
    fn new_rows_request_their_thumbnails_once() {
        let mut screen = screen();
        let now = Instant::now();
        let populated = CartSnapshot::Populated(vec![row("p", false), row("q", false)]);

        let commands = screen.apply(UiEvent::CartChanged(populated.clone()), now);
        assert_eq!(
            commands,
            vec![
                BackendCommand::FetchThumbnail {
                    product_id: ProductId::from("p"),
                    url: "https://cdn.shop.test/p.jpg".to_string(),
                },
                BackendCommand::FetchThumbnail {
                    product_id: ProductId::from("q"),
                    url: "https://cdn.shop.test/q.jpg".to_string(),
                },
            ]
        );

        assert!(screen.apply(UiEvent::CartChanged(populated), now).is_empty());
    }

    #[test]
    fn removed_rows_drop_their_thumbnails() {
        let mut screen = screen();
        let now = Instant::now();
        screen.apply(
            UiEvent::CartChanged(CartSnapshot::Populated(vec![row("p", false), row("q", false)])),
            now,
        );
        screen.apply(
            UiEvent::ThumbnailFailed {
                product_id: ProductId::from("p"),
                reason: "404".to_string(),
            },
            now,
        );

        screen.apply(
            UiEvent::CartChanged(CartSnapshot::Populated(vec![row("q", false)])),
            now,
        );

        assert!(!screen.thumbnails.contains_key(&ProductId::from("p")));
        assert!(matches!(
            screen.thumbnails.get(&ProductId::from("q")),
            Some(ThumbnailState::Loading)
        ));
    }

    #[test]
    fn notices_become_toasts_and_errors_raise_the_banner() {
        let mut screen = screen();
        let now = Instant::now();

        screen.apply(UiEvent::Notice(Notice::error("Network Error")), now);
        screen.apply(
            UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                "failed to build runtime",
            )),
            now,
        );

        assert_eq!(screen.toasts.len(), 1);
        assert_eq!(
            screen.banner.as_deref(),
            Some("Backend worker startup failure: failed to build runtime")
        );
    }

    #[test]
    fn rows_with_a_pending_remove_cannot_be_removed_again() {
        let mut screen = screen();
        screen.apply(
            UiEvent::CartChanged(CartSnapshot::Populated(vec![row("p", true), row("q", false)])),
            Instant::now(),
        );

        assert_eq!(screen.request_remove(&ProductId::from("p")), None);
        assert_eq!(
            screen.request_remove(&ProductId::from("q")),
            Some(BackendCommand::RemoveLine {
                product_id: ProductId::from("q")
            })
        );
        assert_eq!(screen.request_remove(&ProductId::from("gone")), None);
    }
}
