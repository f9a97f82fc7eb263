use std::path::PathBuf;

mod backend_bridge;
mod config;
mod controller;
mod ui;

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::{
    backend_bridge::{commands::BackendCommand, runtime},
    config::{load_settings, Overrides},
    controller::events::UiEvent,
    ui::CartApp,
};

#[derive(Parser, Debug)]
#[command(name = "desktop_gui", about = "Shopping cart window")]
struct Args {
    /// TOML settings file. Defaults to ./cart_view.toml, then the user config dir.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_url: Option<Url>,
    #[arg(long)]
    storefront_url: Option<Url>,
    #[arg(long)]
    log_filter: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = load_settings(
        args.config.as_deref(),
        &Overrides {
            api_url: args.api_url,
            storefront_url: args.storefront_url,
            log_filter: args.log_filter,
        },
    )?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::info!(api_url = %settings.api_url, "starting cart window");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    let backend = runtime::launch(settings.http_config(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Cart")
            .with_inner_size([960.0, 640.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Cart",
        options,
        Box::new(move |_cc| Ok(Box::new(CartApp::new(cmd_tx, ui_rx, &settings)))),
    )
    .map_err(|err| anyhow::anyhow!("failed to run cart window: {err}"))?;

    if backend.join().is_err() {
        tracing::error!("cart backend thread panicked");
    }
    Ok(())
}
