use std::{sync::Arc, time::Duration};

use anyhow::{bail, Result};
use clap::Parser;
use client_core::{
    cart_view::{
        CHECKOUT_LABEL, EMPTY_BODY, EMPTY_TITLE, LOADING_CAPTION, START_SHOPPING_LABEL,
        TABLE_HEADERS,
    },
    pricing::{format_line_total, format_quantity, format_unit_price, DEFAULT_CURRENCY_SYMBOL},
    CartRow, CartSnapshot, CartView, HttpCartApi, HttpCartApiConfig, NoticeLevel,
    RecordingNotifier, Route,
};
use futures::future::join_all;
use shared::domain::ProductId;
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Style},
};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
#[command(about = "Show the storefront cart and optionally remove lines from it")]
struct Args {
    #[arg(long, env = "CART_VIEW__API_URL")]
    api_url: Url,
    /// Used to print absolute product and checkout links.
    #[arg(long, env = "CART_VIEW__STOREFRONT_URL")]
    storefront_url: Option<Url>,
    #[arg(long, env = "CART_VIEW__AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,
    #[arg(long, env = "CART_VIEW__CURRENCY_SYMBOL", default_value = DEFAULT_CURRENCY_SYMBOL)]
    currency_symbol: String,
    #[arg(long, env = "CART_VIEW__REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: Option<u64>,
    /// Product id to remove. Repeat to remove several lines at once.
    #[arg(long = "remove", value_name = "PRODUCT_ID")]
    remove: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut config = HttpCartApiConfig::new(args.api_url.clone());
    config.auth_token = args.auth_token.clone();
    config.request_timeout = args.request_timeout_secs.map(Duration::from_secs);
    let api = Arc::new(HttpCartApi::new(config)?);
    let notifier = Arc::new(RecordingNotifier::default());
    let view = CartView::new(api, notifier.clone());

    view.mount().await;

    let removals: Vec<ProductId> = args.remove.iter().map(|id| ProductId::new(id.trim())).collect();
    let outcomes = join_all(removals.iter().map(|id| view.remove(id))).await;
    for (product_id, outcome) in removals.iter().zip(&outcomes) {
        tracing::debug!(product_id = %product_id, ?outcome, "remove settled");
    }
    view.unmount();

    for notice in notifier.notices() {
        match notice.level {
            NoticeLevel::Success => eprintln!("ok: {}", notice.message),
            NoticeLevel::Error => eprintln!("error: {}", notice.message),
        }
    }

    let snapshot = view.snapshot().await;
    println!(
        "{}",
        render_text(&snapshot, &args.currency_symbol, args.storefront_url.as_ref())
    );

    let failures = notifier.count(NoticeLevel::Error);
    if failures > 0 {
        bail!("{failures} cart request(s) failed");
    }
    Ok(())
}

fn route_link(route: &Route, storefront: Option<&Url>) -> String {
    storefront
        .and_then(|base| route.resolve(base).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| route.path())
}

fn render_text(snapshot: &CartSnapshot, symbol: &str, storefront: Option<&Url>) -> String {
    match snapshot {
        CartSnapshot::Loading => LOADING_CAPTION.to_string(),
        CartSnapshot::Empty => format!(
            "{EMPTY_TITLE}\n{EMPTY_BODY}\n{START_SHOPPING_LABEL}: {}",
            route_link(&CartSnapshot::browse_route(), storefront)
        ),
        CartSnapshot::Populated(rows) => format!(
            "{}\n{CHECKOUT_LABEL}: {}",
            render_table(rows, symbol, storefront),
            route_link(&CartSnapshot::checkout_route(), storefront)
        ),
    }
}

fn render_table(rows: &[CartRow], symbol: &str, storefront: Option<&Url>) -> String {
    let mut builder = Builder::default();
    builder.push_record(TABLE_HEADERS);
    for row in rows {
        builder.push_record([
            row.thumbnail.clone(),
            format!("{}\n{}", row.name, route_link(&row.detail_route, storefront)),
            format_unit_price(symbol, row.unit_price),
            format_quantity(row.quantity, &row.unit),
            format_line_total(symbol, row.line_total),
            format!("--remove {}", row.product_id),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Columns::new(2..5), Alignment::right());
    table.to_string()
}
