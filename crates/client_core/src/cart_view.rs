//! The cart view: a one-shot loader, a pure renderer over the loaded state, and a
//! per-line delete handler.
//!
//! State is replaced wholesale by the load and pruned by successful removals; nothing
//! else mutates it. Every change is published to [`CartView::subscribe`] receivers as a
//! rendered [`CartSnapshot`].

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use rust_decimal::Decimal;
use shared::domain::{Cart, ProductId};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info};

use crate::{
    error::error_text,
    notifier::{Notice, Notifier},
    pricing::line_total,
    routes::Route,
    CartApi,
};

pub const LOADING_CAPTION: &str = "Loading your cart...";
pub const EMPTY_TITLE: &str = "Your cart is empty";
pub const EMPTY_BODY: &str =
    "You have no items in your cart. Start shopping to add items to your cart.";
pub const START_SHOPPING_LABEL: &str = "Start Shopping";
pub const CHECKOUT_LABEL: &str = "Go to checkout";
pub const REMOVED_MESSAGE: &str = "Product removed from cart";
pub const TABLE_HEADERS: [&str; 6] = ["Image", "Name", "Price", "Quantity", "Total", "Action"];

#[derive(Debug, Clone, PartialEq)]
pub struct CartRow {
    pub product_id: ProductId,
    pub name: String,
    pub thumbnail: String,
    pub detail_route: Route,
    pub unit_price: Decimal,
    pub quantity: Decimal,
    pub unit: String,
    /// `None` when `unit_price × quantity` overflows.
    pub line_total: Option<Decimal>,
    /// A remove request for this line is in flight; its delete control should be disabled.
    pub removing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CartSnapshot {
    Loading,
    Empty,
    Populated(Vec<CartRow>),
}

impl CartSnapshot {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn rows(&self) -> &[CartRow] {
        match self {
            Self::Populated(rows) => rows,
            _ => &[],
        }
    }

    /// Where the empty-cart call to action leads.
    pub fn browse_route() -> Route {
        Route::ProductListing
    }

    pub fn checkout_route() -> Route {
        Route::Checkout
    }
}

#[derive(Debug, Clone)]
pub struct CartViewModel {
    pub loading: bool,
    pub cart: Option<Cart>,
    pub removing: HashSet<ProductId>,
}

impl Default for CartViewModel {
    fn default() -> Self {
        Self {
            loading: true,
            cart: None,
            removing: HashSet::new(),
        }
    }
}

pub fn render(model: &CartViewModel) -> CartSnapshot {
    if model.loading {
        return CartSnapshot::Loading;
    }
    let Some(cart) = model.cart.as_ref().filter(|cart| !cart.is_empty()) else {
        return CartSnapshot::Empty;
    };

    let rows = cart
        .products
        .iter()
        .map(|line| CartRow {
            product_id: line.product.id.clone(),
            name: line.product.name.clone(),
            thumbnail: line.product.thumbnail.clone(),
            detail_route: Route::product(line.product.slug.clone()),
            unit_price: line.product.price,
            quantity: line.quantity,
            unit: line.product.unit.clone(),
            line_total: line_total(line.product.price, line.quantity),
            removing: model.removing.contains(&line.product.id),
        })
        .collect();
    CartSnapshot::Populated(rows)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    Failed(String),
    /// Another remove for the same line has not settled yet; no request was sent.
    AlreadyPending,
    /// The view was unmounted; nothing was applied.
    Inactive,
}

pub struct CartView {
    api: Arc<dyn CartApi>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<CartViewModel>,
    mounted: AtomicBool,
    active: AtomicBool,
    snapshots: watch::Sender<CartSnapshot>,
}

impl CartView {
    pub fn new(api: Arc<dyn CartApi>, notifier: Arc<dyn Notifier>) -> Arc<Self> {
        let (snapshots, _) = watch::channel(CartSnapshot::Loading);
        Arc::new(Self {
            api,
            notifier,
            state: Mutex::new(CartViewModel::default()),
            mounted: AtomicBool::new(false),
            active: AtomicBool::new(true),
            snapshots,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.snapshots.subscribe()
    }

    pub async fn snapshot(&self) -> CartSnapshot {
        render(&*self.state.lock().await)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Loads the cart. Only the first call issues a request; it returns `false` afterwards.
    pub async fn mount(&self) -> bool {
        if self.mounted.swap(true, Ordering::SeqCst) {
            debug!("cart view already mounted; skipping load");
            return false;
        }

        info!("loading cart");
        let result = self.api.fetch_cart().await;

        let mut state = self.state.lock().await;
        if !self.is_active() {
            debug!("cart view unmounted before load settled; discarding result");
            return true;
        }
        let failure = match result {
            Ok(cart) => {
                info!(
                    lines = cart.as_ref().map_or(0, |cart| cart.products.len()),
                    "cart loaded"
                );
                state.cart = cart;
                None
            }
            Err(err) => {
                error!(error = %err, "failed to load cart");
                Some(error_text(&err))
            }
        };
        state.loading = false;
        self.publish(&state);
        drop(state);

        if let Some(message) = failure {
            self.notifier.notify(Notice::error(message));
        }
        true
    }

    pub async fn remove(&self, product_id: &ProductId) -> RemoveOutcome {
        if !self.is_active() {
            return RemoveOutcome::Inactive;
        }

        {
            let mut state = self.state.lock().await;
            if !state.removing.insert(product_id.clone()) {
                debug!(product_id = %product_id, "remove already in flight");
                return RemoveOutcome::AlreadyPending;
            }
            self.publish(&state);
        }

        let result = self.api.remove_line(product_id).await;

        let mut state = self.state.lock().await;
        if !self.is_active() {
            debug!(product_id = %product_id, "cart view unmounted before remove settled");
            return RemoveOutcome::Inactive;
        }
        state.removing.remove(product_id);

        let outcome = match result {
            Ok(()) => {
                let dropped = state
                    .cart
                    .as_mut()
                    .map_or(0, |cart| cart.remove_product(product_id));
                info!(product_id = %product_id, dropped, "removed cart line");
                RemoveOutcome::Removed
            }
            Err(err) => {
                error!(product_id = %product_id, error = %err, "failed to remove cart line");
                RemoveOutcome::Failed(error_text(&err))
            }
        };
        self.publish(&state);
        drop(state);

        match &outcome {
            RemoveOutcome::Removed => self.notifier.notify(Notice::success(REMOVED_MESSAGE)),
            RemoveOutcome::Failed(message) => self.notifier.notify(Notice::error(message.clone())),
            _ => {}
        }
        outcome
    }

    /// Marks the view torn down. Requests still in flight settle without touching state.
    pub fn unmount(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            debug!("cart view unmounted");
        }
    }

    fn publish(&self, state: &CartViewModel) {
        self.snapshots.send_replace(render(state));
    }
}

#[cfg(test)]
#[path = "tests/cart_view_tests.rs"]
mod tests;
