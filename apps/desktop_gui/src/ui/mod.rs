//! UI layer for the cart window: app shell, thumbnails, and toasts.

pub mod app;
pub mod thumbnail;
pub mod toasts;

pub use app::CartApp;
