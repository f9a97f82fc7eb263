//! Backend commands queued from UI to backend worker.

use shared::domain::ProductId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    LoadCart,
    RemoveLine { product_id: ProductId },
    FetchThumbnail { product_id: ProductId, url: String },
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadCart => "load_cart",
            Self::RemoveLine { .. } => "remove_line",
            Self::FetchThumbnail { .. } => "fetch_thumbnail",
            Self::Shutdown => "shutdown",
        }
    }
}
