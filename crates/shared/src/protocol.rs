use serde::{Deserialize, Serialize};

use crate::domain::{Cart, ProductId};

pub const CARTS_PATH: &str = "carts";

/// `GET /carts` response. The server may answer with a `null` cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetCartResponse {
    #[serde(default)]
    pub cart: Option<Cart>,
}

/// `DELETE /carts` body. The line to drop is selected by the body, not the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveCartLineRequest {
    pub product: ProductId,
}
