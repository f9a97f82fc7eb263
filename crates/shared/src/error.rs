use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ProductId;

/// Error body returned by the storefront API on non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            error: None,
        }
    }

    /// First non-blank message the server supplied, preferring `message` over `error`.
    pub fn into_message(self) -> Option<String> {
        [self.message, self.error]
            .into_iter()
            .flatten()
            .map(|text| text.trim().to_string())
            .find(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CartContractError {
    #[error("product {0} appears more than once in the cart")]
    DuplicateProduct(ProductId),
    #[error("product {product_id} has non-positive quantity {quantity}")]
    NonPositiveQuantity {
        product_id: ProductId,
        quantity: Decimal,
    },
    #[error("product {product_id} has negative price {price}")]
    NegativePrice { product_id: ProductId, price: Decimal },
}
