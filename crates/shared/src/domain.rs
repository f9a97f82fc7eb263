use std::{collections::HashSet, fmt};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CartContractError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub thumbnail: String,
    pub price: Decimal,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: Decimal,
}

/// The shopper's cart as returned by the storefront. Only `products` is consumed;
/// any other attribute the server sends is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub products: Vec<CartLine>,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.products
            .iter()
            .any(|line| &line.product.id == product_id)
    }

    /// Drops every line for `product_id`. Absent identifiers leave the cart untouched.
    pub fn remove_product(&mut self, product_id: &ProductId) -> usize {
        let before = self.products.len();
        self.products.retain(|line| &line.product.id != product_id);
        before - self.products.len()
    }

    pub fn validate(&self) -> Result<(), CartContractError> {
        let mut seen = HashSet::with_capacity(self.products.len());
        for line in &self.products {
            let id = &line.product.id;
            if !seen.insert(id) {
                return Err(CartContractError::DuplicateProduct(id.clone()));
            }
            if line.quantity <= Decimal::ZERO {
                return Err(CartContractError::NonPositiveQuantity {
                    product_id: id.clone(),
                    quantity: line.quantity,
                });
            }
            if line.product.price < Decimal::ZERO {
                return Err(CartContractError::NegativePrice {
                    product_id: id.clone(),
                    price: line.product.price,
                });
            }
        }
        Ok(())
    }
}
