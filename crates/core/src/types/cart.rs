//! The backend-held shopping cart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// One line of the backend cart.
///
/// The backend has sent both `price`/`quantity` and `unitPrice`/`qty` over
/// time, so both spellings are accepted and read through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<u32>,
    #[serde(default)]
    pub image: Option<String>,
}

impl CartItem {
    /// Unit price; missing counts as zero.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.price.or(self.unit_price).unwrap_or_default()
    }

    /// Quantity in the cart; missing counts as one.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity.or(self.qty).unwrap_or(1)
    }

    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity())
    }
}

/// Body of `GET /api/cart/get` and of every cart mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub cart: Vec<CartItem>,
}

impl CartSnapshot {
    /// `Σ price × quantity` over every line.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.cart.iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Total number of units across lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart.iter().map(CartItem::quantity).sum()
    }
}
