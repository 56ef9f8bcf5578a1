//! Orders, as placed by the storefront and managed in admin.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::Product;
use super::id::{OrderId, ProductId};
use super::status::{OrderStatus, PaymentStatus, null_as_default};

/// How the buyer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Gcash,
    Cash,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gcash => "gcash",
            Self::Cash => "cash",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Gcash => "GCash",
            Self::Cash => "Cash",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gcash" => Ok(Self::Gcash),
            "cash" => Ok(Self::Cash),
            other => Err(format!("invalid payment method: {other}")),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery to an address, or pickup at a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Delivery,
    Pickup,
}

impl OrderType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delivery => "delivery",
            Self::Pickup => "pickup",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Delivery => "Delivery",
            Self::Pickup => "Pickup",
        }
    }

    /// Flat shipping fee for manual orders: ₱150 delivery, free pickup.
    #[must_use]
    pub fn shipping_fee(self) -> Decimal {
        match self {
            Self::Delivery => Decimal::new(150, 0),
            Self::Pickup => Decimal::ZERO,
        }
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delivery" => Ok(Self::Delivery),
            "pickup" => Ok(Self::Pickup),
            other => Err(format!("invalid order type: {other}")),
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [&self.street, &self.city, &self.state, &self.zip]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// A product as embedded in an order item: populated or a bare id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Populated(ProductSummary),
    Id(ProductId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    #[serde(rename = "_id", default)]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub item_name: Option<String>,
}

impl ProductRef {
    #[must_use]
    pub fn id(&self) -> Option<&ProductId> {
        match self {
            Self::Populated(summary) => summary.id.as_ref(),
            Self::Id(id) => Some(id),
        }
    }

    /// `title`, then `itemName`; bare ids have no name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Populated(summary) => summary
                .title
                .as_deref()
                .or(summary.item_name.as_deref())
                .filter(|name| !name.is_empty()),
            Self::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(rename = "productId", default)]
    pub product: Option<ProductRef>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub qty: Option<u32>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
}

impl OrderItem {
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity.or(self.qty).unwrap_or(1)
    }

    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.price.or(self.unit_price).unwrap_or_default()
    }

    #[must_use]
    pub fn product_name(&self) -> Option<&str> {
        self.product.as_ref().and_then(ProductRef::name)
    }

    #[must_use]
    pub fn product_id(&self) -> Option<&ProductId> {
        self.product.as_ref().and_then(ProductRef::id)
    }
}

/// Voucher issued once an order is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketVoucher {
    pub code: String,
}

/// What an order funds for the scholars, as computed by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Impact {
    #[serde(default)]
    pub meals: u32,
}

/// Recipient block of a delivery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingContact {
    #[serde(default)]
    pub name: Option<String>,
}

/// Name printed on the donation certificate when the order has none.
pub const DEFAULT_DONOR_NAME: &str = "Valued Donor";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub buyer_name: String,
    #[serde(default)]
    pub buyer_email: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub order_type: Option<OrderType>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub ticket_voucher: Option<TicketVoucher>,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
    #[serde(default)]
    pub impact: Option<Impact>,
    #[serde(default)]
    pub shipping_address: Option<ShippingContact>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Product names of every item that has one.
    #[must_use]
    pub fn product_names(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(OrderItem::product_name)
            .collect()
    }

    #[must_use]
    pub fn product_ids(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(OrderItem::product_id)
            .map(ProductId::as_str)
            .collect()
    }

    /// Meals this order provides; zero when the backend sent no impact.
    #[must_use]
    pub fn meals(&self) -> u32 {
        self.impact.map_or(0, |impact| impact.meals)
    }

    /// The shipping recipient's name, or [`DEFAULT_DONOR_NAME`].
    #[must_use]
    pub fn donor_name(&self) -> &str {
        self.shipping_address
            .as_ref()
            .and_then(|contact| contact.name.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_DONOR_NAME)
    }

    /// The backend's subtotal, or the sum of the items when it sent none.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.subtotal.unwrap_or_else(|| {
            self.items
                .iter()
                .map(|item| {
                    item.unit_price()
                        .saturating_mul(Decimal::from(item.quantity()))
                })
                .fold(Decimal::ZERO, Decimal::saturating_add)
        })
    }
}

/// Customer block of a manual order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualCustomer {
    pub first_name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualOrderItem {
    pub product_id: ProductId,
    pub qty: u32,
    pub unit_price: Decimal,
}

/// Body of `POST /api/admin/orders/manual-order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualOrder {
    pub buyer_name: String,
    pub buyer_email: String,
    pub customer: ManualCustomer,
    pub address: Address,
    pub items: Vec<ManualOrderItem>,
    pub subtotal: Decimal,
    pub payment_method: PaymentMethod,
    pub order_type: OrderType,
    pub additional_notes: String,
    pub purchase_method: &'static str,
}

impl ManualOrder {
    #[must_use]
    pub fn shipping_fee(&self) -> Decimal {
        self.order_type.shipping_fee()
    }

    /// `price × qty + shipping`.
    #[must_use]
    pub fn grand_total(&self) -> Decimal {
        self.subtotal.saturating_add(self.shipping_fee())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ManualOrderError {
    #[error("Invalid product selected!")]
    InvalidProduct,
    #[error("Selected product is out of stock.")]
    OutOfStock,
    #[error("Please enter the customer's name.")]
    MissingCustomer,
    #[error("Please choose a payment method.")]
    MissingPaymentMethod,
    #[error("Please choose a shipping method.")]
    MissingShippingMethod,
}

/// Raw `/add-order` form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ManualOrderForm {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub shipping_method: String,
    #[serde(default)]
    pub notes: String,
}

/// Clamp a requested quantity to `[1, stock]`. Unparseable input counts as 1.
#[must_use]
pub fn clamp_quantity(requested: &str, stock: i64) -> u32 {
    let max = u32::try_from(stock.max(1)).unwrap_or(u32::MAX);
    requested.trim().parse::<u32>().unwrap_or(1).clamp(1, max)
}

impl ManualOrderForm {
    /// Build the backend payload against the selected product.
    ///
    /// # Errors
    ///
    /// Returns [`ManualOrderError`] if the product does not match the form,
    /// is out of stock, or a required field is blank.
    pub fn build(&self, product: Option<&Product>) -> Result<ManualOrder, ManualOrderError> {
        let product = product
            .filter(|p| p.id.as_str() == self.product.trim())
            .ok_or(ManualOrderError::InvalidProduct)?;
        if product.quantity < 1 {
            return Err(ManualOrderError::OutOfStock);
        }

        let buyer_name = self.customer_name.trim();
        if buyer_name.is_empty() {
            return Err(ManualOrderError::MissingCustomer);
        }
        let payment_method = self
            .payment_method
            .parse::<PaymentMethod>()
            .map_err(|_| ManualOrderError::MissingPaymentMethod)?;
        let order_type = self
            .shipping_method
            .parse::<OrderType>()
            .map_err(|_| ManualOrderError::MissingShippingMethod)?;

        let qty = clamp_quantity(&self.quantity, product.quantity);

        Ok(ManualOrder {
            buyer_name: buyer_name.to_owned(),
            buyer_email: self.email.trim().to_owned(),
            customer: ManualCustomer {
                first_name: buyer_name.to_owned(),
                phone: self.contact_number.trim().to_owned(),
            },
            address: Address {
                street: self.address.trim().to_owned(),
                city: self.city.trim().to_owned(),
                state: self.province.trim().to_owned(),
                zip: String::new(),
            },
            items: vec![ManualOrderItem {
                product_id: product.id.clone(),
                qty,
                unit_price: product.price,
            }],
            subtotal: product.price.saturating_mul(Decimal::from(qty)),
            payment_method,
            order_type,
            additional_notes: self.notes.trim().to_owned(),
            purchase_method: "online",
        })
    }
}
