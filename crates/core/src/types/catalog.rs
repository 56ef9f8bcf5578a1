//! Products and inventory items.
//!
//! The backend keeps two collections with the same document shape: the
//! customer-facing products and the back-room inventory. [`CatalogItem`] is
//! generic over the id type so the two cannot be mixed up.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{InventoryId, ProductId};

/// Categories offered by the add/edit forms.
pub const CATEGORIES: [&str; 8] = [
    "Clothing",
    "Shoes",
    "Accessories",
    "Gadgets & Phones",
    "Bags",
    "Toys",
    "Dining",
    "Outdoors",
];

/// Sizes offered by the add/edit forms.
pub const SIZES: [&str; 5] = ["XS", "S", "M", "L", "XL"];

/// Stock statuses offered by the add/edit forms.
pub const STOCK_STATUSES: [&str; 3] = ["Available", "Low Stock", "Out of Stock"];

/// Status given to new items when the form leaves it blank.
pub const DEFAULT_STOCK_STATUS: &str = "Available";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem<I> {
    #[serde(rename = "_id")]
    pub id: I,
    #[serde(default)]
    pub ar_ref: String,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A customer-facing product.
pub type Product = CatalogItem<ProductId>;

/// A back-room inventory record.
pub type InventoryItem = CatalogItem<InventoryId>;

impl<I> CatalogItem<I> {
    /// Name to show: `itemName`, then `title`, then a placeholder.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if !self.item_name.trim().is_empty() {
            return &self.item_name;
        }
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => "Untitled item",
        }
    }

    /// First image URL, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images
            .first()
            .map(String::as_str)
            .or(self.image.as_deref())
    }

    #[must_use]
    pub fn status_label(&self) -> &str {
        self.status.as_deref().unwrap_or(DEFAULT_STOCK_STATUS)
    }

    /// Most recent change, for the dashboard's update feed.
    #[must_use]
    pub fn last_touched(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }
}

/// Validated create/update payload for a product or inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItemInput {
    pub ar_ref: String,
    pub item_name: String,
    pub category: String,
    pub size: String,
    pub price: Decimal,
    pub quantity: i64,
    pub description: String,
    pub status: String,
}

/// Why an add/edit form was rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogFormError {
    #[error("Please fill out the item name, category and price.")]
    MissingRequired,
    #[error("Price must be a non-negative number.")]
    InvalidPrice,
    #[error("Quantity must be a whole number of zero or more.")]
    InvalidQuantity,
}

/// Raw add/edit form fields as submitted by the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogForm {
    #[serde(default)]
    pub ar_ref: String,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
}

impl CatalogForm {
    /// Check required fields and parse numbers.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogFormError`] when item name, category or price is
    /// blank, or a number does not parse.
    pub fn into_input(self) -> Result<CatalogItemInput, CatalogFormError> {
        let item_name = self.item_name.trim().to_owned();
        let category = self.category.trim().to_owned();
        let price = self.price.trim();
        if item_name.is_empty() || category.is_empty() || price.is_empty() {
            return Err(CatalogFormError::MissingRequired);
        }

        let price: Decimal = price.parse().map_err(|_| CatalogFormError::InvalidPrice)?;
        if price.is_sign_negative() {
            return Err(CatalogFormError::InvalidPrice);
        }

        let quantity = match self.quantity.trim() {
            "" => 0,
            raw => raw
                .parse::<i64>()
                .ok()
                .filter(|q| *q >= 0)
                .ok_or(CatalogFormError::InvalidQuantity)?,
        };

        let status = match self.status.trim() {
            "" => DEFAULT_STOCK_STATUS.to_owned(),
            s => s.to_owned(),
        };

        Ok(CatalogItemInput {
            ar_ref: self.ar_ref.trim().to_owned(),
            item_name,
            category,
            size: self.size.trim().to_owned(),
            price,
            quantity,
            description: self.description.trim().to_owned(),
            status,
        })
    }
}

impl<I> From<&CatalogItem<I>> for CatalogForm {
    fn from(item: &CatalogItem<I>) -> Self {
        Self {
            ar_ref: item.ar_ref.clone(),
            item_name: item.item_name.clone(),
            category: item.category.clone(),
            size: item.size.clone(),
            price: item.price.to_string(),
            quantity: item.quantity.to_string(),
            description: item.description.clone(),
            status: item.status_label().to_owned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_document() {
        let product: Product = serde_json::from_str(
            r#"{"_id":"65f1","arRef":"AR-001","itemName":"Rain boots","category":"Shoes",
                "size":"M","price":250,"quantity":3,"images":["/u/1.jpg"],"isArchived":false,
                "createdAt":"2024-05-01T08:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(product.id.as_str(), "65f1");
        assert_eq!(product.display_name(), "Rain boots");
        assert_eq!(product.primary_image(), Some("/u/1.jpg"));
        assert_eq!(product.status_label(), "Available");
        assert!(product.last_touched().is_some());
    }

    #[test]
    fn test_display_name_falls_back_to_title() {
        let item: InventoryItem =
            serde_json::from_str(r#"{"_id":"i1","title":"Lamp"}"#).unwrap();
        assert_eq!(item.display_name(), "Lamp");
        let bare: InventoryItem = serde_json::from_str(r#"{"_id":"i2"}"#).unwrap();
        assert_eq!(bare.display_name(), "Untitled item");
    }

    #[test]
    fn test_form_requires_name_category_price() {
        let form = CatalogForm {
            item_name: "Tote".to_owned(),
            category: "Bags".to_owned(),
            ..CatalogForm::default()
        };
        assert_eq!(form.into_input(), Err(CatalogFormError::MissingRequired));
    }

    #[test]
    fn test_form_defaults_status_and_quantity() {
        let form = CatalogForm {
            item_name: " Tote ".to_owned(),
            category: "Bags".to_owned(),
            price: "120.50".to_owned(),
            ..CatalogForm::default()
        };
        let input = form.into_input().unwrap();
        assert_eq!(input.item_name, "Tote");
        assert_eq!(input.status, "Available");
        assert_eq!(input.quantity, 0);
        assert_eq!(input.price, Decimal::new(12_050, 2));
    }

    #[test]
    fn test_form_rejects_bad_numbers() {
        let base = CatalogForm {
            item_name: "Tote".to_owned(),
            category: "Bags".to_owned(),
            price: "abc".to_owned(),
            ..CatalogForm::default()
        };
        assert_eq!(
            base.clone().into_input(),
            Err(CatalogFormError::InvalidPrice)
        );
        let negative_qty = CatalogForm {
            price: "10".to_owned(),
            quantity: "-2".to_owned(),
            ..base
        };
        assert_eq!(
            negative_qty.into_input(),
            Err(CatalogFormError::InvalidQuantity)
        );
    }
}
