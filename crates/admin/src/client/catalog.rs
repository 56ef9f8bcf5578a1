//! Products, inventory and the analytics counters.
//!
//! Archiving is a soft delete. The backend toggles it with
//! `PUT …/archive?restore=bool`, where `restore=true` *un*archives; callers
//! here only ever say whether the item should end up archived.

use reqwest::Method;
use tracing::instrument;

use segunda_mana_core::{
    Analytics, CatalogItemInput, InventoryId, InventoryItem, Product, ProductId,
};

use super::{Authed, BackendError};

const PRODUCTS: &str = "api/admin/products";
const INVENTORY: &str = "api/admin/inventory";

impl Authed<'_> {
    /// Every product, archived ones included.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, BackendError> {
        self.get_list(PRODUCTS, "products").await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails, including 404.
    #[instrument(skip(self))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, BackendError> {
        self.get_one(&format!("{PRODUCTS}/{id}"), "product").await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the product.
    #[instrument(skip(self, input), fields(item_name = %input.item_name))]
    pub async fn create_product(
        &self,
        input: &CatalogItemInput,
    ) -> Result<Option<String>, BackendError> {
        self.send_json(Method::POST, PRODUCTS, input).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        input: &CatalogItemInput,
    ) -> Result<Option<String>, BackendError> {
        self.send_json(Method::PUT, &format!("{PRODUCTS}/{id}"), input)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn set_product_archived(
        &self,
        id: &ProductId,
        archived: bool,
    ) -> Result<Option<String>, BackendError> {
        self.set_archived(PRODUCTS, id.as_str(), archived).await
    }

    /// Every inventory row, archived ones included.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn inventory(&self) -> Result<Vec<InventoryItem>, BackendError> {
        self.get_list(INVENTORY, "inventory").await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the item.
    #[instrument(skip(self, input), fields(item_name = %input.item_name))]
    pub async fn create_inventory(
        &self,
        input: &CatalogItemInput,
    ) -> Result<Option<String>, BackendError> {
        self.send_json(Method::POST, INVENTORY, input).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, input))]
    pub async fn update_inventory(
        &self,
        id: &InventoryId,
        input: &CatalogItemInput,
    ) -> Result<Option<String>, BackendError> {
        self.send_json(Method::PUT, &format!("{INVENTORY}/{id}"), input)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn set_inventory_archived(
        &self,
        id: &InventoryId,
        archived: bool,
    ) -> Result<Option<String>, BackendError> {
        self.set_archived(INVENTORY, id.as_str(), archived).await
    }

    async fn set_archived(
        &self,
        collection: &str,
        id: &str,
        archived: bool,
    ) -> Result<Option<String>, BackendError> {
        let mut url = self.client.url(&format!("{collection}/{id}/archive"))?;
        url.query_pairs_mut()
            .append_pair("restore", if archived { "false" } else { "true" });
        let response = Self::send(self.request_url(Method::PUT, url)).await?;
        Ok(super::success_message(response).await)
    }

    /// Dashboard counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn analytics(&self) -> Result<Analytics, BackendError> {
        self.get_one("api/admin/analytics", "data").await
    }
}
