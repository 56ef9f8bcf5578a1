//! Public catalog and announcement reads.

use serde_json::Value;
use tracing::instrument;

use segunda_mana_core::api::{extract_list, extract_one};
use segunda_mana_core::{Announcement, Product, ProductId};

use super::{BackendClient, BackendError, check, decode};

impl BackendClient {
    /// Every product offered to customers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn customer_products(&self) -> Result<Vec<Product>, BackendError> {
        let response = check(self.get("api/admin/products/customer")?.send().await?).await?;
        let body: Value = decode(response).await?;
        Ok(extract_list(body, "products")?)
    }

    /// One product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, including 404.
    #[instrument(skip(self))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, BackendError> {
        let path = format!("api/admin/products/{id}");
        let response = check(self.get(&path)?.send().await?).await?;
        let body: Value = decode(response).await?;
        Ok(extract_one(body, "product")?)
    }

    /// Up to `limit` randomly chosen products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn random_products(&self, limit: usize) -> Result<Vec<Product>, BackendError> {
        let mut url = self.url("api/admin/products/random")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        let response = check(self.inner.client.get(url).send().await?).await?;
        let body: Value = decode(response).await?;
        Ok(extract_list(body, "products")?)
    }

    /// Announcements published to the landing page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn public_announcements(&self) -> Result<Vec<Announcement>, BackendError> {
        let response = check(self.get("api/admin/announcements/public")?.send().await?).await?;
        let body: Value = decode(response).await?;
        Ok(extract_list(body, "announcements")?)
    }
}
