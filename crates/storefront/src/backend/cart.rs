//! Backend cart endpoints: `/api/cart/{get,add,remove,clear}`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use segunda_mana_core::{CartItem, CartSnapshot, ProductId};

use super::{BackendClient, BackendError, CartCookie, check, decode};

/// Body of `POST /api/cart/add`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: ProductId,
    pub quantity: u32,
    pub title: String,
    pub price: Decimal,
    pub image: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoveFromCart<'a> {
    product_id: &'a ProductId,
}

/// Cart replies; a mutation may answer `success: false` with a message.
#[derive(Deserialize)]
struct CartReply {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    cart: Vec<CartItem>,
}

impl CartReply {
    fn into_snapshot(self) -> Result<CartSnapshot, BackendError> {
        if self.success == Some(false) {
            return Err(BackendError::Api {
                status: 200,
                message: self
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Failed to update cart".to_string()),
            });
        }
        Ok(CartSnapshot {
            success: true,
            cart: self.cart,
        })
    }
}

impl BackendClient {
    /// Send a cart request with the visitor's backend cookie and absorb the
    /// cookie the backend answers with.
    async fn cart_call(
        &self,
        request: reqwest::RequestBuilder,
        jar: &mut CartCookie,
    ) -> Result<CartSnapshot, BackendError> {
        let response = jar.attach(request).send().await?;
        jar.absorb(response.headers());
        let reply: CartReply = decode(check(response).await?).await?;
        reply.into_snapshot()
    }

    /// Fetch the visitor's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self, jar))]
    pub async fn get_cart(&self, jar: &mut CartCookie) -> Result<CartSnapshot, BackendError> {
        self.cart_call(self.get("api/cart/get")?, jar).await
    }

    /// Add one line to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses the add.
    #[instrument(skip(self, jar, item), fields(product_id = %item.product_id))]
    pub async fn add_to_cart(
        &self,
        jar: &mut CartCookie,
        item: &AddToCart,
    ) -> Result<CartSnapshot, BackendError> {
        self.cart_call(self.post("api/cart/add")?.json(item), jar)
            .await
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses.
    #[instrument(skip(self, jar))]
    pub async fn remove_from_cart(
        &self,
        jar: &mut CartCookie,
        product_id: &ProductId,
    ) -> Result<CartSnapshot, BackendError> {
        let body = RemoveFromCart { product_id };
        self.cart_call(self.post("api/cart/remove")?.json(&body), jar)
            .await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, jar))]
    pub async fn clear_cart(&self, jar: &mut CartCookie) -> Result<CartSnapshot, BackendError> {
        self.cart_call(self.post("api/cart/clear")?, jar).await
    }
}
