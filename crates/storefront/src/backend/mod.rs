//! Segunda Mana REST backend client.
//!
//! The storefront reads the catalog and announcements, relays the visitor's
//! backend cart, and submits orders and contact messages. Every call has a
//! 30-second timeout and no retries.
//!
//! # Cart cookie relay
//!
//! The backend keys its cart by its own session cookie. The storefront keeps
//! that cookie in the visitor's storefront session as a [`CartCookie`] and
//! sends it with every cart and order request, absorbing any `Set-Cookie`
//! the backend answers with.

mod cart;
mod catalog;
mod cookie;
mod orders;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use segunda_mana_core::api;

pub use cart::AddToCart;
pub use cookie::CartCookie;
pub use orders::{ContactMessage, OrderSubmission, Receipt};

/// Outgoing request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the REST backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport failure or timeout.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer, reduced to its `message`.
    #[error("Backend returned {status}: {message}")]
    Api { status: u16, message: String },

    /// 401 from the backend.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl BackendError {
    /// Text safe to show a visitor.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::Unauthorized(message) => message.clone(),
            Self::Http(_) | Self::Decode(_) | Self::Url(_) => {
                api::GENERIC_ERROR_MESSAGE.to_string()
            }
        }
    }
}

/// Client for the REST backend.
///
/// Cheaply cloneable; the underlying `reqwest::Client` pools connections.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: Client,
    base: Url,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base", &self.inner.base.as_str())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a client for the backend at `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(mut base: Url) -> Result<Self, BackendError> {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            inner: Arc::new(BackendClientInner { client, base }),
        })
    }

    /// Resolve an endpoint path (no leading slash) against the base URL.
    fn url(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.inner.base.join(path)?)
    }

    fn get(&self, path: &str) -> Result<RequestBuilder, BackendError> {
        Ok(self.inner.client.get(self.url(path)?))
    }

    fn post(&self, path: &str) -> Result<RequestBuilder, BackendError> {
        Ok(self.inner.client.post(self.url(path)?))
    }
}

/// Turn a non-2xx response into a [`BackendError`].
async fn check(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = api::error_message(&body);
    tracing::warn!(status = status.as_u16(), %message, "Backend request failed");

    if status == StatusCode::UNAUTHORIZED {
        Err(BackendError::Unauthorized(message))
    } else {
        Err(BackendError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Decode a JSON body.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = BackendClient::new(Url::parse("http://api.local/v1").unwrap()).unwrap();
        assert_eq!(
            client.url("api/cart/get").unwrap().as_str(),
            "http://api.local/v1/api/cart/get"
        );

        let client = BackendClient::new(Url::parse("http://api.local").unwrap()).unwrap();
        assert_eq!(
            client.url("api/contact").unwrap().as_str(),
            "http://api.local/api/contact"
        );
    }

    #[test]
    fn test_user_message_hides_transport_details() {
        let err = BackendError::Api {
            status: 400,
            message: "Out of stock".to_string(),
        };
        assert_eq!(err.user_message(), "Out of stock");

        let err = BackendError::Decode(serde_json::from_str::<u8>("x").unwrap_err());
        assert_eq!(err.user_message(), "Something went wrong");
    }
}
