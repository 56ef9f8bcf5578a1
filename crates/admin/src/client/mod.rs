//! Segunda Mana REST backend client for admin.
//!
//! Login is the only unauthenticated call. Everything else goes through
//! [`AdminClient::authed`], which attaches `Authorization: Bearer <token>`
//! from the admin's session.
//!
//! Non-2xx answers become [`BackendError::Api`] carrying the body's
//! `message` (or a generic string); 401 becomes
//! [`BackendError::Unauthorized`] so callers can end the session.

mod auth;
mod catalog;
mod content;
mod orders;
mod people;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use segunda_mana_core::api::{self, extract_list, extract_one};
use segunda_mana_core::session::AuthToken;

pub use content::AnnouncementUpload;

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

    /// 401: the token is missing, expired or revoked.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl BackendError {
    /// Text safe to show an admin.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::Unauthorized(message) => message.clone(),
            Self::Http(_) | Self::Decode(_) | Self::Url(_) => {
                api::GENERIC_ERROR_MESSAGE.to_string()
            }
        }
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// Client for the REST backend.
///
/// Cheaply cloneable; the underlying `reqwest::Client` pools connections.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: Client,
    base: Url,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base", &self.inner.base.as_str())
            .finish_non_exhaustive()
    }
}

impl AdminClient {
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
            inner: Arc::new(AdminClientInner { client, base }),
        })
    }

    /// Resolve an endpoint path (no leading slash) against the base URL.
    fn url(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.inner.base.join(path)?)
    }

    /// Calls made on behalf of a logged-in admin.
    #[must_use]
    pub const fn authed<'a>(&'a self, token: &'a AuthToken) -> Authed<'a> {
        Authed {
            client: self,
            token,
        }
    }
}

/// A borrowed client bound to one bearer token.
pub struct Authed<'a> {
    client: &'a AdminClient,
    token: &'a AuthToken,
}

impl Authed<'_> {
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, BackendError> {
        Ok(self
            .client
            .inner
            .client
            .request(method, self.client.url(path)?)
            .bearer_auth(self.token.expose()))
    }

    fn request_url(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .inner
            .client
            .request(method, url)
            .bearer_auth(self.token.expose())
    }

    /// Send and check; the body is left unread.
    async fn send(request: RequestBuilder) -> Result<Response, BackendError> {
        check(request.send().await?).await
    }

    /// GET `path` and pull a list out of its body.
    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
    ) -> Result<Vec<T>, BackendError> {
        let response = Self::send(self.request(Method::GET, path)?).await?;
        let body: Value = decode(response).await?;
        Ok(extract_list(body, key)?)
    }

    /// GET `path` and pull one document out of its body.
    async fn get_one<T: DeserializeOwned>(&self, path: &str, key: &str) -> Result<T, BackendError> {
        let response = Self::send(self.request(Method::GET, path)?).await?;
        let body: Value = decode(response).await?;
        Ok(extract_one(body, key)?)
    }

    /// Send a JSON body and return the backend's `message`, if any.
    async fn send_json(
        &self,
        method: Method,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<Option<String>, BackendError> {
        let response = Self::send(self.request(method, path)?.json(body)).await?;
        Ok(success_message(response).await)
    }

    /// Send without a body and return the backend's `message`, if any.
    async fn send_empty(&self, method: Method, path: &str) -> Result<Option<String>, BackendError> {
        let response = Self::send(self.request(method, path)?).await?;
        Ok(success_message(response).await)
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

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// The `message` of a successful answer. Empty or non-JSON bodies have none.
async fn success_message(response: Response) -> Option<String> {
    let body = response.text().await.ok()?;
    let value: Value = serde_json::from_str(&body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_url_resolution_keeps_base_path() {
        let client = AdminClient::new(Url::parse("https://api.example.org/v2").unwrap()).unwrap();
        assert_eq!(
            client.url("api/admin/orders").unwrap().as_str(),
            "https://api.example.org/v2/api/admin/orders"
        );
    }

    #[test]
    fn test_unauthorized_is_flagged() {
        let err = BackendError::Unauthorized("Token expired".to_string());
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "Token expired");

        let err = BackendError::Api {
            status: 500,
            message: "Something went wrong".to_string(),
        };
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_debug_hides_client_internals() {
        let client = AdminClient::new(Url::parse("http://localhost:5000").unwrap()).unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("localhost:5000"));
    }
}
