//! Login and the logged-in admin's own account.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::instrument;

use segunda_mana_core::session::LoginResponse;
use segunda_mana_core::{AccountUpdate, AdminProfile};

use super::{AdminClient, Authed, BackendError, check, decode};

impl AdminClient {
    /// Exchange credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unauthorized`] or [`BackendError::Api`] for
    /// rejected credentials, or a transport/decode error.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, BackendError> {
        let body = json!({ "email": email, "password": password.expose_secret() });
        let request = self
            .inner
            .client
            .post(self.url("api/admin/auth/login")?)
            .json(&body);
        let response = check(request.send().await?).await?;
        decode(response).await
    }
}

impl Authed<'_> {
    /// The profile behind the current token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<AdminProfile, BackendError> {
        self.get_one("api/admin/auth/me", "user").await
    }

    /// Save profile fields and, when present, a password change.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, update))]
    pub async fn update_account(
        &self,
        update: &AccountUpdate,
    ) -> Result<Option<String>, BackendError> {
        self.send_json(Method::PUT, "api/admin/auth/update", update)
            .await
    }
}
