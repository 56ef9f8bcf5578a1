//! One-shot flash notices.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use segunda_mana_core::Notice;

use crate::models::session;

/// Extractor that takes the queued notice out of the session.
///
/// Reading it removes it, so it renders once.
pub struct Flash(pub Option<Notice>);

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let notice = match parts.extensions.get::<Session>() {
            Some(s) => session::take_flash(s).await,
            None => None,
        };
        Ok(Self(notice))
    }
}
