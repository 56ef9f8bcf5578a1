//! Session middleware configuration for admin.
//!
//! Admin sessions live in memory with stricter settings than the
//! storefront: SameSite=Strict and a 24 hour inactivity expiry.

use axum::{extract::Request, middleware::Next, response::Response};
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use segunda_mana_core::Notice;

use crate::config::AdminConfig;
use crate::error::{SessionExpired, clear_sentry_user};
use crate::middleware::auth::{HX_REQUEST, redirect};
use crate::models::session;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "sm_admin_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &AdminConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}

/// End the login when a handler reports that the backend refused the token.
///
/// Must sit inside the session layer.
pub async fn expire_session(session: Session, request: Request, next: Next) -> Response {
    let htmx = request.headers().contains_key(HX_REQUEST);
    let response = next.run(request).await;

    if response.extensions().get::<SessionExpired>().is_none() {
        return response;
    }

    if let Err(e) = session::clear(&session).await {
        tracing::warn!("Failed to clear expired admin session: {e}");
    }
    if let Err(e) = session::flash(
        &session,
        Notice::info("Your session has expired. Please log in again."),
    )
    .await
    {
        tracing::warn!("Failed to queue session expiry notice: {e}");
    }
    clear_sentry_user();

    if htmx {
        redirect("/login", true)
    } else {
        response
    }
}
