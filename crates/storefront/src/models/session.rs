//! Typed access to the storefront session.
//!
//! Handlers never touch raw keys: each value has a load and a store helper
//! here. Load helpers treat a missing or unreadable value as the default.

use tower_sessions::Session;
use tower_sessions::session::Error;

use segunda_mana_core::Notice;
use segunda_mana_core::checkout::CheckoutSession;

use crate::backend::CartCookie;

/// Session keys for visitor state.
pub mod keys {
    /// The backend's cart cookie, relayed on cart and order calls.
    pub const BACKEND_COOKIE: &str = "backend_cookie";

    /// Checkout progress: state machine, voucher and discount.
    pub const CHECKOUT: &str = "checkout";

    /// One-shot notice shown on the next rendered page.
    pub const FLASH: &str = "flash";
}

pub async fn cart_cookie(session: &Session) -> CartCookie {
    session
        .get::<CartCookie>(keys::BACKEND_COOKIE)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Store the cart cookie if a backend response changed it.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn store_cart_cookie(session: &Session, jar: &CartCookie) -> Result<(), Error> {
    if jar.is_changed() {
        session.insert(keys::BACKEND_COOKIE, jar).await?;
    }
    Ok(())
}

pub async fn checkout(session: &Session) -> CheckoutSession {
    session
        .get::<CheckoutSession>(keys::CHECKOUT)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// # Errors
///
/// Returns an error if the session store fails.
pub async fn store_checkout(session: &Session, checkout: &CheckoutSession) -> Result<(), Error> {
    session.insert(keys::CHECKOUT, checkout).await
}

/// Queue a notice for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn flash(session: &Session, notice: Notice) -> Result<(), Error> {
    session.insert(keys::FLASH, notice).await
}

/// Take the queued notice, if any.
pub async fn take_flash(session: &Session) -> Option<Notice> {
    session.remove::<Notice>(keys::FLASH).await.ok().flatten()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_flash_is_one_shot() {
        let session = session();
        flash(&session, Notice::error("Failed")).await.unwrap();

        let notice = take_flash(&session).await.unwrap();
        assert_eq!(notice.message, "Failed");
        assert!(take_flash(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_checkout_defaults_to_idle() {
        let session = session();
        let checkout = checkout(&session).await;
        assert_eq!(checkout, CheckoutSession::default());
    }

    #[tokio::test]
    async fn test_unchanged_cookie_is_not_stored() {
        let session = session();
        store_cart_cookie(&session, &CartCookie::default())
            .await
            .unwrap();
        assert!(session.is_empty().await);
    }
}
