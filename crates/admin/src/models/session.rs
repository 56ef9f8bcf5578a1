//! Typed access to the admin session.
//!
//! The whole login lives under one key as an [`AdminSession`]. It is written
//! once by [`init`] at login and removed by [`clear`] at logout or when the
//! backend stops accepting the token. Handlers never touch raw keys.

use tower_sessions::Session;
use tower_sessions::session::Error;

use segunda_mana_core::Notice;
use segunda_mana_core::session::AdminSession;

/// Session keys for admin state.
pub mod keys {
    /// The typed login: token, role and profile.
    pub const ADMIN_SESSION: &str = "admin_session";

    /// One-shot notice shown on the next rendered page.
    pub const FLASH: &str = "flash";
}

/// Start a login. The session id is rotated first.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn init(session: &Session, admin: &AdminSession) -> Result<(), Error> {
    session.cycle_id().await?;
    session.insert(keys::ADMIN_SESSION, admin).await
}

/// The current login, if any. Unreadable data counts as logged out.
pub async fn current(session: &Session) -> Option<AdminSession> {
    session
        .get::<AdminSession>(keys::ADMIN_SESSION)
        .await
        .ok()
        .flatten()
}

/// Replace the stored login, keeping the session id.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn store(session: &Session, admin: &AdminSession) -> Result<(), Error> {
    session.insert(keys::ADMIN_SESSION, admin).await
}

/// End the login and drop everything else in the session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear(session: &Session) -> Result<(), Error> {
    session.flush().await
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

    use segunda_mana_core::Role;
    use segunda_mana_core::session::AuthToken;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn admin() -> AdminSession {
        AdminSession {
            token: AuthToken::new("tok"),
            role: Role::SuperAdmin,
            user: segunda_mana_core::AdminProfile::default(),
        }
    }

    #[tokio::test]
    async fn test_init_then_clear() {
        let session = session();
        assert!(current(&session).await.is_none());

        init(&session, &admin()).await.unwrap();
        assert_eq!(current(&session).await, Some(admin()));

        clear(&session).await.unwrap();
        assert!(current(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_flash_is_one_shot() {
        let session = session();
        flash(&session, Notice::success("Saved")).await.unwrap();

        assert_eq!(take_flash(&session).await.unwrap().message, "Saved");
        assert!(take_flash(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_clear_drops_pending_flash() {
        let session = session();
        init(&session, &admin()).await.unwrap();
        flash(&session, Notice::info("Hello")).await.unwrap();

        clear(&session).await.unwrap();
        assert!(take_flash(&session).await.is_none());
    }
}
