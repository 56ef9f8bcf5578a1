//! Session-held state for logged-in admins.

pub mod session;

pub use session::keys as session_keys;
