//! HTTP middleware stack for admin.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with in-memory store)
//! 5. Session expiry (ends the login when the backend answers 401)
//!
//! Route guards are extractors ([`RequireStaff`], [`RequireSuperAdmin`]) so
//! each handler states its own requirement.

pub mod auth;
pub mod flash;
pub mod request_id;
pub mod session;

pub use auth::{OptionalAdmin, RequireStaff, RequireSuperAdmin};
pub use flash::Flash;
pub use request_id::request_id_middleware;
pub use session::{create_session_layer, expire_session};
