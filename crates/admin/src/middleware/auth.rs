//! Route guard extractors for admin.
//!
//! Both guards defer to [`authorize`] so the access rules live in one pure
//! function. HTMX requests get an `HX-Redirect` header instead of a 303 so
//! the browser leaves the page rather than swapping a login form into a
//! fragment.

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use segunda_mana_core::session::{AdminSession, RouteRequirement, authorize};

use crate::models::session;

/// Request header set by HTMX on every request it makes.
pub const HX_REQUEST: &str = "hx-request";

/// Response header telling HTMX to do a full-page navigation.
pub const HX_REDIRECT: &str = "hx-redirect";

/// Whether the request was made by HTMX.
#[must_use]
pub fn is_htmx(parts: &Parts) -> bool {
    parts.headers.contains_key(HX_REQUEST)
}

/// Navigate to `target`, the HTMX way or the plain way.
#[must_use]
pub fn redirect(target: &'static str, htmx: bool) -> Response {
    if htmx {
        let mut response = StatusCode::OK.into_response();
        response
            .headers_mut()
            .insert(HX_REDIRECT, HeaderValue::from_static(target));
        response
    } else {
        Redirect::to(target).into_response()
    }
}

/// Rejection from the admin guards: where to send the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardRejection {
    pub target: &'static str,
    pub htmx: bool,
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        redirect(self.target, self.htmx)
    }
}

async fn guard(
    parts: &Parts,
    requirement: RouteRequirement,
) -> Result<AdminSession, GuardRejection> {
    let admin = match parts.extensions.get::<Session>() {
        Some(s) => session::current(s).await,
        None => None,
    };

    match (authorize(admin.as_ref(), requirement).redirect_target(), admin) {
        (None, Some(admin)) => Ok(admin),
        (target, _) => {
            let target = target.unwrap_or("/login");
            tracing::debug!(path = %parts.uri.path(), target, "Admin guard redirect");
            Err(GuardRejection {
                target,
                htmx: is_htmx(parts),
            })
        }
    }
}

/// Extractor for pages open to every logged-in admin.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireStaff(admin): RequireStaff) -> impl IntoResponse {
///     format!("Hello, {}!", admin.user.display_name())
/// }
/// ```
pub struct RequireStaff(pub AdminSession);

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        guard(parts, RouteRequirement::Authenticated).await.map(Self)
    }
}

/// Extractor for superadmin-only pages. Other roles go to the dashboard.
pub struct RequireSuperAdmin(pub AdminSession);

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        guard(parts, RouteRequirement::SuperAdminOnly)
            .await
            .map(Self)
    }
}

/// Extractor that reads the login without demanding one.
pub struct OptionalAdmin(pub Option<AdminSession>);

impl<S> FromRequestParts<S> for OptionalAdmin
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(s) => session::current(s).await,
            None => None,
        };
        Ok(Self(admin))
    }
}
