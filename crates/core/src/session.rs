//! The admin session and the route guard.
//!
//! A login produces one [`AdminSession`]. Guarded pages consult [`authorize`],
//! which is a pure function of the session and the page's requirement, so the
//! access rules can be tested without HTTP.
//!
//! The guard trusts presence alone: a stale token is only discovered when the
//! backend answers 401.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{AdminProfile, Role};

/// Opaque bearer token issued by the backend.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

/// Body of a successful `POST /api/admin/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: AuthToken,
    #[serde(default)]
    pub user: AdminProfile,
}

/// Everything the admin front end remembers about a login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub token: AuthToken,
    pub role: Role,
    pub user: AdminProfile,
}

impl AdminSession {
    /// Build the session from a login response. A missing role is treated
    /// as staff.
    #[must_use]
    pub fn from_login(response: LoginResponse) -> Self {
        let role = response.user.role.clone().unwrap_or(Role::Staff);
        Self {
            token: response.token,
            role,
            user: response.user,
        }
    }

    /// A non-empty token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    /// Exact role match.
    #[must_use]
    pub fn has_role(&self, required: &Role) -> bool {
        &self.role == required
    }
}

/// What a page demands of the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRequirement {
    /// Any logged-in admin.
    Authenticated,
    /// Superadmins only; other roles are bounced to the dashboard.
    SuperAdminOnly,
}

/// Outcome of the route guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    RedirectToLogin,
    RedirectToDashboard,
}

impl Access {
    /// Where to send the visitor, if anywhere.
    #[must_use]
    pub const fn redirect_target(self) -> Option<&'static str> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin => Some("/login"),
            Self::RedirectToDashboard => Some("/dashboard"),
        }
    }
}

/// Decide whether a visitor may see a page.
#[must_use]
pub fn authorize(session: Option<&AdminSession>, requirement: RouteRequirement) -> Access {
    let Some(session) = session.filter(|s| s.is_authenticated()) else {
        return Access::RedirectToLogin;
    };
    match requirement {
        RouteRequirement::Authenticated => Access::Allow,
        RouteRequirement::SuperAdminOnly if session.has_role(&Role::SuperAdmin) => Access::Allow,
        RouteRequirement::SuperAdminOnly => Access::RedirectToDashboard,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn session(token: &str, role: Role) -> AdminSession {
        AdminSession {
            token: AuthToken::new(token),
            role,
            user: AdminProfile::default(),
        }
    }

    #[test]
    fn test_no_session_redirects_to_login() {
        for requirement in [
            RouteRequirement::Authenticated,
            RouteRequirement::SuperAdminOnly,
        ] {
            assert_eq!(authorize(None, requirement), Access::RedirectToLogin);
        }
    }

    #[test]
    fn test_empty_token_redirects_to_login() {
        let s = session("  ", Role::SuperAdmin);
        assert_eq!(
            authorize(Some(&s), RouteRequirement::Authenticated),
            Access::RedirectToLogin
        );
    }

    #[test]
    fn test_non_superadmin_roles_go_to_dashboard() {
        for role in [
            Role::Staff,
            Role::Other("admin".to_owned()),
            Role::Other("viewer".to_owned()),
        ] {
            let s = session("tok", role);
            assert_eq!(
                authorize(Some(&s), RouteRequirement::SuperAdminOnly),
                Access::RedirectToDashboard
            );
            assert_eq!(
                authorize(Some(&s), RouteRequirement::Authenticated),
                Access::Allow
            );
        }
    }

    #[test]
    fn test_superadmin_allowed_everywhere() {
        let s = session("tok", Role::SuperAdmin);
        assert_eq!(
            authorize(Some(&s), RouteRequirement::SuperAdminOnly),
            Access::Allow
        );
    }

    #[test]
    fn test_from_login_response() {
        let response: LoginResponse = serde_json::from_str(
            r#"{"token":"abc.def","user":{"fullName":"Mila","role":"superadmin"}}"#,
        )
        .unwrap();
        let s = AdminSession::from_login(response);
        assert!(s.has_role(&Role::SuperAdmin));
        assert_eq!(s.token.expose(), "abc.def");
        assert_eq!(format!("{:?}", s.token), "AuthToken([REDACTED])");
    }

    #[test]
    fn test_redirect_targets() {
        assert_eq!(Access::Allow.redirect_target(), None);
        assert_eq!(Access::RedirectToLogin.redirect_target(), Some("/login"));
        assert_eq!(
            Access::RedirectToDashboard.redirect_target(),
            Some("/dashboard")
        );
    }
}
