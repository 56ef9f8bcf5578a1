//! Admin roles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role attached to an admin login.
///
/// The backend issues `staff` and `superadmin`. Any other value is kept
/// verbatim so it can be displayed, and it never grants superadmin access.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Regular back-office staff.
    Staff,
    /// Full access, including staff management and the activity log.
    SuperAdmin,
    /// A role this front end does not know about.
    Other(String),
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Staff => "staff",
            Self::SuperAdmin => "superadmin",
            Self::Other(raw) => raw,
        }
    }

    /// Role name for display, capitalized ("Superadmin", "Staff").
    #[must_use]
    pub fn display_name(&self) -> String {
        crate::display::capitalize(self.as_str())
    }

    /// Whether this is the superadmin role.
    #[must_use]
    pub const fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "staff" => Self::Staff,
            "superadmin" => Self::SuperAdmin,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for Role {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_owned())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_owned()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_known_roles() {
        assert_eq!(Role::from("superadmin"), Role::SuperAdmin);
        assert_eq!(Role::from("SuperAdmin"), Role::SuperAdmin);
        assert_eq!(Role::from("staff"), Role::Staff);
    }

    #[test]
    fn test_unknown_role_is_kept() {
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Other("admin".to_owned()));
        assert!(!role.is_super_admin());
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(Role::SuperAdmin.display_name(), "Superadmin");
        assert_eq!(Role::Staff.display_name(), "Staff");
    }
}
