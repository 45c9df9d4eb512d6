//! Core domain types

use serde::{Deserialize, Serialize};

/// Account role. A closed enumeration so new code paths cannot introduce
/// unrecognized roles silently.
#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account, sees only its own task records
    #[default]
    User,
    /// Privileged account, sees aggregate state across all users
    Admin,
}

impl Role {
    /// Whether this role grants the server-wide view
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::User, Role::Admin] {
            assert_eq!(Role::from_str(&role.to_string()).unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!(Role::from_str("superuser").is_err());
    }

    #[test]
    fn test_default_role_is_user() {
        assert_eq!(Role::default(), Role::User);
        assert!(!Role::default().is_admin());
    }
}
