//! Core account types.
//!
//! - [`UserId`]: a validated user identifier
//! - [`Role`]: what a user may do
//! - [`UserStatus`]: whether a user may sign in
//! - [`User`]: an email/password account

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::password::PasswordHash;

/// A unique identifier for a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new random user ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates a user ID from an existing string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty or contains whitespace.
    pub fn from_string(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::InvalidUserId {
                reason: "id cannot be empty".to_string(),
            });
        }
        if id.chars().any(char::is_whitespace) {
            return Err(Error::InvalidUserId {
                reason: "id cannot contain whitespace".to_string(),
            });
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a user is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular wallet user.
    #[default]
    User,
    /// Can manage users and wallets.
    Admin,
}

impl Role {
    /// Whether this role grants access to administration endpoints.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(Error::InvalidRole {
                reason: format!("unknown role: {s}"),
            }),
        }
    }
}

/// Whether an account may sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// May sign in.
    #[default]
    Active,
    /// Disabled by an administrator.
    Inactive,
    /// Registered but not yet approved.
    Pending,
}

impl UserStatus {
    /// The status an administrator toggle moves to.
    ///
    /// Active accounts become inactive; everything else becomes active.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive | Self::Pending => Self::Active,
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

/// An email/password account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Login email, stored as entered.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Role.
    pub role: Role,
    /// Account status.
    pub status: UserStatus,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Salted password hash.
    #[serde(skip)]
    pub password: PasswordHash,
}

impl User {
    /// Whether the account may sign in and use its tokens.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn user_id_new_is_unique() {
        assert_ne!(UserId::new(), UserId::new());
    }

    #[test]
    fn user_id_from_string() {
        let id = UserId::from_string("1").unwrap();
        assert_eq!(id.as_str(), "1");
        assert_eq!(id.to_string(), "1");
    }

    #[test_case("" ; "empty")]
    #[test_case("a b" ; "whitespace")]
    fn user_id_from_string_rejects(input: &str) {
        assert!(matches!(
            UserId::from_string(input),
            Err(Error::InvalidUserId { .. })
        ));
    }

    #[test_case("user", Role::User ; "user")]
    #[test_case("ADMIN", Role::Admin ; "admin uppercase")]
    fn role_from_str(input: &str, expected: Role) {
        assert_eq!(input.parse::<Role>().unwrap(), expected);
    }

    #[test]
    fn role_from_str_rejects_unknown() {
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn role_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
    }

    #[test_case(UserStatus::Active, UserStatus::Inactive ; "active")]
    #[test_case(UserStatus::Inactive, UserStatus::Active ; "inactive")]
    #[test_case(UserStatus::Pending, UserStatus::Active ; "pending")]
    fn status_toggled(from: UserStatus, to: UserStatus) {
        assert_eq!(from.toggled(), to);
    }

    #[test]
    fn user_serialization_hides_password() {
        let user = User {
            id: UserId::from_string("1").unwrap(),
            email: "user@example.com".to_string(),
            full_name: "Demo User".to_string(),
            role: Role::User,
            status: UserStatus::Active,
            created_at: Utc::now(),
            password: PasswordHash::new("password123").unwrap(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["fullName"], "Demo User");
        assert_eq!(json["role"], "user");
        assert_eq!(json["status"], "active");
        assert!(json.get("password").is_none());
    }
}
