//! In-memory user directory and login input.

use std::collections::HashMap;

use chrono::Utc;
use dw_core::validation::{self, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::password::{Password, PasswordHash};
use crate::types::{Role, User, UserId, UserStatus};

/// Minimum password length accepted at login and registration.
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|_| unreachable!()));

/// Hash verified for unknown emails so a miss costs the same as a wrong password.
static DUMMY_HASH: Lazy<Option<PasswordHash>> =
    Lazy::new(|| PasswordHash::new(&Uuid::new_v4().to_string()).ok());

/// Check that `email` looks like an address and return it trimmed.
///
/// # Errors
///
/// Returns a validation error if the email is empty or malformed.
pub fn validate_email(email: &str) -> std::result::Result<&str, ValidationError> {
    let email = validation::require_non_empty("email", email)?;
    validation::require_pattern("email", email, &EMAIL_REGEX, "an email address")?;
    Ok(email)
}

/// Login form input.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: Password,
}

impl LoginRequest {
    /// Check the shape of the input before looking anything up.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed email or a short password.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        validate_email(&self.email)?;
        validation::require_min_len("password", self.password.expose(), MIN_PASSWORD_LEN)
    }
}

/// Details for registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login email.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Plaintext password.
    pub password: Password,
    /// Role.
    pub role: Role,
    /// Initial status.
    pub status: UserStatus,
}

impl NewUser {
    /// An active regular user.
    #[must_use]
    pub fn new(email: impl Into<String>, full_name: impl Into<String>, password: Password) -> Self {
        Self {
            email: email.into(),
            full_name: full_name.into(),
            password,
            role: Role::User,
            status: UserStatus::Active,
        }
    }

    /// Sets the role.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Sets the initial status.
    #[must_use]
    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }
}

/// Filter for listing users.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    /// Case-insensitive match on name or email.
    pub search: Option<String>,
    /// Only users with this status.
    pub status: Option<UserStatus>,
}

impl UserFilter {
    fn matches(&self, user: &User) -> bool {
        if self.status.is_some_and(|s| s != user.status) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                user.full_name.to_lowercase().contains(&term)
                    || user.email.to_lowercase().contains(&term)
            }
        }
    }
}

/// In-memory user store.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: HashMap<UserId, User>,
}

impl UserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
        }
    }

    /// Registers a user under a fresh random id.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is malformed or taken, or the password too short.
    pub fn add_user(&mut self, user: NewUser) -> Result<User> {
        self.add_user_with_id(UserId::new(), user)
    }

    /// Registers a user under a fixed id.
    ///
    /// # Errors
    ///
    /// Returns an error if the id or email is taken, the email is malformed,
    /// or the password too short.
    pub fn add_user_with_id(&mut self, id: UserId, user: NewUser) -> Result<User> {
        if self.users.contains_key(&id) {
            return Err(Error::DuplicateUserId { id: id.to_string() });
        }
        let email = validate_email(&user.email)?.to_string();
        validation::require_min_len("password", user.password.expose(), MIN_PASSWORD_LEN)?;
        if self.find_by_email(&email).is_some() {
            return Err(Error::DuplicateEmail { email });
        }
        let password = PasswordHash::new(user.password.expose())?;

        let full_name = user.full_name.trim().to_string();
        let record = User {
            id: id.clone(),
            email,
            full_name,
            role: user.role,
            status: user.status,
            created_at: Utc::now(),
            password,
        };
        info!(user_id = %record.id, role = %record.role, "registered user");
        self.users.insert(id, record.clone());
        Ok(record)
    }

    /// Checks an email/password pair and returns the account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredentials`] when the pair does not match and
    /// [`Error::AccountDisabled`] when the account is not active.
    pub fn authenticate(&self, email: &str, password: &Password) -> Result<User> {
        let user = match self.find_by_email(email) {
            Some(user) if user.password.verify(password.expose()) => user,
            Some(_) => {
                debug!("login rejected: bad credentials");
                return Err(Error::InvalidCredentials);
            }
            None => {
                if let Some(dummy) = DUMMY_HASH.as_ref() {
                    let _ = dummy.verify(password.expose());
                }
                debug!("login rejected: unknown email");
                return Err(Error::InvalidCredentials);
            }
        };

        if !user.is_active() {
            warn!(user_id = %user.id, status = %user.status, "login refused for disabled account");
            return Err(Error::AccountDisabled {
                status: user.status.to_string(),
            });
        }

        debug!(user_id = %user.id, "login accepted");
        Ok(user.clone())
    }

    /// Looks up a user by id.
    #[must_use]
    pub fn get(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    /// Looks up a user by email, case-insensitive.
    #[must_use]
    pub fn find_by_email(&self, email: &str) -> Option<&User> {
        let email = email.trim();
        self.users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
    }

    /// Lists users matching `filter`, oldest first.
    #[must_use]
    pub fn list(&self, filter: &UserFilter) -> Vec<User> {
        let mut users: Vec<User> = self
            .users
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect();
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.email.cmp(&b.email))
        });
        users
    }

    /// Sets a user's status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserNotFound`] if there is no such user.
    pub fn set_status(&mut self, id: &UserId, status: UserStatus) -> Result<User> {
        let user = self.get_mut(id)?;
        user.status = status;
        info!(user_id = %user.id, status = %status, "user status changed");
        Ok(user.clone())
    }

    /// Flips a user between active and inactive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserNotFound`] if there is no such user.
    pub fn toggle_status(&mut self, id: &UserId) -> Result<User> {
        let next = self.get_mut(id)?.status.toggled();
        self.set_status(id, next)
    }

    /// Removes a user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserNotFound`] if there is no such user.
    pub fn remove(&mut self, id: &UserId) -> Result<User> {
        let user = self.users.remove(id).ok_or_else(|| Error::UserNotFound {
            id: id.to_string(),
        })?;
        info!(user_id = %user.id, "user removed");
        Ok(user)
    }

    /// Number of users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Checks if the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn get_mut(&mut self, id: &UserId) -> Result<&mut User> {
        self.users.get_mut(id).ok_or_else(|| Error::UserNotFound {
            id: id.to_string(),
        })
    }
}
