//! Error types for authentication and user management.

use dw_core::ValidationError;
use thiserror::Error;

/// Errors that can occur in authentication and user management.
#[derive(Debug, Error)]
pub enum Error {
    /// Request input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Email or password did not match.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The account exists but may not sign in.
    #[error("account is {status}")]
    AccountDisabled {
        /// Current account status.
        status: String,
    },

    /// Invalid user identifier.
    #[error("invalid user id: {reason}")]
    InvalidUserId {
        /// The reason the user ID is invalid.
        reason: String,
    },

    /// User not found.
    #[error("user not found: {id}")]
    UserNotFound {
        /// The ID of the user that was not found.
        id: String,
    },

    /// Another user already has this email.
    #[error("email already registered: {email}")]
    DuplicateEmail {
        /// The conflicting email.
        email: String,
    },

    /// Another user already has this id.
    #[error("user id already taken: {id}")]
    DuplicateUserId {
        /// The conflicting id.
        id: String,
    },

    /// The password could not be hashed.
    #[error("password hashing failed: {reason}")]
    PasswordHashing {
        /// The reason hashing failed.
        reason: String,
    },

    /// Invalid role name.
    #[error("invalid role: {reason}")]
    InvalidRole {
        /// The reason the role is invalid.
        reason: String,
    },

    /// Permission denied.
    #[error("permission denied: {reason}")]
    PermissionDenied {
        /// The reason permission was denied.
        reason: String,
    },

    /// JWT token error.
    #[error("jwt error: {reason}")]
    JwtError {
        /// The reason the JWT operation failed.
        reason: String,
    },

    /// Token has expired.
    #[error("token expired")]
    TokenExpired,

    /// Invalid token.
    #[error("invalid token: {reason}")]
    InvalidToken {
        /// The reason the token is invalid.
        reason: String,
    },

    /// The wallet identity header is not a valid address.
    #[error("invalid wallet address header: {value}")]
    InvalidWalletAddress {
        /// The rejected header value.
        value: String,
    },

    /// Authentication required.
    #[error("authentication required")]
    AuthenticationRequired,
}

/// Result type alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        assert_eq!(
            Error::InvalidCredentials.to_string(),
            "invalid email or password"
        );

        let err = Error::AccountDisabled {
            status: "inactive".to_string(),
        };
        assert_eq!(err.to_string(), "account is inactive");

        let err = Error::PermissionDenied {
            reason: "admin role required".to_string(),
        };
        assert_eq!(err.to_string(), "permission denied: admin role required");
    }

    #[test]
    fn token_errors_display() {
        assert_eq!(Error::TokenExpired.to_string(), "token expired");
        let err = Error::InvalidToken {
            reason: "bad signature".to_string(),
        };
        assert_eq!(err.to_string(), "invalid token: bad signature");
    }

    #[test]
    fn validation_error_is_transparent() {
        let err = Error::from(ValidationError::empty("email"));
        assert_eq!(
            err.to_string(),
            "validation failed for 'email': input cannot be empty"
        );
    }
}
