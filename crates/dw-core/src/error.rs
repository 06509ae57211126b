//! Error types for wallet and ramp operations.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur in wallet and ramp operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Request input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The wallet does not exist or is not visible to the caller.
    #[error("wallet not found: {address}")]
    WalletNotFound {
        /// The address that was looked up.
        address: String,
    },

    /// The wallet exists but has been deactivated.
    #[error("wallet is inactive: {address}")]
    WalletInactive {
        /// The address of the inactive wallet.
        address: String,
    },

    /// A configured lifetime pushed an expiry past the representable time range.
    #[error("expiry is out of range")]
    ExpiryOutOfRange,
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a wallet-not-found error.
    #[must_use]
    pub fn wallet_not_found(address: impl Into<String>) -> Self {
        Self::WalletNotFound {
            address: address.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        let err = Error::wallet_not_found("0xabc");
        assert_eq!(err.to_string(), "wallet not found: 0xabc");

        let err = Error::WalletInactive {
            address: "0xabc".to_string(),
        };
        assert_eq!(err.to_string(), "wallet is inactive: 0xabc");
    }

    #[test]
    fn validation_error_is_transparent() {
        let err = Error::from(ValidationError::empty("name"));
        assert_eq!(
            err.to_string(),
            "validation failed for 'name': input cannot be empty"
        );
    }
}
