//! Request credentials and the authenticated caller.
//!
//! A request identifies its caller either with a session token
//! (`Authorization: Bearer <jwt>`) or with the address of a connected browser
//! wallet (`x-wallet-address`). The bearer token wins when both are present.

use dw_core::{EvmAddress, OwnerId};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::jwt::JwtManager;
use crate::types::{Role, UserId};
use crate::users::UserDirectory;

/// The standard HTTP Authorization header name.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Header carrying the connected wallet address.
pub const WALLET_ADDRESS_HEADER: &str = "x-wallet-address";

/// Credential type extracted from headers.
#[derive(Debug, PartialEq, Eq)]
pub enum Credential<'a> {
    /// JWT bearer token.
    BearerToken(&'a str),
    /// Connected wallet address, unvalidated.
    WalletAddress(&'a str),
}

/// Extracts credentials from HTTP headers.
///
/// Checks in order:
/// 1. `Authorization: Bearer <token>`
/// 2. `x-wallet-address: <address>`
///
/// # Errors
///
/// Returns an error if the Authorization header uses another scheme or if no
/// credentials are present.
pub fn extract_credentials<'a>(
    authorization: Option<&'a str>,
    wallet_address: Option<&'a str>,
) -> Result<Credential<'a>> {
    if let Some(auth) = authorization.map(str::trim).filter(|a| !a.is_empty()) {
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .map(str::trim)
            .ok_or_else(|| Error::InvalidToken {
                reason: "unsupported authorization scheme, expected 'Bearer <token>'".to_string(),
            })?;
        if token.is_empty() {
            return Err(Error::InvalidToken {
                reason: "bearer token is empty".to_string(),
            });
        }
        return Ok(Credential::BearerToken(token));
    }

    if let Some(address) = wallet_address.map(str::trim).filter(|a| !a.is_empty()) {
        return Ok(Credential::WalletAddress(address));
    }

    Err(Error::AuthenticationRequired)
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Principal {
    /// Signed in with email and password.
    User {
        /// User id.
        id: UserId,
        /// User email.
        email: String,
        /// Current role.
        role: Role,
    },
    /// Identified by a connected wallet.
    Wallet {
        /// Connected address.
        address: EvmAddress,
    },
}

impl Principal {
    /// The key under which this caller's wallets and orders are stored.
    #[must_use]
    pub fn owner_id(&self) -> OwnerId {
        match self {
            Self::User { id, .. } => OwnerId::new(id.as_str()),
            Self::Wallet { address } => OwnerId::from(address),
        }
    }

    /// The connected wallet address, if the caller is wallet-identified.
    #[must_use]
    pub fn wallet_address(&self) -> Option<&EvmAddress> {
        match self {
            Self::User { .. } => None,
            Self::Wallet { address } => Some(address),
        }
    }

    /// The user id, if the caller signed in with email.
    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::User { id, .. } => Some(id),
            Self::Wallet { .. } => None,
        }
    }

    /// Whether the caller holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::User { role, .. } if role.is_admin())
    }

    /// Returns the admin's user id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PermissionDenied`] for wallet callers and non-admin users.
    pub fn require_admin(&self) -> Result<&UserId> {
        match self {
            Self::User { id, role, .. } if role.is_admin() => Ok(id),
            _ => Err(Error::PermissionDenied {
                reason: "admin role required".to_string(),
            }),
        }
    }
}

/// Authenticates a request from its header values.
///
/// Bearer tokens are validated and then checked against the directory, so a
/// token for a removed or disabled account is refused and the role reflects
/// the account's current role.
///
/// # Errors
///
/// Returns an error if no credentials are present or they do not check out.
pub fn authenticate_request(
    authorization: Option<&str>,
    wallet_address: Option<&str>,
    jwt_manager: &JwtManager,
    users: &UserDirectory,
) -> Result<Principal> {
    match extract_credentials(authorization, wallet_address)? {
        Credential::BearerToken(token) => {
            let claims = jwt_manager.validate_token(token)?;
            let user_id = claims.user_id()?;

            let user = users.get(&user_id).ok_or_else(|| Error::UserNotFound {
                id: user_id.to_string(),
            })?;
            if !user.is_active() {
                return Err(Error::PermissionDenied {
                    reason: format!("account is {}", user.status),
                });
            }

            debug!(user_id = %user.id, "authenticated bearer token");
            Ok(Principal::User {
                id: user.id.clone(),
                email: user.email.clone(),
                role: user.role,
            })
        }
        Credential::WalletAddress(raw) => {
            let address = EvmAddress::parse_field(WALLET_ADDRESS_HEADER, raw).map_err(|_| {
                Error::InvalidWalletAddress {
                    value: raw.to_string(),
                }
            })?;
            debug!(wallet = %address.short(), "authenticated wallet header");
            Ok(Principal::Wallet { address })
        }
    }
}
