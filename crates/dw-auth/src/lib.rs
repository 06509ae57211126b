//! Authentication for the Daily Wallet backend.
//!
//! This crate provides:
//! - [`types`]: users, roles and account status
//! - [`password`]: salted password hashing
//! - [`users`]: the in-memory user directory and login input
//! - [`jwt`]: session token issuance and validation
//! - [`headers`]: request credentials and the resulting [`Principal`]
//!
//! # Example
//!
//! ```rust
//! use dw_auth::{JwtConfig, JwtManager, NewUser, Password, UserDirectory, authenticate_request};
//!
//! let mut users = UserDirectory::new();
//! users
//!     .add_user(NewUser::new("user@example.com", "Demo", Password::new("password123")))
//!     .unwrap();
//!
//! let jwt = JwtManager::new(JwtConfig::new_hs256([42u8; 32], "dailywallet").unwrap());
//! let user = users
//!     .authenticate("user@example.com", &Password::new("password123"))
//!     .unwrap();
//! let token = jwt.create_token(&user).unwrap();
//!
//! let header = format!("Bearer {token}");
//! let principal = authenticate_request(Some(&header), None, &jwt, &users).unwrap();
//! assert!(!principal.is_admin());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod headers;
pub mod jwt;
pub mod password;
pub mod types;
pub mod users;

pub use error::{Error, Result};
pub use headers::{
    AUTHORIZATION_HEADER, Credential, Principal, WALLET_ADDRESS_HEADER, authenticate_request,
    extract_credentials,
};
pub use jwt::{JwtClaims, JwtConfig, JwtManager};
pub use password::{Password, PasswordHash};
pub use types::{Role, User, UserId, UserStatus};
pub use users::{LoginRequest, NewUser, UserDirectory, UserFilter};
