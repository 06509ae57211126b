//! JWT (JSON Web Token) session tokens.
//!
//! - [`JwtClaims`]: standard claims plus the user's email and role
//! - [`JwtConfig`]: signing secret, issuer and lifetime
//! - [`JwtManager`]: issues and validates tokens

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Role, User, UserId};

/// Default token lifetime in hours.
pub const DEFAULT_EXPIRY_HOURS: i64 = 24;

/// Minimum HS256 secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID).
    pub sub: String,
    /// User email.
    pub email: String,
    /// User role at issue time.
    pub role: Role,
    /// Issuer.
    pub iss: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at time (Unix timestamp).
    pub iat: i64,
    /// Not before time (Unix timestamp).
    pub nbf: i64,
    /// JWT ID.
    pub jti: String,
}

impl JwtClaims {
    /// Creates claims for a user, valid for [`DEFAULT_EXPIRY_HOURS`].
    #[must_use]
    pub fn new(user: &User, issuer: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            iss: issuer.into(),
            exp: (now + Duration::hours(DEFAULT_EXPIRY_HOURS)).timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Sets the expiration time.
    #[must_use]
    pub fn with_expiry(mut self, exp: DateTime<Utc>) -> Self {
        self.exp = exp.timestamp();
        self
    }

    /// Sets the expiration to a duration from now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JwtError`] if the expiry falls outside the
    /// representable time range.
    pub fn with_expiry_duration(mut self, duration: Duration) -> Result<Self> {
        let exp = Utc::now()
            .checked_add_signed(duration)
            .ok_or_else(|| Error::JwtError {
                reason: "token lifetime out of range".to_string(),
            })?;
        self.exp = exp.timestamp();
        Ok(self)
    }

    /// Returns the user ID from the subject claim.
    ///
    /// # Errors
    ///
    /// Returns an error if the subject is not a valid user ID.
    pub fn user_id(&self) -> Result<UserId> {
        UserId::from_string(&self.sub)
    }

    /// Returns the expiration time as a `DateTime`.
    #[must_use]
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Checks if the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Configuration for JWT signing and validation.
#[derive(Clone)]
pub struct JwtConfig {
    secret: Vec<u8>,
    algorithm: Algorithm,
    issuer: String,
    default_expiry: Duration,
}

impl JwtConfig {
    /// Creates a new JWT configuration with HMAC-SHA256.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is too short (< 32 bytes).
    pub fn new_hs256(secret: impl AsRef<[u8]>, issuer: impl Into<String>) -> Result<Self> {
        let secret = secret.as_ref();
        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::JwtError {
                reason: format!("secret must be at least {MIN_SECRET_LEN} bytes for HS256"),
            });
        }
        Ok(Self {
            secret: secret.to_vec(),
            algorithm: Algorithm::HS256,
            issuer: issuer.into(),
            default_expiry: Duration::hours(DEFAULT_EXPIRY_HOURS),
        })
    }

    /// Sets the default token lifetime.
    #[must_use]
    pub fn with_default_expiry(mut self, duration: Duration) -> Self {
        self.default_expiry = duration;
        self
    }

    /// Returns the issuer.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the default token lifetime.
    #[must_use]
    pub fn default_expiry(&self) -> Duration {
        self.default_expiry
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.secret)
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.secret)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iat", "nbf", "sub", "iss"]);
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("default_expiry", &self.default_expiry)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Issues and validates session tokens.
#[derive(Debug)]
pub struct JwtManager {
    config: JwtConfig,
}

impl JwtManager {
    /// Creates a new JWT manager with the given configuration.
    #[must_use]
    pub const fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// Creates a token for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if token creation fails.
    pub fn create_token(&self, user: &User) -> Result<String> {
        let claims = JwtClaims::new(user, &self.config.issuer)
            .with_expiry_duration(self.config.default_expiry)?;
        self.create_token_with_claims(&claims)
    }

    /// Creates a token with custom claims.
    ///
    /// # Errors
    ///
    /// Returns an error if token creation fails.
    pub fn create_token_with_claims(&self, claims: &JwtClaims) -> Result<String> {
        let header = Header::new(self.config.algorithm);
        encode(&header, claims, &self.config.encoding_key()).map_err(|e| Error::JwtError {
            reason: e.to_string(),
        })
    }

    /// Validates a token and returns the claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is malformed, badly signed, from another
    /// issuer or expired.
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(
            token,
            &self.config.decoding_key(),
            &self.config.validation(),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Error::TokenExpired,
            _ => Error::InvalidToken {
                reason: e.to_string(),
            },
        })?;

        Ok(token_data.claims)
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &JwtConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::PasswordHash;
    use crate::types::UserStatus;

    fn test_config() -> JwtConfig {
        JwtConfig::new_hs256([7u8; 32], "test-issuer").unwrap()
    }

    fn test_user() -> User {
        User {
            id: UserId::from_string("1").unwrap(),
            email: "user@example.com".to_string(),
            full_name: "Demo User".to_string(),
            role: Role::Admin,
            status: UserStatus::Active,
            created_at: Utc::now(),
            password: PasswordHash::new("password123").unwrap(),
        }
    }

    #[test]
    fn jwt_claims_new() {
        let claims = JwtClaims::new(&test_user(), "test-issuer");
        assert_eq!(claims.sub, "1");
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.role, Role::Admin);
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, DEFAULT_EXPIRY_HOURS * 3600);
    }

    #[test]
    fn jwt_claims_expiry() {
        let exp = Utc::now() + Duration::hours(1);
        let claims = JwtClaims::new(&test_user(), "test").with_expiry(exp);
        assert_eq!(claims.expiry().unwrap().timestamp(), exp.timestamp());
    }

    #[test]
    fn config_rejects_short_secret() {
        assert!(matches!(
            JwtConfig::new_hs256([0u8; 16], "test"),
            Err(Error::JwtError { .. })
        ));
    }

    #[test]
    fn config_debug_redacts_secret() {
        let debug = format!("{:?}", test_config());
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("test-issuer"));
    }

    #[test]
    fn create_and_validate_token() {
        let manager = JwtManager::new(test_config());
        let token = manager.create_token(&test_user()).unwrap();
        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap().as_str(), "1");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iss, "test-issuer");
    }

    #[test]
    fn custom_lifetime_applies() {
        let manager =
            JwtManager::new(test_config().with_default_expiry(Duration::minutes(5)));
        let token = manager.create_token(&test_user()).unwrap();
        let claims = manager.validate_token(&token).unwrap();
        assert!((claims.exp - claims.iat - 300).abs() <= 1);
    }

    #[test]
    fn overflowing_lifetime_is_an_error() {
        let manager = JwtManager::new(test_config().with_default_expiry(Duration::MAX));
        assert!(matches!(
            manager.create_token(&test_user()),
            Err(Error::JwtError { .. })
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let manager = JwtManager::new(test_config());
        let claims = JwtClaims::new(&test_user(), "test-issuer")
            .with_expiry(Utc::now() - Duration::hours(2));
        let token = manager.create_token_with_claims(&claims).unwrap();
        assert!(matches!(
            manager.validate_token(&token),
            Err(Error::TokenExpired)
        ));
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let issuer_a = JwtManager::new(test_config());
        let issuer_b = JwtManager::new(JwtConfig::new_hs256([7u8; 32], "other").unwrap());
        let token = issuer_b.create_token(&test_user()).unwrap();
        assert!(matches!(
            issuer_a.validate_token(&token),
            Err(Error::InvalidToken { .. })
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let a = JwtManager::new(test_config());
        let b = JwtManager::new(JwtConfig::new_hs256([9u8; 32], "test-issuer").unwrap());
        let token = b.create_token(&test_user()).unwrap();
        assert!(matches!(
            a.validate_token(&token),
            Err(Error::InvalidToken { .. })
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let manager = JwtManager::new(test_config());
        assert!(manager.validate_token("not.a.jwt").is_err());
        assert!(manager.validate_token("").is_err());
    }
}
