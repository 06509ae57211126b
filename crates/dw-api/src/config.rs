//! API server configuration.

use std::fmt;
use std::net::SocketAddr;

use chrono::Duration;
use dw_auth::Password;
use dw_core::RampConfig;

use crate::error::{ApiError, ApiResult};

/// Default JWT issuer.
pub const DEFAULT_ISSUER: &str = "dailywallet";

/// Default session lifetime in hours.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Longest session lifetime accepted by [`ApiConfig::validate`], in hours.
pub const MAX_TOKEN_TTL_HOURS: i64 = 365 * 24;

/// Email of the seeded demo account.
pub const DEMO_USER_EMAIL: &str = "user@example.com";

/// Password of the seeded demo account.
pub const DEMO_USER_PASSWORD: &str = "password123";

/// Bootstrap administrator credentials.
#[derive(Clone)]
pub struct AdminAccount {
    /// Login email.
    pub email: String,
    /// Login password.
    pub password: Password,
}

impl fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAccount")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Configuration for the API server.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP server to.
    pub bind_addr: SocketAddr,
    /// CORS allowed origins (empty means all).
    pub cors_origins: Vec<String>,
    /// HS256 signing secret. Generated at startup when absent.
    pub jwt_secret: Option<String>,
    /// Token issuer.
    pub jwt_issuer: String,
    /// Session lifetime.
    pub token_ttl: Duration,
    /// Fee, quote lifetime and payment URL for the ramp desk.
    pub ramp: RampConfig,
    /// Administrator created at startup.
    pub admin: Option<AdminAccount>,
    /// Seed the demo user account.
    pub seed_demo_user: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            cors_origins: Vec::new(),
            jwt_secret: None,
            jwt_issuer: DEFAULT_ISSUER.to_string(),
            token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            ramp: RampConfig::default(),
            admin: None,
            seed_demo_user: true,
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("cors_origins", &self.cors_origins)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("jwt_issuer", &self.jwt_issuer)
            .field("token_ttl", &self.token_ttl)
            .field("ramp", &self.ramp)
            .field("admin", &self.admin)
            .field("seed_demo_user", &self.seed_demo_user)
            .finish()
    }
}

impl ApiConfig {
    /// Create a new configuration with the specified bind address.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Self::default()
        }
    }

    /// Add a CORS allowed origin.
    #[must_use]
    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origins.push(origin.into());
        self
    }

    /// Set the JWT signing secret.
    #[must_use]
    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    /// Set the JWT issuer.
    #[must_use]
    pub fn with_jwt_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.jwt_issuer = issuer.into();
        self
    }

    /// Set the session lifetime.
    #[must_use]
    pub const fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Set the ramp desk configuration.
    #[must_use]
    pub fn with_ramp(mut self, ramp: RampConfig) -> Self {
        self.ramp = ramp;
        self
    }

    /// Create an administrator at startup.
    #[must_use]
    pub fn with_admin(mut self, email: impl Into<String>, password: Password) -> Self {
        self.admin = Some(AdminAccount {
            email: email.into(),
            password,
        });
        self
    }

    /// Enable or disable the demo user.
    #[must_use]
    pub const fn with_demo_user(mut self, enabled: bool) -> Self {
        self.seed_demo_user = enabled;
        self
    }

    /// Reject lifetimes and rates the server cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the session lifetime is not between one
    /// second and [`MAX_TOKEN_TTL_HOURS`], or the ramp settings are invalid.
    pub fn validate(&self) -> ApiResult<()> {
        if self.token_ttl <= Duration::zero()
            || self.token_ttl > Duration::hours(MAX_TOKEN_TTL_HOURS)
        {
            return Err(ApiError::Config(format!(
                "token lifetime must be positive and at most {MAX_TOKEN_TTL_HOURS} hours"
            )));
        }
        self.ramp
            .validate()
            .map_err(|e| ApiError::Config(e.to_string()))
    }
}
