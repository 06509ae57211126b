//! Command-line argument parsing with clap.

use std::net::SocketAddr;

use chrono::Duration;
use clap::{ArgAction, Parser, ValueEnum};
use dw_auth::Password;
use dw_core::ramp::{DEFAULT_FEE_RATE, DEFAULT_PAYMENT_BASE_URL, DEFAULT_QUOTE_TTL_SECS};
use dw_core::RampConfig;

use crate::config::{ApiConfig, DEFAULT_ISSUER, DEFAULT_TOKEN_TTL_HOURS};
use crate::error::{ApiError, ApiResult};

/// Daily Wallet API server.
#[derive(Parser, Debug, Clone)]
#[command(name = "dailywallet-api")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address to listen on.
    #[arg(short, long, env = "DW_BIND_ADDR", default_value = "0.0.0.0:3001")]
    pub bind: SocketAddr,

    /// HS256 signing secret (at least 32 bytes). Random per process when unset.
    #[arg(long, env = "DW_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Token issuer.
    #[arg(long, env = "DW_JWT_ISSUER", default_value = DEFAULT_ISSUER)]
    pub jwt_issuer: String,

    /// Session lifetime in hours.
    #[arg(long, env = "DW_TOKEN_TTL_HOURS", default_value_t = DEFAULT_TOKEN_TTL_HOURS)]
    pub token_ttl_hours: i64,

    /// Allowed CORS origins (comma-separated). Empty allows any origin.
    #[arg(long, env = "DW_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Fee charged on ramp conversions, as a fraction.
    #[arg(long, env = "DW_FEE_RATE", default_value_t = DEFAULT_FEE_RATE)]
    pub fee_rate: f64,

    /// Quote validity in seconds.
    #[arg(long, env = "DW_QUOTE_TTL_SECS", default_value_t = DEFAULT_QUOTE_TTL_SECS)]
    pub quote_ttl_secs: i64,

    /// Base URL for on-ramp payment links.
    #[arg(long, env = "DW_PAYMENT_BASE_URL", default_value = DEFAULT_PAYMENT_BASE_URL)]
    pub payment_base_url: String,

    /// Email of an administrator created at startup.
    #[arg(long, env = "DW_ADMIN_EMAIL", requires = "admin_password")]
    pub admin_email: Option<String>,

    /// Password of the startup administrator.
    #[arg(long, env = "DW_ADMIN_PASSWORD", hide_env_values = true, requires = "admin_email")]
    pub admin_password: Option<String>,

    /// Seed the demo account (user@example.com).
    #[arg(long, env = "DW_SEED_DEMO_USER", action = ArgAction::Set, default_value_t = true)]
    pub seed_demo_user: bool,

    /// Log output format.
    #[arg(long, env = "DW_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// Log output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[derive(Default)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl Args {
    /// Build the server configuration from parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] for lifetimes out of range or a fee rate
    /// outside `[0, 1)`.
    pub fn into_config(self) -> ApiResult<ApiConfig> {
        let quote_ttl = Duration::try_seconds(self.quote_ttl_secs).ok_or_else(|| {
            ApiError::Config(format!("quote ttl out of range: {}s", self.quote_ttl_secs))
        })?;
        let token_ttl = Duration::try_hours(self.token_ttl_hours).ok_or_else(|| {
            ApiError::Config(format!("token ttl out of range: {}h", self.token_ttl_hours))
        })?;

        let ramp = RampConfig::default()
            .with_fee_rate(self.fee_rate)
            .with_quote_ttl(quote_ttl)
            .with_payment_base_url(self.payment_base_url);

        let mut config = ApiConfig::new(self.bind)
            .with_jwt_issuer(self.jwt_issuer)
            .with_token_ttl(token_ttl)
            .with_ramp(ramp)
            .with_demo_user(self.seed_demo_user);

        if let Some(secret) = self.jwt_secret {
            config = config.with_jwt_secret(secret);
        }
        for origin in self.cors_origins.into_iter().filter(|o| !o.trim().is_empty()) {
            config = config.with_cors_origin(origin.trim());
        }
        if let (Some(email), Some(password)) = (self.admin_email, self.admin_password) {
            config = config.with_admin(email, Password::new(password));
        }
        config.validate()?;
        Ok(config)
    }
}
