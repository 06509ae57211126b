//! Shared state for the API server.

use std::time::Instant;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use dw_auth::{
    JwtConfig, JwtManager, NewUser, Password, Principal, Role, UserDirectory, UserId,
    WALLET_ADDRESS_HEADER,
};
use dw_core::{RampDesk, WalletRegistry};
use rand::RngCore;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::{ApiConfig, DEMO_USER_EMAIL, DEMO_USER_PASSWORD};
use crate::error::{ApiError, ApiResult};

/// Length of the signing secret generated when none is configured.
const GENERATED_SECRET_LEN: usize = 64;

/// Id of the seeded demo user.
const DEMO_USER_ID: &str = "1";

/// Shared state for the API server.
///
/// Lock order when more than one store is needed: users, then wallets, then ramp.
#[derive(Debug)]
pub struct AppState {
    config: ApiConfig,
    jwt: JwtManager,
    users: RwLock<UserDirectory>,
    wallets: RwLock<WalletRegistry>,
    ramp: RwLock<RampDesk>,
    start_time: Instant,
}

impl AppState {
    /// Build the state: signing keys, stores and seeded accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails [`ApiConfig::validate`],
    /// the JWT secret is too short or a seeded account is invalid.
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        config.validate()?;
        let jwt = JwtManager::new(jwt_config(&config)?);
        let users = seed_users(&config)?;
        let ramp = RampDesk::new(config.ramp.clone());

        Ok(Self {
            config,
            jwt,
            users: RwLock::new(users),
            wallets: RwLock::new(WalletRegistry::new()),
            ramp: RwLock::new(ramp),
            start_time: Instant::now(),
        })
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Session token issuer.
    #[must_use]
    pub fn jwt(&self) -> &JwtManager {
        &self.jwt
    }

    /// User accounts.
    #[must_use]
    pub fn users(&self) -> &RwLock<UserDirectory> {
        &self.users
    }

    /// Wallet records.
    #[must_use]
    pub fn wallets(&self) -> &RwLock<WalletRegistry> {
        &self.wallets
    }

    /// Ramp orders.
    #[must_use]
    pub fn ramp(&self) -> &RwLock<RampDesk> {
        &self.ramp
    }

    /// Get server uptime in seconds.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Identify the caller of a request from its headers.
    ///
    /// # Errors
    ///
    /// Returns 401 for missing or invalid credentials and 403 for disabled accounts.
    pub async fn authenticate(&self, headers: &HeaderMap) -> ApiResult<Principal> {
        let authorization = header_str(headers, AUTHORIZATION.as_str());
        let wallet = header_str(headers, WALLET_ADDRESS_HEADER);
        let users = self.users.read().await;
        dw_auth::authenticate_request(authorization, wallet, &self.jwt, &users)
            .map_err(ApiError::from_auth_failure)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn jwt_config(config: &ApiConfig) -> ApiResult<JwtConfig> {
    let jwt = match &config.jwt_secret {
        Some(secret) => JwtConfig::new_hs256(secret.as_bytes(), &config.jwt_issuer),
        None => {
            warn!("no JWT secret configured, generated one for this process; sessions will not survive a restart");
            let mut secret = [0u8; GENERATED_SECRET_LEN];
            rand::thread_rng().fill_bytes(&mut secret);
            JwtConfig::new_hs256(secret, &config.jwt_issuer)
        }
    }
    .map_err(|e| ApiError::Config(e.to_string()))?;

    Ok(jwt.with_default_expiry(config.token_ttl))
}

fn seed_users(config: &ApiConfig) -> ApiResult<UserDirectory> {
    let mut users = UserDirectory::new();

    if config.seed_demo_user {
        let id = UserId::from_string(DEMO_USER_ID).map_err(|e| ApiError::Config(e.to_string()))?;
        users
            .add_user_with_id(
                id,
                NewUser::new(DEMO_USER_EMAIL, "Demo User", Password::new(DEMO_USER_PASSWORD)),
            )
            .map_err(|e| ApiError::Config(format!("demo user: {e}")))?;
        info!(email = DEMO_USER_EMAIL, "seeded demo user");
    }

    if let Some(admin) = &config.admin {
        users
            .add_user(
                NewUser::new(admin.email.clone(), "Administrator", admin.password.clone())
                    .with_role(Role::Admin),
            )
            .map_err(|e| ApiError::Config(format!("admin account: {e}")))?;
        info!(email = %admin.email, "seeded administrator");
    }

    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn test_config() -> ApiConfig {
        ApiConfig::default().with_jwt_secret("k".repeat(32))
    }

    #[tokio::test]
    async fn test_state_seeds_demo_user() {
        let state = AppState::new(test_config()).unwrap();
        let users = state.users().read().await;

        assert_eq!(users.len(), 1);
        let demo = users.find_by_email(DEMO_USER_EMAIL).unwrap();
        assert_eq!(demo.id.as_str(), "1");
    }

    #[tokio::test]
    async fn test_state_seeds_admin() {
        let config = test_config()
            .with_demo_user(false)
            .with_admin("admin@example.com", Password::new("adminpass1"));
        let state = AppState::new(config).unwrap();
        let users = state.users().read().await;

        assert_eq!(users.len(), 1);
        assert_eq!(
            users.find_by_email("admin@example.com").unwrap().role,
            Role::Admin
        );
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let config = ApiConfig::default().with_jwt_secret("short");
        assert!(matches!(AppState::new(config), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_bad_admin_password_is_rejected() {
        let config = test_config().with_admin("admin@example.com", Password::new("short"));
        assert!(matches!(AppState::new(config), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_unusable_lifetimes_are_rejected() {
        let token = test_config().with_token_ttl(chrono::Duration::MAX);
        assert!(matches!(AppState::new(token), Err(ApiError::Config(_))));

        let quote = test_config().with_ramp(
            dw_core::RampConfig::default().with_quote_ttl(chrono::Duration::seconds(-1)),
        );
        assert!(matches!(AppState::new(quote), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_generated_secret() {
        let state = AppState::new(ApiConfig::default()).unwrap();
        assert_eq!(state.jwt().config().issuer(), "dailywallet");
    }

    #[tokio::test]
    async fn test_authenticate_headers() {
        let state = AppState::new(test_config()).unwrap();

        let mut headers = HeaderMap::new();
        assert!(matches!(
            state.authenticate(&headers).await,
            Err(ApiError::Unauthorized(_))
        ));

        headers.insert(
            WALLET_ADDRESS_HEADER,
            HeaderValue::from_static("0x71C7656EC7ab88b098defB751B7401B5f6d8976F"),
        );
        let principal = state.authenticate(&headers).await.unwrap();
        assert!(principal.wallet_address().is_some());
    }
}
