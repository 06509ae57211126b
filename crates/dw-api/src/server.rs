//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::routes::create_router;
use crate::state::AppState;

/// HTTP server for the wallet API.
#[derive(Debug, Clone)]
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a server, seeding the configured accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the JWT secret or seed accounts are invalid.
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let state = Arc::new(AppState::new(config)?);
        Ok(Self { state })
    }

    /// Get the shared state.
    #[must_use]
    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Address from the configuration.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.state.config().bind_addr
    }

    /// Start the server and listen for connections.
    ///
    /// This method runs until the server encounters a fatal error.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve(&self, addr: SocketAddr) -> ApiResult<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::BindFailed(addr, e))?;

        info!(addr = %addr, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(())
    }

    /// Start the server with graceful shutdown support.
    ///
    /// The server will shut down when the provided future completes.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve_with_shutdown<F>(&self, addr: SocketAddr, shutdown: F) -> ApiResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::BindFailed(addr, e))?;

        info!(addr = %addr, "API server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        info!("API server shut down");
        Ok(())
    }

    /// Create the router without starting the server.
    pub fn router(&self) -> axum::Router {
        create_router(self.state.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dw_auth::UserFilter;

    fn make_test_server() -> ApiServer {
        ApiServer::new(ApiConfig::default().with_jwt_secret("s".repeat(32))).unwrap()
    }

    #[tokio::test]
    async fn test_server_seeds_demo_user() {
        let server = make_test_server();
        let users = server.state().users().read().await.list(&UserFilter::default());

        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "user@example.com");
    }

    #[test]
    fn test_server_rejects_short_secret() {
        let result = ApiServer::new(ApiConfig::default().with_jwt_secret("short"));
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[test]
    fn test_server_clone_shares_state() {
        let server = make_test_server();
        let cloned = server.clone();

        assert!(Arc::ptr_eq(&server.state(), &cloned.state()));
    }

    #[test]
    fn test_bind_addr_from_config() {
        let addr: SocketAddr = "127.0.0.1:4100".parse().unwrap();
        let server = ApiServer::new(ApiConfig::new(addr).with_jwt_secret("s".repeat(32))).unwrap();

        assert_eq!(server.bind_addr(), addr);
    }

    #[tokio::test]
    async fn test_serve_with_shutdown() {
        let server = make_test_server();
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();

        let result = server.serve_with_shutdown(addr, async {}).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_bind_conflict() {
        let holder = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = holder.local_addr().unwrap();
        let server = make_test_server();

        let result = server.serve_with_shutdown(addr, async {}).await;
        assert!(matches!(result, Err(ApiError::BindFailed(a, _)) if a == addr));
    }
}
