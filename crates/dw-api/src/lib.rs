//! # dw-api
//!
//! HTTP API for the Daily Wallet smart-wallet backend.
//!
//! The server keeps users, wallets and ramp orders in memory and is built on
//! axum. Callers authenticate either with a session token from `/auth/login`
//! (`Authorization: Bearer <token>`) or by presenting a connected wallet in the
//! `x-wallet-address` header. A bearer token wins when both are sent.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dw_api::{ApiConfig, ApiServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ApiConfig::default();
//!     let server = ApiServer::new(config)?;
//!     server.serve(server.bind_addr()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/health` | GET | Liveness and uptime |
//! | `/api/openapi.json` | GET | OpenAPI 3.0 description of these routes |
//! | `/auth/login` | POST | Exchange email and password for a token |
//! | `/auth/profile` | GET | Profile of the session user |
//! | `/wallet` | POST | Create a personal or multiparty wallet |
//! | `/wallet` | GET | The caller's wallets |
//! | `/wallet/summary` | GET | Wallet count, total balance, recent activity |
//! | `/wallet/{address}` | GET | One wallet |
//! | `/wallet/{address}/transaction` | POST | Record a pending transaction |
//! | `/wallet/{address}/transactions` | GET | Transaction history |
//! | `/ramp/quote` | POST | Price an on-ramp or off-ramp conversion |
//! | `/ramp/onramp` | POST | Buy crypto with fiat |
//! | `/ramp/offramp` | POST | Sell crypto for fiat |
//! | `/ramp/orders` | GET | The caller's ramp orders |
//! | `/admin/verify` | GET | Confirm admin access |
//! | `/admin/users` | GET | List users |
//! | `/admin/users/{id}/status` | POST | Set or toggle a user's status |
//! | `/admin/users/{id}` | DELETE | Remove a user and their data |
//! | `/admin/wallets` | GET | List every wallet |
//! | `/admin/wallets/{address}/status` | POST | Activate or deactivate a wallet |
//! | `/admin/wallets/{address}` | DELETE | Remove a wallet |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use cli::{Args, LogFormat};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use server::ApiServer;
pub use state::AppState;
