//! Domain model for the Daily Wallet backend.
//!
//! This crate provides:
//! - [`address`]: validated EVM addresses and transaction hashes
//! - [`validation`]: field-level validation errors and checks
//! - [`wallet`]: personal and multiparty wallets and their transactions
//! - [`ramp`]: fiat/crypto quotes and on-ramp / off-ramp orders
//!
//! Everything is held in memory. Addresses and hashes are randomly generated
//! and rates come from a fixed table.
//!
//! # Example
//!
//! ```rust
//! use dw_core::{NewWallet, OwnerId, WalletKind, WalletRegistry};
//!
//! let mut registry = WalletRegistry::new();
//! let owner = OwnerId::new("1");
//! let wallet = registry
//!     .create_wallet(
//!         &owner,
//!         None,
//!         NewWallet {
//!             name: "Savings".to_string(),
//!             kind: WalletKind::Personal,
//!             signers: Vec::new(),
//!             threshold: None,
//!         },
//!     )
//!     .unwrap();
//! assert_eq!(wallet.threshold, 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod error;
pub mod ramp;
pub mod validation;
pub mod wallet;

pub use address::{EvmAddress, TxHash};
pub use error::{Error, Result};
pub use ramp::{
    FiatCurrency, OffRampOrder, OffRampQuote, OffRampRequest, OnRampOrder, OnRampQuote,
    OnRampRequest, OrderStatus, PaymentMethod, Quote, QuoteRequest, RampConfig, RampDesk,
    RampOrder, RampType, RateTable,
};
pub use validation::{ValidationError, ValidationErrorKind};
pub use wallet::{
    NewTransaction, NewWallet, OwnerId, SortOrder, TransactionStatus, Wallet, WalletFilter,
    WalletKind, WalletRegistry, WalletSort, WalletStatus, WalletSummary, WalletTransaction,
};
