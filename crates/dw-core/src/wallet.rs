//! Wallet registry: personal and multiparty wallet records and their
//! transaction history.
//!
//! Wallet addresses and transaction hashes are randomly generated; nothing
//! here talks to a chain. Threshold rules are checked arithmetically only.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::address::{EvmAddress, TxHash};
use crate::error::{Error, Result};
use crate::validation::{self, ValidationError};

/// Maximum length of a wallet name.
pub const MAX_WALLET_NAME_LEN: usize = 64;

/// Number of transactions included in an owner summary.
pub const SUMMARY_TRANSACTION_LIMIT: usize = 10;

/// Balance assigned to freshly created wallets.
const INITIAL_BALANCE: &str = "0.00";

static WEI_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap_or_else(|_| unreachable!()));

static CALLDATA_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x([0-9a-fA-F]{2})*$").unwrap_or_else(|_| unreachable!()));

/// Identifies who owns a wallet.
///
/// For email users this is the user id; for wallet-connected users it is the
/// lowercase connected address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Create an owner id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&EvmAddress> for OwnerId {
    fn from(address: &EvmAddress) -> Self {
        Self(address.as_str().to_string())
    }
}

/// Kind of wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    /// Single signer, threshold fixed at 1.
    Personal,
    /// Several nominal signers and a configurable threshold.
    #[default]
    Multiparty,
}

/// Administrative status of a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletStatus {
    /// Usable.
    #[default]
    Active,
    /// Disabled by an administrator; no new transactions.
    Inactive,
}

/// Request to create a wallet.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWallet {
    /// Display name.
    pub name: String,
    /// Personal or multiparty. Defaults to multiparty.
    #[serde(default, rename = "type")]
    pub kind: WalletKind,
    /// Signer addresses (multiparty only).
    #[serde(default)]
    pub signers: Vec<String>,
    /// Required approvals (multiparty only).
    #[serde(default)]
    pub threshold: Option<u32>,
}

/// A wallet record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    /// Wallet address.
    pub address: EvmAddress,
    /// Display name.
    pub name: String,
    /// Personal or multiparty.
    #[serde(rename = "type")]
    pub kind: WalletKind,
    /// Owner of the record.
    pub owner: OwnerId,
    /// Nominal signer set.
    pub signers: Vec<EvmAddress>,
    /// Approvals required to authorize a transaction.
    pub threshold: u32,
    /// Balance in ETH as a decimal string.
    pub balance: String,
    /// Administrative status.
    pub status: WalletStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Request to create a transaction from a wallet.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    /// Recipient address.
    pub to: String,
    /// Amount in wei, as a decimal integer string.
    pub value: String,
    /// Optional call data (`0x` hex).
    #[serde(default)]
    pub data: Option<String>,
}

/// Lifecycle of a wallet transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Awaiting signatures and submission.
    Pending,
}

/// A transaction recorded against a wallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransaction {
    /// Record id.
    pub id: Uuid,
    /// Transaction hash.
    #[serde(rename = "transactionHash")]
    pub hash: TxHash,
    /// Sending wallet.
    pub wallet: EvmAddress,
    /// Recipient.
    pub to: EvmAddress,
    /// Amount in wei.
    pub value: String,
    /// Call data.
    pub data: Option<String>,
    /// Current status.
    pub status: TransactionStatus,
    /// Approvals needed before submission (the wallet threshold).
    pub required_signatures: u32,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

/// Dashboard summary for one owner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    /// Number of wallets owned.
    pub wallet_count: usize,
    /// Sum of wallet balances, two decimals.
    pub total_balance: String,
    /// Most recent transactions across all wallets, newest first.
    pub recent_transactions: Vec<WalletTransaction>,
}

/// Sort key for the administrative wallet listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletSort {
    /// Creation time.
    #[default]
    #[serde(alias = "createdAt")]
    CreatedAt,
    /// Name, case-insensitive.
    Name,
    /// Number of signers.
    Signers,
    /// Threshold.
    Threshold,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

/// Filter for the administrative wallet listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletFilter {
    /// Case-insensitive match on name, address or owner.
    pub search: Option<String>,
    /// Only wallets with this status.
    pub status: Option<WalletStatus>,
    /// Sort key.
    #[serde(default)]
    pub sort: WalletSort,
    /// Sort direction.
    #[serde(default)]
    pub order: SortOrder,
}

impl WalletFilter {
    fn matches(&self, wallet: &Wallet) -> bool {
        if self.status.is_some_and(|s| s != wallet.status) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                wallet.name.to_lowercase().contains(&term)
                    || wallet.address.as_str().contains(&term)
                    || wallet.owner.as_str().to_lowercase().contains(&term)
            }
        }
    }

    fn compare(&self, a: &Wallet, b: &Wallet) -> Ordering {
        let ordering = match self.sort {
            WalletSort::CreatedAt => a.created_at.cmp(&b.created_at),
            WalletSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            WalletSort::Signers => a.signers.len().cmp(&b.signers.len()),
            WalletSort::Threshold => a.threshold.cmp(&b.threshold),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone)]
struct WalletEntry {
    wallet: Wallet,
    transactions: Vec<WalletTransaction>,
}

/// In-memory registry of wallets grouped by owner.
#[derive(Debug, Default)]
pub struct WalletRegistry {
    owners: HashMap<OwnerId, Vec<WalletEntry>>,
}

impl WalletRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            owners: HashMap::new(),
        }
    }

    /// Create a wallet for `owner`.
    ///
    /// `owner_address` is the caller's connected address, if any. It becomes
    /// the signer of a personal wallet and is appended to a multiparty signer
    /// set when missing.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name, signers or threshold are invalid.
    pub fn create_wallet(
        &mut self,
        owner: &OwnerId,
        owner_address: Option<&EvmAddress>,
        request: NewWallet,
    ) -> Result<Wallet> {
        let name = validation::require_non_empty("name", &request.name)?;
        validation::require_max_len("name", name, MAX_WALLET_NAME_LEN)?;

        let (signers, threshold) = match request.kind {
            WalletKind::Personal => personal_signers(owner_address, &request)?,
            WalletKind::Multiparty => multiparty_signers(owner_address, &request)?,
        };

        let wallet = Wallet {
            address: EvmAddress::random(),
            name: name.to_string(),
            kind: request.kind,
            owner: owner.clone(),
            signers,
            threshold,
            balance: INITIAL_BALANCE.to_string(),
            status: WalletStatus::Active,
            created_at: Utc::now(),
        };

        info!(
            owner = %owner,
            address = %wallet.address,
            kind = ?wallet.kind,
            signers = wallet.signers.len(),
            threshold = wallet.threshold,
            "created wallet"
        );

        self.owners
            .entry(owner.clone())
            .or_default()
            .push(WalletEntry {
                wallet: wallet.clone(),
                transactions: Vec::new(),
            });

        Ok(wallet)
    }

    /// List an owner's wallets in creation order.
    #[must_use]
    pub fn list_wallets(&self, owner: &OwnerId) -> Vec<Wallet> {
        self.owners
            .get(owner)
            .map(|entries| entries.iter().map(|e| e.wallet.clone()).collect())
            .unwrap_or_default()
    }

    /// Get one of an owner's wallets by address (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`Error::WalletNotFound`] if the owner has no such wallet.
    pub fn get_wallet(&self, owner: &OwnerId, address: &str) -> Result<Wallet> {
        self.entry(owner, address).map(|e| e.wallet.clone())
    }

    /// Record a new pending transaction from one of the owner's wallets.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet is unknown or inactive, or if the
    /// recipient, value or call data are malformed.
    pub fn create_transaction(
        &mut self,
        owner: &OwnerId,
        address: &str,
        request: NewTransaction,
    ) -> Result<WalletTransaction> {
        let to = EvmAddress::parse_field("to", &request.to)?;
        let value = parse_wei(&request.value)?;
        let data = parse_calldata(request.data.as_deref())?;

        let entry = self.entry_mut(owner, address)?;
        if entry.wallet.status == WalletStatus::Inactive {
            return Err(Error::WalletInactive {
                address: entry.wallet.address.to_string(),
            });
        }

        let tx = WalletTransaction {
            id: Uuid::new_v4(),
            hash: TxHash::random(),
            wallet: entry.wallet.address.clone(),
            to,
            value,
            data,
            status: TransactionStatus::Pending,
            required_signatures: entry.wallet.threshold,
            timestamp: Utc::now(),
        };

        info!(
            owner = %owner,
            wallet = %tx.wallet,
            hash = %tx.hash,
            required_signatures = tx.required_signatures,
            "created transaction"
        );

        entry.transactions.push(tx.clone());
        Ok(tx)
    }

    /// Transaction history of one of the owner's wallets, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WalletNotFound`] if the owner has no such wallet.
    pub fn list_transactions(
        &self,
        owner: &OwnerId,
        address: &str,
    ) -> Result<Vec<WalletTransaction>> {
        let entry = self.entry(owner, address)?;
        Ok(entry.transactions.iter().rev().cloned().collect())
    }

    /// Dashboard summary for an owner.
    #[must_use]
    pub fn summary(&self, owner: &OwnerId) -> WalletSummary {
        let entries = self.owners.get(owner).map_or(&[][..], Vec::as_slice);

        let total: f64 = entries
            .iter()
            .map(|e| e.wallet.balance.parse::<f64>().unwrap_or(0.0))
            .sum();

        let mut recent: Vec<WalletTransaction> = entries
            .iter()
            .flat_map(|e| e.transactions.iter().cloned())
            .collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(SUMMARY_TRANSACTION_LIMIT);

        WalletSummary {
            wallet_count: entries.len(),
            total_balance: format!("{total:.2}"),
            recent_transactions: recent,
        }
    }

    /// All wallets across owners, filtered and sorted.
    #[must_use]
    pub fn all_wallets(&self, filter: &WalletFilter) -> Vec<Wallet> {
        let mut wallets: Vec<Wallet> = self
            .owners
            .values()
            .flatten()
            .map(|e| &e.wallet)
            .filter(|w| filter.matches(w))
            .cloned()
            .collect();
        wallets.sort_by(|a, b| filter.compare(a, b));
        wallets
    }

    /// Set the status of any wallet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WalletNotFound`] if no owner has that wallet.
    pub fn set_status(&mut self, address: &str, status: WalletStatus) -> Result<Wallet> {
        let wallet = self
            .owners
            .values_mut()
            .flatten()
            .map(|e| &mut e.wallet)
            .find(|w| w.address.as_str().eq_ignore_ascii_case(address.trim()))
            .ok_or_else(|| Error::wallet_not_found(address))?;
        wallet.status = status;
        info!(address = %wallet.address, status = ?status, "wallet status changed");
        Ok(wallet.clone())
    }

    /// Remove any wallet and its history.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WalletNotFound`] if no owner has that wallet.
    pub fn remove(&mut self, address: &str) -> Result<Wallet> {
        for entries in self.owners.values_mut() {
            if let Some(pos) = entries
                .iter()
                .position(|e| e.wallet.address.as_str().eq_ignore_ascii_case(address.trim()))
            {
                let removed = entries.remove(pos);
                info!(address = %removed.wallet.address, "wallet removed");
                return Ok(removed.wallet);
            }
        }
        Err(Error::wallet_not_found(address))
    }

    /// Remove every wallet belonging to `owner`, returning how many were removed.
    pub fn remove_owner(&mut self, owner: &OwnerId) -> usize {
        let removed = self.owners.remove(owner).map_or(0, |entries| entries.len());
        debug!(owner = %owner, removed, "removed owner wallets");
        removed
    }

    /// Total number of wallets across owners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.values().map(Vec::len).sum()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of wallets owned by `owner`.
    #[must_use]
    pub fn count_for(&self, owner: &OwnerId) -> usize {
        self.owners.get(owner).map_or(0, Vec::len)
    }

    fn entry(&self, owner: &OwnerId, address: &str) -> Result<&WalletEntry> {
        let needle = address.trim();
        self.owners
            .get(owner)
            .and_then(|entries| {
                entries
                    .iter()
                    .find(|e| e.wallet.address.as_str().eq_ignore_ascii_case(needle))
            })
            .ok_or_else(|| Error::wallet_not_found(needle))
    }

    fn entry_mut(&mut self, owner: &OwnerId, address: &str) -> Result<&mut WalletEntry> {
        let needle = address.trim();
        self.owners
            .get_mut(owner)
            .and_then(|entries| {
                entries
                    .iter_mut()
                    .find(|e| e.wallet.address.as_str().eq_ignore_ascii_case(needle))
            })
            .ok_or_else(|| Error::wallet_not_found(needle))
    }
}

fn parse_signers(raw: &[String]) -> std::result::Result<Vec<EvmAddress>, ValidationError> {
    let mut signers: Vec<EvmAddress> = Vec::with_capacity(raw.len() + 1);
    for (i, input) in raw.iter().enumerate() {
        let signer = EvmAddress::parse_field(&format!("signers[{i}]"), input)?;
        if signers.contains(&signer) {
            return Err(ValidationError::duplicate("signers", signer.as_str()));
        }
        signers.push(signer);
    }
    Ok(signers)
}

fn personal_signers(
    owner_address: Option<&EvmAddress>,
    request: &NewWallet,
) -> std::result::Result<(Vec<EvmAddress>, u32), ValidationError> {
    if let Some(threshold) = request.threshold.filter(|t| *t != 1) {
        return Err(ValidationError::invalid_threshold(threshold, 1));
    }

    let supplied = parse_signers(&request.signers)?;
    if let Some(extra) = supplied.iter().find(|s| Some(*s) != owner_address) {
        return Err(ValidationError::invalid_format(
            "signers",
            "no signers other than the owner on a personal wallet",
            extra.as_str(),
        ));
    }

    Ok((owner_address.cloned().into_iter().collect(), 1))
}

fn multiparty_signers(
    owner_address: Option<&EvmAddress>,
    request: &NewWallet,
) -> std::result::Result<(Vec<EvmAddress>, u32), ValidationError> {
    let mut signers = parse_signers(&request.signers)?;
    if signers.is_empty() {
        return Err(ValidationError::empty("signers"));
    }
    if let Some(owner) = owner_address {
        if !signers.contains(owner) {
            signers.push(owner.clone());
        }
    }

    let threshold = request
        .threshold
        .ok_or_else(|| ValidationError::empty("threshold"))?;
    if threshold == 0 || threshold as usize > signers.len() {
        return Err(ValidationError::invalid_threshold(threshold, signers.len()));
    }

    Ok((signers, threshold))
}

fn parse_wei(raw: &str) -> std::result::Result<String, ValidationError> {
    let value = validation::require_non_empty("value", raw)?;
    if !WEI_REGEX.is_match(value) || value.parse::<u128>().is_err() {
        return Err(ValidationError::invalid_format(
            "value",
            "a non-negative integer amount in wei",
            value,
        ));
    }
    Ok(value.to_string())
}

fn parse_calldata(raw: Option<&str>) -> std::result::Result<Option<String>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(data) if CALLDATA_REGEX.is_match(data) => Ok(Some(data.to_ascii_lowercase())),
        Some(data) => Err(ValidationError::invalid_format(
            "data",
            "0x followed by an even number of hex characters",
            data,
        )),
    }
}
