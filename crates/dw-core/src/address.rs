//! EVM-style account addresses and transaction hashes.
//!
//! Addresses are stored in lowercase so two spellings of the same account
//! (checksummed or not) compare equal.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use rand::RngCore;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::validation::ValidationError;

/// Regex for a `0x`-prefixed 20-byte hex address.
static ADDRESS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap_or_else(|_| unreachable!()));

/// Expected-format text used in address validation errors.
const ADDRESS_FORMAT: &str = "0x followed by 40 hex characters";

/// A validated EVM account address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EvmAddress(String);

impl EvmAddress {
    /// Parse an address, attributing failures to `field`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the input is not `0x` + 40 hex chars.
    pub fn parse_field(field: &str, input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ValidationError::empty(field));
        }
        if !ADDRESS_REGEX.is_match(input) {
            return Err(ValidationError::invalid_format(field, ADDRESS_FORMAT, input));
        }
        Ok(Self(input.to_ascii_lowercase()))
    }

    /// Parse an address.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the input is not a valid address.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        Self::parse_field("address", input)
    }

    /// Generate a random address.
    ///
    /// Stands in for deploying a smart-contract wallet.
    #[must_use]
    pub fn random() -> Self {
        let mut bytes = [0u8; 20];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// Returns the lowercase address string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form used in log lines, e.g. `0x1234…5678`.
    #[must_use]
    pub fn short(&self) -> String {
        format!("{}…{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for EvmAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EvmAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for EvmAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EvmAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A transaction hash (`0x` + 64 hex chars).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    /// Generate a random hash.
    ///
    /// Stands in for submitting a transaction on chain.
    #[must_use]
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// Returns the hash string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
