//! Fiat/crypto conversion: quotes and on-ramp / off-ramp orders.
//!
//! Rates come from a fixed [`RateTable`]; no market data or payment provider
//! is contacted. Orders are kept in memory so callers can list their receipts.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::address::EvmAddress;
use crate::error::{Error, Result};
use crate::validation;
use crate::wallet::OwnerId;

/// Default fee charged on every conversion.
pub const DEFAULT_FEE_RATE: f64 = 0.03;

/// Default quote validity, in seconds.
pub const DEFAULT_QUOTE_TTL_SECS: i64 = 15 * 60;

/// Longest quote validity accepted by [`RampConfig::validate`], in seconds.
pub const MAX_QUOTE_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Default payment page base URL for on-ramp orders.
pub const DEFAULT_PAYMENT_BASE_URL: &str = "https://example-onramp-provider.com/pay";

/// Minimum fiat amount for quotes and on-ramp orders.
pub const MIN_FIAT_AMOUNT: f64 = 1.0;

/// Minimum crypto amount for off-ramp orders.
pub const MIN_CRYPTO_AMOUNT: f64 = 0.01;

static ASSET_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]+$").unwrap_or_else(|_| unreachable!()));

const ASSET_FORMAT: &str = "uppercase letters and digits";

/// Supported fiat currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FiatCurrency {
    /// US dollar.
    Usd,
    /// Euro.
    Eur,
    /// Pound sterling.
    Gbp,
}

/// How an on-ramp order is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit card.
    CreditCard,
    /// Debit card.
    DebitCard,
    /// Bank transfer.
    BankTransfer,
}

/// Conversion direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RampType {
    /// Fiat to crypto.
    OnRamp,
    /// Crypto to fiat.
    OffRamp,
}

/// Lifecycle of a ramp order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Waiting on payment or payout.
    Pending,
}

/// Fixed conversion rates.
#[derive(Debug, Clone)]
pub struct RateTable {
    crypto_per_fiat: HashMap<String, f64>,
    usd_per_crypto: HashMap<String, f64>,
    fx_from_usd: HashMap<FiatCurrency, f64>,
    fallback_crypto_per_fiat: f64,
    fallback_usd_per_crypto: f64,
}

impl Default for RateTable {
    fn default() -> Self {
        let crypto_per_fiat = [("ETH", 0.0003), ("BTC", 0.000_02), ("USDC", 1.0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let usd_per_crypto = [("ETH", 3333.0), ("BTC", 50_000.0), ("USDC", 1.0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let fx_from_usd = [
            (FiatCurrency::Usd, 1.0),
            (FiatCurrency::Eur, 0.85),
            (FiatCurrency::Gbp, 0.75),
        ]
        .into_iter()
        .collect();

        Self {
            crypto_per_fiat,
            usd_per_crypto,
            fx_from_usd,
            fallback_crypto_per_fiat: 0.0001,
            fallback_usd_per_crypto: 1000.0,
        }
    }
}

impl RateTable {
    /// Set the amount of `asset` bought by one unit of fiat.
    #[must_use]
    pub fn with_crypto_per_fiat(mut self, asset: impl Into<String>, rate: f64) -> Self {
        self.crypto_per_fiat.insert(asset.into(), rate);
        self
    }

    /// Set the USD value of one unit of `asset`.
    #[must_use]
    pub fn with_usd_per_crypto(mut self, asset: impl Into<String>, rate: f64) -> Self {
        self.usd_per_crypto.insert(asset.into(), rate);
        self
    }

    /// Crypto received for `fiat_amount`. The fiat currency is not considered.
    #[must_use]
    pub fn crypto_for_fiat(&self, fiat_amount: f64, asset: &str) -> f64 {
        let rate = self
            .crypto_per_fiat
            .get(asset)
            .copied()
            .unwrap_or(self.fallback_crypto_per_fiat);
        fiat_amount * rate
    }

    /// Fiat received for `crypto_amount`, converted from USD into `currency`.
    #[must_use]
    pub fn fiat_for_crypto(&self, crypto_amount: f64, asset: &str, currency: FiatCurrency) -> f64 {
        let usd = self
            .usd_per_crypto
            .get(asset)
            .copied()
            .unwrap_or(self.fallback_usd_per_crypto);
        let fx = self.fx_from_usd.get(&currency).copied().unwrap_or(1.0);
        crypto_amount * usd * fx
    }
}

/// Ramp desk configuration.
#[derive(Debug, Clone)]
pub struct RampConfig {
    /// Fraction of the converted amount charged as a fee.
    pub fee_rate: f64,
    /// How long quotes stay valid.
    pub quote_ttl: Duration,
    /// Base of the payment page URL returned for on-ramp orders.
    pub payment_base_url: String,
    /// Conversion rates.
    pub rates: RateTable,
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            fee_rate: DEFAULT_FEE_RATE,
            quote_ttl: Duration::seconds(DEFAULT_QUOTE_TTL_SECS),
            payment_base_url: DEFAULT_PAYMENT_BASE_URL.to_string(),
            rates: RateTable::default(),
        }
    }
}

impl RampConfig {
    /// Set the fee rate.
    #[must_use]
    pub fn with_fee_rate(mut self, fee_rate: f64) -> Self {
        self.fee_rate = fee_rate;
        self
    }

    /// Set the quote validity.
    #[must_use]
    pub fn with_quote_ttl(mut self, ttl: Duration) -> Self {
        self.quote_ttl = ttl;
        self
    }

    /// Set the payment page base URL.
    #[must_use]
    pub fn with_payment_base_url(mut self, url: impl Into<String>) -> Self {
        self.payment_base_url = url.into();
        self
    }

    /// Replace the rate table.
    #[must_use]
    pub fn with_rates(mut self, rates: RateTable) -> Self {
        self.rates = rates;
        self
    }

    /// Check that the fee rate and quote validity are usable.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the fee rate is not a finite fraction in
    /// `[0, 1)` or the quote validity is not between one second and
    /// [`MAX_QUOTE_TTL_SECS`].
    pub fn validate(&self) -> std::result::Result<(), validation::ValidationError> {
        if !(0.0..1.0).contains(&self.fee_rate) {
            return Err(validation::ValidationError::invalid_format(
                "feeRate",
                "a fraction in [0, 1)",
                self.fee_rate.to_string(),
            ));
        }
        let secs = self.quote_ttl.num_seconds();
        if !(1..=MAX_QUOTE_TTL_SECS).contains(&secs) {
            return Err(validation::ValidationError::invalid_format(
                "quoteTtl",
                format!("between 1 and {MAX_QUOTE_TTL_SECS} seconds"),
                secs.to_string(),
            ));
        }
        Ok(())
    }
}

/// Request for a conversion quote.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Conversion direction.
    #[serde(rename = "type")]
    pub ramp_type: RampType,
    /// Fiat amount (on-ramp) or crypto amount (off-ramp).
    pub amount: f64,
    /// Fiat side of the conversion.
    pub fiat_currency: FiatCurrency,
    /// Crypto asset symbol.
    pub crypto_asset: String,
}

/// On-ramp quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnRampQuote {
    /// Fiat paid before fees.
    pub fiat_amount: f64,
    /// Crypto received.
    pub crypto_amount: f64,
    /// Fee in fiat.
    pub fee: f64,
    /// Fiat paid including the fee.
    pub total_fiat_amount: f64,
    /// Crypto per unit of fiat.
    pub rate: f64,
    /// When the quote stops being valid.
    pub expires_at: DateTime<Utc>,
}

/// Off-ramp quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffRampQuote {
    /// Crypto sold.
    pub crypto_amount: f64,
    /// Fiat value before fees.
    pub fiat_amount: f64,
    /// Fee in fiat.
    pub fee: f64,
    /// Fiat paid out after the fee.
    pub net_fiat_amount: f64,
    /// Fiat per unit of crypto.
    pub rate: f64,
    /// When the quote stops being valid.
    pub expires_at: DateTime<Utc>,
}

/// A quote in either direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Quote {
    /// Fiat to crypto.
    OnRamp(OnRampQuote),
    /// Crypto to fiat.
    OffRamp(OffRampQuote),
}

/// Request to buy crypto with fiat.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnRampRequest {
    /// Fiat amount.
    pub amount: f64,
    /// Fiat currency.
    pub fiat_currency: FiatCurrency,
    /// Crypto asset symbol.
    pub crypto_asset: String,
    /// Destination wallet.
    pub wallet_address: String,
    /// Payment method.
    pub payment_method: PaymentMethod,
}

/// Request to sell crypto for fiat.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffRampRequest {
    /// Crypto amount.
    pub amount: f64,
    /// Crypto asset symbol.
    pub crypto_asset: String,
    /// Payout bank account.
    pub bank_account_id: String,
    /// Payout currency.
    pub fiat_currency: FiatCurrency,
}

/// A pending on-ramp order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnRampOrder {
    /// Order id, `onramp-<uuid>`.
    pub id: String,
    /// Order status.
    pub status: OrderStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Requesting user.
    pub user_id: OwnerId,
    /// Fiat amount.
    pub amount: f64,
    /// Fiat currency.
    pub fiat_currency: FiatCurrency,
    /// Crypto asset symbol.
    pub crypto_asset: String,
    /// Destination wallet.
    pub wallet_address: EvmAddress,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Crypto expected at the fixed rate.
    pub estimated_crypto_amount: f64,
    /// Fee in fiat.
    pub fee: f64,
    /// Fiat charged including the fee.
    pub total_fiat_amount: f64,
    /// Where the user completes payment.
    pub payment_url: String,
}

/// A pending off-ramp order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffRampOrder {
    /// Order id, `offramp-<uuid>`.
    pub id: String,
    /// Order status.
    pub status: OrderStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Requesting user.
    pub user_id: OwnerId,
    /// Crypto amount.
    pub amount: f64,
    /// Crypto asset symbol.
    pub crypto_asset: String,
    /// Payout bank account.
    pub bank_account_id: String,
    /// Payout currency.
    pub fiat_currency: FiatCurrency,
    /// Fiat value before fees.
    pub estimated_fiat_amount: f64,
    /// Fee in fiat.
    pub fee: f64,
    /// Fiat paid out after the fee.
    pub net_fiat_amount: f64,
    /// Expected payout date.
    pub estimated_arrival: DateTime<Utc>,
}

/// A recorded ramp order of either kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RampOrder {
    /// Fiat to crypto.
    OnRamp(OnRampOrder),
    /// Crypto to fiat.
    OffRamp(OffRampOrder),
}

impl RampOrder {
    /// Order id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::OnRamp(o) => &o.id,
            Self::OffRamp(o) => &o.id,
        }
    }

    /// Requesting user.
    #[must_use]
    pub fn user_id(&self) -> &OwnerId {
        match self {
            Self::OnRamp(o) => &o.user_id,
            Self::OffRamp(o) => &o.user_id,
        }
    }
}

/// Payout date for an off-ramp order created at `now`.
///
/// Two days out, pushed to Tuesday for orders placed on Friday or Saturday.
#[must_use]
pub fn estimated_arrival(now: DateTime<Utc>) -> DateTime<Utc> {
    let days = match now.weekday() {
        Weekday::Fri => 4,
        Weekday::Sat => 3,
        _ => 2,
    };
    now + Duration::days(days)
}

/// Quotes conversions and records orders.
#[derive(Debug, Default)]
pub struct RampDesk {
    config: RampConfig,
    orders: Vec<RampOrder>,
}

impl RampDesk {
    /// Create a desk with the given configuration.
    #[must_use]
    pub fn new(config: RampConfig) -> Self {
        Self {
            config,
            orders: Vec::new(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &RampConfig {
        &self.config
    }

    /// Quote a conversion as of `now`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the amount is below 1 or the asset is
    /// empty, and [`Error::ExpiryOutOfRange`] if the configured validity
    /// pushes the expiry past the representable calendar.
    pub fn quote(&self, request: &QuoteRequest, now: DateTime<Utc>) -> Result<Quote> {
        validation::require_min("amount", request.amount, MIN_FIAT_AMOUNT)?;
        let asset = validation::require_non_empty("cryptoAsset", &request.crypto_asset)?;
        let expires_at = now
            .checked_add_signed(self.config.quote_ttl)
            .ok_or(Error::ExpiryOutOfRange)?;
        let rates = &self.config.rates;

        let quote = match request.ramp_type {
            RampType::OnRamp => {
                let crypto_amount = rates.crypto_for_fiat(request.amount, asset);
                let fee = request.amount * self.config.fee_rate;
                Quote::OnRamp(OnRampQuote {
                    fiat_amount: request.amount,
                    crypto_amount,
                    fee,
                    total_fiat_amount: request.amount + fee,
                    rate: crypto_amount / request.amount,
                    expires_at,
                })
            }
            RampType::OffRamp => {
                let fiat_amount =
                    rates.fiat_for_crypto(request.amount, asset, request.fiat_currency);
                let fee = fiat_amount * self.config.fee_rate;
                Quote::OffRamp(OffRampQuote {
                    crypto_amount: request.amount,
                    fiat_amount,
                    fee,
                    net_fiat_amount: fiat_amount - fee,
                    rate: fiat_amount / request.amount,
                    expires_at,
                })
            }
        };
        Ok(quote)
    }

    /// Record an on-ramp order for `user`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an amount below 1, a malformed asset
    /// symbol or an invalid wallet address.
    pub fn create_on_ramp(
        &mut self,
        user: &OwnerId,
        request: OnRampRequest,
        now: DateTime<Utc>,
    ) -> Result<OnRampOrder> {
        validation::require_min("amount", request.amount, MIN_FIAT_AMOUNT)?;
        let asset = parse_asset(&request.crypto_asset)?;
        let wallet_address = EvmAddress::parse_field("walletAddress", &request.wallet_address)?;

        let id = format!("onramp-{}", Uuid::new_v4().simple());
        let fee = request.amount * self.config.fee_rate;
        let order = OnRampOrder {
            payment_url: format!(
                "{}/{id}",
                self.config.payment_base_url.trim_end_matches('/')
            ),
            id,
            status: OrderStatus::Pending,
            created_at: now,
            user_id: user.clone(),
            amount: request.amount,
            fiat_currency: request.fiat_currency,
            estimated_crypto_amount: self.config.rates.crypto_for_fiat(request.amount, &asset),
            crypto_asset: asset,
            wallet_address,
            payment_method: request.payment_method,
            fee,
            total_fiat_amount: request.amount + fee,
        };

        info!(
            user = %user,
            order = %order.id,
            asset = %order.crypto_asset,
            wallet = %order.wallet_address.short(),
            "created on-ramp order"
        );
        self.orders.push(RampOrder::OnRamp(order.clone()));
        Ok(order)
    }

    /// Record an off-ramp order for `user`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an amount below 0.01, a malformed asset
    /// symbol or an empty bank account id.
    pub fn create_off_ramp(
        &mut self,
        user: &OwnerId,
        request: OffRampRequest,
        now: DateTime<Utc>,
    ) -> Result<OffRampOrder> {
        validation::require_min("amount", request.amount, MIN_CRYPTO_AMOUNT)?;
        let asset = parse_asset(&request.crypto_asset)?;
        let bank_account_id =
            validation::require_non_empty("bankAccountId", &request.bank_account_id)?.to_string();

        let estimated_fiat_amount =
            self.config
                .rates
                .fiat_for_crypto(request.amount, &asset, request.fiat_currency);
        let fee = estimated_fiat_amount * self.config.fee_rate;
        let order = OffRampOrder {
            id: format!("offramp-{}", Uuid::new_v4().simple()),
            status: OrderStatus::Pending,
            created_at: now,
            user_id: user.clone(),
            amount: request.amount,
            crypto_asset: asset,
            bank_account_id,
            fiat_currency: request.fiat_currency,
            estimated_fiat_amount,
            fee,
            net_fiat_amount: estimated_fiat_amount - fee,
            estimated_arrival: estimated_arrival(now),
        };

        info!(
            user = %user,
            order = %order.id,
            asset = %order.crypto_asset,
            "created off-ramp order"
        );
        self.orders.push(RampOrder::OffRamp(order.clone()));
        Ok(order)
    }

    /// Orders placed by `user`, newest first.
    #[must_use]
    pub fn orders(&self, user: &OwnerId) -> Vec<RampOrder> {
        self.orders
            .iter()
            .rev()
            .filter(|o| o.user_id() == user)
            .cloned()
            .collect()
    }

    /// Drop every order placed by `user`, returning how many were removed.
    pub fn remove_user(&mut self, user: &OwnerId) -> usize {
        let before = self.orders.len();
        self.orders.retain(|o| o.user_id() != user);
        before - self.orders.len()
    }
}

fn parse_asset(raw: &str) -> std::result::Result<String, validation::ValidationError> {
    let asset = validation::require_non_empty("cryptoAsset", raw)?;
    validation::require_pattern("cryptoAsset", asset, &ASSET_REGEX, ASSET_FORMAT)?;
    Ok(asset.to_string())
}
