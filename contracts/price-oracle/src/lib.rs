//! Price Oracle Adapter
//!
//! Wraps one price feed per collateral asset and converts between raw token
//! amounts and 18-decimal USD values. Prices are read fresh on every call;
//! nothing is cached.
//!
//! ## Normalization
//!
//! ```text
//! usd    = amount * price * 10^18 / (10^feed_decimals * 10^token_decimals)
//! amount = usd * 10^feed_decimals * 10^token_decimals / (price * 10^18)
//! ```
//!
//! Staleness policy belongs to the feed. The adapter only rejects readings the
//! feed marks invalid and non-positive answers.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use dsc_common::{
    constants::limits::MAX_DECIMALS,
    errors::{DscError, DscResult},
    interfaces::PriceFeed,
    math::{amount_from_usd, value_in_usd},
    types::{short_hex, Address, Amount, PriceReading, U256},
};

pub mod aggregator;

pub use aggregator::{MockAggregator, RoundData};

// ============ Bindings ============

/// Feed bound to one collateral token
#[derive(Clone)]
pub struct PriceBinding {
    /// Price feed for the token
    pub feed: Arc<dyn PriceFeed>,
    /// Decimal precision of the token's raw amounts
    pub token_decimals: u8,
}

impl fmt::Debug for PriceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceBinding")
            .field("feed", &short_hex(&self.feed.address()))
            .field("token_decimals", &self.token_decimals)
            .finish()
    }
}

/// A reading that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidPrice {
    /// Positive answer in `price_decimals` fixed point
    pub price: U256,
    /// Decimals of `price`
    pub price_decimals: u8,
    /// Decimals of the token being priced
    pub token_decimals: u8,
}

// ============ Adapter ============

/// Maps collateral tokens to their price feeds
#[derive(Debug, Clone, Default)]
pub struct OracleAdapter {
    bindings: BTreeMap<Address, PriceBinding>,
}

impl OracleAdapter {
    /// Create an adapter with no bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `token` to `feed`
    ///
    /// # Errors
    /// - `DuplicateAsset` if the token already has a feed
    /// - `UnsupportedDecimals` if the token declares more than `MAX_DECIMALS`
    pub fn bind(
        &mut self,
        token: Address,
        token_decimals: u8,
        feed: Arc<dyn PriceFeed>,
    ) -> DscResult<()> {
        if token_decimals > MAX_DECIMALS {
            return Err(DscError::UnsupportedDecimals {
                decimals: token_decimals,
                maximum: MAX_DECIMALS,
            });
        }
        if self.bindings.contains_key(&token) {
            return Err(DscError::DuplicateAsset { token });
        }

        tracing::debug!(
            token = %short_hex(&token),
            feed = %short_hex(&feed.address()),
            token_decimals,
            "bound price feed"
        );
        self.bindings.insert(token, PriceBinding { feed, token_decimals });
        Ok(())
    }

    /// Number of bound tokens
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True if nothing is bound
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// True if `token` has a feed
    pub fn is_bound(&self, token: &Address) -> bool {
        self.bindings.contains_key(token)
    }

    /// Address of the feed bound to `token`
    pub fn feed_address(&self, token: &Address) -> Option<Address> {
        self.bindings.get(token).map(|binding| binding.feed.address())
    }

    /// Read and validate the current price for `token`
    ///
    /// # Errors
    /// - `UnknownAsset` if no feed is bound
    /// - `StaleOrInvalidPrice` if the feed flags the round or answers `<= 0`
    /// - `UnsupportedDecimals` if the feed reports more than `MAX_DECIMALS`
    pub fn read_price(&self, token: &Address) -> DscResult<ValidPrice> {
        let binding = self
            .bindings
            .get(token)
            .ok_or(DscError::UnknownAsset { token: *token })?;

        let reading = binding.feed.latest_price();
        let (price, price_decimals) = validate_reading(binding.feed.address(), reading)?;

        Ok(ValidPrice {
            price,
            price_decimals,
            token_decimals: binding.token_decimals,
        })
    }

    /// USD value (18 decimals) of `amount` raw units of `token`
    pub fn usd_value(&self, token: &Address, amount: Amount) -> DscResult<Amount> {
        let price = self.read_price(token)?;
        value_in_usd(amount, price.price, price.price_decimals, price.token_decimals)
    }

    /// Raw units of `token` worth `usd_amount` (18 decimals), floored
    pub fn token_amount_from_usd(&self, token: &Address, usd_amount: Amount) -> DscResult<Amount> {
        let price = self.read_price(token)?;
        amount_from_usd(usd_amount, price.price, price.price_decimals, price.token_decimals)
    }
}

// ============ Helper Functions ============

/// Turn a raw feed reading into a positive price
pub fn validate_reading(feed: Address, reading: PriceReading) -> DscResult<(U256, u8)> {
    if !reading.is_valid || reading.answer <= 0 {
        tracing::warn!(
            feed = %short_hex(&feed),
            answer = reading.answer,
            is_valid = reading.is_valid,
            "rejected price reading"
        );
        return Err(DscError::StaleOrInvalidPrice {
            feed,
            answer: reading.answer,
        });
    }
    if reading.decimals > MAX_DECIMALS {
        return Err(DscError::UnsupportedDecimals {
            decimals: reading.decimals,
            maximum: MAX_DECIMALS,
        });
    }

    Ok((U256::from(reading.answer as u128), reading.decimals))
}

// ============ Tests ============
