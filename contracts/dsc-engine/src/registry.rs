//! Collateral Registry
//!
//! The approved collateral set, fixed at engine construction. Each asset is
//! bound to exactly one price feed; registration order is preserved.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use dsc_common::{
    errors::{DscError, DscResult},
    interfaces::{FungibleToken, PriceFeed},
    types::{short_hex, Address},
};
use dsc_price_oracle::OracleAdapter;

/// Immutable set of collateral tokens and their price feeds
#[derive(Clone)]
pub struct CollateralRegistry {
    tokens: Vec<Arc<dyn FungibleToken>>,
    index: BTreeMap<Address, usize>,
    oracle: OracleAdapter,
}

impl CollateralRegistry {
    /// Pair `collateral_tokens[i]` with `price_feeds[i]`
    ///
    /// # Errors
    /// - `AssetOracleLengthMismatch` if the lists differ in length
    /// - `DuplicateAsset` if a token appears twice
    /// - `UnsupportedDecimals` if a token declares too many decimals
    pub fn new(
        collateral_tokens: Vec<Arc<dyn FungibleToken>>,
        price_feeds: Vec<Arc<dyn PriceFeed>>,
    ) -> DscResult<Self> {
        if collateral_tokens.len() != price_feeds.len() {
            return Err(DscError::AssetOracleLengthMismatch {
                assets: collateral_tokens.len(),
                oracles: price_feeds.len(),
            });
        }

        let mut index = BTreeMap::new();
        let mut oracle = OracleAdapter::new();
        for (position, (token, feed)) in collateral_tokens.iter().zip(price_feeds).enumerate() {
            let address = token.address();
            oracle.bind(address, token.decimals(), feed)?;
            index.insert(address, position);
        }

        Ok(Self {
            tokens: collateral_tokens,
            index,
            oracle,
        })
    }

    /// Token addresses in registration order
    pub fn addresses(&self) -> Vec<Address> {
        self.tokens.iter().map(|token| token.address()).collect()
    }

    /// Registered tokens in registration order
    pub fn tokens(&self) -> impl Iterator<Item = &Arc<dyn FungibleToken>> {
        self.tokens.iter()
    }

    /// Look up a registered token, failing with `UnsupportedAsset`
    pub fn token(&self, token: &Address) -> DscResult<&Arc<dyn FungibleToken>> {
        self.index
            .get(token)
            .map(|&position| &self.tokens[position])
            .ok_or(DscError::UnsupportedAsset { token: *token })
    }

    /// Feed bound to `token`
    pub fn price_feed(&self, token: &Address) -> Option<Address> {
        self.oracle.feed_address(token)
    }

    pub fn oracle(&self) -> &OracleAdapter {
        &self.oracle
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Debug for CollateralRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollateralRegistry")
            .field(
                "tokens",
                &self.tokens.iter().map(|t| short_hex(&t.address())).collect::<Vec<_>>(),
            )
            .field("oracle", &self.oracle)
            .finish()
    }
}
