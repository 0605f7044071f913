//! Liquidation quoting
//!
//! A liquidator covering `debt_to_cover` DSC of an unhealthy user receives the
//! collateral equivalent of that debt plus `1 / LIQUIDATION_BONUS` of it as a
//! bonus, all taken from the user's deposited balance.

use serde::{Deserialize, Serialize};

use dsc_common::{
    errors::DscResult,
    math::{liquidation_bonus, safe_add},
    types::{Address, Amount},
};
use dsc_price_oracle::OracleAdapter;

/// Collateral payout for covering a given amount of debt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationQuote {
    /// DSC the liquidator burns
    pub debt_to_cover: Amount,
    /// Collateral worth `debt_to_cover` at the current price, floored
    pub collateral_seized: Amount,
    /// Extra collateral on top of `collateral_seized`
    pub bonus_collateral: Amount,
}

impl LiquidationQuote {
    /// Price `debt_to_cover` in units of `token`
    pub fn new(oracle: &OracleAdapter, token: &Address, debt_to_cover: Amount) -> DscResult<Self> {
        let collateral_seized = oracle.token_amount_from_usd(token, debt_to_cover)?;
        Ok(Self {
            debt_to_cover,
            collateral_seized,
            bonus_collateral: liquidation_bonus(collateral_seized),
        })
    }

    /// Collateral leaving the user's balance
    pub fn total_collateral(&self) -> DscResult<Amount> {
        safe_add(self.collateral_seized, self.bonus_collateral)
    }
}
