//! DSC Engine - Collateral/Debt Ledger for the DSC stablecoin
//!
//! Users deposit approved collateral tokens and mint DSC against them. Every
//! position must stay at or above a health factor of 1.0, which with a 50%
//! liquidation threshold means 200% collateralization.
//!
//! ## Core Operations
//!
//! - **deposit_collateral**: pull collateral from the caller
//! - **redeem_collateral**: return collateral, if the position stays healthy
//! - **mint_dsc**: borrow DSC against deposited collateral
//! - **burn_dsc**: repay DSC debt
//! - **deposit_and_mint** / **redeem_for_dsc**: the combined forms
//! - **liquidate**: cover an unhealthy user's debt and seize their collateral
//!   at a 10% bonus
//!
//! ## Concurrency
//!
//! The ledger sits behind a single `RwLock`. Mutations hold the write lock
//! for their whole duration, including token calls, so operations are
//! serialized. Of several liquidators racing for one position, the first to
//! restore it wins; the rest fail with `PositionHealthy` and change nothing.

pub mod engine;
pub mod journal;
pub mod ledger;
pub mod liquidation;
pub mod registry;

pub use engine::{DscEngine, EngineParameters};
pub use ledger::UserAccount;
pub use liquidation::LiquidationQuote;
pub use registry::CollateralRegistry;

#[cfg(test)]
mod tests;
