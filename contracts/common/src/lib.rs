//! DSC Common Library
//!
//! Shared types, constants, and utilities for the DSC collateral engine.
//! This crate is the foundation every other crate in the workspace builds on.
//!
//! ## Model
//!
//! DSC is an overcollateralized stablecoin kept in an account model:
//! - **Collateral**: users deposit approved tokens, tracked per user and per token
//! - **Debt**: users mint DSC against that collateral, tracked as a single scalar
//! - **Health factor**: risk-adjusted collateral value over minted debt, 18-decimal fixed point
//! - **Liquidation**: anyone may cover an unhealthy user's debt and seize collateral at a bonus
//!
//! ## Contents
//!
//! - **Constants**: protocol parameters (thresholds, precisions, bonus divisor)
//! - **Errors**: the `DscError` taxonomy and collaborator `TokenError`s
//! - **Types**: addresses, amounts, price readings, account aggregates
//! - **Math**: overflow-checked wide multiply-then-divide and the health factor formula
//! - **Events**: commit-time events with borsh and serde encodings
//! - **Interfaces**: the price feed and token capabilities the engine consumes

pub mod constants;
pub mod errors;
pub mod events;
pub mod interfaces;
pub mod math;
pub mod types;

// Re-exports for convenience
pub use constants::*;
pub use errors::*;
pub use events::*;
pub use interfaces::*;
pub use math::*;
pub use types::*;
