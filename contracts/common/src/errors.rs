//! Error Types for the DSC engine
//!
//! Every failure aborts the whole operation and leaves no partial state
//! behind, so each variant only needs to say *why* the operation failed.

use thiserror::Error;

use crate::types::{Address, Amount};

/// Result type alias for engine operations
pub type DscResult<T> = Result<T, DscError>;

/// Result type alias for token collaborator calls
pub type TokenResult<T> = Result<T, TokenError>;

/// Main error enum for the engine and the oracle adapter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DscError {
    // ============ Amount Errors ============
    /// Zero amount not allowed
    #[error("amount must be more than zero")]
    ZeroAmount,

    /// Collateral balance too small for the requested withdrawal or seizure
    #[error("insufficient collateral balance: available {available}, requested {requested}")]
    InsufficientBalance { available: Amount, requested: Amount },

    /// Burning more debt than was minted
    #[error("insufficient debt: minted {minted}, requested {requested}")]
    InsufficientDebt { minted: Amount, requested: Amount },

    // ============ Asset Errors ============
    /// Token is not an approved collateral asset
    #[error("token not supported: 0x{}", hex::encode(token))]
    UnsupportedAsset { token: Address },

    /// Oracle adapter has no binding for this token
    #[error("no price feed bound for token 0x{}", hex::encode(token))]
    UnknownAsset { token: Address },

    // ============ Solvency Errors ============
    /// Operation would leave the user below the minimum health factor
    #[error("health factor broken: {health_factor}")]
    HealthFactorBroken { health_factor: Amount },

    /// Target of a liquidation is not below the minimum health factor
    #[error("health factor is good: {health_factor}")]
    PositionHealthy { health_factor: Amount },

    /// Liquidation did not raise the target's health factor
    #[error("liquidation did not improve health factor: {starting} -> {ending}")]
    LiquidationDidNotImprovePosition { starting: Amount, ending: Amount },

    // ============ Collaborator Errors ============
    /// A token collaborator rejected a transfer, mint or burn
    #[error("transfer failed on token 0x{}: {source}", hex::encode(token))]
    TransferFailed {
        token: Address,
        #[source]
        source: TokenError,
    },

    /// A price feed reported an invalid or non-positive answer
    #[error("stale or invalid price from feed 0x{}: answer {answer}", hex::encode(feed))]
    StaleOrInvalidPrice { feed: Address, answer: i128 },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// Division by zero
    #[error("division by zero")]
    DivisionByZero,

    // ============ Construction Errors ============
    /// Collateral and price feed lists differ in length
    #[error("token addresses and price feed addresses must be the same length: {assets} != {oracles}")]
    AssetOracleLengthMismatch { assets: usize, oracles: usize },

    /// The same collateral token was registered twice
    #[error("collateral token registered twice: 0x{}", hex::encode(token))]
    DuplicateAsset { token: Address },

    /// Token or feed declares more decimals than the fixed-point math supports
    #[error("unsupported decimals {decimals} (max {maximum})")]
    UnsupportedDecimals { decimals: u8, maximum: u8 },
}

impl DscError {
    /// Returns a stable error code for logging and assertions
    pub fn code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "E001_ZERO_AMOUNT",
            Self::InsufficientBalance { .. } => "E002_INSUFFICIENT_BALANCE",
            Self::InsufficientDebt { .. } => "E003_INSUFFICIENT_DEBT",
            Self::UnsupportedAsset { .. } => "E010_UNSUPPORTED_ASSET",
            Self::UnknownAsset { .. } => "E011_UNKNOWN_ASSET",
            Self::HealthFactorBroken { .. } => "E020_HEALTH_FACTOR_BROKEN",
            Self::PositionHealthy { .. } => "E021_POSITION_HEALTHY",
            Self::LiquidationDidNotImprovePosition { .. } => "E022_LIQ_NOT_IMPROVED",
            Self::TransferFailed { .. } => "E030_TRANSFER_FAILED",
            Self::StaleOrInvalidPrice { .. } => "E031_INVALID_PRICE",
            Self::ArithmeticOverflow => "E040_OVERFLOW",
            Self::DivisionByZero => "E041_DIV_ZERO",
            Self::AssetOracleLengthMismatch { .. } => "E050_LENGTH_MISMATCH",
            Self::DuplicateAsset { .. } => "E051_DUPLICATE_ASSET",
            Self::UnsupportedDecimals { .. } => "E052_UNSUPPORTED_DECIMALS",
        }
    }
}

/// Rejections reported by token collaborators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Holder balance too small
    #[error("insufficient token balance: available {available}, requested {requested}")]
    InsufficientBalance { available: Amount, requested: Amount },

    /// Spender allowance too small
    #[error("insufficient allowance: allowed {allowed}, requested {requested}")]
    InsufficientAllowance { allowed: Amount, requested: Amount },

    /// Caller may not mint or burn
    #[error("caller 0x{} is not the token owner", hex::encode(caller))]
    Unauthorized { caller: Address },

    /// Mint or burn of zero units
    #[error("token amount must be more than zero")]
    ZeroAmount,

    /// Mint to the zero address
    #[error("cannot mint to the zero address")]
    ZeroAddress,

    /// Balance or supply arithmetic overflowed
    #[error("token arithmetic overflow")]
    Overflow,

    /// The token refused the call for its own reasons
    #[error("token rejected the call")]
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_error_codes_unique() {
        let errors = [
            DscError::ZeroAmount,
            DscError::InsufficientBalance { available: Amount::zero(), requested: Amount::one() },
            DscError::InsufficientDebt { minted: Amount::zero(), requested: Amount::one() },
            DscError::UnsupportedAsset { token: [1u8; 32] },
            DscError::UnknownAsset { token: [1u8; 32] },
            DscError::HealthFactorBroken { health_factor: Amount::zero() },
            DscError::PositionHealthy { health_factor: Amount::zero() },
            DscError::LiquidationDidNotImprovePosition { starting: Amount::zero(), ending: Amount::zero() },
            DscError::TransferFailed { token: [1u8; 32], source: TokenError::Rejected },
            DscError::StaleOrInvalidPrice { feed: [2u8; 32], answer: 0 },
            DscError::ArithmeticOverflow,
            DscError::DivisionByZero,
            DscError::AssetOracleLengthMismatch { assets: 3, oracles: 2 },
            DscError::DuplicateAsset { token: [1u8; 32] },
            DscError::UnsupportedDecimals { decimals: 40, maximum: 36 },
        ];

        let codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        let unique: BTreeSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len(), "Error codes must be unique");
    }

    #[test]
    fn test_transfer_failed_keeps_source() {
        use std::error::Error as _;

        let err = DscError::TransferFailed {
            token: [0xab; 32],
            source: TokenError::InsufficientAllowance {
                allowed: Amount::from(5u64),
                requested: Amount::from(7u64),
            },
        };

        assert!(err.to_string().starts_with("transfer failed on token 0xabab"));
        assert!(err.source().is_some());
    }
}
