//! Protocol Constants
//!
//! All magic numbers of the DSC engine. These are fixed for the lifetime of
//! an engine; there is no runtime parameter update path.

/// Debt token metadata
pub mod token {
    /// Token name
    pub const NAME: &str = "DecentralizedStableCoin";
    /// Token symbol
    pub const SYMBOL: &str = "DSC";
    /// Decimal places (same as the USD fixed point)
    pub const DECIMALS: u8 = 18;
}

/// Fixed-point precision
pub mod precision {
    /// One unit of 18-decimal fixed point
    pub const PRECISION: u64 = 1_000_000_000_000_000_000; // 1e18

    /// Decimals of every USD value the engine produces
    pub const USD_DECIMALS: u8 = 18;

    /// Scale that lifts an 8-decimal feed answer to 18 decimals
    pub const ADDITIONAL_FEED_PRECISION: u64 = 10_000_000_000; // 1e10
}

/// Solvency rules
pub mod health {
    /// Minimum health factor (1.0 in 18-decimal fixed point)
    pub const MIN_HEALTH_FACTOR: u64 = 1_000_000_000_000_000_000;
}

/// Liquidation parameters
pub mod liquidation {
    /// Percentage of collateral USD value counted toward solvency.
    /// 50 means 200% collateralization is required.
    pub const LIQUIDATION_THRESHOLD: u64 = 50;

    /// Denominator for `LIQUIDATION_THRESHOLD`
    pub const LIQUIDATION_PRECISION: u64 = 100;

    /// Bonus divisor: the liquidator receives `seized / LIQUIDATION_BONUS` extra.
    /// 10 means a 10% bonus.
    pub const LIQUIDATION_BONUS: u64 = 10;
}

/// Registry limits
pub mod limits {
    /// Largest decimal count accepted for a token or a feed
    pub const MAX_DECIMALS: u8 = 36;
}
