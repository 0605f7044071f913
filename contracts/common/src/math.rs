//! Mathematical Utilities for the DSC engine
//!
//! Every product is formed in 512-bit width and divided before it is narrowed
//! back to 256 bits. Multiplication always happens before division.

use crate::constants::{health, liquidation, precision};
use crate::errors::{DscError, DscResult};
use crate::types::{Amount, U256, U512};

/// `10^exponent` as a 256-bit value
pub fn pow10(exponent: u8) -> DscResult<U256> {
    U256::from(10u8)
        .checked_pow(U256::from(exponent))
        .ok_or(DscError::ArithmeticOverflow)
}

/// Multiply every factor in 512-bit width, then divide by `denominator`
///
/// Fails with `ArithmeticOverflow` if the product does not fit 512 bits or the
/// quotient does not fit 256 bits. Division truncates toward zero.
pub fn mul_div_wide(factors: &[U256], denominator: U256) -> DscResult<U256> {
    if denominator.is_zero() {
        return Err(DscError::DivisionByZero);
    }

    let mut product = U512::one();
    for factor in factors {
        product = product
            .checked_mul(U512::from(*factor))
            .ok_or(DscError::ArithmeticOverflow)?;
    }

    let quotient = product / U512::from(denominator);
    U256::try_from(quotient).map_err(|_| DscError::ArithmeticOverflow)
}

/// `a * b / denominator` with a 512-bit intermediate
pub fn mul_div(a: U256, b: U256, denominator: U256) -> DscResult<U256> {
    mul_div_wide(&[a, b], denominator)
}

/// Safe addition with overflow check
pub fn safe_add(a: Amount, b: Amount) -> DscResult<Amount> {
    a.checked_add(b).ok_or(DscError::ArithmeticOverflow)
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: Amount, b: Amount) -> DscResult<Amount> {
    a.checked_sub(b).ok_or(DscError::ArithmeticOverflow)
}

/// USD value (18 decimals) of `amount` token units at `price`
///
/// value = amount * price * 10^18 / (10^price_decimals * 10^token_decimals)
pub fn value_in_usd(
    amount: Amount,
    price: U256,
    price_decimals: u8,
    token_decimals: u8,
) -> DscResult<Amount> {
    let denominator = pow10(price_decimals)?
        .checked_mul(pow10(token_decimals)?)
        .ok_or(DscError::ArithmeticOverflow)?;
    mul_div_wide(&[amount, price, pow10(precision::USD_DECIMALS)?], denominator)
}

/// Token units worth `usd_amount` (18 decimals) at `price`, floored
///
/// amount = usd * 10^price_decimals * 10^token_decimals / (price * 10^18)
pub fn amount_from_usd(
    usd_amount: Amount,
    price: U256,
    price_decimals: u8,
    token_decimals: u8,
) -> DscResult<Amount> {
    let denominator = price
        .checked_mul(pow10(precision::USD_DECIMALS)?)
        .ok_or(DscError::ArithmeticOverflow)?;
    mul_div_wide(
        &[usd_amount, pow10(price_decimals)?, pow10(token_decimals)?],
        denominator,
    )
}

/// Collateral value counted toward solvency
///
/// adjusted = collateral_value * LIQUIDATION_THRESHOLD / LIQUIDATION_PRECISION
pub fn adjusted_collateral(collateral_value_in_usd: Amount) -> DscResult<Amount> {
    mul_div(
        collateral_value_in_usd,
        U256::from(liquidation::LIQUIDATION_THRESHOLD),
        U256::from(liquidation::LIQUIDATION_PRECISION),
    )
}

/// Health factor of a position
///
/// Returns `U256::MAX` when nothing is minted. Otherwise
/// `adjusted_collateral * PRECISION / total_dsc_minted`.
pub fn calculate_health_factor(
    total_dsc_minted: Amount,
    collateral_value_in_usd: Amount,
) -> DscResult<Amount> {
    if total_dsc_minted.is_zero() {
        return Ok(U256::MAX);
    }

    let adjusted = adjusted_collateral(collateral_value_in_usd)?;
    mul_div(adjusted, U256::from(precision::PRECISION), total_dsc_minted)
}

/// True if `health_factor` is at or above the minimum
pub fn is_healthy(health_factor: Amount) -> bool {
    health_factor >= U256::from(health::MIN_HEALTH_FACTOR)
}

/// Extra collateral awarded on top of `collateral_seized`
pub fn liquidation_bonus(collateral_seized: Amount) -> Amount {
    collateral_seized / U256::from(liquidation::LIQUIDATION_BONUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ether(units: u64) -> U256 {
        U256::from(units) * U256::exp10(18)
    }

    const ETH_PRICE_2000: u64 = 2_000_00000000; // $2,000 with 8 decimals

    #[test]
    fn test_value_in_usd() {
        // 15 ETH at $2,000 = $30,000
        let value = value_in_usd(ether(15), U256::from(ETH_PRICE_2000), 8, 18).unwrap();
        assert_eq!(value, ether(30_000));
    }

    #[test]
    fn test_value_in_usd_mixed_decimals() {
        // 1 BTC with 8 token decimals at $100,000 (8 decimal feed)
        let value = value_in_usd(
            U256::from(100_000_000u64),
            U256::from(100_000_00000000u64),
            8,
            8,
        )
        .unwrap();
        assert_eq!(value, ether(100_000));

        // Feed with more than 18 decimals
        let value = value_in_usd(ether(2), ether(3) * U256::exp10(2), 20, 18).unwrap();
        assert_eq!(value, ether(6));
    }

    #[test]
    fn test_amount_from_usd() {
        // $100 at $2,000 = 0.05 ETH
        let amount = amount_from_usd(ether(100), U256::from(ETH_PRICE_2000), 8, 18).unwrap();
        assert_eq!(amount, U256::from(50_000_000_000_000_000u64));
    }

    #[test]
    fn test_amount_from_usd_floors() {
        // $100 at $18 = 5.555... ETH, truncated
        let amount = amount_from_usd(ether(100), U256::from(18_00000000u64), 8, 18).unwrap();
        assert_eq!(amount, U256::from(5_555_555_555_555_555_555u64));
    }

    #[test]
    fn test_health_factor() {
        // $20,000 collateral, 100 DSC minted → 100.0
        let hf = calculate_health_factor(ether(100), ether(20_000)).unwrap();
        assert_eq!(hf, ether(100));

        // $180 collateral, 100 DSC minted → 0.9
        let hf = calculate_health_factor(ether(100), ether(180)).unwrap();
        assert_eq!(hf, U256::from(900_000_000_000_000_000u64));
        assert!(!is_healthy(hf));

        // Exactly 200% collateralized → 1.0
        let hf = calculate_health_factor(ether(100), ether(200)).unwrap();
        assert!(is_healthy(hf));
    }

    #[test]
    fn test_health_factor_zero_debt() {
        let hf = calculate_health_factor(U256::zero(), ether(1)).unwrap();
        assert_eq!(hf, U256::MAX);

        let hf = calculate_health_factor(U256::zero(), U256::zero()).unwrap();
        assert_eq!(hf, U256::MAX);
    }

    #[test]
    fn test_health_factor_huge_collateral_overflows() {
        // adjusted * 1e18 / 1 no longer fits 256 bits
        let result = calculate_health_factor(U256::one(), U256::MAX);
        assert_eq!(result, Err(DscError::ArithmeticOverflow));
    }

    #[test]
    fn test_mul_div_keeps_precision() {
        // (MAX / 2) * 4 / 8 would overflow without the wide intermediate
        let half = U256::MAX / 2;
        let result = mul_div(half, U256::from(4u8), U256::from(8u8)).unwrap();
        assert_eq!(result, half / 2);
    }

    #[test]
    fn test_mul_div_zero_denominator() {
        assert_eq!(
            mul_div(U256::one(), U256::one(), U256::zero()),
            Err(DscError::DivisionByZero)
        );
    }

    #[test]
    fn test_safe_math() {
        assert_eq!(safe_add(U256::MAX, U256::one()), Err(DscError::ArithmeticOverflow));
        assert_eq!(safe_sub(U256::zero(), U256::one()), Err(DscError::ArithmeticOverflow));
        assert_eq!(safe_sub(U256::from(3u8), U256::one()).unwrap(), U256::from(2u8));
    }

    #[test]
    fn test_liquidation_bonus() {
        let seized = U256::from(5_555_555_555_555_555_555u64);
        assert_eq!(liquidation_bonus(seized), U256::from(555_555_555_555_555_555u64));
    }

    #[test]
    fn test_pow10_bounds() {
        assert_eq!(pow10(0).unwrap(), U256::one());
        assert_eq!(pow10(18).unwrap(), U256::exp10(18));
        assert_eq!(pow10(78), Err(DscError::ArithmeticOverflow));
    }
}
