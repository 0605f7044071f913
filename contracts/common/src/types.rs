//! Core Types for the DSC engine

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

pub use primitive_types::{U256, U512};

/// Type alias for account and token identifiers
pub type Address = [u8; 32];

/// Raw token amounts, USD values and health factors (18-decimal fixed point
/// unless the token declares otherwise)
pub type Amount = U256;

/// The all-zero address
pub const ZERO_ADDRESS: Address = [0u8; 32];

/// Derive a deterministic address from a human-readable label
pub fn address_from_label(label: &str) -> Address {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(b"dsc.address");
    hasher.update(label.as_bytes());
    let result = hasher.finalize();
    let mut address = [0u8; 32];
    address.copy_from_slice(&result);
    address
}

/// Abbreviated hex form of an address for log fields (`0x1a2b3c4d..`)
pub fn short_hex(address: &Address) -> String {
    format!("0x{}..", hex::encode(&address[..4]))
}

// ============ Price Types ============

/// Latest reading from a price feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PriceReading {
    /// Signed answer in `decimals` fixed point
    pub answer: i128,
    /// Decimal precision of `answer`
    pub decimals: u8,
    /// False when the feed flags the round as unusable
    pub is_valid: bool,
}

impl PriceReading {
    /// Create a valid reading
    pub fn new(answer: i128, decimals: u8) -> Self {
        Self {
            answer,
            decimals,
            is_valid: true,
        }
    }
}

// ============ Account Types ============

/// Aggregate view of one user's position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountInformation {
    /// DSC minted against this user's collateral
    pub total_dsc_minted: Amount,
    /// Sum of the USD value of every collateral balance (18 decimals)
    pub collateral_value_in_usd: Amount,
}

// ============ Encoding helpers ============

/// Borsh encoding for `U256` fields (four little-endian limbs)
pub mod borsh_u256 {
    use borsh::io::{Read, Result, Write};
    use borsh::{BorshDeserialize, BorshSerialize};
    use primitive_types::U256;

    pub fn serialize<W: Write>(value: &U256, writer: &mut W) -> Result<()> {
        value.0.serialize(writer)
    }

    pub fn deserialize<R: Read>(reader: &mut R) -> Result<U256> {
        let limbs = <[u64; 4]>::deserialize_reader(reader)?;
        Ok(U256(limbs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_from_label() {
        let weth = address_from_label("weth");
        assert_eq!(weth, address_from_label("weth"));
        assert_ne!(weth, address_from_label("wbtc"));
        assert_ne!(weth, ZERO_ADDRESS);
    }

    #[test]
    fn test_short_hex() {
        assert_eq!(short_hex(&[0xab; 32]), "0xabababab..");
    }
}
