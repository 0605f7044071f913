//! Collaborator Interfaces
//!
//! Capabilities the engine consumes but does not own: price feeds, collateral
//! tokens, and the debt token. Calls are synchronous; a returned error means
//! the collaborator applied no change.

use crate::errors::TokenResult;
use crate::types::{Address, Amount, PriceReading};

/// Read-only price feed for one collateral asset
pub trait PriceFeed: Send + Sync {
    /// Feed identifier
    fn address(&self) -> Address;

    /// Latest answer with its decimals; read fresh on every call
    fn latest_price(&self) -> PriceReading;
}

/// Fungible token ledger with allowance semantics
pub trait FungibleToken: Send + Sync {
    /// Token identifier
    fn address(&self) -> Address;

    /// Decimal precision of raw amounts
    fn decimals(&self) -> u8;

    /// Total units in circulation
    fn total_supply(&self) -> Amount;

    /// Units held by `owner`
    fn balance_of(&self, owner: &Address) -> Amount;

    /// Units `spender` may move on behalf of `owner`
    fn allowance(&self, owner: &Address, spender: &Address) -> Amount;

    /// Set the allowance of `spender` over `owner`'s balance
    fn approve(&self, owner: &Address, spender: &Address, amount: Amount) -> TokenResult<()>;

    /// Move `amount` from `from` to `to`, authorised by `from` itself
    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> TokenResult<()>;

    /// Move `amount` from `from` to `to`, spending `spender`'s allowance
    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> TokenResult<()>;
}

/// The stablecoin the engine mints and burns
pub trait DebtToken: FungibleToken {
    /// Mint `amount` to `to`; only the token owner may call
    fn mint(&self, caller: &Address, to: &Address, amount: Amount) -> TokenResult<()>;

    /// Burn `amount` from the caller's own balance; only the token owner may call
    fn burn(&self, caller: &Address, amount: Amount) -> TokenResult<()>;
}
