//! Token Ledger
//!
//! Balances, allowances and total supply of one fungible token. Every method
//! validates before it writes, so a returned error means nothing changed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dsc_common::{
    errors::{TokenError, TokenResult},
    types::{Address, Amount},
};

/// Fungible token bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
    balances: BTreeMap<Address, Amount>,
    allowances: BTreeMap<Address, BTreeMap<Address, Amount>>,
    total_supply: Amount,
}

impl TokenLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Total units in circulation
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Units held by `owner`
    pub fn balance_of(&self, owner: &Address) -> Amount {
        self.balances.get(owner).copied().unwrap_or_default()
    }

    /// Units `spender` may move on behalf of `owner`
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or_default()
    }

    /// Overwrite the allowance of `spender` over `owner`'s balance
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        self.allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, amount);
    }

    /// Move `amount` from `from` to `to`
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> TokenResult<()> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance {
                available: from_balance,
                requested: amount,
            });
        }
        if from == to {
            return Ok(());
        }

        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        self.balances.insert(*from, from_balance - amount);
        self.balances.insert(*to, to_balance);
        Ok(())
    }

    /// Move `amount` from `from` to `to`, spending `spender`'s allowance
    ///
    /// An allowance of `Amount::MAX` is treated as unlimited and never
    /// decreases.
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> TokenResult<()> {
        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(TokenError::InsufficientAllowance {
                allowed,
                requested: amount,
            });
        }

        self.transfer(from, to, amount)?;

        if allowed != Amount::MAX {
            self.approve(from, spender, allowed - amount);
        }
        Ok(())
    }

    /// Create `amount` new units for `to`
    pub fn mint(&mut self, to: &Address, amount: Amount) -> TokenResult<()> {
        let total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        self.total_supply = total_supply;
        self.balances.insert(*to, balance);
        Ok(())
    }

    /// Destroy `amount` units held by `from`
    pub fn burn(&mut self, from: &Address, amount: Amount) -> TokenResult<()> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(TokenError::InsufficientBalance {
                available: balance,
                requested: amount,
            });
        }
        let total_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(TokenError::Overflow)?;

        self.total_supply = total_supply;
        self.balances.insert(*from, balance - amount);
        Ok(())
    }
}
