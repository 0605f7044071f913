//! Collateral/Debt Ledger
//!
//! Per-user collateral balances and minted debt, the per-asset deposit
//! totals, and the committed event log. Mutations never touch the ledger
//! directly: they are staged on copies in a [`Staged`] changeset and applied
//! in one step by [`Ledger::commit`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use dsc_common::{
    errors::{DscError, DscResult},
    events::{DscEvent, EventLog},
    math::{safe_add, safe_sub},
    types::{Address, Amount},
};

// ============ User Account ============

/// One user's position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Raw token units deposited, per collateral token
    pub collateral: BTreeMap<Address, Amount>,
    /// DSC minted against this account
    pub dsc_minted: Amount,
}

impl UserAccount {
    /// Deposited balance of `token`
    pub fn collateral_of(&self, token: &Address) -> Amount {
        self.collateral.get(token).copied().unwrap_or_default()
    }

    fn credit(&mut self, token: &Address, amount: Amount) -> DscResult<()> {
        let balance = safe_add(self.collateral_of(token), amount)?;
        self.collateral.insert(*token, balance);
        Ok(())
    }

    fn debit(&mut self, token: &Address, amount: Amount) -> DscResult<()> {
        let available = self.collateral_of(token);
        if amount > available {
            return Err(DscError::InsufficientBalance {
                available,
                requested: amount,
            });
        }
        self.collateral.insert(*token, available - amount);
        Ok(())
    }

    fn add_debt(&mut self, amount: Amount) -> DscResult<()> {
        self.dsc_minted = safe_add(self.dsc_minted, amount)?;
        Ok(())
    }

    fn remove_debt(&mut self, amount: Amount) -> DscResult<()> {
        if amount > self.dsc_minted {
            return Err(DscError::InsufficientDebt {
                minted: self.dsc_minted,
                requested: amount,
            });
        }
        self.dsc_minted -= amount;
        Ok(())
    }
}

// ============ Ledger ============

/// Committed engine state
#[derive(Debug, Default)]
pub struct Ledger {
    accounts: BTreeMap<Address, UserAccount>,
    total_deposited: BTreeMap<Address, Amount>,
    events: EventLog,
    nonce: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account of `user`, empty if never seen
    pub fn account(&self, user: &Address) -> UserAccount {
        self.accounts.get(user).cloned().unwrap_or_default()
    }

    /// Users with an account, in address order
    pub fn users(&self) -> impl Iterator<Item = (&Address, &UserAccount)> {
        self.accounts.iter()
    }

    /// Sum of every user's deposit of `token`
    pub fn total_deposited(&self, token: &Address) -> Amount {
        self.total_deposited.get(token).copied().unwrap_or_default()
    }

    /// Number of committed operations
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn events(&self) -> &[DscEvent] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<DscEvent> {
        self.events.take()
    }

    /// Open a changeset against the current state
    pub fn stage(&self) -> Staged<'_> {
        Staged {
            ledger: self,
            nonce: self.nonce + 1,
            accounts: BTreeMap::new(),
            totals: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    /// Apply a finished changeset
    pub fn commit(&mut self, changes: Changes) {
        self.accounts.extend(changes.accounts);
        self.total_deposited.extend(changes.totals);
        self.events.extend(changes.events);
        self.nonce = changes.nonce;
    }
}

// ============ Staged Changes ============

/// Pending mutations over copies of the touched accounts
#[derive(Debug)]
pub struct Staged<'a> {
    ledger: &'a Ledger,
    nonce: u64,
    accounts: BTreeMap<Address, UserAccount>,
    totals: BTreeMap<Address, Amount>,
    events: Vec<DscEvent>,
}

impl<'a> Staged<'a> {
    /// Nonce the changes will carry once committed
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Staged view of `user`
    pub fn account(&self, user: &Address) -> UserAccount {
        self.accounts
            .get(user)
            .cloned()
            .unwrap_or_else(|| self.ledger.account(user))
    }

    fn account_mut(&mut self, user: &Address) -> &mut UserAccount {
        let ledger = self.ledger;
        self.accounts
            .entry(*user)
            .or_insert_with(|| ledger.account(user))
    }

    fn total(&self, token: &Address) -> Amount {
        self.totals
            .get(token)
            .copied()
            .unwrap_or_else(|| self.ledger.total_deposited(token))
    }

    /// Credit `amount` of `token` to `user`
    pub fn deposit(&mut self, user: &Address, token: &Address, amount: Amount) -> DscResult<()> {
        let total = safe_add(self.total(token), amount)?;
        self.account_mut(user).credit(token, amount)?;
        self.totals.insert(*token, total);
        Ok(())
    }

    /// Debit `amount` of `token` from `user`
    pub fn withdraw(&mut self, user: &Address, token: &Address, amount: Amount) -> DscResult<()> {
        self.account_mut(user).debit(token, amount)?;
        let total = safe_sub(self.total(token), amount)?;
        self.totals.insert(*token, total);
        Ok(())
    }

    /// Record `amount` of new debt for `user`
    pub fn add_debt(&mut self, user: &Address, amount: Amount) -> DscResult<()> {
        self.account_mut(user).add_debt(amount)
    }

    /// Clear `amount` of `user`'s debt
    pub fn remove_debt(&mut self, user: &Address, amount: Amount) -> DscResult<()> {
        self.account_mut(user).remove_debt(amount)
    }

    pub fn emit(&mut self, event: DscEvent) {
        self.events.push(event);
    }

    /// Detach the changes from the ledger borrow
    pub fn finish(self) -> Changes {
        Changes {
            nonce: self.nonce,
            accounts: self.accounts,
            totals: self.totals,
            events: self.events,
        }
    }
}

/// Owned result of a [`Staged`] changeset
#[derive(Debug)]
pub struct Changes {
    nonce: u64,
    accounts: BTreeMap<Address, UserAccount>,
    totals: BTreeMap<Address, Amount>,
    events: Vec<DscEvent>,
}
