//! Mock collateral token (WETH / WBTC stand-in)

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use dsc_common::{
    errors::{TokenError, TokenResult},
    interfaces::FungibleToken,
    types::{Address, Amount},
};

use crate::ledger::TokenLedger;

/// Collateral token with a public faucet and switchable failures
#[derive(Debug)]
pub struct MockCollateralToken {
    address: Address,
    decimals: u8,
    ledger: RwLock<TokenLedger>,
    fail_transfers: AtomicBool,
    fail_transfer_froms: AtomicBool,
}

impl MockCollateralToken {
    pub fn new(address: Address, decimals: u8) -> Self {
        Self {
            address,
            decimals,
            ledger: RwLock::new(TokenLedger::new()),
            fail_transfers: AtomicBool::new(false),
            fail_transfer_froms: AtomicBool::new(false),
        }
    }

    /// Faucet: anyone may mint to anyone
    pub fn mint(&self, to: &Address, amount: Amount) -> TokenResult<()> {
        self.ledger.write().mint(to, amount)
    }

    /// Make every `transfer` return `Rejected`
    pub fn fail_transfers(&self, fail: bool) {
        self.fail_transfers.store(fail, Ordering::SeqCst);
    }

    /// Make every `transfer_from` return `Rejected`
    pub fn fail_transfer_froms(&self, fail: bool) {
        self.fail_transfer_froms.store(fail, Ordering::SeqCst);
    }
}

impl FungibleToken for MockCollateralToken {
    fn address(&self) -> Address {
        self.address
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn total_supply(&self) -> Amount {
        self.ledger.read().total_supply()
    }

    fn balance_of(&self, owner: &Address) -> Amount {
        self.ledger.read().balance_of(owner)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.ledger.read().allowance(owner, spender)
    }

    fn approve(&self, owner: &Address, spender: &Address, amount: Amount) -> TokenResult<()> {
        self.ledger.write().approve(owner, spender, amount);
        Ok(())
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> TokenResult<()> {
        if self.fail_transfers.load(Ordering::SeqCst) {
            tracing::trace!("collateral transfer rejected");
            return Err(TokenError::Rejected);
        }
        self.ledger.write().transfer(from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> TokenResult<()> {
        if self.fail_transfer_froms.load(Ordering::SeqCst) {
            tracing::trace!("collateral transfer_from rejected");
            return Err(TokenError::Rejected);
        }
        self.ledger.write().transfer_from(spender, from, to, amount)
    }
}
