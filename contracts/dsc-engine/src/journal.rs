//! Compensation Journal
//!
//! Collaborator calls cannot be rolled back by the ledger, so every call
//! that moves value into the engine or destroys it is recorded together with
//! the call that undoes it. When a later call fails, [`Journal::unwind`]
//! replays the inverses newest first.
//!
//! Calls that move value out of the engine (collateral payouts and DSC
//! mints) have no inverse the engine can perform on its own and are always
//! the last call of an operation.
//!
//! A pull also spends the payer's allowance to the engine. The allowance the
//! payer had before the pull is recorded and granted again after the tokens
//! are returned, so a rolled-back operation can be retried as is.

use dsc_common::{
    errors::{DscError, DscResult, TokenError},
    interfaces::{DebtToken, FungibleToken},
    types::{short_hex, Address, Amount},
};

enum Compensation<'a> {
    /// Send pulled collateral back to its owner
    ReturnCollateral {
        token: &'a dyn FungibleToken,
        to: Address,
        amount: Amount,
    },
    /// Send pulled DSC back to the payer
    ReturnDsc { to: Address, amount: Amount },
    /// Re-mint burned DSC into the engine's own balance
    RemintDsc { amount: Amount },
    /// Put back the allowance a pull spent
    RestoreAllowance {
        token: &'a dyn FungibleToken,
        owner: Address,
        allowance: Amount,
    },
    /// Put back the DSC allowance a pull spent
    RestoreDscAllowance { owner: Address, allowance: Amount },
}

/// Collaborator calls of one in-flight operation
pub struct Journal<'a> {
    engine: Address,
    dsc: &'a dyn DebtToken,
    entries: Vec<Compensation<'a>>,
}

impl<'a> Journal<'a> {
    pub fn new(engine: Address, dsc: &'a dyn DebtToken) -> Self {
        Self {
            engine,
            dsc,
            entries: Vec::new(),
        }
    }

    /// Pull `amount` of collateral from `from` into the engine
    pub fn pull_collateral(
        &mut self,
        token: &'a dyn FungibleToken,
        from: &Address,
        amount: Amount,
    ) -> DscResult<()> {
        let allowance = token.allowance(from, &self.engine);
        token
            .transfer_from(&self.engine, from, &self.engine, amount)
            .map_err(|source| transfer_failed(token.address(), source))?;
        self.entries.push(Compensation::RestoreAllowance {
            token,
            owner: *from,
            allowance,
        });
        self.entries.push(Compensation::ReturnCollateral {
            token,
            to: *from,
            amount,
        });
        Ok(())
    }

    /// Pay `amount` of collateral out of the engine to `to`
    pub fn send_collateral(
        &mut self,
        token: &'a dyn FungibleToken,
        to: &Address,
        amount: Amount,
    ) -> DscResult<()> {
        token
            .transfer(&self.engine, to, amount)
            .map_err(|source| transfer_failed(token.address(), source))
    }

    /// Pull `amount` of DSC from `from` into the engine
    pub fn pull_dsc(&mut self, from: &Address, amount: Amount) -> DscResult<()> {
        let allowance = self.dsc.allowance(from, &self.engine);
        self.dsc
            .transfer_from(&self.engine, from, &self.engine, amount)
            .map_err(|source| transfer_failed(self.dsc.address(), source))?;
        self.entries.push(Compensation::RestoreDscAllowance {
            owner: *from,
            allowance,
        });
        self.entries.push(Compensation::ReturnDsc { to: *from, amount });
        Ok(())
    }

    /// Burn `amount` of DSC held by the engine
    pub fn burn_dsc(&mut self, amount: Amount) -> DscResult<()> {
        self.dsc
            .burn(&self.engine, amount)
            .map_err(|source| transfer_failed(self.dsc.address(), source))?;
        self.entries.push(Compensation::RemintDsc { amount });
        Ok(())
    }

    /// Mint `amount` of new DSC to `to`
    pub fn mint_dsc(&mut self, to: &Address, amount: Amount) -> DscResult<()> {
        self.dsc
            .mint(&self.engine, to, amount)
            .map_err(|source| transfer_failed(self.dsc.address(), source))
    }

    /// Undo every recorded call, newest first
    pub fn unwind(self) {
        let Self { engine, dsc, entries } = self;
        for entry in entries.into_iter().rev() {
            let (token, result) = match entry {
                Compensation::ReturnCollateral { token, to, amount } => {
                    (token.address(), token.transfer(&engine, &to, amount))
                }
                Compensation::ReturnDsc { to, amount } => (dsc.address(), dsc.transfer(&engine, &to, amount)),
                Compensation::RemintDsc { amount } => (dsc.address(), dsc.mint(&engine, &engine, amount)),
                Compensation::RestoreAllowance {
                    token,
                    owner,
                    allowance,
                } => (token.address(), token.approve(&owner, &engine, allowance)),
                Compensation::RestoreDscAllowance { owner, allowance } => {
                    (dsc.address(), dsc.approve(&owner, &engine, allowance))
                }
            };
            if let Err(err) = result {
                tracing::error!(
                    token = %short_hex(&token),
                    error = %err,
                    "compensating call failed during rollback"
                );
            }
        }
    }

    /// Run `calls`, unwinding everything they recorded if one fails
    pub fn run<F>(mut self, calls: F) -> DscResult<()>
    where
        F: FnOnce(&mut Self) -> DscResult<()>,
    {
        match calls(&mut self) {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::debug!(code = err.code(), steps = self.entries.len(), "unwinding collaborator calls");
                self.unwind();
                Err(err)
            }
        }
    }
}

fn transfer_failed(token: Address, source: TokenError) -> DscError {
    DscError::TransferFailed { token, source }
}
