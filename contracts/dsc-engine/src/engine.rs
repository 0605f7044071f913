//! DSC Engine
//!
//! Owns the collateral/debt ledger and enforces solvency on every mutation.
//!
//! ## Operation shape
//!
//! Every mutating operation runs under the ledger's write lock and goes
//! through the same three phases:
//!
//! 1. **Stage**: validate inputs and apply the change to copies of the touched
//!    accounts, then check health on the copies
//! 2. **Call**: perform the token calls, journaling an inverse for each one
//! 3. **Commit**: apply the copies, bump the nonce, append the events
//!
//! A failure in phase 1 touches nothing. A failure in phase 2 unwinds the
//! journal and discards the copies. Readers never observe a partial
//! operation.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use dsc_common::{
    constants::{health, liquidation, precision},
    errors::{DscError, DscResult},
    events::DscEvent,
    interfaces::{DebtToken, FungibleToken, PriceFeed},
    math::{calculate_health_factor, is_healthy, safe_add},
    types::{short_hex, AccountInformation, Address, Amount, U256},
};

use crate::journal::Journal;
use crate::ledger::{Ledger, Staged, UserAccount};
use crate::liquidation::LiquidationQuote;
use crate::registry::CollateralRegistry;

// ============ Parameters ============

/// Fixed protocol parameters, for display and off-chain simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineParameters {
    pub min_health_factor: u64,
    pub liquidation_threshold: u64,
    pub liquidation_precision: u64,
    pub liquidation_bonus: u64,
    pub precision: u64,
    pub additional_feed_precision: u64,
}

impl Default for EngineParameters {
    fn default() -> Self {
        Self {
            min_health_factor: health::MIN_HEALTH_FACTOR,
            liquidation_threshold: liquidation::LIQUIDATION_THRESHOLD,
            liquidation_precision: liquidation::LIQUIDATION_PRECISION,
            liquidation_bonus: liquidation::LIQUIDATION_BONUS,
            precision: precision::PRECISION,
            additional_feed_precision: precision::ADDITIONAL_FEED_PRECISION,
        }
    }
}

// ============ Engine ============

/// Collateral/debt ledger with health factor enforcement and liquidation
pub struct DscEngine {
    address: Address,
    registry: CollateralRegistry,
    dsc: Arc<dyn DebtToken>,
    ledger: RwLock<Ledger>,
}

impl DscEngine {
    /// Build an engine over `collateral_tokens`, pairing each with the feed at
    /// the same position in `price_feeds`
    ///
    /// The engine acts as `address` towards its collaborators: it must own
    /// `dsc` before it can mint, and users approve `address` to pull tokens.
    ///
    /// # Errors
    /// - `AssetOracleLengthMismatch` if the lists differ in length
    /// - `DuplicateAsset` if a token is listed twice
    /// - `UnsupportedDecimals` if a token declares too many decimals
    pub fn new(
        address: Address,
        collateral_tokens: Vec<Arc<dyn FungibleToken>>,
        price_feeds: Vec<Arc<dyn PriceFeed>>,
        dsc: Arc<dyn DebtToken>,
    ) -> DscResult<Self> {
        let registry = CollateralRegistry::new(collateral_tokens, price_feeds)?;

        tracing::debug!(
            engine = %short_hex(&address),
            dsc = %short_hex(&dsc.address()),
            assets = registry.len(),
            "engine created"
        );

        Ok(Self {
            address,
            registry,
            dsc,
            ledger: RwLock::new(Ledger::new()),
        })
    }

    // ============ Collateral Operations ============

    /// Pull `amount` of `token` from `caller` and credit it as collateral
    pub fn deposit_collateral(&self, caller: &Address, token: &Address, amount: Amount) -> DscResult<()> {
        let mut ledger = self.ledger.write();

        let mut staged = ledger.stage();
        let collateral = self.stage_deposit(&mut staged, caller, token, amount)?;
        let changes = staged.finish();

        self.journal()
            .run(|journal| journal.pull_collateral(collateral, caller, amount))?;

        ledger.commit(changes);
        tracing::debug!(
            user = %short_hex(caller),
            token = %short_hex(token),
            amount = %amount,
            nonce = ledger.nonce(),
            "collateral deposited"
        );
        Ok(())
    }

    /// Withdraw `amount` of `token` from the caller's collateral back to them
    ///
    /// # Errors
    /// `HealthFactorBroken` if the caller has debt and the withdrawal would
    /// leave them below the minimum health factor
    pub fn redeem_collateral(&self, caller: &Address, token: &Address, amount: Amount) -> DscResult<()> {
        let mut ledger = self.ledger.write();

        let mut staged = ledger.stage();
        let collateral = self.stage_redeem(&mut staged, caller, caller, token, amount)?;
        let health_factor = self.ensure_healthy(&staged, caller)?;
        let changes = staged.finish();

        self.journal()
            .run(|journal| journal.send_collateral(collateral, caller, amount))?;

        ledger.commit(changes);
        tracing::debug!(
            user = %short_hex(caller),
            token = %short_hex(token),
            amount = %amount,
            health_factor = %health_factor,
            nonce = ledger.nonce(),
            "collateral redeemed"
        );
        Ok(())
    }

    // ============ Debt Operations ============

    /// Mint `amount` DSC to the caller against their collateral
    pub fn mint_dsc(&self, caller: &Address, amount: Amount) -> DscResult<()> {
        let mut ledger = self.ledger.write();

        let mut staged = ledger.stage();
        self.stage_mint(&mut staged, caller, amount)?;
        let health_factor = self.ensure_healthy(&staged, caller)?;
        let changes = staged.finish();

        self.journal().run(|journal| journal.mint_dsc(caller, amount))?;

        ledger.commit(changes);
        tracing::debug!(
            user = %short_hex(caller),
            amount = %amount,
            health_factor = %health_factor,
            nonce = ledger.nonce(),
            "dsc minted"
        );
        Ok(())
    }

    /// Repay `amount` of the caller's debt with DSC they approved to the engine
    pub fn burn_dsc(&self, caller: &Address, amount: Amount) -> DscResult<()> {
        let mut ledger = self.ledger.write();

        let mut staged = ledger.stage();
        self.stage_burn(&mut staged, caller, caller, amount)?;
        let changes = staged.finish();

        self.journal().run(|journal| {
            journal.pull_dsc(caller, amount)?;
            journal.burn_dsc(amount)
        })?;

        ledger.commit(changes);
        tracing::debug!(
            user = %short_hex(caller),
            amount = %amount,
            nonce = ledger.nonce(),
            "dsc burned"
        );
        Ok(())
    }

    // ============ Combined Operations ============

    /// Deposit collateral and mint DSC against it in one step
    pub fn deposit_and_mint(
        &self,
        caller: &Address,
        token: &Address,
        collateral_amount: Amount,
        mint_amount: Amount,
    ) -> DscResult<()> {
        let mut ledger = self.ledger.write();

        let mut staged = ledger.stage();
        let collateral = self.stage_deposit(&mut staged, caller, token, collateral_amount)?;
        self.stage_mint(&mut staged, caller, mint_amount)?;
        let health_factor = self.ensure_healthy(&staged, caller)?;
        let changes = staged.finish();

        self.journal().run(|journal| {
            journal.pull_collateral(collateral, caller, collateral_amount)?;
            journal.mint_dsc(caller, mint_amount)
        })?;

        ledger.commit(changes);
        tracing::debug!(
            user = %short_hex(caller),
            token = %short_hex(token),
            collateral = %collateral_amount,
            minted = %mint_amount,
            health_factor = %health_factor,
            nonce = ledger.nonce(),
            "collateral deposited and dsc minted"
        );
        Ok(())
    }

    /// Burn DSC, then withdraw collateral, in one step
    ///
    /// The burn is applied first so the health check sees the reduced debt.
    pub fn redeem_for_dsc(
        &self,
        caller: &Address,
        token: &Address,
        collateral_amount: Amount,
        burn_amount: Amount,
    ) -> DscResult<()> {
        let mut ledger = self.ledger.write();

        let mut staged = ledger.stage();
        self.stage_burn(&mut staged, caller, caller, burn_amount)?;
        let collateral = self.stage_redeem(&mut staged, caller, caller, token, collateral_amount)?;
        let health_factor = self.ensure_healthy(&staged, caller)?;
        let changes = staged.finish();

        self.journal().run(|journal| {
            journal.pull_dsc(caller, burn_amount)?;
            journal.burn_dsc(burn_amount)?;
            journal.send_collateral(collateral, caller, collateral_amount)
        })?;

        ledger.commit(changes);
        tracing::debug!(
            user = %short_hex(caller),
            token = %short_hex(token),
            collateral = %collateral_amount,
            burned = %burn_amount,
            health_factor = %health_factor,
            nonce = ledger.nonce(),
            "dsc burned and collateral redeemed"
        );
        Ok(())
    }

    // ============ Liquidation ============

    /// Cover `debt_to_cover` of `user`'s debt with the caller's DSC and seize
    /// the equivalent `token` collateral plus the bonus
    ///
    /// # Errors
    /// - `PositionHealthy` if `user` is at or above the minimum health factor
    /// - `InsufficientBalance` if `user` holds too little `token` for the payout
    /// - `InsufficientDebt` if `debt_to_cover` exceeds `user`'s debt
    /// - `LiquidationDidNotImprovePosition` if `user`'s health factor would not rise
    pub fn liquidate(
        &self,
        caller: &Address,
        token: &Address,
        user: &Address,
        debt_to_cover: Amount,
    ) -> DscResult<()> {
        // 1. Amount must be positive
        if debt_to_cover.is_zero() {
            return Err(DscError::ZeroAmount);
        }

        // 2. Token must be approved collateral
        let collateral = self.registry.token(token)?.as_ref();

        let mut ledger = self.ledger.write();
        let mut staged = ledger.stage();

        // 3. Target must be below the minimum
        let starting = self.health_factor_of(&staged.account(user))?;
        if is_healthy(starting) {
            tracing::warn!(
                liquidator = %short_hex(caller),
                user = %short_hex(user),
                health_factor = %starting,
                "liquidation of healthy position rejected"
            );
            return Err(DscError::PositionHealthy {
                health_factor: starting,
            });
        }

        // 4. Price the payout
        let quote = LiquidationQuote::new(self.registry.oracle(), token, debt_to_cover)?;
        let payout = quote.total_collateral()?;
        let nonce = staged.nonce();

        // 5. Seize collateral, then clear debt
        staged.withdraw(user, token, payout)?;
        staged.emit(DscEvent::CollateralRedeemed {
            redeemed_from: *user,
            redeemed_to: *caller,
            token: *token,
            amount: payout,
            nonce,
        });
        staged.remove_debt(user, debt_to_cover)?;
        staged.emit(DscEvent::DscBurned {
            on_behalf_of: *user,
            dsc_from: *caller,
            amount: debt_to_cover,
            nonce,
        });

        // 6. Target must end up healthier
        let ending = self.health_factor_of(&staged.account(user))?;
        if ending <= starting {
            tracing::warn!(
                user = %short_hex(user),
                starting = %starting,
                ending = %ending,
                "liquidation did not improve position"
            );
            return Err(DscError::LiquidationDidNotImprovePosition { starting, ending });
        }

        staged.emit(DscEvent::Liquidated {
            liquidator: *caller,
            user: *user,
            token: *token,
            debt_covered: debt_to_cover,
            collateral_seized: quote.collateral_seized,
            bonus_collateral: quote.bonus_collateral,
            nonce,
        });
        let changes = staged.finish();

        // 7. Burn the liquidator's DSC, then pay out
        self.journal().run(|journal| {
            journal.pull_dsc(caller, debt_to_cover)?;
            journal.burn_dsc(debt_to_cover)?;
            journal.send_collateral(collateral, caller, payout)
        })?;

        ledger.commit(changes);
        tracing::debug!(
            liquidator = %short_hex(caller),
            user = %short_hex(user),
            token = %short_hex(token),
            debt_covered = %debt_to_cover,
            payout = %payout,
            starting = %starting,
            ending = %ending,
            nonce = ledger.nonce(),
            "position liquidated"
        );
        Ok(())
    }

    /// Collateral a liquidator would receive for covering `debt_to_cover`
    /// with `token`, at the current price
    pub fn quote_liquidation(&self, token: &Address, debt_to_cover: Amount) -> DscResult<LiquidationQuote> {
        self.registry.token(token)?;
        LiquidationQuote::new(self.registry.oracle(), token, debt_to_cover)
    }

    // ============ Health ============

    /// Current health factor of `user`; `U256::MAX` without debt
    pub fn health_factor(&self, user: &Address) -> DscResult<Amount> {
        let ledger = self.ledger.read();
        self.health_factor_of(&ledger.account(user))
    }

    /// Health factor formula over explicit inputs, without touching state
    pub fn calculate_health_factor(
        &self,
        total_dsc_minted: Amount,
        collateral_value_in_usd: Amount,
    ) -> DscResult<Amount> {
        calculate_health_factor(total_dsc_minted, collateral_value_in_usd)
    }

    /// Minted debt and total collateral value of `user`
    pub fn get_account_information(&self, user: &Address) -> DscResult<AccountInformation> {
        let ledger = self.ledger.read();
        let account = ledger.account(user);
        Ok(AccountInformation {
            total_dsc_minted: account.dsc_minted,
            collateral_value_in_usd: self.collateral_value_of(&account)?,
        })
    }

    /// Total USD value of `user`'s collateral
    pub fn get_account_collateral_value(&self, user: &Address) -> DscResult<Amount> {
        let ledger = self.ledger.read();
        self.collateral_value_of(&ledger.account(user))
    }

    // ============ Price Conversions ============

    /// USD value (18 decimals) of `amount` raw units of `token`
    pub fn get_usd_value(&self, token: &Address, amount: Amount) -> DscResult<Amount> {
        self.registry.oracle().usd_value(token, amount)
    }

    /// Raw units of `token` worth `usd_amount`, floored
    pub fn get_token_amount_from_usd(&self, token: &Address, usd_amount: Amount) -> DscResult<Amount> {
        self.registry.oracle().token_amount_from_usd(token, usd_amount)
    }

    // ============ Views ============

    /// Identity the engine uses towards its collaborators
    pub fn address(&self) -> Address {
        self.address
    }

    /// The debt token's address
    pub fn get_dsc(&self) -> Address {
        self.dsc.address()
    }

    /// Approved collateral tokens in registration order
    pub fn get_collateral_tokens(&self) -> Vec<Address> {
        self.registry.addresses()
    }

    /// Feed bound to `token`, if it is approved collateral
    pub fn get_collateral_token_price_feed(&self, token: &Address) -> Option<Address> {
        self.registry.price_feed(token)
    }

    /// Deposited balance of `token` for `user`
    pub fn get_collateral_balance_of_user(&self, user: &Address, token: &Address) -> Amount {
        self.ledger.read().account(user).collateral_of(token)
    }

    /// Full position of `user`
    pub fn account(&self, user: &Address) -> UserAccount {
        self.ledger.read().account(user)
    }

    /// Every user that has ever held a position, in address order
    pub fn users(&self) -> Vec<Address> {
        self.ledger.read().users().map(|(user, _)| *user).collect()
    }

    /// Sum of every user's deposit of `token`
    pub fn total_collateral_deposited(&self, token: &Address) -> Amount {
        self.ledger.read().total_deposited(token)
    }

    /// USD value of all collateral the engine holds
    pub fn protocol_collateral_value_usd(&self) -> DscResult<Amount> {
        let _ledger = self.ledger.read();
        self.held_collateral_value()
    }

    /// True if the collateral the engine holds is worth at least the DSC supply
    pub fn is_protocol_solvent(&self) -> DscResult<bool> {
        let _ledger = self.ledger.read();
        let value = self.held_collateral_value()?;
        Ok(value >= self.dsc.total_supply())
    }

    /// Number of committed operations
    pub fn nonce(&self) -> u64 {
        self.ledger.read().nonce()
    }

    /// Committed events, oldest first
    pub fn events(&self) -> Vec<DscEvent> {
        self.ledger.read().events().to_vec()
    }

    /// Take the committed events, leaving the log empty
    pub fn drain_events(&self) -> Vec<DscEvent> {
        self.ledger.write().drain_events()
    }

    pub fn parameters(&self) -> EngineParameters {
        EngineParameters::default()
    }

    // ============ Constants ============

    pub fn min_health_factor(&self) -> Amount {
        U256::from(health::MIN_HEALTH_FACTOR)
    }

    pub fn liquidation_threshold(&self) -> Amount {
        U256::from(liquidation::LIQUIDATION_THRESHOLD)
    }

    pub fn liquidation_precision(&self) -> Amount {
        U256::from(liquidation::LIQUIDATION_PRECISION)
    }

    pub fn liquidation_bonus(&self) -> Amount {
        U256::from(liquidation::LIQUIDATION_BONUS)
    }

    pub fn precision(&self) -> Amount {
        U256::from(precision::PRECISION)
    }

    pub fn additional_feed_precision(&self) -> Amount {
        U256::from(precision::ADDITIONAL_FEED_PRECISION)
    }

    // ============ Staging ============

    fn stage_deposit(
        &self,
        staged: &mut Staged<'_>,
        user: &Address,
        token: &Address,
        amount: Amount,
    ) -> DscResult<&dyn FungibleToken> {
        if amount.is_zero() {
            return Err(DscError::ZeroAmount);
        }
        let collateral = self.registry.token(token)?;

        staged.deposit(user, token, amount)?;
        staged.emit(DscEvent::CollateralDeposited {
            user: *user,
            token: *token,
            amount,
            nonce: staged.nonce(),
        });
        Ok(collateral.as_ref())
    }

    fn stage_redeem(
        &self,
        staged: &mut Staged<'_>,
        from: &Address,
        to: &Address,
        token: &Address,
        amount: Amount,
    ) -> DscResult<&dyn FungibleToken> {
        if amount.is_zero() {
            return Err(DscError::ZeroAmount);
        }
        let collateral = self.registry.token(token)?;

        staged.withdraw(from, token, amount)?;
        staged.emit(DscEvent::CollateralRedeemed {
            redeemed_from: *from,
            redeemed_to: *to,
            token: *token,
            amount,
            nonce: staged.nonce(),
        });
        Ok(collateral.as_ref())
    }

    fn stage_mint(&self, staged: &mut Staged<'_>, user: &Address, amount: Amount) -> DscResult<()> {
        if amount.is_zero() {
            return Err(DscError::ZeroAmount);
        }

        staged.add_debt(user, amount)?;
        staged.emit(DscEvent::DscMinted {
            user: *user,
            amount,
            nonce: staged.nonce(),
        });
        Ok(())
    }

    fn stage_burn(
        &self,
        staged: &mut Staged<'_>,
        on_behalf_of: &Address,
        dsc_from: &Address,
        amount: Amount,
    ) -> DscResult<()> {
        if amount.is_zero() {
            return Err(DscError::ZeroAmount);
        }

        staged.remove_debt(on_behalf_of, amount)?;
        staged.emit(DscEvent::DscBurned {
            on_behalf_of: *on_behalf_of,
            dsc_from: *dsc_from,
            amount,
            nonce: staged.nonce(),
        });
        Ok(())
    }

    /// Fail with `HealthFactorBroken` unless the staged `user` is healthy
    fn ensure_healthy(&self, staged: &Staged<'_>, user: &Address) -> DscResult<Amount> {
        let health_factor = self.health_factor_of(&staged.account(user))?;
        if !is_healthy(health_factor) {
            tracing::warn!(
                user = %short_hex(user),
                health_factor = %health_factor,
                "operation would break health factor"
            );
            return Err(DscError::HealthFactorBroken { health_factor });
        }
        Ok(health_factor)
    }

    // ============ Valuation ============

    fn health_factor_of(&self, account: &UserAccount) -> DscResult<Amount> {
        // No prices are read for a debt-free account
        if account.dsc_minted.is_zero() {
            return Ok(U256::MAX);
        }
        let collateral_value = self.collateral_value_of(account)?;
        calculate_health_factor(account.dsc_minted, collateral_value)
    }

    fn collateral_value_of(&self, account: &UserAccount) -> DscResult<Amount> {
        let oracle = self.registry.oracle();
        let mut total = Amount::zero();
        for token in self.registry.addresses() {
            let balance = account.collateral_of(&token);
            if balance.is_zero() {
                continue;
            }
            total = safe_add(total, oracle.usd_value(&token, balance)?)?;
        }
        Ok(total)
    }

    /// Value of the engine's own token balances; caller holds the ledger lock
    fn held_collateral_value(&self) -> DscResult<Amount> {
        let oracle = self.registry.oracle();
        let mut total = Amount::zero();
        for token in self.registry.tokens() {
            let held = token.balance_of(&self.address);
            if held.is_zero() {
                continue;
            }
            total = safe_add(total, oracle.usd_value(&token.address(), held)?)?;
        }
        Ok(total)
    }

    fn journal(&self) -> Journal<'_> {
        Journal::new(self.address, self.dsc.as_ref())
    }
}

impl std::fmt::Debug for DscEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DscEngine")
            .field("address", &short_hex(&self.address))
            .field("dsc", &short_hex(&self.dsc.address()))
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
