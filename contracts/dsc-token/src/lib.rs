//! DSC Token Contracts
//!
//! Fungible token ledgers consumed by the DSC engine:
//! - **DecentralizedStableCoin**: the debt token; only its owner (the engine)
//!   may mint and burn
//! - **MockCollateralToken**: a freely-mintable collateral token with failure
//!   injection for exercising rollback paths
//!
//! Both wrap a [`TokenLedger`] behind a lock and implement the collaborator
//! traits from `dsc-common`.

use parking_lot::RwLock;

use dsc_common::{
    constants::token,
    errors::{TokenError, TokenResult},
    interfaces::{DebtToken, FungibleToken},
    types::{short_hex, Address, Amount, ZERO_ADDRESS},
};

pub mod ledger;
pub mod mock;

pub use ledger::TokenLedger;
pub use mock::MockCollateralToken;

// ============ Stablecoin ============

#[derive(Debug)]
struct StablecoinState {
    owner: Address,
    ledger: TokenLedger,
}

/// The DSC debt token
///
/// Mint and burn are gated on the owner. Deploy it owned by the deployer and
/// hand ownership to the engine with [`transfer_ownership`](Self::transfer_ownership).
#[derive(Debug)]
pub struct DecentralizedStableCoin {
    address: Address,
    state: RwLock<StablecoinState>,
}

impl DecentralizedStableCoin {
    /// Create the token with `owner` as the only minter
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            state: RwLock::new(StablecoinState {
                owner,
                ledger: TokenLedger::new(),
            }),
        }
    }

    /// Token name
    pub fn name(&self) -> &'static str {
        token::NAME
    }

    /// Token symbol
    pub fn symbol(&self) -> &'static str {
        token::SYMBOL
    }

    /// Current owner
    pub fn owner(&self) -> Address {
        self.state.read().owner
    }

    /// Hand minting rights to `new_owner`
    pub fn transfer_ownership(&self, caller: &Address, new_owner: Address) -> TokenResult<()> {
        let mut state = self.state.write();
        if *caller != state.owner {
            return Err(TokenError::Unauthorized { caller: *caller });
        }
        if new_owner == ZERO_ADDRESS {
            return Err(TokenError::ZeroAddress);
        }

        tracing::debug!(owner = %short_hex(&new_owner), "dsc ownership transferred");
        state.owner = new_owner;
        Ok(())
    }
}

impl FungibleToken for DecentralizedStableCoin {
    fn address(&self) -> Address {
        self.address
    }

    fn decimals(&self) -> u8 {
        token::DECIMALS
    }

    fn total_supply(&self) -> Amount {
        self.state.read().ledger.total_supply()
    }

    fn balance_of(&self, owner: &Address) -> Amount {
        self.state.read().ledger.balance_of(owner)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.state.read().ledger.allowance(owner, spender)
    }

    fn approve(&self, owner: &Address, spender: &Address, amount: Amount) -> TokenResult<()> {
        self.state.write().ledger.approve(owner, spender, amount);
        Ok(())
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> TokenResult<()> {
        tracing::trace!(amount = %amount, "dsc transfer");
        self.state.write().ledger.transfer(from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> TokenResult<()> {
        tracing::trace!(amount = %amount, "dsc transfer_from");
        self.state.write().ledger.transfer_from(spender, from, to, amount)
    }
}

impl DebtToken for DecentralizedStableCoin {
    fn mint(&self, caller: &Address, to: &Address, amount: Amount) -> TokenResult<()> {
        let mut state = self.state.write();
        if *caller != state.owner {
            return Err(TokenError::Unauthorized { caller: *caller });
        }
        if *to == ZERO_ADDRESS {
            return Err(TokenError::ZeroAddress);
        }
        if amount.is_zero() {
            return Err(TokenError::ZeroAmount);
        }

        state.ledger.mint(to, amount)?;
        tracing::trace!(amount = %amount, supply = %state.ledger.total_supply(), "dsc minted");
        Ok(())
    }

    fn burn(&self, caller: &Address, amount: Amount) -> TokenResult<()> {
        let mut state = self.state.write();
        if *caller != state.owner {
            return Err(TokenError::Unauthorized { caller: *caller });
        }
        if amount.is_zero() {
            return Err(TokenError::ZeroAmount);
        }

        state.ledger.burn(caller, amount)?;
        tracing::trace!(amount = %amount, supply = %state.ledger.total_supply(), "dsc burned");
        Ok(())
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    const DEPLOYER: Address = [9u8; 32];
    const ENGINE: Address = [1u8; 32];
    const USER: Address = [2u8; 32];
    const ATTACKER: Address = [99u8; 32];

    fn create_test_token() -> DecentralizedStableCoin {
        let dsc = DecentralizedStableCoin::new([7u8; 32], DEPLOYER);
        dsc.transfer_ownership(&DEPLOYER, ENGINE).unwrap();
        dsc
    }

    #[test]
    fn test_metadata() {
        let dsc = create_test_token();
        assert_eq!(dsc.name(), "DecentralizedStableCoin");
        assert_eq!(dsc.symbol(), "DSC");
        assert_eq!(dsc.decimals(), 18);
        assert_eq!(dsc.owner(), ENGINE);
    }

    #[test]
    fn test_mint_authorized() {
        let dsc = create_test_token();

        dsc.mint(&ENGINE, &USER, Amount::from(1000u64)).unwrap();

        assert_eq!(dsc.balance_of(&USER), Amount::from(1000u64));
        assert_eq!(dsc.total_supply(), Amount::from(1000u64));
    }

    #[test]
    fn test_mint_unauthorized() {
        let dsc = create_test_token();

        let result = dsc.mint(&ATTACKER, &ATTACKER, Amount::from(1000u64));
        assert_eq!(result, Err(TokenError::Unauthorized { caller: ATTACKER }));

        // The deployer lost its rights with the handover
        let result = dsc.mint(&DEPLOYER, &USER, Amount::one());
        assert!(matches!(result, Err(TokenError::Unauthorized { .. })));
        assert_eq!(dsc.total_supply(), Amount::zero());
    }

    #[test]
    fn test_mint_rejects_zero() {
        let dsc = create_test_token();
        assert_eq!(dsc.mint(&ENGINE, &USER, Amount::zero()), Err(TokenError::ZeroAmount));
        assert_eq!(dsc.mint(&ENGINE, &ZERO_ADDRESS, Amount::one()), Err(TokenError::ZeroAddress));
    }

    #[test]
    fn test_burn_from_owner_balance() {
        let dsc = create_test_token();
        dsc.mint(&ENGINE, &USER, Amount::from(500u64)).unwrap();
        dsc.approve(&USER, &ENGINE, Amount::from(500u64)).unwrap();

        // Pull then burn, the way the engine repays debt
        dsc.transfer_from(&ENGINE, &USER, &ENGINE, Amount::from(200u64)).unwrap();
        dsc.burn(&ENGINE, Amount::from(200u64)).unwrap();

        assert_eq!(dsc.balance_of(&USER), Amount::from(300u64));
        assert_eq!(dsc.balance_of(&ENGINE), Amount::zero());
        assert_eq!(dsc.total_supply(), Amount::from(300u64));
    }

    #[test]
    fn test_burn_more_than_held() {
        let dsc = create_test_token();

        let result = dsc.burn(&ENGINE, Amount::one());
        assert!(matches!(result, Err(TokenError::InsufficientBalance { .. })));
    }

    #[test]
    fn test_burn_unauthorized() {
        let dsc = create_test_token();
        dsc.mint(&ENGINE, &USER, Amount::from(5u64)).unwrap();

        let result = dsc.burn(&USER, Amount::from(5u64));
        assert_eq!(result, Err(TokenError::Unauthorized { caller: USER }));
    }

    #[test]
    fn test_transfer_ownership_gated() {
        let dsc = create_test_token();
        let result = dsc.transfer_ownership(&ATTACKER, ATTACKER);
        assert!(matches!(result, Err(TokenError::Unauthorized { .. })));
        assert_eq!(dsc.owner(), ENGINE);
    }
}
