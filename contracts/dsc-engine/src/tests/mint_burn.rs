use dsc_common::{
    errors::{DscError, TokenError},
    events::{DscEvent, EventType},
    interfaces::FungibleToken,
    types::{address_from_label, Amount, U256},
};

use super::fixtures::*;

// ============ Mint ============

#[test]
fn test_reverts_if_minted_dsc_breaks_health_factor() {
    let env = TestEnv::new();
    env.weth.approve(&user(), &engine_address(), collateral_amount()).unwrap();

    // Minting the full collateral value is 100% collateralization, not 200%
    let collateral_value = env
        .engine
        .get_usd_value(&env.weth_address(), collateral_amount())
        .unwrap();
    let expected_health_factor = env
        .engine
        .calculate_health_factor(collateral_value, collateral_value)
        .unwrap();
    assert_eq!(expected_health_factor, U256::exp10(17) * 5);

    let result = env.engine.deposit_and_mint(
        &user(),
        &env.weth_address(),
        collateral_amount(),
        collateral_value,
    );

    assert_eq!(
        result,
        Err(DscError::HealthFactorBroken { health_factor: expected_health_factor })
    );
    assert_eq!(env.weth.balance_of(&user()), collateral_amount());
    assert_eq!(env.dsc.total_supply(), Amount::zero());
    assert_eq!(env.engine.nonce(), 0);
}

#[test]
fn test_can_mint_with_deposited_collateral() {
    let env = TestEnv::minted();

    assert_eq!(env.dsc.balance_of(&user()), amount_to_mint());
    let info = env.engine.get_account_information(&user()).unwrap();
    assert_eq!(info.total_dsc_minted, amount_to_mint());
    assert_eq!(info.collateral_value_in_usd, ether(20_000));
}

#[test]
fn test_reverts_if_mint_amount_breaks_health_factor() {
    let env = TestEnv::deposited();

    let result = env.engine.mint_dsc(&user(), ether(10_001));

    assert!(matches!(result, Err(DscError::HealthFactorBroken { .. })));
    assert_eq!(env.engine.account(&user()).dsc_minted, Amount::zero());
    assert_eq!(env.dsc.balance_of(&user()), Amount::zero());
}

#[test]
fn test_can_mint_up_to_threshold() {
    let env = TestEnv::deposited();

    // $20,000 at a 50% threshold supports exactly 10,000 DSC
    env.engine.mint_dsc(&user(), ether(10_000)).unwrap();

    assert_eq!(env.engine.health_factor(&user()).unwrap(), ether(1));
}

#[test]
fn test_reverts_if_mint_amount_is_zero() {
    let env = TestEnv::deposited();
    assert_eq!(env.engine.mint_dsc(&user(), Amount::zero()), Err(DscError::ZeroAmount));
}

#[test]
fn test_can_mint_dsc() {
    let env = TestEnv::deposited();

    env.engine.mint_dsc(&user(), amount_to_mint()).unwrap();

    assert_eq!(env.dsc.balance_of(&user()), amount_to_mint());
    assert_eq!(
        env.engine.events().last(),
        Some(&DscEvent::DscMinted { user: user(), amount: amount_to_mint(), nonce: 2 })
    );
}

#[test]
fn test_mint_without_collateral_fails() {
    let env = TestEnv::new();

    let result = env.engine.mint_dsc(&user(), Amount::one());
    assert_eq!(result, Err(DscError::HealthFactorBroken { health_factor: Amount::zero() }));
}

#[test]
fn test_mint_fails_when_engine_does_not_own_dsc() {
    let env = TestEnv::deposited();
    env.dsc
        .transfer_ownership(&engine_address(), address_from_label("someone_else"))
        .unwrap();

    let result = env.engine.mint_dsc(&user(), amount_to_mint());

    assert!(matches!(
        result,
        Err(DscError::TransferFailed { source: TokenError::Unauthorized { .. }, .. })
    ));
    assert_eq!(env.engine.account(&user()).dsc_minted, Amount::zero());
    assert_eq!(env.engine.nonce(), 1);
}

#[test]
fn test_deposit_and_mint_returns_collateral_when_mint_fails() {
    let env = TestEnv::new();
    env.dsc
        .transfer_ownership(&engine_address(), address_from_label("someone_else"))
        .unwrap();
    env.weth.approve(&user(), &engine_address(), collateral_amount()).unwrap();
    let before = Snapshot::take(&env, &[user()]);

    let result = env.engine.deposit_and_mint(
        &user(),
        &env.weth_address(),
        collateral_amount(),
        amount_to_mint(),
    );

    assert!(matches!(result, Err(DscError::TransferFailed { .. })));
    let after = Snapshot::take(&env, &[user()]);
    assert_eq!(after, before);
    assert_eq!(env.weth.balance_of(&engine_address()), Amount::zero());
    assert_eq!(env.weth.allowance(&user(), &engine_address()), collateral_amount());

    // With the token handed back the identical call goes through
    env.dsc
        .transfer_ownership(&address_from_label("someone_else"), engine_address())
        .unwrap();
    env.engine
        .deposit_and_mint(&user(), &env.weth_address(), collateral_amount(), amount_to_mint())
        .unwrap();
    assert_eq!(env.dsc.balance_of(&user()), amount_to_mint());
}

// ============ Burn ============

#[test]
fn test_cant_burn_more_than_user_has() {
    let env = TestEnv::new();
    env.dsc.approve(&user(), &engine_address(), Amount::one()).unwrap();

    let result = env.engine.burn_dsc(&user(), Amount::one());

    assert_eq!(
        result,
        Err(DscError::InsufficientDebt { minted: Amount::zero(), requested: Amount::one() })
    );
}

#[test]
fn test_can_burn_dsc() {
    let env = TestEnv::minted();
    env.dsc.approve(&user(), &engine_address(), amount_to_mint()).unwrap();

    env.engine.burn_dsc(&user(), amount_to_mint()).unwrap();

    assert_eq!(env.dsc.balance_of(&user()), Amount::zero());
    assert_eq!(env.dsc.total_supply(), Amount::zero());
    assert_eq!(env.engine.account(&user()).dsc_minted, Amount::zero());
    assert_eq!(env.engine.health_factor(&user()).unwrap(), U256::MAX);

    let burned = env.engine.events();
    let burned: Vec<_> = burned
        .iter()
        .filter(|e| e.event_type() == EventType::DscBurned)
        .collect();
    assert_eq!(
        burned,
        vec![&DscEvent::DscBurned {
            on_behalf_of: user(),
            dsc_from: user(),
            amount: amount_to_mint(),
            nonce: 2,
        }]
    );
}

#[test]
fn test_burn_without_allowance_fails() {
    let env = TestEnv::minted();
    let before = Snapshot::take(&env, &[user()]);

    let result = env.engine.burn_dsc(&user(), amount_to_mint());

    assert!(matches!(
        result,
        Err(DscError::TransferFailed { source: TokenError::InsufficientAllowance { .. }, .. })
    ));
    assert_eq!(Snapshot::take(&env, &[user()]), before);
}

#[test]
fn test_burn_returns_dsc_when_burn_fails() {
    let env = TestEnv::minted();
    env.dsc.approve(&user(), &engine_address(), amount_to_mint()).unwrap();
    // The pull still succeeds, the burn is refused
    env.dsc
        .transfer_ownership(&engine_address(), address_from_label("someone_else"))
        .unwrap();
    let before = Snapshot::take(&env, &[user()]);

    let result = env.engine.burn_dsc(&user(), amount_to_mint());

    assert!(matches!(
        result,
        Err(DscError::TransferFailed { source: TokenError::Unauthorized { .. }, .. })
    ));
    assert_eq!(Snapshot::take(&env, &[user()]), before);
    assert_eq!(env.dsc.balance_of(&user()), amount_to_mint());
    assert_eq!(env.dsc.balance_of(&engine_address()), Amount::zero());
    assert_eq!(env.dsc.allowance(&user(), &engine_address()), amount_to_mint());
}

#[test]
fn test_burn_after_transferring_dsc_away() {
    let env = TestEnv::minted();
    let friend = address_from_label("friend");
    env.dsc.transfer(&user(), &friend, ether(60)).unwrap();
    env.dsc.approve(&user(), &engine_address(), amount_to_mint()).unwrap();

    // Debt is 100 but the user only holds 40
    let result = env.engine.burn_dsc(&user(), amount_to_mint());
    assert!(matches!(
        result,
        Err(DscError::TransferFailed { source: TokenError::InsufficientBalance { .. }, .. })
    ));

    env.engine.burn_dsc(&user(), ether(40)).unwrap();
    assert_eq!(env.engine.account(&user()).dsc_minted, ether(60));
}

// ============ Health Factor ============

#[test]
fn test_properly_reports_health_factor() {
    let env = TestEnv::minted();

    // ($20,000 * 0.5) / 100 = 100
    assert_eq!(env.engine.health_factor(&user()).unwrap(), ether(100));
}

#[test]
fn test_health_factor_can_go_below_one() {
    let env = TestEnv::minted();

    env.set_eth_price(18_00000000);

    // (10 * $18 * 0.5) / 100 = 0.9
    assert_eq!(
        env.engine.health_factor(&user()).unwrap(),
        U256::from(900_000_000_000_000_000u64)
    );
}

#[test]
fn test_health_factor_without_debt_is_max() {
    let env = TestEnv::deposited();
    assert_eq!(env.engine.health_factor(&user()).unwrap(), U256::MAX);
    assert_eq!(
        env.engine.health_factor(&address_from_label("stranger")).unwrap(),
        U256::MAX
    );
}

#[test]
fn test_health_factor_propagates_invalid_price() {
    let env = TestEnv::minted();
    env.eth_usd.set_valid(false);

    assert!(matches!(
        env.engine.health_factor(&user()),
        Err(DscError::StaleOrInvalidPrice { .. })
    ));
    assert!(matches!(
        env.engine.mint_dsc(&user(), Amount::one()),
        Err(DscError::StaleOrInvalidPrice { .. })
    ));
}

#[test]
fn test_calculate_health_factor_is_pure() {
    let env = TestEnv::new();

    assert_eq!(
        env.engine.calculate_health_factor(ether(100), ether(20_000)).unwrap(),
        ether(100)
    );
    assert_eq!(
        env.engine.calculate_health_factor(Amount::zero(), ether(1)).unwrap(),
        U256::MAX
    );
    assert_eq!(env.engine.nonce(), 0);
}
