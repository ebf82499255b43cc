//! Automatic deposit/withdraw flows, fees, shortfall and backing.

use odra::casper_types::U256;
use odra::prelude::Addressable;
use odra::host::HostRef;
use pretty_assertions::assert_eq;

use cspr_allocator_contracts::errors::AllocatorError;

use crate::fixture::{units, Allocator, FULL};

#[test]
fn test_deposits_follow_largest_deficit() {
    let mut a = Allocator::new(0);
    let p60 = a.add_fixed_pool(600_000).address().clone();
    let p25 = a.add_fixed_pool(250_000).address().clone();
    let p15 = a.add_fixed_pool(150_000).address().clone();
    let user = a.user;
    a.fund(user, 1_000);

    // Empty system: the 60% pool has the largest deficit
    assert_eq!(a.router.select_deposit_pool_view(), Some(p60));
    a.deposit(user, 100);
    assert_eq!(a.pool_value(p60), units(100));

    // Now at 100/0/0: the 25% pool is furthest below target
    assert_eq!(a.router.select_deposit_pool_view(), Some(p25));
    a.deposit(user, 100);
    assert_eq!(a.pool_value(p25), units(100));
    assert_eq!(a.pool_value(p15), U256::zero());

    a.assert_nav_identity();
}

#[test]
fn test_selection_is_deterministic() {
    let mut a = Allocator::new(0);
    a.add_fixed_pool(500_000);
    a.add_fixed_pool(500_000);
    let user = a.user;
    a.fund(user, 1_000);
    a.deposit(user, 300);

    let first = a.router.select_deposit_pool_view();
    let second = a.router.select_deposit_pool_view();
    assert_eq!(first, second);
    assert_eq!(a.router.deposit_eligible_pools(), a.router.deposit_eligible_pools());
}

#[test]
fn test_first_deposit_mints_one_to_one() {
    let mut a = Allocator::new(0);
    a.add_fixed_pool(FULL);
    let user = a.user;
    a.fund(user, 500);

    let shares = a.deposit(user, 500);
    assert_eq!(shares, units(500));
    assert_eq!(a.share.balance_of(user), units(500));
    assert_eq!(a.share.total_assets(), units(500));
    assert_eq!(a.stable.balance_of(user), U256::zero());
}

#[test]
fn test_withdrawal_fee_350_bps() {
    let mut a = Allocator::new(350);
    a.add_fixed_pool(FULL);
    let user = a.user;
    a.fund(user, 100_000);

    let shares = a.deposit(user, 100_000);
    let net = a.redeem(user, shares);

    assert_eq!(net, units(99_965));
    assert_eq!(a.stable.balance_of(user), units(99_965));
    assert_eq!(a.router.idle_balance(), units(35));
    assert_eq!(a.router.get_fee_stats().total_fees_collected, units(35));
    assert_eq!(a.router.preview_withdrawal_fee(units(100_000)), (units(99_965), units(35)));
    a.assert_nav_identity();
}

#[test]
fn test_deposit_then_redeem_returns_amount_minus_fee() {
    let mut a = Allocator::new(350);
    a.add_fixed_pool(600_000);
    a.add_fixed_pool(400_000);
    let user = a.user;
    a.fund(user, 10_000);

    let shares = a.deposit(user, 10_000);
    let net = a.redeem(user, shares);

    // fee = floor(10_000 * 350 / 1_000_000) = 3
    assert_eq!(net, units(9_997));
    assert_eq!(a.share.total_supply(), U256::zero());
}

#[test]
fn test_withdrawal_uses_single_pool_or_fails() {
    let mut a = Allocator::new(0);
    a.add_fixed_pool(500_000);
    a.add_fixed_pool(500_000);
    let user = a.user;
    a.fund(user, 200);
    a.deposit(user, 100);
    a.deposit(user, 100);

    assert_eq!(a.router.max_single_pool_withdrawal(), units(100));
    assert_eq!(
        a.try_redeem(user, units(150)),
        Err(AllocatorError::LiquidityExhausted.into())
    );

    let net = a.redeem(user, units(100));
    assert_eq!(net, units(100));
    a.assert_nav_identity();
}

#[test]
fn test_deposit_cap() {
    let mut a = Allocator::new(0);
    a.add_fixed_pool(FULL);
    let user = a.user;
    a.fund(user, 1_000);
    a.router.set_deposit_cap(units(150));

    a.deposit(user, 100);
    assert_eq!(a.try_deposit(user, 100), Err(AllocatorError::DepositCapExceeded.into()));

    a.router.set_deposit_cap(U256::zero());
    a.deposit(user, 100);
    assert_eq!(a.router.total_managed_assets(), units(200));
}

#[test]
fn test_shortfall_reduces_backing() {
    let mut a = Allocator::new(0);
    a.add_fixed_pool(FULL);
    let user = a.user;
    a.fund(user, 150);
    a.deposit(user, 150);

    a.router.record_shortfall(units(20));
    assert_eq!(a.router.get_shortfall(), units(20));
    assert_eq!(a.router.token_backing(), units(130));
    assert_eq!(a.share.convert_to_assets(units(150)), units(130));

    // Clearing more than recorded floors at zero
    a.router.clear_shortfall(units(25));
    assert_eq!(a.router.get_shortfall(), U256::zero());
    assert_eq!(a.router.token_backing(), units(150));

    assert_eq!(
        a.router.try_record_shortfall(units(151)),
        Err(AllocatorError::ShortfallExceedsAssets.into())
    );

    a.env.set_caller(user);
    assert_eq!(
        a.router.try_record_shortfall(units(1)),
        Err(AllocatorError::Unauthorized.into())
    );
}

#[test]
fn test_reinvest_fees_pays_keeper_and_compounds() {
    let mut a = Allocator::new(350);
    let pool = a.add_fixed_pool(FULL).address().clone();
    let user = a.user;
    a.fund(user, 100_000);
    let shares = a.deposit(user, 100_000);
    a.redeem(user, shares);
    assert_eq!(a.router.idle_balance(), units(35));

    let keeper = a.env.get_account(5);
    a.env.set_caller(keeper);
    assert_eq!(a.router.try_reinvest_fees(), Err(AllocatorError::DefaultPoolNotSet.into()));

    a.as_admin();
    a.router.set_default_pool(Some(pool));
    a.router.set_reinvest_incentive_bps(50_000);

    a.env.set_caller(keeper);
    let (reinvested, incentive) = a.router.reinvest_fees();
    // incentive = floor(35 * 5%) = 1
    assert_eq!(incentive, units(1));
    assert_eq!(reinvested, units(34));
    assert_eq!(a.stable.balance_of(keeper), units(1));
    assert_eq!(a.pool_value(pool), units(34));
    assert_eq!(a.router.idle_balance(), U256::zero());

    assert_eq!(a.router.try_reinvest_fees(), Err(AllocatorError::ZeroAmount.into()));

    let stats = a.router.get_fee_stats();
    assert_eq!(stats.total_reinvested, units(34));
    assert_eq!(stats.total_incentives_paid, units(1));
    a.assert_nav_identity();
}

#[test]
fn test_handle_entry_points_are_token_only() {
    let mut a = Allocator::new(0);
    a.add_fixed_pool(FULL);
    let user = a.user;

    a.env.set_caller(user);
    assert_eq!(
        a.router.try_handle_deposit(user, units(10), units(10), user),
        Err(AllocatorError::UnauthorizedToken.into())
    );
    assert_eq!(
        a.router.try_handle_withdraw(user, user, user, units(10), units(10)),
        Err(AllocatorError::UnauthorizedToken.into())
    );
}

#[test]
fn test_pause_blocks_user_flows() {
    let mut a = Allocator::new(0);
    a.add_fixed_pool(FULL);
    let user = a.user;
    let operator = a.operator;
    a.fund(user, 100);

    a.router.pause();
    assert!(a.router.is_paused());
    assert_eq!(a.try_deposit(user, 100), Err(AllocatorError::Paused.into()));
    assert_eq!(a.router.try_pause(), Err(AllocatorError::Paused.into()));

    a.env.set_caller(user);
    assert_eq!(a.router.try_unpause(), Err(AllocatorError::Unauthorized.into()));

    a.as_admin();
    a.router.unpause();
    assert_eq!(a.router.try_unpause(), Err(AllocatorError::NotPaused.into()));
    a.deposit(user, 100);

    // Pauser role may pause but not unpause
    a.router.grant_role(3, operator);
    a.env.set_caller(operator);
    a.router.pause();
    assert_eq!(a.router.try_unpause(), Err(AllocatorError::Unauthorized.into()));
}
