//! Operator rebalancing between pools.

use odra::casper_types::U256;
use odra::prelude::Addressable;
use odra::host::HostRef;
use pretty_assertions::assert_eq;

use cspr_allocator_contracts::access_control::ROLE_OPERATOR;
use cspr_allocator_contracts::errors::AllocatorError;
use cspr_allocator_contracts::types::{PoolStatus, RATE_SCALE};

use crate::fixture::{units, Allocator};

#[test]
fn test_rebalance_by_value_moves_value() {
    let mut a = Allocator::new(0);
    let p0 = a.add_fixed_pool(600_000).address().clone();
    let p1 = a.add_fixed_pool(400_000).address().clone();
    let user = a.user;
    a.fund(user, 1_000);
    a.deposit(user, 1_000);
    assert_eq!(a.pool_value(p0), units(1_000));

    let minted = a.router.rebalance_by_value(p0, p1, units(400), units(400));
    assert_eq!(minted, units(400));
    assert_eq!(a.pool_value(p0), units(600));
    assert_eq!(a.pool_value(p1), units(400));
    assert_eq!(a.router.total_managed_assets(), units(1_000));
    a.assert_nav_identity();
}

#[test]
fn test_rebalance_below_dust_is_noop() {
    let mut a = Allocator::new(0);
    let p0 = a.add_fixed_pool(600_000).address().clone();
    let p1 = a.add_fixed_pool(400_000).address().clone();
    let user = a.user;
    a.fund(user, 1_000);
    a.deposit(user, 1_000);

    assert_eq!(a.router.rebalance_by_value(p0, p1, units(4), U256::zero()), U256::zero());
    assert_eq!(a.router.rebalance_by_shares(p0, p1, units(4), U256::zero()), U256::zero());
    assert_eq!(a.pool_value(p0), units(1_000));
    assert_eq!(a.pool_value(p1), U256::zero());
}

#[test]
fn test_rebalance_min_result_and_pair_checks() {
    let mut a = Allocator::new(0);
    let p0 = a.add_fixed_pool(600_000).address().clone();
    let p1 = a.add_fixed_pool(400_000).address().clone();
    let user = a.user;
    a.fund(user, 1_000);
    a.deposit(user, 1_000);

    assert_eq!(
        a.router.try_rebalance_by_value(p0, p1, units(100), units(101)),
        Err(AllocatorError::SlippageExceeded.into())
    );
    assert_eq!(
        a.router.try_rebalance_by_value(p0, p0, units(100), U256::zero()),
        Err(AllocatorError::DuplicatePool.into())
    );

    a.router.set_pool_status(p1, PoolStatus::Suspended);
    assert_eq!(
        a.router.try_rebalance_by_value(p0, p1, units(100), U256::zero()),
        Err(AllocatorError::PoolNotDepositEligible.into())
    );

    a.env.set_caller(user);
    assert_eq!(
        a.router.try_rebalance_by_value(p0, p1, units(100), U256::zero()),
        Err(AllocatorError::Unauthorized.into())
    );
}

#[test]
fn test_rebalance_via_external_liquidity() {
    let mut a = Allocator::new(0);
    let p0_ref = a.add_fixed_pool(600_000);
    let p0 = p0_ref.address().clone();
    let p1 = a.add_fixed_pool(400_000).address().clone();
    let user = a.user;
    let operator = a.operator;
    a.fund(user, 1_000);
    a.deposit(user, 1_000);
    a.fund(operator, 300);
    a.router.grant_role(ROLE_OPERATOR, operator);

    let router = a.router_addr();
    a.env.set_caller(operator);
    a.stable.approve(router, units(300));
    let minted = a.router.rebalance_via_external_liquidity(p0, p1, units(300), units(300));

    assert_eq!(minted, units(300));
    assert_eq!(a.pool_value(p1), units(300));
    assert_eq!(a.pool_value(p0), units(700));
    // Operator was paid in source pool shares worth what it supplied
    assert_eq!(p0_ref.balance_of(operator), units(300));
    assert_eq!(a.stable.balance_of(operator), U256::zero());
    assert_eq!(a.router.total_managed_assets(), units(1_000));
}

#[test]
fn test_dust_blocks_pool_removal_until_drained() {
    let mut a = Allocator::new(0);
    let p0 = a.add_fixed_pool(600_000).address().clone();
    let p1 = a.add_fixed_pool(400_000).address().clone();
    let user = a.user;
    a.fund(user, 1_000);
    a.deposit(user, 1_000);

    assert_eq!(a.router.try_remove_adapter(p0), Err(AllocatorError::PoolNotWoundDown.into()));

    a.router.set_pool_status(p0, PoolStatus::Suspended);
    assert_eq!(a.router.try_remove_pool(p0), Err(AllocatorError::AdapterStillRegistered.into()));
    assert_eq!(a.router.try_remove_adapter(p0), Err(AllocatorError::BalanceAboveDust.into()));

    // Suspended pools stay withdrawal-eligible, so they can be drained
    let minted = a.router.rebalance_by_shares(p0, p1, units(1_000), units(1_000));
    assert_eq!(minted, units(1_000));
    assert_eq!(a.pool_value(p0), U256::zero());

    a.router.remove_adapter(p0);
    assert!(!a.vault.is_supported(p0));
    assert_eq!(a.vault.get_adapter(p0), None);

    a.router.remove_pool(p0);
    assert_eq!(a.router.pool_count(), 1);
    assert_eq!(a.router.get_pool_config(p0), None);
    assert_eq!(a.router.get_pools()[0].pool_id, p1);
    assert_eq!(a.router.total_managed_assets(), units(1_000));
    a.assert_nav_identity();
}

#[test]
fn test_value_withdrawal_must_cover_requested_value() {
    let mut a = Allocator::new(0);
    let mut synthetic = a.add_synthetic_pool(600_000);
    let s = synthetic.address().clone();
    let p = a.add_fixed_pool(400_000).address().clone();
    // 1.5 stable per share
    synthetic.set_rate(U256::from(RATE_SCALE) * U256::from(3u64) / U256::from(2u64));
    let user = a.user;
    a.fund(user, 1_000);
    a.deposit(user, 1_000);
    assert_eq!(a.pool_value(s), units(999));

    // Share quotes that round down redeem one unit short of the value asked for
    synthetic.set_round_down_share_quotes(true);
    assert_eq!(
        a.router.try_rebalance_by_value(s, p, units(100), U256::zero()),
        Err(AllocatorError::SlippageExceeded.into())
    );
    assert_eq!(a.try_redeem(user, units(101)), Err(AllocatorError::SlippageExceeded.into()));

    assert_eq!(a.pool_value(s), units(999));
    assert_eq!(a.pool_value(p), U256::zero());
    assert_eq!(a.share.balance_of(user), units(1_000));
}
