//! Solver-directed multi-pool deposits and withdrawals.

use odra::casper_types::U256;
use odra::prelude::Addressable;
use odra::host::HostRef;
use pretty_assertions::assert_eq;

use cspr_allocator_contracts::access_control::ROLE_SOLVER;
use cspr_allocator_contracts::errors::AllocatorError;
use cspr_allocator_contracts::types::RATE_SCALE;

use crate::fixture::{leg, units, Allocator, FULL};

fn solver_setup(fee_bps: u32) -> (Allocator, odra::prelude::Address, odra::prelude::Address) {
    let mut a = Allocator::new(fee_bps);
    let p0 = a.add_fixed_pool(600_000).address().clone();
    let p1 = a.add_fixed_pool(400_000).address().clone();
    let solver = a.solver;
    a.fund(solver, 100_000);
    a.router.grant_role(ROLE_SOLVER, solver);

    let router = a.router_addr();
    a.env.set_caller(solver);
    a.stable.approve(router, units(100_000));
    (a, p0, p1)
}

#[test]
fn test_solver_deposit_by_assets_splits_across_legs() {
    let (mut a, p0, p1) = solver_setup(0);
    let user = a.user;

    let shares = a
        .router
        .solver_deposit_by_assets(vec![leg(p0, 60_000), leg(p1, 40_000)], units(100_000), user);

    assert_eq!(shares, units(100_000));
    assert_eq!(a.share.balance_of(user), units(100_000));
    assert_eq!(a.pool_value(p0), units(60_000));
    assert_eq!(a.pool_value(p1), units(40_000));
    assert_eq!(a.stable.balance_of(a.solver), U256::zero());
    a.assert_nav_identity();
}

#[test]
fn test_solver_withdrawals_burn_owner_shares() {
    let (mut a, p0, p1) = solver_setup(350);
    let user = a.user;
    let solver = a.solver;
    a.router
        .solver_deposit_by_assets(vec![leg(p0, 60_000), leg(p1, 40_000)], U256::zero(), user);

    a.env.set_caller(user);
    a.share.approve(solver, units(100_000));

    // By assets: 20_000 gross, fee floor(20_000 * 0.035%) = 7
    a.env.set_caller(solver);
    let net = a
        .router
        .solver_withdraw_by_assets(vec![leg(p0, 20_000)], units(20_000), solver, user);
    assert_eq!(net, units(19_993));
    assert_eq!(a.share.balance_of(user), units(80_000));
    assert_eq!(a.pool_value(p0), units(40_000));

    // By shares: 40_000 pool shares preview to 40_000 gross, fee 14
    let (net, fee) = a
        .router
        .solver_withdraw_by_shares(vec![leg(p1, 40_000)], units(40_000), solver, user);
    assert_eq!(net, units(39_986));
    assert_eq!(fee, units(14));
    assert_eq!(a.pool_value(p1), U256::zero());
    assert_eq!(a.stable.balance_of(solver), units(19_993 + 39_986));

    assert_eq!(a.router.idle_balance(), units(21));
    assert_eq!(a.router.get_fee_stats().total_fees_collected, units(21));
    a.assert_nav_identity();
}

#[test]
fn test_solver_bounds() {
    let (mut a, p0, p1) = solver_setup(0);
    let user = a.user;
    let solver = a.solver;

    assert_eq!(
        a.router.try_solver_deposit_by_assets(vec![leg(p0, 100)], units(101), user),
        Err(AllocatorError::SharesBelowMinimum.into())
    );

    a.router
        .solver_deposit_by_assets(vec![leg(p0, 600), leg(p1, 400)], U256::zero(), user);
    a.env.set_caller(user);
    a.share.approve(solver, units(1_000));

    a.env.set_caller(solver);
    assert_eq!(
        a.router
            .try_solver_withdraw_by_assets(vec![leg(p0, 100)], units(99), solver, user),
        Err(AllocatorError::SharesAboveMaximum.into())
    );
    assert_eq!(
        a.router
            .try_solver_withdraw_by_shares(vec![leg(p1, 100)], units(99), solver, user),
        Err(AllocatorError::SharesAboveMaximum.into())
    );
}

#[test]
fn test_solver_leg_validation() {
    let (mut a, p0, _p1) = solver_setup(0);
    let user = a.user;
    let unknown = a.env.get_account(8);

    assert_eq!(
        a.router.try_solver_deposit_by_assets(vec![], U256::zero(), user),
        Err(AllocatorError::EmptyLegs.into())
    );
    assert_eq!(
        a.router
            .try_solver_deposit_by_assets(vec![leg(p0, 10), leg(p0, 10)], U256::zero(), user),
        Err(AllocatorError::DuplicatePool.into())
    );
    assert_eq!(
        a.router.try_solver_deposit_by_assets(vec![leg(p0, 0)], U256::zero(), user),
        Err(AllocatorError::ZeroAmount.into())
    );
    assert_eq!(
        a.router
            .try_solver_deposit_by_assets(vec![leg(unknown, 10)], U256::zero(), user),
        Err(AllocatorError::PoolNotFound.into())
    );
}

#[test]
fn test_solver_role_required() {
    let (mut a, p0, _p1) = solver_setup(0);
    let user = a.user;

    a.env.set_caller(user);
    assert_eq!(
        a.router.try_solver_deposit_by_assets(vec![leg(p0, 10)], U256::zero(), user),
        Err(AllocatorError::Unauthorized.into())
    );
    assert_eq!(
        a.router
            .try_solver_withdraw_by_shares(vec![leg(p0, 10)], units(10), user, user),
        Err(AllocatorError::Unauthorized.into())
    );
}

#[test]
fn test_solver_round_trip_through_share_token() {
    let (mut a, p0, p1) = solver_setup(0);
    let user = a.user;
    let solver = a.solver;

    let shares = a
        .router
        .solver_deposit_by_assets(vec![leg(p0, 6_000), leg(p1, 4_000)], units(10_000), user);
    assert_eq!(shares, units(10_000));
    assert_eq!(a.share.total_supply(), units(10_000));

    a.env.set_caller(user);
    a.share.approve(solver, units(10_000));
    a.env.set_caller(solver);
    let (net, fee) = a.router.solver_withdraw_by_shares(
        vec![leg(p0, 6_000), leg(p1, 4_000)],
        units(10_000),
        user,
        user,
    );

    assert_eq!(net, units(10_000));
    assert_eq!(fee, U256::zero());
    assert_eq!(a.share.balance_of(user), U256::zero());
    assert_eq!(a.share.total_supply(), U256::zero());
    assert_eq!(a.share.allowance(user, solver), U256::zero());
    assert_eq!(a.stable.balance_of(user), units(10_000));
    assert_eq!(a.router.total_managed_assets(), U256::zero());
}

#[test]
fn test_solver_deposit_by_shares_pulls_stable_and_tracks_yield() {
    let mut a = Allocator::new(0);
    let (mut yield_vault, _adapter) = a.add_wrapped_pool(FULL);
    let pool = yield_vault.address().clone();
    let router = a.router_addr();
    let solver = a.solver;
    let user = a.user;
    a.fund(solver, 1_000);
    a.router.grant_role(ROLE_SOLVER, solver);
    a.env.set_caller(solver);
    a.stable.approve(router, units(1_000));

    // Empty vault mints 1:1
    let shares = a
        .router
        .solver_deposit_by_shares(vec![leg(pool, 500)], units(500), user);
    assert_eq!(shares, units(500));
    assert_eq!(a.vault.pool_balance(pool), units(500));
    assert_eq!(a.stable.balance_of(solver), units(500));

    // Yield raises the vault's exchange rate and the allocator's backing
    a.fund(a.admin, 100);
    a.stable.approve(pool, units(100));
    yield_vault.accrue_yield(units(100));
    assert_eq!(a.pool_value(pool), units(600));
    assert_eq!(a.share.total_assets(), units(600));

    // 100 more pool shares now cost 120 stable
    a.env.set_caller(solver);
    let shares = a
        .router
        .solver_deposit_by_shares(vec![leg(pool, 100)], units(100), user);
    assert_eq!(shares, units(100));
    assert_eq!(a.vault.pool_balance(pool), units(600));
    assert_eq!(a.stable.balance_of(solver), units(380));
    assert_eq!(a.pool_value(pool), units(720));

    // 300 of 600 allocator shares is worth 360
    let net = a.redeem(user, units(300));
    assert_eq!(net, units(360));
    assert_eq!(a.pool_value(pool), units(360));
    a.assert_nav_identity();
}

#[test]
fn test_solver_deposit_by_shares_rejects_short_mint() {
    let mut a = Allocator::new(0);
    let mut synthetic = a.add_synthetic_pool(FULL);
    let pool = synthetic.address().clone();
    let router = a.router_addr();
    let solver = a.solver;
    a.fund(solver, 1_000);
    a.router.grant_role(ROLE_SOLVER, solver);

    synthetic.set_execution_haircut_bps(10_000);
    a.env.set_caller(solver);
    a.stable.approve(router, units(1_000));
    assert_eq!(
        a.router
            .try_solver_deposit_by_shares(vec![leg(pool, 1_000)], U256::zero(), a.user),
        Err(AllocatorError::SlippageExceeded.into())
    );
    assert_eq!(a.stable.balance_of(solver), units(1_000));
    assert_eq!(a.vault.pool_balance(pool), U256::zero());
}

#[test]
fn test_solver_withdraw_by_shares_rounding_must_reconcile() {
    let mut a = Allocator::new(0);
    let p0 = a.add_fixed_pool(600_000).address().clone();
    let mut p1_ref = a.add_fixed_pool(400_000);
    let p1 = p1_ref.address().clone();
    let user = a.user;
    let solver = a.solver;
    a.fund(user, 2_000);
    a.deposit(user, 1_000);
    a.deposit(user, 1_000);
    assert_eq!(a.pool_value(p0), units(1_000));
    assert_eq!(a.pool_value(p1), units(1_000));
    a.router.grant_role(ROLE_SOLVER, solver);

    // p1 now values its shares at 5.0, so one allocator share is worth 3
    p1_ref.set_rate(U256::from(RATE_SCALE) * U256::from(5u64));
    assert_eq!(a.router.token_backing(), units(6_000));

    a.env.set_caller(user);
    a.share.approve(solver, units(2_000));
    a.env.set_caller(solver);

    // One pool share pays 1 but burns a whole allocator share worth 3
    assert_eq!(
        a.router
            .try_solver_withdraw_by_shares(vec![leg(p0, 1)], units(1), solver, user),
        Err(AllocatorError::RoundingMismatch.into())
    );

    let (net, fee) = a
        .router
        .solver_withdraw_by_shares(vec![leg(p0, 3)], units(1), solver, user);
    assert_eq!(net, units(3));
    assert_eq!(fee, U256::zero());
    assert_eq!(a.share.balance_of(user), units(1_999));
}

#[test]
fn test_solver_withdraw_surplus_is_folded_into_fee() {
    let mut a = Allocator::new(350);
    let mut synthetic = a.add_synthetic_pool(FULL);
    let pool = synthetic.address().clone();
    let router = a.router_addr();
    let user = a.user;
    let solver = a.solver;
    a.fund(solver, 1_000);
    a.router.grant_role(ROLE_SOLVER, solver);
    a.env.set_caller(solver);
    a.stable.approve(router, units(1_000));
    a.router
        .solver_deposit_by_assets(vec![leg(pool, 1_000)], units(1_000), user);
    a.env.set_caller(user);
    a.share.approve(solver, units(500));

    // The pool pays 1% over its preview
    a.as_admin();
    synthetic.set_execution_premium_bps(10_000);

    // 500 gross carries no fee at 350 (floor), so the 5 surplus is the whole fee
    a.env.set_caller(solver);
    let (net, fee) = a
        .router
        .solver_withdraw_by_shares(vec![leg(pool, 500)], units(500), solver, user);
    assert_eq!(net, units(500));
    assert_eq!(fee, units(5));
    assert_eq!(a.stable.balance_of(solver), units(500));
    assert_eq!(a.router.idle_balance(), units(5));
    assert_eq!(a.router.get_fee_stats().total_fees_collected, units(5));
    assert_eq!(a.pool_value(pool), units(500));
    a.assert_nav_identity();
}
