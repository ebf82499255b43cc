//! Router contract for the multi-strategy allocator.
//!
//! The router owns the pool registry and the scalar accounting state, and is
//! the only contract allowed to move shares out of the collateral vault.
//!
//! ## Flows
//!
//! - **Automatic**: the share token forwards user deposits/withdrawals; the
//!   router picks a single pool with the deterministic selector
//! - **Solver**: a solver names exact per-pool legs, by stable amount or by
//!   pool shares
//! - **Rebalance**: operators move value between pools, bounded by the dust
//!   tolerance
//! - **Fees**: withdrawal fees stay idle in the router until a keeper calls
//!   `reinvest_fees`
//!
//! Every mutating entry point is non-reentrant. A failure anywhere aborts
//! the whole call and the runtime discards all of its effects.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::access_control::{AccessControl, ROLE_OPERATOR, ROLE_PAUSER, ROLE_SOLVER};
use crate::allocation::current_weights_bps;
use crate::errors::AllocatorError;
use crate::events::{
    AdapterRegistered, AdapterRemoved, DefaultPoolUpdated, Deposited, FeesReinvested, ParameterUpdated,
    PausedStateChanged, PoolAdded, PoolRemoved, PoolStatusChanged, PoolTargetUpdated, Rebalanced,
    ShortfallCleared, ShortfallRecorded, SolverDeposit, SolverWithdraw, TargetsReplaced, Withdrawn,
};
use crate::fee_math;
use crate::interfaces::{
    Cep18TokenContractRef, CollateralCustodyContractRef, ShareIssuerContractRef, StrategyAdapterContractRef,
};
use crate::registry::PoolRegistry;
use crate::selector::{self, PoolSnapshot};
use crate::types::{
    FeeStats, PoolAllocation, PoolConfig, PoolLeg, PoolStatus, PoolTarget, RouterState, HARD_MAX_POOL_COUNT,
    MAX_DUST_TOLERANCE, MAX_REINVEST_INCENTIVE_BPS, MAX_WITHDRAWAL_FEE_BPS, WEIGHT_SCALE,
};

/// Direction a pool is probed for
#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Deposit,
    Withdraw,
}

/// Router contract - entry point of the allocator
#[odra::module(events = [
    PoolAdded, PoolRemoved, PoolTargetUpdated, PoolStatusChanged, TargetsReplaced,
    AdapterRegistered, AdapterRemoved, Deposited, Withdrawn, SolverDeposit, SolverWithdraw,
    Rebalanced, FeesReinvested, ShortfallRecorded, ShortfallCleared, ParameterUpdated,
    DefaultPoolUpdated, PausedStateChanged
])]
pub struct Router {
    /// Pool configs
    registry: SubModule<PoolRegistry>,
    /// Role assignments
    access: SubModule<AccessControl>,
    /// Stable unit token
    stable_token: Var<Address>,
    /// Collateral vault custodying pool shares
    collateral_vault: Var<Address>,
    /// Allocator share token
    share_token: Var<Option<Address>>,
    /// Minimum value delta treated as meaningful
    dust_tolerance: Var<U256>,
    /// Maximum number of registered pools
    max_pool_count: Var<u32>,
    /// Cap on total managed assets (0 = unlimited)
    deposit_cap: Var<U256>,
    /// Uncollateralized-supply ledger
    settlement_shortfall: Var<U256>,
    /// Keeper incentive on reinvested fees
    reinvest_incentive_bps: Var<u32>,
    /// Fee charged on withdrawals
    withdrawal_fee_bps: Var<u32>,
    /// Pool receiving reinvested fees
    default_pool: Var<Option<Address>>,
    /// Whether user-facing flows are paused
    paused: Var<bool>,
    /// Cumulative fee counters
    fee_stats: Var<FeeStats>,
}

#[odra::module]
impl Router {
    /// Initialize the router
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        &mut self,
        admin: Address,
        stable_token: Address,
        collateral_vault: Address,
        withdrawal_fee_bps: u32,
        dust_tolerance: U256,
        deposit_cap: U256,
        reinvest_incentive_bps: u32,
        max_pool_count: u32,
    ) {
        if withdrawal_fee_bps > MAX_WITHDRAWAL_FEE_BPS
            || reinvest_incentive_bps > MAX_REINVEST_INCENTIVE_BPS
            || dust_tolerance > U256::from(MAX_DUST_TOLERANCE)
            || max_pool_count == 0
            || max_pool_count > HARD_MAX_POOL_COUNT
        {
            self.env().revert(AllocatorError::InvalidConfig);
        }

        self.access.init(admin);
        self.stable_token.set(stable_token);
        self.collateral_vault.set(collateral_vault);
        self.share_token.set(None);
        self.dust_tolerance.set(dust_tolerance);
        self.max_pool_count.set(max_pool_count);
        self.deposit_cap.set(deposit_cap);
        self.settlement_shortfall.set(U256::zero());
        self.reinvest_incentive_bps.set(reinvest_incentive_bps);
        self.withdrawal_fee_bps.set(withdrawal_fee_bps);
        self.default_pool.set(None);
        self.paused.set(false);
        self.fee_stats.set(FeeStats::default());
    }

    // ========== Share Token Entry Points ==========

    /// Route a user deposit into the pool with the largest deficit (share token only)
    #[odra(non_reentrant)]
    pub fn handle_deposit(&mut self, initiator: Address, assets: U256, shares: U256, receiver: Address) {
        self.require_not_paused();
        self.require_share_token();
        if assets.is_zero() || shares.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        self.require_within_cap(assets);

        self.pull_stable(initiator, assets);

        let (configs, snapshots) = self.snapshots(Direction::Deposit);
        let index = match selector::select_deposit_pool(&snapshots) {
            Some(index) => index,
            None => self.env().revert(AllocatorError::PoolNotDepositEligible),
        };
        let config = configs[index].clone();
        let pool_shares = self.deposit_into_pool(&config, assets);

        self.env().emit_event(Deposited {
            initiator,
            receiver,
            pool_id: config.pool_id,
            assets,
            pool_shares,
        });
    }

    /// Serve a user withdrawal from the pool with the largest surplus that
    /// can cover it (share token only). Returns `(net, fee)`.
    #[odra(non_reentrant)]
    pub fn handle_withdraw(
        &mut self,
        initiator: Address,
        receiver: Address,
        owner: Address,
        gross_assets: U256,
        expected_net_assets: U256,
    ) -> (U256, U256) {
        self.require_not_paused();
        self.require_share_token();
        if gross_assets.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }

        let (net, fee) = fee_math::split_gross(gross_assets, self.get_withdrawal_fee_bps());
        if net < expected_net_assets {
            self.env().revert(AllocatorError::NetBelowMinimum);
        }

        let (configs, snapshots) = self.snapshots(Direction::Withdraw);
        let index = match selector::select_withdrawal_pool(&snapshots, gross_assets) {
            Ok(index) => index,
            Err(error) => self.env().revert(error),
        };
        let config = configs[index].clone();
        let received = self.withdraw_value_from_pool(&config, gross_assets);

        self.stable().transfer(receiver, net);
        self.add_fees_collected(received - net);

        self.env().emit_event(Withdrawn {
            initiator,
            receiver,
            owner,
            pool_id: config.pool_id,
            gross_assets,
            net_assets: net,
            fee,
        });
        (net, fee)
    }

    // ========== Solver Entry Points ==========

    /// Deposit stable split across the given legs; mints allocator shares to `receiver`
    #[odra(non_reentrant)]
    pub fn solver_deposit_by_assets(&mut self, legs: Vec<PoolLeg>, min_shares: U256, receiver: Address) -> U256 {
        self.require_not_paused();
        self.access.require_role(ROLE_SOLVER);
        let configs = self.validate_legs(&legs, Direction::Deposit);

        let total = legs.iter().fold(U256::zero(), |acc, leg| acc + leg.amount);
        self.require_within_cap(total);

        let shares = self.share_issuer().preview_deposit(total);
        if shares.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        if shares < min_shares {
            self.env().revert(AllocatorError::SharesBelowMinimum);
        }

        let solver = self.env().caller();
        self.pull_stable(solver, total);
        for (config, leg) in configs.iter().zip(legs.iter()) {
            self.deposit_into_pool(config, leg.amount);
        }

        self.share_issuer().mint_for(solver, receiver, total, shares);

        self.env().emit_event(SolverDeposit {
            solver,
            receiver,
            assets: total,
            shares,
            legs: legs.len() as u32,
        });
        shares
    }

    /// Deposit enough stable to mint at least each leg's pool share amount;
    /// mints allocator shares to `receiver` for the stable pulled
    #[odra(non_reentrant)]
    pub fn solver_deposit_by_shares(&mut self, legs: Vec<PoolLeg>, min_shares: U256, receiver: Address) -> U256 {
        self.require_not_paused();
        self.access.require_role(ROLE_SOLVER);
        let configs = self.validate_legs(&legs, Direction::Deposit);

        let amounts: Vec<U256> = configs
            .iter()
            .zip(legs.iter())
            .map(|(config, leg)| self.adapter(config).preview_mint(leg.amount))
            .collect();
        let total = amounts.iter().fold(U256::zero(), |acc, amount| acc + *amount);
        if total.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        self.require_within_cap(total);

        let shares = self.share_issuer().preview_deposit(total);
        if shares.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        if shares < min_shares {
            self.env().revert(AllocatorError::SharesBelowMinimum);
        }

        let solver = self.env().caller();
        self.pull_stable(solver, total);
        for ((config, leg), amount) in configs.iter().zip(legs.iter()).zip(amounts.iter()) {
            let minted = self.deposit_into_pool(config, *amount);
            if minted < leg.amount {
                self.env().revert(AllocatorError::SlippageExceeded);
            }
        }

        self.share_issuer().mint_for(solver, receiver, total, shares);

        self.env().emit_event(SolverDeposit {
            solver,
            receiver,
            assets: total,
            shares,
            legs: legs.len() as u32,
        });
        shares
    }

    /// Withdraw the given stable amounts per leg; burns `owner`'s shares and
    /// pays the net to `receiver`. Returns the net amount.
    #[odra(non_reentrant)]
    pub fn solver_withdraw_by_assets(
        &mut self,
        legs: Vec<PoolLeg>,
        max_shares_burned: U256,
        receiver: Address,
        owner: Address,
    ) -> U256 {
        self.require_not_paused();
        self.access.require_role(ROLE_SOLVER);
        let configs = self.validate_legs(&legs, Direction::Withdraw);

        let gross = legs.iter().fold(U256::zero(), |acc, leg| acc + leg.amount);
        let burn_shares = self.share_issuer().preview_withdraw(gross);
        if burn_shares > max_shares_burned {
            self.env().revert(AllocatorError::SharesAboveMaximum);
        }

        let mut received = U256::zero();
        for (config, leg) in configs.iter().zip(legs.iter()) {
            received = received + self.withdraw_value_from_pool(config, leg.amount);
        }

        let (net, fee) = fee_math::split_gross(gross, self.get_withdrawal_fee_bps());
        let solver = self.env().caller();
        self.stable().transfer(receiver, net);
        self.share_issuer().burn_for(solver, receiver, owner, gross, burn_shares);
        self.add_fees_collected(received - net);

        self.env().emit_event(SolverWithdraw {
            solver,
            receiver,
            owner,
            net_assets: net,
            fee,
            shares: burn_shares,
            legs: legs.len() as u32,
        });
        net
    }

    /// Withdraw the given pool share amounts per leg. Returns `(net, fee)`;
    /// any execution surplus over the previewed gross is added to the fee.
    #[odra(non_reentrant)]
    pub fn solver_withdraw_by_shares(
        &mut self,
        legs: Vec<PoolLeg>,
        max_shares_burned: U256,
        receiver: Address,
        owner: Address,
    ) -> (U256, U256) {
        self.require_not_paused();
        self.access.require_role(ROLE_SOLVER);
        let configs = self.validate_legs(&legs, Direction::Withdraw);

        let mut gross = U256::zero();
        for (config, leg) in configs.iter().zip(legs.iter()) {
            gross = gross + self.adapter(config).preview_withdraw_from_strategy(leg.amount);
        }
        if gross.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }

        let (net, fee) = fee_math::split_gross(gross, self.get_withdrawal_fee_bps());
        let burn_shares = self.share_issuer().preview_withdraw(gross);
        if burn_shares > max_shares_burned {
            self.env().revert(AllocatorError::SharesAboveMaximum);
        }
        let net_by_shares = self.share_issuer().preview_redeem(burn_shares);
        if !fee_math::reconciles(net, net_by_shares) {
            self.env().revert(AllocatorError::RoundingMismatch);
        }

        let mut received = U256::zero();
        for (config, leg) in configs.iter().zip(legs.iter()) {
            received = received + self.withdraw_shares_from_pool(config, leg.amount);
        }
        // each leg pays out at least its preview
        let fee = fee + (received - gross);

        let solver = self.env().caller();
        self.stable().transfer(receiver, net);
        self.share_issuer().burn_for(solver, receiver, owner, gross, burn_shares);
        self.add_fees_collected(fee);

        self.env().emit_event(SolverWithdraw {
            solver,
            receiver,
            owner,
            net_assets: net,
            fee,
            shares: burn_shares,
            legs: legs.len() as u32,
        });
        (net, fee)
    }

    // ========== Rebalancing ==========

    /// Redeem `shares` of `from` and deposit the proceeds into `to`
    #[odra(non_reentrant)]
    pub fn rebalance_by_shares(&mut self, from: Address, to: Address, shares: U256, min_result: U256) -> U256 {
        self.require_not_paused();
        self.access.require_role_or_admin(ROLE_OPERATOR);
        let (from_config, to_config) = self.rebalance_pair(from, to);
        if shares.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }

        let value = self.adapter(&from_config).preview_withdraw_from_strategy(shares);
        if value < self.get_dust_tolerance() {
            return U256::zero();
        }

        let pulled = self.withdraw_shares_from_pool(&from_config, shares);
        self.redeposit(&from_config, &to_config, pulled, min_result)
    }

    /// Move `value` stable worth of `from` into `to`
    #[odra(non_reentrant)]
    pub fn rebalance_by_value(&mut self, from: Address, to: Address, value: U256, min_result: U256) -> U256 {
        self.require_not_paused();
        self.access.require_role_or_admin(ROLE_OPERATOR);
        let (from_config, to_config) = self.rebalance_pair(from, to);
        if value.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        if value < self.get_dust_tolerance() {
            return U256::zero();
        }

        let pulled = self.withdraw_value_from_pool(&from_config, value);
        self.redeposit(&from_config, &to_config, pulled, min_result)
    }

    /// Deposit `amount` stable supplied by the operator into `to`, then
    /// release `from` shares worth no more than what was deposited
    #[odra(non_reentrant)]
    pub fn rebalance_via_external_liquidity(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
        min_result: U256,
    ) -> U256 {
        self.require_not_paused();
        self.access.require_role_or_admin(ROLE_OPERATOR);
        let (from_config, to_config) = self.rebalance_pair(from, to);
        if amount.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        let dust = self.get_dust_tolerance();
        if amount < dust {
            return U256::zero();
        }

        let operator = self.env().caller();
        self.pull_stable(operator, amount);
        let minted = self.deposit_into_pool(&to_config, amount);
        let deposited = self.adapter(&to_config).value_of(to, minted);
        self.check_rebalance_result(amount, deposited, minted, min_result);

        let from_adapter = self.adapter(&from_config);
        let mut release = from_adapter.preview_shares_for_amount(deposited);
        if !release.is_zero() && from_adapter.value_of(from, release) > deposited {
            release = release - U256::one();
        }
        release = release.min(self.vault().pool_balance(from));
        if !release.is_zero() {
            self.vault().transfer_shares(from, release, operator);
        }

        self.env().emit_event(Rebalanced {
            from_pool: from,
            to_pool: to,
            value_pulled: amount,
            value_deposited: deposited,
            shares_minted: minted,
        });
        minted
    }

    // ========== Fees ==========

    /// Pay the caller an incentive out of idle fees and deposit the rest into
    /// the default pool. Returns `(reinvested, incentive)`.
    #[odra(non_reentrant)]
    pub fn reinvest_fees(&mut self) -> (U256, U256) {
        self.require_not_paused();
        let idle = self.idle_balance();
        if idle.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        let pool_id = match self.default_pool.get().flatten() {
            Some(pool_id) => pool_id,
            None => self.env().revert(AllocatorError::DefaultPoolNotSet),
        };
        let config = self.registry.require(pool_id);
        if !config.status.is_deposit_eligible() {
            self.env().revert(AllocatorError::PoolNotDepositEligible);
        }

        let incentive = fee_math::incentive_for(idle, self.get_reinvest_incentive_bps());
        let reinvested = idle - incentive;
        if reinvested.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }

        let keeper = self.env().caller();
        if !incentive.is_zero() {
            self.stable().transfer(keeper, incentive);
        }
        self.deposit_into_pool(&config, reinvested);

        let mut stats = self.get_fee_stats();
        stats.total_reinvested = stats.total_reinvested + reinvested;
        stats.total_incentives_paid = stats.total_incentives_paid + incentive;
        self.fee_stats.set(stats);

        self.env().emit_event(FeesReinvested {
            keeper,
            pool_id,
            reinvested,
            incentive,
        });
        (reinvested, incentive)
    }

    // ========== Shortfall Ledger ==========

    /// Increase the shortfall; it may never exceed managed assets (admin only)
    #[odra(non_reentrant)]
    pub fn record_shortfall(&mut self, delta: U256) {
        self.access.require_admin();
        if delta.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        let shortfall = self.get_shortfall() + delta;
        if shortfall > self.total_managed_assets() {
            self.env().revert(AllocatorError::ShortfallExceedsAssets);
        }
        self.settlement_shortfall.set(shortfall);
        self.env().emit_event(ShortfallRecorded { delta, shortfall });
    }

    /// Decrease the shortfall, floored at zero (admin only)
    #[odra(non_reentrant)]
    pub fn clear_shortfall(&mut self, delta: U256) {
        self.access.require_admin();
        if delta.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        let shortfall = self.get_shortfall().saturating_sub(delta);
        self.settlement_shortfall.set(shortfall);
        self.env().emit_event(ShortfallCleared { delta, shortfall });
    }

    // ========== Pool Lifecycle (admin) ==========

    /// Bind an adapter to a pool in the collateral vault
    #[odra(non_reentrant)]
    pub fn register_adapter(&mut self, pool_id: Address, adapter: Address) {
        self.access.require_admin();
        self.vault().register_adapter(pool_id, adapter);

        if let Some(mut config) = self.registry.get(pool_id) {
            config.adapter = adapter;
            self.registry.update(config);
        }
        self.env().emit_event(AdapterRegistered { pool_id, adapter });
    }

    /// Unbind a wound-down pool's adapter.
    ///
    /// The pool must be Suspended with a zero target, and its residual value
    /// must be dust, before the vault stops custodying it.
    #[odra(non_reentrant)]
    pub fn remove_adapter(&mut self, pool_id: Address) {
        self.access.require_admin();
        if let Some(config) = self.registry.get(pool_id) {
            if config.status != PoolStatus::Suspended || config.target_weight_bps != 0 {
                self.env().revert(AllocatorError::PoolNotWoundDown);
            }
        }
        let adapter = match self.vault().get_adapter(pool_id) {
            Some(adapter) => adapter,
            None => self.env().revert(AllocatorError::AdapterNotRegistered),
        };

        if self.vault().is_supported(pool_id) {
            self.vault().remove_supported_pool(pool_id);
        }
        self.vault().remove_adapter(pool_id);
        self.env().emit_event(AdapterRemoved { pool_id, adapter });
    }

    /// Register a pool with a bound adapter; new pools start Active
    #[odra(non_reentrant)]
    pub fn add_pool(&mut self, pool_id: Address, target_weight_bps: u32) {
        self.access.require_admin();
        if target_weight_bps > WEIGHT_SCALE {
            self.env().revert(AllocatorError::ValueAboveMaximum);
        }
        if self.registry.len() >= self.get_max_pool_count() {
            self.env().revert(AllocatorError::MaxPoolCountExceeded);
        }
        let adapter = match self.vault().get_adapter(pool_id) {
            Some(adapter) => adapter,
            None => self.env().revert(AllocatorError::AdapterNotRegistered),
        };
        if StrategyAdapterContractRef::new(self.env(), adapter).pool_id() != pool_id {
            self.env().revert(AllocatorError::AdapterPoolMismatch);
        }

        self.registry.push(PoolConfig {
            pool_id,
            adapter,
            target_weight_bps,
            status: PoolStatus::Active,
        });
        self.vault().add_supported_pool(pool_id);

        self.env().emit_event(PoolAdded {
            pool_id,
            adapter,
            target_weight_bps,
        });
    }

    /// Change one pool's target. Only Active pools may carry a nonzero target.
    #[odra(non_reentrant)]
    pub fn update_pool_target(&mut self, pool_id: Address, target_weight_bps: u32) {
        self.access.require_admin();
        if target_weight_bps > WEIGHT_SCALE {
            self.env().revert(AllocatorError::ValueAboveMaximum);
        }
        let mut config = self.registry.require(pool_id);
        if target_weight_bps != 0 && !config.status.is_deposit_eligible() {
            self.env().revert(AllocatorError::PoolNotDepositEligible);
        }

        let previous_bps = config.target_weight_bps;
        config.target_weight_bps = target_weight_bps;
        self.registry.update(config);

        self.env().emit_event(PoolTargetUpdated {
            pool_id,
            previous_bps,
            new_bps: target_weight_bps,
        });
    }

    /// Move a pool through its lifecycle.
    ///
    /// Leaving Active zeroes the target and clears the default pool if it
    /// pointed here.
    #[odra(non_reentrant)]
    pub fn set_pool_status(&mut self, pool_id: Address, status: PoolStatus) {
        self.access.require_admin();
        let mut config = self.registry.require(pool_id);
        let previous = config.status;
        if !previous.can_transition_to(status) {
            self.env().revert(AllocatorError::InvalidStatusTransition);
        }

        config.status = status;
        if !status.is_deposit_eligible() {
            config.target_weight_bps = 0;
            if self.default_pool.get().flatten() == Some(pool_id) {
                self.default_pool.set(None);
                self.env().emit_event(DefaultPoolUpdated { pool_id: None });
            }
        }
        self.registry.update(config);

        self.env().emit_event(PoolStatusChanged {
            pool_id,
            previous,
            current: status,
        });
    }

    /// Delete a Suspended pool whose adapter has already been removed
    #[odra(non_reentrant)]
    pub fn remove_pool(&mut self, pool_id: Address) {
        self.access.require_admin();
        let config = self.registry.require(pool_id);
        if config.status != PoolStatus::Suspended {
            self.env().revert(AllocatorError::PoolNotWoundDown);
        }
        if self.vault().get_adapter(pool_id).is_some() {
            self.env().revert(AllocatorError::AdapterStillRegistered);
        }

        self.registry.swap_remove(pool_id);
        self.env().emit_event(PoolRemoved { pool_id });
    }

    /// Replace every pool's target at once.
    ///
    /// Each registered pool must appear exactly once, non-Active pools must
    /// be zero, and the targets must sum to exactly 100%.
    #[odra(non_reentrant)]
    pub fn replace_pool_targets(&mut self, targets: Vec<PoolTarget>) {
        self.access.require_admin();
        if targets.len() as u32 != self.registry.len() {
            self.env().revert(AllocatorError::LengthMismatch);
        }

        let mut seen: Vec<Address> = Vec::with_capacity(targets.len());
        let mut sum: u64 = 0;
        let mut updated: Vec<PoolConfig> = Vec::with_capacity(targets.len());
        for target in targets.iter() {
            if seen.contains(&target.pool_id) {
                self.env().revert(AllocatorError::DuplicatePool);
            }
            seen.push(target.pool_id);

            let mut config = self.registry.require(target.pool_id);
            if target.target_weight_bps != 0 && !config.status.is_deposit_eligible() {
                self.env().revert(AllocatorError::PoolNotDepositEligible);
            }
            sum += target.target_weight_bps as u64;
            config.target_weight_bps = target.target_weight_bps;
            updated.push(config);
        }
        if sum != WEIGHT_SCALE as u64 {
            self.env().revert(AllocatorError::InvalidTotalWeight);
        }

        for config in updated {
            self.registry.update(config);
        }
        self.env().emit_event(TargetsReplaced {
            pool_count: targets.len() as u32,
        });
    }

    // ========== Parameters (admin) ==========

    /// Set the deposit cap (0 = unlimited)
    #[odra(non_reentrant)]
    pub fn set_deposit_cap(&mut self, cap: U256) {
        self.access.require_admin();
        self.deposit_cap.set(cap);
        self.emit_parameter("deposit_cap", cap);
    }

    /// Set the minimum meaningful value delta (bounded by MAX_DUST_TOLERANCE)
    #[odra(non_reentrant)]
    pub fn set_dust_tolerance(&mut self, dust_tolerance: U256) {
        self.access.require_admin();
        if dust_tolerance > U256::from(MAX_DUST_TOLERANCE) {
            self.env().revert(AllocatorError::ValueAboveMaximum);
        }
        self.dust_tolerance.set(dust_tolerance);
        self.emit_parameter("dust_tolerance", dust_tolerance);
    }

    /// Set the keeper incentive paid out of reinvested fees
    #[odra(non_reentrant)]
    pub fn set_reinvest_incentive_bps(&mut self, incentive_bps: u32) {
        self.access.require_admin();
        if incentive_bps > MAX_REINVEST_INCENTIVE_BPS {
            self.env().revert(AllocatorError::ValueAboveMaximum);
        }
        self.reinvest_incentive_bps.set(incentive_bps);
        self.emit_parameter("reinvest_incentive_bps", U256::from(incentive_bps));
    }

    /// Set the fee charged on every withdrawal
    #[odra(non_reentrant)]
    pub fn set_withdrawal_fee_bps(&mut self, fee_bps: u32) {
        self.access.require_admin();
        if fee_bps > MAX_WITHDRAWAL_FEE_BPS {
            self.env().revert(AllocatorError::ValueAboveMaximum);
        }
        self.withdrawal_fee_bps.set(fee_bps);
        self.emit_parameter("withdrawal_fee_bps", U256::from(fee_bps));
    }

    /// Set the pool count limit; it may not drop below the registered count
    #[odra(non_reentrant)]
    pub fn set_max_pool_count(&mut self, max_pool_count: u32) {
        self.access.require_admin();
        if max_pool_count > HARD_MAX_POOL_COUNT {
            self.env().revert(AllocatorError::ValueAboveMaximum);
        }
        if max_pool_count == 0 || max_pool_count < self.registry.len() {
            self.env().revert(AllocatorError::InvalidConfig);
        }
        self.max_pool_count.set(max_pool_count);
        self.emit_parameter("max_pool_count", U256::from(max_pool_count));
    }

    /// Choose the pool receiving reinvested fees; it must be Active with a live adapter
    #[odra(non_reentrant)]
    pub fn set_default_pool(&mut self, pool_id: Option<Address>) {
        self.access.require_admin();
        if let Some(pool_id) = pool_id {
            let config = self.registry.require(pool_id);
            if !config.status.is_deposit_eligible() {
                self.env().revert(AllocatorError::PoolNotDepositEligible);
            }
            if self.vault().get_adapter(pool_id) != Some(config.adapter) {
                self.env().revert(AllocatorError::AdapterNotRegistered);
            }
        }
        self.default_pool.set(pool_id);
        self.env().emit_event(DefaultPoolUpdated { pool_id });
    }

    /// Point the router at the allocator share token
    #[odra(non_reentrant)]
    pub fn set_share_token(&mut self, share_token: Address) {
        self.access.require_admin();
        self.share_token.set(Some(share_token));
    }

    /// Pause user-facing flows (pauser or admin)
    #[odra(non_reentrant)]
    pub fn pause(&mut self) {
        self.access.require_role_or_admin(ROLE_PAUSER);
        if self.is_paused() {
            self.env().revert(AllocatorError::Paused);
        }
        self.paused.set(true);
        self.env().emit_event(PausedStateChanged {
            paused: true,
            by: self.env().caller(),
        });
    }

    /// Resume user-facing flows (admin only)
    #[odra(non_reentrant)]
    pub fn unpause(&mut self) {
        self.access.require_admin();
        if !self.is_paused() {
            self.env().revert(AllocatorError::NotPaused);
        }
        self.paused.set(false);
        self.env().emit_event(PausedStateChanged {
            paused: false,
            by: self.env().caller(),
        });
    }

    // ========== Roles ==========

    /// Grant `role_id` to `account` (admin only)
    #[odra(non_reentrant)]
    pub fn grant_role(&mut self, role_id: u8, account: Address) {
        self.access.grant_role(role_id, account);
    }

    /// Revoke `role_id` from `account` (admin only); the last admin cannot be revoked
    #[odra(non_reentrant)]
    pub fn revoke_role(&mut self, role_id: u8, account: Address) {
        self.access.revoke_role(role_id, account);
    }

    /// Give up one of the caller's own roles
    #[odra(non_reentrant)]
    pub fn renounce_role(&mut self, role_id: u8) {
        self.access.renounce_role(role_id);
    }

    /// Whether `account` holds `role_id`
    pub fn has_role(&self, role_id: u8, account: Address) -> bool {
        self.access.has_role(role_id, account)
    }

    // ========== Views ==========

    /// Value, weights, targets and health of every pool, in registry order
    pub fn get_allocations(&self) -> Vec<PoolAllocation> {
        let configs = self.registry.all();
        let probes: Vec<Result<U256, AllocatorError>> = configs.iter().map(|c| self.probe_value(c)).collect();
        let values: Vec<U256> = probes.iter().map(|p| p.clone().unwrap_or_default()).collect();
        let weights = current_weights_bps(&values);

        configs
            .into_iter()
            .zip(probes.iter())
            .zip(values.iter().zip(weights.iter()))
            .map(|((config, probe), (value, weight))| PoolAllocation {
                pool_id: config.pool_id,
                value: *value,
                current_weight_bps: *weight,
                target_weight_bps: config.target_weight_bps,
                status: config.status,
                healthy: probe.is_ok(),
            })
            .collect()
    }

    /// Registry entry for a pool
    pub fn get_pool_config(&self, pool_id: Address) -> Option<PoolConfig> {
        self.registry.get(pool_id)
    }

    /// Every registered pool, in registry order
    pub fn get_pools(&self) -> Vec<PoolConfig> {
        self.registry.all()
    }

    /// Number of registered pools
    pub fn pool_count(&self) -> u32 {
        self.registry.len()
    }

    /// Pools currently able to take deposits
    pub fn deposit_eligible_pools(&self) -> Vec<Address> {
        let (_, snapshots) = self.snapshots(Direction::Deposit);
        snapshots.into_iter().filter(|s| s.eligible).map(|s| s.pool_id).collect()
    }

    /// Pools currently able to serve withdrawals
    pub fn withdrawal_eligible_pools(&self) -> Vec<Address> {
        let (_, snapshots) = self.snapshots(Direction::Withdraw);
        snapshots.into_iter().filter(|s| s.eligible).map(|s| s.pool_id).collect()
    }

    /// Pool that the next automatic deposit would go to
    pub fn select_deposit_pool_view(&self) -> Option<Address> {
        let (_, snapshots) = self.snapshots(Direction::Deposit);
        selector::select_deposit_pool(&snapshots).map(|index| snapshots[index].pool_id)
    }

    /// Custodied pool value plus idle stable held by the router
    pub fn total_managed_assets(&self) -> U256 {
        self.vault().total_value() + self.idle_balance()
    }

    /// Stable held by the router (accrued fees)
    pub fn idle_balance(&self) -> U256 {
        self.stable().balance_of(self.env().self_address())
    }

    /// Managed assets net of the shortfall, floored at zero
    pub fn token_backing(&self) -> U256 {
        self.total_managed_assets().saturating_sub(self.get_shortfall())
    }

    /// Current settlement shortfall
    pub fn get_shortfall(&self) -> U256 {
        self.settlement_shortfall.get().unwrap_or(U256::zero())
    }

    /// Largest value a single withdrawal-eligible pool can pay out
    pub fn max_single_pool_withdrawal(&self) -> U256 {
        let (_, snapshots) = self.snapshots(Direction::Withdraw);
        snapshots
            .iter()
            .filter(|s| s.eligible)
            .map(|s| s.available_value)
            .max()
            .unwrap_or_default()
    }

    /// `(net, fee)` for a gross withdrawal at the current fee rate
    pub fn preview_withdrawal_fee(&self, gross_assets: U256) -> (U256, U256) {
        fee_math::split_gross(gross_assets, self.get_withdrawal_fee_bps())
    }

    /// Snapshot of scalar router state
    pub fn get_state(&self) -> RouterState {
        RouterState {
            dust_tolerance: self.get_dust_tolerance(),
            max_pool_count: self.get_max_pool_count(),
            deposit_cap: self.get_deposit_cap(),
            settlement_shortfall: self.get_shortfall(),
            reinvest_incentive_bps: self.get_reinvest_incentive_bps(),
            withdrawal_fee_bps: self.get_withdrawal_fee_bps(),
            default_pool: self.default_pool.get().flatten(),
            paused: self.is_paused(),
        }
    }

    /// Cumulative fee counters
    pub fn get_fee_stats(&self) -> FeeStats {
        self.fee_stats.get().unwrap_or_default()
    }

    /// Get dust tolerance
    pub fn get_dust_tolerance(&self) -> U256 {
        self.dust_tolerance.get().unwrap_or(U256::zero())
    }

    /// Get pool count limit
    pub fn get_max_pool_count(&self) -> u32 {
        self.max_pool_count.get().unwrap_or(0)
    }

    /// Get deposit cap (0 = unlimited)
    pub fn get_deposit_cap(&self) -> U256 {
        self.deposit_cap.get().unwrap_or(U256::zero())
    }

    /// Get keeper incentive rate
    pub fn get_reinvest_incentive_bps(&self) -> u32 {
        self.reinvest_incentive_bps.get().unwrap_or(0)
    }

    /// Get withdrawal fee rate
    pub fn get_withdrawal_fee_bps(&self) -> u32 {
        self.withdrawal_fee_bps.get().unwrap_or(0)
    }

    /// Get the pool receiving reinvested fees
    pub fn get_default_pool(&self) -> Option<Address> {
        self.default_pool.get().flatten()
    }

    /// Get share token address
    pub fn get_share_token(&self) -> Option<Address> {
        self.share_token.get().flatten()
    }

    /// Get stable token address
    pub fn get_stable_token(&self) -> Option<Address> {
        self.stable_token.get()
    }

    /// Get collateral vault address
    pub fn get_collateral_vault(&self) -> Option<Address> {
        self.collateral_vault.get()
    }

    /// Whether user-facing flows are paused
    pub fn is_paused(&self) -> bool {
        self.paused.get().unwrap_or(false)
    }
}

impl Router {
    // ========== Pool Cycles ==========

    /// Deposit `amount` idle stable into a pool through its adapter.
    ///
    /// The vault's measured share delta must reach the preview and equal the
    /// adapter's own report. Returns the shares minted.
    fn deposit_into_pool(&mut self, config: &PoolConfig, amount: U256) -> U256 {
        let mut adapter = self.adapter(config);
        let (preview_pool, preview_shares) = adapter.preview_deposit_into_strategy(amount);
        if preview_pool != config.pool_id {
            self.env().revert(AllocatorError::PoolMismatch);
        }

        let before = self.vault().pool_balance(config.pool_id);
        let mut stable = self.stable();
        stable.approve(config.adapter, amount);
        let (reported_pool, reported_shares) = adapter.deposit_into_strategy(amount);
        stable.approve(config.adapter, U256::zero());

        if reported_pool != config.pool_id {
            self.env().revert(AllocatorError::PoolMismatch);
        }
        let after = self.vault().pool_balance(config.pool_id);
        if after < before || after - before < preview_shares {
            self.env().revert(AllocatorError::SlippageExceeded);
        }
        let minted = after - before;
        if reported_shares != minted {
            self.env().revert(AllocatorError::SharesMismatch);
        }
        minted
    }

    /// Redeem `shares` of a pool into idle stable.
    ///
    /// The measured stable delta must equal the adapter's report and reach
    /// the preview. Returns the stable received.
    fn withdraw_shares_from_pool(&mut self, config: &PoolConfig, shares: U256) -> U256 {
        let mut adapter = self.adapter(config);
        let expected = adapter.preview_withdraw_from_strategy(shares);

        let self_address = self.env().self_address();
        let mut stable = self.stable();
        let before = stable.balance_of(self_address);

        self.vault().transfer_shares(config.pool_id, shares, self_address);
        let mut pool_token = Cep18TokenContractRef::new(self.env(), config.pool_id);
        pool_token.approve(config.adapter, shares);
        let reported = adapter.withdraw_from_strategy(shares);
        pool_token.approve(config.adapter, U256::zero());

        let after = stable.balance_of(self_address);
        let received = after.saturating_sub(before);
        if reported != received {
            self.env().revert(AllocatorError::AmountMismatch);
        }
        if received < expected {
            self.env().revert(AllocatorError::SlippageExceeded);
        }
        received
    }

    /// Redeem enough shares of a pool to receive at least `value` stable
    fn withdraw_value_from_pool(&mut self, config: &PoolConfig, value: U256) -> U256 {
        let shares = self.adapter(config).preview_shares_for_amount(value);
        if shares.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        let received = self.withdraw_shares_from_pool(config, shares);
        if received < value {
            self.env().revert(AllocatorError::SlippageExceeded);
        }
        received
    }

    /// Deposit rebalance proceeds into the destination and check drift
    fn redeposit(&mut self, from: &PoolConfig, to: &PoolConfig, pulled: U256, min_result: U256) -> U256 {
        let minted = self.deposit_into_pool(to, pulled);
        let deposited = self.adapter(to).value_of(to.pool_id, minted);
        self.check_rebalance_result(pulled, deposited, minted, min_result);

        self.env().emit_event(Rebalanced {
            from_pool: from.pool_id,
            to_pool: to.pool_id,
            value_pulled: pulled,
            value_deposited: deposited,
            shares_minted: minted,
        });
        minted
    }

    fn check_rebalance_result(&self, pulled: U256, deposited: U256, minted: U256, min_result: U256) {
        if pulled.saturating_sub(deposited) > self.get_dust_tolerance() {
            self.env().revert(AllocatorError::RebalanceDrift);
        }
        if minted < min_result {
            self.env().revert(AllocatorError::SlippageExceeded);
        }
    }

    // ========== Probing and Selection ==========

    /// Adapter bound, healthy, reporting this pool; returns the pool's value
    fn probe_value(&self, config: &PoolConfig) -> Result<U256, AllocatorError> {
        if self.vault().get_adapter(config.pool_id) != Some(config.adapter) {
            return Err(AllocatorError::AdapterNotRegistered);
        }
        let adapter = self.adapter(config);
        if !adapter.is_healthy() {
            return Err(AllocatorError::PoolUnhealthy);
        }
        if adapter.pool_id() != config.pool_id {
            return Err(AllocatorError::AdapterPoolMismatch);
        }

        let balance = self.vault().pool_balance(config.pool_id);
        if balance.is_zero() {
            return Ok(U256::zero());
        }
        Ok(adapter.value_of(config.pool_id, balance))
    }

    /// Health probe for one direction.
    ///
    /// Deposit: a dust-sized preview must mint shares into this pool.
    /// Withdraw: the pool must hold value.
    fn probe_pool(&self, config: &PoolConfig, direction: Direction) -> Result<U256, AllocatorError> {
        let value = self.probe_value(config)?;
        match direction {
            Direction::Deposit => {
                let probe_amount = self.get_dust_tolerance().max(U256::one());
                let (pool_id, shares) = self.adapter(config).preview_deposit_into_strategy(probe_amount);
                if pool_id != config.pool_id || shares.is_zero() {
                    return Err(AllocatorError::ProbeFailed);
                }
            }
            Direction::Withdraw => {
                if value.is_zero() {
                    return Err(AllocatorError::ProbeFailed);
                }
            }
        }
        Ok(value)
    }

    /// Registry configs with their selector snapshots, in registry order
    fn snapshots(&self, direction: Direction) -> (Vec<PoolConfig>, Vec<PoolSnapshot>) {
        let configs = self.registry.all();
        let probes: Vec<Result<U256, AllocatorError>> =
            configs.iter().map(|c| self.probe_pool(c, direction)).collect();
        let values: Vec<U256> = probes.iter().map(|p| p.clone().unwrap_or_default()).collect();
        let weights = current_weights_bps(&values);

        let snapshots = configs
            .iter()
            .enumerate()
            .map(|(i, config)| {
                let status_ok = match direction {
                    Direction::Deposit => config.status.is_deposit_eligible(),
                    Direction::Withdraw => config.status.is_withdrawal_eligible(),
                };
                PoolSnapshot {
                    pool_id: config.pool_id,
                    target_bps: config.target_weight_bps,
                    current_bps: weights[i],
                    available_value: values[i],
                    eligible: status_ok && probes[i].is_ok(),
                }
            })
            .collect();
        (configs, snapshots)
    }

    /// Validate solver legs and resolve their configs
    fn validate_legs(&self, legs: &[PoolLeg], direction: Direction) -> Vec<PoolConfig> {
        if legs.is_empty() {
            self.env().revert(AllocatorError::EmptyLegs);
        }

        let mut configs: Vec<PoolConfig> = Vec::with_capacity(legs.len());
        for leg in legs.iter() {
            if leg.amount.is_zero() {
                self.env().revert(AllocatorError::ZeroAmount);
            }
            if configs.iter().any(|c| c.pool_id == leg.pool_id) {
                self.env().revert(AllocatorError::DuplicatePool);
            }
            let config = self.registry.require(leg.pool_id);
            match direction {
                Direction::Deposit if !config.status.is_deposit_eligible() => {
                    self.env().revert(AllocatorError::PoolNotDepositEligible)
                }
                Direction::Withdraw if !config.status.is_withdrawal_eligible() => {
                    self.env().revert(AllocatorError::PoolNotWithdrawalEligible)
                }
                _ => {}
            }
            configs.push(config);
        }
        configs
    }

    fn rebalance_pair(&self, from: Address, to: Address) -> (PoolConfig, PoolConfig) {
        if from == to {
            self.env().revert(AllocatorError::DuplicatePool);
        }
        let from_config = self.registry.require(from);
        let to_config = self.registry.require(to);
        if !from_config.status.is_withdrawal_eligible() {
            self.env().revert(AllocatorError::PoolNotWithdrawalEligible);
        }
        if !to_config.status.is_deposit_eligible() {
            self.env().revert(AllocatorError::PoolNotDepositEligible);
        }
        (from_config, to_config)
    }

    // ========== Guards and Helpers ==========

    fn require_not_paused(&self) {
        if self.is_paused() {
            self.env().revert(AllocatorError::Paused);
        }
    }

    fn require_share_token(&self) {
        if self.share_token.get().flatten() != Some(self.env().caller()) {
            self.env().revert(AllocatorError::UnauthorizedToken);
        }
    }

    fn require_within_cap(&self, incoming: U256) {
        let cap = self.get_deposit_cap();
        if !cap.is_zero() && self.total_managed_assets() + incoming > cap {
            self.env().revert(AllocatorError::DepositCapExceeded);
        }
    }

    fn pull_stable(&self, from: Address, amount: U256) {
        let self_address = self.env().self_address();
        if !self.stable().transfer_from(from, self_address, amount) {
            self.env().revert(AllocatorError::InsufficientBalance);
        }
    }

    fn add_fees_collected(&mut self, amount: U256) {
        let mut stats = self.get_fee_stats();
        stats.total_fees_collected = stats.total_fees_collected + amount;
        self.fee_stats.set(stats);
    }

    fn emit_parameter(&self, name: &str, value: U256) {
        self.env().emit_event(ParameterUpdated {
            name: String::from(name),
            value,
        });
    }

    fn adapter(&self, config: &PoolConfig) -> StrategyAdapterContractRef {
        StrategyAdapterContractRef::new(self.env(), config.adapter)
    }

    fn stable(&self) -> Cep18TokenContractRef {
        match self.stable_token.get() {
            Some(token) => Cep18TokenContractRef::new(self.env(), token),
            None => self.env().revert(AllocatorError::NotInitialized),
        }
    }

    fn vault_address(&self) -> Address {
        match self.collateral_vault.get() {
            Some(vault) => vault,
            None => self.env().revert(AllocatorError::NotInitialized),
        }
    }

    fn vault(&self) -> CollateralCustodyContractRef {
        CollateralCustodyContractRef::new(self.env(), self.vault_address())
    }

    fn share_issuer(&self) -> ShareIssuerContractRef {
        match self.share_token.get().flatten() {
            Some(token) => ShareIssuerContractRef::new(self.env(), token),
            None => self.env().revert(AllocatorError::NotInitialized),
        }
    }
}
