//! Common types and constants used across the allocator.

use odra::prelude::*;
use odra::casper_types::U256;

/// Basis-point scale for target weights, fees and incentives (1_000_000 = 100%)
pub const WEIGHT_SCALE: u32 = 1_000_000;

/// Precision of allocation weights returned by the calculator (1e18 = 100%)
pub const ALLOCATION_SCALE: u128 = 1_000_000_000_000_000_000;

/// Exchange-rate precision used by fixed-rate strategies (1e18 = 1.0)
pub const RATE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Hard upper bound for the withdrawal fee (1%)
pub const MAX_WITHDRAWAL_FEE_BPS: u32 = 10_000;

/// Hard upper bound for the keeper incentive on fee reinvestment (5%)
pub const MAX_REINVEST_INCENTIVE_BPS: u32 = 50_000;

/// Hard upper bound for dust tolerance, in base units
pub const MAX_DUST_TOLERANCE: u128 = 1_000_000_000_000_000_000;

/// Hard upper bound for the number of pools the registry may hold
pub const HARD_MAX_POOL_COUNT: u32 = 32;

/// Pool count limit applied at deployment unless overridden
pub const DEFAULT_MAX_POOL_COUNT: u32 = 16;

/// Dust tolerance applied at deployment unless overridden
pub const DEFAULT_DUST_TOLERANCE: u64 = 1_000;

/// Pool lifecycle status
#[odra::odra_type]
#[derive(Copy)]
pub enum PoolStatus {
    /// Accepts deposits and withdrawals
    Active,
    /// Winding down: withdrawals only, target forced to zero
    Suspended,
    /// Unhealthy: withdrawals only, reversible back to Active
    Impaired,
}

impl PoolStatus {
    /// Whether new value may be routed into a pool with this status
    pub fn is_deposit_eligible(&self) -> bool {
        matches!(self, PoolStatus::Active)
    }

    /// Whether users may exit from a pool with this status
    pub fn is_withdrawal_eligible(&self) -> bool {
        true
    }

    /// Allowed lifecycle moves
    pub fn can_transition_to(&self, next: PoolStatus) -> bool {
        matches!(
            (self, next),
            (PoolStatus::Active, PoolStatus::Suspended)
                | (PoolStatus::Active, PoolStatus::Impaired)
                | (PoolStatus::Impaired, PoolStatus::Active)
                | (PoolStatus::Impaired, PoolStatus::Suspended)
        )
    }
}

/// Per-pool configuration held in the registry
#[odra::odra_type]
pub struct PoolConfig {
    /// Pool identifier (the pool share token address)
    pub pool_id: Address,
    /// Strategy adapter bound to the pool
    pub adapter: Address,
    /// Target share of managed value, in WEIGHT_SCALE units
    pub target_weight_bps: u32,
    /// Lifecycle status
    pub status: PoolStatus,
}

/// One leg of a solver call: pool plus amount (stable units or pool shares)
#[odra::odra_type]
#[derive(Copy)]
pub struct PoolLeg {
    /// Pool identifier
    pub pool_id: Address,
    /// Amount for this pool
    pub amount: U256,
}

/// Entry of a bulk target replacement
#[odra::odra_type]
#[derive(Copy)]
pub struct PoolTarget {
    /// Pool identifier
    pub pool_id: Address,
    /// New target weight in WEIGHT_SCALE units
    pub target_weight_bps: u32,
}

/// Current allocation of a pool, as reported by read views
#[odra::odra_type]
pub struct PoolAllocation {
    /// Pool identifier
    pub pool_id: Address,
    /// Value of the vault's pool shares in stable units
    pub value: U256,
    /// Current share of pool value in WEIGHT_SCALE units
    pub current_weight_bps: u32,
    /// Target weight in WEIGHT_SCALE units
    pub target_weight_bps: u32,
    /// Lifecycle status
    pub status: PoolStatus,
    /// Whether the pool passed its health probe
    pub healthy: bool,
}

/// Snapshot of the router's scalar state
#[odra::odra_type]
pub struct RouterState {
    /// Minimum value delta treated as meaningful
    pub dust_tolerance: U256,
    /// Maximum number of registered pools
    pub max_pool_count: u32,
    /// Cap on total managed assets (0 = unlimited)
    pub deposit_cap: U256,
    /// Uncollateralized-supply ledger
    pub settlement_shortfall: U256,
    /// Keeper incentive on reinvested fees
    pub reinvest_incentive_bps: u32,
    /// Fee charged on every withdrawal
    pub withdrawal_fee_bps: u32,
    /// Pool receiving reinvested fees
    pub default_pool: Option<Address>,
    /// Whether user-facing flows are paused
    pub paused: bool,
}

/// Cumulative fee counters
#[odra::odra_type]
#[derive(Default)]
pub struct FeeStats {
    /// Fees retained on withdrawals (including folded rounding surplus)
    pub total_fees_collected: U256,
    /// Value redeposited by reinvest_fees
    pub total_reinvested: U256,
    /// Incentives paid to keepers
    pub total_incentives_paid: U256,
}

/// Ceiling division for U256 values
pub fn div_ceil(numerator: U256, denominator: U256) -> U256 {
    if numerator.is_zero() {
        return U256::zero();
    }
    (numerator - U256::one()) / denominator + U256::one()
}
