//! Allocator events.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::types::PoolStatus;

/// New pool entered the registry
#[odra::event]
pub struct PoolAdded {
    pub pool_id: Address,
    pub adapter: Address,
    pub target_weight_bps: u32,
}

/// Pool deleted from the registry
#[odra::event]
pub struct PoolRemoved {
    pub pool_id: Address,
}

/// Single pool target changed
#[odra::event]
pub struct PoolTargetUpdated {
    pub pool_id: Address,
    pub previous_bps: u32,
    pub new_bps: u32,
}

/// Pool lifecycle status changed
#[odra::event]
pub struct PoolStatusChanged {
    pub pool_id: Address,
    pub previous: PoolStatus,
    pub current: PoolStatus,
}

/// All targets replaced in one call
#[odra::event]
pub struct TargetsReplaced {
    pub pool_count: u32,
}

/// Adapter bound to a pool
#[odra::event]
pub struct AdapterRegistered {
    pub pool_id: Address,
    pub adapter: Address,
}

/// Adapter unbound from a pool
#[odra::event]
pub struct AdapterRemoved {
    pub pool_id: Address,
    pub adapter: Address,
}

/// Automatic single-pool deposit
#[odra::event]
pub struct Deposited {
    pub initiator: Address,
    pub receiver: Address,
    pub pool_id: Address,
    pub assets: U256,
    pub pool_shares: U256,
}

/// Automatic single-pool withdrawal
#[odra::event]
pub struct Withdrawn {
    pub initiator: Address,
    pub receiver: Address,
    pub owner: Address,
    pub pool_id: Address,
    pub gross_assets: U256,
    pub net_assets: U256,
    pub fee: U256,
}

/// Multi-pool deposit chosen by a solver
#[odra::event]
pub struct SolverDeposit {
    pub solver: Address,
    pub receiver: Address,
    pub assets: U256,
    pub shares: U256,
    pub legs: u32,
}

/// Multi-pool withdrawal chosen by a solver
#[odra::event]
pub struct SolverWithdraw {
    pub solver: Address,
    pub receiver: Address,
    pub owner: Address,
    pub net_assets: U256,
    pub fee: U256,
    pub shares: U256,
    pub legs: u32,
}

/// Value moved between pools
#[odra::event]
pub struct Rebalanced {
    pub from_pool: Address,
    pub to_pool: Address,
    pub value_pulled: U256,
    pub value_deposited: U256,
    pub shares_minted: U256,
}

/// Idle fees compounded into the default pool
#[odra::event]
pub struct FeesReinvested {
    pub keeper: Address,
    pub pool_id: Address,
    pub reinvested: U256,
    pub incentive: U256,
}

/// Shortfall ledger increased
#[odra::event]
pub struct ShortfallRecorded {
    pub delta: U256,
    pub shortfall: U256,
}

/// Shortfall ledger decreased
#[odra::event]
pub struct ShortfallCleared {
    pub delta: U256,
    pub shortfall: U256,
}

/// Scalar parameter changed
#[odra::event]
pub struct ParameterUpdated {
    pub name: String,
    pub value: U256,
}

/// Default pool changed (None when cleared)
#[odra::event]
pub struct DefaultPoolUpdated {
    pub pool_id: Option<Address>,
}

/// Pause flag toggled
#[odra::event]
pub struct PausedStateChanged {
    pub paused: bool,
    pub by: Address,
}

/// Collateral vault router pointer rotated
#[odra::event]
pub struct VaultRouterUpdated {
    pub previous: Option<Address>,
    pub current: Address,
}

/// Collateral vault released pool shares
#[odra::event]
pub struct SharesTransferred {
    pub pool_id: Address,
    pub amount: U256,
    pub recipient: Address,
}
