//! Deterministic pool selection.
//!
//! Selection is a pure function of the snapshots passed in: no randomness and
//! no clock input, so identical state always yields the identical choice.
//! Ties are broken by the original snapshot order.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::AllocatorError;

/// Per-pool input to the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSnapshot {
    /// Pool identifier
    pub pool_id: Address,
    /// Target weight in WEIGHT_SCALE units
    pub target_bps: u32,
    /// Current weight in WEIGHT_SCALE units
    pub current_bps: u32,
    /// Value the pool can pay out right now
    pub available_value: U256,
    /// Passed status and health checks for the direction being selected
    pub eligible: bool,
}

impl PoolSnapshot {
    /// target - current
    pub fn deficit(&self) -> i64 {
        self.target_bps as i64 - self.current_bps as i64
    }

    /// current - target
    pub fn surplus(&self) -> i64 {
        self.current_bps as i64 - self.target_bps as i64
    }
}

/// Index of the eligible pool with the largest deficit
pub fn select_deposit_pool(pools: &[PoolSnapshot]) -> Option<usize> {
    select_deposit_pools(pools, 1).into_iter().next()
}

/// Indices of up to `k` eligible pools ordered by deficit, largest first
pub fn select_deposit_pools(pools: &[PoolSnapshot], k: usize) -> Vec<usize> {
    let mut candidates: Vec<usize> = (0..pools.len()).filter(|&i| pools[i].eligible).collect();
    // sort_by is stable, equal deficits keep their original order
    candidates.sort_by(|&a, &b| pools[b].deficit().cmp(&pools[a].deficit()));
    candidates.truncate(k);
    candidates
}

/// Eligible pools ordered by surplus, largest first
pub fn rank_withdrawal_pools(pools: &[PoolSnapshot]) -> Vec<usize> {
    let mut candidates: Vec<usize> = (0..pools.len()).filter(|&i| pools[i].eligible).collect();
    candidates.sort_by(|&a, &b| pools[b].surplus().cmp(&pools[a].surplus()));
    candidates
}

/// First pool in surplus order whose available value covers `amount`
pub fn select_withdrawal_pool(pools: &[PoolSnapshot], amount: U256) -> Result<usize, AllocatorError> {
    rank_withdrawal_pools(pools)
        .into_iter()
        .find(|&i| pools[i].available_value >= amount)
        .ok_or(AllocatorError::LiquidityExhausted)
}
