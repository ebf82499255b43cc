//! Allocation calculator.
//!
//! Converts per-pool values into current allocation weights.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::types::{ALLOCATION_SCALE, WEIGHT_SCALE};

/// Compute `(weights, total)` where `weights[i] = balances[i] * ALLOCATION_SCALE / total`.
///
/// All weights are zero when the total is zero.
pub fn calculate_allocations(balances: &[U256]) -> (Vec<U256>, U256) {
    let total = balances.iter().fold(U256::zero(), |acc, b| acc + *b);
    if total.is_zero() {
        return (vec![U256::zero(); balances.len()], total);
    }

    let scale = U256::from(ALLOCATION_SCALE);
    let weights = balances.iter().map(|b| *b * scale / total).collect();
    (weights, total)
}

/// Convert an ALLOCATION_SCALE weight into WEIGHT_SCALE basis points
pub fn to_weight_bps(weight: U256) -> u32 {
    let bps = weight * U256::from(WEIGHT_SCALE) / U256::from(ALLOCATION_SCALE);
    bps.min(U256::from(WEIGHT_SCALE)).as_u32()
}

/// Current weights of each balance in WEIGHT_SCALE basis points
pub fn current_weights_bps(balances: &[U256]) -> Vec<u32> {
    let (weights, _) = calculate_allocations(balances);
    weights.into_iter().map(to_weight_bps).collect()
}
