//! Withdrawal fee math.
//!
//! All rates are expressed in `WEIGHT_SCALE` units (1_000_000 = 100%).
//! Fees round down, so `net + fee == gross` always holds and the caller is
//! never charged more than the configured rate.

use odra::casper_types::U256;
use crate::types::WEIGHT_SCALE;

/// fee = floor(gross * fee_bps / WEIGHT_SCALE)
pub fn fee_for_gross(gross: U256, fee_bps: u32) -> U256 {
    gross * U256::from(fee_bps) / U256::from(WEIGHT_SCALE)
}

/// Split a gross withdrawal into `(net, fee)`
pub fn split_gross(gross: U256, fee_bps: u32) -> (U256, U256) {
    let fee = fee_for_gross(gross, fee_bps);
    (gross - fee, fee)
}

/// Keeper incentive = floor(idle * incentive_bps / WEIGHT_SCALE)
pub fn incentive_for(idle: U256, incentive_bps: u32) -> U256 {
    idle * U256::from(incentive_bps) / U256::from(WEIGHT_SCALE)
}

/// Check that the net paid out matches the net the burned shares are worth.
///
/// `net_by_shares` is the share token's own fee-adjusted redemption value of
/// the shares burned. It may exceed the per-leg net by one unit of rounding
/// and never fall below it.
pub fn reconciles(net: U256, net_by_shares: U256) -> bool {
    net_by_shares >= net && net_by_shares - net <= U256::one()
}
