//! Strategy adapters.
//!
//! Each adapter implements the `StrategyAdapter` entry points for one pool:
//! - **FixedRateAdapter**: issues its own pool shares at an admin-set rate
//! - **WrappedVaultAdapter**: routes into an external CEP-4626 vault
//! - **SyntheticAdapter**: fixed-rate mechanics with fault switches, used to
//!   exercise the router's slippage, mismatch and probe handling

pub mod fixed_rate;
pub mod synthetic;
pub mod wrapped_vault;
