//! Multi-Strategy Allocator Contracts
//!
//! Casper-native allocator that routes a stable unit across yield-bearing
//! strategy pools, tracking each pool's share of managed value against
//! governance-set targets.
//!
//! ## Architecture
//!
//! - **Router**: Allocation table, accounting state, user/solver/rebalance flows
//! - **CollateralVault**: Custody of pool shares and authoritative valuation
//! - **Adapters**: One per pool; convert between the stable unit and pool shares
//! - **AllocatorShareToken**: CEP-18 share token backed by the router's NAV
//! - **StableToken**: CEP-18 stable unit of account
//! - **YieldVault**: CEP-4626 style vault wrapped by `WrappedVaultAdapter`
//!
//! ## Pure Libraries
//!
//! - **allocation**: balances to current weights
//! - **selector**: deterministic deficit/surplus pool selection
//! - **fee_math**: gross/net/fee conversions
//!
//! ## Pool Lifecycle
//!
//! Active -> Suspended -> adapter removed -> removed from registry.
//! Active <-> Impaired marks a pool closed for deposits while users can exit.

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod types;
pub mod errors;
pub mod events;
pub mod interfaces;

// Pure libraries
pub mod allocation;
pub mod selector;
pub mod fee_math;

// Shared sub-modules
pub mod token_ledger;
pub mod registry;
pub mod access_control;

// Contract modules
pub mod router;
pub mod collateral_vault;
pub mod adapters;
pub mod share_token;
pub mod stable_token;
pub mod yield_vault;
