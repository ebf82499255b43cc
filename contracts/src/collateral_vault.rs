//! Collateral Vault Contract
//!
//! Custodies pool shares on behalf of the allocator and is the authoritative
//! source of managed value:
//! - Maintains the supported-pool list and the `pool_id -> adapter` binding
//! - Values every supported pool through its adapter
//! - Releases shares only to the registered router
//!
//! The router pointer is the single re-pointing mechanism: setting a new
//! router revokes the previous one's transfer capability.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::AllocatorError;
use crate::events::{SharesTransferred, VaultRouterUpdated};
use crate::interfaces::{Cep18TokenContractRef, StrategyAdapterContractRef};
use crate::types::WEIGHT_SCALE;

/// Collateral Vault Contract
#[odra::module(events = [SharesTransferred, VaultRouterUpdated])]
pub struct CollateralVault {
    /// Admin address
    admin: Var<Address>,
    /// Router allowed to move shares
    router: Var<Option<Address>>,
    /// Supported pools by position
    pools: Mapping<u32, Address>,
    /// Number of supported pools
    pool_count: Var<u32>,
    /// Position of each supported pool
    pool_index: Mapping<Address, u32>,
    /// Supported pool set
    supported: Mapping<Address, bool>,
    /// Adapter bound to each pool (None once unbound)
    adapters: Mapping<Address, Option<Address>>,
    /// Absolute residual value below which a pool may be deregistered
    dust_abs: Var<U256>,
    /// Residual value relative to total value, in WEIGHT_SCALE units
    dust_rel_bps: Var<u32>,
}

#[odra::module]
impl CollateralVault {
    /// Initialize the vault
    pub fn init(&mut self, admin: Address, dust_abs: U256, dust_rel_bps: u32) {
        if dust_rel_bps > WEIGHT_SCALE {
            self.env().revert(AllocatorError::InvalidConfig);
        }
        self.admin.set(admin);
        self.router.set(None);
        self.pool_count.set(0);
        self.dust_abs.set(dust_abs);
        self.dust_rel_bps.set(dust_rel_bps);
    }

    // ========== Valuation ==========

    /// Sum of `adapter.value_of(balance)` over every supported pool.
    ///
    /// Pools with zero balance are skipped. A failing valuation reverts.
    pub fn total_value(&self) -> U256 {
        let mut total = U256::zero();
        for pool_id in self.supported_pools() {
            let balance = self.pool_balance(pool_id);
            if balance.is_zero() {
                continue;
            }
            total = total + self.value_of(pool_id, balance);
        }
        total
    }

    /// Vault's share balance in a pool
    pub fn pool_balance(&self, pool_id: Address) -> U256 {
        Cep18TokenContractRef::new(self.env(), pool_id).balance_of(self.env().self_address())
    }

    /// Value of the vault's shares in a pool
    pub fn pool_value(&self, pool_id: Address) -> U256 {
        let balance = self.pool_balance(pool_id);
        if balance.is_zero() {
            return U256::zero();
        }
        self.value_of(pool_id, balance)
    }

    // ========== Router Functions ==========

    /// Release pool shares to `recipient` (router only)
    pub fn transfer_shares(&mut self, pool_id: Address, amount: U256, recipient: Address) {
        self.require_router();
        if !self.is_supported(pool_id) {
            self.env().revert(AllocatorError::PoolNotSupported);
        }
        if amount.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }

        let mut token = Cep18TokenContractRef::new(self.env(), pool_id);
        if !token.transfer(recipient, amount) {
            self.env().revert(AllocatorError::InsufficientBalance);
        }

        self.env().emit_event(SharesTransferred {
            pool_id,
            amount,
            recipient,
        });
    }

    /// Bind an adapter to a pool (router only).
    ///
    /// The adapter must report the same pool id it is registered under.
    pub fn register_adapter(&mut self, pool_id: Address, adapter: Address) {
        self.require_router();
        if self.get_adapter(pool_id).is_some() {
            self.env().revert(AllocatorError::AdapterStillRegistered);
        }

        let reported = StrategyAdapterContractRef::new(self.env(), adapter).pool_id();
        if reported != pool_id {
            self.env().revert(AllocatorError::AdapterPoolMismatch);
        }

        self.adapters.set(&pool_id, Some(adapter));
    }

    /// Unbind a pool's adapter (router only). The pool must no longer be supported.
    pub fn remove_adapter(&mut self, pool_id: Address) {
        self.require_router();
        if self.get_adapter(pool_id).is_none() {
            self.env().revert(AllocatorError::AdapterNotRegistered);
        }
        if self.is_supported(pool_id) {
            self.env().revert(AllocatorError::PoolNotWoundDown);
        }
        self.adapters.set(&pool_id, None);
    }

    /// Start custodying a pool (router only)
    pub fn add_supported_pool(&mut self, pool_id: Address) {
        self.require_router();
        if self.is_supported(pool_id) {
            self.env().revert(AllocatorError::PoolAlreadyExists);
        }
        if self.get_adapter(pool_id).is_none() {
            self.env().revert(AllocatorError::AdapterNotRegistered);
        }

        let index = self.pool_count.get().unwrap_or(0);
        self.pools.set(&index, pool_id);
        self.pool_index.set(&pool_id, index);
        self.supported.set(&pool_id, true);
        self.pool_count.set(index + 1);
    }

    /// Stop custodying a pool (router only).
    ///
    /// The residual value must be below both the absolute and the relative
    /// dust threshold.
    pub fn remove_supported_pool(&mut self, pool_id: Address) {
        self.require_router();
        if !self.is_supported(pool_id) {
            self.env().revert(AllocatorError::PoolNotSupported);
        }

        let residual = self.pool_value(pool_id);
        if !residual.is_zero() && !self.is_dust(residual) {
            self.env().revert(AllocatorError::BalanceAboveDust);
        }

        let index = self.pool_index.get(&pool_id).unwrap_or(0);
        let last_index = self.pool_count.get().unwrap_or(0) - 1;
        if index != last_index {
            if let Some(last) = self.pools.get(&last_index) {
                self.pools.set(&index, last);
                self.pool_index.set(&last, index);
            }
        }
        self.pool_count.set(last_index);
        self.supported.set(&pool_id, false);
    }

    // ========== Admin Functions ==========

    /// Point the vault at a new router, revoking the previous one (admin only)
    pub fn set_router(&mut self, router: Address) {
        self.require_admin();
        let previous = self.router.get().flatten();
        self.router.set(Some(router));
        self.env().emit_event(VaultRouterUpdated {
            previous,
            current: router,
        });
    }

    /// Update dust thresholds (admin only)
    pub fn set_dust_thresholds(&mut self, dust_abs: U256, dust_rel_bps: u32) {
        self.require_admin();
        if dust_rel_bps > WEIGHT_SCALE {
            self.env().revert(AllocatorError::InvalidConfig);
        }
        self.dust_abs.set(dust_abs);
        self.dust_rel_bps.set(dust_rel_bps);
    }

    /// Transfer admin to new address (admin only)
    pub fn transfer_admin(&mut self, new_admin: Address) {
        self.require_admin();
        self.admin.set(new_admin);
    }

    // ========== View Functions ==========

    /// Get the router address
    pub fn get_router(&self) -> Option<Address> {
        self.router.get().flatten()
    }

    /// Get the admin address
    pub fn get_admin(&self) -> Option<Address> {
        self.admin.get()
    }

    /// Adapter bound to a pool
    pub fn get_adapter(&self, pool_id: Address) -> Option<Address> {
        self.adapters.get(&pool_id).flatten()
    }

    /// Whether the vault custodies a pool
    pub fn is_supported(&self, pool_id: Address) -> bool {
        self.supported.get(&pool_id).unwrap_or(false)
    }

    /// Supported pools in insertion order (modulo swap-removals)
    pub fn supported_pools(&self) -> Vec<Address> {
        let count = self.pool_count.get().unwrap_or(0);
        (0..count).filter_map(|i| self.pools.get(&i)).collect()
    }

    /// `(absolute, relative_bps)` dust thresholds
    pub fn get_dust_thresholds(&self) -> (U256, u32) {
        (
            self.dust_abs.get().unwrap_or(U256::zero()),
            self.dust_rel_bps.get().unwrap_or(0),
        )
    }

    // ========== Internal Functions ==========

    fn value_of(&self, pool_id: Address, shares: U256) -> U256 {
        let adapter = match self.get_adapter(pool_id) {
            Some(adapter) => adapter,
            None => self.env().revert(AllocatorError::AdapterNotRegistered),
        };
        StrategyAdapterContractRef::new(self.env(), adapter).value_of(pool_id, shares)
    }

    fn is_dust(&self, value: U256) -> bool {
        let (dust_abs, dust_rel_bps) = self.get_dust_thresholds();
        if value >= dust_abs {
            return false;
        }
        let total = self.total_value();
        value * U256::from(WEIGHT_SCALE) < total * U256::from(dust_rel_bps)
    }

    fn require_router(&self) {
        let caller = self.env().caller();
        match self.router.get().flatten() {
            Some(router) if router == caller => {}
            _ => self.env().revert(AllocatorError::UnauthorizedRouter),
        }
    }

    fn require_admin(&self) {
        let caller = self.env().caller();
        match self.admin.get() {
            Some(admin) if admin == caller => {}
            _ => self.env().revert(AllocatorError::Unauthorized),
        }
    }
}
