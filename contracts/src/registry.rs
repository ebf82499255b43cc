//! Pool registry.
//!
//! Ordered list of pool configs stored as `index -> config` plus a
//! `pool_id -> index` map and a `pool_id -> exists` set. Lookups are O(1);
//! removal swaps the last entry into the freed slot so nothing is compacted.

use odra::prelude::*;
use crate::types::PoolConfig;
use crate::errors::AllocatorError;

/// Pool registry sub-module owned by the router
#[odra::module]
pub struct PoolRegistry {
    /// Pool configs by position
    entries: Mapping<u32, PoolConfig>,
    /// Number of registered pools
    len: Var<u32>,
    /// Position of each pool
    index_of: Mapping<Address, u32>,
    /// Registered pool ids
    exists: Mapping<Address, bool>,
}

#[odra::module]
impl PoolRegistry {
    /// Number of registered pools
    pub fn len(&self) -> u32 {
        self.len.get().unwrap_or(0)
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a pool is registered
    pub fn contains(&self, pool_id: Address) -> bool {
        self.exists.get(&pool_id).unwrap_or(false)
    }

    /// Config of a pool, if registered
    pub fn get(&self, pool_id: Address) -> Option<PoolConfig> {
        if !self.contains(pool_id) {
            return None;
        }
        let index = self.index_of.get(&pool_id)?;
        self.entries.get(&index)
    }

    /// Config of a pool, reverting when missing
    pub fn require(&self, pool_id: Address) -> PoolConfig {
        match self.get(pool_id) {
            Some(config) => config,
            None => self.env().revert(AllocatorError::PoolNotFound),
        }
    }

    /// Config at a registry position
    pub fn at(&self, index: u32) -> PoolConfig {
        if index >= self.len() {
            self.env().revert(AllocatorError::IndexOutOfRange);
        }
        match self.entries.get(&index) {
            Some(config) => config,
            None => self.env().revert(AllocatorError::IndexOutOfRange),
        }
    }

    /// Position of a pool
    pub fn index(&self, pool_id: Address) -> Option<u32> {
        if !self.contains(pool_id) {
            return None;
        }
        self.index_of.get(&pool_id)
    }

    /// All configs in registry order
    pub fn all(&self) -> Vec<PoolConfig> {
        (0..self.len()).filter_map(|i| self.entries.get(&i)).collect()
    }

    /// Append a new pool
    pub fn push(&mut self, config: PoolConfig) {
        if self.contains(config.pool_id) {
            self.env().revert(AllocatorError::PoolAlreadyExists);
        }

        let index = self.len();
        self.index_of.set(&config.pool_id, index);
        self.exists.set(&config.pool_id, true);
        self.entries.set(&index, config);
        self.len.set(index + 1);
    }

    /// Overwrite an existing pool's config in place
    pub fn update(&mut self, config: PoolConfig) {
        let index = match self.index(config.pool_id) {
            Some(index) => index,
            None => self.env().revert(AllocatorError::PoolNotFound),
        };
        self.entries.set(&index, config);
    }

    /// Remove a pool by moving the last entry into its slot
    pub fn swap_remove(&mut self, pool_id: Address) -> PoolConfig {
        let index = match self.index(pool_id) {
            Some(index) => index,
            None => self.env().revert(AllocatorError::PoolNotFound),
        };
        let removed = self.at(index);
        let last_index = self.len() - 1;

        if index != last_index {
            let last = self.at(last_index);
            self.index_of.set(&last.pool_id, index);
            self.entries.set(&index, last);
        }

        self.len.set(last_index);
        self.exists.set(&pool_id, false);
        removed
    }
}
