//! Access Control
//!
//! Role-based access control for the allocator router:
//! - Admin role (governance setters, pool lifecycle, shortfall ledger)
//! - Operator role (rebalancing)
//! - Solver role (caller-directed multi-pool deposits/withdrawals)
//! - Pauser role (pause; unpause stays with admin)
//!
//! Admin can grant and revoke every role.

use odra::prelude::*;
use crate::errors::AllocatorError;

/// Role constants (u8 for efficient storage)
pub const ROLE_ADMIN: u8 = 0;
pub const ROLE_OPERATOR: u8 = 1;
pub const ROLE_SOLVER: u8 = 2;
pub const ROLE_PAUSER: u8 = 3;

/// Number of defined roles
const ROLE_COUNT: u8 = 4;

/// Access control sub-module
#[odra::module]
pub struct AccessControl {
    /// Role assignments: (role, account) -> bool
    roles: Mapping<(u8, Address), bool>,
    /// Number of accounts with each role
    role_count: Mapping<u8, u32>,
    /// Whether the module is initialized
    initialized: Var<bool>,
}

#[odra::module]
impl AccessControl {
    /// Initialize access control with initial admin
    pub fn init(&mut self, initial_admin: Address) {
        if self.initialized.get().unwrap_or(false) {
            self.env().revert(AllocatorError::InvalidConfig);
        }

        self.set_role_internal(ROLE_ADMIN, initial_admin, true);
        self.initialized.set(true);
    }

    // ========== Role Query Functions ==========

    /// Check if account has a specific role
    pub fn has_role(&self, role_id: u8, account: Address) -> bool {
        self.roles.get(&(role_id, account)).unwrap_or(false)
    }

    /// Check if caller has a specific role
    pub fn caller_has_role(&self, role_id: u8) -> bool {
        self.has_role(role_id, self.env().caller())
    }

    /// Get the number of accounts with a role
    pub fn get_role_member_count(&self, role_id: u8) -> u32 {
        self.role_count.get(&role_id).unwrap_or(0)
    }

    // ========== Role Management Functions ==========

    /// Grant a role to an account (admin only)
    pub fn grant_role(&mut self, role_id: u8, account: Address) {
        self.require_admin();
        if role_id >= ROLE_COUNT {
            self.env().revert(AllocatorError::InvalidConfig);
        }

        if self.has_role(role_id, account) {
            return;
        }

        self.set_role_internal(role_id, account, true);
    }

    /// Revoke a role from an account (admin only)
    pub fn revoke_role(&mut self, role_id: u8, account: Address) {
        self.require_admin();

        if !self.has_role(role_id, account) {
            return;
        }

        // Prevent revoking the last admin
        if role_id == ROLE_ADMIN && self.get_role_member_count(ROLE_ADMIN) <= 1 {
            self.env().revert(AllocatorError::InvalidConfig);
        }

        self.set_role_internal(role_id, account, false);
    }

    /// Renounce a role (caller gives up their own role)
    pub fn renounce_role(&mut self, role_id: u8) {
        let caller = self.env().caller();

        if !self.has_role(role_id, caller) {
            return;
        }

        if role_id == ROLE_ADMIN && self.get_role_member_count(ROLE_ADMIN) <= 1 {
            self.env().revert(AllocatorError::InvalidConfig);
        }

        self.set_role_internal(role_id, caller, false);
    }

    // ========== Modifier-like Functions ==========

    /// Revert if caller doesn't have the specified role
    pub fn require_role(&self, role_id: u8) {
        if !self.caller_has_role(role_id) {
            self.env().revert(AllocatorError::Unauthorized);
        }
    }

    /// Revert if caller doesn't have admin role
    pub fn require_admin(&self) {
        self.require_role(ROLE_ADMIN);
    }

    /// Revert unless caller holds `role_id` or admin
    pub fn require_role_or_admin(&self, role_id: u8) {
        if !self.caller_has_role(role_id) && !self.caller_has_role(ROLE_ADMIN) {
            self.env().revert(AllocatorError::Unauthorized);
        }
    }

    // ========== Internal Functions ==========

    fn set_role_internal(&mut self, role_id: u8, account: Address, value: bool) {
        let had_role = self.roles.get(&(role_id, account)).unwrap_or(false);

        self.roles.set(&(role_id, account), value);

        let current_count = self.role_count.get(&role_id).unwrap_or(0);
        if value && !had_role {
            self.role_count.set(&role_id, current_count + 1);
        } else if !value && had_role && current_count > 0 {
            self.role_count.set(&role_id, current_count - 1);
        }
    }
}
