//! Wrapped Vault Strategy Adapter
//!
//! Routes stable into an external CEP-4626 vault whose share token is the
//! pool share token. The pool id is the wrapped vault's address; shares are
//! minted straight to the collateral vault.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::AllocatorError;
use crate::interfaces::{Cep18TokenContractRef, Cep4626VaultContractRef};

/// Wrapped Vault Adapter Contract
#[odra::module]
pub struct WrappedVaultAdapter {
    admin: Var<Address>,
    stable_token: Var<Address>,
    collateral_vault: Var<Address>,
    /// External CEP-4626 vault
    wrapped_vault: Var<Address>,
    paused: Var<bool>,
}

#[odra::module]
impl WrappedVaultAdapter {
    /// Initialize the adapter; the wrapped vault must take the stable token as its asset
    pub fn init(&mut self, admin: Address, stable_token: Address, collateral_vault: Address, wrapped_vault: Address) {
        let asset = Cep4626VaultContractRef::new(self.env(), wrapped_vault).asset();
        if asset != stable_token {
            self.env().revert(AllocatorError::InvalidConfig);
        }
        self.admin.set(admin);
        self.stable_token.set(stable_token);
        self.collateral_vault.set(collateral_vault);
        self.wrapped_vault.set(wrapped_vault);
        self.paused.set(false);
    }

    // ========== Strategy Adapter Functions ==========

    /// The wrapped vault's address
    pub fn pool_id(&self) -> Address {
        self.wrapped()
    }

    pub fn is_healthy(&self) -> bool {
        !self.paused.get().unwrap_or(false)
    }

    /// Pull stable from the caller and deposit it into the wrapped vault on
    /// behalf of the collateral vault
    pub fn deposit_into_strategy(&mut self, amount: U256) -> (Address, U256) {
        if amount.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        if !self.is_healthy() {
            self.env().revert(AllocatorError::PoolUnhealthy);
        }

        let caller = self.env().caller();
        let wrapped = self.wrapped();
        let mut stable = Cep18TokenContractRef::new(self.env(), self.stable());
        if !stable.transfer_from(caller, self.env().self_address(), amount) {
            self.env().revert(AllocatorError::InsufficientBalance);
        }

        stable.approve(wrapped, amount);
        let mut vault = Cep4626VaultContractRef::new(self.env(), wrapped);
        let shares = vault.deposit(amount, self.collateral());
        stable.approve(wrapped, U256::zero());

        (wrapped, shares)
    }

    /// Pull the caller's approved vault shares and redeem them to the caller
    pub fn withdraw_from_strategy(&mut self, shares: U256) -> U256 {
        if shares.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }

        let caller = self.env().caller();
        let self_address = self.env().self_address();
        let mut vault = Cep4626VaultContractRef::new(self.env(), self.wrapped());
        if !vault.transfer_from(caller, self_address, shares) {
            self.env().revert(AllocatorError::InsufficientAllowance);
        }
        vault.redeem(shares, caller, self_address)
    }

    pub fn preview_deposit_into_strategy(&self, amount: U256) -> (Address, U256) {
        let wrapped = self.wrapped();
        let shares = Cep4626VaultContractRef::new(self.env(), wrapped).preview_deposit(amount);
        (wrapped, shares)
    }

    pub fn preview_withdraw_from_strategy(&self, shares: U256) -> U256 {
        Cep4626VaultContractRef::new(self.env(), self.wrapped()).preview_redeem(shares)
    }

    pub fn preview_shares_for_amount(&self, amount: U256) -> U256 {
        Cep4626VaultContractRef::new(self.env(), self.wrapped()).preview_withdraw(amount)
    }

    pub fn preview_mint(&self, shares: U256) -> U256 {
        Cep4626VaultContractRef::new(self.env(), self.wrapped()).preview_mint(shares)
    }

    pub fn value_of(&self, pool_id: Address, shares: U256) -> U256 {
        let wrapped = self.wrapped();
        if pool_id != wrapped {
            self.env().revert(AllocatorError::InvalidPool);
        }
        Cep4626VaultContractRef::new(self.env(), wrapped).convert_to_assets(shares)
    }

    // ========== Admin Functions ==========

    /// Pause or resume deposits (admin only)
    pub fn set_paused(&mut self, paused: bool) {
        let caller = self.env().caller();
        match self.admin.get() {
            Some(admin) if caller == admin => {}
            _ => self.env().revert(AllocatorError::Unauthorized),
        }
        self.paused.set(paused);
    }

    // ========== Internal ==========

    fn wrapped(&self) -> Address {
        match self.wrapped_vault.get() {
            Some(vault) => vault,
            None => self.env().revert(AllocatorError::NotInitialized),
        }
    }

    fn stable(&self) -> Address {
        match self.stable_token.get() {
            Some(token) => token,
            None => self.env().revert(AllocatorError::NotInitialized),
        }
    }

    fn collateral(&self) -> Address {
        match self.collateral_vault.get() {
            Some(vault) => vault,
            None => self.env().revert(AllocatorError::NotInitialized),
        }
    }
}
