//! Fixed-Rate Strategy Adapter
//!
//! The adapter is its own pool share token: deposits mint shares into the
//! collateral vault at `rate` (stable units per share, scaled by 1e18) and
//! withdrawals burn them for stable held by the adapter. Yield is modelled by
//! the admin raising the rate and topping up the adapter's stable balance.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::AllocatorError;
use crate::interfaces::Cep18TokenContractRef;
use crate::token_ledger::TokenLedger;
use crate::types::{div_ceil, RATE_SCALE};

/// shares = floor(amount * RATE_SCALE / rate)
pub fn shares_for_deposit(amount: U256, rate: U256) -> U256 {
    amount * U256::from(RATE_SCALE) / rate
}

/// assets = floor(shares * rate / RATE_SCALE)
pub fn assets_for_shares(shares: U256, rate: U256) -> U256 {
    shares * rate / U256::from(RATE_SCALE)
}

/// Smallest stable amount whose deposit mints at least `shares`
pub fn assets_for_mint(shares: U256, rate: U256) -> U256 {
    div_ceil(shares * rate, U256::from(RATE_SCALE))
}

/// Smallest share amount redeeming for at least `amount`
pub fn shares_for_amount(amount: U256, rate: U256) -> U256 {
    div_ceil(amount * U256::from(RATE_SCALE), rate)
}

/// Fixed-Rate Adapter Contract
#[odra::module]
pub struct FixedRateAdapter {
    /// Admin address
    admin: Var<Address>,
    /// Stable unit token
    stable_token: Var<Address>,
    /// Collateral vault receiving minted shares
    collateral_vault: Var<Address>,
    /// Stable units per share (1e18 = 1.0)
    rate: Var<U256>,
    /// Paused adapters refuse deposits and report unhealthy
    paused: Var<bool>,
    /// Pool share ledger
    ledger: SubModule<TokenLedger>,
}

#[odra::module]
impl FixedRateAdapter {
    /// Initialize the adapter
    pub fn init(&mut self, admin: Address, stable_token: Address, collateral_vault: Address, rate: U256) {
        if rate < U256::from(RATE_SCALE) {
            self.env().revert(AllocatorError::InvalidConfig);
        }
        self.admin.set(admin);
        self.stable_token.set(stable_token);
        self.collateral_vault.set(collateral_vault);
        self.rate.set(rate);
        self.paused.set(false);
    }

    // ========== Strategy Adapter Functions ==========

    /// This adapter's pool id (its own address)
    pub fn pool_id(&self) -> Address {
        self.env().self_address()
    }

    /// Healthy while not paused
    pub fn is_healthy(&self) -> bool {
        !self.paused.get().unwrap_or(false)
    }

    /// Pull stable from the caller and mint pool shares to the collateral vault
    pub fn deposit_into_strategy(&mut self, amount: U256) -> (Address, U256) {
        if amount.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        if !self.is_healthy() {
            self.env().revert(AllocatorError::PoolUnhealthy);
        }

        let shares = shares_for_deposit(amount, self.get_rate());
        if shares.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }

        let caller = self.env().caller();
        let mut stable = Cep18TokenContractRef::new(self.env(), self.stable());
        if !stable.transfer_from(caller, self.env().self_address(), amount) {
            self.env().revert(AllocatorError::InsufficientBalance);
        }

        let vault = self.vault();
        self.ledger.mint(vault, shares);
        (self.pool_id(), shares)
    }

    /// Burn the caller's approved shares and return stable to the caller
    pub fn withdraw_from_strategy(&mut self, shares: U256) -> U256 {
        if shares.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }

        let amount = assets_for_shares(shares, self.get_rate());
        let self_address = self.env().self_address();
        let mut stable = Cep18TokenContractRef::new(self.env(), self.stable());
        if stable.balance_of(self_address) < amount {
            self.env().revert(AllocatorError::InsufficientLiquidity);
        }

        let caller = self.env().caller();
        self.ledger.spend_allowance(caller, self_address, shares);
        self.ledger.burn(caller, shares);

        if !stable.transfer(caller, amount) {
            self.env().revert(AllocatorError::InsufficientLiquidity);
        }
        amount
    }

    /// Shares a deposit of `amount` would mint
    pub fn preview_deposit_into_strategy(&self, amount: U256) -> (Address, U256) {
        (self.pool_id(), shares_for_deposit(amount, self.get_rate()))
    }

    /// Stable returned for `shares`
    pub fn preview_withdraw_from_strategy(&self, shares: U256) -> U256 {
        assets_for_shares(shares, self.get_rate())
    }

    /// Shares needed to withdraw at least `amount`
    pub fn preview_shares_for_amount(&self, amount: U256) -> U256 {
        shares_for_amount(amount, self.get_rate())
    }

    /// Stable needed to mint at least `shares`
    pub fn preview_mint(&self, shares: U256) -> U256 {
        assets_for_mint(shares, self.get_rate())
    }

    /// Value of `shares` of this pool
    pub fn value_of(&self, pool_id: Address, shares: U256) -> U256 {
        if pool_id != self.pool_id() {
            self.env().revert(AllocatorError::InvalidPool);
        }
        assets_for_shares(shares, self.get_rate())
    }

    // ========== CEP-18 Share Functions ==========

    /// Get total supply
    pub fn total_supply(&self) -> U256 {
        self.ledger.total_supply()
    }

    /// Get balance of an account
    pub fn balance_of(&self, account: Address) -> U256 {
        self.ledger.balance_of(account)
    }

    /// Get allowance for spender
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.ledger.allowance(owner, spender)
    }

    /// Transfer shares to recipient
    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        let sender = self.env().caller();
        self.ledger.transfer(sender, recipient, amount);
        true
    }

    /// Approve spender to transfer shares
    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.ledger.approve(owner, spender, amount);
        true
    }

    /// Transfer from owner to recipient (requires allowance)
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        let spender = self.env().caller();
        self.ledger.transfer_from(spender, owner, recipient, amount);
        true
    }

    // ========== Admin Functions ==========

    /// Update the exchange rate (admin only)
    pub fn set_rate(&mut self, rate: U256) {
        self.require_admin();
        if rate.is_zero() {
            self.env().revert(AllocatorError::InvalidConfig);
        }
        self.rate.set(rate);
    }

    /// Pull stable from the caller to back accrued yield
    pub fn fund(&mut self, amount: U256) {
        if amount.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        let caller = self.env().caller();
        let mut stable = Cep18TokenContractRef::new(self.env(), self.stable());
        if !stable.transfer_from(caller, self.env().self_address(), amount) {
            self.env().revert(AllocatorError::InsufficientBalance);
        }
    }

    /// Pause or resume deposits (admin only)
    pub fn set_paused(&mut self, paused: bool) {
        self.require_admin();
        self.paused.set(paused);
    }

    /// Get exchange rate
    pub fn get_rate(&self) -> U256 {
        self.rate.get().unwrap_or(U256::from(RATE_SCALE))
    }

    // ========== Internal ==========

    fn stable(&self) -> Address {
        match self.stable_token.get() {
            Some(token) => token,
            None => self.env().revert(AllocatorError::NotInitialized),
        }
    }

    fn vault(&self) -> Address {
        match self.collateral_vault.get() {
            Some(vault) => vault,
            None => self.env().revert(AllocatorError::NotInitialized),
        }
    }

    fn require_admin(&self) {
        let caller = self.env().caller();
        match self.admin.get() {
            Some(admin) if caller == admin => {}
            _ => self.env().revert(AllocatorError::Unauthorized),
        }
    }
}
