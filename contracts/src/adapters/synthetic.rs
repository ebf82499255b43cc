//! Synthetic Strategy Adapter
//!
//! Fixed-rate pool share mechanics with switches that make the adapter
//! misreport, underdeliver or overdeliver. Deployed on test networks to drive the
//! router's slippage, mismatch, probe and reentrancy paths.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::adapters::fixed_rate::{assets_for_mint, assets_for_shares, shares_for_amount, shares_for_deposit};
use crate::errors::AllocatorError;
use crate::interfaces::Cep18TokenContractRef;
use crate::token_ledger::TokenLedger;
use crate::types::{RATE_SCALE, WEIGHT_SCALE};

/// Router entry point called back during a deposit when reentry is armed
#[odra::external_contract]
pub trait ReentryTarget {
    fn reinvest_fees(&mut self) -> (U256, U256);
    fn pause(&mut self);
}

/// Synthetic Adapter Contract
#[odra::module]
pub struct SyntheticAdapter {
    admin: Var<Address>,
    stable_token: Var<Address>,
    collateral_vault: Var<Address>,
    /// Stable units per share (1e18 = 1.0)
    rate: Var<U256>,
    /// Unhealthy adapters revert every preview and valuation
    healthy: Var<bool>,
    /// Added to the amounts reported by deposit and withdraw
    report_bonus: Var<U256>,
    /// Fraction withheld from what is actually minted or paid out
    execution_haircut_bps: Var<u32>,
    /// Fraction added on top of what is actually minted or paid out
    execution_premium_bps: Var<u32>,
    /// Quote `preview_shares_for_amount` rounded down instead of up
    round_down_share_quotes: Var<bool>,
    /// Pool id reported by deposits instead of the real one
    reported_pool: Var<Option<Address>>,
    /// Contract re-entered from inside `deposit_into_strategy`
    reentry_target: Var<Option<Address>>,
    /// Re-enter through the admin `pause` instead of `reinvest_fees`
    reentry_via_admin: Var<bool>,
    ledger: SubModule<TokenLedger>,
}

#[odra::module]
impl SyntheticAdapter {
    /// Initialize at a 1:1 rate, healthy, with no faults armed
    pub fn init(&mut self, admin: Address, stable_token: Address, collateral_vault: Address) {
        self.admin.set(admin);
        self.stable_token.set(stable_token);
        self.collateral_vault.set(collateral_vault);
        self.rate.set(U256::from(RATE_SCALE));
        self.healthy.set(true);
        self.report_bonus.set(U256::zero());
        self.execution_haircut_bps.set(0);
        self.execution_premium_bps.set(0);
        self.round_down_share_quotes.set(false);
        self.reported_pool.set(None);
        self.reentry_target.set(None);
        self.reentry_via_admin.set(false);
    }

    // ========== Strategy Adapter Functions ==========

    pub fn pool_id(&self) -> Address {
        self.env().self_address()
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.get().unwrap_or(true)
    }

    pub fn deposit_into_strategy(&mut self, amount: U256) -> (Address, U256) {
        if amount.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        self.require_healthy();

        if let Some(target) = self.reentry_target.get().flatten() {
            let mut router = ReentryTargetContractRef::new(self.env(), target);
            if self.reentry_via_admin.get().unwrap_or(false) {
                router.pause();
            } else {
                router.reinvest_fees();
            }
        }

        let caller = self.env().caller();
        let mut stable = Cep18TokenContractRef::new(self.env(), self.stable());
        if !stable.transfer_from(caller, self.env().self_address(), amount) {
            self.env().revert(AllocatorError::InsufficientBalance);
        }

        let minted = self.apply_execution(shares_for_deposit(amount, self.get_rate()));
        let vault = self.vault();
        self.ledger.mint(vault, minted);

        let reported_pool = self.reported_pool.get().flatten().unwrap_or(self.pool_id());
        (reported_pool, minted + self.get_report_bonus())
    }

    pub fn withdraw_from_strategy(&mut self, shares: U256) -> U256 {
        if shares.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }

        let paid = self.apply_execution(assets_for_shares(shares, self.get_rate()));
        let self_address = self.env().self_address();
        let mut stable = Cep18TokenContractRef::new(self.env(), self.stable());
        if stable.balance_of(self_address) < paid {
            self.env().revert(AllocatorError::InsufficientLiquidity);
        }

        let caller = self.env().caller();
        self.ledger.spend_allowance(caller, self_address, shares);
        self.ledger.burn(caller, shares);

        if !stable.transfer(caller, paid) {
            self.env().revert(AllocatorError::InsufficientLiquidity);
        }
        paid + self.get_report_bonus()
    }

    pub fn preview_deposit_into_strategy(&self, amount: U256) -> (Address, U256) {
        self.require_healthy();
        (self.pool_id(), shares_for_deposit(amount, self.get_rate()))
    }

    pub fn preview_withdraw_from_strategy(&self, shares: U256) -> U256 {
        self.require_healthy();
        assets_for_shares(shares, self.get_rate())
    }

    pub fn preview_shares_for_amount(&self, amount: U256) -> U256 {
        self.require_healthy();
        if self.round_down_share_quotes.get().unwrap_or(false) {
            return shares_for_deposit(amount, self.get_rate());
        }
        shares_for_amount(amount, self.get_rate())
    }

    pub fn preview_mint(&self, shares: U256) -> U256 {
        self.require_healthy();
        assets_for_mint(shares, self.get_rate())
    }

    pub fn value_of(&self, pool_id: Address, shares: U256) -> U256 {
        self.require_healthy();
        if pool_id != self.pool_id() {
            self.env().revert(AllocatorError::InvalidPool);
        }
        assets_for_shares(shares, self.get_rate())
    }

    // ========== CEP-18 Share Functions ==========

    pub fn total_supply(&self) -> U256 {
        self.ledger.total_supply()
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.ledger.balance_of(account)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.ledger.allowance(owner, spender)
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        let sender = self.env().caller();
        self.ledger.transfer(sender, recipient, amount);
        true
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.ledger.approve(owner, spender, amount);
        true
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        let spender = self.env().caller();
        self.ledger.transfer_from(spender, owner, recipient, amount);
        true
    }

    // ========== Fault Switches (admin only) ==========

    pub fn set_rate(&mut self, rate: U256) {
        self.require_admin();
        if rate.is_zero() {
            self.env().revert(AllocatorError::InvalidConfig);
        }
        self.rate.set(rate);
    }

    pub fn set_healthy(&mut self, healthy: bool) {
        self.require_admin();
        self.healthy.set(healthy);
    }

    pub fn set_report_bonus(&mut self, bonus: U256) {
        self.require_admin();
        self.report_bonus.set(bonus);
    }

    pub fn set_execution_haircut_bps(&mut self, haircut_bps: u32) {
        self.require_admin();
        if haircut_bps > WEIGHT_SCALE {
            self.env().revert(AllocatorError::ValueAboveMaximum);
        }
        self.execution_haircut_bps.set(haircut_bps);
    }

    pub fn set_execution_premium_bps(&mut self, premium_bps: u32) {
        self.require_admin();
        if premium_bps > WEIGHT_SCALE {
            self.env().revert(AllocatorError::ValueAboveMaximum);
        }
        self.execution_premium_bps.set(premium_bps);
    }

    pub fn set_round_down_share_quotes(&mut self, round_down: bool) {
        self.require_admin();
        self.round_down_share_quotes.set(round_down);
    }

    pub fn set_reported_pool(&mut self, pool_id: Option<Address>) {
        self.require_admin();
        self.reported_pool.set(pool_id);
    }

    pub fn set_reentry_target(&mut self, target: Option<Address>) {
        self.require_admin();
        self.reentry_target.set(target);
    }

    pub fn set_reentry_via_admin(&mut self, via_admin: bool) {
        self.require_admin();
        self.reentry_via_admin.set(via_admin);
    }

    pub fn get_rate(&self) -> U256 {
        self.rate.get().unwrap_or(U256::from(RATE_SCALE))
    }

    pub fn get_report_bonus(&self) -> U256 {
        self.report_bonus.get().unwrap_or(U256::zero())
    }

    // ========== Internal ==========

    fn apply_execution(&self, amount: U256) -> U256 {
        let haircut_bps = self.execution_haircut_bps.get().unwrap_or(0);
        let premium_bps = self.execution_premium_bps.get().unwrap_or(0);
        let scale = U256::from(WEIGHT_SCALE);
        amount - amount * U256::from(haircut_bps) / scale + amount * U256::from(premium_bps) / scale
    }

    fn require_healthy(&self) {
        if !self.is_healthy() {
            self.env().revert(AllocatorError::PoolUnhealthy);
        }
    }

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
