//! Allocator Share Token
//!
//! CEP-18 share token over the allocator's managed value:
//! - assets = router's token backing (managed assets minus shortfall)
//! - shares = this token's supply
//!
//! End users call `deposit`/`redeem` here; the value moves through the
//! router's single-pool flows. Solver flows mint and burn through
//! `mint_for`/`burn_for`, which only the router may call.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::AllocatorError;
use crate::interfaces::AllocatorRouterContractRef;
use crate::token_ledger::TokenLedger;
use crate::types::div_ceil;

/// Allocator Share Token Contract
#[odra::module]
pub struct AllocatorShareToken {
    name: Var<String>,
    symbol: Var<String>,
    decimals: Var<u8>,
    /// Admin address (sets the router)
    admin: Var<Address>,
    /// Stable unit the shares are denominated in
    stable_token: Var<Address>,
    /// Router allowed to mint and burn
    router: Var<Option<Address>>,
    /// Share ledger
    ledger: SubModule<TokenLedger>,
}

#[odra::module]
impl AllocatorShareToken {
    /// Initialize the share token; the router is wired in afterwards
    pub fn init(&mut self, admin: Address, stable_token: Address, name: String, symbol: String, decimals: u8) {
        self.admin.set(admin);
        self.stable_token.set(stable_token);
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(decimals);
        self.router.set(None);
    }

    // ========== Vault Views ==========

    /// Underlying stable token
    pub fn asset(&self) -> Option<Address> {
        self.stable_token.get()
    }

    /// Value backing the outstanding shares
    pub fn total_assets(&self) -> U256 {
        match self.router.get().flatten() {
            Some(router) => AllocatorRouterContractRef::new(self.env(), router).token_backing(),
            None => U256::zero(),
        }
    }

    /// assets = shares * total_assets / total_supply (1:1 while empty)
    pub fn convert_to_assets(&self, shares: U256) -> U256 {
        let supply = self.ledger.total_supply();
        if supply.is_zero() {
            return shares;
        }
        shares * self.total_assets() / supply
    }

    /// shares = assets * total_supply / total_assets (1:1 while empty)
    pub fn convert_to_shares(&self, assets: U256) -> U256 {
        let supply = self.ledger.total_supply();
        let backing = self.total_assets();
        if supply.is_zero() || backing.is_zero() {
            return assets;
        }
        assets * supply / backing
    }

    /// Shares minted for a deposit of `assets`
    pub fn preview_deposit(&self, assets: U256) -> U256 {
        self.convert_to_shares(assets)
    }

    /// Shares burned to take out `assets` gross (rounds up)
    pub fn preview_withdraw(&self, assets: U256) -> U256 {
        let supply = self.ledger.total_supply();
        let backing = self.total_assets();
        if supply.is_zero() || backing.is_zero() {
            return assets;
        }
        div_ceil(assets * supply, backing)
    }

    /// Net assets paid for redeeming `shares`, after the withdrawal fee
    pub fn preview_redeem(&self, shares: U256) -> U256 {
        let gross = self.convert_to_assets(shares);
        let (net, _) = self.router_ref().preview_withdrawal_fee(gross);
        net
    }

    // ========== User Entry Points ==========

    /// Deposit `assets` stable (approved to the router) and mint shares to `receiver`
    pub fn deposit(&mut self, assets: U256, receiver: Address) -> U256 {
        if assets.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        let shares = self.preview_deposit(assets);
        if shares.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }

        let caller = self.env().caller();
        self.router_ref().handle_deposit(caller, assets, shares, receiver);
        self.ledger.mint(receiver, shares);
        shares
    }

    /// Burn `shares` of `owner` and pay the net assets to `receiver`
    pub fn redeem(&mut self, shares: U256, receiver: Address, owner: Address) -> U256 {
        if shares.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        let gross = self.convert_to_assets(shares);
        if gross.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }

        let caller = self.env().caller();
        if caller != owner {
            self.ledger.spend_allowance(owner, caller, shares);
        }
        self.ledger.burn(owner, shares);

        let mut router = self.router_ref();
        let (expected_net, _) = router.preview_withdrawal_fee(gross);
        let (net, _fee) = router.handle_withdraw(caller, receiver, owner, gross, expected_net);
        net
    }

    // ========== Router Entry Points ==========

    /// Mint shares for a solver deposit (router only)
    pub fn mint_for(&mut self, initiator: Address, receiver: Address, assets: U256, shares: U256) {
        let _ = (initiator, assets);
        self.require_router();
        if shares.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        self.ledger.mint(receiver, shares);
    }

    /// Burn shares for a solver withdrawal (router only).
    ///
    /// Spends `owner`'s allowance to `initiator` unless they are the same account.
    pub fn burn_for(&mut self, initiator: Address, receiver: Address, owner: Address, assets: U256, shares: U256) {
        let _ = (receiver, assets);
        self.require_router();
        if shares.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        if initiator != owner {
            self.ledger.spend_allowance(owner, initiator, shares);
        }
        self.ledger.burn(owner, shares);
    }

    // ========== CEP-18 Standard Functions ==========

    pub fn name(&self) -> String {
        self.name.get().unwrap_or_default()
    }

    pub fn symbol(&self) -> String {
        self.symbol.get().unwrap_or_default()
    }

    pub fn decimals(&self) -> u8 {
        self.decimals.get().unwrap_or(18)
    }

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

    // ========== Admin Functions ==========

    /// Point the token at a router (admin only)
    pub fn set_router(&mut self, router: Address) {
        let caller = self.env().caller();
        match self.admin.get() {
            Some(admin) if caller == admin => {}
            _ => self.env().revert(AllocatorError::Unauthorized),
        }
        self.router.set(Some(router));
    }

    pub fn get_router(&self) -> Option<Address> {
        self.router.get().flatten()
    }

    // ========== Internal ==========

    fn router_ref(&self) -> AllocatorRouterContractRef {
        match self.router.get().flatten() {
            Some(router) => AllocatorRouterContractRef::new(self.env(), router),
            None => self.env().revert(AllocatorError::NotInitialized),
        }
    }

    fn require_router(&self) {
        let caller = self.env().caller();
        if self.router.get().flatten() != Some(caller) {
            self.env().revert(AllocatorError::UnauthorizedRouter);
        }
    }
}
