//! Yield Vault (CEP-4626 style)
//!
//! Share vault over the stable unit, wrapped by `WrappedVaultAdapter`.
//! - shares = vault token balance
//! - assets = stable held by the vault
//! - R = total_assets / total_shares
//!
//! Returns are reflected by R increasing: `accrue_yield` moves stable into
//! the vault without minting shares.

use odra::prelude::*;
use odra::casper_types::U256;
use odra::ContractRef;
use crate::errors::AllocatorError;
use crate::interfaces::Cep18TokenContractRef;
use crate::token_ledger::TokenLedger;
use crate::types::{div_ceil, RATE_SCALE};

/// `amount * numerator / denominator`, 1:1 while the vault is empty
fn convert(amount: U256, numerator: U256, denominator: U256, round_up: bool) -> U256 {
    if denominator.is_zero() {
        return amount;
    }
    if round_up {
        div_ceil(amount * numerator, denominator)
    } else {
        amount * numerator / denominator
    }
}

/// Yield Vault Contract
#[odra::module]
pub struct YieldVault {
    /// Underlying stable token
    asset: Var<Address>,
    /// Admin address
    admin: Var<Address>,
    /// Vault share ledger
    ledger: SubModule<TokenLedger>,
}

#[odra::module]
impl YieldVault {
    /// Initialize the vault over `asset`
    pub fn init(&mut self, admin: Address, asset: Address) {
        self.admin.set(admin);
        self.asset.set(asset);
    }

    // ========== Vault Views ==========

    /// Underlying asset
    pub fn asset(&self) -> Address {
        match self.asset.get() {
            Some(asset) => asset,
            None => self.env().revert(AllocatorError::NotInitialized),
        }
    }

    /// Stable held by the vault
    pub fn total_assets(&self) -> U256 {
        Cep18TokenContractRef::new(self.env(), self.asset()).balance_of(self.env().self_address())
    }

    /// Exchange rate scaled by 1e18
    pub fn get_exchange_rate(&self) -> U256 {
        self.convert_to_assets(U256::from(RATE_SCALE))
    }

    /// assets = shares * total_assets / total_shares
    pub fn convert_to_assets(&self, shares: U256) -> U256 {
        if self.ledger.total_supply().is_zero() {
            return shares;
        }
        convert(shares, self.total_assets(), self.ledger.total_supply(), false)
    }

    /// shares = assets * total_shares / total_assets
    pub fn convert_to_shares(&self, assets: U256) -> U256 {
        if self.ledger.total_supply().is_zero() {
            return assets;
        }
        convert(assets, self.ledger.total_supply(), self.total_assets(), false)
    }

    pub fn preview_deposit(&self, assets: U256) -> U256 {
        self.convert_to_shares(assets)
    }

    pub fn preview_redeem(&self, shares: U256) -> U256 {
        self.convert_to_assets(shares)
    }

    /// Assets needed to mint exactly `shares` (rounds up)
    pub fn preview_mint(&self, shares: U256) -> U256 {
        if self.ledger.total_supply().is_zero() {
            return shares;
        }
        convert(shares, self.total_assets(), self.ledger.total_supply(), true)
    }

    /// Shares burned to withdraw exactly `assets` (rounds up)
    pub fn preview_withdraw(&self, assets: U256) -> U256 {
        if self.ledger.total_supply().is_zero() {
            return assets;
        }
        convert(assets, self.ledger.total_supply(), self.total_assets(), true)
    }

    // ========== Vault Actions ==========

    /// Pull `assets` stable from the caller and mint shares to `receiver`
    pub fn deposit(&mut self, assets: U256, receiver: Address) -> U256 {
        if assets.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        let shares = self.preview_deposit(assets);
        if shares.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }

        let caller = self.env().caller();
        let mut stable = Cep18TokenContractRef::new(self.env(), self.asset());
        if !stable.transfer_from(caller, self.env().self_address(), assets) {
            self.env().revert(AllocatorError::InsufficientBalance);
        }

        self.ledger.mint(receiver, shares);
        shares
    }

    /// Burn `shares` of `owner` and send the assets to `receiver`
    pub fn redeem(&mut self, shares: U256, receiver: Address, owner: Address) -> U256 {
        if shares.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        let assets = self.preview_redeem(shares);

        let caller = self.env().caller();
        if caller != owner {
            self.ledger.spend_allowance(owner, caller, shares);
        }
        self.ledger.burn(owner, shares);

        let mut stable = Cep18TokenContractRef::new(self.env(), self.asset());
        if !stable.transfer(receiver, assets) {
            self.env().revert(AllocatorError::InsufficientLiquidity);
        }
        assets
    }

    /// Move stable into the vault without minting, raising R
    pub fn accrue_yield(&mut self, amount: U256) {
        if amount.is_zero() {
            self.env().revert(AllocatorError::ZeroAmount);
        }
        let caller = self.env().caller();
        let mut stable = Cep18TokenContractRef::new(self.env(), self.asset());
        if !stable.transfer_from(caller, self.env().self_address(), amount) {
            self.env().revert(AllocatorError::InsufficientBalance);
        }
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

    pub fn get_admin(&self) -> Option<Address> {
        self.admin.get()
    }
}
