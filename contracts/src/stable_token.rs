//! Stable Unit Token
//!
//! CEP-18 token used as the allocator's unit of account. Balances are also
//! mirrored into the standard CEP-18 named keys and dictionaries so wallets
//! and explorers can read them. Minting is restricted to admin-approved
//! minters.

use odra::prelude::*;
use odra::casper_types::{U256, Key};
use odra::casper_types::bytesrepr::ToBytes;
use crate::errors::AllocatorError;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

const CEP18_NAME_KEY: &str = "name";
const CEP18_SYMBOL_KEY: &str = "symbol";
const CEP18_DECIMALS_KEY: &str = "decimals";
const CEP18_TOTAL_SUPPLY_KEY: &str = "total_supply";
const CEP18_BALANCES_DICT: &str = "balances";
const CEP18_ALLOWANCES_DICT: &str = "allowances";

/// Stable Unit Token Contract
#[odra::module]
pub struct StableToken {
    name: Var<String>,
    symbol: Var<String>,
    decimals: Var<u8>,
    total_supply: Var<U256>,
    /// Balance mapping
    balances: Mapping<Address, U256>,
    /// Allowance mapping (owner, spender) -> amount
    allowances: Mapping<(Address, Address), U256>,
    /// Admin address (manages minters)
    admin: Var<Address>,
    /// Authorized minters
    minters: Mapping<Address, bool>,
}

#[odra::module]
impl StableToken {
    /// Initialize the token; the admin starts as the only minter
    pub fn init(&mut self, admin: Address, name: String, symbol: String, decimals: u8) {
        self.name.set(name.clone());
        self.symbol.set(symbol.clone());
        self.decimals.set(decimals);
        self.total_supply.set(U256::zero());
        self.admin.set(admin);
        self.minters.set(&admin, true);
        self.env().init_dictionary(CEP18_BALANCES_DICT);
        self.env().init_dictionary(CEP18_ALLOWANCES_DICT);
        self.env().set_named_value(CEP18_NAME_KEY, name);
        self.env().set_named_value(CEP18_SYMBOL_KEY, symbol);
        self.env().set_named_value(CEP18_DECIMALS_KEY, decimals);
        self.env().set_named_value(CEP18_TOTAL_SUPPLY_KEY, U256::zero());
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
        self.total_supply.get().unwrap_or(U256::zero())
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or(U256::zero())
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or(U256::zero())
    }

    /// Transfer tokens to recipient
    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        let sender = self.env().caller();
        self.transfer_internal(sender, recipient, amount);
        true
    }

    /// Approve spender to spend tokens
    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.approve_internal(owner, spender, amount);
        true
    }

    /// Transfer tokens from owner to recipient (requires allowance)
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        let spender = self.env().caller();

        let current_allowance = self.allowance(owner, spender);
        if current_allowance < amount {
            self.env().revert(AllocatorError::InsufficientAllowance);
        }

        self.transfer_internal(owner, recipient, amount);
        self.approve_internal(owner, spender, current_allowance - amount);
        true
    }

    // ========== Minting ==========

    /// Mint new tokens (authorized minters only)
    pub fn mint(&mut self, to: Address, amount: U256) {
        let caller = self.env().caller();
        if !self.is_minter(caller) {
            self.env().revert(AllocatorError::Unauthorized);
        }

        let new_balance = self.balance_of(to) + amount;
        self.balances.set(&to, new_balance);
        self.set_balance_cep18(to, new_balance);

        let new_supply = self.total_supply() + amount;
        self.total_supply.set(new_supply);
        self.env().set_named_value(CEP18_TOTAL_SUPPLY_KEY, new_supply);
    }

    /// Burn tokens from caller
    pub fn burn(&mut self, amount: U256) {
        let caller = self.env().caller();
        let balance = self.balance_of(caller);
        if balance < amount {
            self.env().revert(AllocatorError::InsufficientBalance);
        }

        let new_balance = balance - amount;
        self.balances.set(&caller, new_balance);
        self.set_balance_cep18(caller, new_balance);

        let new_supply = self.total_supply() - amount;
        self.total_supply.set(new_supply);
        self.env().set_named_value(CEP18_TOTAL_SUPPLY_KEY, new_supply);
    }

    // ========== Admin Functions ==========

    pub fn add_minter(&mut self, minter: Address) {
        self.require_admin();
        self.minters.set(&minter, true);
    }

    pub fn remove_minter(&mut self, minter: Address) {
        self.require_admin();
        self.minters.set(&minter, false);
    }

    pub fn is_minter(&self, account: Address) -> bool {
        self.minters.get(&account).unwrap_or(false)
    }

    pub fn get_admin(&self) -> Option<Address> {
        self.admin.get()
    }

    // ========== Internal Functions ==========

    fn transfer_internal(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(AllocatorError::InsufficientBalance);
        }

        let new_from_balance = from_balance - amount;
        self.balances.set(&from, new_from_balance);
        self.set_balance_cep18(from, new_from_balance);

        let new_to_balance = self.balance_of(to) + amount;
        self.balances.set(&to, new_to_balance);
        self.set_balance_cep18(to, new_to_balance);
    }

    fn approve_internal(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);
        let key = Self::cep18_allowance_key(owner, spender);
        self.env().set_dictionary_value(CEP18_ALLOWANCES_DICT, key.as_bytes(), amount);
    }

    fn set_balance_cep18(&self, owner: Address, amount: U256) {
        let key = Self::cep18_balance_key(owner);
        self.env().set_dictionary_value(CEP18_BALANCES_DICT, key.as_bytes(), amount);
    }

    fn cep18_balance_key(owner: Address) -> String {
        let bytes = Key::from(owner).to_bytes().unwrap_or_default();
        BASE64_STANDARD.encode(bytes)
    }

    fn cep18_allowance_key(owner: Address, spender: Address) -> String {
        let mut bytes = Key::from(owner).to_bytes().unwrap_or_default();
        bytes.extend_from_slice(&Key::from(spender).to_bytes().unwrap_or_default());
        BASE64_STANDARD.encode(bytes)
    }

    fn require_admin(&self) {
        let caller = self.env().caller();
        match self.admin.get() {
            Some(admin) if caller == admin => {}
            _ => self.env().revert(AllocatorError::Unauthorized),
        }
    }
}
