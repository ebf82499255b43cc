//! CEP-18 share ledger.
//!
//! Balance, allowance and supply bookkeeping shared by every contract that
//! issues its own share token (strategy adapters, the yield vault and the
//! allocator share token). The owning contract exposes the CEP-18 entry
//! points and forwards them here with the caller resolved.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::AllocatorError;

/// Share ledger sub-module
#[odra::module]
pub struct TokenLedger {
    /// Total shares issued
    total_supply: Var<U256>,
    /// Balance mapping (owner -> shares)
    balances: Mapping<Address, U256>,
    /// Allowance mapping (owner, spender) -> amount
    allowances: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl TokenLedger {
    /// Get total supply
    pub fn total_supply(&self) -> U256 {
        self.total_supply.get().unwrap_or(U256::zero())
    }

    /// Get balance of an account
    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or(U256::zero())
    }

    /// Get allowance for spender
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or(U256::zero())
    }

    /// Move shares between accounts
    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            self.env().revert(AllocatorError::InsufficientBalance);
        }

        self.balances.set(&from, from_balance - amount);
        let to_balance = self.balance_of(to);
        self.balances.set(&to, to_balance + amount);
    }

    /// Set allowance
    pub fn approve(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.set(&(owner, spender), amount);
    }

    /// Consume allowance of `spender` over `owner`'s shares
    pub fn spend_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        let current_allowance = self.allowance(owner, spender);
        if current_allowance < amount {
            self.env().revert(AllocatorError::InsufficientAllowance);
        }
        self.allowances.set(&(owner, spender), current_allowance - amount);
    }

    /// Transfer using the spender's allowance
    pub fn transfer_from(&mut self, spender: Address, owner: Address, recipient: Address, amount: U256) {
        self.spend_allowance(owner, spender, amount);
        self.transfer(owner, recipient, amount);
    }

    /// Issue new shares
    pub fn mint(&mut self, to: Address, amount: U256) {
        let current_balance = self.balance_of(to);
        self.balances.set(&to, current_balance + amount);

        let current_supply = self.total_supply();
        self.total_supply.set(current_supply + amount);
    }

    /// Destroy shares
    pub fn burn(&mut self, from: Address, amount: U256) {
        let current_balance = self.balance_of(from);
        if current_balance < amount {
            self.env().revert(AllocatorError::InsufficientBalance);
        }

        self.balances.set(&from, current_balance - amount);

        let current_supply = self.total_supply();
        self.total_supply.set(current_supply - amount);
    }
}
