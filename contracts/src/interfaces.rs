//! Cross-contract interfaces.
//!
//! Every collaborator the router, vault and adapters talk to is reached
//! through one of these traits, so any contract exposing the same entry
//! points can be plugged in by address.

use odra::prelude::*;
use odra::casper_types::U256;

/// CEP-18 token interface (stable unit and pool share tokens)
#[odra::external_contract]
pub trait Cep18Token {
    fn transfer(&mut self, recipient: Address, amount: U256) -> bool;
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool;
    fn approve(&mut self, spender: Address, amount: U256) -> bool;
    fn allowance(&self, owner: Address, spender: Address) -> U256;
    fn balance_of(&self, account: Address) -> U256;
    fn total_supply(&self) -> U256;
}

/// Strategy adapter capability.
///
/// Converts between the stable unit and a pool-specific share. Execution
/// results are never below the matching preview.
#[odra::external_contract]
pub trait StrategyAdapter {
    /// Pool this adapter serves
    fn pool_id(&self) -> Address;
    /// Whether previews and valuation can be relied on right now
    fn is_healthy(&self) -> bool;
    /// Pull `amount` stable from the caller, deliver shares to the collateral vault
    fn deposit_into_strategy(&mut self, amount: U256) -> (Address, U256);
    /// Pull `shares` from the caller, return stable to the caller
    fn withdraw_from_strategy(&mut self, shares: U256) -> U256;
    fn preview_deposit_into_strategy(&self, amount: U256) -> (Address, U256);
    fn preview_withdraw_from_strategy(&self, shares: U256) -> U256;
    /// Shares whose redemption yields at least `amount` (rounds up)
    fn preview_shares_for_amount(&self, amount: U256) -> U256;
    /// Stable needed to mint at least `shares` (rounds up)
    fn preview_mint(&self, shares: U256) -> U256;
    fn value_of(&self, pool_id: Address, shares: U256) -> U256;
}

/// CEP-4626 tokenized vault, wrapped by `WrappedVaultAdapter`
#[odra::external_contract]
pub trait Cep4626Vault {
    fn asset(&self) -> Address;
    fn total_assets(&self) -> U256;
    fn convert_to_assets(&self, shares: U256) -> U256;
    fn preview_deposit(&self, assets: U256) -> U256;
    fn preview_redeem(&self, shares: U256) -> U256;
    fn preview_withdraw(&self, assets: U256) -> U256;
    fn preview_mint(&self, shares: U256) -> U256;
    fn deposit(&mut self, assets: U256, receiver: Address) -> U256;
    fn redeem(&mut self, shares: U256, receiver: Address, owner: Address) -> U256;
    fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool;
    fn approve(&mut self, spender: Address, amount: U256) -> bool;
}

/// Collateral vault as seen by the router
#[odra::external_contract]
pub trait CollateralCustody {
    fn total_value(&self) -> U256;
    fn pool_balance(&self, pool_id: Address) -> U256;
    fn pool_value(&self, pool_id: Address) -> U256;
    fn get_adapter(&self, pool_id: Address) -> Option<Address>;
    fn is_supported(&self, pool_id: Address) -> bool;
    fn transfer_shares(&mut self, pool_id: Address, amount: U256, recipient: Address);
    fn register_adapter(&mut self, pool_id: Address, adapter: Address);
    fn remove_adapter(&mut self, pool_id: Address);
    fn add_supported_pool(&mut self, pool_id: Address);
    fn remove_supported_pool(&mut self, pool_id: Address);
}

/// Share-issuing token as seen by the router
#[odra::external_contract]
pub trait ShareIssuer {
    fn total_supply(&self) -> U256;
    fn preview_deposit(&self, assets: U256) -> U256;
    fn preview_withdraw(&self, assets: U256) -> U256;
    fn preview_redeem(&self, shares: U256) -> U256;
    fn mint_for(&mut self, initiator: Address, receiver: Address, assets: U256, shares: U256);
    fn burn_for(&mut self, initiator: Address, receiver: Address, owner: Address, assets: U256, shares: U256);
}

/// Router as seen by the share token
#[odra::external_contract]
pub trait AllocatorRouter {
    fn token_backing(&self) -> U256;
    fn preview_withdrawal_fee(&self, gross_assets: U256) -> (U256, U256);
    fn handle_deposit(&mut self, initiator: Address, assets: U256, shares: U256, receiver: Address);
    fn handle_withdraw(
        &mut self,
        initiator: Address,
        receiver: Address,
        owner: Address,
        gross_assets: U256,
        expected_net_assets: U256,
    ) -> (U256, U256);
}
