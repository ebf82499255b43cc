//! Deployed allocator with helpers for common calls.

use odra::casper_types::U256;
use odra::host::{Deployer, HostEnv, HostRef};
use odra::prelude::*;

use cspr_allocator_contracts::adapters::fixed_rate::{FixedRateAdapter, FixedRateAdapterHostRef, FixedRateAdapterInitArgs};
use cspr_allocator_contracts::adapters::synthetic::{SyntheticAdapter, SyntheticAdapterHostRef, SyntheticAdapterInitArgs};
use cspr_allocator_contracts::adapters::wrapped_vault::{
    WrappedVaultAdapter, WrappedVaultAdapterHostRef, WrappedVaultAdapterInitArgs,
};
use cspr_allocator_contracts::collateral_vault::{CollateralVault, CollateralVaultHostRef, CollateralVaultInitArgs};
use cspr_allocator_contracts::router::{Router, RouterHostRef, RouterInitArgs};
use cspr_allocator_contracts::share_token::{
    AllocatorShareToken, AllocatorShareTokenHostRef, AllocatorShareTokenInitArgs,
};
use cspr_allocator_contracts::stable_token::{StableToken, StableTokenHostRef, StableTokenInitArgs};
use cspr_allocator_contracts::types::{PoolLeg, RATE_SCALE};
use cspr_allocator_contracts::yield_vault::{YieldVault, YieldVaultHostRef, YieldVaultInitArgs};

/// 100% in weight units
pub const FULL: u32 = 1_000_000;
/// Router dust tolerance used by every scenario
pub const DUST: u64 = 5;
/// Vault absolute dust threshold
pub const VAULT_DUST_ABS: u64 = 10;
/// Vault relative dust threshold (0.1%)
pub const VAULT_DUST_REL_BPS: u32 = 1_000;

pub fn units(n: u64) -> U256 {
    U256::from(n)
}

pub fn leg(pool_id: Address, amount: u64) -> PoolLeg {
    PoolLeg {
        pool_id,
        amount: U256::from(amount),
    }
}

pub struct Allocator {
    pub env: HostEnv,
    pub admin: Address,
    pub user: Address,
    pub solver: Address,
    pub operator: Address,
    pub stable: StableTokenHostRef,
    pub vault: CollateralVaultHostRef,
    pub router: RouterHostRef,
    pub share: AllocatorShareTokenHostRef,
}

impl Allocator {
    /// Deploy and wire stable token, vault, router and share token
    pub fn new(withdrawal_fee_bps: u32) -> Self {
        let env = odra_test::env();
        let admin = env.get_account(0);
        let user = env.get_account(1);
        let solver = env.get_account(2);
        let operator = env.get_account(3);
        env.set_caller(admin);

        let stable = StableToken::deploy(
            &env,
            StableTokenInitArgs {
                admin,
                name: String::from("Stable"),
                symbol: String::from("STBL"),
                decimals: 18,
            },
        );
        let stable_addr = stable.address().clone();

        let mut vault = CollateralVault::deploy(
            &env,
            CollateralVaultInitArgs {
                admin,
                dust_abs: units(VAULT_DUST_ABS),
                dust_rel_bps: VAULT_DUST_REL_BPS,
            },
        );
        let vault_addr = vault.address().clone();

        let mut router = Router::deploy(
            &env,
            RouterInitArgs {
                admin,
                stable_token: stable_addr,
                collateral_vault: vault_addr,
                withdrawal_fee_bps,
                dust_tolerance: units(DUST),
                deposit_cap: U256::zero(),
                reinvest_incentive_bps: 0,
                max_pool_count: 16,
            },
        );
        let router_addr = router.address().clone();

        let mut share = AllocatorShareToken::deploy(
            &env,
            AllocatorShareTokenInitArgs {
                admin,
                stable_token: stable_addr,
                name: String::from("Allocator Share"),
                symbol: String::from("ASH"),
                decimals: 18,
            },
        );

        vault.set_router(router_addr);
        router.set_share_token(share.address().clone());
        share.set_router(router_addr);

        Self {
            env,
            admin,
            user,
            solver,
            operator,
            stable,
            vault,
            router,
            share,
        }
    }

    pub fn router_addr(&self) -> Address {
        self.router.address().clone()
    }

    pub fn stable_addr(&self) -> Address {
        self.stable.address().clone()
    }

    pub fn vault_addr(&self) -> Address {
        self.vault.address().clone()
    }

    pub fn as_admin(&self) {
        self.env.set_caller(self.admin);
    }

    /// Fixed-rate pool at 1:1, registered and added with `target`
    pub fn add_fixed_pool(&mut self, target: u32) -> FixedRateAdapterHostRef {
        self.as_admin();
        let adapter = FixedRateAdapter::deploy(
            &self.env,
            FixedRateAdapterInitArgs {
                admin: self.admin,
                stable_token: self.stable_addr(),
                collateral_vault: self.vault_addr(),
                rate: U256::from(RATE_SCALE),
            },
        );
        let pool = adapter.address().clone();
        self.router.register_adapter(pool, pool);
        self.router.add_pool(pool, target);
        adapter
    }

    /// Synthetic pool at 1:1 with no faults armed
    pub fn add_synthetic_pool(&mut self, target: u32) -> SyntheticAdapterHostRef {
        self.as_admin();
        let adapter = SyntheticAdapter::deploy(
            &self.env,
            SyntheticAdapterInitArgs {
                admin: self.admin,
                stable_token: self.stable_addr(),
                collateral_vault: self.vault_addr(),
            },
        );
        let pool = adapter.address().clone();
        self.router.register_adapter(pool, pool);
        self.router.add_pool(pool, target);
        adapter
    }

    /// Yield vault pool behind a wrapped-vault adapter; the pool id is the vault
    pub fn add_wrapped_pool(&mut self, target: u32) -> (YieldVaultHostRef, WrappedVaultAdapterHostRef) {
        self.as_admin();
        let yield_vault = YieldVault::deploy(
            &self.env,
            YieldVaultInitArgs {
                admin: self.admin,
                asset: self.stable_addr(),
            },
        );
        let pool = yield_vault.address().clone();
        let adapter = WrappedVaultAdapter::deploy(
            &self.env,
            WrappedVaultAdapterInitArgs {
                admin: self.admin,
                stable_token: self.stable_addr(),
                collateral_vault: self.vault_addr(),
                wrapped_vault: pool,
            },
        );
        self.router.register_adapter(pool, adapter.address().clone());
        self.router.add_pool(pool, target);
        (yield_vault, adapter)
    }

    /// Mint stable to `account`
    pub fn fund(&mut self, account: Address, amount: u64) {
        self.as_admin();
        self.stable.mint(account, units(amount));
    }

    pub fn try_deposit(&mut self, account: Address, amount: u64) -> Result<U256, OdraError> {
        let router = self.router_addr();
        self.env.set_caller(account);
        self.stable.approve(router, units(amount));
        let result = self.share.try_deposit(units(amount), account);
        self.as_admin();
        result
    }

    /// Deposit through the share token; returns shares minted
    pub fn deposit(&mut self, account: Address, amount: u64) -> U256 {
        let router = self.router_addr();
        self.env.set_caller(account);
        self.stable.approve(router, units(amount));
        let shares = self.share.deposit(units(amount), account);
        self.as_admin();
        shares
    }

    pub fn try_redeem(&mut self, account: Address, shares: U256) -> Result<U256, OdraError> {
        self.env.set_caller(account);
        let result = self.share.try_redeem(shares, account, account);
        self.as_admin();
        result
    }

    /// Redeem own shares; returns net stable received
    pub fn redeem(&mut self, account: Address, shares: U256) -> U256 {
        self.env.set_caller(account);
        let net = self.share.redeem(shares, account, account);
        self.as_admin();
        net
    }

    pub fn pool_value(&self, pool: Address) -> U256 {
        self.vault.pool_value(pool)
    }

    /// Managed assets equal custodied pool value plus idle stable
    pub fn assert_nav_identity(&self) {
        let pools = self
            .router
            .get_allocations()
            .iter()
            .fold(U256::zero(), |acc, allocation| acc + allocation.value);
        pretty_assertions::assert_eq!(self.router.total_managed_assets(), pools + self.router.idle_balance());
    }
}
