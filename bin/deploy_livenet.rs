//! Deploy the allocator contracts to Casper livenet/testnet using Odra livenet environment.
//!
//! Usage:
//!   cargo run --bin deploy_livenet --release
//!
//! Requires .env file with:
//!   ODRA_CASPER_LIVENET_SECRET_KEY_PATH=/path/to/secret_key.pem
//!   ODRA_CASPER_LIVENET_NODE_ADDRESS=https://node.testnet.casper.network
//!   ODRA_CASPER_LIVENET_CHAIN_NAME=casper-test
//!   ODRA_CASPER_LIVENET_PAYMENT_AMOUNT=200000000000
//!
//! Optional allocator parameters:
//!   ALLOCATOR_DEPOSIT_CAP=0                 (0 = unlimited)
//!   ALLOCATOR_WITHDRAWAL_FEE_BPS=350        (of 1_000_000)
//!   ALLOCATOR_DUST_TOLERANCE=1000
//!   ALLOCATOR_REINVEST_INCENTIVE_BPS=10000  (of 1_000_000)

use std::str::FromStr;

use odra::casper_types::U256;
use odra::host::Deployer;
use odra::prelude::*;

use cspr_allocator_contracts::adapters::fixed_rate::{FixedRateAdapter, FixedRateAdapterInitArgs};
use cspr_allocator_contracts::adapters::wrapped_vault::{WrappedVaultAdapter, WrappedVaultAdapterInitArgs};
use cspr_allocator_contracts::collateral_vault::{CollateralVault, CollateralVaultInitArgs};
use cspr_allocator_contracts::router::{Router, RouterInitArgs};
use cspr_allocator_contracts::share_token::{AllocatorShareToken, AllocatorShareTokenInitArgs};
use cspr_allocator_contracts::stable_token::{StableToken, StableTokenInitArgs};
use cspr_allocator_contracts::types::{DEFAULT_DUST_TOLERANCE, DEFAULT_MAX_POOL_COUNT, RATE_SCALE};
use cspr_allocator_contracts::yield_vault::{YieldVault, YieldVaultInitArgs};

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u256_or(key: &str, default: U256) -> U256 {
    std::env::var(key)
        .ok()
        .and_then(|v| U256::from_dec_str(&v).ok())
        .unwrap_or(default)
}

fn main() {
    // Load environment from .env file
    dotenv::dotenv().ok();

    println!("=== Allocator Livenet Deployment ===");
    println!();

    // Initialize Odra livenet environment
    let env = odra_casper_livenet_env::env();

    // Configure payment amount for deployments/calls (required for Casper 2.0 txs)
    let payment_amount: u64 = env_or("ODRA_CASPER_LIVENET_PAYMENT_AMOUNT", 200_000_000_000);
    env.set_gas(payment_amount);

    let deployer = env.caller();
    println!("Deployer: {:?}", deployer);
    println!();

    // Allocator parameters
    let deposit_cap = env_u256_or("ALLOCATOR_DEPOSIT_CAP", U256::zero());
    let withdrawal_fee_bps: u32 = env_or("ALLOCATOR_WITHDRAWAL_FEE_BPS", 350);
    let dust_tolerance = env_u256_or("ALLOCATOR_DUST_TOLERANCE", U256::from(DEFAULT_DUST_TOLERANCE));
    let reinvest_incentive_bps: u32 = env_or("ALLOCATOR_REINVEST_INCENTIVE_BPS", 10_000);
    let vault_dust_rel_bps: u32 = 1_000; // 0.1% of NAV

    println!("Deposit cap:         {}", deposit_cap);
    println!("Withdrawal fee bps:  {}", withdrawal_fee_bps);
    println!("Dust tolerance:      {}", dust_tolerance);
    println!("Reinvest incentive:  {}", reinvest_incentive_bps);
    println!();

    // ==================== Phase 1: Core Contracts ====================
    println!("=== Phase 1: Deploying Core Contracts ===");
    println!();

    println!("Deploying StableToken...");
    let stable = StableToken::deploy(
        &env,
        StableTokenInitArgs {
            admin: deployer,
            name: String::from("Allocator Stable"),
            symbol: String::from("aUSD"),
            decimals: 18,
        },
    );
    let stable_addr = stable.address().clone();
    println!("StableToken deployed at: {:?}", stable_addr);

    println!("Deploying CollateralVault...");
    let mut collateral_vault = CollateralVault::deploy(
        &env,
        CollateralVaultInitArgs {
            admin: deployer,
            dust_abs: dust_tolerance,
            dust_rel_bps: vault_dust_rel_bps,
        },
    );
    let collateral_vault_addr = collateral_vault.address().clone();
    println!("CollateralVault deployed at: {:?}", collateral_vault_addr);

    println!("Deploying Router...");
    let mut router = Router::deploy(
        &env,
        RouterInitArgs {
            admin: deployer,
            stable_token: stable_addr,
            collateral_vault: collateral_vault_addr,
            withdrawal_fee_bps,
            dust_tolerance,
            deposit_cap,
            reinvest_incentive_bps,
            max_pool_count: DEFAULT_MAX_POOL_COUNT,
        },
    );
    let router_addr = router.address().clone();
    println!("Router deployed at: {:?}", router_addr);

    println!("Deploying AllocatorShareToken...");
    let mut share_token = AllocatorShareToken::deploy(
        &env,
        AllocatorShareTokenInitArgs {
            admin: deployer,
            stable_token: stable_addr,
            name: String::from("Allocator Share"),
            symbol: String::from("aSHARE"),
            decimals: 18,
        },
    );
    let share_token_addr = share_token.address().clone();
    println!("AllocatorShareToken deployed at: {:?}", share_token_addr);

    println!();

    // ==================== Phase 2: Strategies ====================
    println!("=== Phase 2: Deploying Strategies ===");
    println!();

    println!("Deploying FixedRateAdapter...");
    let fixed_rate = FixedRateAdapter::deploy(
        &env,
        FixedRateAdapterInitArgs {
            admin: deployer,
            stable_token: stable_addr,
            collateral_vault: collateral_vault_addr,
            rate: U256::from(RATE_SCALE),
        },
    );
    let fixed_rate_addr = fixed_rate.address().clone();
    println!("FixedRateAdapter deployed at: {:?}", fixed_rate_addr);

    println!("Deploying YieldVault...");
    let yield_vault = YieldVault::deploy(
        &env,
        YieldVaultInitArgs {
            admin: deployer,
            asset: stable_addr,
        },
    );
    let yield_vault_addr = yield_vault.address().clone();
    println!("YieldVault deployed at: {:?}", yield_vault_addr);

    println!("Deploying WrappedVaultAdapter...");
    let wrapped = WrappedVaultAdapter::deploy(
        &env,
        WrappedVaultAdapterInitArgs {
            admin: deployer,
            stable_token: stable_addr,
            collateral_vault: collateral_vault_addr,
            wrapped_vault: yield_vault_addr,
        },
    );
    let wrapped_addr = wrapped.address().clone();
    println!("WrappedVaultAdapter deployed at: {:?}", wrapped_addr);

    println!();

    // ==================== Phase 3: Cross-contract Configuration ====================
    println!("=== Phase 3: Cross-contract Configuration ===");
    println!();

    println!("Configuring CollateralVault -> Router link...");
    collateral_vault.set_router(router_addr);
    println!("Done.");

    println!("Configuring Router <-> AllocatorShareToken link...");
    router.set_share_token(share_token_addr);
    share_token.set_router(router_addr);
    println!("Done.");

    // Pool ids: the fixed-rate adapter issues its own shares, the wrapped
    // adapter's pool is the yield vault
    println!("Registering adapters...");
    router.register_adapter(fixed_rate_addr, fixed_rate_addr);
    router.register_adapter(yield_vault_addr, wrapped_addr);
    println!("Done.");

    println!("Adding pools (60% fixed-rate / 40% yield vault)...");
    router.add_pool(fixed_rate_addr, 600_000);
    router.add_pool(yield_vault_addr, 400_000);
    router.set_default_pool(Some(fixed_rate_addr));
    println!("Done.");

    println!();
    println!("=== Deployment Complete ===");
    println!();
    println!("Contract Addresses:");
    println!("  StableToken:          {:?}", stable_addr);
    println!("  CollateralVault:      {:?}", collateral_vault_addr);
    println!("  Router:               {:?}", router_addr);
    println!("  AllocatorShareToken:  {:?}", share_token_addr);
    println!("  FixedRateAdapter:     {:?}", fixed_rate_addr);
    println!("  YieldVault:           {:?}", yield_vault_addr);
    println!("  WrappedVaultAdapter:  {:?}", wrapped_addr);
}
