//! Allocator error definitions.

use odra::prelude::*;

/// Allocator errors
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AllocatorError {
    // Input validation errors (1xx)
    ZeroAmount = 100,
    EmptyLegs = 102,
    DuplicatePool = 103,
    LengthMismatch = 104,
    IndexOutOfRange = 105,

    // Authorization errors (2xx)
    Unauthorized = 200,
    UnauthorizedRouter = 201,
    UnauthorizedToken = 202,
    Paused = 203,
    NotPaused = 204,

    // Configuration errors (3xx)
    PoolNotFound = 300,
    PoolAlreadyExists = 301,
    InvalidTotalWeight = 302,
    MaxPoolCountExceeded = 303,
    AdapterPoolMismatch = 304,
    AdapterNotRegistered = 305,
    AdapterStillRegistered = 306,
    PoolNotSupported = 307,
    InvalidStatusTransition = 308,
    PoolNotDepositEligible = 309,
    PoolNotWithdrawalEligible = 310,
    PoolNotWoundDown = 311,
    InvalidConfig = 312,
    ValueAboveMaximum = 313,
    DefaultPoolNotSet = 314,
    InvalidPool = 315,
    NotInitialized = 316,

    // Economic errors (4xx)
    SlippageExceeded = 400,
    SharesMismatch = 401,
    AmountMismatch = 402,
    DepositCapExceeded = 403,
    ShortfallExceedsAssets = 404,
    NetBelowMinimum = 405,
    SharesAboveMaximum = 406,
    SharesBelowMinimum = 407,
    RebalanceDrift = 408,
    BalanceAboveDust = 409,
    RoundingMismatch = 410,
    PoolMismatch = 411,

    // Liquidity and token errors (5xx)
    LiquidityExhausted = 500,
    InsufficientLiquidity = 501,
    InsufficientBalance = 502,
    InsufficientAllowance = 503,

    // Probe errors (6xx)
    PoolUnhealthy = 600,
    ProbeFailed = 601,
}

impl AllocatorError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Input
            AllocatorError::ZeroAmount => "Amount must be nonzero",
            AllocatorError::EmptyLegs => "Solver call has no legs",
            AllocatorError::DuplicatePool => "Pool listed more than once",
            AllocatorError::LengthMismatch => "Input lengths do not match",
            AllocatorError::IndexOutOfRange => "Index out of range",

            // Authorization
            AllocatorError::Unauthorized => "Unauthorized: caller lacks the required role",
            AllocatorError::UnauthorizedRouter => "Unauthorized: caller is not the router",
            AllocatorError::UnauthorizedToken => "Unauthorized: caller is not the share token",
            AllocatorError::Paused => "Operation blocked: allocator paused",
            AllocatorError::NotPaused => "Allocator is not paused",

            // Configuration
            AllocatorError::PoolNotFound => "Pool not found",
            AllocatorError::PoolAlreadyExists => "Pool already exists",
            AllocatorError::InvalidTotalWeight => "Target weights must sum to 1_000_000",
            AllocatorError::MaxPoolCountExceeded => "Pool count exceeds maximum",
            AllocatorError::AdapterPoolMismatch => "Adapter reports a different pool",
            AllocatorError::AdapterNotRegistered => "No adapter registered for pool",
            AllocatorError::AdapterStillRegistered => "Adapter still registered for pool",
            AllocatorError::PoolNotSupported => "Pool not supported by collateral vault",
            AllocatorError::InvalidStatusTransition => "Invalid pool status transition",
            AllocatorError::PoolNotDepositEligible => "Pool not eligible for deposits",
            AllocatorError::PoolNotWithdrawalEligible => "Pool not eligible for withdrawals",
            AllocatorError::PoolNotWoundDown => "Pool must be suspended with zero target",
            AllocatorError::InvalidConfig => "Invalid configuration parameter",
            AllocatorError::ValueAboveMaximum => "Value above hard maximum",
            AllocatorError::DefaultPoolNotSet => "Default pool not set",
            AllocatorError::InvalidPool => "Pool id does not belong to this adapter",
            AllocatorError::NotInitialized => "Collaborator address not configured",

            // Economic
            AllocatorError::SlippageExceeded => "Result below preview",
            AllocatorError::SharesMismatch => "Reported shares differ from measured balance delta",
            AllocatorError::AmountMismatch => "Reported amount differs from measured balance delta",
            AllocatorError::DepositCapExceeded => "Deposit cap exceeded",
            AllocatorError::ShortfallExceedsAssets => "Shortfall would exceed managed assets",
            AllocatorError::NetBelowMinimum => "Net assets below expected minimum",
            AllocatorError::SharesAboveMaximum => "Shares burned above caller maximum",
            AllocatorError::SharesBelowMinimum => "Shares minted below caller minimum",
            AllocatorError::RebalanceDrift => "Rebalance value drift above dust tolerance",
            AllocatorError::BalanceAboveDust => "Pool balance above dust",
            AllocatorError::RoundingMismatch => "Per-leg previews do not reconcile with net amount",
            AllocatorError::PoolMismatch => "Adapter returned an unexpected pool",

            // Liquidity
            AllocatorError::LiquidityExhausted => "No eligible pool can satisfy the withdrawal",
            AllocatorError::InsufficientLiquidity => "Insufficient liquidity in strategy",
            AllocatorError::InsufficientBalance => "Insufficient token balance",
            AllocatorError::InsufficientAllowance => "Insufficient allowance",

            // Probe
            AllocatorError::PoolUnhealthy => "Pool failed health probe",
            AllocatorError::ProbeFailed => "Pool probe returned no usable value",
        }
    }
}

impl core::fmt::Display for AllocatorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<AllocatorError> for OdraError {
    fn from(error: AllocatorError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}
