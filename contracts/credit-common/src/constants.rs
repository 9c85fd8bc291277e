/// Basis points denominator: 10_000 = 100%.
pub const PERCENTAGE_FACTOR: u128 = 10_000u128;
pub const PERCENTAGE_FACTOR_U32: u32 = 10_000u32;

/// Ray precision for interest indexes (1e27).
pub const RAY: u128 = 1_000_000_000_000_000_000_000_000_000u128;
pub const RAY_DIVIDED_BY_PERCENTAGE: u128 = RAY / PERCENTAGE_FACTOR;

/// Extra precision used when folding accrued interest into a new index.
pub const INDEX_PRECISION: u128 = 1_000_000_000u128; // 1e9

pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// USD amounts carry 8 decimals.
pub const USD_DECIMALS: u32 = 8;

pub const UNDERLYING_TOKEN_MASK: u128 = 1;
pub const MAX_COLLATERAL_TOKENS: u32 = 128;
pub const DEFAULT_MAX_ENABLED_TOKENS: u32 = 12;

/// Quota of a single token may not exceed `max_debt * MAX_QUOTA_MULTIPLIER`.
pub const MAX_QUOTA_MULTIPLIER: u128 = 2;

// Multicall permission bits
pub const ADD_COLLATERAL_PERMISSION: u64 = 1;
pub const INCREASE_DEBT_PERMISSION: u64 = 1 << 1;
pub const DECREASE_DEBT_PERMISSION: u64 = 1 << 2;
pub const ENABLE_TOKEN_PERMISSION: u64 = 1 << 3;
pub const DISABLE_TOKEN_PERMISSION: u64 = 1 << 4;
pub const WITHDRAW_COLLATERAL_PERMISSION: u64 = 1 << 5;
pub const UPDATE_QUOTA_PERMISSION: u64 = 1 << 6;
/// Never grantable to bots.
pub const SET_BOT_PERMISSIONS_PERMISSION: u64 = 1 << 8;

pub const BOT_PERMISSIONS_MASK: u64 = ADD_COLLATERAL_PERMISSION
    | INCREASE_DEBT_PERMISSION
    | DECREASE_DEBT_PERMISSION
    | ENABLE_TOKEN_PERMISSION
    | DISABLE_TOKEN_PERMISSION
    | WITHDRAW_COLLATERAL_PERMISSION
    | UPDATE_QUOTA_PERMISSION;

pub const ALL_PERMISSIONS: u64 = BOT_PERMISSIONS_MASK | SET_BOT_PERMISSIONS_PERMISSION;
pub const OPEN_CREDIT_ACCOUNT_PERMISSIONS: u64 = ALL_PERMISSIONS & !DECREASE_DEBT_PERMISSION;
pub const CLOSE_CREDIT_ACCOUNT_PERMISSIONS: u64 = ALL_PERMISSIONS & !INCREASE_DEBT_PERMISSION;

pub const TTL_THRESHOLD: u32 = 100_000;
pub const TTL_EXTEND_TO: u32 = 200_000;
