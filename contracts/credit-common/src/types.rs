use soroban_sdk::{contracttype, Address, Vec};

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CollateralCalcTask {
    GenericParams,
    DebtOnly,
    FullCollateralCheckLazy,
    DebtCollateral,
    DebtCollateralSafePrices,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ManageDebtAction {
    Increase,
    Decrease,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClosureAction {
    CloseAccount,
    LiquidateAccount,
    LiquidateExpiredAccount,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccountStatus {
    Open,
    Closed,
    Liquidated,
}

/// Snapshot of an account's debt and collateral. Computed on demand, never stored.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CollateralDebtData {
    pub debt: u128,
    pub cumulative_index_now: u128,
    pub cumulative_index_last_update: u128,
    pub cumulative_quota_interest: u128,
    pub accrued_interest: u128,
    pub accrued_fees: u128,
    pub total_debt_usd: u128,
    /// Full collateral value in underlying units.
    pub total_value: u128,
    pub total_value_usd: u128,
    /// Threshold-weighted value.
    pub twv_usd: u128,
    pub enabled_tokens_mask: u128,
    pub quoted_tokens_mask: u128,
    pub quoted_tokens: Vec<Address>,
    pub quotas: Vec<u128>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreditAccountInfo {
    pub borrower: Address,
    pub debt: u128,
    pub cumulative_index_last_update: u128,
    pub cumulative_quota_interest: u128,
    pub quota_fees: u128,
    pub enabled_tokens_mask: u128,
    pub since: u64,
    pub status: AccountStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CollateralTokenData {
    pub token: Address,
    pub lt_initial: u32,
    pub lt_final: u32,
    pub timestamp_ramp_start: u64,
    pub ramp_duration: u64,
}

/// Fee schedule of a credit manager, all in basis points.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FeeParams {
    pub fee_interest: u32,
    pub fee_liquidation: u32,
    pub liquidation_discount: u32,
    pub fee_liquidation_expired: u32,
    pub liquidation_discount_expired: u32,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DebtLimits {
    pub min_debt: u128,
    pub max_debt: u128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenQuotaParams {
    pub rate: u32,
    pub cumulative_index_lu: u128,
    pub last_update: u64,
    pub quota_increase_fee: u32,
    pub total_quoted: u128,
    pub limit: u128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountQuota {
    pub quota: u128,
    pub cumulative_index_lu: u128,
}

/// Result of a quota change as seen by the credit manager.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QuotaUpdate {
    pub interest_delta: u128,
    pub fees: u128,
    pub enable: bool,
    pub disable: bool,
}

/// One step of a credit facade batch.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MultiCall {
    /// (token, amount)
    AddCollateral(Address, u128),
    IncreaseDebt(u128),
    /// `u128::MAX` repays everything.
    DecreaseDebt(u128),
    /// (token, quota change, min resulting quota)
    UpdateQuota(Address, i128, u128),
    /// (token, amount, recipient); `u128::MAX` withdraws the full balance.
    WithdrawCollateral(Address, u128, Address),
    EnableToken(Address),
    DisableToken(Address),
    /// (collateral hint masks, min health factor in bps)
    SetFullCheckParams(Vec<u128>, u32),
    /// (bot, permissions)
    SetBotPermissions(Address, u64),
}
