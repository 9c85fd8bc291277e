use credit_common::constants::{TTL_EXTEND_TO, TTL_THRESHOLD};
use credit_common::math::to_i128;
use credit_common::{CreditError, OrPanic};
use soroban_sdk::{contracttype, panic_with_error, Address, Env, Vec};
use stellar_tokens::fungible::Base as TokenBase;

// Scalars live in instance storage, per credit manager entries in persistent.
#[contracttype]
pub enum DataKey {
    Initialized,
    Acl,
    Underlying,
    InterestRateModel,
    QuotaKeeper,
    Treasury,
    WithdrawFee,          // u32 bps
    ExpectedLiquidityLu,  // u128
    BaseInterestIndexLu,  // u128 ray
    BaseInterestRate,     // u128 ray per year
    LastBaseInterestUpdate,
    QuotaRevenue,         // u128 underlying per year
    LastQuotaRevenueUpdate,
    TotalBorrowed,
    TotalDebtLimit,
    CreditManagers,       // Vec<Address>
    CreditManagerDebt(Address),
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CreditManagerDebt {
    pub borrowed: u128,
    pub limit: u128,
}

pub fn ensure_initialized(env: &Env) {
    if !env.storage().instance().has(&DataKey::Initialized) {
        panic_with_error!(env, CreditError::NotInitialized);
    }
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn read_address(env: &Env, key: &DataKey) -> Address {
    env.storage()
        .instance()
        .get(key)
        .unwrap_or_else(|| panic_with_error!(env, CreditError::NotInitialized))
}

pub fn read_u128(env: &Env, key: &DataKey) -> u128 {
    env.storage().instance().get(key).unwrap_or(0)
}

pub fn write_u128(env: &Env, key: &DataKey, value: u128) {
    env.storage().instance().set(key, &value);
}

pub fn read_u64(env: &Env, key: &DataKey) -> u64 {
    env.storage().instance().get(key).unwrap_or(0)
}

pub fn write_u64(env: &Env, key: &DataKey, value: u64) {
    env.storage().instance().set(key, &value);
}

pub fn read_cm_debt(env: &Env, credit_manager: &Address) -> Option<CreditManagerDebt> {
    let key = DataKey::CreditManagerDebt(credit_manager.clone());
    let persistent = env.storage().persistent();
    let debt = persistent.get(&key);
    if debt.is_some() {
        persistent.extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    debt
}

/// Debt record of a registered credit manager; anything else is rejected.
pub fn registered_cm_debt(env: &Env, credit_manager: &Address) -> CreditManagerDebt {
    read_cm_debt(env, credit_manager)
        .unwrap_or_else(|| panic_with_error!(env, CreditError::CallerNotCreditManager))
}

pub fn write_cm_debt(env: &Env, credit_manager: &Address, debt: &CreditManagerDebt) {
    let key = DataKey::CreditManagerDebt(credit_manager.clone());
    env.storage().persistent().set(&key, debt);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn credit_managers(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&DataKey::CreditManagers)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn share_balance(env: &Env, account: &Address) -> u128 {
    let balance = TokenBase::balance(env, account);
    u128::try_from(balance).unwrap_or(0)
}

pub fn share_supply(env: &Env) -> u128 {
    let supply = TokenBase::total_supply(env);
    u128::try_from(supply).unwrap_or(0)
}

pub fn i128_amount(env: &Env, amount: u128) -> i128 {
    to_i128(amount).or_panic(env)
}
