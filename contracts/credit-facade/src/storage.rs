use credit_common::constants::{TTL_EXTEND_TO, TTL_THRESHOLD};
use credit_common::types::DebtLimits;
use credit_common::CreditError;
use soroban_sdk::{contracttype, panic_with_error, Address, Env};

use crate::constants::DEFAULT_LIMIT_PER_BLOCK_MULTIPLIER;

#[contracttype]
pub enum DataKey {
    Initialized,
    Acl,
    CreditManager,
    Underlying,
    BotList,
    DebtLimits,
    MaxDebtPerBlockMultiplier,
    Expirable,
    ExpirationDate,
    ForbiddenTokenMask,
    LossParams,
    BlockBorrowed, // (ledger sequence, borrowed in it)
    EmergencyLiquidator(Address),
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LossParams {
    pub current_cumulative_loss: u128,
    pub max_cumulative_loss: u128,
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

pub fn read_bot_list(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::BotList)
}

pub fn debt_limits(env: &Env) -> DebtLimits {
    env.storage()
        .instance()
        .get(&DataKey::DebtLimits)
        .unwrap_or(DebtLimits {
            min_debt: 0,
            max_debt: 0,
        })
}

pub fn max_debt_per_block_multiplier(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::MaxDebtPerBlockMultiplier)
        .unwrap_or(DEFAULT_LIMIT_PER_BLOCK_MULTIPLIER)
}

pub fn write_max_debt_per_block_multiplier(env: &Env, multiplier: u32) {
    env.storage()
        .instance()
        .set(&DataKey::MaxDebtPerBlockMultiplier, &multiplier);
}

pub fn is_expirable(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Expirable)
        .unwrap_or(false)
}

pub fn expiration_date(env: &Env) -> Option<u64> {
    env.storage().instance().get(&DataKey::ExpirationDate)
}

/// An expirable facade is expired once its expiration date has been reached.
pub fn is_expired(env: &Env) -> bool {
    is_expirable(env)
        && matches!(expiration_date(env), Some(date) if env.ledger().timestamp() >= date)
}

pub fn forbidden_token_mask(env: &Env) -> u128 {
    env.storage()
        .instance()
        .get(&DataKey::ForbiddenTokenMask)
        .unwrap_or(0)
}

pub fn loss_params(env: &Env) -> LossParams {
    env.storage()
        .instance()
        .get(&DataKey::LossParams)
        .unwrap_or_default()
}

pub fn write_loss_params(env: &Env, params: &LossParams) {
    env.storage().instance().set(&DataKey::LossParams, params);
}

/// Debt already taken in the current ledger.
pub fn borrowed_in_block(env: &Env) -> u128 {
    let (sequence, borrowed): (u32, u128) = env
        .storage()
        .instance()
        .get(&DataKey::BlockBorrowed)
        .unwrap_or((0, 0));
    if sequence == env.ledger().sequence() {
        borrowed
    } else {
        0
    }
}

pub fn write_borrowed_in_block(env: &Env, borrowed: u128) {
    env.storage()
        .instance()
        .set(&DataKey::BlockBorrowed, &(env.ledger().sequence(), borrowed));
}

pub fn is_emergency_liquidator(env: &Env, account: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::EmergencyLiquidator(account.clone()))
        .unwrap_or(false)
}
