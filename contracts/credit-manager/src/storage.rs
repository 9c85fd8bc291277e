use credit_common::constants::{TTL_EXTEND_TO, TTL_THRESHOLD};
use credit_common::types::{AccountStatus, CollateralTokenData, CreditAccountInfo, FeeParams};
use credit_common::CreditError;
use soroban_sdk::{contracttype, panic_with_error, Address, Env, Vec};

// Configuration lives in instance storage, account ledgers in persistent.
#[contracttype]
pub enum DataKey {
    Initialized,
    Acl,
    Pool,
    Underlying,
    QuotaKeeper,
    PriceOracle,
    CreditFacade,
    Fees,
    MaxEnabledTokens,
    CollateralTokensCount,
    QuotedTokensMask,
    CollateralToken(u128),  // mask -> CollateralTokenData
    TokenMask(Address),
    NextAccount,            // u32, next never used handle
    FreeAccounts,           // Vec<u32>
    ActiveAccounts,         // Vec<u32>
    Account(u32),           // CreditAccountInfo
    Balance(u32, Address),  // u128 held in custody for the account
    HeldTokens(u32),        // u128 mask of tokens with a ledger entry
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

pub fn read_fees(env: &Env) -> FeeParams {
    env.storage()
        .instance()
        .get(&DataKey::Fees)
        .unwrap_or(FeeParams {
            fee_interest: 0,
            fee_liquidation: 0,
            liquidation_discount: 0,
            fee_liquidation_expired: 0,
            liquidation_discount_expired: 0,
        })
}

pub fn quoted_tokens_mask(env: &Env) -> u128 {
    env.storage()
        .instance()
        .get(&DataKey::QuotedTokensMask)
        .unwrap_or(0)
}

pub fn collateral_tokens_count(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::CollateralTokensCount)
        .unwrap_or(0)
}

pub fn max_enabled_tokens(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::MaxEnabledTokens)
        .unwrap_or(credit_common::constants::DEFAULT_MAX_ENABLED_TOKENS)
}

pub fn read_token_mask(env: &Env, token: &Address) -> Option<u128> {
    env.storage()
        .persistent()
        .get(&DataKey::TokenMask(token.clone()))
}

/// Mask of a registered collateral token; unknown tokens are rejected.
pub fn token_mask(env: &Env, token: &Address) -> u128 {
    read_token_mask(env, token).unwrap_or_else(|| panic_with_error!(env, CreditError::TokenNotAllowed))
}

pub fn collateral_token(env: &Env, mask: u128) -> CollateralTokenData {
    let key = DataKey::CollateralToken(mask);
    let data = env
        .storage()
        .persistent()
        .get(&key)
        .unwrap_or_else(|| panic_with_error!(env, CreditError::TokenNotAllowed));
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    data
}

pub fn write_collateral_token(env: &Env, mask: u128, data: &CollateralTokenData) {
    env.storage()
        .persistent()
        .set(&DataKey::CollateralToken(mask), data);
}

pub fn read_account(env: &Env, credit_account: u32) -> Option<CreditAccountInfo> {
    let key = DataKey::Account(credit_account);
    let info: Option<CreditAccountInfo> = env.storage().persistent().get(&key);
    if info.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    info
}

/// Ledger entry of an open account.
pub fn open_account(env: &Env, credit_account: u32) -> CreditAccountInfo {
    match read_account(env, credit_account) {
        Some(info) if info.status == AccountStatus::Open => info,
        _ => panic_with_error!(env, CreditError::CreditAccountNotOpen),
    }
}

pub fn write_account(env: &Env, credit_account: u32, info: &CreditAccountInfo) {
    env.storage()
        .persistent()
        .set(&DataKey::Account(credit_account), info);
}

pub fn balance(env: &Env, credit_account: u32, token: &Address) -> u128 {
    env.storage()
        .persistent()
        .get(&DataKey::Balance(credit_account, token.clone()))
        .unwrap_or(0)
}

pub fn write_balance(env: &Env, credit_account: u32, token: &Address, mask: u128, amount: u128) {
    let key = DataKey::Balance(credit_account, token.clone());
    let mut held = held_tokens(env, credit_account);
    if amount == 0 {
        env.storage().persistent().remove(&key);
        held &= !mask;
    } else {
        env.storage().persistent().set(&key, &amount);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        held |= mask;
    }
    env.storage()
        .persistent()
        .set(&DataKey::HeldTokens(credit_account), &held);
}

pub fn held_tokens(env: &Env, credit_account: u32) -> u128 {
    env.storage()
        .persistent()
        .get(&DataKey::HeldTokens(credit_account))
        .unwrap_or(0)
}

pub fn u32_list(env: &Env, key: &DataKey) -> Vec<u32> {
    env.storage()
        .instance()
        .get(key)
        .unwrap_or_else(|| Vec::new(env))
}

/// Pops a handle from the free list or mints a new one.
pub fn take_account_handle(env: &Env) -> u32 {
    let mut free = u32_list(env, &DataKey::FreeAccounts);
    if let Some(handle) = free.pop_back() {
        env.storage().instance().set(&DataKey::FreeAccounts, &free);
        return handle;
    }
    let next: u32 = env
        .storage()
        .instance()
        .get(&DataKey::NextAccount)
        .unwrap_or(0);
    env.storage()
        .instance()
        .set(&DataKey::NextAccount, &(next + 1));
    next
}

pub fn activate_account(env: &Env, credit_account: u32) {
    let mut active = u32_list(env, &DataKey::ActiveAccounts);
    active.push_back(credit_account);
    env.storage()
        .instance()
        .set(&DataKey::ActiveAccounts, &active);
}

/// Moves the handle from the active set back to the free list.
pub fn release_account(env: &Env, credit_account: u32) {
    let mut active = u32_list(env, &DataKey::ActiveAccounts);
    if let Some(i) = active.first_index_of(credit_account) {
        active.remove(i);
    }
    env.storage()
        .instance()
        .set(&DataKey::ActiveAccounts, &active);

    let mut free = u32_list(env, &DataKey::FreeAccounts);
    free.push_back(credit_account);
    env.storage().instance().set(&DataKey::FreeAccounts, &free);
}
