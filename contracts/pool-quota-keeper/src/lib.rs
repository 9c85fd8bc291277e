#![no_std]
use credit_common::access::{bump_instance, require_configurator};
use credit_common::constants::{PERCENTAGE_FACTOR, RAY, TTL_EXTEND_TO, TTL_THRESHOLD};
use credit_common::credit_logic::{calc_accrued_quota_interest, quota_index_since};
use credit_common::interfaces::PoolClient;
use credit_common::math::{apply_delta, checked_add, mul_div, percent_mul_up, to_i128};
use credit_common::types::{AccountQuota, QuotaUpdate, TokenQuotaParams};
use credit_common::{CreditError, OrPanic};
use soroban_sdk::{contract, contractimpl, contracttype, panic_with_error, Address, Env, Vec};

mod events;
pub use events::*;

#[contracttype]
pub enum DataKey {
    Acl,
    Pool,
    QuotaTokens,
    CreditManagers,
    TokenParams(Address),
    Quota(Address, u32, Address),
}

/// Keeps quota limits, rates and interest indexes for the pool's quoted
/// collateral. Credit managers call in to move their accounts' quotas.
#[contract]
pub struct PoolQuotaKeeper;

#[contractimpl]
impl PoolQuotaKeeper {
    pub fn initialize(env: Env, caller: Address, acl: Address, pool: Address) {
        if env.storage().instance().has(&DataKey::Acl) {
            panic_with_error!(&env, CreditError::AlreadyInitialized);
        }
        require_configurator(&env, &acl, &caller);
        let storage = env.storage().instance();
        storage.set(&DataKey::Acl, &acl);
        storage.set(&DataKey::Pool, &pool);
        storage.set(&DataKey::QuotaTokens, &Vec::<Address>::new(&env));
        storage.set(&DataKey::CreditManagers, &Vec::<Address>::new(&env));
        bump_instance(&env);
    }

    /// Moves the quota of `token` by `quota_change` and realizes the interest
    /// accrued on the old quota. `i128::MIN` removes the whole quota.
    pub fn update_quota(
        env: Env,
        credit_manager: Address,
        credit_account: u32,
        token: Address,
        quota_change: i128,
        min_quota: u128,
        max_quota: u128,
    ) -> QuotaUpdate {
        require_credit_manager(&env, &credit_manager);
        let mut params = token_params(&env, &token);
        let mut quota = read_quota(&env, &credit_manager, credit_account, &token);
        let index_now = current_index(&env, &params);

        let interest_delta =
            calc_accrued_quota_interest(quota.quota, index_now, quota.cumulative_index_lu)
                .or_panic(&env);
        quota.cumulative_index_lu = index_now;

        let change = if quota_change == i128::MIN {
            -to_i128(quota.quota).or_panic(&env)
        } else {
            quota_change
        };

        let mut update = QuotaUpdate {
            interest_delta,
            fees: 0,
            enable: false,
            disable: false,
        };
        if change > 0 {
            let increase = change.unsigned_abs();
            let total = checked_add(params.total_quoted, increase).or_panic(&env);
            if total > params.limit {
                panic_with_error!(&env, CreditError::QuotaLimitExceeded);
            }
            params.total_quoted = total;
            update.fees = percent_mul_up(increase, params.quota_increase_fee).or_panic(&env);
            update.enable = quota.quota == 0;
        } else if change < 0 {
            let decrease = change.unsigned_abs();
            if decrease > quota.quota {
                panic_with_error!(&env, CreditError::QuotaIsOutOfBounds);
            }
            params.total_quoted = params.total_quoted.saturating_sub(decrease);
            update.disable = quota.quota == decrease;
        }

        quota.quota = apply_delta(quota.quota, change).or_panic(&env);
        if quota.quota < min_quota || quota.quota > max_quota {
            panic_with_error!(&env, CreditError::QuotaIsOutOfBounds);
        }

        write_token_params(&env, &token, &params);
        write_quota(&env, &credit_manager, credit_account, &token, &quota);
        if change != 0 {
            pool_client(&env).update_quota_revenue(
                &env.current_contract_address(),
                &revenue_change(&env, params.rate, change),
            );
            UpdateQuota {
                credit_manager,
                token,
                credit_account,
                quota_change: change,
            }
            .publish(&env);
        }
        update
    }

    /// Outstanding quota interest of the account over `tokens`. Read only.
    pub fn accrue_interest(
        env: Env,
        credit_manager: Address,
        credit_account: u32,
        tokens: Vec<Address>,
    ) -> u128 {
        let mut total = 0u128;
        for token in tokens.iter() {
            let params = token_params(&env, &token);
            let quota = read_quota(&env, &credit_manager, credit_account, &token);
            let interest = calc_accrued_quota_interest(
                quota.quota,
                current_index(&env, &params),
                quota.cumulative_index_lu,
            )
            .or_panic(&env);
            total = checked_add(total, interest).or_panic(&env);
        }
        total
    }

    /// Like [`Self::accrue_interest`] but moves the account's index
    /// snapshots forward, so the caller now owns the returned interest.
    pub fn checkpoint_interest(
        env: Env,
        credit_manager: Address,
        credit_account: u32,
        tokens: Vec<Address>,
    ) -> u128 {
        require_credit_manager(&env, &credit_manager);
        let mut total = 0u128;
        for token in tokens.iter() {
            let params = token_params(&env, &token);
            let mut quota = read_quota(&env, &credit_manager, credit_account, &token);
            let index_now = current_index(&env, &params);
            let interest =
                calc_accrued_quota_interest(quota.quota, index_now, quota.cumulative_index_lu)
                    .or_panic(&env);
            total = checked_add(total, interest).or_panic(&env);
            if quota.quota != 0 && quota.cumulative_index_lu != index_now {
                quota.cumulative_index_lu = index_now;
                write_quota(&env, &credit_manager, credit_account, &token, &quota);
            }
        }
        total
    }

    /// Zeroes the account's quotas. With `set_limits_to_zero` the tokens can
    /// take no new quota until the configurator raises their limits again.
    pub fn remove_quotas(
        env: Env,
        credit_manager: Address,
        credit_account: u32,
        tokens: Vec<Address>,
        set_limits_to_zero: bool,
    ) {
        require_credit_manager(&env, &credit_manager);
        let mut revenue_delta = 0i128;
        for token in tokens.iter() {
            let mut params = token_params(&env, &token);
            let key = DataKey::Quota(credit_manager.clone(), credit_account, token.clone());
            let quota: Option<AccountQuota> = env.storage().persistent().get(&key);
            if let Some(quota) = quota {
                if quota.quota != 0 {
                    params.total_quoted = params.total_quoted.saturating_sub(quota.quota);
                    let change = -to_i128(quota.quota).or_panic(&env);
                    revenue_delta += revenue_change(&env, params.rate, change);
                }
                env.storage().persistent().remove(&key);
            }
            if set_limits_to_zero && params.limit != 0 {
                params.limit = 0;
                SetTokenLimit {
                    token: token.clone(),
                    limit: 0,
                }
                .publish(&env);
            }
            write_token_params(&env, &token, &params);
        }
        if revenue_delta != 0 {
            pool_client(&env).update_quota_revenue(&env.current_contract_address(), &revenue_delta);
        }
    }

    pub fn add_quota_token(env: Env, caller: Address, token: Address) {
        require_configurator(&env, &acl(&env), &caller);
        let key = DataKey::TokenParams(token.clone());
        if env.storage().persistent().has(&key) {
            panic_with_error!(&env, CreditError::TokenAlreadyAdded);
        }
        let params = TokenQuotaParams {
            rate: 0,
            cumulative_index_lu: RAY,
            last_update: env.ledger().timestamp(),
            quota_increase_fee: 0,
            total_quoted: 0,
            limit: 0,
        };
        write_token_params(&env, &token, &params);
        let mut tokens = Self::quota_tokens(env.clone());
        tokens.push_back(token.clone());
        env.storage().instance().set(&DataKey::QuotaTokens, &tokens);
        AddQuotaToken { token }.publish(&env);
    }

    /// Re-prices `token` going forward. Interest accrued so far is locked in
    /// the token's index before the new rate applies.
    pub fn set_token_rate(env: Env, caller: Address, token: Address, rate: u32) {
        require_configurator(&env, &acl(&env), &caller);
        let mut params = token_params(&env, &token);
        params.cumulative_index_lu = current_index(&env, &params);
        params.last_update = env.ledger().timestamp();
        params.rate = rate;
        write_token_params(&env, &token, &params);

        pool_client(&env).set_quota_revenue(&env.current_contract_address(), &total_revenue(&env));
        SetTokenRate { token, rate }.publish(&env);
    }

    pub fn set_token_limit(env: Env, caller: Address, token: Address, limit: u128) {
        require_configurator(&env, &acl(&env), &caller);
        let mut params = token_params(&env, &token);
        params.limit = limit;
        write_token_params(&env, &token, &params);
        SetTokenLimit { token, limit }.publish(&env);
    }

    /// One-off fee in bps charged on every quota increase.
    pub fn set_token_quota_increase_fee(env: Env, caller: Address, token: Address, fee: u32) {
        require_configurator(&env, &acl(&env), &caller);
        if fee as u128 > PERCENTAGE_FACTOR {
            panic_with_error!(&env, CreditError::IncorrectParameter);
        }
        let mut params = token_params(&env, &token);
        params.quota_increase_fee = fee;
        write_token_params(&env, &token, &params);
        SetQuotaIncreaseFee { token, fee }.publish(&env);
    }

    pub fn add_credit_manager(env: Env, caller: Address, credit_manager: Address) {
        require_configurator(&env, &acl(&env), &caller);
        let mut managers = Self::credit_managers(env.clone());
        if !managers.contains(&credit_manager) {
            managers.push_back(credit_manager.clone());
            env.storage()
                .instance()
                .set(&DataKey::CreditManagers, &managers);
            AddCreditManager { credit_manager }.publish(&env);
        }
    }

    /// (quota, cumulative index at last update)
    pub fn get_quota(
        env: Env,
        credit_manager: Address,
        credit_account: u32,
        token: Address,
    ) -> (u128, u128) {
        let quota = read_quota(&env, &credit_manager, credit_account, &token);
        (quota.quota, quota.cumulative_index_lu)
    }

    pub fn cumulative_index(env: Env, token: Address) -> u128 {
        current_index(&env, &token_params(&env, &token))
    }

    pub fn get_token_quota_params(env: Env, token: Address) -> TokenQuotaParams {
        token_params(&env, &token)
    }

    pub fn is_quoted_token(env: Env, token: Address) -> bool {
        env.storage()
            .persistent()
            .has(&DataKey::TokenParams(token))
    }

    pub fn quota_tokens(env: Env) -> Vec<Address> {
        env.storage()
            .instance()
            .get(&DataKey::QuotaTokens)
            .unwrap_or_else(|| Vec::new(&env))
    }

    pub fn credit_managers(env: Env) -> Vec<Address> {
        env.storage()
            .instance()
            .get(&DataKey::CreditManagers)
            .unwrap_or_else(|| Vec::new(&env))
    }

    /// Yearly revenue of all quotas at current rates, in underlying.
    pub fn total_quota_revenue(env: Env) -> u128 {
        total_revenue(&env)
    }

    pub fn pool(env: Env) -> Address {
        pool_address(&env)
    }
}

fn acl(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::Acl)
        .unwrap_or_else(|| panic_with_error!(env, CreditError::NotInitialized))
}

fn pool_address(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::Pool)
        .unwrap_or_else(|| panic_with_error!(env, CreditError::NotInitialized))
}

fn pool_client(env: &Env) -> PoolClient<'_> {
    PoolClient::new(env, &pool_address(env))
}

fn require_credit_manager(env: &Env, credit_manager: &Address) {
    credit_manager.require_auth();
    let managers: Vec<Address> = env
        .storage()
        .instance()
        .get(&DataKey::CreditManagers)
        .unwrap_or_else(|| Vec::new(env));
    if !managers.contains(credit_manager) {
        panic_with_error!(env, CreditError::CallerNotCreditManager);
    }
    bump_instance(env);
}

fn token_params(env: &Env, token: &Address) -> TokenQuotaParams {
    env.storage()
        .persistent()
        .get(&DataKey::TokenParams(token.clone()))
        .unwrap_or_else(|| panic_with_error!(env, CreditError::TokenIsNotQuoted))
}

fn write_token_params(env: &Env, token: &Address, params: &TokenQuotaParams) {
    let key = DataKey::TokenParams(token.clone());
    env.storage().persistent().set(&key, params);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn read_quota(env: &Env, credit_manager: &Address, credit_account: u32, token: &Address) -> AccountQuota {
    env.storage()
        .persistent()
        .get(&DataKey::Quota(credit_manager.clone(), credit_account, token.clone()))
        .unwrap_or(AccountQuota {
            quota: 0,
            cumulative_index_lu: 0,
        })
}

fn write_quota(
    env: &Env,
    credit_manager: &Address,
    credit_account: u32,
    token: &Address,
    quota: &AccountQuota,
) {
    let key = DataKey::Quota(credit_manager.clone(), credit_account, token.clone());
    if quota.quota == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, quota);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

fn current_index(env: &Env, params: &TokenQuotaParams) -> u128 {
    let elapsed = env.ledger().timestamp().saturating_sub(params.last_update);
    quota_index_since(params.cumulative_index_lu, params.rate, elapsed).or_panic(env)
}

fn revenue_change(env: &Env, rate: u32, change: i128) -> i128 {
    let magnitude = mul_div(change.unsigned_abs(), rate as u128, PERCENTAGE_FACTOR)
        .and_then(to_i128)
        .or_panic(env);
    if change < 0 {
        -magnitude
    } else {
        magnitude
    }
}

fn total_revenue(env: &Env) -> u128 {
    let tokens: Vec<Address> = env
        .storage()
        .instance()
        .get(&DataKey::QuotaTokens)
        .unwrap_or_else(|| Vec::new(env));
    let mut revenue = 0u128;
    for token in tokens.iter() {
        let params = token_params(env, &token);
        let token_revenue =
            mul_div(params.total_quoted, params.rate as u128, PERCENTAGE_FACTOR).or_panic(env);
        revenue = checked_add(revenue, token_revenue).or_panic(env);
    }
    revenue
}
