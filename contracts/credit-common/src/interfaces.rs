//! Client interfaces for cross-contract calls between protocol contracts.
//! Kept here so contracts do not have to link each other's exported symbols.

use soroban_sdk::{Address, Env, Vec};

use crate::types::{
    ClosureAction, CollateralCalcTask, CollateralDebtData, FeeParams, ManageDebtAction,
    QuotaUpdate,
};

#[soroban_sdk::contractclient(name = "AclClient")]
pub trait AclInterface {
    fn is_configurator(env: Env, account: Address) -> bool;
    fn is_pausable_admin(env: Env, account: Address) -> bool;
    fn is_unpausable_admin(env: Env, account: Address) -> bool;
}

#[soroban_sdk::contractclient(name = "InterestRateModelClient")]
pub trait InterestRateModelInterface {
    fn calc_borrow_rate(
        env: Env,
        expected_liquidity: u128,
        available_liquidity: u128,
        check_optimal_borrowing: bool,
    ) -> u128;
    fn available_to_borrow(env: Env, expected_liquidity: u128, available_liquidity: u128) -> u128;
}

#[soroban_sdk::contractclient(name = "PoolClient")]
pub trait PoolInterface {
    fn underlying_token(env: Env) -> Address;
    fn treasury(env: Env) -> Address;
    fn base_interest_index(env: Env) -> u128;
    fn credit_manager_borrowed(env: Env, credit_manager: Address) -> u128;
    fn credit_manager_debt_limit(env: Env, credit_manager: Address) -> u128;
    fn lend_credit_account(env: Env, credit_manager: Address, credit_account: u32, amount: u128);
    fn repay_credit_account(
        env: Env,
        credit_manager: Address,
        repaid_amount: u128,
        profit: u128,
        loss: u128,
    );
    fn update_quota_revenue(env: Env, quota_keeper: Address, delta: i128);
    fn set_quota_revenue(env: Env, quota_keeper: Address, new_revenue: u128);
}

#[soroban_sdk::contractclient(name = "QuotaKeeperClient")]
pub trait QuotaKeeperInterface {
    fn update_quota(
        env: Env,
        credit_manager: Address,
        credit_account: u32,
        token: Address,
        quota_change: i128,
        min_quota: u128,
        max_quota: u128,
    ) -> QuotaUpdate;
    fn accrue_interest(
        env: Env,
        credit_manager: Address,
        credit_account: u32,
        tokens: Vec<Address>,
    ) -> u128;
    fn checkpoint_interest(
        env: Env,
        credit_manager: Address,
        credit_account: u32,
        tokens: Vec<Address>,
    ) -> u128;
    fn remove_quotas(
        env: Env,
        credit_manager: Address,
        credit_account: u32,
        tokens: Vec<Address>,
        set_limits_to_zero: bool,
    );
    fn get_quota(
        env: Env,
        credit_manager: Address,
        credit_account: u32,
        token: Address,
    ) -> (u128, u128);
    fn is_quoted_token(env: Env, token: Address) -> bool;
}

#[soroban_sdk::contractclient(name = "PriceOracleClient")]
pub trait PriceOracleInterface {
    fn get_price(env: Env, token: Address) -> u128;
    fn convert_to_usd(env: Env, amount: u128, token: Address) -> u128;
    fn convert_from_usd(env: Env, amount: u128, token: Address) -> u128;
    fn convert(env: Env, amount: u128, token_from: Address, token_to: Address) -> u128;
    fn safe_convert_to_usd(env: Env, amount: u128, token: Address) -> u128;
}

#[soroban_sdk::contractclient(name = "BotListClient")]
pub trait BotListInterface {
    fn get_bot_status(
        env: Env,
        credit_manager: Address,
        credit_account: u32,
        bot: Address,
    ) -> (u64, bool);
    fn set_bot_permissions(
        env: Env,
        credit_facade: Address,
        credit_account: u32,
        bot: Address,
        permissions: u64,
    ) -> u32;
    fn erase_all_bot_permissions(env: Env, credit_facade: Address, credit_account: u32);
}

#[soroban_sdk::contractclient(name = "CreditManagerClient")]
pub trait CreditManagerInterface {
    fn underlying(env: Env) -> Address;
    fn pool(env: Env) -> Address;
    fn price_oracle(env: Env) -> Address;
    fn token_mask_of(env: Env, token: Address) -> u128;
    fn quoted_tokens_mask(env: Env) -> u128;
    fn borrower_of(env: Env, credit_account: u32) -> Address;
    fn enabled_tokens_mask_of(env: Env, credit_account: u32) -> u128;
    fn fees(env: Env) -> FeeParams;
    fn open_credit_account(env: Env, debt: u128, on_behalf_of: Address) -> u32;
    fn manage_debt(
        env: Env,
        credit_account: u32,
        amount: u128,
        enabled_tokens_mask: u128,
        action: ManageDebtAction,
    ) -> (u128, u128, u128);
    fn add_collateral(
        env: Env,
        payer: Address,
        credit_account: u32,
        token: Address,
        amount: u128,
    ) -> u128;
    fn withdraw_collateral(
        env: Env,
        credit_account: u32,
        token: Address,
        amount: u128,
        to: Address,
    ) -> u128;
    fn update_quota(
        env: Env,
        credit_account: u32,
        token: Address,
        quota_change: i128,
        min_quota: u128,
        max_quota: u128,
    ) -> (u128, u128);
    fn full_collateral_check(
        env: Env,
        credit_account: u32,
        enabled_tokens_mask: u128,
        collateral_hints: Vec<u128>,
        min_health_factor: u32,
        use_safe_prices: bool,
    ) -> u128;
    fn save_enabled_tokens_mask(env: Env, credit_account: u32, enabled_tokens_mask: u128);
    fn calc_debt_and_collateral(
        env: Env,
        credit_account: u32,
        task: CollateralCalcTask,
    ) -> CollateralDebtData;
    fn is_liquidatable(env: Env, credit_account: u32, min_health_factor: u32) -> bool;
    fn close_credit_account(
        env: Env,
        credit_account: u32,
        closure_action: ClosureAction,
        collateral_debt_data: CollateralDebtData,
        payer: Address,
        to: Address,
        skip_tokens_mask: u128,
    ) -> (u128, u128);
}
