use credit_common::access::{
    enter, exit, is_paused, require_configurator, require_pausable_admin,
    require_unpausable_admin, set_paused, when_not_paused,
};
use credit_common::constants::{
    ALL_PERMISSIONS, CLOSE_CREDIT_ACCOUNT_PERMISSIONS, OPEN_CREDIT_ACCOUNT_PERMISSIONS,
    PERCENTAGE_FACTOR, UNDERLYING_TOKEN_MASK,
};
use credit_common::interfaces::{
    BotListClient, CreditManagerClient, PoolClient, PriceOracleClient,
};
use credit_common::math::{checked_add, checked_sub, mul_div, percent_mul, to_i128};
use credit_common::types::{
    ClosureAction, CollateralCalcTask, CollateralDebtData, DebtLimits, ManageDebtAction, MultiCall,
};
use credit_common::{CreditError, OrPanic};
use soroban_sdk::{contract, contractimpl, panic_with_error, token, Address, Env, Vec};

use crate::events::*;
use crate::multicall::{check_debt_limits, execute, finish, record_borrowing, Session};
use crate::storage::*;

/// User entry point of a credit manager. Batches operations on one account,
/// applies borrowing policy around them and runs a single collateral check
/// per batch. Liquidations also go through here.
#[contract]
pub struct CreditFacade;

#[contractimpl]
impl CreditFacade {
    pub fn initialize(
        env: Env,
        caller: Address,
        acl: Address,
        credit_manager: Address,
        bot_list: Option<Address>,
        expirable: bool,
    ) {
        if env.storage().instance().has(&DataKey::Initialized) {
            panic_with_error!(&env, CreditError::AlreadyInitialized);
        }
        require_configurator(&env, &acl, &caller);
        let underlying = CreditManagerClient::new(&env, &credit_manager).underlying();

        let instance = env.storage().instance();
        instance.set(&DataKey::Acl, &acl);
        instance.set(&DataKey::CreditManager, &credit_manager);
        instance.set(&DataKey::Underlying, &underlying);
        instance.set(&DataKey::Expirable, &expirable);
        if let Some(bot_list) = bot_list {
            instance.set(&DataKey::BotList, &bot_list);
        }
        instance.set(&DataKey::Initialized, &true);
        ensure_initialized(&env);
    }

    /// Opens an account owned by `on_behalf_of`, borrowing `debt` into it,
    /// then runs `calls` on it. `caller` pays for added collateral.
    pub fn open_credit_account(
        env: Env,
        caller: Address,
        on_behalf_of: Address,
        debt: u128,
        calls: Vec<MultiCall>,
    ) -> u32 {
        ensure_initialized(&env);
        caller.require_auth();
        enter(&env);
        when_not_paused(&env);
        if is_expired(&env) {
            panic_with_error!(&env, CreditError::CreditFacadeExpired);
        }

        let cm = credit_manager(&env);
        if debt > 0 {
            record_borrowing(&env, debt);
        }
        let credit_account = cm.open_credit_account(&debt, &on_behalf_of);
        OpenCreditAccount {
            on_behalf_of,
            caller: caller.clone(),
            credit_account,
        }
        .publish(&env);

        let mut session = Session::new(&env, &cm, credit_account, caller.clone(), UNDERLYING_TOKEN_MASK);
        if debt > 0 {
            session.record_increase(debt);
        }
        StartMultiCall {
            caller,
            credit_account,
        }
        .publish(&env);
        execute(&env, &cm, &mut session, &calls, OPEN_CREDIT_ACCOUNT_PERMISSIONS);
        let enabled_tokens_mask = finish(&env, &cm, session);
        FinishMultiCall {
            credit_account,
            enabled_tokens_mask,
        }
        .publish(&env);

        exit(&env);
        credit_account
    }

    /// Runs `calls`, then repays everything and hands the account's assets
    /// out. `caller` must own the account and covers any shortfall.
    pub fn close_credit_account(
        env: Env,
        caller: Address,
        credit_account: u32,
        to: Address,
        skip_tokens_mask: u128,
        calls: Vec<MultiCall>,
    ) {
        ensure_initialized(&env);
        caller.require_auth();
        enter(&env);
        when_not_paused(&env);
        let cm = credit_manager(&env);
        require_owner(&env, &cm, credit_account, &caller);

        if !calls.is_empty() {
            let mut session = Session::new(
                &env,
                &cm,
                credit_account,
                caller.clone(),
                cm.enabled_tokens_mask_of(&credit_account),
            );
            execute(&env, &cm, &mut session, &calls, CLOSE_CREDIT_ACCOUNT_PERMISSIONS);
            cm.save_enabled_tokens_mask(&credit_account, &session.enabled_tokens_mask.bits());
        }

        let data = cm.calc_debt_and_collateral(&credit_account, &CollateralCalcTask::DebtOnly);
        cm.close_credit_account(
            &credit_account,
            &ClosureAction::CloseAccount,
            &data,
            &caller,
            &to,
            &skip_tokens_mask,
        );
        erase_bots(&env, credit_account);

        CloseCreditAccount {
            borrower: caller,
            credit_account,
            to,
        }
        .publish(&env);
        exit(&env);
    }

    pub fn multicall(env: Env, caller: Address, credit_account: u32, calls: Vec<MultiCall>) {
        ensure_initialized(&env);
        caller.require_auth();
        enter(&env);
        when_not_paused(&env);
        let cm = credit_manager(&env);
        require_owner(&env, &cm, credit_account, &caller);

        run_batch(&env, &cm, credit_account, caller, &calls, ALL_PERMISSIONS);
        exit(&env);
    }

    /// Multicall by a bot, limited to the permissions the owner granted it.
    pub fn bot_multicall(env: Env, bot: Address, credit_account: u32, calls: Vec<MultiCall>) {
        ensure_initialized(&env);
        bot.require_auth();
        enter(&env);
        when_not_paused(&env);
        let cm = credit_manager(&env);
        let bot_list = read_bot_list(&env)
            .unwrap_or_else(|| panic_with_error!(&env, CreditError::NotApprovedBot));
        let (permissions, forbidden) =
            BotListClient::new(&env, &bot_list).get_bot_status(&cm.address, &credit_account, &bot);
        if forbidden || permissions == 0 {
            panic_with_error!(&env, CreditError::NotApprovedBot);
        }
        // the account must still be open
        cm.borrower_of(&credit_account);

        run_batch(&env, &cm, credit_account, bot, &calls, permissions);
        exit(&env);
    }

    /// Liquidates an unhealthy account, or any account once the facade has
    /// expired. The liquidator pays what the pool is owed and receives the
    /// collateral. Returns `(remaining_funds, loss)`.
    pub fn liquidate_credit_account(
        env: Env,
        liquidator: Address,
        credit_account: u32,
        to: Address,
        skip_tokens_mask: u128,
    ) -> (u128, u128) {
        ensure_initialized(&env);
        liquidator.require_auth();
        enter(&env);
        require_liquidation_allowed(&env, &liquidator);
        let cm = credit_manager(&env);

        let data = liquidation_data(&env, &cm, credit_account);
        let action = if data.twv_usd < data.total_debt_usd {
            ClosureAction::LiquidateAccount
        } else if is_expired(&env) {
            ClosureAction::LiquidateExpiredAccount
        } else {
            panic_with_error!(&env, CreditError::CreditAccountNotLiquidatable);
        };

        let (remaining_funds, loss) = cm.close_credit_account(
            &credit_account,
            &action,
            &data,
            &liquidator,
            &to,
            &skip_tokens_mask,
        );
        if loss > 0 {
            record_loss(&env, loss);
        }
        erase_bots(&env, credit_account);

        LiquidateCreditAccount {
            liquidator,
            credit_account,
            to,
            remaining_funds,
            loss,
        }
        .publish(&env);
        exit(&env);
        (remaining_funds, loss)
    }

    /// Repays `repaid` underlying of an unhealthy account's debt in exchange
    /// for `token` at the liquidation discount. The liquidation fee part of
    /// `repaid` goes to the pool treasury. The account must be healthy
    /// afterwards. Returns the amount of `token` seized.
    pub fn partially_liquidate(
        env: Env,
        liquidator: Address,
        credit_account: u32,
        token: Address,
        repaid: u128,
        min_seized: u128,
        to: Address,
    ) -> u128 {
        ensure_initialized(&env);
        liquidator.require_auth();
        enter(&env);
        require_liquidation_allowed(&env, &liquidator);
        let cm = credit_manager(&env);
        let underlying = underlying_address(&env);
        if token == underlying || repaid == 0 {
            panic_with_error!(&env, CreditError::IncorrectParameter);
        }
        let before = liquidation_data(&env, &cm, credit_account);
        if before.twv_usd >= before.total_debt_usd {
            panic_with_error!(&env, CreditError::CreditAccountNotLiquidatable);
        }

        let fees = cm.fees();
        let fee = percent_mul(repaid, fees.fee_liquidation).or_panic(&env);
        if fee > 0 {
            let treasury = PoolClient::new(&env, &cm.pool()).treasury();
            token::Client::new(&env, &underlying).transfer(
                &liquidator,
                &treasury,
                &to_i128(fee).or_panic(&env),
            );
        }

        let to_repay = checked_sub(repaid, fee).or_panic(&env);
        let mut mask = cm.enabled_tokens_mask_of(&credit_account);
        mask |= cm.add_collateral(&liquidator, &credit_account, &underlying, &to_repay);
        let (new_debt, _, _) =
            cm.manage_debt(&credit_account, &to_repay, &mask, &ManageDebtAction::Decrease);
        check_debt_limits(&env, new_debt);

        let oracle = PriceOracleClient::new(&env, &cm.price_oracle());
        let seized = mul_div(
            oracle.convert(&repaid, &underlying, &token),
            PERCENTAGE_FACTOR,
            fees.liquidation_discount as u128,
        )
        .or_panic(&env);
        if seized < min_seized {
            panic_with_error!(&env, CreditError::SeizedLessThanRequired);
        }
        mask &= !cm.withdraw_collateral(&credit_account, &token, &seized, &to);
        cm.save_enabled_tokens_mask(&credit_account, &mask);

        let after = liquidation_data(&env, &cm, credit_account);
        if after.twv_usd < after.total_debt_usd {
            panic_with_error!(&env, CreditError::HealthFactorTooLowAfterLiquidation);
        }

        PartiallyLiquidate {
            liquidator,
            token,
            credit_account,
            repaid,
            seized,
            fee,
        }
        .publish(&env);
        exit(&env);
        seized
    }

    pub fn set_debt_limits(env: Env, caller: Address, min_debt: u128, max_debt: u128) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        if min_debt > max_debt {
            panic_with_error!(&env, CreditError::IncorrectParameter);
        }
        env.storage()
            .instance()
            .set(&DataKey::DebtLimits, &DebtLimits { min_debt, max_debt });
        SetDebtLimits { min_debt, max_debt }.publish(&env);
    }

    /// `0` forbids borrowing, `u32::MAX` removes the per-ledger cap.
    pub fn set_block_debt_multiplier(env: Env, caller: Address, multiplier: u32) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        write_max_debt_per_block_multiplier(&env, multiplier);
        SetBlockDebtMultiplier { multiplier }.publish(&env);
    }

    pub fn set_bot_list(env: Env, caller: Address, bot_list: Address) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        env.storage().instance().set(&DataKey::BotList, &bot_list);
        SetBotList { bot_list }.publish(&env);
    }

    pub fn set_expiration_date(env: Env, caller: Address, expiration_date: u64) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        if !is_expirable(&env) {
            panic_with_error!(&env, CreditError::NotAllowedWhenNotExpirable);
        }
        if expiration_date <= env.ledger().timestamp() {
            panic_with_error!(&env, CreditError::IncorrectParameter);
        }
        env.storage()
            .instance()
            .set(&DataKey::ExpirationDate, &expiration_date);
        SetExpirationDate { expiration_date }.publish(&env);
    }

    /// Forbidden tokens cannot be enabled or get more quota, and an account
    /// holding one cannot take more debt.
    pub fn set_token_forbidden(env: Env, caller: Address, token: Address, forbidden: bool) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        let mask = credit_manager(&env).token_mask_of(&token);
        if mask == UNDERLYING_TOKEN_MASK {
            panic_with_error!(&env, CreditError::IncorrectParameter);
        }
        let current = forbidden_token_mask(&env);
        let updated = if forbidden {
            current | mask
        } else {
            current & !mask
        };
        env.storage()
            .instance()
            .set(&DataKey::ForbiddenTokenMask, &updated);
        SetTokenForbidden { token, forbidden }.publish(&env);
    }

    /// Emergency liquidators may liquidate while the facade is paused.
    pub fn set_emergency_liquidator(env: Env, caller: Address, liquidator: Address, allowed: bool) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        let key = DataKey::EmergencyLiquidator(liquidator.clone());
        if allowed {
            env.storage().persistent().set(&key, &true);
        } else {
            env.storage().persistent().remove(&key);
        }
        SetEmergencyLiquidator { liquidator, allowed }.publish(&env);
    }

    pub fn set_cumulative_loss_params(
        env: Env,
        caller: Address,
        max_cumulative_loss: u128,
        reset: bool,
    ) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        let mut params = loss_params(&env);
        params.max_cumulative_loss = max_cumulative_loss;
        if reset {
            params.current_cumulative_loss = 0;
        }
        write_loss_params(&env, &params);
        SetCumulativeLossParams {
            max_cumulative_loss,
            reset,
        }
        .publish(&env);
    }

    pub fn pause(env: Env, caller: Address) {
        ensure_initialized(&env);
        require_pausable_admin(&env, &acl(&env), &caller);
        set_paused(&env, true);
        FacadePaused { admin: caller }.publish(&env);
    }

    pub fn unpause(env: Env, caller: Address) {
        ensure_initialized(&env);
        require_unpausable_admin(&env, &acl(&env), &caller);
        set_paused(&env, false);
        FacadeUnpaused { admin: caller }.publish(&env);
    }

    pub fn credit_manager(env: Env) -> Address {
        read_address(&env, &DataKey::CreditManager)
    }

    pub fn underlying(env: Env) -> Address {
        underlying_address(&env)
    }

    pub fn bot_list(env: Env) -> Option<Address> {
        read_bot_list(&env)
    }

    pub fn debt_limits(env: Env) -> DebtLimits {
        debt_limits(&env)
    }

    pub fn max_debt_per_block_multiplier(env: Env) -> u32 {
        max_debt_per_block_multiplier(&env)
    }

    pub fn borrowed_in_block(env: Env) -> u128 {
        borrowed_in_block(&env)
    }

    pub fn expirable(env: Env) -> bool {
        is_expirable(&env)
    }

    pub fn expiration_date(env: Env) -> Option<u64> {
        expiration_date(&env)
    }

    pub fn forbidden_token_mask(env: Env) -> u128 {
        forbidden_token_mask(&env)
    }

    pub fn is_emergency_liquidator(env: Env, account: Address) -> bool {
        is_emergency_liquidator(&env, &account)
    }

    pub fn loss_params(env: Env) -> LossParams {
        loss_params(&env)
    }

    pub fn paused(env: Env) -> bool {
        is_paused(&env)
    }
}

fn acl(env: &Env) -> Address {
    read_address(env, &DataKey::Acl)
}

fn underlying_address(env: &Env) -> Address {
    read_address(env, &DataKey::Underlying)
}

fn credit_manager(env: &Env) -> CreditManagerClient<'_> {
    CreditManagerClient::new(env, &read_address(env, &DataKey::CreditManager))
}

fn require_owner(env: &Env, cm: &CreditManagerClient, credit_account: u32, caller: &Address) {
    if cm.borrower_of(&credit_account) != *caller {
        panic_with_error!(env, CreditError::CallerNotCreditAccountOwner);
    }
}

fn require_liquidation_allowed(env: &Env, liquidator: &Address) {
    if is_paused(env) && !is_emergency_liquidator(env, liquidator) {
        panic_with_error!(env, CreditError::Paused);
    }
}

/// Prices at safe prices while any forbidden token is enabled.
fn liquidation_data(env: &Env, cm: &CreditManagerClient, credit_account: u32) -> CollateralDebtData {
    let enabled = cm.enabled_tokens_mask_of(&credit_account);
    let task = if enabled & forbidden_token_mask(env) != 0 {
        CollateralCalcTask::DebtCollateralSafePrices
    } else {
        CollateralCalcTask::DebtCollateral
    };
    cm.calc_debt_and_collateral(&credit_account, &task)
}

fn run_batch(
    env: &Env,
    cm: &CreditManagerClient,
    credit_account: u32,
    caller: Address,
    calls: &Vec<MultiCall>,
    permissions: u64,
) {
    StartMultiCall {
        caller: caller.clone(),
        credit_account,
    }
    .publish(env);
    let mut session = Session::new(
        env,
        cm,
        credit_account,
        caller,
        cm.enabled_tokens_mask_of(&credit_account),
    );
    execute(env, cm, &mut session, calls, permissions);
    let enabled_tokens_mask = finish(env, cm, session);
    FinishMultiCall {
        credit_account,
        enabled_tokens_mask,
    }
    .publish(env);
}

/// A loss stops new borrowing; past the cumulative cap it pauses the facade.
fn record_loss(env: &Env, loss: u128) {
    write_max_debt_per_block_multiplier(env, 0);
    let mut params = loss_params(env);
    params.current_cumulative_loss = checked_add(params.current_cumulative_loss, loss).or_panic(env);
    if params.current_cumulative_loss > params.max_cumulative_loss {
        set_paused(env, true);
    }
    write_loss_params(env, &params);
    IncurLossOnLiquidation {
        loss,
        current_cumulative_loss: params.current_cumulative_loss,
    }
    .publish(env);
}

fn erase_bots(env: &Env, credit_account: u32) {
    if let Some(bot_list) = read_bot_list(env) {
        BotListClient::new(env, &bot_list)
            .erase_all_bot_permissions(&env.current_contract_address(), &credit_account);
    }
}
