use credit_common::access::{enter, exit, require_configurator};
use credit_common::bitmask::TokenSet;
use credit_common::constants::{
    MAX_COLLATERAL_TOKENS, PERCENTAGE_FACTOR, PERCENTAGE_FACTOR_U32, UNDERLYING_TOKEN_MASK,
};
use credit_common::credit_logic::{
    calc_accrued_fees, calc_accrued_interest, calc_close_payments, calc_decrease, calc_increase,
    calc_liquidation_payments, calc_total_debt, ramped_liquidation_threshold,
};
use credit_common::interfaces::{PoolClient, PriceOracleClient, QuotaKeeperClient};
use credit_common::math::{checked_add, checked_sub, mul_div_up, percent_mul, to_i128};
use credit_common::types::{
    AccountStatus, ClosureAction, CollateralCalcTask, CollateralDebtData, CollateralTokenData,
    CreditAccountInfo, FeeParams, ManageDebtAction,
};
use credit_common::{CreditError, OrPanic};
use soroban_sdk::{contract, contractimpl, panic_with_error, token, Address, Env, Vec};

use crate::events::*;
use crate::storage::*;

/// Ledger of credit accounts: debt, collateral custody and solvency checks.
/// Every state change comes from the credit facade, which batches them and
/// asks for a single collateral check at the end.
#[contract]
pub struct CreditManager;

#[contractimpl]
impl CreditManager {
    pub fn initialize(
        env: Env,
        caller: Address,
        acl: Address,
        pool: Address,
        price_oracle: Address,
        quota_keeper: Address,
    ) {
        if env.storage().instance().has(&DataKey::Initialized) {
            panic_with_error!(&env, CreditError::AlreadyInitialized);
        }
        require_configurator(&env, &acl, &caller);
        let underlying = PoolClient::new(&env, &pool).underlying_token();

        let instance = env.storage().instance();
        instance.set(&DataKey::Acl, &acl);
        instance.set(&DataKey::Pool, &pool);
        instance.set(&DataKey::Underlying, &underlying);
        instance.set(&DataKey::PriceOracle, &price_oracle);
        instance.set(&DataKey::QuotaKeeper, &quota_keeper);
        instance.set(&DataKey::CollateralTokensCount, &1u32);
        instance.set(&DataKey::Initialized, &true);

        // the underlying always sits at bit 0; its LT follows the fees
        env.storage()
            .persistent()
            .set(&DataKey::TokenMask(underlying.clone()), &UNDERLYING_TOKEN_MASK);
        write_collateral_token(
            &env,
            UNDERLYING_TOKEN_MASK,
            &CollateralTokenData {
                token: underlying,
                lt_initial: 0,
                lt_final: 0,
                timestamp_ramp_start: 0,
                ramp_duration: 0,
            },
        );
        ensure_initialized(&env);
    }

    /// Opens an account for `on_behalf_of` and borrows `debt` into it.
    pub fn open_credit_account(env: Env, debt: u128, on_behalf_of: Address) -> u32 {
        ensure_initialized(&env);
        require_credit_facade(&env);
        enter(&env);

        let credit_account = take_account_handle(&env);
        let pool = pool(&env);
        let info = CreditAccountInfo {
            borrower: on_behalf_of.clone(),
            debt,
            cumulative_index_last_update: pool.base_interest_index(),
            cumulative_quota_interest: 0,
            quota_fees: 0,
            enabled_tokens_mask: UNDERLYING_TOKEN_MASK,
            since: env.ledger().timestamp(),
            status: AccountStatus::Open,
        };
        write_account(&env, credit_account, &info);
        activate_account(&env, credit_account);

        if debt > 0 {
            pool.lend_credit_account(&env.current_contract_address(), &credit_account, &debt);
            credit(&env, credit_account, &underlying_address(&env), UNDERLYING_TOKEN_MASK, debt);
        }

        exit(&env);
        OpenCreditAccount {
            borrower: on_behalf_of,
            credit_account,
            debt,
        }
        .publish(&env);
        credit_account
    }

    /// Settles the account with the pool and hands out what is left.
    ///
    /// The pool receives what `closure_action` says it is owed; `payer`
    /// covers any underlying shortfall. Remaining funds go to the borrower,
    /// all other balances to `to` except tokens in `skip_tokens_mask`, which
    /// go back to the borrower. Returns `(remaining_funds, loss)`.
    pub fn close_credit_account(
        env: Env,
        credit_account: u32,
        closure_action: ClosureAction,
        collateral_debt_data: CollateralDebtData,
        payer: Address,
        to: Address,
        skip_tokens_mask: u128,
    ) -> (u128, u128) {
        ensure_initialized(&env);
        require_credit_facade(&env);
        enter(&env);

        let mut info = open_account(&env, credit_account);
        let fees = read_fees(&env);
        let payments = match closure_action {
            ClosureAction::CloseAccount => calc_close_payments(&collateral_debt_data),
            ClosureAction::LiquidateAccount => calc_liquidation_payments(
                &collateral_debt_data,
                fees.fee_liquidation,
                fees.liquidation_discount,
            ),
            ClosureAction::LiquidateExpiredAccount => calc_liquidation_payments(
                &collateral_debt_data,
                fees.fee_liquidation_expired,
                fees.liquidation_discount_expired,
            ),
        }
        .or_panic(&env);

        let this = env.current_contract_address();
        if !collateral_debt_data.quoted_tokens.is_empty() {
            quota_keeper(&env).remove_quotas(
                &this,
                &credit_account,
                &collateral_debt_data.quoted_tokens,
                &(payments.loss > 0),
            );
        }

        let underlying = underlying_address(&env);
        let underlying_token = token::Client::new(&env, &underlying);
        let required = checked_add(payments.amount_to_pool, payments.remaining_funds).or_panic(&env);
        let mut available = balance(&env, credit_account, &underlying);
        if available < required {
            underlying_token.transfer(&payer, &this, &to_i128(required - available).or_panic(&env));
            available = required;
        }

        let pool = pool(&env);
        if payments.amount_to_pool > 0 {
            underlying_token.transfer(
                &this,
                &pool.address,
                &to_i128(payments.amount_to_pool).or_panic(&env),
            );
        }
        if info.debt > 0 || payments.amount_to_pool > 0 || payments.loss > 0 {
            pool.repay_credit_account(&this, &info.debt, &payments.profit, &payments.loss);
        }
        if payments.remaining_funds > 0 {
            underlying_token.transfer(
                &this,
                &info.borrower,
                &to_i128(payments.remaining_funds).or_panic(&env),
            );
        }
        let surplus = available - required;
        if surplus > 0 {
            underlying_token.transfer(&this, &to, &to_i128(surplus).or_panic(&env));
        }
        write_balance(&env, credit_account, &underlying, UNDERLYING_TOKEN_MASK, 0);

        let held = TokenSet::from_bits(held_tokens(&env, credit_account)).disable(UNDERLYING_TOKEN_MASK);
        for mask in held.iter() {
            let collateral = collateral_token(&env, mask).token;
            let amount = balance(&env, credit_account, &collateral);
            if amount > 0 {
                let recipient = if skip_tokens_mask & mask != 0 {
                    &info.borrower
                } else {
                    &to
                };
                token::Client::new(&env, &collateral).transfer(
                    &this,
                    recipient,
                    &to_i128(amount).or_panic(&env),
                );
            }
            write_balance(&env, credit_account, &collateral, mask, 0);
        }
        env.storage()
            .persistent()
            .remove(&DataKey::HeldTokens(credit_account));

        info.status = match closure_action {
            ClosureAction::CloseAccount => AccountStatus::Closed,
            _ => AccountStatus::Liquidated,
        };
        info.debt = 0;
        info.cumulative_quota_interest = 0;
        info.quota_fees = 0;
        info.enabled_tokens_mask = 0;
        write_account(&env, credit_account, &info);
        release_account(&env, credit_account);

        exit(&env);
        CloseCreditAccount {
            borrower: info.borrower,
            credit_account,
            action: closure_action,
            remaining_funds: payments.remaining_funds,
            loss: payments.loss,
        }
        .publish(&env);
        (payments.remaining_funds, payments.loss)
    }

    /// Returns `(new_debt, tokens_to_enable, tokens_to_disable)`.
    ///
    /// A decrease pays quota increase fees, quota interest, base interest and
    /// then principal. `u128::MAX` repays everything.
    pub fn manage_debt(
        env: Env,
        credit_account: u32,
        amount: u128,
        enabled_tokens_mask: u128,
        action: ManageDebtAction,
    ) -> (u128, u128, u128) {
        ensure_initialized(&env);
        require_credit_facade(&env);
        enter(&env);

        let mut info = open_account(&env, credit_account);
        let pool = pool(&env);
        let index_now = pool.base_interest_index();
        let this = env.current_contract_address();
        let underlying = underlying_address(&env);

        let result = match action {
            ManageDebtAction::Increase => {
                let (new_debt, new_index) = calc_increase(
                    amount,
                    info.debt,
                    index_now,
                    info.cumulative_index_last_update,
                )
                .or_panic(&env);
                pool.lend_credit_account(&this, &credit_account, &amount);
                credit(&env, credit_account, &underlying, UNDERLYING_TOKEN_MASK, amount);

                info.debt = new_debt;
                info.cumulative_index_last_update = new_index;
                IncreaseDebt {
                    credit_account,
                    amount,
                    new_debt,
                }
                .publish(&env);
                (new_debt, UNDERLYING_TOKEN_MASK, 0)
            }
            ManageDebtAction::Decrease => {
                let active_quotas = enabled_tokens_mask & quoted_tokens_mask(&env);
                let quoted = tokens_of(&env, active_quotas);
                if !quoted.is_empty() {
                    let realized =
                        quota_keeper(&env).checkpoint_interest(&this, &credit_account, &quoted);
                    info.cumulative_quota_interest =
                        checked_add(info.cumulative_quota_interest, realized).or_panic(&env);
                }

                let fee_interest = read_fees(&env).fee_interest;
                let accrued_interest =
                    calc_accrued_interest(info.debt, info.cumulative_index_last_update, index_now)
                        .or_panic(&env);
                let accrued_fees = calc_accrued_fees(
                    accrued_interest,
                    info.cumulative_quota_interest,
                    info.quota_fees,
                    fee_interest,
                )
                .or_panic(&env);
                let total_debt = [accrued_interest, info.cumulative_quota_interest, accrued_fees]
                    .iter()
                    .try_fold(info.debt, |acc, v| checked_add(acc, *v))
                    .or_panic(&env);
                let amount = amount.min(total_debt);

                let decrease = calc_decrease(
                    amount,
                    info.debt,
                    index_now,
                    info.cumulative_index_last_update,
                    info.cumulative_quota_interest,
                    info.quota_fees,
                    fee_interest,
                )
                .or_panic(&env);
                if decrease.new_debt == 0 && active_quotas != 0 {
                    panic_with_error!(&env, CreditError::DebtToZeroWithActiveQuotas);
                }

                debit(&env, credit_account, &underlying, UNDERLYING_TOKEN_MASK, amount);
                token::Client::new(&env, &underlying).transfer(
                    &this,
                    &pool.address,
                    &to_i128(amount).or_panic(&env),
                );
                pool.repay_credit_account(
                    &this,
                    &checked_sub(info.debt, decrease.new_debt).or_panic(&env),
                    &decrease.profit,
                    &0,
                );

                info.debt = decrease.new_debt;
                info.cumulative_index_last_update = decrease.new_cumulative_index;
                info.cumulative_quota_interest = decrease.new_cumulative_quota_interest;
                info.quota_fees = decrease.new_quota_fees;
                DecreaseDebt {
                    credit_account,
                    amount,
                    new_debt: decrease.new_debt,
                }
                .publish(&env);
                (decrease.new_debt, 0, 0)
            }
        };

        write_account(&env, credit_account, &info);
        exit(&env);
        result
    }

    /// Pulls `amount` of `token` from `payer` into the account. Returns the
    /// mask to enable; quoted tokens are enabled by their quota instead.
    pub fn add_collateral(
        env: Env,
        payer: Address,
        credit_account: u32,
        token: Address,
        amount: u128,
    ) -> u128 {
        ensure_initialized(&env);
        require_credit_facade(&env);
        open_account(&env, credit_account);
        let mask = token_mask(&env, &token);

        token::Client::new(&env, &token).transfer(
            &payer,
            &env.current_contract_address(),
            &to_i128(amount).or_panic(&env),
        );
        credit(&env, credit_account, &token, mask, amount);

        AddCollateral {
            token,
            credit_account,
            amount,
        }
        .publish(&env);
        if mask & quoted_tokens_mask(&env) != 0 {
            0
        } else {
            mask
        }
    }

    /// Sends `amount` of `token` to `to`; `u128::MAX` sends the whole
    /// balance. Returns the mask to disable when nothing is left.
    pub fn withdraw_collateral(
        env: Env,
        credit_account: u32,
        token: Address,
        amount: u128,
        to: Address,
    ) -> u128 {
        ensure_initialized(&env);
        require_credit_facade(&env);
        open_account(&env, credit_account);
        let mask = token_mask(&env, &token);

        let held = balance(&env, credit_account, &token);
        let amount = if amount == u128::MAX { held } else { amount };
        debit(&env, credit_account, &token, mask, amount);
        token::Client::new(&env, &token).transfer(
            &env.current_contract_address(),
            &to,
            &to_i128(amount).or_panic(&env),
        );

        WithdrawCollateral {
            token,
            to,
            credit_account,
            amount,
        }
        .publish(&env);
        let emptied = held == amount;
        if emptied && mask != UNDERLYING_TOKEN_MASK && mask & quoted_tokens_mask(&env) == 0 {
            mask
        } else {
            0
        }
    }

    /// Returns `(tokens_to_enable, tokens_to_disable)`.
    pub fn update_quota(
        env: Env,
        credit_account: u32,
        token: Address,
        quota_change: i128,
        min_quota: u128,
        max_quota: u128,
    ) -> (u128, u128) {
        ensure_initialized(&env);
        require_credit_facade(&env);
        let mut info = open_account(&env, credit_account);
        let mask = token_mask(&env, &token);
        if mask & quoted_tokens_mask(&env) == 0 {
            panic_with_error!(&env, CreditError::TokenIsNotQuoted);
        }
        if quota_change > 0 && info.debt == 0 {
            panic_with_error!(&env, CreditError::UpdateQuotaOnZeroDebtAccount);
        }

        let update = quota_keeper(&env).update_quota(
            &env.current_contract_address(),
            &credit_account,
            &token,
            &quota_change,
            &min_quota,
            &max_quota,
        );
        info.cumulative_quota_interest =
            checked_add(info.cumulative_quota_interest, update.interest_delta).or_panic(&env);
        info.quota_fees = checked_add(info.quota_fees, update.fees).or_panic(&env);
        write_account(&env, credit_account, &info);

        (
            if update.enable { mask } else { 0 },
            if update.disable { mask } else { 0 },
        )
    }

    /// Fails unless `twv_usd * 10_000 >= total_debt_usd * min_health_factor`.
    /// Stops pricing tokens as soon as that holds, visiting `collateral_hints`
    /// first. Persists and returns the enabled mask with emptied tokens dropped
    /// and the underlying kept.
    pub fn full_collateral_check(
        env: Env,
        credit_account: u32,
        enabled_tokens_mask: u128,
        collateral_hints: Vec<u128>,
        min_health_factor: u32,
        use_safe_prices: bool,
    ) -> u128 {
        ensure_initialized(&env);
        require_credit_facade(&env);
        let mut info = open_account(&env, credit_account);

        let mut data = debt_data(&env, credit_account, &info, enabled_tokens_mask, false);
        let to_disable = collateral_data(
            &env,
            credit_account,
            &mut data,
            CollateralPass {
                hints: Some(&collateral_hints),
                stop_at: Some(min_health_factor),
                use_safe_prices,
            },
        );
        if !is_healthy(&env, &data, min_health_factor) {
            panic_with_error!(&env, CreditError::NotEnoughCollateral);
        }

        let mask = (enabled_tokens_mask & !to_disable) | UNDERLYING_TOKEN_MASK;
        check_enabled_count(&env, mask);
        info.enabled_tokens_mask = mask;
        write_account(&env, credit_account, &info);
        mask
    }

    /// Commits a mask for batches that need no collateral check. The
    /// underlying stays enabled whatever the caller passes.
    pub fn save_enabled_tokens_mask(env: Env, credit_account: u32, enabled_tokens_mask: u128) {
        ensure_initialized(&env);
        require_credit_facade(&env);
        let mut info = open_account(&env, credit_account);
        let mask = enabled_tokens_mask | UNDERLYING_TOKEN_MASK;
        check_enabled_count(&env, mask);
        info.enabled_tokens_mask = mask;
        write_account(&env, credit_account, &info);
    }

    pub fn calc_debt_and_collateral(
        env: Env,
        credit_account: u32,
        task: CollateralCalcTask,
    ) -> CollateralDebtData {
        ensure_initialized(&env);
        let info = open_account(&env, credit_account);
        let mask = info.enabled_tokens_mask;
        match task {
            CollateralCalcTask::GenericParams => debt_data(&env, credit_account, &info, mask, true),
            CollateralCalcTask::DebtOnly => debt_data(&env, credit_account, &info, mask, false),
            CollateralCalcTask::FullCollateralCheckLazy
            | CollateralCalcTask::DebtCollateral
            | CollateralCalcTask::DebtCollateralSafePrices => {
                let mut data = debt_data(&env, credit_account, &info, mask, false);
                collateral_data(
                    &env,
                    credit_account,
                    &mut data,
                    CollateralPass {
                        hints: None,
                        stop_at: match task {
                            CollateralCalcTask::FullCollateralCheckLazy => {
                                Some(PERCENTAGE_FACTOR_U32)
                            }
                            _ => None,
                        },
                        use_safe_prices: task == CollateralCalcTask::DebtCollateralSafePrices,
                    },
                );
                data
            }
        }
    }

    pub fn is_liquidatable(env: Env, credit_account: u32, min_health_factor: u32) -> bool {
        let data =
            Self::calc_debt_and_collateral(env.clone(), credit_account, CollateralCalcTask::DebtCollateral);
        !is_healthy(&env, &data, min_health_factor)
    }

    pub fn set_credit_facade(env: Env, caller: Address, credit_facade: Address) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        env.storage()
            .instance()
            .set(&DataKey::CreditFacade, &credit_facade);
        SetCreditFacade { credit_facade }.publish(&env);
    }

    pub fn set_price_oracle(env: Env, caller: Address, price_oracle: Address) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        env.storage()
            .instance()
            .set(&DataKey::PriceOracle, &price_oracle);
        SetPriceOracle { price_oracle }.publish(&env);
    }

    /// Also sets the underlying's LT to `liquidation_discount - fee_liquidation`;
    /// no other token may sit above it.
    pub fn set_fees(env: Env, caller: Address, fees: FeeParams) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        if fees.fee_interest > PERCENTAGE_FACTOR_U32
            || fees.liquidation_discount > PERCENTAGE_FACTOR_U32
            || fees.liquidation_discount_expired > PERCENTAGE_FACTOR_U32
            || fees.fee_liquidation >= fees.liquidation_discount
            || fees.fee_liquidation_expired >= fees.liquidation_discount_expired
        {
            panic_with_error!(&env, CreditError::IncorrectParameter);
        }

        let lt_underlying = fees.liquidation_discount - fees.fee_liquidation;
        for i in 1..collateral_tokens_count(&env) {
            let data = collateral_token(&env, 1u128 << i);
            if data.lt_initial.max(data.lt_final) > lt_underlying {
                panic_with_error!(&env, CreditError::IncorrectLiquidationThreshold);
            }
        }
        let mut underlying = collateral_token(&env, UNDERLYING_TOKEN_MASK);
        underlying.lt_initial = lt_underlying;
        underlying.lt_final = lt_underlying;
        write_collateral_token(&env, UNDERLYING_TOKEN_MASK, &underlying);

        env.storage().instance().set(&DataKey::Fees, &fees);
        SetFees { fees }.publish(&env);
    }

    pub fn add_collateral_token(env: Env, caller: Address, token: Address, liquidation_threshold: u32) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        if read_token_mask(&env, &token).is_some() {
            panic_with_error!(&env, CreditError::TokenAlreadyAdded);
        }
        let count = collateral_tokens_count(&env);
        if count >= MAX_COLLATERAL_TOKENS {
            panic_with_error!(&env, CreditError::TooManyTokens);
        }
        check_below_underlying_lt(&env, liquidation_threshold);

        let mask = 1u128 << count;
        env.storage()
            .persistent()
            .set(&DataKey::TokenMask(token.clone()), &mask);
        write_collateral_token(
            &env,
            mask,
            &CollateralTokenData {
                token: token.clone(),
                lt_initial: liquidation_threshold,
                lt_final: liquidation_threshold,
                timestamp_ramp_start: 0,
                ramp_duration: 0,
            },
        );
        env.storage()
            .instance()
            .set(&DataKey::CollateralTokensCount, &(count + 1));
        AddCollateralToken { token, mask }.publish(&env);
    }

    pub fn set_liquidation_threshold(
        env: Env,
        caller: Address,
        token: Address,
        liquidation_threshold: u32,
    ) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        let mask = collateral_mask(&env, &token);
        check_below_underlying_lt(&env, liquidation_threshold);

        let mut data = collateral_token(&env, mask);
        data.lt_initial = liquidation_threshold;
        data.lt_final = liquidation_threshold;
        data.timestamp_ramp_start = 0;
        data.ramp_duration = 0;
        write_collateral_token(&env, mask, &data);
        SetLiquidationThreshold {
            token,
            liquidation_threshold,
        }
        .publish(&env);
    }

    /// Moves the LT of `token` linearly from its current value to `lt_final`
    /// over `ramp_duration` seconds, starting no earlier than now.
    pub fn ramp_liquidation_threshold(
        env: Env,
        caller: Address,
        token: Address,
        lt_final: u32,
        timestamp_ramp_start: u64,
        ramp_duration: u64,
    ) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        let mask = collateral_mask(&env, &token);
        check_below_underlying_lt(&env, lt_final);

        let now = env.ledger().timestamp();
        let mut data = collateral_token(&env, mask);
        data.lt_initial = current_lt(&data, now);
        data.lt_final = lt_final;
        data.timestamp_ramp_start = timestamp_ramp_start.max(now);
        data.ramp_duration = ramp_duration;
        write_collateral_token(&env, mask, &data);
        RampLiquidationThreshold {
            token,
            lt_initial: data.lt_initial,
            lt_final,
            timestamp_ramp_start: data.timestamp_ramp_start,
            ramp_duration,
        }
        .publish(&env);
    }

    /// Marks `token` as quoted; it must already be known to the quota keeper.
    pub fn set_token_quoted(env: Env, caller: Address, token: Address) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        let mask = collateral_mask(&env, &token);
        if !quota_keeper(&env).is_quoted_token(&token) {
            panic_with_error!(&env, CreditError::TokenIsNotQuoted);
        }
        env.storage()
            .instance()
            .set(&DataKey::QuotedTokensMask, &(quoted_tokens_mask(&env) | mask));
        SetQuotedToken { token }.publish(&env);
    }

    pub fn set_max_enabled_tokens(env: Env, caller: Address, max_enabled_tokens: u32) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        if max_enabled_tokens == 0 {
            panic_with_error!(&env, CreditError::IncorrectParameter);
        }
        env.storage()
            .instance()
            .set(&DataKey::MaxEnabledTokens, &max_enabled_tokens);
        SetMaxEnabledTokens { max_enabled_tokens }.publish(&env);
    }

    pub fn underlying(env: Env) -> Address {
        underlying_address(&env)
    }

    pub fn pool(env: Env) -> Address {
        read_address(&env, &DataKey::Pool)
    }

    pub fn price_oracle(env: Env) -> Address {
        read_address(&env, &DataKey::PriceOracle)
    }

    pub fn quota_keeper(env: Env) -> Address {
        read_address(&env, &DataKey::QuotaKeeper)
    }

    pub fn credit_facade(env: Env) -> Option<Address> {
        env.storage().instance().get(&DataKey::CreditFacade)
    }

    pub fn fees(env: Env) -> FeeParams {
        read_fees(&env)
    }

    pub fn max_enabled_tokens(env: Env) -> u32 {
        max_enabled_tokens(&env)
    }

    pub fn token_mask_of(env: Env, token: Address) -> u128 {
        token_mask(&env, &token)
    }

    pub fn collateral_token_by_mask(env: Env, mask: u128) -> CollateralTokenData {
        collateral_token(&env, mask)
    }

    pub fn collateral_tokens_count(env: Env) -> u32 {
        collateral_tokens_count(&env)
    }

    /// Current, possibly ramping, liquidation threshold of `token`.
    pub fn liquidation_threshold(env: Env, token: Address) -> u32 {
        let data = collateral_token(&env, token_mask(&env, &token));
        current_lt(&data, env.ledger().timestamp())
    }

    pub fn quoted_tokens_mask(env: Env) -> u128 {
        quoted_tokens_mask(&env)
    }

    pub fn borrower_of(env: Env, credit_account: u32) -> Address {
        open_account(&env, credit_account).borrower
    }

    pub fn credit_account_info(env: Env, credit_account: u32) -> Option<CreditAccountInfo> {
        read_account(&env, credit_account)
    }

    pub fn enabled_tokens_mask_of(env: Env, credit_account: u32) -> u128 {
        open_account(&env, credit_account).enabled_tokens_mask
    }

    pub fn balance_of(env: Env, credit_account: u32, token: Address) -> u128 {
        balance(&env, credit_account, &token)
    }

    /// Handles of all open accounts.
    pub fn credit_accounts(env: Env) -> Vec<u32> {
        u32_list(&env, &DataKey::ActiveAccounts)
    }

    pub fn credit_accounts_len(env: Env) -> u32 {
        u32_list(&env, &DataKey::ActiveAccounts).len()
    }
}

struct CollateralPass<'a> {
    hints: Option<&'a Vec<u128>>,
    /// Stop pricing tokens once this health factor is reached.
    stop_at: Option<u32>,
    use_safe_prices: bool,
}

fn acl(env: &Env) -> Address {
    read_address(env, &DataKey::Acl)
}

fn underlying_address(env: &Env) -> Address {
    read_address(env, &DataKey::Underlying)
}

fn pool(env: &Env) -> PoolClient<'_> {
    PoolClient::new(env, &read_address(env, &DataKey::Pool))
}

fn quota_keeper(env: &Env) -> QuotaKeeperClient<'_> {
    QuotaKeeperClient::new(env, &read_address(env, &DataKey::QuotaKeeper))
}

fn price_oracle(env: &Env) -> PriceOracleClient<'_> {
    PriceOracleClient::new(env, &read_address(env, &DataKey::PriceOracle))
}

fn require_credit_facade(env: &Env) {
    let facade: Address = env
        .storage()
        .instance()
        .get(&DataKey::CreditFacade)
        .unwrap_or_else(|| panic_with_error!(env, CreditError::CallerNotCreditFacade));
    facade.require_auth();
}

/// Mask of a registered token other than the underlying.
fn collateral_mask(env: &Env, token: &Address) -> u128 {
    let mask = token_mask(env, token);
    if mask == UNDERLYING_TOKEN_MASK {
        panic_with_error!(env, CreditError::IncorrectLiquidationThreshold);
    }
    mask
}

fn check_below_underlying_lt(env: &Env, liquidation_threshold: u32) {
    let underlying = collateral_token(env, UNDERLYING_TOKEN_MASK);
    if liquidation_threshold > underlying.lt_final {
        panic_with_error!(env, CreditError::IncorrectLiquidationThreshold);
    }
}

fn check_enabled_count(env: &Env, mask: u128) {
    if TokenSet::from_bits(mask).collateral_count() > max_enabled_tokens(env) {
        panic_with_error!(env, CreditError::TooManyEnabledTokens);
    }
}

fn current_lt(data: &CollateralTokenData, now: u64) -> u32 {
    ramped_liquidation_threshold(
        data.lt_initial,
        data.lt_final,
        data.timestamp_ramp_start,
        data.ramp_duration,
        now,
    )
}

fn credit(env: &Env, credit_account: u32, token: &Address, mask: u128, amount: u128) {
    let current = balance(env, credit_account, token);
    write_balance(
        env,
        credit_account,
        token,
        mask,
        checked_add(current, amount).or_panic(env),
    );
}

fn debit(env: &Env, credit_account: u32, token: &Address, mask: u128, amount: u128) {
    let current = balance(env, credit_account, token);
    if amount > current {
        panic_with_error!(env, CreditError::InsufficientBalance);
    }
    write_balance(env, credit_account, token, mask, current - amount);
}

fn tokens_of(env: &Env, mask: u128) -> Vec<Address> {
    let mut tokens = Vec::new(env);
    for bit in TokenSet::from_bits(mask).iter() {
        tokens.push_back(collateral_token(env, bit).token);
    }
    tokens
}

fn is_healthy(env: &Env, data: &CollateralDebtData, min_health_factor: u32) -> bool {
    let weighted = data
        .twv_usd
        .checked_mul(PERCENTAGE_FACTOR)
        .or_panic(env);
    let required = data
        .total_debt_usd
        .checked_mul(min_health_factor as u128)
        .or_panic(env);
    weighted >= required
}

/// Debt side of the account. `generic_only` stops after the index snapshot.
fn debt_data(
    env: &Env,
    credit_account: u32,
    info: &CreditAccountInfo,
    enabled_tokens_mask: u128,
    generic_only: bool,
) -> CollateralDebtData {
    let quoted_mask = quoted_tokens_mask(env);
    let mut data = CollateralDebtData {
        debt: info.debt,
        cumulative_index_now: pool(env).base_interest_index(),
        cumulative_index_last_update: info.cumulative_index_last_update,
        cumulative_quota_interest: info.cumulative_quota_interest,
        accrued_interest: 0,
        accrued_fees: 0,
        total_debt_usd: 0,
        total_value: 0,
        total_value_usd: 0,
        twv_usd: 0,
        enabled_tokens_mask,
        quoted_tokens_mask: quoted_mask,
        quoted_tokens: Vec::new(env),
        quotas: Vec::new(env),
    };
    if generic_only {
        return data;
    }

    let keeper = quota_keeper(env);
    let this = env.current_contract_address();
    data.quoted_tokens = tokens_of(env, enabled_tokens_mask & quoted_mask);
    for token in data.quoted_tokens.iter() {
        let (quota, _) = keeper.get_quota(&this, &credit_account, &token);
        data.quotas.push_back(quota);
    }
    if !data.quoted_tokens.is_empty() {
        let outstanding = keeper.accrue_interest(&this, &credit_account, &data.quoted_tokens);
        data.cumulative_quota_interest =
            checked_add(data.cumulative_quota_interest, outstanding).or_panic(env);
    }

    data.accrued_interest = calc_accrued_interest(
        info.debt,
        info.cumulative_index_last_update,
        data.cumulative_index_now,
    )
    .or_panic(env);
    data.accrued_fees = calc_accrued_fees(
        data.accrued_interest,
        data.cumulative_quota_interest,
        info.quota_fees,
        read_fees(env).fee_interest,
    )
    .or_panic(env);
    data
}

/// Prices the enabled tokens into `data`. Quoted tokens count at most their
/// quota. Returns the zero-balance, non-quoted tokens that can be disabled.
fn collateral_data(
    env: &Env,
    credit_account: u32,
    data: &mut CollateralDebtData,
    pass: CollateralPass,
) -> u128 {
    let oracle = price_oracle(env);
    let underlying = underlying_address(env);
    let total_debt = calc_total_debt(data).or_panic(env);
    data.total_debt_usd = if total_debt == 0 {
        0
    } else {
        oracle.convert_to_usd(&total_debt, &underlying)
    };
    let target = pass.stop_at.map(|hf| {
        mul_div_up(data.total_debt_usd, hf as u128, PERCENTAGE_FACTOR).or_panic(env)
    });

    let now = env.ledger().timestamp();
    let enabled = TokenSet::from_bits(data.enabled_tokens_mask);
    let hints = pass.hints.cloned().unwrap_or_else(|| Vec::new(env));
    let mut seen = TokenSet::EMPTY;
    let mut to_disable = 0u128;

    for mask in hints.iter().chain(enabled.iter()) {
        if mask.count_ones() != 1 || !enabled.contains(mask) || seen.contains(mask) {
            continue;
        }
        seen = seen.enable(mask);
        if matches!(target, Some(target) if data.twv_usd >= target) {
            break;
        }

        let collateral = collateral_token(env, mask);
        let amount = balance(env, credit_account, &collateral.token);
        let quoted = mask & data.quoted_tokens_mask != 0;
        if amount == 0 {
            if !quoted && mask != UNDERLYING_TOKEN_MASK {
                to_disable |= mask;
            }
            continue;
        }

        let value_usd = if pass.use_safe_prices {
            oracle.safe_convert_to_usd(&amount, &collateral.token)
        } else {
            oracle.convert_to_usd(&amount, &collateral.token)
        };
        let mut counted_usd = value_usd;
        if quoted {
            let quota = data
                .quoted_tokens
                .first_index_of(&collateral.token)
                .and_then(|i| data.quotas.get(i))
                .unwrap_or(0);
            let quota_usd = if quota == 0 {
                0
            } else {
                oracle.convert_to_usd(&quota, &underlying)
            };
            counted_usd = counted_usd.min(quota_usd);
        }

        let lt = current_lt(&collateral, now);
        let weighted = percent_mul(counted_usd, lt).or_panic(env);
        data.twv_usd = checked_add(data.twv_usd, weighted).or_panic(env);
        data.total_value_usd = checked_add(data.total_value_usd, value_usd).or_panic(env);
    }

    if pass.stop_at.is_none() && data.total_value_usd > 0 {
        data.total_value = oracle.convert_from_usd(&data.total_value_usd, &underlying);
    }
    to_disable
}
