use credit_common::access::{
    is_paused, require_configurator, require_pausable_admin, require_unpausable_admin,
    set_paused, when_not_paused,
};
use credit_common::constants::{PERCENTAGE_FACTOR, RAY, SECONDS_PER_YEAR};
use credit_common::credit_logic::linear_index_growth;
use credit_common::interfaces::InterestRateModelClient;
use credit_common::math::{apply_delta, checked_add, checked_sub, mul_div, mul_div_up, to_i128};
use credit_common::{CreditError, OrPanic};
use soroban_sdk::{contract, contractimpl, panic_with_error, token, Address, Env, String, Vec};
use stellar_tokens::fungible::burnable::emit_burn;
use stellar_tokens::fungible::Base as TokenBase;

use crate::constants::MAX_WITHDRAW_FEE;
use crate::events::*;
use crate::storage::*;

#[contract]
pub struct Pool;

#[contractimpl]
impl Pool {
    /// Sets up the pool for `underlying`. The LP share token copies the
    /// underlying's decimals.
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        env: Env,
        caller: Address,
        acl: Address,
        underlying: Address,
        interest_rate_model: Address,
        treasury: Address,
        total_debt_limit: u128,
        name: String,
        symbol: String,
    ) {
        if env.storage().instance().has(&DataKey::Initialized) {
            panic_with_error!(&env, CreditError::AlreadyInitialized);
        }
        require_configurator(&env, &acl, &caller);

        let decimals = token::Client::new(&env, &underlying).decimals();
        TokenBase::set_metadata(&env, decimals, name, symbol);

        let now = env.ledger().timestamp();
        let instance = env.storage().instance();
        instance.set(&DataKey::Acl, &acl);
        instance.set(&DataKey::Underlying, &underlying);
        instance.set(&DataKey::InterestRateModel, &interest_rate_model);
        instance.set(&DataKey::Treasury, &treasury);
        instance.set(&DataKey::WithdrawFee, &0u32);
        instance.set(&DataKey::TotalDebtLimit, &total_debt_limit);
        instance.set(&DataKey::BaseInterestIndexLu, &RAY);
        instance.set(&DataKey::LastBaseInterestUpdate, &now);
        instance.set(&DataKey::LastQuotaRevenueUpdate, &now);
        instance.set(&DataKey::Initialized, &true);

        let rate = InterestRateModelClient::new(&env, &interest_rate_model)
            .calc_borrow_rate(&0, &0, &false);
        write_u128(&env, &DataKey::BaseInterestRate, rate);
        ensure_initialized(&env);
    }

    /// Deposits `assets` of underlying and mints shares to `receiver`.
    pub fn deposit(env: Env, sender: Address, assets: u128, receiver: Address) -> u128 {
        ensure_initialized(&env);
        when_not_paused(&env);
        sender.require_auth();
        let shares = convert_to_shares(&env, assets);
        if assets == 0 || shares == 0 {
            panic_with_error!(&env, CreditError::AmountTooSmall);
        }
        deposit_internal(&env, &sender, &receiver, assets, shares);
        shares
    }

    /// Mints exactly `shares` to `receiver`, pulling the assets they cost.
    pub fn mint(env: Env, sender: Address, shares: u128, receiver: Address) -> u128 {
        ensure_initialized(&env);
        when_not_paused(&env);
        sender.require_auth();
        let assets = preview_mint(&env, shares);
        if assets == 0 || shares == 0 {
            panic_with_error!(&env, CreditError::AmountTooSmall);
        }
        deposit_internal(&env, &sender, &receiver, assets, shares);
        assets
    }

    /// Sends exactly `assets` to `receiver`, burning the shares of `owner`
    /// they cost including the withdrawal fee.
    pub fn withdraw(env: Env, owner: Address, assets: u128, receiver: Address) -> u128 {
        ensure_initialized(&env);
        when_not_paused(&env);
        owner.require_auth();
        let gross = gross_of_fee(&env, assets);
        let shares = preview_withdraw_shares(&env, gross);
        withdraw_internal(&env, &owner, &receiver, gross, assets, shares);
        shares
    }

    /// Burns `shares` of `owner`; `receiver` gets their value minus the fee.
    pub fn redeem(env: Env, owner: Address, shares: u128, receiver: Address) -> u128 {
        ensure_initialized(&env);
        when_not_paused(&env);
        owner.require_auth();
        let gross = convert_to_assets(&env, shares);
        let net = net_of_fee(&env, gross);
        if net == 0 {
            panic_with_error!(&env, CreditError::AmountTooSmall);
        }
        withdraw_internal(&env, &owner, &receiver, gross, net, shares);
        net
    }

    pub fn preview_deposit(env: Env, assets: u128) -> u128 {
        convert_to_shares(&env, assets)
    }

    pub fn preview_mint(env: Env, shares: u128) -> u128 {
        preview_mint(&env, shares)
    }

    pub fn preview_withdraw(env: Env, assets: u128) -> u128 {
        let gross = gross_of_fee(&env, assets);
        preview_withdraw_shares(&env, gross)
    }

    pub fn preview_redeem(env: Env, shares: u128) -> u128 {
        net_of_fee(&env, convert_to_assets(&env, shares))
    }

    pub fn convert_to_shares(env: Env, assets: u128) -> u128 {
        convert_to_shares(&env, assets)
    }

    pub fn convert_to_assets(env: Env, shares: u128) -> u128 {
        convert_to_assets(&env, shares)
    }

    pub fn name(env: Env) -> String {
        TokenBase::name(&env)
    }

    pub fn symbol(env: Env) -> String {
        TokenBase::symbol(&env)
    }

    pub fn decimals(env: Env) -> u32 {
        TokenBase::decimals(&env)
    }

    pub fn balance(env: Env, account: Address) -> i128 {
        TokenBase::balance(&env, &account)
    }

    pub fn total_supply(env: Env) -> i128 {
        TokenBase::total_supply(&env)
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) {
        TokenBase::transfer(&env, &from, &to, amount);
    }

    pub fn transfer_from(env: Env, spender: Address, from: Address, to: Address, amount: i128) {
        TokenBase::transfer_from(&env, &spender, &from, &to, amount);
    }

    pub fn approve(env: Env, owner: Address, spender: Address, amount: i128, live_until: u32) {
        TokenBase::approve(&env, &owner, &spender, amount, live_until);
    }

    pub fn allowance(env: Env, owner: Address, spender: Address) -> i128 {
        TokenBase::allowance(&env, &owner, &spender)
    }

    /// Lends `amount` of underlying to `credit_manager` for one of its accounts.
    pub fn lend_credit_account(env: Env, credit_manager: Address, credit_account: u32, amount: u128) {
        ensure_initialized(&env);
        when_not_paused(&env);
        credit_manager.require_auth();
        let mut cm_debt = registered_cm_debt(&env, &credit_manager);

        let borrowed_after = checked_add(cm_debt.borrowed, amount).or_panic(&env);
        let total_after =
            checked_add(read_u128(&env, &DataKey::TotalBorrowed), amount).or_panic(&env);
        if borrowed_after > cm_debt.limit
            || total_after > read_u128(&env, &DataKey::TotalDebtLimit)
        {
            panic_with_error!(&env, CreditError::CreditManagerCantBorrow);
        }
        let borrowable = irm(&env).available_to_borrow(
            &expected_liquidity(&env),
            &available_liquidity(&env),
        );
        if amount > borrowable {
            panic_with_error!(&env, CreditError::InsufficientLiquidity);
        }

        update_base_interest(&env, 0, -to_i128(amount).or_panic(&env), true);
        cm_debt.borrowed = borrowed_after;
        write_cm_debt(&env, &credit_manager, &cm_debt);
        write_u128(&env, &DataKey::TotalBorrowed, total_after);

        underlying(&env).transfer(
            &env.current_contract_address(),
            &credit_manager,
            &i128_amount(&env, amount),
        );
        Borrow {
            credit_manager,
            credit_account,
            amount,
        }
        .publish(&env);
    }

    /// Books a repayment the credit manager has already transferred:
    /// `repaid` principal plus `profit`, or minus `loss`.
    ///
    /// Profit is minted to the treasury as shares. Loss burns treasury shares
    /// first; what they cannot cover is socialized across LPs.
    pub fn repay_credit_account(
        env: Env,
        credit_manager: Address,
        repaid_amount: u128,
        profit: u128,
        loss: u128,
    ) {
        ensure_initialized(&env);
        credit_manager.require_auth();
        let mut cm_debt = registered_cm_debt(&env, &credit_manager);
        let treasury = read_address(&env, &DataKey::Treasury);

        if profit > 0 {
            let shares = convert_to_shares(&env, profit);
            if shares > 0 {
                TokenBase::mint(&env, &treasury, i128_amount(&env, shares));
            }
        } else if loss > 0 {
            let treasury_shares = share_balance(&env, &treasury);
            let shares_to_burn = convert_to_shares(&env, loss);
            if shares_to_burn > treasury_shares {
                let covered = convert_to_assets(&env, treasury_shares);
                burn_shares(&env, &treasury, treasury_shares);
                IncurUncoveredLoss {
                    credit_manager: credit_manager.clone(),
                    loss: loss.saturating_sub(covered),
                }
                .publish(&env);
            } else {
                burn_shares(&env, &treasury, shares_to_burn);
            }
        }

        let delta = to_i128(profit).or_panic(&env) - to_i128(loss).or_panic(&env);
        update_base_interest(&env, delta, 0, false);

        let total = read_u128(&env, &DataKey::TotalBorrowed);
        write_u128(
            &env,
            &DataKey::TotalBorrowed,
            checked_sub(total, repaid_amount).or_panic(&env),
        );
        cm_debt.borrowed = checked_sub(cm_debt.borrowed, repaid_amount).or_panic(&env);
        write_cm_debt(&env, &credit_manager, &cm_debt);

        Repay {
            credit_manager,
            borrowed_amount: repaid_amount,
            profit,
            loss,
        }
        .publish(&env);
    }

    pub fn update_quota_revenue(env: Env, quota_keeper: Address, delta: i128) {
        ensure_initialized(&env);
        require_quota_keeper(&env, &quota_keeper);
        let current = read_u128(&env, &DataKey::QuotaRevenue);
        set_quota_revenue(&env, apply_delta(current, delta).or_panic(&env));
    }

    pub fn set_quota_revenue(env: Env, quota_keeper: Address, new_revenue: u128) {
        ensure_initialized(&env);
        require_quota_keeper(&env, &quota_keeper);
        set_quota_revenue(&env, new_revenue);
    }

    pub fn set_interest_rate_model(env: Env, caller: Address, model: Address) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        // accrue at the old rate before switching
        update_base_interest(&env, 0, 0, false);
        env.storage()
            .instance()
            .set(&DataKey::InterestRateModel, &model);
        update_base_interest(&env, 0, 0, false);
        SetInterestRateModel { model }.publish(&env);
    }

    pub fn set_pool_quota_keeper(env: Env, caller: Address, quota_keeper: Address) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        set_quota_revenue(&env, read_u128(&env, &DataKey::QuotaRevenue));
        env.storage()
            .instance()
            .set(&DataKey::QuotaKeeper, &quota_keeper);
        SetPoolQuotaKeeper { quota_keeper }.publish(&env);
    }

    /// `u128::MAX` lifts the limit.
    pub fn set_total_debt_limit(env: Env, caller: Address, limit: u128) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        write_u128(&env, &DataKey::TotalDebtLimit, limit);
        SetTotalDebtLimit { limit }.publish(&env);
    }

    /// Registers `credit_manager` on first use.
    pub fn set_credit_manager_debt_limit(
        env: Env,
        caller: Address,
        credit_manager: Address,
        limit: u128,
    ) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        let mut cm_debt = match read_cm_debt(&env, &credit_manager) {
            Some(debt) => debt,
            None => {
                let mut managers = credit_managers(&env);
                managers.push_back(credit_manager.clone());
                env.storage()
                    .instance()
                    .set(&DataKey::CreditManagers, &managers);
                AddCreditManager {
                    credit_manager: credit_manager.clone(),
                }
                .publish(&env);
                CreditManagerDebt::default()
            }
        };
        cm_debt.limit = limit;
        write_cm_debt(&env, &credit_manager, &cm_debt);
        SetCreditManagerDebtLimit {
            credit_manager,
            limit,
        }
        .publish(&env);
    }

    pub fn set_withdraw_fee(env: Env, caller: Address, fee: u32) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        if fee > MAX_WITHDRAW_FEE {
            panic_with_error!(&env, CreditError::IncorrectParameter);
        }
        env.storage().instance().set(&DataKey::WithdrawFee, &fee);
        SetWithdrawFee { fee }.publish(&env);
    }

    pub fn set_treasury(env: Env, caller: Address, treasury: Address) {
        ensure_initialized(&env);
        require_configurator(&env, &acl(&env), &caller);
        env.storage().instance().set(&DataKey::Treasury, &treasury);
        SetTreasury { treasury }.publish(&env);
    }

    pub fn pause(env: Env, caller: Address) {
        ensure_initialized(&env);
        require_pausable_admin(&env, &acl(&env), &caller);
        set_paused(&env, true);
        PoolPaused { admin: caller }.publish(&env);
    }

    pub fn unpause(env: Env, caller: Address) {
        ensure_initialized(&env);
        require_unpausable_admin(&env, &acl(&env), &caller);
        set_paused(&env, false);
        PoolUnpaused { admin: caller }.publish(&env);
    }

    pub fn underlying_token(env: Env) -> Address {
        read_address(&env, &DataKey::Underlying)
    }

    pub fn treasury(env: Env) -> Address {
        read_address(&env, &DataKey::Treasury)
    }

    pub fn interest_rate_model(env: Env) -> Address {
        read_address(&env, &DataKey::InterestRateModel)
    }

    pub fn pool_quota_keeper(env: Env) -> Option<Address> {
        env.storage().instance().get(&DataKey::QuotaKeeper)
    }

    pub fn withdraw_fee(env: Env) -> u32 {
        withdraw_fee(&env)
    }

    pub fn paused(env: Env) -> bool {
        is_paused(&env)
    }

    /// Underlying owed to LPs, including interest and quota revenue accrued
    /// since the last update.
    pub fn expected_liquidity(env: Env) -> u128 {
        expected_liquidity(&env)
    }

    pub fn total_assets(env: Env) -> u128 {
        expected_liquidity(&env)
    }

    pub fn expected_liquidity_lu(env: Env) -> u128 {
        read_u128(&env, &DataKey::ExpectedLiquidityLu)
    }

    pub fn available_liquidity(env: Env) -> u128 {
        available_liquidity(&env)
    }

    pub fn base_interest_rate(env: Env) -> u128 {
        read_u128(&env, &DataKey::BaseInterestRate)
    }

    pub fn base_interest_index(env: Env) -> u128 {
        base_interest_index(&env)
    }

    pub fn base_interest_index_lu(env: Env) -> u128 {
        read_u128(&env, &DataKey::BaseInterestIndexLu)
    }

    /// Yearly LP yield in ray: base interest on borrowed funds plus quota revenue.
    pub fn supply_rate(env: Env) -> u128 {
        let el = expected_liquidity(&env);
        if el == 0 {
            return 0;
        }
        let base = mul_div(
            read_u128(&env, &DataKey::BaseInterestRate),
            read_u128(&env, &DataKey::TotalBorrowed),
            el,
        )
        .or_panic(&env);
        let quota = mul_div(read_u128(&env, &DataKey::QuotaRevenue), RAY, el).or_panic(&env);
        base + quota
    }

    pub fn quota_revenue(env: Env) -> u128 {
        read_u128(&env, &DataKey::QuotaRevenue)
    }

    pub fn total_borrowed(env: Env) -> u128 {
        read_u128(&env, &DataKey::TotalBorrowed)
    }

    pub fn total_debt_limit(env: Env) -> u128 {
        read_u128(&env, &DataKey::TotalDebtLimit)
    }

    pub fn credit_managers(env: Env) -> Vec<Address> {
        credit_managers(&env)
    }

    pub fn credit_manager_borrowed(env: Env, credit_manager: Address) -> u128 {
        read_cm_debt(&env, &credit_manager)
            .map(|d| d.borrowed)
            .unwrap_or(0)
    }

    pub fn credit_manager_debt_limit(env: Env, credit_manager: Address) -> u128 {
        read_cm_debt(&env, &credit_manager)
            .map(|d| d.limit)
            .unwrap_or(0)
    }

    /// How much `credit_manager` could borrow right now.
    pub fn credit_manager_borrowable(env: Env, credit_manager: Address) -> u128 {
        let Some(cm_debt) = read_cm_debt(&env, &credit_manager) else {
            return 0;
        };
        let by_cm = cm_debt.limit.saturating_sub(cm_debt.borrowed);
        let by_total = read_u128(&env, &DataKey::TotalDebtLimit)
            .saturating_sub(read_u128(&env, &DataKey::TotalBorrowed));
        let by_liquidity =
            irm(&env).available_to_borrow(&expected_liquidity(&env), &available_liquidity(&env));
        by_cm.min(by_total).min(by_liquidity)
    }
}

fn acl(env: &Env) -> Address {
    read_address(env, &DataKey::Acl)
}

fn irm(env: &Env) -> InterestRateModelClient<'_> {
    InterestRateModelClient::new(env, &read_address(env, &DataKey::InterestRateModel))
}

fn underlying(env: &Env) -> token::Client<'_> {
    token::Client::new(env, &read_address(env, &DataKey::Underlying))
}

fn withdraw_fee(env: &Env) -> u32 {
    env.storage()
        .instance()
        .get(&DataKey::WithdrawFee)
        .unwrap_or(0)
}

fn require_quota_keeper(env: &Env, caller: &Address) {
    let keeper: Option<Address> = env.storage().instance().get(&DataKey::QuotaKeeper);
    if keeper.as_ref() != Some(caller) {
        panic_with_error!(env, CreditError::CallerNotQuotaKeeper);
    }
    caller.require_auth();
}

fn available_liquidity(env: &Env) -> u128 {
    let balance = underlying(env).balance(&env.current_contract_address());
    u128::try_from(balance).unwrap_or(0)
}

fn elapsed_since(env: &Env, key: &DataKey) -> u64 {
    env.ledger().timestamp().saturating_sub(read_u64(env, key))
}

fn base_interest_index(env: &Env) -> u128 {
    linear_index_growth(
        read_u128(env, &DataKey::BaseInterestIndexLu),
        read_u128(env, &DataKey::BaseInterestRate),
        elapsed_since(env, &DataKey::LastBaseInterestUpdate),
    )
    .or_panic(env)
}

fn expected_liquidity(env: &Env) -> u128 {
    let dt_base = elapsed_since(env, &DataKey::LastBaseInterestUpdate) as u128;
    let rate = read_u128(env, &DataKey::BaseInterestRate);
    let base_accrued = mul_div(
        read_u128(env, &DataKey::TotalBorrowed),
        rate.checked_mul(dt_base).or_panic(env),
        RAY * SECONDS_PER_YEAR as u128,
    )
    .or_panic(env);
    let quota_accrued = quota_revenue_accrued(env);
    read_u128(env, &DataKey::ExpectedLiquidityLu) + base_accrued + quota_accrued
}

fn quota_revenue_accrued(env: &Env) -> u128 {
    let dt = elapsed_since(env, &DataKey::LastQuotaRevenueUpdate) as u128;
    mul_div(
        read_u128(env, &DataKey::QuotaRevenue),
        dt,
        SECONDS_PER_YEAR as u128,
    )
    .or_panic(env)
}

/// Folds accrued interest into the stored expected liquidity, applies the
/// deltas of the operation in progress and reprices the base rate.
fn update_base_interest(
    env: &Env,
    expected_liquidity_delta: i128,
    available_liquidity_delta: i128,
    check_optimal_borrowing: bool,
) {
    let expected = apply_delta(expected_liquidity(env), expected_liquidity_delta).or_panic(env);
    let available =
        apply_delta(available_liquidity(env), available_liquidity_delta).or_panic(env);
    let now = env.ledger().timestamp();

    write_u128(env, &DataKey::ExpectedLiquidityLu, expected);
    if read_u64(env, &DataKey::LastBaseInterestUpdate) != now {
        write_u128(env, &DataKey::BaseInterestIndexLu, base_interest_index(env));
        write_u64(env, &DataKey::LastBaseInterestUpdate, now);
    }
    if read_u64(env, &DataKey::LastQuotaRevenueUpdate) != now {
        write_u64(env, &DataKey::LastQuotaRevenueUpdate, now);
    }

    let rate = irm(env).calc_borrow_rate(&expected, &available, &check_optimal_borrowing);
    write_u128(env, &DataKey::BaseInterestRate, rate);
}

fn set_quota_revenue(env: &Env, new_revenue: u128) {
    let now = env.ledger().timestamp();
    if read_u64(env, &DataKey::LastQuotaRevenueUpdate) != now {
        let accrued = quota_revenue_accrued(env);
        let el_lu = read_u128(env, &DataKey::ExpectedLiquidityLu);
        write_u128(env, &DataKey::ExpectedLiquidityLu, el_lu + accrued);
        write_u64(env, &DataKey::LastQuotaRevenueUpdate, now);
    }
    write_u128(env, &DataKey::QuotaRevenue, new_revenue);
}

fn convert_to_shares(env: &Env, assets: u128) -> u128 {
    let supply = share_supply(env);
    let el = expected_liquidity(env);
    if supply == 0 || el == 0 {
        return assets;
    }
    mul_div(assets, supply, el).or_panic(env)
}

fn convert_to_assets(env: &Env, shares: u128) -> u128 {
    let supply = share_supply(env);
    if supply == 0 {
        return shares;
    }
    mul_div(shares, expected_liquidity(env), supply).or_panic(env)
}

fn preview_mint(env: &Env, shares: u128) -> u128 {
    let supply = share_supply(env);
    if supply == 0 {
        return shares;
    }
    mul_div_up(shares, expected_liquidity(env), supply).or_panic(env)
}

fn preview_withdraw_shares(env: &Env, gross_assets: u128) -> u128 {
    let supply = share_supply(env);
    let el = expected_liquidity(env);
    if supply == 0 || el == 0 {
        return gross_assets;
    }
    mul_div_up(gross_assets, supply, el).or_panic(env)
}

fn gross_of_fee(env: &Env, net: u128) -> u128 {
    let fee = withdraw_fee(env) as u128;
    mul_div_up(net, PERCENTAGE_FACTOR, PERCENTAGE_FACTOR - fee).or_panic(env)
}

fn net_of_fee(env: &Env, gross: u128) -> u128 {
    let fee = withdraw_fee(env) as u128;
    mul_div(gross, PERCENTAGE_FACTOR - fee, PERCENTAGE_FACTOR).or_panic(env)
}

fn deposit_internal(env: &Env, sender: &Address, receiver: &Address, assets: u128, shares: u128) {
    underlying(env).transfer(
        sender,
        &env.current_contract_address(),
        &i128_amount(env, assets),
    );
    update_base_interest(env, to_i128(assets).or_panic(env), 0, false);
    TokenBase::mint(env, receiver, i128_amount(env, shares));
    Deposit {
        sender: sender.clone(),
        owner: receiver.clone(),
        assets,
        shares,
    }
    .publish(env);
}

fn withdraw_internal(
    env: &Env,
    owner: &Address,
    receiver: &Address,
    gross: u128,
    net: u128,
    shares: u128,
) {
    if shares > share_balance(env, owner) {
        panic_with_error!(env, CreditError::InsufficientBalance);
    }
    if gross > available_liquidity(env) {
        panic_with_error!(env, CreditError::InsufficientLiquidity);
    }
    let delta = -to_i128(gross).or_panic(env);
    update_base_interest(env, delta, delta, false);
    burn_shares(env, owner, shares);

    let token = underlying(env);
    let pool = env.current_contract_address();
    token.transfer(&pool, receiver, &i128_amount(env, net));
    let fee = gross - net;
    if fee > 0 {
        token.transfer(&pool, &read_address(env, &DataKey::Treasury), &i128_amount(env, fee));
    }
    Withdraw {
        owner: owner.clone(),
        receiver: receiver.clone(),
        assets: net,
        shares,
    }
    .publish(env);
}

fn burn_shares(env: &Env, from: &Address, shares: u128) {
    if shares == 0 {
        return;
    }
    let amount = i128_amount(env, shares);
    TokenBase::update(env, Some(from), None, amount);
    emit_burn(env, from, amount);
}
