#![cfg(test)]

use super::*;
use bot_list::{BotList, BotListClient};
use credit_common::constants::{
    ADD_COLLATERAL_PERMISSION, DISABLE_TOKEN_PERMISSION, UNDERLYING_TOKEN_MASK,
};
use credit_common::types::{AccountStatus, FeeParams, MultiCall};
use credit_common::CreditError;
use credit_manager::{CreditManager, CreditManagerClient};
use interest_rate_model::{LinearInterestRateModel, LinearInterestRateModelClient, RateParams};
use mock_reflector::{MockReflector, MockReflectorClient};
use pool_quota_keeper::{PoolQuotaKeeper, PoolQuotaKeeperClient};
use price_oracle::{PriceOracle, PriceOracleClient};
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::{token, vec, Address, Env, String, Vec};

const DOLLAR: i128 = 100_000_000_000_000;

struct Setup<'a> {
    env: Env,
    admin: Address,
    borrower: Address,
    acl: acl::AclClient<'a>,
    facade: CreditFacadeClient<'a>,
    cm: CreditManagerClient<'a>,
    pool: pool::PoolClient<'a>,
    keeper: PoolQuotaKeeperClient<'a>,
    bots: BotListClient<'a>,
    feed: MockReflectorClient<'a>,
    underlying: Address,
    token_a: Address,
    token_q: Address,
}

fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().with_mut(|l| {
        l.timestamp = 1_000;
        l.sequence_number = 10;
    });
    let admin = Address::generate(&env);
    let borrower = Address::generate(&env);

    let acl = acl::AclClient::new(&env, &env.register(acl::Acl, ()));
    acl.initialize(&admin);

    let irm = LinearInterestRateModelClient::new(&env, &env.register(LinearInterestRateModel, ()));
    irm.initialize(&RateParams {
        u_1: 8_000,
        u_2: 9_000,
        r_base: 0,
        r_slope1: 1_000,
        r_slope2: 2_000,
        r_slope3: 5_000,
        borrowing_above_u2_forbidden: false,
    });

    let underlying = env.register_stellar_asset_contract_v2(admin.clone()).address();
    let token_a = env.register_stellar_asset_contract_v2(admin.clone()).address();
    let token_q = env.register_stellar_asset_contract_v2(admin.clone()).address();

    let pool = pool::PoolClient::new(&env, &env.register(pool::Pool, ()));
    pool.initialize(
        &admin,
        &acl.address,
        &underlying,
        &irm.address,
        &Address::generate(&env),
        &u128::MAX,
        &String::from_str(&env, "Diesel USD"),
        &String::from_str(&env, "dUSD"),
    );
    let lp = Address::generate(&env);
    token::StellarAssetClient::new(&env, &underlying).mint(&lp, &100_000);
    pool.deposit(&lp, &100_000, &lp);

    let feed = MockReflectorClient::new(&env, &env.register(MockReflector, ()));
    feed.initialize(&14);
    for t in [&underlying, &token_a, &token_q] {
        feed.set_price(t, &DOLLAR);
    }
    let oracle = PriceOracleClient::new(&env, &env.register(PriceOracle, ()));
    oracle.initialize(&admin, &acl.address);
    for t in [&underlying, &token_a, &token_q] {
        oracle.set_price_feed(&admin, t, &feed.address, &None, &0);
    }

    let keeper = PoolQuotaKeeperClient::new(&env, &env.register(PoolQuotaKeeper, ()));
    keeper.initialize(&admin, &acl.address, &pool.address);
    pool.set_pool_quota_keeper(&admin, &keeper.address);
    keeper.add_quota_token(&admin, &token_q);
    keeper.set_token_rate(&admin, &token_q, &1_000);
    keeper.set_token_limit(&admin, &token_q, &1_000_000);

    let cm = CreditManagerClient::new(&env, &env.register(CreditManager, ()));
    cm.initialize(
        &admin,
        &acl.address,
        &pool.address,
        &oracle.address,
        &keeper.address,
    );
    cm.set_fees(
        &admin,
        &FeeParams {
            fee_interest: 1_000,
            fee_liquidation: 150,
            liquidation_discount: 9_600,
            fee_liquidation_expired: 100,
            liquidation_discount_expired: 9_800,
        },
    );
    cm.add_collateral_token(&admin, &token_a, &9_000);
    cm.add_collateral_token(&admin, &token_q, &8_000);
    cm.set_token_quoted(&admin, &token_q);
    keeper.add_credit_manager(&admin, &cm.address);
    pool.set_credit_manager_debt_limit(&admin, &cm.address, &1_000_000);

    let bots = BotListClient::new(&env, &env.register(BotList, ()));
    bots.initialize(&admin, &acl.address);

    let facade = CreditFacadeClient::new(&env, &env.register(CreditFacade, ()));
    facade.initialize(
        &admin,
        &acl.address,
        &cm.address,
        &Some(bots.address.clone()),
        &true,
    );
    facade.set_debt_limits(&admin, &100, &10_000);
    cm.set_credit_facade(&admin, &facade.address);
    bots.approve_credit_facade(&admin, &facade.address, &cm.address);

    Setup {
        env,
        admin,
        borrower,
        acl,
        facade,
        cm,
        pool,
        keeper,
        bots,
        feed,
        underlying,
        token_a,
        token_q,
    }
}

fn mint(s: &Setup, token: &Address, to: &Address, amount: u128) {
    token::StellarAssetClient::new(&s.env, token).mint(to, &(amount as i128));
}

fn balance(s: &Setup, token: &Address, of: &Address) -> i128 {
    token::Client::new(&s.env, token).balance(of)
}

/// Advances time and the ledger sequence, refreshing every price at $1.
fn jump(s: &Setup, seconds: u64) {
    s.env.ledger().with_mut(|l| {
        l.timestamp += seconds;
        l.sequence_number += 1;
    });
    for t in [&s.underlying, &s.token_a, &s.token_q] {
        s.feed.set_price(t, &DOLLAR);
    }
}

/// Opens an account for the borrower with `debt` and `collateral` of token A.
fn open(s: &Setup, debt: u128, collateral: u128) -> u32 {
    mint(s, &s.token_a, &s.borrower, collateral);
    s.facade.open_credit_account(
        &s.borrower,
        &s.borrower,
        &debt,
        &vec![&s.env, MultiCall::AddCollateral(s.token_a.clone(), collateral)],
    )
}

fn no_calls(env: &Env) -> Vec<MultiCall> {
    Vec::new(env)
}

#[test]
fn test_open_with_collateral() {
    let s = setup();
    let id = open(&s, 1_000, 500);
    let mask_a = s.cm.token_mask_of(&s.token_a);

    let info = s.cm.credit_account_info(&id).unwrap();
    assert_eq!(info.debt, 1_000);
    assert_eq!(info.borrower, s.borrower);
    assert_eq!(s.cm.enabled_tokens_mask_of(&id), UNDERLYING_TOKEN_MASK | mask_a);
    assert_eq!(s.cm.balance_of(&id, &s.token_a), 500);
    assert_eq!(s.cm.balance_of(&id, &s.underlying), 1_000);
    assert_eq!(s.pool.credit_manager_borrowed(&s.cm.address), 1_000);
    assert_eq!(s.facade.borrowed_in_block(), 1_000);
}

#[test]
fn test_open_without_debt() {
    let s = setup();
    let id = s
        .facade
        .open_credit_account(&s.borrower, &s.borrower, &0, &no_calls(&s.env));
    assert_eq!(s.cm.credit_account_info(&id).unwrap().debt, 0);
    assert_eq!(s.facade.borrowed_in_block(), 0);
}

#[test]
#[should_panic(expected = "Error(Contract, #20)")]
fn test_open_debt_below_minimum() {
    let s = setup();
    open(&s, 50, 500);
}

#[test]
#[should_panic(expected = "Error(Contract, #20)")]
fn test_open_debt_above_maximum() {
    let s = setup();
    open(&s, 10_001, 5_000);
}

#[test]
#[should_panic(expected = "Error(Contract, #30)")]
fn test_open_needs_collateral() {
    let s = setup();
    s.facade
        .open_credit_account(&s.borrower, &s.borrower, &1_000, &no_calls(&s.env));
}

#[test]
fn test_debt_per_ledger_is_capped() {
    let s = setup();
    s.facade.set_block_debt_multiplier(&s.admin, &1);
    open(&s, 6_000, 2_000);

    mint(&s, &s.token_a, &s.borrower, 2_000);
    let calls = vec![&s.env, MultiCall::AddCollateral(s.token_a.clone(), 2_000)];
    let result = s
        .facade
        .try_open_credit_account(&s.borrower, &s.borrower, &5_000, &calls);
    assert_eq!(result.err(), Some(Ok(CreditError::BorrowedBlockLimit.into())));

    // the cap resets with the next ledger
    jump(&s, 5);
    s.facade
        .open_credit_account(&s.borrower, &s.borrower, &5_000, &calls);
    assert_eq!(s.facade.borrowed_in_block(), 5_000);
}

#[test]
#[should_panic(expected = "Error(Contract, #21)")]
fn test_zero_multiplier_forbids_borrowing() {
    let s = setup();
    s.facade.set_block_debt_multiplier(&s.admin, &0);
    open(&s, 1_000, 500);
}

#[test]
fn test_unlimited_multiplier() {
    let s = setup();
    s.facade
        .set_block_debt_multiplier(&s.admin, &u32::MAX);
    for _ in 0..3 {
        open(&s, 10_000, 2_000);
    }
    assert_eq!(s.facade.borrowed_in_block(), 0);
}

#[test]
#[should_panic(expected = "Error(Contract, #18)")]
fn test_open_cannot_decrease_debt() {
    let s = setup();
    s.facade.open_credit_account(
        &s.borrower,
        &s.borrower,
        &1_000,
        &vec![&s.env, MultiCall::DecreaseDebt(10)],
    );
}

#[test]
fn test_multicall_debt_and_quota() {
    let s = setup();
    let id = open(&s, 1_000, 500);
    let mask_q = s.cm.token_mask_of(&s.token_q);
    mint(&s, &s.token_q, &s.borrower, 300);

    s.facade.multicall(
        &s.borrower,
        &id,
        &vec![
            &s.env,
            MultiCall::IncreaseDebt(500),
            MultiCall::AddCollateral(s.token_q.clone(), 300),
            MultiCall::UpdateQuota(s.token_q.clone(), 300, 0),
        ],
    );
    assert_eq!(s.cm.credit_account_info(&id).unwrap().debt, 1_500);
    assert_eq!(s.keeper.get_quota(&s.cm.address, &id, &s.token_q).0, 300);
    assert_ne!(s.cm.enabled_tokens_mask_of(&id) & mask_q, 0);

    s.facade.multicall(
        &s.borrower,
        &id,
        &vec![
            &s.env,
            MultiCall::UpdateQuota(s.token_q.clone(), i128::MIN, 0),
            MultiCall::DecreaseDebt(500),
        ],
    );
    assert_eq!(s.cm.credit_account_info(&id).unwrap().debt, 1_000);
    assert_eq!(s.cm.enabled_tokens_mask_of(&id) & mask_q, 0);
}

#[test]
#[should_panic(expected = "Error(Contract, #26)")]
fn test_quota_capped_by_max_debt() {
    let s = setup();
    let id = open(&s, 1_000, 500);
    s.facade.multicall(
        &s.borrower,
        &id,
        &vec![&s.env, MultiCall::UpdateQuota(s.token_q.clone(), 20_001, 0)],
    );
}

#[test]
#[should_panic(expected = "Error(Contract, #16)")]
fn test_multicall_by_stranger() {
    let s = setup();
    let id = open(&s, 1_000, 500);
    s.facade.multicall(
        &Address::generate(&s.env),
        &id,
        &vec![&s.env, MultiCall::IncreaseDebt(100)],
    );
}

#[test]
fn test_collateral_only_batch_skips_check() {
    let s = setup();
    let id = open(&s, 1_000, 200);
    s.feed.set_price(&s.token_a, &(DOLLAR / 100));
    assert!(s.cm.is_liquidatable(&id, &10_000));

    mint(&s, &s.token_a, &s.borrower, 1);
    s.facade.multicall(
        &s.borrower,
        &id,
        &vec![
            &s.env,
            MultiCall::AddCollateral(s.token_a.clone(), 1),
            MultiCall::DecreaseDebt(100),
        ],
    );
    assert_eq!(s.cm.credit_account_info(&id).unwrap().debt, 900);

    let result = s.facade.try_multicall(
        &s.borrower,
        &id,
        &vec![
            &s.env,
            MultiCall::WithdrawCollateral(s.token_a.clone(), 1, s.borrower.clone()),
        ],
    );
    assert_eq!(result.err(), Some(Ok(CreditError::NotEnoughCollateral.into())));
    assert_eq!(s.cm.balance_of(&id, &s.token_a), 201);
}

#[test]
fn test_failed_batch_changes_nothing() {
    let s = setup();
    let id = open(&s, 1_000, 200);
    mint(&s, &s.token_a, &s.borrower, 50);

    let result = s.facade.try_multicall(
        &s.borrower,
        &id,
        &vec![
            &s.env,
            MultiCall::AddCollateral(s.token_a.clone(), 50),
            MultiCall::WithdrawCollateral(s.underlying.clone(), 1_000, s.borrower.clone()),
        ],
    );
    assert_eq!(result.err(), Some(Ok(CreditError::NotEnoughCollateral.into())));
    assert_eq!(s.cm.balance_of(&id, &s.token_a), 200);
    assert_eq!(s.cm.balance_of(&id, &s.underlying), 1_000);
    assert_eq!(balance(&s, &s.token_a, &s.borrower), 50);
}

#[test]
#[should_panic(expected = "Error(Contract, #31)")]
fn test_custom_health_factor_below_one() {
    let s = setup();
    let id = open(&s, 1_000, 200);
    s.facade.multicall(
        &s.borrower,
        &id,
        &vec![&s.env, MultiCall::SetFullCheckParams(Vec::new(&s.env), 9_999)],
    );
}

#[test]
#[should_panic(expected = "Error(Contract, #30)")]
fn test_custom_health_factor_enforced() {
    let s = setup();
    // health factor is about 1.125
    let id = open(&s, 1_000, 200);
    s.facade.multicall(
        &s.borrower,
        &id,
        &vec![
            &s.env,
            MultiCall::SetFullCheckParams(Vec::new(&s.env), 12_000),
            MultiCall::EnableToken(s.token_a.clone()),
        ],
    );
}

#[test]
fn test_disable_token() {
    let s = setup();
    let id = s
        .facade
        .open_credit_account(&s.borrower, &s.borrower, &0, &no_calls(&s.env));
    let mask_a = s.cm.token_mask_of(&s.token_a);

    mint(&s, &s.token_a, &s.borrower, 10);
    s.facade.multicall(
        &s.borrower,
        &id,
        &vec![&s.env, MultiCall::AddCollateral(s.token_a.clone(), 10)],
    );
    assert_eq!(s.cm.enabled_tokens_mask_of(&id), UNDERLYING_TOKEN_MASK | mask_a);

    s.facade.multicall(
        &s.borrower,
        &id,
        &vec![&s.env, MultiCall::DisableToken(s.token_a.clone())],
    );
    assert_eq!(s.cm.enabled_tokens_mask_of(&id), UNDERLYING_TOKEN_MASK);
    assert_eq!(s.cm.balance_of(&id, &s.token_a), 10);
}

#[test]
#[should_panic(expected = "Error(Contract, #61)")]
fn test_quoted_token_cannot_be_toggled() {
    let s = setup();
    let id = open(&s, 1_000, 500);
    s.facade.multicall(
        &s.borrower,
        &id,
        &vec![&s.env, MultiCall::EnableToken(s.token_q.clone())],
    );
}

#[test]
#[should_panic(expected = "Error(Contract, #65)")]
fn test_forbidden_token_cannot_be_enabled() {
    let s = setup();
    let id = open(&s, 1_000, 500);
    s.facade.set_token_forbidden(&s.admin, &s.token_a, &true);
    s.facade.multicall(
        &s.borrower,
        &id,
        &vec![&s.env, MultiCall::EnableToken(s.token_a.clone())],
    );
}

#[test]
#[should_panic(expected = "Error(Contract, #3)")]
fn test_underlying_cannot_be_disabled() {
    let s = setup();
    let id = open(&s, 1_000, 2_000);
    s.facade.multicall(
        &s.borrower,
        &id,
        &vec![&s.env, MultiCall::DisableToken(s.underlying.clone())],
    );
}

#[test]
fn test_bot_cannot_disable_underlying() {
    let s = setup();
    let id = open(&s, 1_000, 2_000);
    let bot = Address::generate(&s.env);
    s.facade.multicall(
        &s.borrower,
        &id,
        &vec![
            &s.env,
            MultiCall::SetBotPermissions(bot.clone(), DISABLE_TOKEN_PERMISSION),
        ],
    );

    let result = s.facade.try_bot_multicall(
        &bot,
        &id,
        &vec![&s.env, MultiCall::DisableToken(s.underlying.clone())],
    );
    assert_eq!(result.err(), Some(Ok(CreditError::IncorrectParameter.into())));
    let mask_a = s.cm.token_mask_of(&s.token_a);
    assert_eq!(s.cm.enabled_tokens_mask_of(&id), UNDERLYING_TOKEN_MASK | mask_a);

    // token A at half price still leaves the account healthy
    s.feed.set_price(&s.token_a, &(DOLLAR / 2));
    let liquidator = Address::generate(&s.env);
    let result = s
        .facade
        .try_liquidate_credit_account(&liquidator, &id, &liquidator, &0);
    assert_eq!(
        result.err(),
        Some(Ok(CreditError::CreditAccountNotLiquidatable.into()))
    );
}

#[test]
#[should_panic(expected = "Error(Contract, #64)")]
fn test_no_debt_increase_with_forbidden_token() {
    let s = setup();
    let id = open(&s, 1_000, 500);
    s.facade.set_token_forbidden(&s.admin, &s.token_a, &true);
    assert_eq!(s.facade.forbidden_token_mask(), s.cm.token_mask_of(&s.token_a));
    s.facade.multicall(
        &s.borrower,
        &id,
        &vec![&s.env, MultiCall::IncreaseDebt(100)],
    );
}

#[test]
fn test_bot_multicall() {
    let s = setup();
    let id = open(&s, 1_000, 500);
    let bot = Address::generate(&s.env);
    s.facade.multicall(
        &s.borrower,
        &id,
        &vec![
            &s.env,
            MultiCall::SetBotPermissions(bot.clone(), ADD_COLLATERAL_PERMISSION),
        ],
    );
    assert_eq!(
        s.bots.get_bot_status(&s.cm.address, &id, &bot),
        (ADD_COLLATERAL_PERMISSION, false)
    );

    mint(&s, &s.token_a, &bot, 10);
    s.facade.bot_multicall(
        &bot,
        &id,
        &vec![&s.env, MultiCall::AddCollateral(s.token_a.clone(), 10)],
    );
    assert_eq!(s.cm.balance_of(&id, &s.token_a), 510);
    assert_eq!(balance(&s, &s.token_a, &bot), 0);
}

#[test]
#[should_panic(expected = "Error(Contract, #18)")]
fn test_bot_limited_to_granted_permissions() {
    let s = setup();
    let id = open(&s, 1_000, 500);
    let bot = Address::generate(&s.env);
    s.facade.multicall(
        &s.borrower,
        &id,
        &vec![
            &s.env,
            MultiCall::SetBotPermissions(bot.clone(), ADD_COLLATERAL_PERMISSION),
        ],
    );
    s.facade
        .bot_multicall(&bot, &id, &vec![&s.env, MultiCall::IncreaseDebt(100)]);
}

#[test]
#[should_panic(expected = "Error(Contract, #17)")]
fn test_unknown_bot() {
    let s = setup();
    let id = open(&s, 1_000, 500);
    s.facade.bot_multicall(
        &Address::generate(&s.env),
        &id,
        &vec![&s.env, MultiCall::DecreaseDebt(100)],
    );
}

#[test]
#[should_panic(expected = "Error(Contract, #17)")]
fn test_forbidden_bot() {
    let s = setup();
    let id = open(&s, 1_000, 500);
    let bot = Address::generate(&s.env);
    s.facade.multicall(
        &s.borrower,
        &id,
        &vec![
            &s.env,
            MultiCall::SetBotPermissions(bot.clone(), ADD_COLLATERAL_PERMISSION),
        ],
    );
    s.bots.set_bot_forbidden_status(&s.admin, &bot, &true);
    s.facade
        .bot_multicall(&bot, &id, &no_calls(&s.env));
}

#[test]
fn test_close_account() {
    let s = setup();
    let id = open(&s, 1_000, 200);
    let bot = Address::generate(&s.env);
    s.facade.multicall(
        &s.borrower,
        &id,
        &vec![
            &s.env,
            MultiCall::SetBotPermissions(bot.clone(), ADD_COLLATERAL_PERMISSION),
        ],
    );
    jump(&s, 86_400);
    mint(&s, &s.underlying, &s.borrower, 100);

    let to = Address::generate(&s.env);
    s.facade
        .close_credit_account(&s.borrower, &id, &to, &0, &no_calls(&s.env));

    assert_eq!(s.pool.credit_manager_borrowed(&s.cm.address), 0);
    assert_eq!(balance(&s, &s.token_a, &to), 200);
    assert_eq!(
        s.cm.credit_account_info(&id).unwrap().status,
        AccountStatus::Closed
    );
    assert!(s.bots.active_bots(&s.cm.address, &id).is_empty());
}

#[test]
fn test_close_after_repaying_in_batch() {
    let s = setup();
    let id = open(&s, 1_000, 200);
    jump(&s, 86_400);
    mint(&s, &s.underlying, &s.borrower, 100);

    let to = Address::generate(&s.env);
    s.facade.close_credit_account(
        &s.borrower,
        &id,
        &to,
        &0,
        &vec![
            &s.env,
            MultiCall::AddCollateral(s.underlying.clone(), 100),
            MultiCall::DecreaseDebt(u128::MAX),
        ],
    );
    assert_eq!(s.pool.credit_manager_borrowed(&s.cm.address), 0);
    assert_eq!(balance(&s, &s.underlying, &s.borrower), 0);
    // what was not needed for the debt goes to the recipient
    assert!(balance(&s, &s.underlying, &to) > 0);
    assert_eq!(balance(&s, &s.underlying, &s.cm.address), 0);
}

#[test]
#[should_panic(expected = "Error(Contract, #18)")]
fn test_close_cannot_increase_debt() {
    let s = setup();
    let id = open(&s, 1_000, 200);
    s.facade.close_credit_account(
        &s.borrower,
        &id,
        &s.borrower,
        &0,
        &vec![&s.env, MultiCall::IncreaseDebt(100)],
    );
}

#[test]
#[should_panic(expected = "Error(Contract, #16)")]
fn test_close_by_stranger() {
    let s = setup();
    let id = open(&s, 1_000, 200);
    let stranger = Address::generate(&s.env);
    s.facade
        .close_credit_account(&stranger, &id, &stranger, &0, &no_calls(&s.env));
}

/// Account with debt 1_000, 1_000 underlying and 300 of token A whose LT is
/// lowered until the account is just below a health factor of one.
fn unhealthy_account(s: &Setup) -> u32 {
    let id = open(s, 1_000, 300);
    s.cm.set_liquidation_threshold(&s.admin, &s.token_a, &1_000);
    assert!(s.cm.is_liquidatable(&id, &10_000));
    id
}

#[test]
fn test_liquidation_returns_remaining_funds() {
    let s = setup();
    let id = unhealthy_account(&s);
    let liquidator = Address::generate(&s.env);
    mint(&s, &s.underlying, &liquidator, 1_000);

    let (remaining, loss) = s
        .facade
        .liquidate_credit_account(&liquidator, &id, &liquidator, &0);
    // value 1_300 buys 1_248; the pool takes 1_000 + 19
    assert_eq!((remaining, loss), (229, 0));
    assert_eq!(balance(&s, &s.underlying, &s.borrower), 229);
    assert_eq!(balance(&s, &s.underlying, &liquidator), 1_000 - 248);
    assert_eq!(balance(&s, &s.token_a, &liquidator), 300);
    assert_eq!(
        s.cm.credit_account_info(&id).unwrap().status,
        AccountStatus::Liquidated
    );
    assert_eq!(s.facade.max_debt_per_block_multiplier(), 2);
    assert!(!s.facade.paused());
}

#[test]
fn test_liquidation_loss_pauses_facade() {
    let s = setup();
    let id = open(&s, 1_000, 200);
    s.feed.set_price(&s.token_a, &(DOLLAR / 100));
    let liquidator = Address::generate(&s.env);

    let (remaining, loss) = s
        .facade
        .liquidate_credit_account(&liquidator, &id, &liquidator, &0);
    assert_eq!((remaining, loss), (0, 39));
    assert_eq!(s.facade.max_debt_per_block_multiplier(), 0);
    assert_eq!(s.facade.loss_params().current_cumulative_loss, 39);
    assert!(s.facade.paused());
}

#[test]
fn test_loss_below_cap_stops_borrowing_only() {
    let s = setup();
    s.facade
        .set_cumulative_loss_params(&s.admin, &1_000, &false);
    let id = open(&s, 1_000, 200);
    s.feed.set_price(&s.token_a, &(DOLLAR / 100));
    let liquidator = Address::generate(&s.env);
    s.facade
        .liquidate_credit_account(&liquidator, &id, &liquidator, &0);
    assert!(!s.facade.paused());

    jump(&s, 5);
    mint(&s, &s.token_a, &s.borrower, 500);
    let result = s.facade.try_open_credit_account(
        &s.borrower,
        &s.borrower,
        &1_000,
        &vec![&s.env, MultiCall::AddCollateral(s.token_a.clone(), 500)],
    );
    assert_eq!(result.err(), Some(Ok(CreditError::BorrowedBlockLimit.into())));

    s.facade
        .set_cumulative_loss_params(&s.admin, &1_000, &true);
    assert_eq!(s.facade.loss_params().current_cumulative_loss, 0);
}

#[test]
#[should_panic(expected = "Error(Contract, #50)")]
fn test_healthy_account_not_liquidatable() {
    let s = setup();
    let id = open(&s, 1_000, 500);
    let liquidator = Address::generate(&s.env);
    s.facade
        .liquidate_credit_account(&liquidator, &id, &liquidator, &0);
}

#[test]
fn test_expired_account_liquidation() {
    let s = setup();
    s.facade.set_expiration_date(&s.admin, &1_100);
    let id = open(&s, 1_000, 300);
    jump(&s, 100);
    assert!(!s.cm.is_liquidatable(&id, &10_000));

    let liquidator = Address::generate(&s.env);
    mint(&s, &s.underlying, &liquidator, 1_000);
    let (remaining, loss) = s
        .facade
        .liquidate_credit_account(&liquidator, &id, &liquidator, &0);
    // value 1_300 at the expired discount buys 1_274; the pool takes 1_013
    // plus whatever interest accrued
    assert_eq!(loss, 0);
    assert!((259..=261).contains(&remaining));
}

#[test]
#[should_panic(expected = "Error(Contract, #71)")]
fn test_no_opening_after_expiration() {
    let s = setup();
    s.facade.set_expiration_date(&s.admin, &1_100);
    jump(&s, 100);
    open(&s, 1_000, 500);
}

#[test]
#[should_panic(expected = "Error(Contract, #71)")]
fn test_no_borrowing_after_expiration() {
    let s = setup();
    s.facade.set_expiration_date(&s.admin, &1_100);
    let id = open(&s, 1_000, 500);
    jump(&s, 200);
    s.facade
        .multicall(&s.borrower, &id, &vec![&s.env, MultiCall::IncreaseDebt(100)]);
}

#[test]
#[should_panic(expected = "Error(Contract, #72)")]
fn test_expiration_needs_expirable_facade() {
    let s = setup();
    let other = CreditFacadeClient::new(&s.env, &s.env.register(CreditFacade, ()));
    other.initialize(&s.admin, &s.acl.address, &s.cm.address, &None, &false);
    other.set_expiration_date(&s.admin, &5_000);
}

#[test]
#[should_panic(expected = "Error(Contract, #70)")]
fn test_paused_facade_rejects_users() {
    let s = setup();
    s.acl.add_pausable_admin(&s.admin, &s.admin);
    s.facade.pause(&s.admin);
    open(&s, 1_000, 500);
}

#[test]
#[should_panic(expected = "Error(Contract, #70)")]
fn test_paused_facade_rejects_liquidators() {
    let s = setup();
    let id = unhealthy_account(&s);
    s.acl.add_pausable_admin(&s.admin, &s.admin);
    s.facade.pause(&s.admin);
    let liquidator = Address::generate(&s.env);
    s.facade
        .liquidate_credit_account(&liquidator, &id, &liquidator, &0);
}

#[test]
fn test_emergency_liquidator_while_paused() {
    let s = setup();
    let id = unhealthy_account(&s);
    s.acl.add_pausable_admin(&s.admin, &s.admin);
    s.acl.add_unpausable_admin(&s.admin, &s.admin);
    s.facade.pause(&s.admin);

    let liquidator = Address::generate(&s.env);
    s.facade
        .set_emergency_liquidator(&s.admin, &liquidator, &true);
    assert!(s.facade.is_emergency_liquidator(&liquidator));
    mint(&s, &s.underlying, &liquidator, 1_000);
    s.facade
        .liquidate_credit_account(&liquidator, &id, &liquidator, &0);

    s.facade.unpause(&s.admin);
    assert!(!s.facade.paused());
}

/// Debt 1_000 backed only by 1_500 of token A at an LT of 60%.
fn account_backed_by_token(s: &Setup) -> u32 {
    let id = open(s, 1_000, 1_500);
    s.facade.multicall(
        &s.borrower,
        &id,
        &vec![
            &s.env,
            MultiCall::WithdrawCollateral(s.underlying.clone(), u128::MAX, s.borrower.clone()),
        ],
    );
    s.cm.set_liquidation_threshold(&s.admin, &s.token_a, &6_000);
    assert!(s.cm.is_liquidatable(&id, &10_000));
    id
}

#[test]
fn test_partial_liquidation() {
    let s = setup();
    let id = account_backed_by_token(&s);
    let liquidator = Address::generate(&s.env);
    mint(&s, &s.underlying, &liquidator, 500);

    let seized = s.facade.partially_liquidate(
        &liquidator,
        &id,
        &s.token_a,
        &500,
        &500,
        &liquidator,
    );
    // 500 / 96% of token A; 7 of the 500 is the liquidation fee
    assert_eq!(seized, 520);
    assert_eq!(balance(&s, &s.token_a, &liquidator), 520);
    assert_eq!(balance(&s, &s.underlying, &liquidator), 0);
    assert_eq!(balance(&s, &s.underlying, &s.pool.treasury()), 7);
    assert_eq!(s.cm.credit_account_info(&id).unwrap().debt, 507);
    assert_eq!(s.cm.balance_of(&id, &s.token_a), 980);
    assert!(!s.cm.is_liquidatable(&id, &10_000));
}

#[test]
#[should_panic(expected = "Error(Contract, #52)")]
fn test_partial_liquidation_min_seized() {
    let s = setup();
    let id = account_backed_by_token(&s);
    let liquidator = Address::generate(&s.env);
    mint(&s, &s.underlying, &liquidator, 500);
    s.facade.partially_liquidate(
        &liquidator,
        &id,
        &s.token_a,
        &500,
        &600,
        &liquidator,
    );
}

#[test]
#[should_panic(expected = "Error(Contract, #51)")]
fn test_partial_liquidation_must_restore_health() {
    let s = setup();
    let id = account_backed_by_token(&s);
    let liquidator = Address::generate(&s.env);
    mint(&s, &s.underlying, &liquidator, 100);
    s.facade.partially_liquidate(
        &liquidator,
        &id,
        &s.token_a,
        &100,
        &0,
        &liquidator,
    );
}

#[test]
#[should_panic(expected = "Error(Contract, #50)")]
fn test_partial_liquidation_of_healthy_account() {
    let s = setup();
    let id = open(&s, 1_000, 500);
    let liquidator = Address::generate(&s.env);
    mint(&s, &s.underlying, &liquidator, 100);
    s.facade.partially_liquidate(
        &liquidator,
        &id,
        &s.token_a,
        &100,
        &0,
        &liquidator,
    );
}

#[test]
#[should_panic(expected = "Error(Contract, #51)")]
fn test_partial_liquidation_uses_safe_prices_with_forbidden_tokens() {
    let s = setup();
    let id = account_backed_by_token(&s);
    s.facade.set_token_forbidden(&s.admin, &s.token_a, &true);

    let reserve = MockReflectorClient::new(&s.env, &s.env.register(MockReflector, ()));
    reserve.initialize(&14);
    reserve.set_price(&s.token_a, &(DOLLAR / 2));
    PriceOracleClient::new(&s.env, &s.cm.price_oracle())
        .set_reserve_price_feed(&s.admin, &s.token_a, &reserve.address, &None, &0);

    // healthy afterwards at the main price, not at the safe one
    let liquidator = Address::generate(&s.env);
    mint(&s, &s.underlying, &liquidator, 500);
    s.facade.partially_liquidate(
        &liquidator,
        &id,
        &s.token_a,
        &500,
        &0,
        &liquidator,
    );
}

#[test]
fn test_account_debts_match_pool() {
    let s = setup();
    let first = open(&s, 1_000, 500);
    let second = open(&s, 2_000, 800);
    let third = open(&s, 1_000, 300);
    jump(&s, 3_600);

    s.facade
        .multicall(&s.borrower, &first, &vec![&s.env, MultiCall::IncreaseDebt(700)]);
    s.facade
        .multicall(&s.borrower, &second, &vec![&s.env, MultiCall::DecreaseDebt(300)]);
    s.cm.set_liquidation_threshold(&s.admin, &s.token_a, &1_000);
    let liquidator = Address::generate(&s.env);
    mint(&s, &s.underlying, &liquidator, 2_000);
    s.facade
        .liquidate_credit_account(&liquidator, &third, &liquidator, &0);

    let total: u128 = s
        .cm
        .credit_accounts()
        .iter()
        .map(|id| s.cm.credit_account_info(&id).unwrap().debt)
        .sum();
    assert_eq!(total, s.pool.credit_manager_borrowed(&s.cm.address));
    assert_eq!(s.cm.credit_accounts_len(), 2);
}
