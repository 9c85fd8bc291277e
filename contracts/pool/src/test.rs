#![cfg(test)]

use crate::{Pool, PoolClient};
use credit_common::constants::{RAY, SECONDS_PER_YEAR};
use interest_rate_model::{LinearInterestRateModel, LinearInterestRateModelClient, RateParams};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token, Address, Env, String,
};

struct Setup<'a> {
    env: Env,
    admin: Address,
    treasury: Address,
    acl: acl::AclClient<'a>,
    pool: PoolClient<'a>,
    token: token::Client<'a>,
    token_admin: token::StellarAssetClient<'a>,
}

fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();
    let admin = Address::generate(&env);
    let treasury = Address::generate(&env);

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

    let token_address = env.register_stellar_asset_contract_v2(admin.clone()).address();
    let pool = PoolClient::new(&env, &env.register(Pool, ()));
    pool.initialize(
        &admin,
        &acl.address,
        &token_address,
        &irm.address,
        &treasury,
        &u128::MAX,
        &String::from_str(&env, "Diesel USD"),
        &String::from_str(&env, "dUSD"),
    );

    Setup {
        token: token::Client::new(&env, &token_address),
        token_admin: token::StellarAssetClient::new(&env, &token_address),
        env,
        admin,
        treasury,
        acl,
        pool,
    }
}

fn lp_deposit(s: &Setup, amount: u128) -> Address {
    let lp = Address::generate(&s.env);
    s.token_admin.mint(&lp, &(amount as i128));
    s.pool.deposit(&lp, &amount, &lp);
    lp
}

fn credit_manager(s: &Setup, limit: u128) -> Address {
    let cm = Address::generate(&s.env);
    s.pool.set_credit_manager_debt_limit(&s.admin, &cm, &limit);
    cm
}

fn jump(env: &Env, seconds: u64) {
    env.ledger().with_mut(|l| l.timestamp += seconds);
}

#[test]
fn test_initialize() {
    let s = setup();
    assert_eq!(s.pool.decimals(), 7);
    assert_eq!(s.pool.symbol(), String::from_str(&s.env, "dUSD"));
    assert_eq!(s.pool.base_interest_index(), RAY);
    assert_eq!(s.pool.expected_liquidity(), 0);
    assert_eq!(s.pool.base_interest_rate(), 0);
    assert_eq!(s.pool.underlying_token(), s.token.address);
}

#[test]
#[should_panic(expected = "Error(Contract, #1)")]
fn test_initialize_twice_fails() {
    let s = setup();
    s.pool.initialize(
        &s.admin,
        &s.acl.address,
        &s.token.address,
        &s.token.address,
        &s.treasury,
        &0,
        &String::from_str(&s.env, "x"),
        &String::from_str(&s.env, "x"),
    );
}

#[test]
fn test_deposit_and_redeem() {
    let s = setup();
    let lp = lp_deposit(&s, 1_000);
    assert_eq!(s.pool.balance(&lp), 1_000);
    assert_eq!(s.pool.total_supply(), 1_000);
    assert_eq!(s.pool.expected_liquidity(), 1_000);
    assert_eq!(s.token.balance(&s.pool.address), 1_000);

    let out = s.pool.redeem(&lp, &400, &lp);
    assert_eq!(out, 400);
    assert_eq!(s.pool.balance(&lp), 600);
    assert_eq!(s.token.balance(&lp), 400);
    assert_eq!(s.pool.expected_liquidity(), 600);
}

#[test]
fn test_withdraw_fee_goes_to_treasury() {
    let s = setup();
    s.pool.set_withdraw_fee(&s.admin, &100);
    let lp = lp_deposit(&s, 1_000);
    assert_eq!(s.pool.preview_redeem(&1_000), 990);
    let out = s.pool.redeem(&lp, &1_000, &lp);
    assert_eq!(out, 990);
    assert_eq!(s.token.balance(&lp), 990);
    assert_eq!(s.token.balance(&s.treasury), 10);
}

#[test]
#[should_panic(expected = "Error(Contract, #3)")]
fn test_withdraw_fee_is_capped() {
    let s = setup();
    s.pool.set_withdraw_fee(&s.admin, &101);
}

#[test]
fn test_lend_accrues_interest_and_repay_mints_profit() {
    let s = setup();
    lp_deposit(&s, 10_000);
    let cm = credit_manager(&s, 5_000);

    s.pool.lend_credit_account(&cm, &1, &5_000);
    assert_eq!(s.token.balance(&cm), 5_000);
    assert_eq!(s.pool.total_borrowed(), 5_000);
    assert_eq!(s.pool.credit_manager_borrowed(&cm), 5_000);
    // 50% utilization is 5/8 of the first slope
    assert_eq!(s.pool.base_interest_rate(), 625 * RAY / 10_000);

    jump(&s.env, SECONDS_PER_YEAR);
    assert_eq!(s.pool.base_interest_index(), RAY + 625 * RAY / 10_000);
    assert_eq!(s.pool.expected_liquidity(), 10_312);

    // principal + interest + 50 of protocol fees
    s.token_admin.mint(&cm, &362);
    s.token.transfer(&cm, &s.pool.address, &5_362);
    s.pool.repay_credit_account(&cm, &5_000, &50, &0);

    assert_eq!(s.pool.total_borrowed(), 0);
    assert_eq!(s.pool.credit_manager_borrowed(&cm), 0);
    assert_eq!(s.pool.expected_liquidity(), 10_362);
    assert_eq!(s.pool.balance(&s.treasury), 48);
    assert_eq!(s.pool.base_interest_rate(), 0);
}

#[test]
fn test_loss_burns_treasury_shares_first() {
    let s = setup();
    let lp = lp_deposit(&s, 10_000);
    s.token_admin.mint(&s.treasury, &100);
    s.pool.deposit(&s.treasury, &100, &s.treasury);
    let cm = credit_manager(&s, 1_000);

    s.pool.lend_credit_account(&cm, &7, &1_000);
    s.token.transfer(&cm, &s.pool.address, &850);
    s.pool.repay_credit_account(&cm, &1_000, &0, &150);

    assert_eq!(s.pool.balance(&s.treasury), 0);
    assert_eq!(s.pool.total_supply(), 10_000);
    assert_eq!(s.pool.expected_liquidity(), 9_950);
    assert_eq!(s.pool.preview_redeem(&(s.pool.balance(&lp) as u128)), 9_950);
}

#[test]
fn test_small_loss_is_covered_by_treasury() {
    let s = setup();
    let lp = lp_deposit(&s, 10_000);
    s.token_admin.mint(&s.treasury, &100);
    s.pool.deposit(&s.treasury, &100, &s.treasury);
    let cm = credit_manager(&s, 1_000);

    s.pool.lend_credit_account(&cm, &7, &1_000);
    s.token.transfer(&cm, &s.pool.address, &960);
    s.pool.repay_credit_account(&cm, &1_000, &0, &40);

    assert_eq!(s.pool.balance(&s.treasury), 60);
    assert_eq!(s.pool.expected_liquidity(), 10_060);
    assert_eq!(s.pool.preview_redeem(&(s.pool.balance(&lp) as u128)), 10_000);
}

#[test]
#[should_panic(expected = "Error(Contract, #22)")]
fn test_lend_above_manager_limit_fails() {
    let s = setup();
    lp_deposit(&s, 10_000);
    let cm = credit_manager(&s, 1_000);
    s.pool.lend_credit_account(&cm, &1, &1_001);
}

#[test]
#[should_panic(expected = "Error(Contract, #22)")]
fn test_lend_above_total_limit_fails() {
    let s = setup();
    lp_deposit(&s, 10_000);
    s.pool.set_total_debt_limit(&s.admin, &500);
    let cm = credit_manager(&s, 1_000);
    s.pool.lend_credit_account(&cm, &1, &600);
}

#[test]
#[should_panic(expected = "Error(Contract, #23)")]
fn test_lend_above_liquidity_fails() {
    let s = setup();
    lp_deposit(&s, 100);
    let cm = credit_manager(&s, 1_000_000);
    s.pool.lend_credit_account(&cm, &1, &200);
}

#[test]
#[should_panic(expected = "Error(Contract, #13)")]
fn test_unregistered_manager_cannot_borrow() {
    let s = setup();
    lp_deposit(&s, 10_000);
    let stranger = Address::generate(&s.env);
    s.pool.lend_credit_account(&stranger, &1, &10);
}

#[test]
fn test_borrowable_is_smallest_limit() {
    let s = setup();
    lp_deposit(&s, 10_000);
    let cm = credit_manager(&s, 4_000);
    assert_eq!(s.pool.credit_manager_borrowable(&cm), 4_000);
    s.pool.set_total_debt_limit(&s.admin, &3_000);
    assert_eq!(s.pool.credit_manager_borrowable(&cm), 3_000);
    s.pool.lend_credit_account(&cm, &1, &2_500);
    assert_eq!(s.pool.credit_manager_borrowable(&cm), 500);
    assert_eq!(s.pool.credit_managers().len(), 1);
}

#[test]
fn test_quota_revenue_accrues_linearly() {
    let s = setup();
    lp_deposit(&s, 10_000);
    let keeper = Address::generate(&s.env);
    s.pool.set_pool_quota_keeper(&s.admin, &keeper);

    s.pool.update_quota_revenue(&keeper, &1_000);
    jump(&s.env, SECONDS_PER_YEAR);
    assert_eq!(s.pool.expected_liquidity(), 11_000);
    assert_eq!(s.pool.supply_rate(), 1_000 * RAY / 11_000);

    s.pool.set_quota_revenue(&keeper, &0);
    assert_eq!(s.pool.expected_liquidity_lu(), 11_000);
    jump(&s.env, SECONDS_PER_YEAR);
    assert_eq!(s.pool.expected_liquidity(), 11_000);

    s.pool.update_quota_revenue(&keeper, &500);
    s.pool.update_quota_revenue(&keeper, &-200);
    assert_eq!(s.pool.quota_revenue(), 300);
}

#[test]
#[should_panic(expected = "Error(Contract, #15)")]
fn test_only_quota_keeper_updates_revenue() {
    let s = setup();
    let keeper = Address::generate(&s.env);
    s.pool.set_pool_quota_keeper(&s.admin, &keeper);
    s.pool.update_quota_revenue(&s.admin, &1);
}

#[test]
#[should_panic(expected = "Error(Contract, #70)")]
fn test_paused_pool_rejects_deposits() {
    let s = setup();
    let guardian = Address::generate(&s.env);
    s.acl.add_pausable_admin(&s.admin, &guardian);
    s.pool.pause(&guardian);
    assert!(s.pool.paused());
    lp_deposit(&s, 10);
}

#[test]
fn test_unpause_requires_unpausable_admin() {
    let s = setup();
    let guardian = Address::generate(&s.env);
    s.acl.add_pausable_admin(&s.admin, &guardian);
    s.acl.add_unpausable_admin(&s.admin, &guardian);
    s.pool.pause(&guardian);
    s.pool.unpause(&guardian);
    assert!(!s.pool.paused());
    lp_deposit(&s, 10);
}

#[test]
#[should_panic(expected = "Error(Contract, #10)")]
fn test_configuration_requires_configurator() {
    let s = setup();
    let stranger = Address::generate(&s.env);
    s.pool.set_total_debt_limit(&stranger, &1);
}

#[test]
fn test_share_token_transfers() {
    let s = setup();
    let lp = lp_deposit(&s, 1_000);
    let other = Address::generate(&s.env);
    s.pool.transfer(&lp, &other, &300);
    assert_eq!(s.pool.balance(&other), 300);

    s.pool.approve(&other, &lp, &100, &1_000);
    assert_eq!(s.pool.allowance(&other, &lp), 100);
    s.pool.transfer_from(&lp, &other, &lp, &100);
    assert_eq!(s.pool.balance(&lp), 800);
    assert_eq!(s.pool.allowance(&other, &lp), 0);
}

#[test]
fn test_mint_and_withdraw_round_up_against_caller() {
    let s = setup();
    lp_deposit(&s, 1_000);
    let cm = credit_manager(&s, 1_000);
    s.pool.lend_credit_account(&cm, &1, &500);
    jump(&s.env, SECONDS_PER_YEAR);
    // share price is now above one
    let el = s.pool.expected_liquidity();
    assert!(el > 1_000);

    let lp = Address::generate(&s.env);
    s.token_admin.mint(&lp, &1_000);
    let paid = s.pool.mint(&lp, &100, &lp);
    assert!(paid * 1_000 >= 100 * el);
    let el_after = s.pool.expected_liquidity();
    let supply = s.pool.total_supply() as u128;
    let burned = s.pool.withdraw(&lp, &50, &lp);
    assert!(burned * el_after >= 50 * supply);
    assert_eq!(s.token.balance(&lp), 1_000 - paid as i128 + 50);
}
