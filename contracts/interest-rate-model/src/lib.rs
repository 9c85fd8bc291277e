#![no_std]
use credit_common::access::bump_instance;
use credit_common::constants::{PERCENTAGE_FACTOR, RAY_DIVIDED_BY_PERCENTAGE};
use credit_common::CreditError;
use soroban_sdk::{
    contract, contractevent, contractimpl, contracttype, panic_with_error, Env,
};

#[contracttype]
pub enum DataKey {
    Params,
}

/// Two-kink curve. Utilization points and slopes are in basis points; slopes
/// are the rate increase over their whole segment.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RateParams {
    pub u_1: u32,
    pub u_2: u32,
    pub r_base: u32,
    pub r_slope1: u32,
    pub r_slope2: u32,
    pub r_slope3: u32,
    /// When set, borrowing that pushes utilization to `u_2` or above fails.
    pub borrowing_above_u2_forbidden: bool,
}

#[contract]
pub struct LinearInterestRateModel;

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModelInitialized {
    pub u_1: u32,
    pub u_2: u32,
    pub r_base: u32,
    pub r_slope1: u32,
    pub r_slope2: u32,
    pub r_slope3: u32,
    pub borrowing_above_u2_forbidden: bool,
}

#[contractimpl]
impl LinearInterestRateModel {
    pub fn initialize(env: Env, params: RateParams) {
        if env.storage().instance().has(&DataKey::Params) {
            panic_with_error!(&env, CreditError::AlreadyInitialized);
        }
        let pf = PERCENTAGE_FACTOR as u32;
        if params.u_1 >= pf
            || params.u_2 >= pf
            || params.u_1 > params.u_2
            || params.r_base > pf
            || params.r_slope1 > pf
            || params.r_slope2 > pf
            || params.r_slope1 > params.r_slope2
            || params.r_slope2 > params.r_slope3
        {
            panic_with_error!(&env, CreditError::IncorrectParameter);
        }
        env.storage().instance().set(&DataKey::Params, &params);
        bump_instance(&env);
        ModelInitialized {
            u_1: params.u_1,
            u_2: params.u_2,
            r_base: params.r_base,
            r_slope1: params.r_slope1,
            r_slope2: params.r_slope2,
            r_slope3: params.r_slope3,
            borrowing_above_u2_forbidden: params.borrowing_above_u2_forbidden,
        }
        .publish(&env);
    }

    pub fn params(env: Env) -> RateParams {
        read_params(&env)
    }

    /// Borrow rate in ray per year.
    pub fn calc_borrow_rate(
        env: Env,
        expected_liquidity: u128,
        available_liquidity: u128,
        check_optimal_borrowing: bool,
    ) -> u128 {
        let p = read_params(&env);
        if expected_liquidity <= available_liquidity {
            return RAY_DIVIDED_BY_PERCENTAGE * p.r_base as u128;
        }
        let u = (expected_liquidity - available_liquidity) * PERCENTAGE_FACTOR / expected_liquidity;

        if check_optimal_borrowing && p.borrowing_above_u2_forbidden && u >= p.u_2 as u128 {
            panic_with_error!(&env, CreditError::BorrowingMoreThanU2Forbidden);
        }

        let (u_1, u_2) = (p.u_1 as u128, p.u_2 as u128);
        let bps = if u < u_1 {
            p.r_base as u128 + p.r_slope1 as u128 * u / u_1
        } else if u < u_2 {
            p.r_base as u128 + p.r_slope1 as u128 + p.r_slope2 as u128 * (u - u_1) / (u_2 - u_1)
        } else {
            p.r_base as u128
                + p.r_slope1 as u128
                + p.r_slope2 as u128
                + p.r_slope3 as u128 * (u - u_2) / (PERCENTAGE_FACTOR - u_2)
        };
        RAY_DIVIDED_BY_PERCENTAGE * bps
    }

    /// Liquidity that can be lent without crossing `u_2` when that is
    /// forbidden, otherwise everything available.
    pub fn available_to_borrow(
        env: Env,
        expected_liquidity: u128,
        available_liquidity: u128,
    ) -> u128 {
        let p = read_params(&env);
        if !p.borrowing_above_u2_forbidden {
            return available_liquidity;
        }
        let reserved = expected_liquidity * (PERCENTAGE_FACTOR - p.u_2 as u128) / PERCENTAGE_FACTOR;
        available_liquidity.saturating_sub(reserved)
    }
}

fn read_params(env: &Env) -> RateParams {
    env.storage()
        .instance()
        .get(&DataKey::Params)
        .unwrap_or_else(|| panic_with_error!(env, CreditError::NotInitialized))
}
