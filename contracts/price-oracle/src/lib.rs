#![no_std]
use credit_common::access::{bump_instance, require_configurator};
use credit_common::constants::{TTL_EXTEND_TO, TTL_THRESHOLD, USD_DECIMALS};
use credit_common::math::{mul_div, pow10};
use credit_common::reflector::{Asset, ReflectorClient};
use credit_common::{CreditError, OrPanic};
use soroban_sdk::{
    contract, contractimpl, contracttype, panic_with_error, token, Address, Env, Symbol, Vec,
};

mod events;
pub use events::*;

/// Staleness window in feed resolutions when none is configured.
const DEFAULT_MAX_AGE_MULTIPLIER: u64 = 2;

#[contracttype]
pub enum DataKey {
    Acl,
    Tokens,
    PriceFeed(Address),
    ReservePriceFeed(Address),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PriceFeedParams {
    pub feed: Address,
    /// Reflector symbol for off-chain assets; `None` quotes the token itself.
    pub symbol: Option<Symbol>,
    /// Seconds; 0 means twice the feed resolution.
    pub staleness_period: u64,
    pub token_decimals: u32,
}

#[contract]
pub struct PriceOracle;

#[contractimpl]
impl PriceOracle {
    pub fn initialize(env: Env, caller: Address, acl: Address) {
        if env.storage().instance().has(&DataKey::Acl) {
            panic_with_error!(&env, CreditError::AlreadyInitialized);
        }
        require_configurator(&env, &acl, &caller);
        env.storage().instance().set(&DataKey::Acl, &acl);
        env.storage()
            .instance()
            .set(&DataKey::Tokens, &Vec::<Address>::new(&env));
        bump_instance(&env);
    }

    pub fn set_price_feed(
        env: Env,
        caller: Address,
        token: Address,
        feed: Address,
        symbol: Option<Symbol>,
        staleness_period: u64,
    ) {
        require_configurator(&env, &acl(&env), &caller);
        let params = feed_params(&env, &token, feed, symbol, staleness_period);
        let key = DataKey::PriceFeed(token.clone());
        if !env.storage().persistent().has(&key) {
            let mut tokens = Self::tokens(env.clone());
            tokens.push_back(token.clone());
            env.storage().instance().set(&DataKey::Tokens, &tokens);
        }
        env.storage().persistent().set(&key, &params);
        SetPriceFeed {
            token,
            feed: params.feed,
            staleness_period,
        }
        .publish(&env);
    }

    /// Second opinion used for safe prices. The main feed must exist.
    pub fn set_reserve_price_feed(
        env: Env,
        caller: Address,
        token: Address,
        feed: Address,
        symbol: Option<Symbol>,
        staleness_period: u64,
    ) {
        require_configurator(&env, &acl(&env), &caller);
        if !env
            .storage()
            .persistent()
            .has(&DataKey::PriceFeed(token.clone()))
        {
            panic_with_error!(&env, CreditError::PriceFeedDoesNotExist);
        }
        let params = feed_params(&env, &token, feed, symbol, staleness_period);
        env.storage()
            .persistent()
            .set(&DataKey::ReservePriceFeed(token.clone()), &params);
        SetReservePriceFeed {
            token,
            feed: params.feed,
            staleness_period,
        }
        .publish(&env);
    }

    pub fn tokens(env: Env) -> Vec<Address> {
        env.storage()
            .instance()
            .get(&DataKey::Tokens)
            .unwrap_or_else(|| Vec::new(&env))
    }

    pub fn price_feed_params(env: Env, token: Address) -> PriceFeedParams {
        main_feed(&env, &token)
    }

    pub fn reserve_price_feed_params(env: Env, token: Address) -> Option<PriceFeedParams> {
        env.storage()
            .persistent()
            .get(&DataKey::ReservePriceFeed(token))
    }

    /// USD price with 8 decimals.
    pub fn get_price(env: Env, token: Address) -> u128 {
        read_price(&env, &token, &main_feed(&env, &token))
    }

    pub fn get_reserve_price(env: Env, token: Address) -> u128 {
        let params = Self::reserve_price_feed_params(env.clone(), token.clone())
            .unwrap_or_else(|| panic_with_error!(&env, CreditError::PriceFeedDoesNotExist));
        read_price(&env, &token, &params)
    }

    /// Lower of the main and reserve prices; the main price alone when no
    /// reserve feed is set.
    pub fn get_safe_price(env: Env, token: Address) -> u128 {
        safe_price(&env, &token)
    }

    pub fn convert_to_usd(env: Env, amount: u128, token: Address) -> u128 {
        let params = main_feed(&env, &token);
        let price = read_price(&env, &token, &params);
        to_usd(&env, amount, price, params.token_decimals)
    }

    pub fn convert_from_usd(env: Env, amount: u128, token: Address) -> u128 {
        let params = main_feed(&env, &token);
        let price = read_price(&env, &token, &params);
        let scale = pow10(params.token_decimals).or_panic(&env);
        mul_div(amount, scale, price).or_panic(&env)
    }

    pub fn convert(env: Env, amount: u128, token_from: Address, token_to: Address) -> u128 {
        let usd = Self::convert_to_usd(env.clone(), amount, token_from);
        Self::convert_from_usd(env, usd, token_to)
    }

    pub fn safe_convert_to_usd(env: Env, amount: u128, token: Address) -> u128 {
        let decimals = main_feed(&env, &token).token_decimals;
        to_usd(&env, amount, safe_price(&env, &token), decimals)
    }
}

fn acl(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::Acl)
        .unwrap_or_else(|| panic_with_error!(env, CreditError::NotInitialized))
}

fn feed_params(
    env: &Env,
    token: &Address,
    feed: Address,
    symbol: Option<Symbol>,
    staleness_period: u64,
) -> PriceFeedParams {
    let token_decimals = token::Client::new(env, token).decimals();
    let params = PriceFeedParams {
        feed,
        symbol,
        staleness_period,
        token_decimals,
    };
    // the feed has to answer before it is accepted
    read_price(env, token, &params);
    params
}

fn main_feed(env: &Env, token: &Address) -> PriceFeedParams {
    let key = DataKey::PriceFeed(token.clone());
    let params = env
        .storage()
        .persistent()
        .get(&key)
        .unwrap_or_else(|| panic_with_error!(env, CreditError::PriceFeedDoesNotExist));
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    params
}

fn safe_price(env: &Env, token: &Address) -> u128 {
    let main = read_price(env, token, &main_feed(env, token));
    let reserve: Option<PriceFeedParams> = env
        .storage()
        .persistent()
        .get(&DataKey::ReservePriceFeed(token.clone()));
    match reserve {
        Some(params) => main.min(read_price(env, token, &params)),
        None => main,
    }
}

/// Reads the feed, rejects stale or non-positive answers and rescales to
/// `USD_DECIMALS`.
fn read_price(env: &Env, token: &Address, params: &PriceFeedParams) -> u128 {
    let client = ReflectorClient::new(env, &params.feed);
    let asset = match &params.symbol {
        Some(symbol) => Asset::Other(symbol.clone()),
        None => Asset::Stellar(token.clone()),
    };
    let Some(data) = client.lastprice(&asset) else {
        panic_with_error!(env, CreditError::IncorrectPrice);
    };
    if data.price <= 0 {
        panic_with_error!(env, CreditError::IncorrectPrice);
    }

    let max_age = if params.staleness_period == 0 {
        (client.resolution() as u64).saturating_mul(DEFAULT_MAX_AGE_MULTIPLIER)
    } else {
        params.staleness_period
    };
    if data.timestamp.saturating_add(max_age) < env.ledger().timestamp() {
        panic_with_error!(env, CreditError::StalePrice);
    }

    let feed_decimals = client.decimals();
    let raw = data.price as u128;
    let price = if feed_decimals >= USD_DECIMALS {
        raw / pow10(feed_decimals - USD_DECIMALS).or_panic(env)
    } else {
        raw.checked_mul(pow10(USD_DECIMALS - feed_decimals).or_panic(env))
            .or_panic(env)
    };
    if price == 0 {
        panic_with_error!(env, CreditError::IncorrectPrice);
    }
    price
}

fn to_usd(env: &Env, amount: u128, price: u128, token_decimals: u32) -> u128 {
    mul_div(amount, price, pow10(token_decimals).or_panic(env)).or_panic(env)
}
