#![no_std]
use credit_common::reflector::{Asset, PriceData};
use soroban_sdk::{contract, contractimpl, contracttype, Address, Env, Symbol};

#[contracttype]
enum DataKey {
    Decimals,
    Resolution,
    Price(Asset),
}

/// Reflector stand-in with prices set by hand.
#[contract]
pub struct MockReflector;

#[contractimpl]
impl MockReflector {
    pub fn initialize(env: Env, decimals: u32) {
        env.storage().instance().set(&DataKey::Decimals, &decimals);
    }

    /// Price quoted at the current ledger time.
    pub fn set_price(env: Env, asset: Address, price: i128) {
        let timestamp = env.ledger().timestamp();
        Self::set_price_at(env, asset, price, timestamp);
    }

    pub fn set_price_at(env: Env, asset: Address, price: i128, timestamp: u64) {
        env.storage().persistent().set(
            &DataKey::Price(Asset::Stellar(asset)),
            &PriceData { price, timestamp },
        );
    }

    pub fn set_symbol_price(env: Env, symbol: Symbol, price: i128) {
        let timestamp = env.ledger().timestamp();
        env.storage().persistent().set(
            &DataKey::Price(Asset::Other(symbol)),
            &PriceData { price, timestamp },
        );
    }

    pub fn set_resolution(env: Env, resolution: u32) {
        env.storage()
            .instance()
            .set(&DataKey::Resolution, &resolution);
    }

    pub fn decimals(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&DataKey::Decimals)
            .unwrap_or(14)
    }

    pub fn lastprice(env: Env, asset: Asset) -> Option<PriceData> {
        env.storage().persistent().get(&DataKey::Price(asset))
    }

    pub fn resolution(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&DataKey::Resolution)
            .unwrap_or(300)
    }
}
