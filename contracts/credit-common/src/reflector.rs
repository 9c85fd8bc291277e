//! Subset of the Reflector (SEP-40) price feed interface the oracle reads.

use soroban_sdk::{contracttype, Address, Env, Symbol};

#[soroban_sdk::contractclient(name = "ReflectorClient")]
pub trait Reflector {
    fn decimals(e: Env) -> u32;
    fn lastprice(e: Env, asset: Asset) -> Option<PriceData>;
    /// Seconds between feed updates.
    fn resolution(e: Env) -> u32;
}

#[contracttype(export = false)]
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Asset {
    Stellar(Address),
    Other(Symbol),
}

#[contracttype(export = false)]
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct PriceData {
    pub price: i128,
    pub timestamp: u64,
}
