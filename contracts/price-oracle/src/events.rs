use soroban_sdk::{contractevent, Address};

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetPriceFeed {
    #[topic]
    pub token: Address,
    pub feed: Address,
    pub staleness_period: u64,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetReservePriceFeed {
    #[topic]
    pub token: Address,
    pub feed: Address,
    pub staleness_period: u64,
}
