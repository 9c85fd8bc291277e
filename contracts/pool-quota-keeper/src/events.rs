use soroban_sdk::{contractevent, Address};

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddQuotaToken {
    #[topic]
    pub token: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetTokenLimit {
    #[topic]
    pub token: Address,
    pub limit: u128,
}

/// Yearly rate in bps.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetTokenRate {
    #[topic]
    pub token: Address,
    pub rate: u32,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetQuotaIncreaseFee {
    #[topic]
    pub token: Address,
    pub fee: u32,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddCreditManager {
    #[topic]
    pub credit_manager: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UpdateQuota {
    #[topic]
    pub credit_manager: Address,
    #[topic]
    pub token: Address,
    pub credit_account: u32,
    pub quota_change: i128,
}
