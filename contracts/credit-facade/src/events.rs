use soroban_sdk::{contractevent, Address};

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OpenCreditAccount {
    #[topic]
    pub on_behalf_of: Address,
    #[topic]
    pub caller: Address,
    pub credit_account: u32,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CloseCreditAccount {
    #[topic]
    pub borrower: Address,
    pub credit_account: u32,
    pub to: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LiquidateCreditAccount {
    #[topic]
    pub liquidator: Address,
    pub credit_account: u32,
    pub to: Address,
    pub remaining_funds: u128,
    pub loss: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PartiallyLiquidate {
    #[topic]
    pub liquidator: Address,
    #[topic]
    pub token: Address,
    pub credit_account: u32,
    pub repaid: u128,
    pub seized: u128,
    pub fee: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StartMultiCall {
    #[topic]
    pub caller: Address,
    pub credit_account: u32,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FinishMultiCall {
    pub credit_account: u32,
    pub enabled_tokens_mask: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IncurLossOnLiquidation {
    pub loss: u128,
    pub current_cumulative_loss: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetDebtLimits {
    pub min_debt: u128,
    pub max_debt: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetBlockDebtMultiplier {
    pub multiplier: u32,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetExpirationDate {
    pub expiration_date: u64,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetTokenForbidden {
    #[topic]
    pub token: Address,
    pub forbidden: bool,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetEmergencyLiquidator {
    #[topic]
    pub liquidator: Address,
    pub allowed: bool,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetBotList {
    #[topic]
    pub bot_list: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetCumulativeLossParams {
    pub max_cumulative_loss: u128,
    pub reset: bool,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FacadePaused {
    #[topic]
    pub admin: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FacadeUnpaused {
    #[topic]
    pub admin: Address,
}
