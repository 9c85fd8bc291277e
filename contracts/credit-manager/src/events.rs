use credit_common::types::{ClosureAction, FeeParams};
use soroban_sdk::{contractevent, Address};

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OpenCreditAccount {
    #[topic]
    pub borrower: Address,
    pub credit_account: u32,
    pub debt: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CloseCreditAccount {
    #[topic]
    pub borrower: Address,
    pub credit_account: u32,
    pub action: ClosureAction,
    pub remaining_funds: u128,
    pub loss: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IncreaseDebt {
    pub credit_account: u32,
    pub amount: u128,
    pub new_debt: u128,
}

/// `amount` is what left the account, interest and fees included.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecreaseDebt {
    pub credit_account: u32,
    pub amount: u128,
    pub new_debt: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddCollateral {
    #[topic]
    pub token: Address,
    pub credit_account: u32,
    pub amount: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawCollateral {
    #[topic]
    pub token: Address,
    #[topic]
    pub to: Address,
    pub credit_account: u32,
    pub amount: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetCreditFacade {
    #[topic]
    pub credit_facade: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetPriceOracle {
    #[topic]
    pub price_oracle: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetFees {
    pub fees: FeeParams,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddCollateralToken {
    #[topic]
    pub token: Address,
    pub mask: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetLiquidationThreshold {
    #[topic]
    pub token: Address,
    pub liquidation_threshold: u32,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RampLiquidationThreshold {
    #[topic]
    pub token: Address,
    pub lt_initial: u32,
    pub lt_final: u32,
    pub timestamp_ramp_start: u64,
    pub ramp_duration: u64,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetQuotedToken {
    #[topic]
    pub token: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetMaxEnabledTokens {
    pub max_enabled_tokens: u32,
}
