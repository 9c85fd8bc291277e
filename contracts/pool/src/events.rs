use soroban_sdk::{contractevent, Address};

/// LP deposit: `assets` of underlying in, `shares` minted to `owner`.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deposit {
    #[topic]
    pub sender: Address,
    #[topic]
    pub owner: Address,
    pub assets: u128,
    pub shares: u128,
}

/// LP exit: `shares` burned from `owner`, `assets` sent to `receiver`.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Withdraw {
    #[topic]
    pub owner: Address,
    #[topic]
    pub receiver: Address,
    pub assets: u128,
    pub shares: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Borrow {
    #[topic]
    pub credit_manager: Address,
    pub credit_account: u32,
    pub amount: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Repay {
    #[topic]
    pub credit_manager: Address,
    pub borrowed_amount: u128,
    pub profit: u128,
    pub loss: u128,
}

/// Loss that the treasury's shares could not absorb; LPs bear it.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IncurUncoveredLoss {
    #[topic]
    pub credit_manager: Address,
    pub loss: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetInterestRateModel {
    #[topic]
    pub model: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetPoolQuotaKeeper {
    #[topic]
    pub quota_keeper: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetTotalDebtLimit {
    pub limit: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddCreditManager {
    #[topic]
    pub credit_manager: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetCreditManagerDebtLimit {
    #[topic]
    pub credit_manager: Address,
    pub limit: u128,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetWithdrawFee {
    pub fee: u32,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetTreasury {
    #[topic]
    pub treasury: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolPaused {
    #[topic]
    pub admin: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolUnpaused {
    #[topic]
    pub admin: Address,
}
