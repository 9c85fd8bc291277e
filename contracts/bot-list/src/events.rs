use soroban_sdk::{contractevent, Address};

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApproveCreditFacade {
    #[topic]
    pub credit_facade: Address,
    #[topic]
    pub credit_manager: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RevokeCreditFacade {
    #[topic]
    pub credit_facade: Address,
}

/// `permissions == 0` means the bot was removed from the account.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetBotPermissions {
    #[topic]
    pub credit_manager: Address,
    #[topic]
    pub bot: Address,
    pub credit_account: u32,
    pub permissions: u64,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetBotForbiddenStatus {
    #[topic]
    pub bot: Address,
    pub forbidden: bool,
}
