#![no_std]
use credit_common::access::bump_instance;
use credit_common::CreditError;
use soroban_sdk::{
    contract, contractevent, contractimpl, contracttype, panic_with_error, Address, Env,
};

#[contracttype]
pub enum DataKey {
    Owner,
    PendingOwner,
    PausableAdmin(Address),
    UnpausableAdmin(Address),
}

#[contract]
pub struct Acl;

/// Emitted when an account may pause protocol contracts.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PausableAdminAdded {
    #[topic]
    pub admin: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PausableAdminRemoved {
    #[topic]
    pub admin: Address,
}

/// Emitted when an account may unpause protocol contracts.
#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnpausableAdminAdded {
    #[topic]
    pub admin: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnpausableAdminRemoved {
    #[topic]
    pub admin: Address,
}

#[contractevent]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnershipTransferred {
    #[topic]
    pub previous: Address,
    #[topic]
    pub owner: Address,
}

#[contractimpl]
impl Acl {
    pub fn initialize(env: Env, owner: Address) {
        if env.storage().instance().has(&DataKey::Owner) {
            panic_with_error!(&env, CreditError::AlreadyInitialized);
        }
        owner.require_auth();
        env.storage().instance().set(&DataKey::Owner, &owner);
        bump_instance(&env);
    }

    /// The owner is the protocol configurator.
    pub fn owner(env: Env) -> Address {
        read_owner(&env)
    }

    pub fn is_configurator(env: Env, account: Address) -> bool {
        bump_instance(&env);
        read_owner(&env) == account
    }

    pub fn is_pausable_admin(env: Env, account: Address) -> bool {
        env.storage()
            .persistent()
            .get(&DataKey::PausableAdmin(account))
            .unwrap_or(false)
    }

    pub fn is_unpausable_admin(env: Env, account: Address) -> bool {
        env.storage()
            .persistent()
            .get(&DataKey::UnpausableAdmin(account))
            .unwrap_or(false)
    }

    pub fn add_pausable_admin(env: Env, caller: Address, admin: Address) {
        require_owner(&env, &caller);
        let key = DataKey::PausableAdmin(admin.clone());
        if !env.storage().persistent().get(&key).unwrap_or(false) {
            env.storage().persistent().set(&key, &true);
            PausableAdminAdded { admin }.publish(&env);
        }
    }

    pub fn remove_pausable_admin(env: Env, caller: Address, admin: Address) {
        require_owner(&env, &caller);
        let key = DataKey::PausableAdmin(admin.clone());
        if env.storage().persistent().has(&key) {
            env.storage().persistent().remove(&key);
            PausableAdminRemoved { admin }.publish(&env);
        }
    }

    pub fn add_unpausable_admin(env: Env, caller: Address, admin: Address) {
        require_owner(&env, &caller);
        let key = DataKey::UnpausableAdmin(admin.clone());
        if !env.storage().persistent().get(&key).unwrap_or(false) {
            env.storage().persistent().set(&key, &true);
            UnpausableAdminAdded { admin }.publish(&env);
        }
    }

    pub fn remove_unpausable_admin(env: Env, caller: Address, admin: Address) {
        require_owner(&env, &caller);
        let key = DataKey::UnpausableAdmin(admin.clone());
        if env.storage().persistent().has(&key) {
            env.storage().persistent().remove(&key);
            UnpausableAdminRemoved { admin }.publish(&env);
        }
    }

    /// First step of a two-step ownership handover.
    pub fn transfer_ownership(env: Env, caller: Address, new_owner: Address) {
        require_owner(&env, &caller);
        env.storage()
            .instance()
            .set(&DataKey::PendingOwner, &new_owner);
    }

    pub fn claim_ownership(env: Env, new_owner: Address) {
        new_owner.require_auth();
        let pending: Option<Address> = env.storage().instance().get(&DataKey::PendingOwner);
        if pending.as_ref() != Some(&new_owner) {
            panic_with_error!(&env, CreditError::CallerNotConfigurator);
        }
        let previous = read_owner(&env);
        env.storage().instance().set(&DataKey::Owner, &new_owner);
        env.storage().instance().remove(&DataKey::PendingOwner);
        OwnershipTransferred {
            previous,
            owner: new_owner,
        }
        .publish(&env);
    }
}

fn read_owner(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::Owner)
        .unwrap_or_else(|| panic_with_error!(env, CreditError::NotInitialized))
}

fn require_owner(env: &Env, caller: &Address) {
    if read_owner(env) != *caller {
        panic_with_error!(env, CreditError::CallerNotConfigurator);
    }
    caller.require_auth();
    bump_instance(env);
}
