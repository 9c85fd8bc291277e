//! Role checks against the ACL contract, pause flag and reentrancy lock.
//! Every protocol contract stores the ACL address and gates its setters here.

use soroban_sdk::{contracttype, panic_with_error, Address, Env};

use crate::constants::{TTL_EXTEND_TO, TTL_THRESHOLD};
use crate::errors::CreditError;
use crate::interfaces::AclClient;

#[contracttype]
enum GuardKey {
    Paused,
    Entered,
}

pub fn require_configurator(env: &Env, acl: &Address, caller: &Address) {
    caller.require_auth();
    if !AclClient::new(env, acl).is_configurator(caller) {
        panic_with_error!(env, CreditError::CallerNotConfigurator);
    }
}

pub fn require_pausable_admin(env: &Env, acl: &Address, caller: &Address) {
    caller.require_auth();
    if !AclClient::new(env, acl).is_pausable_admin(caller) {
        panic_with_error!(env, CreditError::CallerNotPausableAdmin);
    }
}

pub fn require_unpausable_admin(env: &Env, acl: &Address, caller: &Address) {
    caller.require_auth();
    if !AclClient::new(env, acl).is_unpausable_admin(caller) {
        panic_with_error!(env, CreditError::CallerNotUnpausableAdmin);
    }
}

pub fn is_paused(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&GuardKey::Paused)
        .unwrap_or(false)
}

pub fn set_paused(env: &Env, paused: bool) {
    env.storage().instance().set(&GuardKey::Paused, &paused);
}

pub fn when_not_paused(env: &Env) {
    if is_paused(env) {
        panic_with_error!(env, CreditError::Paused);
    }
}

/// Takes the reentrancy lock. Pair with [`exit`] on the same call path.
pub fn enter(env: &Env) {
    let storage = env.storage().instance();
    if storage.get(&GuardKey::Entered).unwrap_or(false) {
        panic_with_error!(env, CreditError::Reentrancy);
    }
    storage.set(&GuardKey::Entered, &true);
}

pub fn exit(env: &Env) {
    env.storage().instance().set(&GuardKey::Entered, &false);
}

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}
