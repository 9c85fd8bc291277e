#![no_std]
use credit_common::access::{bump_instance, require_configurator};
use credit_common::constants::{BOT_PERMISSIONS_MASK, TTL_EXTEND_TO, TTL_THRESHOLD};
use credit_common::CreditError;
use soroban_sdk::{contract, contractimpl, contracttype, panic_with_error, Address, Env, Vec};

mod events;
pub use events::*;

#[contracttype]
pub enum DataKey {
    Acl,
    /// credit facade -> credit manager it serves
    ApprovedFacade(Address),
    Permissions(Address, u32, Address),
    ActiveBots(Address, u32),
    Forbidden(Address),
}

/// Registry of bots allowed to run multicalls on behalf of account owners.
/// Permissions are scoped by credit manager so that a handle reused by another
/// manager never inherits them.
#[contract]
pub struct BotList;

#[contractimpl]
impl BotList {
    pub fn initialize(env: Env, caller: Address, acl: Address) {
        if env.storage().instance().has(&DataKey::Acl) {
            panic_with_error!(&env, CreditError::AlreadyInitialized);
        }
        require_configurator(&env, &acl, &caller);
        env.storage().instance().set(&DataKey::Acl, &acl);
        bump_instance(&env);
    }

    /// Lets `credit_facade` manage bots for accounts of `credit_manager`.
    pub fn approve_credit_facade(
        env: Env,
        caller: Address,
        credit_facade: Address,
        credit_manager: Address,
    ) {
        require_configurator(&env, &acl(&env), &caller);
        env.storage().persistent().set(
            &DataKey::ApprovedFacade(credit_facade.clone()),
            &credit_manager,
        );
        ApproveCreditFacade {
            credit_facade,
            credit_manager,
        }
        .publish(&env);
    }

    pub fn revoke_credit_facade(env: Env, caller: Address, credit_facade: Address) {
        require_configurator(&env, &acl(&env), &caller);
        env.storage()
            .persistent()
            .remove(&DataKey::ApprovedFacade(credit_facade.clone()));
        RevokeCreditFacade { credit_facade }.publish(&env);
    }

    /// Forbidden bots keep their stored permissions but report them as unusable.
    pub fn set_bot_forbidden_status(env: Env, caller: Address, bot: Address, forbidden: bool) {
        require_configurator(&env, &acl(&env), &caller);
        let key = DataKey::Forbidden(bot.clone());
        if forbidden {
            env.storage().persistent().set(&key, &true);
        } else {
            env.storage().persistent().remove(&key);
        }
        SetBotForbiddenStatus { bot, forbidden }.publish(&env);
    }

    /// Sets the permissions of `bot` over `credit_account`; zero removes the
    /// bot. Returns how many bots remain active on the account.
    pub fn set_bot_permissions(
        env: Env,
        credit_facade: Address,
        credit_account: u32,
        bot: Address,
        permissions: u64,
    ) -> u32 {
        let credit_manager = facade_manager(&env, &credit_facade);
        if permissions & !BOT_PERMISSIONS_MASK != 0 {
            panic_with_error!(&env, CreditError::IncorrectParameter);
        }
        if permissions != 0 && is_forbidden(&env, &bot) {
            panic_with_error!(&env, CreditError::NotApprovedBot);
        }

        let key = DataKey::Permissions(credit_manager.clone(), credit_account, bot.clone());
        let mut bots = read_active_bots(&env, &credit_manager, credit_account);
        let position = bots.first_index_of(&bot);
        if permissions == 0 {
            env.storage().persistent().remove(&key);
            if let Some(i) = position {
                bots.remove(i);
            }
        } else {
            env.storage().persistent().set(&key, &permissions);
            env.storage()
                .persistent()
                .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
            if position.is_none() {
                bots.push_back(bot.clone());
            }
        }
        write_active_bots(&env, &credit_manager, credit_account, &bots);

        SetBotPermissions {
            credit_manager,
            credit_account,
            bot,
            permissions,
        }
        .publish(&env);
        bots.len()
    }

    /// Called when an account is closed so its next owner starts clean.
    pub fn erase_all_bot_permissions(env: Env, credit_facade: Address, credit_account: u32) {
        let credit_manager = facade_manager(&env, &credit_facade);
        let bots = read_active_bots(&env, &credit_manager, credit_account);
        for bot in bots.iter() {
            env.storage().persistent().remove(&DataKey::Permissions(
                credit_manager.clone(),
                credit_account,
                bot.clone(),
            ));
            SetBotPermissions {
                credit_manager: credit_manager.clone(),
                credit_account,
                bot,
                permissions: 0,
            }
            .publish(&env);
        }
        env.storage()
            .persistent()
            .remove(&DataKey::ActiveBots(credit_manager, credit_account));
    }

    pub fn get_bot_status(
        env: Env,
        credit_manager: Address,
        credit_account: u32,
        bot: Address,
    ) -> (u64, bool) {
        let permissions = env
            .storage()
            .persistent()
            .get(&DataKey::Permissions(credit_manager, credit_account, bot.clone()))
            .unwrap_or(0);
        (permissions, is_forbidden(&env, &bot))
    }

    pub fn active_bots(env: Env, credit_manager: Address, credit_account: u32) -> Vec<Address> {
        read_active_bots(&env, &credit_manager, credit_account)
    }

    pub fn approved_credit_manager(env: Env, credit_facade: Address) -> Option<Address> {
        env.storage()
            .persistent()
            .get(&DataKey::ApprovedFacade(credit_facade))
    }
}

fn acl(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::Acl)
        .unwrap_or_else(|| panic_with_error!(env, CreditError::NotInitialized))
}

fn facade_manager(env: &Env, credit_facade: &Address) -> Address {
    credit_facade.require_auth();
    env.storage()
        .persistent()
        .get(&DataKey::ApprovedFacade(credit_facade.clone()))
        .unwrap_or_else(|| panic_with_error!(env, CreditError::CallerNotCreditFacade))
}

fn is_forbidden(env: &Env, bot: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Forbidden(bot.clone()))
        .unwrap_or(false)
}

fn read_active_bots(env: &Env, credit_manager: &Address, credit_account: u32) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::ActiveBots(credit_manager.clone(), credit_account))
        .unwrap_or_else(|| Vec::new(env))
}

fn write_active_bots(env: &Env, credit_manager: &Address, credit_account: u32, bots: &Vec<Address>) {
    let key = DataKey::ActiveBots(credit_manager.clone(), credit_account);
    if bots.is_empty() {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, bots);
    }
}
