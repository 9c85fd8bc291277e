use credit_common::constants::{
    ADD_COLLATERAL_PERMISSION, DECREASE_DEBT_PERMISSION, DISABLE_TOKEN_PERMISSION,
    ENABLE_TOKEN_PERMISSION, INCREASE_DEBT_PERMISSION, MAX_QUOTA_MULTIPLIER, PERCENTAGE_FACTOR_U32,
    SET_BOT_PERMISSIONS_PERMISSION, UNDERLYING_TOKEN_MASK, UPDATE_QUOTA_PERMISSION,
    WITHDRAW_COLLATERAL_PERMISSION,
};
use credit_common::interfaces::{BotListClient, CreditManagerClient};
use credit_common::math::checked_add;
use credit_common::types::{ManageDebtAction, MultiCall};
use credit_common::{CreditError, OrPanic, TokenSet};
use soroban_sdk::{panic_with_error, Address, Env, Vec};

use crate::constants::UNLIMITED_PER_BLOCK_MULTIPLIER;
use crate::storage::*;

/// Running state of one batch. The enabled mask is only written back to the
/// credit manager by [`finish`].
pub struct Session {
    pub credit_account: u32,
    /// Pays for collateral added by the batch.
    pub payer: Address,
    pub enabled_tokens_mask: TokenSet,
    pub quoted_tokens_mask: u128,
    pub collateral_hints: Vec<u128>,
    pub min_health_factor: u32,
    pub use_safe_prices: bool,
    pub check_required: bool,
    pub debt_increased: bool,
    /// Debt after the last debt change of the batch, if any.
    pub new_debt: Option<u128>,
}

impl Session {
    pub fn new(
        env: &Env,
        cm: &CreditManagerClient,
        credit_account: u32,
        payer: Address,
        enabled_tokens_mask: u128,
    ) -> Self {
        Session {
            credit_account,
            payer,
            enabled_tokens_mask: TokenSet::from_bits(enabled_tokens_mask),
            quoted_tokens_mask: cm.quoted_tokens_mask(),
            collateral_hints: Vec::new(env),
            min_health_factor: PERCENTAGE_FACTOR_U32,
            use_safe_prices: false,
            check_required: false,
            debt_increased: false,
            new_debt: None,
        }
    }

    pub fn record_increase(&mut self, new_debt: u128) {
        self.new_debt = Some(new_debt);
        self.debt_increased = true;
        self.check_required = true;
    }
}

fn require_permission(env: &Env, permissions: u64, required: u64) {
    if permissions & required == 0 {
        panic_with_error!(env, CreditError::NoPermission);
    }
}

/// Neither the underlying nor a quoted token can be toggled by hand.
fn require_toggleable(env: &Env, session: &Session, mask: u128) {
    if mask == UNDERLYING_TOKEN_MASK {
        panic_with_error!(env, CreditError::IncorrectParameter);
    }
    if mask & session.quoted_tokens_mask != 0 {
        panic_with_error!(env, CreditError::CannotToggleQuotedToken);
    }
}

fn require_not_forbidden(env: &Env, mask: u128) {
    if mask & forbidden_token_mask(env) != 0 {
        panic_with_error!(env, CreditError::ForbiddenToken);
    }
}

/// Fails unless `debt` is zero or within the configured limits.
pub fn check_debt_limits(env: &Env, debt: u128) {
    let limits = debt_limits(env);
    if debt != 0 && (debt < limits.min_debt || debt > limits.max_debt) {
        panic_with_error!(env, CreditError::BorrowAmountOutOfLimits);
    }
}

/// Counts `amount` against the debt that may be taken in this ledger.
pub fn record_borrowing(env: &Env, amount: u128) {
    let multiplier = max_debt_per_block_multiplier(env);
    if multiplier == UNLIMITED_PER_BLOCK_MULTIPLIER {
        return;
    }
    let limit = debt_limits(env)
        .max_debt
        .saturating_mul(multiplier as u128);
    let borrowed = checked_add(borrowed_in_block(env), amount).or_panic(env);
    if borrowed > limit {
        panic_with_error!(env, CreditError::BorrowedBlockLimit);
    }
    write_borrowed_in_block(env, borrowed);
}

/// Runs `calls` in order against the credit manager. Any failure aborts the
/// whole batch.
pub fn execute(
    env: &Env,
    cm: &CreditManagerClient,
    session: &mut Session,
    calls: &Vec<MultiCall>,
    permissions: u64,
) {
    let account = session.credit_account;
    for call in calls.iter() {
        match call {
            MultiCall::AddCollateral(token, amount) => {
                require_permission(env, permissions, ADD_COLLATERAL_PERMISSION);
                let to_enable = cm.add_collateral(&session.payer, &account, &token, &amount);
                session.enabled_tokens_mask = session.enabled_tokens_mask.enable(to_enable);
            }
            MultiCall::IncreaseDebt(amount) => {
                require_permission(env, permissions, INCREASE_DEBT_PERMISSION);
                if is_expired(env) {
                    panic_with_error!(env, CreditError::CreditFacadeExpired);
                }
                record_borrowing(env, amount);
                let (new_debt, to_enable, _) = cm.manage_debt(
                    &account,
                    &amount,
                    &session.enabled_tokens_mask.bits(),
                    &ManageDebtAction::Increase,
                );
                session.enabled_tokens_mask = session.enabled_tokens_mask.enable(to_enable);
                session.record_increase(new_debt);
            }
            MultiCall::DecreaseDebt(amount) => {
                require_permission(env, permissions, DECREASE_DEBT_PERMISSION);
                let (new_debt, _, to_disable) = cm.manage_debt(
                    &account,
                    &amount,
                    &session.enabled_tokens_mask.bits(),
                    &ManageDebtAction::Decrease,
                );
                session.enabled_tokens_mask = session.enabled_tokens_mask.disable(to_disable);
                session.new_debt = Some(new_debt);
            }
            MultiCall::UpdateQuota(token, quota_change, min_quota) => {
                require_permission(env, permissions, UPDATE_QUOTA_PERMISSION);
                if quota_change > 0 {
                    require_not_forbidden(env, cm.token_mask_of(&token));
                }
                let max_quota = debt_limits(env)
                    .max_debt
                    .saturating_mul(MAX_QUOTA_MULTIPLIER);
                let (to_enable, to_disable) =
                    cm.update_quota(&account, &token, &quota_change, &min_quota, &max_quota);
                session.enabled_tokens_mask = session
                    .enabled_tokens_mask
                    .enable_disable(to_enable, to_disable);
                session.check_required = true;
            }
            MultiCall::WithdrawCollateral(token, amount, to) => {
                require_permission(env, permissions, WITHDRAW_COLLATERAL_PERMISSION);
                let to_disable = cm.withdraw_collateral(&account, &token, &amount, &to);
                session.enabled_tokens_mask = session.enabled_tokens_mask.disable(to_disable);
                session.use_safe_prices = true;
                session.check_required = true;
            }
            MultiCall::EnableToken(token) => {
                require_permission(env, permissions, ENABLE_TOKEN_PERMISSION);
                let mask = cm.token_mask_of(&token);
                require_toggleable(env, session, mask);
                require_not_forbidden(env, mask);
                session.enabled_tokens_mask = session.enabled_tokens_mask.enable(mask);
                session.check_required = true;
            }
            MultiCall::DisableToken(token) => {
                require_permission(env, permissions, DISABLE_TOKEN_PERMISSION);
                let mask = cm.token_mask_of(&token);
                require_toggleable(env, session, mask);
                session.enabled_tokens_mask = session.enabled_tokens_mask.disable(mask);
                session.check_required = true;
            }
            MultiCall::SetFullCheckParams(hints, min_health_factor) => {
                if min_health_factor < PERCENTAGE_FACTOR_U32 {
                    panic_with_error!(env, CreditError::CustomHealthFactorTooLow);
                }
                session.collateral_hints = hints;
                session.min_health_factor = min_health_factor;
            }
            MultiCall::SetBotPermissions(bot, bot_permissions) => {
                require_permission(env, permissions, SET_BOT_PERMISSIONS_PERMISSION);
                let bot_list = read_bot_list(env)
                    .unwrap_or_else(|| panic_with_error!(env, CreditError::IncorrectParameter));
                BotListClient::new(env, &bot_list).set_bot_permissions(
                    &env.current_contract_address(),
                    &account,
                    &bot,
                    &bot_permissions,
                );
            }
        }
    }
}

/// Applies the batch policy and commits the mask, running the collateral
/// check unless nothing in the batch could have lowered the health factor.
pub fn finish(env: &Env, cm: &CreditManagerClient, session: Session) -> u128 {
    if let Some(debt) = session.new_debt {
        check_debt_limits(env, debt);
    }

    let mask = session.enabled_tokens_mask.bits();
    let forbidden = mask & forbidden_token_mask(env) != 0;
    if session.debt_increased && forbidden {
        panic_with_error!(env, CreditError::ForbiddenTokensEnabled);
    }

    if session.check_required {
        cm.full_collateral_check(
            &session.credit_account,
            &mask,
            &session.collateral_hints,
            &session.min_health_factor,
            &(session.use_safe_prices || forbidden),
        )
    } else {
        cm.save_enabled_tokens_mask(&session.credit_account, &mask);
        mask
    }
}
