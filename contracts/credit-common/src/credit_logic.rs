//! Debt accounting shared by the pool, the quota keeper and the credit manager.
//!
//! Interest owed by a borrower is always rounded up, amounts credited to a
//! borrower are rounded down.

use crate::constants::{
    INDEX_PRECISION, PERCENTAGE_FACTOR, RAY, RAY_DIVIDED_BY_PERCENTAGE, SECONDS_PER_YEAR,
};
use crate::errors::CreditError;
use crate::math::{
    checked_add, checked_sub, mul_div, mul_div_up, percent_mul, percent_mul_up, to_u128, U256,
};
use crate::types::CollateralDebtData;

/// Base interest accrued on `amount` between two index values.
pub fn calc_accrued_interest(
    amount: u128,
    index_last_update: u128,
    index_now: u128,
) -> Result<u128, CreditError> {
    if amount == 0 || index_last_update == 0 {
        return Ok(0);
    }
    let grown = mul_div_up(amount, index_now, index_last_update)?;
    Ok(grown.saturating_sub(amount))
}

/// Protocol fee on interest: the fee on base interest, the fee on quota
/// interest, and quota increase fees not yet repaid.
pub fn calc_accrued_fees(
    accrued_interest: u128,
    cumulative_quota_interest: u128,
    quota_fees: u128,
    fee_interest: u32,
) -> Result<u128, CreditError> {
    let base_fee = percent_mul_up(accrued_interest, fee_interest)?;
    let quota_fee = percent_mul_up(cumulative_quota_interest, fee_interest)?;
    checked_add(checked_add(base_fee, quota_fee)?, quota_fees)
}

pub fn calc_total_debt(data: &CollateralDebtData) -> Result<u128, CreditError> {
    let with_interest = checked_add(
        checked_add(data.debt, data.accrued_interest)?,
        data.cumulative_quota_interest,
    )?;
    checked_add(with_interest, data.accrued_fees)
}

/// Principal plus interest, without protocol fees.
pub fn calc_debt_with_interest(data: &CollateralDebtData) -> Result<u128, CreditError> {
    checked_add(
        checked_add(data.debt, data.accrued_interest)?,
        data.cumulative_quota_interest,
    )
}

/// New principal and index after borrowing `amount` more.
///
/// The index is chosen so that interest accrued before the call stays the
/// same afterwards:
///
/// `new_debt * index_now / new_index - new_debt == debt * index_now / index_lu - debt`
///
/// which gives `new_index = index_now * new_debt / (debt * index_now / index_lu + amount)`.
/// The inner quotient is rounded up and the outer one down, so the folded
/// interest can only grow by rounding, never shrink.
pub fn calc_increase(
    amount: u128,
    debt: u128,
    index_now: u128,
    index_last_update: u128,
) -> Result<(u128, u128), CreditError> {
    if debt == 0 || index_last_update == 0 {
        return Ok((amount, index_now));
    }
    let new_debt = checked_add(debt, amount)?;
    let precision = U256::from(INDEX_PRECISION);
    let index_now_w = U256::from(index_now);

    let scaled_debt = precision
        .checked_mul(index_now_w)
        .and_then(|v| v.checked_mul(U256::from(debt)))
        .ok_or(CreditError::MathOverflow)?;
    let lu = U256::from(index_last_update);
    let mut folded = scaled_debt / lu;
    if !(scaled_debt % lu).is_zero() {
        folded += U256::one();
    }
    let denominator = folded
        .checked_add(precision * U256::from(amount))
        .ok_or(CreditError::MathOverflow)?;
    let numerator = precision
        .checked_mul(index_now_w)
        .and_then(|v| v.checked_mul(U256::from(new_debt)))
        .ok_or(CreditError::MathOverflow)?;

    let new_index = to_u128(numerator / denominator)?;
    Ok((new_debt, new_index))
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DebtDecrease {
    pub new_debt: u128,
    pub new_cumulative_index: u128,
    pub profit: u128,
    pub new_cumulative_quota_interest: u128,
    pub new_quota_fees: u128,
}

/// Applies a repayment of `amount`, which must not exceed the total debt.
///
/// Order: quota increase fees, quota interest with its fee, base interest
/// with its fee, then principal.
#[allow(clippy::too_many_arguments)]
pub fn calc_decrease(
    amount: u128,
    debt: u128,
    index_now: u128,
    index_last_update: u128,
    cumulative_quota_interest: u128,
    quota_fees: u128,
    fee_interest: u32,
) -> Result<DebtDecrease, CreditError> {
    let mut remaining = amount;
    let mut out = DebtDecrease {
        new_debt: debt,
        new_cumulative_index: index_last_update,
        profit: 0,
        new_cumulative_quota_interest: cumulative_quota_interest,
        new_quota_fees: quota_fees,
    };

    if quota_fees != 0 {
        let paid = remaining.min(quota_fees);
        out.profit = paid;
        out.new_quota_fees = quota_fees - paid;
        remaining -= paid;
    }

    if cumulative_quota_interest != 0 && remaining != 0 {
        let quota_profit = percent_mul_up(cumulative_quota_interest, fee_interest)?;
        let due = checked_add(cumulative_quota_interest, quota_profit)?;
        if remaining >= due {
            remaining -= due;
            out.profit = checked_add(out.profit, quota_profit)?;
            out.new_cumulative_quota_interest = 0;
        } else {
            let to_pool = fee_exclusive(remaining, fee_interest)?;
            out.profit = checked_add(out.profit, remaining - to_pool)?;
            out.new_cumulative_quota_interest = cumulative_quota_interest - to_pool;
            remaining = 0;
        }
    }

    if remaining != 0 {
        let interest = calc_accrued_interest(debt, index_last_update, index_now)?;
        let interest_profit = percent_mul_up(interest, fee_interest)?;
        let due = checked_add(interest, interest_profit)?;
        if remaining >= due {
            remaining -= due;
            out.profit = checked_add(out.profit, interest_profit)?;
            out.new_cumulative_index = index_now;
        } else {
            let to_pool = fee_exclusive(remaining, fee_interest)?;
            out.profit = checked_add(out.profit, remaining - to_pool)?;
            out.new_cumulative_index =
                index_after_interest_payment(to_pool, debt, index_now, index_last_update)?;
            remaining = 0;
        }
    }

    out.new_debt = checked_sub(debt, remaining)?;
    if out.new_debt == 0 {
        out.new_cumulative_index = index_now;
    }
    Ok(out)
}

/// Part of `amount` that goes to the pool when the protocol takes
/// `fee_interest` on top of it.
fn fee_exclusive(amount: u128, fee_interest: u32) -> Result<u128, CreditError> {
    mul_div(
        amount,
        PERCENTAGE_FACTOR,
        PERCENTAGE_FACTOR + fee_interest as u128,
    )
}

/// Index that leaves `interest - paid` outstanding on `debt`:
/// `index_now * index_lu / (index_now - paid * index_lu / debt)`.
fn index_after_interest_payment(
    paid: u128,
    debt: u128,
    index_now: u128,
    index_last_update: u128,
) -> Result<u128, CreditError> {
    if debt == 0 {
        return Ok(index_now);
    }
    let precision = U256::from(INDEX_PRECISION);
    let now = U256::from(index_now);
    let lu = U256::from(index_last_update);
    let scaled_now = precision * now;
    let scaled_paid = precision * U256::from(paid) * lu / U256::from(debt);
    if scaled_paid >= scaled_now {
        return Ok(index_now);
    }
    let new_index = to_u128(scaled_now * lu / (scaled_now - scaled_paid))?;
    Ok(new_index.min(index_now))
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ClosurePayments {
    pub amount_to_pool: u128,
    pub remaining_funds: u128,
    pub profit: u128,
    pub loss: u128,
}

/// Voluntary close: the pool is repaid everything, fees are profit.
pub fn calc_close_payments(data: &CollateralDebtData) -> Result<ClosurePayments, CreditError> {
    Ok(ClosurePayments {
        amount_to_pool: calc_total_debt(data)?,
        remaining_funds: 0,
        profit: data.accrued_fees,
        loss: 0,
    })
}

/// Liquidation: the liquidator buys all collateral at `liquidation_discount`
/// of its value; the pool is owed total debt plus `fee_liquidation` of the
/// value. What the discounted value cannot cover is a loss, what exceeds the
/// pool's due goes back to the borrower.
pub fn calc_liquidation_payments(
    data: &CollateralDebtData,
    fee_liquidation: u32,
    liquidation_discount: u32,
) -> Result<ClosurePayments, CreditError> {
    let debt_with_interest = calc_debt_with_interest(data)?;
    let total_funds = percent_mul(data.total_value, liquidation_discount)?;
    let mut amount_to_pool = checked_add(
        calc_total_debt(data)?,
        percent_mul(data.total_value, fee_liquidation)?,
    )?;

    let mut out = ClosurePayments::default();
    if total_funds > amount_to_pool {
        out.remaining_funds = total_funds - amount_to_pool;
    } else {
        amount_to_pool = total_funds;
    }

    if amount_to_pool >= debt_with_interest {
        out.profit = amount_to_pool - debt_with_interest;
    } else {
        out.loss = debt_with_interest - amount_to_pool;
    }
    out.amount_to_pool = amount_to_pool;
    Ok(out)
}

/// Quota index after `elapsed` seconds at `rate` bps per year.
pub fn quota_index_since(
    index_last_update: u128,
    rate: u32,
    elapsed: u64,
) -> Result<u128, CreditError> {
    if elapsed == 0 || rate == 0 {
        return Ok(index_last_update);
    }
    let growth = mul_div_up(
        RAY_DIVIDED_BY_PERCENTAGE * rate as u128,
        elapsed as u128,
        SECONDS_PER_YEAR as u128,
    )?;
    checked_add(index_last_update, growth)
}

pub fn calc_accrued_quota_interest(
    quoted: u128,
    index_now: u128,
    index_last_update: u128,
) -> Result<u128, CreditError> {
    if quoted == 0 || index_now <= index_last_update {
        return Ok(0);
    }
    mul_div_up(quoted, index_now - index_last_update, RAY)
}

/// Linear growth of a ray index at a ray-denominated yearly `rate`.
pub fn linear_index_growth(index: u128, rate: u128, elapsed: u64) -> Result<u128, CreditError> {
    if elapsed == 0 || rate == 0 {
        return Ok(index);
    }
    let delta = mul_div(rate, elapsed as u128, SECONDS_PER_YEAR as u128)?;
    mul_div(index, checked_add(RAY, delta)?, RAY)
}

/// Liquidation threshold at `now`, linearly ramped between the two endpoints.
pub fn ramped_liquidation_threshold(
    lt_initial: u32,
    lt_final: u32,
    timestamp_ramp_start: u64,
    ramp_duration: u64,
    now: u64,
) -> u32 {
    if now <= timestamp_ramp_start {
        return lt_initial;
    }
    let ramp_end = timestamp_ramp_start.saturating_add(ramp_duration);
    if now >= ramp_end {
        return lt_final;
    }
    let elapsed = (now - timestamp_ramp_start) as u128;
    let left = (ramp_end - now) as u128;
    let blended = (lt_initial as u128 * left + lt_final as u128 * elapsed) / ramp_duration as u128;
    blended as u32
}
