//! Fixed point helpers: basis-point percentages and ray precision.
//!
//! Products are taken in 256 bits so `a * b / c` never overflows before the
//! division. Every helper comes in a truncating flavor and an `_up` flavor;
//! amounts owed to the protocol use the latter.

use crate::constants::{PERCENTAGE_FACTOR, RAY};
use crate::errors::CreditError;

#[allow(clippy::all)]
mod wide {
    uint::construct_uint! {
        pub struct U256(4);
    }
}

pub use wide::U256;

pub fn to_u128(value: U256) -> Result<u128, CreditError> {
    if value > U256::from(u128::MAX) {
        return Err(CreditError::MathOverflow);
    }
    Ok(value.low_u128())
}

pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128, CreditError> {
    if denominator == 0 {
        return Err(CreditError::MathOverflow);
    }
    to_u128(U256::from(a) * U256::from(b) / U256::from(denominator))
}

pub fn mul_div_up(a: u128, b: u128, denominator: u128) -> Result<u128, CreditError> {
    if denominator == 0 {
        return Err(CreditError::MathOverflow);
    }
    let product = U256::from(a) * U256::from(b);
    let denominator = U256::from(denominator);
    let mut quotient = product / denominator;
    if !(product % denominator).is_zero() {
        quotient += U256::one();
    }
    to_u128(quotient)
}

pub fn percent_mul(value: u128, bps: u32) -> Result<u128, CreditError> {
    mul_div(value, bps as u128, PERCENTAGE_FACTOR)
}

pub fn percent_mul_up(value: u128, bps: u32) -> Result<u128, CreditError> {
    mul_div_up(value, bps as u128, PERCENTAGE_FACTOR)
}

pub fn percent_div(value: u128, bps: u32) -> Result<u128, CreditError> {
    mul_div(value, PERCENTAGE_FACTOR, bps as u128)
}

pub fn ray_mul(value: u128, ray: u128) -> Result<u128, CreditError> {
    mul_div(value, ray, RAY)
}

pub fn ray_mul_up(value: u128, ray: u128) -> Result<u128, CreditError> {
    mul_div_up(value, ray, RAY)
}

pub fn ray_div(value: u128, ray: u128) -> Result<u128, CreditError> {
    mul_div(value, RAY, ray)
}

pub fn pow10(decimals: u32) -> Result<u128, CreditError> {
    10u128
        .checked_pow(decimals)
        .ok_or(CreditError::MathOverflow)
}

pub fn to_i128(amount: u128) -> Result<i128, CreditError> {
    i128::try_from(amount).map_err(|_| CreditError::MathOverflow)
}

pub fn checked_add(a: u128, b: u128) -> Result<u128, CreditError> {
    a.checked_add(b).ok_or(CreditError::MathOverflow)
}

pub fn checked_sub(a: u128, b: u128) -> Result<u128, CreditError> {
    a.checked_sub(b).ok_or(CreditError::MathOverflow)
}

/// Applies a signed delta to an unsigned amount.
pub fn apply_delta(value: u128, delta: i128) -> Result<u128, CreditError> {
    if delta >= 0 {
        checked_add(value, delta.unsigned_abs())
    } else {
        checked_sub(value, delta.unsigned_abs())
    }
}
