#![no_std]

pub mod access;
pub mod bitmask;
pub mod constants;
pub mod credit_logic;
pub mod errors;
pub mod interfaces;
pub mod math;
pub mod reflector;
pub mod types;

pub use bitmask::TokenSet;
pub use errors::{CreditError, OrPanic};
