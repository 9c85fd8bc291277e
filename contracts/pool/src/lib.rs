#![no_std]

mod constants;
mod contract;
mod events;
mod storage;

pub use contract::*;
pub use events::*;
pub use storage::{CreditManagerDebt, DataKey};

#[cfg(test)]
mod test;
