#![no_std]

mod constants;
mod contract;
mod events;
mod multicall;
mod storage;

pub use contract::*;
pub use events::*;
pub use storage::{DataKey, LossParams};

#[cfg(test)]
mod test;
