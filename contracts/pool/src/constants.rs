/// Withdrawal fee cap: 1%.
pub const MAX_WITHDRAW_FEE: u32 = 100;
