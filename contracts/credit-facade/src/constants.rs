/// Debt that may be taken per ledger is `max_debt` times this.
pub const DEFAULT_LIMIT_PER_BLOCK_MULTIPLIER: u32 = 2;

/// Multiplier value that disables the per-ledger cap.
pub const UNLIMITED_PER_BLOCK_MULTIPLIER: u32 = u32::MAX;
