//! Collateral token sets encoded as a 128-bit mask, one bit per token.
//! Bit 0 belongs to the underlying.

use crate::constants::UNDERLYING_TOKEN_MASK;

/// Keeps only the lowest set bit of `mask`.
pub fn lowest_set_bit(mask: u128) -> u128 {
    mask & mask.wrapping_neg()
}

pub fn enabled_token_count(mask: u128) -> u32 {
    mask.count_ones()
}

/// Linear index of a one-hot token mask.
pub fn calc_index(token_mask: u128) -> u32 {
    token_mask.trailing_zeros()
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TokenSet(u128);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    pub fn from_bits(bits: u128) -> Self {
        TokenSet(bits)
    }

    pub fn bits(self) -> u128 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if any bit of `mask` is in the set.
    pub fn contains(self, mask: u128) -> bool {
        self.0 & mask != 0
    }

    pub fn enable(self, mask: u128) -> Self {
        TokenSet(self.0 | mask)
    }

    pub fn disable(self, mask: u128) -> Self {
        TokenSet(self.0 & !mask)
    }

    pub fn enable_disable(self, to_enable: u128, to_disable: u128) -> Self {
        self.enable(to_enable).disable(to_disable)
    }

    pub fn intersect(self, mask: u128) -> Self {
        TokenSet(self.0 & mask)
    }

    /// Number of tokens, not counting the underlying.
    pub fn collateral_count(self) -> u32 {
        enabled_token_count(self.0 & !UNDERLYING_TOKEN_MASK)
    }

    pub fn len(self) -> u32 {
        enabled_token_count(self.0)
    }

    pub fn iter(self) -> TokenSetIter {
        TokenSetIter { rest: self.0 }
    }
}

impl From<u128> for TokenSet {
    fn from(bits: u128) -> Self {
        TokenSet(bits)
    }
}

/// Yields one-hot masks, lowest bit first.
pub struct TokenSetIter {
    rest: u128,
}

impl Iterator for TokenSetIter {
    type Item = u128;

    fn next(&mut self) -> Option<u128> {
        if self.rest == 0 {
            return None;
        }
        let mask = lowest_set_bit(self.rest);
        self.rest ^= mask;
        Some(mask)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.rest.count_ones() as usize;
        (n, Some(n))
    }
}
