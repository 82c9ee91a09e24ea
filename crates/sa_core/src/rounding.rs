//! Integer-first share helpers. All percentage math is cross-multiplied in
//! u128; there is no floating point in the engine.

use crate::variables::Pct;

/// `floor(total * pct / 100)`.
#[inline]
pub fn share_floor(total: u128, pct: Pct) -> u128 {
    total.saturating_mul(pct.as_u8() as u128) / 100
}

/// `votes >= base * pct / 100`, evaluated exactly as `100 * votes >= pct * base`.
#[inline]
pub fn meets_share(votes: u128, base: u128, pct: Pct) -> bool {
    votes.saturating_mul(100) >= (pct.as_u8() as u128).saturating_mul(base)
}

/// Split `total` cast votes into `(invalid, valid)` using `invalid_pct`.
#[inline]
pub fn split_invalid(total: u128, invalid_pct: Pct) -> (u128, u128) {
    let invalid = share_floor(total, invalid_pct);
    (invalid, total - invalid)
}
