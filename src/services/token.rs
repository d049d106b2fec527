//! Per-day customer-facing order tokens.
//!
//! Tokens are drawn at random from a fixed three-digit range so customers
//! cannot read the day's order count off their ticket. Uniqueness against
//! concurrent submissions is guaranteed by the store, not by this module.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::ops::RangeInclusive;
use thiserror::Error;

pub const TOKEN_RANGE: RangeInclusive<i32> = 100..=999;
pub const TOKEN_CAPACITY: usize = 900;

// Rejections tolerated before falling back to scanning the free values.
const SAMPLE_ATTEMPTS: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("all {} order tokens are taken for today", TOKEN_CAPACITY)]
    CapacityExhausted,
}

pub fn allocate(existing_today: &HashSet<i32>) -> Result<i32, TokenError> {
    allocate_with(existing_today, &mut rand::thread_rng())
}

pub fn allocate_with<R: Rng + ?Sized>(
    existing_today: &HashSet<i32>,
    rng: &mut R,
) -> Result<i32, TokenError> {
    let used = existing_today
        .iter()
        .filter(|t| TOKEN_RANGE.contains(*t))
        .count();
    if used >= TOKEN_CAPACITY {
        return Err(TokenError::CapacityExhausted);
    }

    for _ in 0..SAMPLE_ATTEMPTS {
        let candidate = rng.gen_range(TOKEN_RANGE);
        if !existing_today.contains(&candidate) {
            return Ok(candidate);
        }
    }

    let free: Vec<i32> = TOKEN_RANGE
        .filter(|t| !existing_today.contains(t))
        .collect();
    free.choose(rng)
        .copied()
        .ok_or(TokenError::CapacityExhausted)
}
