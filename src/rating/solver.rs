use std::collections::HashMap;

use crate::config::solver::{ITERATIONS, RATING_CEILING, RATING_FLOOR};
use crate::rating::model::expected_rank;
use crate::types::Participant;

/// Rating whose expected rank against `pool` matches `actual_rank`.
///
/// Fixed-iteration bisection over `[RATING_FLOOR, RATING_CEILING]`, rounded to
/// the nearest integer. Ranks better than the bracket allows pin to its edges.
/// Returns `None` for an empty pool: there is nobody to be measured against.
pub fn compute_performance(actual_rank: u32, pool: &[i32]) -> Option<i32> {
    if pool.is_empty() {
        return None;
    }

    let target = f64::from(actual_rank);
    let (mut low, mut high) = (RATING_FLOOR, RATING_CEILING);
    for _ in 0..ITERATIONS {
        let mid = (low + high) / 2.0;
        if expected_rank(mid, pool) < target {
            high = mid;
        } else {
            low = mid;
        }
    }

    Some(((low + high) / 2.0).round() as i32)
}

/// Attach a performance to every participant, all solved against the same pool.
/// The result depends only on rank, so each distinct rank is solved once.
pub fn score_participants(participants: &mut [Participant], pool: &[i32]) {
    let mut by_rank: HashMap<u32, Option<i32>> = HashMap::new();
    for p in participants.iter_mut() {
        let rank = p.rank;
        p.performance = *by_rank
            .entry(rank)
            .or_insert_with(|| compute_performance(rank, pool));
    }
}
