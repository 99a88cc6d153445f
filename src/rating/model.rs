/// Logistic win probability on the 400-point Elo scale: the chance that a
/// player rated `rating_a` finishes ahead of one rated `rating_b`.
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / 400.0))
}

/// Rank a player of `candidate` would be expected to reach against `pool`.
/// Each pool entry adds the probability that it beats the candidate, so the
/// value falls as `candidate` rises. Rank 1 is best.
pub fn expected_rank(candidate: f64, pool: &[i32]) -> f64 {
    0.5 + pool
        .iter()
        .map(|&r| expected_score(f64::from(r), candidate))
        .sum::<f64>()
}
