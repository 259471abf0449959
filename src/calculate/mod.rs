//! Statistics calculation engine.
//!
//! Computes derived tables from normalized draws:
//! - Per-number frequency
//! - Prize winners by municipality and state
//! - Exact-combination repeats
//! - Headline summary
//!
//! Every function here is a pure function of its input and is recomputed in
//! full whenever the draw set changes.

pub mod frequency;
pub mod prizes;
pub mod repetition;
pub mod summary;

pub use frequency::number_frequencies;
pub use prizes::{winner_events, PrizeAggregator, DEFAULT_INVALID_STATE_CODES};
pub use repetition::build_index;
pub use summary::summarize;

/// Share of `part` in `total` as a percentage, 0 when `total` is 0.
pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert!((percentage(1, 3) - 33.333).abs() < 0.01);
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(0, 10), 0.0);
        assert_eq!(percentage(10, 10), 100.0);
    }
}
