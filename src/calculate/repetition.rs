//! Exact-combination repeat detection.

use crate::models::{CombinationIndex, DrawRecord};

/// Index every complete draw under its canonical combination, in draw order.
pub fn build_index(draws: &[DrawRecord]) -> CombinationIndex {
    let mut index = CombinationIndex::new();
    for draw in draws {
        if let Some(combination) = draw.combination() {
            index.insert(*combination, draw.contest_id);
        }
    }
    index
}
