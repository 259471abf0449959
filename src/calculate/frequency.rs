//! Per-number draw frequency.

use crate::models::{DrawRecord, NumberFrequencyTable};

/// Tally every complete draw's numbers. Incomplete draws are ignored.
pub fn number_frequencies(draws: &[DrawRecord]) -> NumberFrequencyTable {
    let mut table = NumberFrequencyTable::new();
    for combination in draws.iter().filter_map(DrawRecord::combination) {
        table.record(combination);
    }
    table
}
