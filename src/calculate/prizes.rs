//! Prize winners grouped by municipality and state.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::models::{canonical_text, DrawRecord, PrizeAggregate, WinnerEvent};

/// State codes the source uses for unknown or foreign winners.
pub const DEFAULT_INVALID_STATE_CODES: &[&str] = &["--", "XX", "N/A", ""];

/// Groups winner locations by `(state, municipality)`, dropping invalid state codes.
#[derive(Debug, Clone)]
pub struct PrizeAggregator {
    invalid_states: HashSet<String>,
}

impl Default for PrizeAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_INVALID_STATE_CODES.iter().copied())
    }
}

impl PrizeAggregator {
    /// Codes are compared after trimming and upper-casing.
    pub fn new<I, S>(invalid_states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            invalid_states: invalid_states
                .into_iter()
                .map(|code| canonical_text(code.as_ref()))
                .collect(),
        }
    }

    pub fn is_valid_state(&self, state: &str) -> bool {
        !self.invalid_states.contains(&canonical_text(state))
    }

    /// Aggregate the winner locations of every draw, complete numbers or not.
    pub fn aggregate(&self, draws: &[DrawRecord]) -> PrizeAggregate {
        self.group(draws.iter().flat_map(|draw| {
            draw.winner_locations
                .iter()
                .map(|l| (l.state.as_str(), l.municipality.as_str(), l.winners))
        }))
    }

    /// Aggregate flat winner events, one winner unit each.
    pub fn aggregate_events(&self, events: &[WinnerEvent]) -> PrizeAggregate {
        self.group(
            events
                .iter()
                .map(|e| (e.state.as_str(), e.municipality.as_str(), 1)),
        )
    }

    fn group<'a, I>(&self, rows: I) -> PrizeAggregate
    where
        I: Iterator<Item = (&'a str, &'a str, u32)>,
    {
        let mut totals: BTreeMap<(String, String), u32> = BTreeMap::new();
        let mut rejected = 0usize;

        for (state, municipality, winners) in rows {
            let state = canonical_text(state);
            let municipality = canonical_text(municipality);
            if !self.is_valid_state(&state) || municipality.is_empty() || winners == 0 {
                rejected += 1;
                continue;
            }
            let total = totals.entry((state, municipality)).or_default();
            *total = total.saturating_add(winners);
        }

        if rejected > 0 {
            debug!("Dropped {} winner rows with invalid location", rejected);
        }
        if totals.is_empty() {
            return PrizeAggregate::empty();
        }
        PrizeAggregate::from_totals(totals)
    }
}

/// Flatten draws into one winner event per winner unit, in draw order.
pub fn winner_events(draws: &[DrawRecord]) -> Vec<WinnerEvent> {
    draws.iter().flat_map(DrawRecord::winner_events).collect()
}
