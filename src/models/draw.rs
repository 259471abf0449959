//! Canonical draw record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Combination, ContestId};

/// Numbers extracted from a raw draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "numbers", rename_all = "lowercase")]
pub enum DrawNumbers {
    /// Exactly six distinct valid numbers.
    Complete(Combination),
    /// Whatever valid numbers could be recovered, never padded.
    Incomplete(Vec<u8>),
}

impl DrawNumbers {
    /// The combination, if the draw is usable for number analyses.
    pub fn combination(&self) -> Option<&Combination> {
        match self {
            DrawNumbers::Complete(c) => Some(c),
            DrawNumbers::Incomplete(_) => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, DrawNumbers::Complete(_))
    }
}

/// Prize winners attributed to one municipality for one draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerLocation {
    /// Two-letter state code, trimmed and upper-cased
    pub state: String,

    /// Municipality name, trimmed and upper-cased
    pub municipality: String,

    /// Winner units this entry contributes (at least 1)
    pub winners: u32,
}

impl WinnerLocation {
    /// Build a location with canonical casing and spacing.
    pub fn new(state: &str, municipality: &str, winners: u32) -> Self {
        Self {
            state: canonical_text(state),
            municipality: canonical_text(municipality),
            winners,
        }
    }
}

/// Trim and upper-case a place name for comparison.
pub fn canonical_text(s: &str) -> String {
    s.trim().to_uppercase()
}

/// One winner unit at one place for one draw, the flat form of
/// [`WinnerLocation`] used by the table cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerEvent {
    pub contest: ContestId,
    pub date: Option<NaiveDate>,
    pub municipality: String,
    pub state: String,
}

/// Winner counts per prize tier.
///
/// Extracted separately from winner locations since the source schemas disagree
/// on how tiers are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeTiers {
    /// 6 matches
    pub sena: u32,
    /// 5 matches
    pub quina: u32,
    /// 4 matches
    pub quadra: u32,
}

/// One historical draw after normalization. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub contest_id: ContestId,

    /// Draw date, `None` when absent or unparseable
    pub date: Option<NaiveDate>,

    pub numbers: DrawNumbers,

    /// Winner locations in source order
    pub winner_locations: Vec<WinnerLocation>,

    /// Per-tier winner counts, when some known schema carried them
    pub prize_tiers: Option<PrizeTiers>,

    /// Accumulated jackpot announced with this draw
    pub accumulated_prize: Option<f64>,
}

impl DrawRecord {
    /// Create a record with no winner or prize data.
    pub fn new(contest_id: ContestId, date: Option<NaiveDate>, numbers: DrawNumbers) -> Self {
        Self {
            contest_id,
            date,
            numbers,
            winner_locations: Vec::new(),
            prize_tiers: None,
            accumulated_prize: None,
        }
    }

    /// Builder method to set winner locations.
    pub fn with_winner_locations(mut self, locations: Vec<WinnerLocation>) -> Self {
        self.winner_locations = locations;
        self
    }

    /// Builder method to set prize tiers.
    pub fn with_prize_tiers(mut self, tiers: PrizeTiers) -> Self {
        self.prize_tiers = Some(tiers);
        self
    }

    /// Builder method to set the accumulated prize.
    pub fn with_accumulated_prize(mut self, value: f64) -> Self {
        self.accumulated_prize = Some(value);
        self
    }

    /// The combination, if all six numbers are present.
    pub fn combination(&self) -> Option<&Combination> {
        self.numbers.combination()
    }

    /// Total winner units across all locations, saturating at `u32::MAX`.
    pub fn total_location_winners(&self) -> u32 {
        self.winner_locations
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.winners))
    }

    /// One event per winner unit, so an entry with 3 winners yields 3 rows.
    pub fn winner_events(&self) -> impl Iterator<Item = WinnerEvent> + '_ {
        self.winner_locations.iter().flat_map(move |location| {
            (0..location.winners).map(move |_| WinnerEvent {
                contest: self.contest_id,
                date: self.date,
                municipality: location.municipality.clone(),
                state: location.state.clone(),
            })
        })
    }
}
