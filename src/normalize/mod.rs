//! Raw draw normalization.
//!
//! Converts loosely-typed draw objects from any known source version into
//! [`DrawRecord`]s. Field lookup goes through the probe table in [`probes`];
//! prize tiers go through the versioned schemas in [`tiers`]. A malformed
//! record is reported and skipped, never fatal for the batch.

mod coerce;
pub mod probes;
pub mod tiers;

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{
    is_valid_number, Combination, ContestId, DrawNumbers, DrawRecord, WinnerLocation,
    NUMBERS_PER_DRAW,
};
use coerce::{as_amount, as_i64, as_positive_u32, as_text};
use probes::{first_key, first_match, SchemaProbes};

/// Date format used by every known source version.
pub const SOURCE_DATE_FORMAT: &str = "%d/%m/%Y";

/// Placeholder the source uses for unknown places.
const PLACEHOLDER: &str = "N/A";

/// Winner entries above this count are treated as corrupt.
pub const DEFAULT_MAX_WINNERS_PER_ENTRY: u32 = 1_000;

/// Why a raw record could not become a [`DrawRecord`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Unusable {
    #[error("record is not an object")]
    NotAnObject,

    #[error("record has none of the expected fields")]
    UnrecognizedShape,

    #[error("record has no contest id")]
    MissingContestId,

    #[error("invalid contest id: {0}")]
    InvalidContestId(String),
}

/// Counts from one normalization batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    /// Raw records seen
    pub total: usize,
    /// Records that became draws (duplicates excluded)
    pub normalized: usize,
    /// Unusable records
    pub skipped: usize,
    /// Normalized draws whose numbers are incomplete
    pub incomplete_numbers: usize,
    /// Normalized draws without a parseable date
    pub missing_dates: usize,
    /// Records dropped because their contest id was already seen
    pub duplicates: usize,
}

/// Draws plus the batch report.
#[derive(Debug, Clone, Default)]
pub struct NormalizeOutput {
    pub draws: Vec<DrawRecord>,
    pub report: NormalizeReport,
}

/// Normalizer over a probe table.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    probes: SchemaProbes,
    max_winners_per_entry: u32,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(SchemaProbes::default())
    }
}

impl Normalizer {
    pub fn new(probes: SchemaProbes) -> Self {
        Self {
            probes,
            max_winners_per_entry: DEFAULT_MAX_WINNERS_PER_ENTRY,
        }
    }

    /// Drop winner entries whose count exceeds `max`.
    pub fn with_max_winners_per_entry(mut self, max: u32) -> Self {
        self.max_winners_per_entry = max;
        self
    }

    /// Normalize one raw record.
    pub fn normalize(&self, raw: &Value) -> Result<DrawRecord, Unusable> {
        if !raw.is_object() {
            return Err(Unusable::NotAnObject);
        }
        if !self.probes.recognizes(raw) {
            return Err(Unusable::UnrecognizedShape);
        }

        let contest_id = self.contest_id(raw)?;
        let date = self.date(raw);
        let numbers = self.numbers(raw);
        let winners = self.winner_locations(raw);

        let mut record = DrawRecord::new(contest_id, date, numbers).with_winner_locations(winners);
        if let Some((prize_tiers, schema)) = tiers::extract_tiers(raw) {
            debug!(
                "Contest {}: prize tiers from {} schema",
                contest_id,
                schema.label()
            );
            record = record.with_prize_tiers(prize_tiers);
        }
        if let Some(amount) = first_match(self.probes.accumulated, raw, |_| true).and_then(as_amount)
        {
            record = record.with_accumulated_prize(amount);
        }
        Ok(record)
    }

    /// Normalize a batch, skipping unusable records and duplicate contests.
    pub fn normalize_all(&self, raw: &[Value]) -> NormalizeOutput {
        let mut output = NormalizeOutput::default();
        let mut seen = HashSet::new();
        output.report.total = raw.len();

        for (position, item) in raw.iter().enumerate() {
            let record = match self.normalize(item) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping raw record #{}: {}", position, e);
                    output.report.skipped += 1;
                    continue;
                }
            };

            if !seen.insert(record.contest_id) {
                warn!(
                    "Duplicate contest {} at record #{}, keeping the first",
                    record.contest_id, position
                );
                output.report.duplicates += 1;
                continue;
            }

            if !record.numbers.is_complete() {
                debug!("Contest {} has incomplete numbers", record.contest_id);
                output.report.incomplete_numbers += 1;
            }
            if record.date.is_none() {
                output.report.missing_dates += 1;
            }
            output.draws.push(record);
        }

        output.report.normalized = output.draws.len();
        info!(
            "Normalized {} of {} records ({} skipped, {} duplicates, {} incomplete)",
            output.report.normalized,
            output.report.total,
            output.report.skipped,
            output.report.duplicates,
            output.report.incomplete_numbers
        );
        output
    }

    fn contest_id(&self, raw: &Value) -> Result<ContestId, Unusable> {
        let value =
            first_match(self.probes.contest, raw, |_| true).ok_or(Unusable::MissingContestId)?;
        as_positive_u32(value)
            .and_then(ContestId::new)
            .ok_or_else(|| Unusable::InvalidContestId(value.to_string()))
    }

    fn date(&self, raw: &Value) -> Option<NaiveDate> {
        let text = first_match(self.probes.date, raw, Value::is_string).and_then(as_text)?;
        parse_source_date(text)
    }

    fn numbers(&self, raw: &Value) -> DrawNumbers {
        let values = first_match(self.probes.numbers, raw, Value::is_array)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        extract_numbers(values)
    }

    fn winner_locations(&self, raw: &Value) -> Vec<WinnerLocation> {
        let Some(entries) =
            first_match(self.probes.winner_list, raw, Value::is_array).and_then(Value::as_array)
        else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| self.winner_location(entry))
            .collect()
    }

    fn winner_location(&self, entry: &Value) -> Option<WinnerLocation> {
        let place = |keys: &[&str]| {
            first_key(keys, entry)
                .and_then(as_text)
                .filter(|s| !s.eq_ignore_ascii_case(PLACEHOLDER))
        };
        let municipality = place(self.probes.municipality)?;
        let state = place(self.probes.state)?;
        let winners = match first_key(self.probes.winner_count, entry) {
            None => 1,
            Some(value) => as_positive_u32(value)?,
        };
        if winners > self.max_winners_per_entry {
            warn!(
                "Dropping winner entry {} - {}: {} winners exceeds limit of {}",
                state, municipality, winners, self.max_winners_per_entry
            );
            return None;
        }
        Some(WinnerLocation::new(state, municipality, winners))
    }
}

/// Parse a `DD/MM/YYYY` date; `None` on any failure.
pub fn parse_source_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), SOURCE_DATE_FORMAT).ok()
}

/// Keep valid, distinct numbers in source order. Exactly six make a complete draw.
pub fn extract_numbers(values: &[Value]) -> DrawNumbers {
    let mut kept: Vec<u8> = Vec::with_capacity(NUMBERS_PER_DRAW);
    for value in values {
        let Some(number) = as_i64(value)
            .and_then(|n| u8::try_from(n).ok())
            .filter(|n| is_valid_number(*n))
        else {
            continue;
        };
        if !kept.contains(&number) {
            kept.push(number);
        }
    }

    match Combination::new(&kept) {
        Ok(combination) => DrawNumbers::Complete(combination),
        Err(_) => DrawNumbers::Incomplete(kept),
    }
}
