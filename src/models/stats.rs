//! Derived statistics models.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

use super::{is_valid_number, Combination, MAX_NUMBER, MIN_NUMBER};

const POOL_SIZE: usize = MAX_NUMBER as usize;

/// Occurrence count of one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFrequency {
    pub number: u8,
    pub occurrences: u32,
}

/// How often each of the 60 numbers was drawn.
///
/// Every number is always present; never-drawn numbers count zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFrequencyTable {
    counts: [u32; POOL_SIZE],
}

impl Default for NumberFrequencyTable {
    fn default() -> Self {
        Self {
            counts: [0; POOL_SIZE],
        }
    }
}

impl NumberFrequencyTable {
    /// An all-zero table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(number, occurrences)` pairs, ignoring invalid numbers.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (u8, u32)>,
    {
        let mut table = Self::new();
        for (number, occurrences) in counts {
            if is_valid_number(number) {
                table.counts[Self::slot(number)] = occurrences;
            }
        }
        table
    }

    /// Count one occurrence of every number in `combination`.
    pub fn record(&mut self, combination: &Combination) {
        for &n in combination.numbers() {
            self.counts[Self::slot(n)] += 1;
        }
    }

    fn slot(number: u8) -> usize {
        (number - MIN_NUMBER) as usize
    }

    /// Occurrences of `number`; zero for numbers outside the pool.
    pub fn count(&self, number: u8) -> u32 {
        if is_valid_number(number) {
            self.counts[Self::slot(number)]
        } else {
            0
        }
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// How many numbers were drawn at least once.
    pub fn represented(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// All 60 entries in number order.
    pub fn iter(&self) -> impl Iterator<Item = NumberFrequency> + '_ {
        (MIN_NUMBER..=MAX_NUMBER).map(|number| NumberFrequency {
            number,
            occurrences: self.count(number),
        })
    }

    /// All entries by occurrences descending, ties by number ascending.
    pub fn ranked(&self) -> Vec<NumberFrequency> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| {
            b.occurrences
                .cmp(&a.occurrences)
                .then(a.number.cmp(&b.number))
        });
        ranked
    }

    /// The `n` most drawn numbers, most drawn first.
    pub fn top(&self, n: usize) -> Vec<NumberFrequency> {
        self.ranked().into_iter().take(n).collect()
    }

    /// The `n` least drawn numbers, least drawn first.
    ///
    /// Taken from the tail of [`ranked`](Self::ranked), so `top(k)` and `bottom(k)`
    /// never overlap while `2k <= 60`.
    pub fn bottom(&self, n: usize) -> Vec<NumberFrequency> {
        let ranked = self.ranked();
        let start = ranked.len().saturating_sub(n);
        ranked[start..].iter().rev().copied().collect()
    }
}

impl Serialize for NumberFrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Winner total for one municipality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalityPrize {
    pub state: String,
    pub municipality: String,
    pub winners: u32,
    /// Winners across the whole state
    pub state_total: u32,
}

impl MunicipalityPrize {
    /// `UF - MUNICIPALITY` label.
    pub fn label(&self) -> String {
        format!("{} - {}", self.state, self.municipality)
    }
}

/// Winner subtotal for one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatePrize {
    pub state: String,
    pub winners: u32,
    /// Distinct municipalities with at least one winner
    pub municipalities: u32,
}

/// One slice of a state breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MunicipalityShare {
    pub municipality: String,
    pub winners: u32,
}

/// Municipalities folded together past the requested top N.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OthersBucket {
    pub municipalities: usize,
    pub winners: u32,
}

/// Top municipalities of one state plus the remainder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateBreakdown {
    pub state: String,
    pub total: u32,
    pub entries: Vec<MunicipalityShare>,
    pub others: Option<OthersBucket>,
}

/// Prize winners grouped by (state, municipality) with per-state subtotals.
///
/// May be empty, which callers present as "no data".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrizeAggregate {
    municipalities: Vec<MunicipalityPrize>,
    states: Vec<StatePrize>,
}

impl PrizeAggregate {
    /// An aggregate with no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from grouped totals keyed by `(state, municipality)`.
    ///
    /// State subtotals are derived here so they always equal the sum of their
    /// municipality rows. Sums saturate at `u32::MAX`.
    pub fn from_totals(totals: BTreeMap<(String, String), u32>) -> Self {
        let mut state_totals: BTreeMap<String, (u32, u32)> = BTreeMap::new();
        for ((state, _), winners) in &totals {
            let entry = state_totals.entry(state.clone()).or_default();
            entry.0 = entry.0.saturating_add(*winners);
            entry.1 = entry.1.saturating_add(1);
        }

        let municipalities = totals
            .into_iter()
            .map(|((state, municipality), winners)| {
                let state_total = state_totals.get(&state).map(|t| t.0).unwrap_or(0);
                MunicipalityPrize {
                    state,
                    municipality,
                    winners,
                    state_total,
                }
            })
            .collect();

        let states = state_totals
            .into_iter()
            .map(|(state, (winners, municipalities))| StatePrize {
                state,
                winners,
                municipalities,
            })
            .collect();

        Self {
            municipalities,
            states,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.municipalities.is_empty()
    }

    /// Municipality rows ordered by state, then municipality.
    pub fn municipalities(&self) -> &[MunicipalityPrize] {
        &self.municipalities
    }

    /// State subtotals ordered by state code.
    pub fn states(&self) -> &[StatePrize] {
        &self.states
    }

    /// Look up one state's subtotal.
    pub fn state(&self, state: &str) -> Option<&StatePrize> {
        let state = super::canonical_text(state);
        self.states.iter().find(|s| s.state == state)
    }

    pub fn total_winners(&self) -> u32 {
        self.states
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(s.winners))
    }

    pub fn distinct_states(&self) -> usize {
        self.states.len()
    }

    pub fn distinct_municipalities(&self) -> usize {
        self.municipalities.len()
    }

    /// The `n` municipalities with most winners.
    pub fn top_municipalities(&self, n: usize) -> Vec<&MunicipalityPrize> {
        let mut sorted: Vec<_> = self.municipalities.iter().collect();
        sorted.sort_by(|a, b| {
            b.winners
                .cmp(&a.winners)
                .then_with(|| a.state.cmp(&b.state))
                .then_with(|| a.municipality.cmp(&b.municipality))
        });
        sorted.truncate(n);
        sorted
    }

    /// States by subtotal descending.
    pub fn state_ranking(&self) -> Vec<&StatePrize> {
        let mut sorted: Vec<_> = self.states.iter().collect();
        sorted.sort_by(|a, b| b.winners.cmp(&a.winners).then_with(|| a.state.cmp(&b.state)));
        sorted
    }

    /// Top `top_n` municipalities of `state`, the rest folded into an "others" bucket.
    ///
    /// Returns `None` for states with no rows. `top_n` is clamped to at least 1.
    pub fn state_breakdown(&self, state: &str, top_n: usize) -> Option<StateBreakdown> {
        let subtotal = self.state(state)?;

        let mut rows: Vec<_> = self
            .municipalities
            .iter()
            .filter(|m| m.state == subtotal.state)
            .collect();
        rows.sort_by(|a, b| {
            b.winners
                .cmp(&a.winners)
                .then_with(|| a.municipality.cmp(&b.municipality))
        });

        let keep = top_n.max(1).min(rows.len());
        let rest = &rows[keep..];
        let others = (!rest.is_empty()).then(|| OthersBucket {
            municipalities: rest.len(),
            winners: rest
                .iter()
                .fold(0, |acc: u32, m| acc.saturating_add(m.winners)),
        });

        Some(StateBreakdown {
            state: subtotal.state.clone(),
            total: subtotal.winners,
            entries: rows[..keep]
                .iter()
                .map(|m| MunicipalityShare {
                    municipality: m.municipality.clone(),
                    winners: m.winners,
                })
                .collect(),
            others,
        })
    }
}

/// Headline figures over the loaded draws.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DrawSummary {
    pub total_draws: usize,
    /// Draws with all six numbers
    pub complete_draws: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Draws with tier data and no 6-match winner
    pub draws_without_jackpot_winner: usize,
    pub draws_without_quina_winner: usize,
    pub draws_without_quadra_winner: usize,
    /// Draws that carried tier data at all
    pub draws_with_tier_data: usize,
    pub max_accumulated: Option<f64>,
    pub even_count: u64,
    pub odd_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn totals(rows: &[(&str, &str, u32)]) -> BTreeMap<(String, String), u32> {
        rows.iter()
            .map(|(s, m, w)| ((s.to_string(), m.to_string()), *w))
            .collect()
    }

    #[test]
    fn test_frequency_table_starts_at_zero() {
        let table = NumberFrequencyTable::new();
        assert_eq!(table.iter().count(), 60);
        assert!(table.iter().all(|f| f.occurrences == 0));
        assert!(table.is_empty());
        assert_eq!(table.represented(), 0);
    }

    #[test]
    fn test_frequency_table_record() {
        let mut table = NumberFrequencyTable::new();
        let c = Combination::new(&[1, 2, 3, 4, 5, 60]).unwrap();
        table.record(&c);
        table.record(&c);

        assert_eq!(table.count(1), 2);
        assert_eq!(table.count(60), 2);
        assert_eq!(table.count(30), 0);
        assert_eq!(table.count(0), 0);
        assert_eq!(table.total(), 12);
        assert_eq!(table.represented(), 6);
    }

    #[test]
    fn test_frequency_ranking_breaks_ties_by_number() {
        let table = NumberFrequencyTable::from_counts([(10, 5), (3, 5), (7, 9)]);
        let top: Vec<u8> = table.top(3).iter().map(|f| f.number).collect();
        assert_eq!(top, vec![7, 3, 10]);
    }

    #[test]
    fn test_frequency_top_and_bottom_disjoint_when_uniform() {
        let table = NumberFrequencyTable::from_counts((1..=60).map(|n| (n, 1)));
        let top: Vec<u8> = table.top(10).iter().map(|f| f.number).collect();
        let bottom: Vec<u8> = table.bottom(10).iter().map(|f| f.number).collect();

        assert!(top.iter().all(|n| !bottom.contains(n)));
        assert_eq!(bottom.len(), 10);
    }

    #[test]
    fn test_frequency_bottom_least_first() {
        let table = NumberFrequencyTable::from_counts((1..=60).map(|n| (n, n as u32)));
        let bottom: Vec<u8> = table.bottom(3).iter().map(|f| f.number).collect();
        assert_eq!(bottom, vec![1, 2, 3]);
    }

    #[test]
    fn test_frequency_from_counts_ignores_invalid() {
        let table = NumberFrequencyTable::from_counts([(0, 9), (61, 9), (5, 2)]);
        assert_eq!(table.total(), 2);
    }

    #[test]
    fn test_frequency_table_serializes_as_list() {
        let table = NumberFrequencyTable::from_counts([(1, 3)]);
        let json = serde_json::to_value(&table).unwrap();
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 60);
        assert_eq!(entries[0]["number"], 1);
        assert_eq!(entries[0]["occurrences"], 3);
    }

    #[test]
    fn test_prize_aggregate_state_totals() {
        let agg = PrizeAggregate::from_totals(totals(&[
            ("SP", "SAO PAULO", 5),
            ("SP", "CAMPINAS", 2),
            ("RJ", "NITEROI", 1),
        ]));

        assert_eq!(agg.total_winners(), 8);
        assert_eq!(agg.distinct_states(), 2);
        assert_eq!(agg.distinct_municipalities(), 3);

        let sp = agg.state("sp").unwrap();
        assert_eq!(sp.winners, 7);
        assert_eq!(sp.municipalities, 2);

        for row in agg.municipalities() {
            let subtotal = agg.state(&row.state).unwrap().winners;
            assert_eq!(row.state_total, subtotal);
        }
    }

    #[test]
    fn test_prize_aggregate_rankings() {
        let agg = PrizeAggregate::from_totals(totals(&[
            ("SP", "SAO PAULO", 5),
            ("RJ", "RIO DE JANEIRO", 6),
            ("MG", "BELO HORIZONTE", 1),
        ]));

        let top: Vec<_> = agg
            .top_municipalities(2)
            .iter()
            .map(|m| m.label())
            .collect();
        assert_eq!(top, vec!["RJ - RIO DE JANEIRO", "SP - SAO PAULO"]);

        let states: Vec<_> = agg.state_ranking().iter().map(|s| s.state.clone()).collect();
        assert_eq!(states, vec!["RJ", "SP", "MG"]);
    }

    #[test]
    fn test_state_breakdown_with_others() {
        let agg = PrizeAggregate::from_totals(totals(&[
            ("SP", "A", 5),
            ("SP", "B", 3),
            ("SP", "C", 2),
            ("SP", "D", 1),
        ]));

        let breakdown = agg.state_breakdown("SP", 2).unwrap();
        assert_eq!(breakdown.total, 11);
        assert_eq!(breakdown.entries.len(), 2);
        assert_eq!(breakdown.entries[0].municipality, "A");
        assert_eq!(
            breakdown.others,
            Some(OthersBucket {
                municipalities: 2,
                winners: 3
            })
        );
    }

    #[test]
    fn test_state_breakdown_without_others() {
        let agg = PrizeAggregate::from_totals(totals(&[("AC", "RIO BRANCO", 1)]));
        let breakdown = agg.state_breakdown("AC", 8).unwrap();
        assert_eq!(breakdown.entries.len(), 1);
        assert!(breakdown.others.is_none());

        assert!(agg.state_breakdown("SP", 8).is_none());
    }

    #[test]
    fn test_empty_aggregate() {
        let agg = PrizeAggregate::empty();
        assert!(agg.is_empty());
        assert_eq!(agg.total_winners(), 0);
        assert!(agg.top_municipalities(10).is_empty());
        assert!(agg.state_ranking().is_empty());
    }
}
