//! Game suggestions sampled from frequency strata.
//!
//! Three categories are produced: six numbers from the most drawn stratum, six
//! from the least drawn stratum, and a mixed game of three from each. Every
//! suggestion is checked against the combination index to report whether it
//! was already drawn. The random source is supplied by the caller, so seeded
//! generators give reproducible output.

use std::collections::HashSet;

use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::models::{
    Combination, CombinationIndex, ContestId, NumberFrequencyTable, NUMBERS_PER_DRAW,
};

/// Default size of the high and low frequency strata.
pub const DEFAULT_STRATUM_SIZE: usize = 10;

/// Numbers each stratum contributes to a mixed game.
const MIXED_SPLIT: usize = NUMBERS_PER_DRAW / 2;

/// Draws allowed per requested suggestion before giving up on finding more
/// distinct combinations.
const ATTEMPTS_PER_SUGGESTION: usize = 50;

/// Sampling strategy for one group of suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionCategory {
    HighFrequency,
    LowFrequency,
    Mixed,
}

impl SuggestionCategory {
    pub const ALL: [SuggestionCategory; 3] = [
        SuggestionCategory::HighFrequency,
        SuggestionCategory::LowFrequency,
        SuggestionCategory::Mixed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SuggestionCategory::HighFrequency => "Most drawn",
            SuggestionCategory::LowFrequency => "Least drawn",
            SuggestionCategory::Mixed => "Mixed",
        }
    }
}

impl std::fmt::Display for SuggestionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One suggested game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    /// Numbers in display order (shuffled for mixed games, sorted otherwise)
    pub numbers: Vec<u8>,
    pub combination: Combination,
    /// Contests that already drew this exact combination
    pub historical_matches: Vec<ContestId>,
}

impl Suggestion {
    fn new(numbers: Vec<u8>, combination: Combination, index: &CombinationIndex) -> Self {
        Self {
            numbers,
            historical_matches: index.lookup(&combination).to_vec(),
            combination,
        }
    }

    pub fn has_occurred(&self) -> bool {
        !self.historical_matches.is_empty()
    }
}

/// What a category produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CategoryOutcome {
    Generated { suggestions: Vec<Suggestion> },
    /// Fewer than six numbers have ever been drawn
    InsufficientData { available: usize },
}

impl CategoryOutcome {
    pub fn suggestions(&self) -> &[Suggestion] {
        match self {
            CategoryOutcome::Generated { suggestions } => suggestions,
            CategoryOutcome::InsufficientData { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySuggestions {
    pub category: SuggestionCategory,
    pub outcome: CategoryOutcome,
}

/// Sampling pools derived from a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Strata {
    /// Most drawn numbers, most drawn first
    pub high: Vec<u8>,
    /// Least drawn numbers, least drawn first
    pub low: Vec<u8>,
    /// Set when too few numbers are represented for real strata; every
    /// category then samples from `high`, which holds all represented numbers.
    pub fallback: bool,
}

impl Strata {
    /// `None` when fewer than six numbers were ever drawn.
    pub fn from_frequencies(
        frequencies: &NumberFrequencyTable,
        stratum_size: usize,
    ) -> Option<Self> {
        let represented = frequencies.represented();
        if represented < NUMBERS_PER_DRAW {
            return None;
        }

        let stratum_size = stratum_size.max(NUMBERS_PER_DRAW);
        if represented < stratum_size {
            let pool: Vec<u8> = frequencies
                .top(represented)
                .into_iter()
                .map(|f| f.number)
                .collect();
            return Some(Self {
                high: pool,
                low: Vec::new(),
                fallback: true,
            });
        }

        Some(Self {
            high: frequencies.top(stratum_size).into_iter().map(|f| f.number).collect(),
            low: frequencies.bottom(stratum_size).into_iter().map(|f| f.number).collect(),
            fallback: false,
        })
    }

    fn pool(&self, category: SuggestionCategory) -> &[u8] {
        match category {
            SuggestionCategory::LowFrequency if !self.fallback => &self.low,
            _ => &self.high,
        }
    }

    /// Upper bound on distinct combinations `category` can produce.
    pub fn capacity(&self, category: SuggestionCategory) -> u64 {
        match category {
            SuggestionCategory::Mixed if !self.fallback => {
                binomial(self.high.len(), MIXED_SPLIT) * binomial(self.low.len(), MIXED_SPLIT)
            }
            _ => binomial(self.pool(category).len(), NUMBERS_PER_DRAW),
        }
    }

    fn sample<R: Rng + ?Sized>(&self, category: SuggestionCategory, rng: &mut R) -> Vec<u8> {
        match category {
            SuggestionCategory::Mixed if !self.fallback => {
                let mut numbers = sample_distinct(&self.high, MIXED_SPLIT, rng);
                numbers.extend(sample_distinct(&self.low, MIXED_SPLIT, rng));
                numbers.shuffle(rng);
                numbers
            }
            SuggestionCategory::Mixed => {
                let mut numbers = sample_distinct(&self.high, NUMBERS_PER_DRAW, rng);
                numbers.shuffle(rng);
                numbers
            }
            _ => {
                let mut numbers = sample_distinct(self.pool(category), NUMBERS_PER_DRAW, rng);
                numbers.sort_unstable();
                numbers
            }
        }
    }
}

/// Suggestions for every category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionSet {
    /// Pools used, absent when data was insufficient
    pub strata: Option<Strata>,
    pub categories: Vec<CategorySuggestions>,
}

impl SuggestionSet {
    pub fn category(&self, category: SuggestionCategory) -> Option<&CategorySuggestions> {
        self.categories.iter().find(|c| c.category == category)
    }

    pub fn is_insufficient(&self) -> bool {
        self.strata.is_none()
    }
}

/// Generate up to `count` distinct suggestions per category.
///
/// Reads `index` only to annotate matches. If a stratum admits fewer distinct
/// combinations than requested, the category yields as many as exist.
pub fn generate_suggestions<R: Rng + ?Sized>(
    frequencies: &NumberFrequencyTable,
    index: &CombinationIndex,
    count: usize,
    stratum_size: usize,
    rng: &mut R,
) -> SuggestionSet {
    let Some(strata) = Strata::from_frequencies(frequencies, stratum_size) else {
        let available = frequencies.represented();
        debug!("Only {} numbers represented, no suggestions", available);
        return SuggestionSet {
            strata: None,
            categories: SuggestionCategory::ALL
                .iter()
                .map(|&category| CategorySuggestions {
                    category,
                    outcome: CategoryOutcome::InsufficientData { available },
                })
                .collect(),
        };
    };

    if strata.fallback {
        debug!(
            "Only {} numbers represented, sampling all categories from them",
            strata.high.len()
        );
    }

    let categories = SuggestionCategory::ALL
        .iter()
        .map(|&category| CategorySuggestions {
            category,
            outcome: CategoryOutcome::Generated {
                suggestions: fill_category(&strata, category, count, index, rng),
            },
        })
        .collect();

    SuggestionSet {
        strata: Some(strata),
        categories,
    }
}

fn fill_category<R: Rng + ?Sized>(
    strata: &Strata,
    category: SuggestionCategory,
    count: usize,
    index: &CombinationIndex,
    rng: &mut R,
) -> Vec<Suggestion> {
    let target = usize::try_from(strata.capacity(category))
        .map_or(count, |capacity| capacity.min(count));
    let mut seen = HashSet::with_capacity(target);
    let mut suggestions = Vec::with_capacity(target);
    let mut attempts = target * ATTEMPTS_PER_SUGGESTION;

    while suggestions.len() < target && attempts > 0 {
        attempts -= 1;
        let numbers = strata.sample(category, rng);
        let Ok(combination) = Combination::new(&numbers) else {
            continue;
        };
        if seen.insert(combination) {
            suggestions.push(Suggestion::new(numbers, combination, index));
        }
    }

    if suggestions.len() < count {
        debug!(
            "{}: produced {} of {} requested suggestions",
            category,
            suggestions.len(),
            count
        );
    }
    suggestions
}

fn sample_distinct<R: Rng + ?Sized>(pool: &[u8], amount: usize, rng: &mut R) -> Vec<u8> {
    let amount = amount.min(pool.len());
    index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i])
        .collect()
}

/// `n` choose `k`.
fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1u64, |acc, i| acc * (n - i) as u64 / (i + 1) as u64)
}
