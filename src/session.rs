//! Analysis session.
//!
//! A session owns one draw set and every table derived from it. Sessions are
//! immutable once built; refreshing data means building a new session through
//! [`SessionLoader::reload`].

use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::Value;
use tracing::{info, warn};

use crate::calculate::{build_index, number_frequencies, summarize, winner_events, PrizeAggregator};
use crate::config::AnalysisConfig;
use crate::models::{
    Combination, CombinationIndex, ContestId, DrawRecord, DrawSummary, NumberFrequencyTable,
    PrizeAggregate, WinnerEvent,
};
use crate::normalize::{NormalizeReport, Normalizer};
use crate::source::DrawSource;
use crate::storage::TableStore;
use crate::suggest::{generate_suggestions, SuggestionSet, DEFAULT_STRATUM_SIZE};

/// One draw set and its derived tables.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    draws: Vec<DrawRecord>,
    report: NormalizeReport,
    frequencies: NumberFrequencyTable,
    prizes: PrizeAggregate,
    index: CombinationIndex,
    summary: DrawSummary,
    stratum_size: usize,
    loaded_at: Option<DateTime<Utc>>,
    source_error: Option<String>,
}

impl AnalysisSession {
    /// Normalize `raw` and derive every table from it.
    pub fn build(raw: &[Value], config: &AnalysisConfig) -> Self {
        let output = Normalizer::default()
            .with_max_winners_per_entry(config.max_winners_per_entry)
            .normalize_all(raw);
        Self::from_draws(output.draws, output.report, config)
    }

    /// Derive every table from already normalized draws.
    pub fn from_draws(
        draws: Vec<DrawRecord>,
        report: NormalizeReport,
        config: &AnalysisConfig,
    ) -> Self {
        let aggregator = PrizeAggregator::new(&config.invalid_state_codes);
        Self {
            frequencies: number_frequencies(&draws),
            prizes: aggregator.aggregate(&draws),
            index: build_index(&draws),
            summary: summarize(&draws),
            stratum_size: config.stratum_size,
            loaded_at: Some(Utc::now()),
            source_error: None,
            report,
            draws,
        }
    }

    /// A session with no draws; every table reports "no data".
    pub fn empty() -> Self {
        Self {
            draws: Vec::new(),
            report: NormalizeReport::default(),
            frequencies: NumberFrequencyTable::new(),
            prizes: PrizeAggregate::empty(),
            index: CombinationIndex::new(),
            summary: DrawSummary::default(),
            stratum_size: DEFAULT_STRATUM_SIZE,
            loaded_at: None,
            source_error: None,
        }
    }

    fn unavailable(error: String, config: &AnalysisConfig) -> Self {
        Self {
            stratum_size: config.stratum_size,
            source_error: Some(error),
            ..Self::empty()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn report(&self) -> &NormalizeReport {
        &self.report
    }

    pub fn frequencies(&self) -> &NumberFrequencyTable {
        &self.frequencies
    }

    pub fn prizes(&self) -> &PrizeAggregate {
        &self.prizes
    }

    pub fn index(&self) -> &CombinationIndex {
        &self.index
    }

    pub fn summary(&self) -> &DrawSummary {
        &self.summary
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    /// Why the source could not be read, if it failed.
    pub fn source_error(&self) -> Option<&str> {
        self.source_error.as_deref()
    }

    pub fn total_repeats(&self) -> usize {
        self.index.total_repeats()
    }

    pub fn lookup(&self, combination: &Combination) -> &[ContestId] {
        self.index.lookup(combination)
    }

    /// Flat winner events for the table cache.
    pub fn winner_events(&self) -> Vec<WinnerEvent> {
        winner_events(&self.draws)
    }

    /// Suggestions over this session's frequencies and index.
    pub fn suggest<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> SuggestionSet {
        generate_suggestions(&self.frequencies, &self.index, count, self.stratum_size, rng)
    }
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::empty()
    }
}

/// Builds sessions from a draw source.
pub struct SessionLoader {
    source: Box<dyn DrawSource>,
    config: AnalysisConfig,
    tables: Option<TableStore>,
}

impl SessionLoader {
    pub fn new(source: Box<dyn DrawSource>, config: AnalysisConfig) -> Self {
        Self {
            source,
            config,
            tables: None,
        }
    }

    /// Builder method to export CSV tables after each successful load.
    pub fn with_table_store(mut self, tables: TableStore) -> Self {
        self.tables = Some(tables);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load a session, allowing cached responses.
    pub async fn load(&self) -> AnalysisSession {
        self.load_with(false).await
    }

    /// Load a session, bypassing response caches.
    pub async fn reload(&self) -> AnalysisSession {
        self.load_with(true).await
    }

    async fn load_with(&self, fresh: bool) -> AnalysisSession {
        let raw = match self.source.load(fresh).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "Draw source '{}' unavailable, continuing with no data: {}",
                    self.source.name(),
                    e
                );
                return AnalysisSession::unavailable(e.to_string(), &self.config);
            }
        };

        let session = AnalysisSession::build(&raw, &self.config);
        info!(
            "Session ready: {} draws, {} repeats, {} prize municipalities",
            session.draws().len(),
            session.total_repeats(),
            session.prizes().distinct_municipalities()
        );
        self.export_tables(&session);
        session
    }

    /// Frequencies from the CSV table cache, if one was exported.
    pub fn cached_frequencies(&self) -> Option<NumberFrequencyTable> {
        self.tables.as_ref()?.read_number_frequencies()
    }

    /// Prize rankings rebuilt from the cached winner events, if exported.
    pub fn cached_prizes(&self) -> Option<PrizeAggregate> {
        let events = self.tables.as_ref()?.read_winner_events()?;
        Some(PrizeAggregator::new(&self.config.invalid_state_codes).aggregate_events(&events))
    }

    /// Write the CSV tables; failures are logged, never returned.
    pub fn export_tables(&self, session: &AnalysisSession) {
        let Some(tables) = &self.tables else {
            return;
        };
        if let Err(e) = tables.write_winner_events(&session.winner_events()) {
            warn!("Could not write winner events table: {}", e);
        }
        if let Err(e) = tables.write_number_frequencies(session.frequencies()) {
            warn!("Could not write frequency table: {}", e);
        }
    }
}
