//! CSV table cache.
//!
//! Flat exports of the winner events and the number frequency table. They are
//! a convenience only: a missing or unreadable file reads as `None` and the
//! caller rebuilds from raw draws.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{StorageConfig, StorageError};
use crate::models::{format_number, ContestId, NumberFrequencyTable, WinnerEvent};
use crate::normalize::{parse_source_date, SOURCE_DATE_FORMAT};

/// Tables kept in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    WinnerEvents,
    NumberFrequencies,
}

impl TableKind {
    pub fn filename(&self) -> &'static str {
        match self {
            TableKind::WinnerEvents => "winner_events.csv",
            TableKind::NumberFrequencies => "number_frequencies.csv",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WinnerEventRow {
    contest: u32,
    date: String,
    municipality: String,
    state: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct FrequencyRow {
    number: String,
    occurrences: u32,
}

/// Reads and writes the CSV tables under one directory.
#[derive(Debug, Clone)]
pub struct TableStore {
    dir: PathBuf,
}

impl TableStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn for_config(config: &StorageConfig) -> Self {
        Self::new(config.tables_dir())
    }

    pub fn path(&self, kind: TableKind) -> PathBuf {
        self.dir.join(kind.filename())
    }

    /// Replace the winner events table. Returns the number of rows written.
    pub fn write_winner_events(&self, events: &[WinnerEvent]) -> Result<usize, StorageError> {
        let mut writer = self.writer(TableKind::WinnerEvents)?;
        for event in events {
            writer.serialize(WinnerEventRow {
                contest: event.contest.get(),
                date: event
                    .date
                    .map(|d| d.format(SOURCE_DATE_FORMAT).to_string())
                    .unwrap_or_default(),
                municipality: event.municipality.clone(),
                state: event.state.clone(),
            })?;
        }
        writer.flush()?;
        info!(
            "Wrote {} winner events to {:?}",
            events.len(),
            self.path(TableKind::WinnerEvents)
        );
        Ok(events.len())
    }

    /// Replace the number frequency table, one row per number 01..60.
    pub fn write_number_frequencies(
        &self,
        table: &NumberFrequencyTable,
    ) -> Result<usize, StorageError> {
        let mut writer = self.writer(TableKind::NumberFrequencies)?;
        let mut count = 0;
        for entry in table.iter() {
            writer.serialize(FrequencyRow {
                number: format_number(entry.number),
                occurrences: entry.occurrences,
            })?;
            count += 1;
        }
        writer.flush()?;
        debug!("Wrote {} frequency rows", count);
        Ok(count)
    }

    /// Cached winner events, `None` if absent or unreadable.
    pub fn read_winner_events(&self) -> Option<Vec<WinnerEvent>> {
        self.read_or_warn(TableKind::WinnerEvents, |store| store.try_read_winner_events())
    }

    /// Cached frequency table, `None` if absent or unreadable.
    pub fn read_number_frequencies(&self) -> Option<NumberFrequencyTable> {
        self.read_or_warn(TableKind::NumberFrequencies, |store| {
            store.try_read_number_frequencies()
        })
    }

    fn read_or_warn<T, F>(&self, kind: TableKind, read: F) -> Option<T>
    where
        F: FnOnce(&Self) -> Result<T, StorageError>,
    {
        let path = self.path(kind);
        if !path.exists() {
            debug!("No cached table at {:?}", path);
            return None;
        }
        match read(self) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring unreadable table {:?}: {}", path, e);
                None
            }
        }
    }

    fn try_read_winner_events(&self) -> Result<Vec<WinnerEvent>, StorageError> {
        let kind = TableKind::WinnerEvents;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(self.path(kind))?;

        let mut events = Vec::new();
        for row in reader.deserialize() {
            let row: WinnerEventRow = row?;
            let contest = ContestId::new(row.contest).ok_or_else(|| StorageError::InvalidRow {
                file: kind.filename().to_string(),
                message: format!("contest id {}", row.contest),
            })?;
            events.push(WinnerEvent {
                contest,
                date: parse_source_date(&row.date),
                municipality: row.municipality,
                state: row.state,
            });
        }
        Ok(events)
    }

    fn try_read_number_frequencies(&self) -> Result<NumberFrequencyTable, StorageError> {
        let kind = TableKind::NumberFrequencies;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(self.path(kind))?;

        let mut counts = Vec::new();
        for row in reader.deserialize() {
            let row: FrequencyRow = row?;
            let number: u8 = row.number.parse().map_err(|_| StorageError::InvalidRow {
                file: kind.filename().to_string(),
                message: format!("number {:?}", row.number),
            })?;
            counts.push((number, row.occurrences));
        }
        Ok(NumberFrequencyTable::from_counts(counts))
    }

    fn writer(&self, kind: TableKind) -> Result<csv::Writer<BufWriter<File>>, StorageError> {
        fs::create_dir_all(&self.dir)?;
        let file = File::create(self.path(kind))?;
        Ok(csv::Writer::from_writer(BufWriter::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Combination;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store(temp_dir: &TempDir) -> TableStore {
        TableStore::for_config(&StorageConfig::new(temp_dir.path().to_path_buf()))
    }

    #[test]
    fn test_missing_tables_read_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        assert!(store.read_winner_events().is_none());
        assert!(store.read_number_frequencies().is_none());
    }

    #[test]
    fn test_winner_events_file_layout() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let events = vec![
            WinnerEvent {
                contest: ContestId::new(12).unwrap(),
                date: NaiveDate::from_ymd_opt(1996, 5, 4),
                municipality: "SÃO PAULO".to_string(),
                state: "SP".to_string(),
            },
            WinnerEvent {
                contest: ContestId::new(13).unwrap(),
                date: None,
                municipality: "BRASILIA".to_string(),
                state: "DF".to_string(),
            },
        ];

        assert_eq!(store.write_winner_events(&events).unwrap(), 2);
        let text = fs::read_to_string(store.path(TableKind::WinnerEvents)).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "contest,date,municipality,state");
        assert_eq!(lines[1], "12,04/05/1996,SÃO PAULO,SP");
        assert_eq!(lines[2], "13,,BRASILIA,DF");

        assert_eq!(store.read_winner_events().unwrap(), events);
    }

    #[test]
    fn test_frequency_file_layout() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let mut table = NumberFrequencyTable::new();
        table.record(&Combination::new(&[1, 2, 3, 4, 5, 60]).unwrap());

        assert_eq!(store.write_number_frequencies(&table).unwrap(), 60);
        let text = fs::read_to_string(store.path(TableKind::NumberFrequencies)).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 61);
        assert_eq!(lines[0], "number,occurrences");
        assert_eq!(lines[1], "01,1");
        assert_eq!(lines[7], "07,0");

        assert_eq!(store.read_number_frequencies().unwrap(), table);
    }

    #[test]
    fn test_corrupt_table_reads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        fs::create_dir_all(temp_dir.path().join("tables")).unwrap();
        fs::write(
            store.path(TableKind::NumberFrequencies),
            "number,occurrences\nabc,not-a-count\n",
        )
        .unwrap();
        fs::write(
            store.path(TableKind::WinnerEvents),
            "contest,date,municipality,state\n0,,X,SP\n",
        )
        .unwrap();

        assert!(store.read_number_frequencies().is_none());
        assert!(store.read_winner_events().is_none());
    }
}
