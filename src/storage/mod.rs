//! Filesystem data directory operations.
//!
//! Layout under the data directory:
//! - `raw/`: cached API responses (written by the fetcher)
//! - `tables/`: flat CSV exports of derived tables

pub mod tables;

use std::path::PathBuf;
use thiserror::Error;

pub use tables::{TableKind, TableStore};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid row in {file}: {message}")]
    InvalidRow { file: String, message: String },
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.data_dir.join("tables")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));

        assert_eq!(config.raw_dir(), PathBuf::from("/data/raw"));
        assert_eq!(config.tables_dir(), PathBuf::from("/data/tables"));
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }
}
