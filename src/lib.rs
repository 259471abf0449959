//! # Mega-Sena Analytics
//!
//! Descriptive statistics over the Mega-Sena draw history.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (combinations, draws, derived tables)
//! - **normalize**: Raw API records to canonical draws
//! - **calculate**: Frequencies, prize aggregation, repeats and summary
//! - **suggest**: Frequency-stratified game suggestions
//! - **session**: One loaded draw set and everything derived from it
//! - **source**: Where raw draws come from (HTTP API, local file)
//! - **fetch**: HTTP fetching with an on-disk response cache
//! - **storage**: Data directory layout and the CSV table cache
//! - **config**: Configuration loading and validation
//! - **api**: REST API endpoints
//! - **display**: Terminal tables for the CLI

pub mod api;
pub mod calculate;
pub mod config;
pub mod display;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod session;
pub mod source;
pub mod storage;
pub mod suggest;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "1d", "6h", "30m", "90s").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('d') {
        (n, 86_400)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.trim().parse().ok()?;
    num.checked_mul(multiplier).map(Duration::from_secs)
}
