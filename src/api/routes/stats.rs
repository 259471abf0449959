use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::state::AppState;
use crate::calculate::percentage;
use crate::models::DrawSummary;
use crate::normalize::NormalizeReport;

// ── Health ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub draws: usize,
    pub loaded_at: Option<DateTime<Utc>>,
    /// Set when the last load could not reach the draw source
    pub source_error: Option<String>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let session = state.session.read().await;
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        draws: session.draws().len(),
        loaded_at: session.loaded_at(),
        source_error: session.source_error().map(str::to_string),
    })
}

// ── Overview ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub summary: DrawSummary,
    pub report: NormalizeReport,
    pub total_repeats: usize,
    pub total_winners: u32,
    pub distinct_states: usize,
    pub distinct_municipalities: usize,
    pub even_share: f64,
}

pub async fn overview(State(state): State<AppState>) -> Json<OverviewResponse> {
    let session = state.session.read().await;
    let summary = session.summary().clone();
    let prizes = session.prizes();

    Json(OverviewResponse {
        even_share: round1(percentage(
            summary.even_count,
            summary.even_count + summary.odd_count,
        )),
        report: session.report().clone(),
        total_repeats: session.total_repeats(),
        total_winners: prizes.total_winners(),
        distinct_states: prizes.distinct_states(),
        distinct_municipalities: prizes.distinct_municipalities(),
        summary,
    })
}

// ── Numbers ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct NumberRow {
    pub number: u8,
    pub occurrences: u32,
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct NumbersResponse {
    pub total_occurrences: u64,
    pub represented: usize,
    /// Ranked by occurrences; empty when no draw has been loaded
    pub numbers: Vec<NumberRow>,
}

pub async fn numbers(State(state): State<AppState>) -> Json<NumbersResponse> {
    let session = state.session.read().await;
    let table = session.frequencies();
    let total = table.total();

    let numbers = if table.is_empty() {
        Vec::new()
    } else {
        table
            .ranked()
            .into_iter()
            .map(|f| NumberRow {
                number: f.number,
                occurrences: f.occurrences,
                percentage: round1(percentage(f.occurrences as u64, total)),
            })
            .collect()
    };

    Json(NumbersResponse {
        total_occurrences: total,
        represented: table.represented(),
        numbers,
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health() {
        let app = build_router(state_with(sample_draws()).await);
        let (status, json) = get_json(app, "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["draws"], 4);
        assert!(json["source_error"].is_null());
    }

    #[tokio::test]
    async fn test_overview() {
        let app = build_router(state_with(sample_draws()).await);
        let (status, json) = get_json(app, "/api/overview").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["summary"]["total_draws"], 4);
        assert_eq!(json["summary"]["complete_draws"], 4);
        assert_eq!(json["summary"]["first_date"], "1996-03-11");
        assert_eq!(json["report"]["normalized"], 4);
        assert_eq!(json["total_repeats"], 1);
        assert_eq!(json["total_winners"], 5);
        assert_eq!(json["distinct_states"], 2);
        assert_eq!(json["distinct_municipalities"], 3);
    }

    #[tokio::test]
    async fn test_numbers_ranked() {
        let app = build_router(state_with(sample_draws()).await);
        let (status, json) = get_json(app, "/api/numbers").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_occurrences"], 24);
        assert_eq!(json["represented"], 17);
        let numbers = json["numbers"].as_array().unwrap();
        assert_eq!(numbers.len(), 60);
        assert_eq!(numbers[0]["number"], 41);
        assert_eq!(numbers[0]["occurrences"], 3);
        assert_eq!(numbers[0]["percentage"], 12.5);
    }

    #[tokio::test]
    async fn test_empty_session_renders_zeros() {
        let app = build_router(empty_state());

        let (status, json) = get_json(app.clone(), "/api/numbers").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_occurrences"], 0);
        assert!(json["numbers"].as_array().unwrap().is_empty());

        let (status, json) = get_json(app, "/api/overview").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["summary"]["total_draws"], 0);
        assert_eq!(json["even_share"], 0.0);
    }
}
