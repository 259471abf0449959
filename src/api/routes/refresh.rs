use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::api::state::AppState;
use crate::normalize::NormalizeReport;

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// Whether the served session was replaced
    pub refreshed: bool,
    pub draws: usize,
    pub report: NormalizeReport,
    pub loaded_at: Option<DateTime<Utc>>,
    pub source_error: Option<String>,
}

/// Rebuild the session from the source, bypassing response caches.
///
/// A failed reload keeps serving the previous session when it had data.
pub async fn refresh(State(state): State<AppState>) -> Json<RefreshResponse> {
    let fresh = state.loader.reload().await;
    let source_error = fresh.source_error().map(str::to_string);

    let mut session = state.session.write().await;
    let refreshed = source_error.is_none() || session.is_empty();
    if refreshed {
        info!("Refreshed session with {} draws", fresh.draws().len());
        *session = fresh;
    } else {
        warn!(
            "Refresh failed, keeping {} previously loaded draws",
            session.draws().len()
        );
    }

    Json(RefreshResponse {
        refreshed,
        draws: session.draws().len(),
        report: session.report().clone(),
        loaded_at: session.loaded_at(),
        source_error,
    })
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::state::AppState;
    use crate::api::test_support::*;
    use crate::config::{AnalysisConfig, SuggestionsConfig};
    use crate::session::{AnalysisSession, SessionLoader};
    use crate::source::MemoryDrawSource;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_refresh_replaces_empty_session() {
        let loader = SessionLoader::new(
            Box::new(MemoryDrawSource::new(sample_draws())),
            AnalysisConfig::default(),
        );
        let state = AppState::new(loader, AnalysisSession::empty(), SuggestionsConfig::default());
        let app = build_router(state);

        let (status, json) = get_json(app.clone(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["draws"], 0);

        let (status, json) = post_json(app.clone(), "/api/refresh", "{}").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["refreshed"], true);
        assert_eq!(json["draws"], 4);
        assert_eq!(json["report"]["total"], 4);

        let (_, json) = get_json(app, "/api/repeats").await;
        assert_eq!(json["total_repeats"], 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_data() {
        let loaded = AnalysisSession::build(&sample_draws(), &AnalysisConfig::default());
        let loader = SessionLoader::new(
            Box::new(MemoryDrawSource::unavailable()),
            AnalysisConfig::default(),
        );
        let state = AppState::new(loader, loaded, SuggestionsConfig::default());
        let app = build_router(state);

        let (status, json) = post_json(app.clone(), "/api/refresh", "{}").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["refreshed"], false);
        assert_eq!(json["draws"], 4);
        assert!(json["source_error"].is_string());

        let (_, json) = get_json(app, "/api/health").await;
        assert_eq!(json["draws"], 4);
    }

    #[tokio::test]
    async fn test_refresh_get_not_allowed() {
        let app = build_router(empty_state());
        let (status, _) = get_json(app, "/api/refresh").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
