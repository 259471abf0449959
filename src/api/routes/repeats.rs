use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{Combination, ContestId, RepeatedCombination};

#[derive(Debug, Serialize)]
pub struct RepeatsResponse {
    /// Distinct combinations seen so far
    pub indexed_combinations: usize,
    pub total_repeats: usize,
    pub repeats: Vec<RepeatedCombination>,
}

pub async fn repeats(State(state): State<AppState>) -> Json<RepeatsResponse> {
    let session = state.session.read().await;
    let index = session.index();

    Json(RepeatsResponse {
        indexed_combinations: index.len(),
        total_repeats: index.total_repeats(),
        repeats: index.repeats(),
    })
}

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub numbers: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub combination: Combination,
    pub occurred: bool,
    pub contests: Vec<ContestId>,
}

pub async fn lookup(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Result<Json<LookupResponse>, ApiError> {
    let raw = params
        .numbers
        .ok_or_else(|| ApiError::BadRequest("numbers is required".to_string()))?;
    let combination: Combination = raw
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid numbers '{}': {}", raw, e)))?;

    let session = state.session.read().await;
    let contests = session.lookup(&combination).to_vec();

    Ok(Json(LookupResponse {
        combination,
        occurred: !contests.is_empty(),
        contests,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_repeats_listing() {
        let app = build_router(state_with(sample_draws()).await);
        let (status, json) = get_json(app, "/api/repeats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["indexed_combinations"], 3);
        assert_eq!(json["total_repeats"], 1);
        assert_eq!(json["repeats"][0]["combination"], "04-05-30-33-41-52");
        assert_eq!(json["repeats"][0]["contests"], json!([1, 3]));
    }

    #[tokio::test]
    async fn test_lookup_any_order() {
        let app = build_router(state_with(sample_draws()).await);
        let (status, json) = get_json(app, "/api/repeats/lookup?numbers=52,41,33,30,5,4").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["combination"], "04-05-30-33-41-52");
        assert_eq!(json["occurred"], true);
        assert_eq!(json["contests"], json!([1, 3]));
    }

    #[tokio::test]
    async fn test_lookup_never_drawn() {
        let app = build_router(state_with(sample_draws()).await);
        let (status, json) =
            get_json(app, "/api/repeats/lookup?numbers=01-02-03-04-05-06").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["occurred"], false);
        assert_eq!(json["contests"], json!([]));
    }

    #[tokio::test]
    async fn test_lookup_rejects_malformed_numbers() {
        let app = build_router(state_with(sample_draws()).await);

        let (status, _) = get_json(app.clone(), "/api/repeats/lookup?numbers=1,2,3").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(app.clone(), "/api/repeats/lookup?numbers=1,2,3,4,5,61").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(app, "/api/repeats/lookup").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
