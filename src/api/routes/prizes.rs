use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{parse_limit, ApiError, MAX_TOP};
use crate::models::{MunicipalityPrize, StateBreakdown, StatePrize};

const DEFAULT_TOP: usize = 10;

#[derive(Debug, Deserialize)]
pub struct TopParams {
    pub top: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PrizesResponse {
    pub total_winners: u32,
    pub distinct_states: usize,
    pub distinct_municipalities: usize,
    pub top_municipalities: Vec<MunicipalityPrize>,
    pub states: Vec<StatePrize>,
}

pub async fn prizes(
    State(state): State<AppState>,
    Query(params): Query<TopParams>,
) -> Result<Json<PrizesResponse>, ApiError> {
    let top = parse_limit("top", params.top.as_deref(), DEFAULT_TOP, MAX_TOP)?;
    let session = state.session.read().await;
    let aggregate = session.prizes();

    Ok(Json(PrizesResponse {
        total_winners: aggregate.total_winners(),
        distinct_states: aggregate.distinct_states(),
        distinct_municipalities: aggregate.distinct_municipalities(),
        top_municipalities: aggregate
            .top_municipalities(top)
            .into_iter()
            .cloned()
            .collect(),
        states: aggregate.state_ranking().into_iter().cloned().collect(),
    }))
}

pub async fn state_detail(
    State(state): State<AppState>,
    Path(uf): Path<String>,
    Query(params): Query<TopParams>,
) -> Result<Json<StateBreakdown>, ApiError> {
    let top = parse_limit("top", params.top.as_deref(), DEFAULT_TOP, MAX_TOP)?;
    let session = state.session.read().await;

    session
        .prizes()
        .state_breakdown(&uf, top)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No prize winners for state: {}", uf)))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_prizes_ranking() {
        let app = build_router(state_with(sample_draws()).await);
        let (status, json) = get_json(app, "/api/prizes?top=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_winners"], 5);
        let top = json["top_municipalities"].as_array().unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0]["municipality"], "CURITIBA");
        assert_eq!(top[0]["winners"], 3);
        assert_eq!(top[0]["state_total"], 4);

        let states = json["states"].as_array().unwrap();
        assert_eq!(states[0]["state"], "PR");
        assert_eq!(states[0]["winners"], 4);
        assert_eq!(states[1]["state"], "SP");
    }

    #[tokio::test]
    async fn test_invalid_state_codes_excluded() {
        let app = build_router(state_with(sample_draws()).await);
        let (_, json) = get_json(app, "/api/prizes").await;

        let states = json["states"].as_array().unwrap();
        assert!(states.iter().all(|s| s["state"] != "--"));
    }

    #[tokio::test]
    async fn test_state_detail_with_others() {
        let app = build_router(state_with(sample_draws()).await);
        let (status, json) = get_json(app, "/api/prizes/states/pr?top=1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["state"], "PR");
        assert_eq!(json["total"], 4);
        assert_eq!(json["entries"][0]["municipality"], "CURITIBA");
        assert_eq!(json["others"]["municipalities"], 1);
        assert_eq!(json["others"]["winners"], 1);
    }

    #[tokio::test]
    async fn test_unknown_state_is_404() {
        let app = build_router(state_with(sample_draws()).await);
        let (status, json) = get_json(app, "/api/prizes/states/AM").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_bad_top_is_400() {
        let app = build_router(state_with(sample_draws()).await);
        let (status, json) = get_json(app, "/api/prizes?top=zero").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_empty_prizes() {
        let app = build_router(empty_state());
        let (status, json) = get_json(app, "/api/prizes").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_winners"], 0);
        assert!(json["top_municipalities"].as_array().unwrap().is_empty());
        assert!(json["states"].as_array().unwrap().is_empty());
    }
}
