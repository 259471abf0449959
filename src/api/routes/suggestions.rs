use axum::extract::{Query, State};
use axum::Json;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{parse_limit, ApiError};
use crate::suggest::SuggestionSet;

#[derive(Debug, Deserialize)]
pub struct SuggestionParams {
    pub count: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub count: usize,
    #[serde(flatten)]
    pub set: SuggestionSet,
}

pub async fn suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    let count = parse_limit(
        "count",
        params.count.as_deref(),
        state.suggestions.default_count,
        state.suggestions.max_count,
    )?;

    let mut rng = StdRng::from_rng(&mut rand::rng());
    let session = state.session.read().await;
    let set = session.suggest(count, &mut rng);

    Ok(Json(SuggestionsResponse { count, set }))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::test_support::*;
    use axum::http::StatusCode;
    use serde_json::Value;

    #[tokio::test]
    async fn test_suggestions_per_category() {
        let app = build_router(state_with(sample_draws()).await);
        let (status, json) = get_json(app, "/api/suggestions?count=3").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 3);
        let categories = json["categories"].as_array().unwrap();
        assert_eq!(categories.len(), 3);
        for category in categories {
            assert_eq!(category["outcome"]["status"], "generated");
            let games = category["outcome"]["suggestions"].as_array().unwrap();
            assert_eq!(games.len(), 3);
            for game in games {
                let numbers: Vec<u64> = game["numbers"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|n| n.as_u64().unwrap())
                    .collect();
                assert_eq!(numbers.len(), 6);
                assert!(numbers.iter().all(|n| (1..=60).contains(n)));
            }
        }
    }

    #[tokio::test]
    async fn test_suggestions_default_count() {
        let app = build_router(state_with(sample_draws()).await);
        let (status, json) = get_json(app, "/api/suggestions").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 1);
    }

    #[tokio::test]
    async fn test_suggestions_count_out_of_range() {
        let app = build_router(state_with(sample_draws()).await);

        let (status, _) = get_json(app.clone(), "/api/suggestions?count=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(app, "/api/suggestions?count=31").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_suggestions_without_data() {
        let app = build_router(empty_state());
        let (status, json) = get_json(app, "/api/suggestions").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["strata"], Value::Null);
        for category in json["categories"].as_array().unwrap() {
            assert_eq!(category["outcome"]["status"], "insufficient_data");
            assert_eq!(category["outcome"]["available"], 0);
        }
    }
}
