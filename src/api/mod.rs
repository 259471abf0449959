//! REST API endpoints.
//!
//! Axum-based JSON API over the current analysis session: draw summary,
//! number frequencies, prize rankings, repeated combinations and
//! suggestions.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use state::AppState;

/// Largest `top` accepted by ranking endpoints.
pub const MAX_TOP: usize = 100;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Parse an optional positive limit from a query string.
///
/// Query values are taken as raw strings so malformed input gets the JSON
/// error body instead of axum's plain-text rejection.
pub fn parse_limit(
    name: &str,
    raw: Option<&str>,
    default: usize,
    max: usize,
) -> Result<usize, ApiError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value: usize = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{} must be a positive integer", name)))?;
    if value == 0 || value > max {
        return Err(ApiError::BadRequest(format!(
            "{} must be between 1 and {}, got {}",
            name, max, value
        )));
    }
    Ok(value)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!("Invalid CORS origin {:?}, allowing any", origin);
            layer.allow_origin(Any)
        }
    }
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origin);

    Router::new()
        .route("/api/health", get(routes::stats::health))
        .route("/api/overview", get(routes::stats::overview))
        .route("/api/numbers", get(routes::stats::numbers))
        .route("/api/prizes", get(routes::prizes::prizes))
        .route("/api/prizes/states/:uf", get(routes::prizes::state_detail))
        .route("/api/repeats", get(routes::repeats::repeats))
        .route("/api/repeats/lookup", get(routes::repeats::lookup))
        .route("/api/suggestions", get(routes::suggestions::suggestions))
        .route("/api/refresh", post(routes::refresh::refresh))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_parse_limit_default() {
        assert_eq!(parse_limit("top", None, 10, MAX_TOP).unwrap(), 10);
    }

    #[test]
    fn test_parse_limit_bounds() {
        assert_eq!(parse_limit("top", Some("100"), 10, MAX_TOP).unwrap(), 100);
        assert!(matches!(
            parse_limit("top", Some("0"), 10, MAX_TOP),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            parse_limit("top", Some("101"), 10, MAX_TOP),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            parse_limit("count", Some("lots"), 1, 30),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::NotFound("State XX".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], "Not found: State XX");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = build_router(empty_state());
        let (status, _) = get_json(app, "/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_header_present() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::util::ServiceExt;

        let app = build_router(empty_state());
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("origin", "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            resp.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}
