use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Query, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::error;

use crate::config;
use crate::leaderboard::rules;
use crate::leaderboard::store::LeaderboardStore;
use crate::leaderboard::LeaderboardSubmission;
use crate::protocol::messages::{ErrorResponse, HealthResponse, LeaderboardResponse};
use crate::server::rate_limit::{self, RateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LeaderboardStore>,
    allowed_origins: Arc<Vec<String>>,
}

pub fn api_router(
    store: Arc<LeaderboardStore>,
    allowed_origins: Vec<String>,
    limiter: Arc<RateLimiter>,
) -> Router {
    let cors = cors_layer(&allowed_origins);
    let state = AppState {
        store,
        allowed_origins: Arc::new(allowed_origins),
    };

    let api = Router::new()
        .route("/health", get(health))
        .route("/leaderboard", get(list_leaderboard).post(submit_score))
        .with_state(state.clone());

    Router::new()
        .nest(config::API_PREFIX, api)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(limiter, rate_limit::enforce))
        .layer(middleware::from_fn_with_state(state, check_origin))
        .layer(cors)
        .layer(DefaultBodyLimit::max(config::MAX_BODY_BYTES))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);
    if allowed_origins.is_empty() {
        cors.allow_origin(AllowOrigin::any())
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

/// Browser requests from outside the allow-list stop here, before any route
/// handler runs. Requests without an Origin header (curl, same-origin, the
/// game client itself) pass through.
async fn check_origin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.allowed_origins.is_empty() {
        if let Some(origin) = request
            .headers()
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
        {
            if !state.allowed_origins.iter().any(|item| item == origin) {
                return (
                    StatusCode::FORBIDDEN,
                    Json(ErrorResponse {
                        error: "origin not allowed".to_string(),
                    }),
                )
                    .into_response();
            }
        }
    }
    next.run(request).await
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[derive(Deserialize)]
struct ListQuery {
    limit: Option<usize>,
}

async fn list_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let entries = state
        .store
        .list(query.limit.unwrap_or(config::DEFAULT_LIST_LIMIT))
        .await;
    let total = entries.len();
    Json(LeaderboardResponse { entries, total })
}

/// The body is decoded leniently into raw JSON first so every rejection —
/// unparsable shape or out-of-bounds values — comes back as the same 400
/// envelope.
async fn submit_score(State(state): State<AppState>, Json(payload): Json<Value>) -> Response {
    let submission: LeaderboardSubmission = match serde_json::from_value(payload) {
        Ok(submission) => submission,
        Err(_) => return invalid_submission(),
    };
    if !rules::is_valid_submission(&submission) {
        return invalid_submission();
    }
    let normalized = rules::normalize_submission(&submission);

    match state.store.add(&normalized).await {
        Ok(entries) => {
            let total = entries.len();
            (
                StatusCode::CREATED,
                Json(LeaderboardResponse { entries, total }),
            )
                .into_response()
        }
        Err(err) => {
            error!(%err, "leaderboard write failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "internal server error".to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn invalid_submission() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "invalid submission: player, score, accuracy, maxCombo and inputMode required"
                .to_string(),
        }),
    )
        .into_response()
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "route not found".to_string(),
        }),
    )
}
