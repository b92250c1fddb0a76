//! HTTP surface: health check, match lookup and the WebSocket upgrade

use axum::{
    extract::{Path, State},
    http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use uuid::Uuid;

use crate::app::AppState;
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;
use crate::ws::protocol::MatchSnapshot;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&state.config.client_origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/matches/:match_id", get(match_state))
        .route("/ws", get(ws_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// An empty list or a `*` entry opens CORS to every origin
fn allowed_origins(origins: &[String]) -> AllowOrigin {
    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return AllowOrigin::any();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparseable CLIENT_ORIGIN entry");
                None
            }
        })
        .collect();

    AllowOrigin::list(parsed)
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    uptime_secs: u64,
    active_matches: usize,
    active_players: usize,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    let registry = &state.match_registry;
    Json(Health {
        status: "ok",
        uptime_secs: uptime_secs(),
        active_matches: registry.active_matches(),
        active_players: registry.total_players(),
    })
}

/// Current state view of a live match
async fn match_state(
    State(state): State<AppState>,
    Path(match_id): Path<Uuid>,
) -> Result<Json<MatchSnapshot>, LookupError> {
    let handle = state
        .match_registry
        .get(&match_id)
        .ok_or(LookupError::UnknownMatch(match_id))?;

    // The task may end between lookup and query
    handle
        .snapshot()
        .await
        .map(Json)
        .ok_or(LookupError::UnknownMatch(match_id))
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("No live match with id {0}")]
    UnknownMatch(Uuid),
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        let status = match self {
            LookupError::UnknownMatch(_) => StatusCode::NOT_FOUND,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
