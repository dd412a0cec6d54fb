use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::debug;

use crate::AppState;

/// Create a router for the dashboard snapshot
pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

/// Current lifecycle status, with the latest snapshot once ready
async fn get_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    debug!("GET /api/dashboard");
    let phase = state.dashboard.lock().await;
    (StatusCode::OK, Json(phase.status()))
}
