use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use tracing::info;

use super::controls_not_ready;
use crate::AppState;
use shared::ChartClickRequest;

/// Create a router for chart selection APIs
pub fn router() -> Router<AppState> {
    Router::new().route("/click", post(handle_chart_click))
}

/// A click on the monthly chart (month axis) or a category chart.
///
/// `labels` are the labels the clicked chart currently shows; the index is
/// resolved against them.
async fn handle_chart_click(
    State(state): State<AppState>,
    Json(request): Json<ChartClickRequest>,
) -> Response {
    info!(
        "POST /api/selection/click - axis: {}, index: {}",
        request.axis, request.index
    );

    let mut phase = state.dashboard.lock().await;
    match phase.coordinator_mut() {
        Some(coordinator) => {
            coordinator.handle_chart_click(request.axis, request.index, &request.labels);
            StatusCode::NO_CONTENT.into_response()
        }
        None => controls_not_ready(),
    }
}
