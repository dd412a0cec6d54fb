use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use tracing::{debug, info};

use super::controls_not_ready;
use crate::AppState;
use shared::{SearchAcceptedResponse, SearchRequest, SetFilterRequest};

/// Create a router for filter related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/options", get(get_filter_options))
        .route("/month", post(set_month_filter))
        .route("/category", post(set_category_filter))
        .route("/search", post(set_search))
        .route("/clear", post(clear_filters))
}

/// Dropdown option lists from the full dataset
async fn get_filter_options(State(state): State<AppState>) -> Response {
    info!("GET /api/filters/options");
    let phase = state.dashboard.lock().await;
    match phase.coordinator() {
        Some(coordinator) => Json(coordinator.filter_options()).into_response(),
        None => controls_not_ready(),
    }
}

async fn set_month_filter(
    State(state): State<AppState>,
    Json(request): Json<SetFilterRequest>,
) -> Response {
    info!("POST /api/filters/month - value: {}", request.value);
    let mut phase = state.dashboard.lock().await;
    match phase.coordinator_mut() {
        Some(coordinator) => {
            coordinator.set_month_filter(request.value);
            StatusCode::NO_CONTENT.into_response()
        }
        None => controls_not_ready(),
    }
}

async fn set_category_filter(
    State(state): State<AppState>,
    Json(request): Json<SetFilterRequest>,
) -> Response {
    info!("POST /api/filters/category - value: {}", request.value);
    let mut phase = state.dashboard.lock().await;
    match phase.coordinator_mut() {
        Some(coordinator) => {
            coordinator.set_category_filter(request.value);
            StatusCode::NO_CONTENT.into_response()
        }
        None => controls_not_ready(),
    }
}

/// Accept a keystroke's worth of search text.
///
/// The query is applied once no newer text arrives within the debounce
/// window; each call supersedes the pending one.
async fn set_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Response {
    info!("POST /api/filters/search - query: {:?}", request.query);
    if !state.dashboard.lock().await.is_ready() {
        return controls_not_ready();
    }

    let dashboard = state.dashboard.clone();
    let query = request.query.clone();
    let debounce_ms = {
        let mut debouncer = state.debouncer();
        debouncer.schedule(async move {
            let mut phase = dashboard.lock().await;
            if let Some(coordinator) = phase.coordinator_mut() {
                debug!("Applying debounced search {:?}", query);
                coordinator.set_search(query);
            }
        });
        debouncer.delay().as_millis() as u64
    };

    (
        StatusCode::ACCEPTED,
        Json(SearchAcceptedResponse {
            query: request.query,
            debounce_ms,
        }),
    )
        .into_response()
}

/// Reset dropdowns, search text and chart selections in one step
async fn clear_filters(State(state): State<AppState>) -> Response {
    info!("POST /api/filters/clear");
    let dropped_search = state.debouncer().cancel();
    if dropped_search {
        debug!("Dropped pending search on clear");
    }

    let mut phase = state.dashboard.lock().await;
    match phase.coordinator_mut() {
        Some(coordinator) => {
            coordinator.clear_filters();
            StatusCode::NO_CONTENT.into_response()
        }
        None => controls_not_ready(),
    }
}
