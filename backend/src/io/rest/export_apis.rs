use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use tracing::{error, info};

use super::controls_not_ready;
use crate::AppState;

/// Create a router for export related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/csv", get(export_csv))
        .route("/report", get(export_report))
}

/// Download the filtered records as CSV
async fn export_csv(State(state): State<AppState>) -> Response {
    info!("GET /api/export/csv");

    let phase = state.dashboard.lock().await;
    let Some(coordinator) = phase.coordinator() else {
        return controls_not_ready();
    };

    match state
        .export_service
        .transactions_csv(coordinator.filtered_records())
    {
        Ok(csv) => {
            let filename = state.export_service.csv_filename(Utc::now());
            (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                csv,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to export transactions: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to export transactions",
            )
                .into_response()
        }
    }
}

/// Report data behind the printable summary
async fn export_report(State(state): State<AppState>) -> Response {
    info!("GET /api/export/report");

    let phase = state.dashboard.lock().await;
    match phase.coordinator() {
        Some(coordinator) => Json(
            state
                .export_service
                .report(coordinator.snapshot(), Utc::now()),
        )
        .into_response(),
        None => controls_not_ready(),
    }
}
