//! # REST API Interface Layer
//!
//! HTTP endpoints the browser dashboard drives the engine through.
//!
//! ## Supported Operations
//!
//! - **GET /api/dashboard**: lifecycle status plus the current snapshot
//! - **GET /api/filters/options**: month and category dropdown options
//! - **POST /api/filters/{month,category}**: dropdown changes
//! - **POST /api/filters/search**: debounced search text
//! - **POST /api/filters/clear**: reset every filter and selection
//! - **POST /api/selection/click**: chart click entry point
//! - **GET /api/export/{csv,report}**: exports of the filtered records
//!
//! Control endpoints answer 503 until the dataset has loaded.

pub mod dashboard_apis;
pub mod export_apis;
pub mod filter_apis;
pub mod selection_apis;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};

use crate::AppState;

/// Create the `/api` router
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(dashboard_apis::router())
        .nest("/filters", filter_apis::router())
        .nest("/selection", selection_apis::router())
        .nest("/export", export_apis::router())
}

/// Response for controls used before the dataset is ready
pub(crate) fn controls_not_ready() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "Dashboard data is not available yet",
    )
        .into_response()
}
