//! # Finance Dashboard Backend
//!
//! Contains all non-UI logic for the finance dashboard.
//!
//! This crate brings together:
//! - **Domain**: the filter/aggregation engine and chart selection state
//! - **Storage**: data-source adapters that load the transaction rows once
//! - **IO**: the REST layer the browser front-end talks to
//!
//! ## Architecture
//!
//! ```text
//! UI Layer (charts, dropdowns, search box)
//!     ↓
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (pipeline coordinator, filters, aggregation)
//!     ↓
//! Storage Layer (spreadsheet web app, JSON file)
//! ```
//!
//! ## Lifecycle
//!
//! The server starts in the loading phase and fetches the dataset in the
//! background. Until the fetch resolves the controls are inert; a failed
//! fetch leaves the dashboard in the failed phase for good (no retries, the
//! user reloads).

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{http::HeaderValue, Router};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info};

use crate::config::DashboardConfig;
use crate::domain::{
    ExportService, PipelineCoordinator, RecordStore, SearchDebouncer, TracingListener,
};
use crate::storage::{build_data_source, DataSource};
use shared::{DashboardStatusResponse, TransactionRecord};

const LOAD_FAILED_MESSAGE: &str = "Could not load the transaction data.";
const RETRY_HINT: &str = "Check the data source settings and reload the dashboard.";

/// Why the dashboard could not start
#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailure {
    pub message: String,
    pub detail: String,
}

/// Where the dashboard session is in its lifecycle
pub enum DashboardPhase {
    Loading,
    Ready(Box<PipelineCoordinator>),
    Failed(LoadFailure),
}

impl DashboardPhase {
    pub fn is_ready(&self) -> bool {
        matches!(self, DashboardPhase::Ready(_))
    }

    pub fn coordinator(&self) -> Option<&PipelineCoordinator> {
        match self {
            DashboardPhase::Ready(coordinator) => Some(coordinator.as_ref()),
            _ => None,
        }
    }

    pub fn coordinator_mut(&mut self) -> Option<&mut PipelineCoordinator> {
        match self {
            DashboardPhase::Ready(coordinator) => Some(coordinator.as_mut()),
            _ => None,
        }
    }

    pub fn status(&self) -> DashboardStatusResponse {
        match self {
            DashboardPhase::Loading => DashboardStatusResponse::Loading,
            DashboardPhase::Failed(failure) => DashboardStatusResponse::Failed {
                message: failure.message.clone(),
                detail: failure.detail.clone(),
                retry_hint: RETRY_HINT.to_string(),
            },
            DashboardPhase::Ready(coordinator) => DashboardStatusResponse::Ready {
                snapshot: Box::new(coordinator.snapshot().clone()),
            },
        }
    }
}

/// Main application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// The single dashboard session; the lock serializes every recompute
    pub dashboard: Arc<Mutex<DashboardPhase>>,
    pub debouncer: Arc<StdMutex<SearchDebouncer>>,
    pub export_service: ExportService,
}

impl AppState {
    /// State in the loading phase
    pub fn new(search_debounce: Duration) -> Self {
        Self::with_phase(DashboardPhase::Loading, search_debounce)
    }

    /// State that is already ready over `records`
    pub fn with_records(records: Vec<TransactionRecord>, search_debounce: Duration) -> Self {
        let phase = DashboardPhase::Ready(Box::new(ready_coordinator(records)));
        Self::with_phase(phase, search_debounce)
    }

    fn with_phase(phase: DashboardPhase, search_debounce: Duration) -> Self {
        Self {
            dashboard: Arc::new(Mutex::new(phase)),
            debouncer: Arc::new(StdMutex::new(SearchDebouncer::new(search_debounce))),
            export_service: ExportService::new(),
        }
    }

    pub fn debouncer(&self) -> MutexGuard<'_, SearchDebouncer> {
        self.debouncer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn ready_coordinator(records: Vec<TransactionRecord>) -> PipelineCoordinator {
    let mut coordinator = PipelineCoordinator::new(RecordStore::new(records));
    coordinator.subscribe(Arc::new(TracingListener));
    coordinator
}

/// Run the single initial fetch and move the dashboard out of the loading phase
pub async fn load_dashboard(state: AppState, source: Arc<dyn DataSource>) {
    info!("Loading dashboard data from {}", source.describe());
    let next = match source.fetch_records().await {
        Ok(records) => DashboardPhase::Ready(Box::new(ready_coordinator(records))),
        Err(e) => {
            error!("Initialization failed: {}", e);
            DashboardPhase::Failed(LoadFailure {
                message: LOAD_FAILED_MESSAGE.to_string(),
                detail: e.to_string(),
            })
        }
    };
    *state.dashboard.lock().await = next;
}

/// Initialize the backend and start loading the dataset in the background
pub fn initialize_backend(config: &DashboardConfig) -> AppState {
    info!("Setting up application state");
    match build_data_source(&config.source) {
        Ok(source) => {
            let state = AppState::new(config.search_debounce());
            tokio::spawn(load_dashboard(state.clone(), source));
            state
        }
        Err(e) => {
            error!("Data source unavailable: {}", e);
            let failure = LoadFailure {
                message: LOAD_FAILED_MESSAGE.to_string(),
                detail: e.to_string(),
            };
            AppState::with_phase(DashboardPhase::Failed(failure), config.search_debounce())
        }
    }
}

/// Build the application router with CORS and the optional static bundle
pub fn build_router(state: AppState, config: &DashboardConfig) -> Result<Router> {
    let cors = match &config.allowed_origin {
        Some(origin) => CorsLayer::new().allow_origin(
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid allowed_origin {:?}", origin))?,
        ),
        None => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods(Any)
    .allow_headers(Any);

    let mut app = Router::new().nest("/api", io::rest::router());
    if let Some(dir) = &config.static_dir {
        info!("Serving static files from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }

    Ok(app.layer(cors).with_state(state))
}
