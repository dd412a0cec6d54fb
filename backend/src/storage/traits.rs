//! # Storage Traits
//!
//! This module defines the data-source abstraction so the dashboard can be
//! fed from the spreadsheet web app, a local file, or a test double without
//! the domain layer noticing.

use async_trait::async_trait;
use shared::TransactionRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Why the initial dataset could not be obtained
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no data source configured: set source.url or source.file")]
    NotConfigured,

    #[error("could not set up the HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("could not reach the data source: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("could not read the data source response: {0}")]
    ReadBody(#[source] reqwest::Error),

    #[error("data source answered with HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("data source returned invalid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("data source reported an error: {message}")]
    Rejected { message: String },

    #[error("unrecognized response shape: expected {{success, data}}, a bare array or {{data: [...]}}, got {found}")]
    UnrecognizedShape { found: String },

    #[error("row {index} is not a valid transaction record: {source}")]
    InvalidRow {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Trait defining the one read the dashboard performs
///
/// Implementations make a single attempt; there are no retries.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch the complete record list, or fail without a partial dataset
    async fn fetch_records(&self) -> Result<Vec<TransactionRecord>, SourceError>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}
