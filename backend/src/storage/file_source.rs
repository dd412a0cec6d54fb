use async_trait::async_trait;
use serde_json::Value;
use shared::TransactionRecord;
use std::path::PathBuf;
use tracing::info;

use super::payload::decode_payload;
use super::traits::{DataSource, SourceError};

/// Reads a saved spreadsheet response from disk
#[derive(Debug, Clone)]
pub struct FileDataSource {
    path: PathBuf,
}

impl FileDataSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl DataSource for FileDataSource {
    async fn fetch_records(&self) -> Result<Vec<TransactionRecord>, SourceError> {
        info!("Reading transactions from {}", self.path.display());

        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        let payload: Value = serde_json::from_slice(&bytes)?;
        decode_payload(payload)
    }

    fn describe(&self) -> String {
        format!("file source {}", self.path.display())
    }
}
