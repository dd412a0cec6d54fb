use async_trait::async_trait;
use serde_json::Value;
use shared::TransactionRecord;
use std::time::Duration;
use tracing::{error, info};

use super::payload::decode_payload;
use super::traits::{DataSource, SourceError};

/// Value left in the config template until a real deployment URL is filled in
pub const PLACEHOLDER_URL: &str = "YOUR_SPREADSHEET_API_URL";

/// Fetches the record list from the spreadsheet web app with a single GET
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    client: reqwest::Client,
    url: String,
}

impl HttpDataSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let url = url.trim();
        if url.is_empty() || url == PLACEHOLDER_URL {
            return Err(SourceError::NotConfigured);
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SourceError::Client)?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch_records(&self) -> Result<Vec<TransactionRecord>, SourceError> {
        info!("Fetching transactions from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(SourceError::Unreachable)?;
        let status = response.status();
        if !status.is_success() {
            error!("Data source answered {} for {}", status, self.url);
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(SourceError::ReadBody)?;
        let payload: Value = serde_json::from_slice(&body)?;
        let records = decode_payload(payload)?;
        info!("Fetched {} transactions", records.len());
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("http source {}", self.url)
    }
}
