//! # Storage Module
//!
//! Data-source adapters that produce the immutable record list the domain
//! works on. The dashboard never writes back; a source is read exactly once
//! at start-up and either yields the complete dataset or an error.
//!
//! - **traits**: the [`DataSource`] abstraction and its error type
//! - **payload**: response envelope detection shared by every source
//! - **http_source**: single GET against the spreadsheet web app
//! - **file_source**: the same payload read from disk

pub mod file_source;
pub mod http_source;
pub mod payload;
pub mod traits;

pub use file_source::FileDataSource;
pub use http_source::HttpDataSource;
pub use payload::decode_payload;
pub use traits::{DataSource, SourceError};

use crate::config::SourceConfig;
use std::sync::Arc;

/// Pick the configured source. A file wins over a URL when both are set.
pub fn build_data_source(config: &SourceConfig) -> Result<Arc<dyn DataSource>, SourceError> {
    if let Some(path) = &config.file {
        return Ok(Arc::new(FileDataSource::new(path.clone())));
    }
    let url = config.url.as_deref().unwrap_or_default();
    Ok(Arc::new(HttpDataSource::new(url, config.timeout())?))
}
