//! Immutable holder for the full dataset.

use shared::TransactionRecord;
use std::collections::BTreeSet;
use std::sync::Arc;

/// The complete record list as loaded from the data source.
///
/// Cloning is cheap; every clone shares the same records.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Arc<[TransactionRecord]>,
}

impl RecordStore {
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct month keys, ascending
    pub fn month_keys(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|record| record.month_key.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct categories present in the data, ascending
    pub fn categories(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|record| record.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
