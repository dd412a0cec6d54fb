//! Filter predicate engine.
//!
//! Combines the month, category and free-text clauses of an
//! [`ActiveFilterState`] into one predicate. Everything here is pure and
//! total: absent fields degrade to empty text and never fail.

use shared::{ActiveFilterState, FilterValue, TransactionRecord};

/// A filter state compiled for repeated evaluation
#[derive(Debug, Clone)]
pub struct FilterPredicate<'a> {
    month: &'a FilterValue,
    category: &'a FilterValue,
    /// Lower-cased search text as typed, `None` when the box is blank
    needle: Option<String>,
}

impl<'a> FilterPredicate<'a> {
    pub fn new(filters: &'a ActiveFilterState) -> Self {
        let needle = (!filters.search.trim().is_empty()).then(|| filters.search.to_lowercase());
        Self {
            month: &filters.month,
            category: &filters.category,
            needle,
        }
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.month.matches(record.month_key.as_deref())
            && self.category.matches(record.category.as_deref())
            && self.matches_search(record)
    }

    fn matches_search(&self, record: &TransactionRecord) -> bool {
        match &self.needle {
            Some(needle) => record.search_haystack().contains(needle.as_str()),
            None => true,
        }
    }
}

/// Records passing every clause, in source order
pub fn filter_records<'r>(
    filters: &ActiveFilterState,
    records: &'r [TransactionRecord],
) -> Vec<&'r TransactionRecord> {
    let predicate = FilterPredicate::new(filters);
    records.iter().filter(|record| predicate.matches(record)).collect()
}

/// Order records oldest first; unknown dates go last, ties keep their order
pub fn sort_chronologically(records: &mut [&TransactionRecord]) {
    records.sort_by_cached_key(|record| {
        let date = record.parsed_date();
        (date.is_none(), date)
    });
}
