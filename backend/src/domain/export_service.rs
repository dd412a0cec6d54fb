//! Export service domain logic for the finance dashboard.
//!
//! Builds the data handed to export collaborators: a CSV of the filtered
//! records (source text, unmodified) and the report structure behind the
//! printable summary. Layout and currency formatting stay with the
//! presentation side.

use chrono::{DateTime, SecondsFormat, Utc};
use shared::{CategoryShare, DashboardSnapshot, ExportReport, TransactionRecord};
use thiserror::Error;
use tracing::info;

use crate::domain::aggregation::CategoryRanking;

const CSV_HEADER: [&str; 6] = ["date", "description", "category", "income", "expense", "month_key"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV row: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV output: {0}")]
    Flush(String),
    #[error("CSV output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Export service that handles all export-related business logic
#[derive(Debug, Clone, Default)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// Render records as CSV, one row per record, in the order given
    pub fn transactions_csv(&self, records: &[TransactionRecord]) -> Result<String, ExportError> {
        info!("📄 EXPORT: Writing {} transactions as CSV", records.len());

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;
        for record in records {
            writer.write_record([
                record.date.as_deref().unwrap_or(""),
                record.description.as_deref().unwrap_or(""),
                record.category.as_deref().unwrap_or(""),
                record.income.as_deref().unwrap_or(""),
                record.expense.as_deref().unwrap_or(""),
                record.month_key.as_deref().unwrap_or(""),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Flush(e.to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Download name for a CSV generated at `now`
    pub fn csv_filename(&self, now: DateTime<Utc>) -> String {
        format!("finance-dashboard-report-{}.csv", now.format("%Y%m%d"))
    }

    /// Report data for the current snapshot
    pub fn report(&self, snapshot: &DashboardSnapshot, now: DateTime<Utc>) -> ExportReport {
        let ranking = CategoryRanking::from_records(&snapshot.transactions);
        let total_expense = snapshot.totals.expenses;

        let category_summary = ranking
            .entries()
            .iter()
            .map(|entry| CategoryShare {
                category: entry.category.clone(),
                total_expense: entry.total_expense,
                percentage: if total_expense > 0.0 {
                    entry.total_expense / total_expense * 100.0
                } else {
                    0.0
                },
            })
            .collect();

        ExportReport {
            generated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            filters: snapshot.filters.clone(),
            totals: snapshot.totals.clone(),
            category_summary,
            transactions: snapshot.transactions.clone(),
        }
    }
}
