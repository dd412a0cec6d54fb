//! # Domain Module
//!
//! Contains the filter/aggregation engine behind the finance dashboard.
//!
//! The domain turns the immutable record list into the figures the charts
//! and summary cards show, and keeps them in step with the three selection
//! mechanisms (dropdowns, free-text search, chart clicks). Nothing in here
//! knows about HTTP or about how the data was fetched.
//!
//! ## Module Organization
//!
//! - **record_store**: The full dataset, loaded once and never mutated
//! - **filter_engine**: Month, category and search clauses combined into one predicate
//! - **selection**: Chart-click toggle slots, one per selectable axis
//! - **aggregation**: Monthly totals, category ranking, distribution and top-N views
//! - **pipeline**: Owns filter and selection state, recomputes and publishes snapshots
//! - **debounce**: Single pending timer in front of the search filter
//! - **export_service**: CSV and report data for the filtered records
//!
//! ## Business Rules
//!
//! - Missing or unparseable amounts count as zero
//! - Records without a month key stay in totals but leave the monthly chart
//! - The distribution and top-N views come from one shared ranking
//! - A selected month switches the monthly chart to the full dataset

pub mod aggregation;
pub mod debounce;
pub mod export_service;
pub mod filter_engine;
pub mod pipeline;
pub mod record_store;
pub mod selection;

pub use aggregation::*;
pub use debounce::*;
pub use export_service::*;
pub use filter_engine::*;
pub use pipeline::*;
pub use record_store::*;
pub use selection::*;
