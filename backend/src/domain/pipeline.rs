//! Pipeline coordinator.
//!
//! Owns the one mutable [`ActiveFilterState`] and the chart selection slots
//! of a dashboard session. Every trigger (dropdown change, debounced search,
//! chart click, clear, initial load) runs the same pipeline:
//!
//! 1. filter the full dataset
//! 2. rebuild the chart aggregates (applying the monthly context rule)
//! 3. compute the summary totals
//! 4. publish one [`DashboardSnapshot`] to every listener
//!
//! Listeners only ever see complete snapshots.

use crate::domain::aggregation::{aggregate, summary_totals};
use crate::domain::filter_engine::{filter_records, sort_chronologically};
use crate::domain::record_store::RecordStore;
use crate::domain::selection::{SelectionStateMachine, SelectionTransition};
use shared::{
    ActiveFilterState, ChartAxis, DashboardSnapshot, FilterOptionsResponse, FilterValue,
    SelectionState, TransactionRecord,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Rendering/presentation collaborator fed by the coordinator
pub trait SnapshotListener: Send + Sync {
    /// Called after every pipeline run with the complete new snapshot
    fn on_snapshot(&self, snapshot: &DashboardSnapshot);

    /// Called after a chart click so the chart can re-highlight its selected element
    fn on_highlight(&self, _axis: ChartAxis, _selected: Option<&str>) {}
}

/// Logs every published revision
#[derive(Debug, Default)]
pub struct TracingListener;

impl SnapshotListener for TracingListener {
    fn on_snapshot(&self, snapshot: &DashboardSnapshot) {
        if snapshot.filters.is_unfiltered() {
            info!(
                "📊 PIPELINE: revision {} -> {} transactions, unfiltered",
                snapshot.revision, snapshot.totals.count,
            );
            return;
        }
        info!(
            "📊 PIPELINE: revision {} -> {} transactions, {} months, {} categories (month={}, category={}, search={:?})",
            snapshot.revision,
            snapshot.totals.count,
            snapshot.monthly.months.len(),
            snapshot.distribution.entries.len(),
            snapshot.filters.month,
            snapshot.filters.category,
            snapshot.filters.search,
        );
    }

    fn on_highlight(&self, axis: ChartAxis, selected: Option<&str>) {
        debug!("highlight {} axis: {:?}", axis, selected);
    }
}

pub struct PipelineCoordinator {
    store: RecordStore,
    filters: ActiveFilterState,
    selection: SelectionStateMachine,
    snapshot: DashboardSnapshot,
    listeners: Vec<Arc<dyn SnapshotListener>>,
}

impl PipelineCoordinator {
    /// Create a coordinator over a loaded dataset and run the initial pipeline
    pub fn new(store: RecordStore) -> Self {
        info!("Initializing dashboard pipeline with {} records", store.len());
        let mut coordinator = Self {
            store,
            filters: ActiveFilterState::default(),
            selection: SelectionStateMachine::new(),
            snapshot: DashboardSnapshot::default(),
            listeners: Vec::new(),
        };
        coordinator.recompute();
        coordinator
    }

    /// Register a listener; it immediately receives the current snapshot
    pub fn subscribe(&mut self, listener: Arc<dyn SnapshotListener>) {
        listener.on_snapshot(&self.snapshot);
        self.listeners.push(listener);
    }

    pub fn snapshot(&self) -> &DashboardSnapshot {
        &self.snapshot
    }

    pub fn filters(&self) -> &ActiveFilterState {
        &self.filters
    }

    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Filtered records for export collaborators
    pub fn filtered_records(&self) -> &[TransactionRecord] {
        &self.snapshot.transactions
    }

    /// Dropdown option lists, always taken from the full dataset
    pub fn filter_options(&self) -> FilterOptionsResponse {
        FilterOptionsResponse {
            months: self.store.month_keys(),
            categories: self.store.categories(),
        }
    }

    /// Month dropdown change
    pub fn set_month_filter(&mut self, value: FilterValue) {
        self.apply_dropdown(ChartAxis::Month, value);
    }

    /// Category dropdown change
    pub fn set_category_filter(&mut self, value: FilterValue) {
        self.apply_dropdown(ChartAxis::Category, value);
    }

    /// Apply search text (the debouncer calls this once the input is quiet)
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.filters.search = query.into();
        self.recompute();
    }

    /// Chart click entry point.
    ///
    /// Toggles the axis selection, projects it into the filters, recomputes,
    /// then asks the listeners to re-highlight. Clicks that do not address a
    /// label change nothing.
    pub fn handle_chart_click(&mut self, axis: ChartAxis, index: usize, labels: &[String]) {
        let Some(transition) = self.selection.click(axis, index, labels) else {
            warn!(
                "Ignoring {} chart click at index {} ({} labels)",
                axis,
                index,
                labels.len()
            );
            return;
        };
        if let SelectionTransition::Selected(value) = &transition {
            debug!("Selected {} {}", axis, value);
        }

        self.selection.project_into(axis, &mut self.filters);
        self.recompute();

        let selected = self.selection.selected(axis);
        for listener in &self.listeners {
            listener.on_highlight(axis, selected);
        }
    }

    /// Reset both selections and all filters, then recompute once
    pub fn clear_filters(&mut self) {
        self.selection.clear();
        self.filters = ActiveFilterState::default();
        self.recompute();
    }

    fn apply_dropdown(&mut self, axis: ChartAxis, value: FilterValue) {
        self.selection
            .set(axis, value.as_selection().map(str::to_string));
        self.selection.project_into(axis, &mut self.filters);
        self.recompute();
    }

    fn recompute(&mut self) {
        let full = self.store.records();
        let mut filtered = filter_records(&self.filters, full);
        let aggregates = aggregate(full, &filtered, &self.filters);
        let totals = summary_totals(filtered.iter().copied());
        sort_chronologically(&mut filtered);

        self.snapshot = DashboardSnapshot {
            revision: self.snapshot.revision + 1,
            filters: self.filters.clone(),
            selection: self.selection.state().clone(),
            transactions: filtered.into_iter().cloned().collect(),
            monthly: aggregates.monthly,
            distribution: aggregates.distribution,
            top_expenses: aggregates.top_expenses,
            totals,
        };

        for listener in &self.listeners {
            listener.on_snapshot(&self.snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingListener {
        revisions: Mutex<Vec<u64>>,
        highlights: Mutex<Vec<(ChartAxis, Option<String>)>>,
    }

    impl SnapshotListener for RecordingListener {
        fn on_snapshot(&self, snapshot: &DashboardSnapshot) {
            self.revisions.lock().unwrap().push(snapshot.revision);
        }

        fn on_highlight(&self, axis: ChartAxis, selected: Option<&str>) {
            self.highlights
                .lock()
                .unwrap()
                .push((axis, selected.map(str::to_string)));
        }
    }

    fn create_test_record(
        date: &str,
        month_key: &str,
        category: &str,
        description: &str,
        income: Option<&str>,
        expense: Option<&str>,
    ) -> TransactionRecord {
        TransactionRecord {
            date: Some(date.to_string()),
            description: Some(description.to_string()),
            category: Some(category.to_string()),
            income: income.map(str::to_string),
            expense: expense.map(str::to_string),
            month_key: Some(month_key.to_string()),
        }
    }

    fn create_test_coordinator() -> PipelineCoordinator {
        PipelineCoordinator::new(RecordStore::new(vec![
            create_test_record("2024-02-03", "2024-02", "Groceries", "Market", None, Some("35")),
            create_test_record("2024-01-01", "2024-01", "Salary", "January pay", Some("2000"), None),
            create_test_record("2024-01-05", "2024-01", "Groceries", "Supermarket", None, Some("40,25")),
            create_test_record("2024-01-09", "2024-01", "Rent", "Flat", None, Some("800")),
            create_test_record("2024-03-02", "2024-03", "Dining", "Tapas", None, Some("22")),
        ]))
    }

    fn month_labels(coordinator: &PipelineCoordinator) -> Vec<String> {
        coordinator.snapshot().monthly.labels()
    }

    #[test]
    fn test_initial_snapshot_covers_full_dataset() {
        let coordinator = create_test_coordinator();
        let snapshot = coordinator.snapshot();

        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.totals.count, 5);
        assert_eq!(snapshot.totals.income, 2000.0);
        assert_eq!(snapshot.totals.expenses, 897.25);
        assert_eq!(snapshot.monthly.total_income(), 2000.0);
        assert_eq!(month_labels(&coordinator).len(), 3);
    }

    #[test]
    fn test_snapshot_transactions_are_chronological() {
        let coordinator = create_test_coordinator();
        let dates: Vec<&str> = coordinator
            .filtered_records()
            .iter()
            .filter_map(|r| r.date.as_deref())
            .collect();
        assert_eq!(
            dates,
            vec!["2024-01-01", "2024-01-05", "2024-01-09", "2024-02-03", "2024-03-02"]
        );
    }

    #[test]
    fn test_chart_click_month_then_category_dropdown() {
        let mut coordinator = create_test_coordinator();
        coordinator.set_category_filter(FilterValue::from("Groceries"));
        let labels = month_labels(&coordinator);
        assert_eq!(labels, vec!["2024-01".to_string(), "2024-02".to_string()]);

        coordinator.handle_chart_click(ChartAxis::Month, 0, &labels);

        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.filters.month, FilterValue::from("2024-01"));
        assert_eq!(snapshot.selection.selected_month.as_deref(), Some("2024-01"));
        // context rule: every month of the full dataset stays visible
        assert_eq!(month_labels(&coordinator).len(), 3);
        assert_eq!(snapshot.top_expenses.labels(), vec!["Groceries".to_string()]);
        assert_eq!(snapshot.totals.expenses, 40.25);
        assert_eq!(snapshot.totals.count, 1);
    }

    #[test]
    fn test_toggle_round_trip_restores_state() {
        let mut coordinator = create_test_coordinator();
        let filters_before = coordinator.filters().clone();
        let selection_before = coordinator.selection().clone();
        let labels = coordinator.snapshot().distribution.labels();

        coordinator.handle_chart_click(ChartAxis::Category, 1, &labels);
        assert_ne!(coordinator.filters(), &filters_before);
        coordinator.handle_chart_click(ChartAxis::Category, 1, &labels);

        assert_eq!(coordinator.filters(), &filters_before);
        assert_eq!(coordinator.selection(), &selection_before);
        assert_eq!(coordinator.snapshot().totals.count, 5);
    }

    #[test]
    fn test_clear_filters_is_idempotent_and_recomputes_once() {
        let mut coordinator = create_test_coordinator();
        let listener = Arc::new(RecordingListener::default());
        coordinator.subscribe(listener.clone());

        coordinator.set_month_filter(FilterValue::from("2024-01"));
        coordinator.set_search("super");
        coordinator.handle_chart_click(ChartAxis::Category, 0, &["Groceries".to_string()]);

        coordinator.clear_filters();
        let once_filters = coordinator.filters().clone();
        let once_selection = coordinator.selection().clone();
        let once_count = coordinator.snapshot().totals.count;
        coordinator.clear_filters();

        assert_eq!(coordinator.filters(), &once_filters);
        assert_eq!(coordinator.selection(), &once_selection);
        assert_eq!(coordinator.snapshot().totals.count, once_count);
        assert_eq!(once_filters, ActiveFilterState::default());
        assert_eq!(once_selection, SelectionState::default());

        // subscribe + 3 triggers + 2 clears, one snapshot each
        let revisions = listener.revisions.lock().unwrap().clone();
        assert_eq!(revisions, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_chart_click_requests_highlight() {
        let mut coordinator = create_test_coordinator();
        let listener = Arc::new(RecordingListener::default());
        coordinator.subscribe(listener.clone());
        let labels = month_labels(&coordinator);

        coordinator.handle_chart_click(ChartAxis::Month, 2, &labels);
        coordinator.handle_chart_click(ChartAxis::Month, 2, &labels);

        let highlights = listener.highlights.lock().unwrap().clone();
        assert_eq!(
            highlights,
            vec![
                (ChartAxis::Month, Some("2024-03".to_string())),
                (ChartAxis::Month, None),
            ]
        );
    }

    #[test]
    fn test_out_of_range_click_does_not_recompute() {
        let mut coordinator = create_test_coordinator();
        let revision = coordinator.snapshot().revision;

        coordinator.handle_chart_click(ChartAxis::Category, 42, &["Rent".to_string()]);

        assert_eq!(coordinator.snapshot().revision, revision);
    }

    #[test]
    fn test_dropdown_and_click_last_writer_wins() {
        let mut coordinator = create_test_coordinator();
        let labels = month_labels(&coordinator);

        coordinator.set_month_filter(FilterValue::from("2024-02"));
        coordinator.handle_chart_click(ChartAxis::Month, 0, &labels);
        assert_eq!(coordinator.filters().month, FilterValue::from("2024-01"));

        coordinator.set_month_filter(FilterValue::All);
        assert!(coordinator.filters().month.is_all());
        assert_eq!(coordinator.selection().selected_month, None);
    }

    #[test]
    fn test_monthly_income_never_exceeds_dataset_income() {
        let mut coordinator = create_test_coordinator();
        let all_income: f64 = coordinator
            .store()
            .records()
            .iter()
            .map(|r| r.income_amount())
            .sum();

        for search in ["", "pay", "market", "nothing matches"] {
            coordinator.set_search(search);
            assert!(coordinator.snapshot().monthly.total_income() <= all_income);
        }
        coordinator.clear_filters();
        assert_eq!(coordinator.snapshot().monthly.total_income(), all_income);
    }

    #[test]
    fn test_distribution_sums_to_filtered_expense() {
        let mut coordinator = create_test_coordinator();
        coordinator.set_month_filter(FilterValue::from("2024-01"));

        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.distribution.total(), snapshot.totals.expenses);
    }

    #[test]
    fn test_filter_options_come_from_full_dataset() {
        let mut coordinator = create_test_coordinator();
        coordinator.set_category_filter(FilterValue::from("Rent"));

        let options = coordinator.filter_options();
        assert_eq!(options.months.len(), 3);
        assert_eq!(
            options.categories,
            vec!["Dining", "Groceries", "Rent", "Salary"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }
}
