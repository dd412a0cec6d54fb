//! Aggregation engine.
//!
//! Reduces a record subset into the three chart shapes plus the summary
//! totals:
//!
//! - **Monthly summary**: income and expense per month key, ascending
//! - **Category distribution**: top 9 categories by expense plus an "Others" bucket
//! - **Top expenses**: the first 5 categories of the same ranking
//!
//! The distribution and top-N views are both cut from one [`CategoryRanking`]
//! computed once per run, so their shared ranks can never disagree.

use shared::{
    ActiveFilterState, CategoryDistribution, CategoryTotal, MonthlySummary, MonthlyTotal,
    SummaryTotals, TopExpenses, TransactionRecord,
};
use std::collections::{BTreeMap, HashMap};

/// Named entries shown before the remainder is folded into "Others"
pub const DISTRIBUTION_CAP: usize = 9;
/// Length of the top-expenses ranking
pub const TOP_EXPENSES_LIMIT: usize = 5;

/// The three chart aggregates of one pipeline run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardAggregates {
    pub monthly: MonthlySummary,
    pub distribution: CategoryDistribution,
    pub top_expenses: TopExpenses,
}

/// Build every chart aggregate for one pipeline run.
///
/// `full` is the whole dataset, `filtered` the subset passing the active
/// filters.
pub fn aggregate(
    full: &[TransactionRecord],
    filtered: &[&TransactionRecord],
    filters: &ActiveFilterState,
) -> DashboardAggregates {
    // Context rule: with a specific month selected the monthly chart is built
    // from the unfiltered dataset so every month stays visible next to the
    // selected one. With "all" it follows the filtered subset.
    let monthly = if filters.month.is_all() {
        monthly_summary(filtered.iter().copied())
    } else {
        monthly_summary(full)
    };

    let ranking = CategoryRanking::from_records(filtered.iter().copied());

    DashboardAggregates {
        monthly,
        distribution: ranking.distribution(DISTRIBUTION_CAP),
        top_expenses: ranking.top(TOP_EXPENSES_LIMIT),
    }
}

/// Sum income and expense per month key, skipping records without one
pub fn monthly_summary<'a, I>(records: I) -> MonthlySummary
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut months: BTreeMap<&'a str, (f64, f64)> = BTreeMap::new();
    for record in records {
        let Some(month_key) = record.month_key.as_deref() else {
            continue;
        };
        let totals = months.entry(month_key).or_insert((0.0, 0.0));
        totals.0 += record.income_amount();
        totals.1 += record.expense_amount();
    }

    MonthlySummary {
        months: months
            .into_iter()
            .map(|(month_key, (income, expense))| MonthlyTotal {
                month_key: month_key.to_string(),
                income,
                expense,
            })
            .collect(),
    }
}

/// Categories ordered by summed expense, descending.
///
/// Only categories with a positive total are kept. Ties keep the order in
/// which the categories were first seen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryRanking {
    entries: Vec<CategoryTotal>,
}

impl CategoryRanking {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a TransactionRecord>,
    {
        let mut positions: HashMap<&'a str, usize> = HashMap::new();
        let mut entries: Vec<CategoryTotal> = Vec::new();

        for record in records {
            let category = record.category_or_default();
            let position = *positions.entry(category).or_insert_with(|| {
                entries.push(CategoryTotal {
                    category: category.to_string(),
                    total_expense: 0.0,
                });
                entries.len() - 1
            });
            entries[position].total_expense += record.expense_amount();
        }

        entries.retain(|entry| entry.total_expense > 0.0);
        // sort_by is stable, first-seen order survives ties
        entries.sort_by(|a, b| b.total_expense.total_cmp(&a.total_expense));

        Self { entries }
    }

    pub fn entries(&self) -> &[CategoryTotal] {
        &self.entries
    }

    pub fn total_expense(&self) -> f64 {
        self.entries.iter().map(|entry| entry.total_expense).sum()
    }

    /// First `cap` entries, with the rest summed into "Others".
    /// The bucket is omitted when the remainder is exactly zero.
    pub fn distribution(&self, cap: usize) -> CategoryDistribution {
        let split = cap.min(self.entries.len());
        let (shown, rest) = self.entries.split_at(split);
        let remainder: f64 = rest.iter().map(|entry| entry.total_expense).sum();

        CategoryDistribution {
            entries: shown.to_vec(),
            others: (remainder != 0.0).then_some(remainder),
        }
    }

    /// First `limit` entries of the uncapped ranking
    pub fn top(&self, limit: usize) -> TopExpenses {
        TopExpenses {
            entries: self.entries.iter().take(limit).cloned().collect(),
        }
    }
}

/// Income, expense and count over the filtered records
pub fn summary_totals<'a, I>(records: I) -> SummaryTotals
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut totals = SummaryTotals::default();
    for record in records {
        totals.income += record.income_amount();
        totals.expenses += record.expense_amount();
        totals.count += 1;
    }
    totals.net = totals.income - totals.expenses;
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter_engine::filter_records;
    use shared::{FilterValue, OTHERS_LABEL, UNCATEGORIZED_LABEL};

    fn create_test_record(
        month_key: Option<&str>,
        category: Option<&str>,
        income: Option<&str>,
        expense: Option<&str>,
    ) -> TransactionRecord {
        TransactionRecord {
            month_key: month_key.map(str::to_string),
            category: category.map(str::to_string),
            income: income.map(str::to_string),
            expense: expense.map(str::to_string),
            ..Default::default()
        }
    }

    fn expense_record(category: &str, expense: f64) -> TransactionRecord {
        create_test_record(Some("2024-01"), Some(category), None, Some(&expense.to_string()))
    }

    fn eleven_categories() -> Vec<TransactionRecord> {
        let mut records: Vec<TransactionRecord> = (1..=10)
            .rev()
            .map(|rank| expense_record(&format!("Category {}", rank), rank as f64 * 10.0))
            .collect();
        records.push(expense_record("Category 0", 1.0));
        records
    }

    #[test]
    fn test_monthly_summary_normalizes_comma_amounts() {
        let records = vec![
            create_test_record(Some("2024-01"), None, None, Some("10,50")),
            create_test_record(Some("2024-01"), None, None, Some("5")),
            create_test_record(Some("2024-02"), None, None, Some("20")),
        ];

        let summary = monthly_summary(&records);

        assert_eq!(
            summary.months,
            vec![
                MonthlyTotal {
                    month_key: "2024-01".to_string(),
                    income: 0.0,
                    expense: 15.5,
                },
                MonthlyTotal {
                    month_key: "2024-02".to_string(),
                    income: 0.0,
                    expense: 20.0,
                },
            ]
        );
    }

    #[test]
    fn test_monthly_summary_skips_records_without_month_key() {
        let records = vec![
            create_test_record(None, None, Some("500"), None),
            create_test_record(Some("2024-03"), None, Some("100"), Some("40")),
            create_test_record(Some("2023-12"), None, Some("7"), None),
        ];

        let summary = monthly_summary(&records);

        assert_eq!(summary.labels(), vec!["2023-12".to_string(), "2024-03".to_string()]);
        assert_eq!(summary.total_income(), 107.0);
        // still counted in totals
        assert_eq!(summary_totals(&records).income, 607.0);
    }

    #[test]
    fn test_ranking_sums_expense_only_and_drops_non_positive() {
        let records = vec![
            create_test_record(None, Some("Salary"), Some("2000"), None),
            create_test_record(None, Some("Rent"), None, Some("800")),
            create_test_record(None, Some("Refunds"), None, Some("0")),
            create_test_record(None, None, None, Some("12,5")),
        ];

        let ranking = CategoryRanking::from_records(&records);

        let names: Vec<&str> = ranking.entries().iter().map(|e| e.category.as_str()).collect();
        assert_eq!(names, vec!["Rent", UNCATEGORIZED_LABEL]);
        assert_eq!(ranking.total_expense(), 812.5);
    }

    #[test]
    fn test_ranking_ties_keep_first_seen_order() {
        let records = vec![
            expense_record("Books", 30.0),
            expense_record("Games", 30.0),
            expense_record("Music", 45.0),
            expense_record("Apps", 30.0),
        ];

        let ranking = CategoryRanking::from_records(&records);

        let names: Vec<&str> = ranking.entries().iter().map(|e| e.category.as_str()).collect();
        assert_eq!(names, vec!["Music", "Books", "Games", "Apps"]);
    }

    #[test]
    fn test_distribution_caps_at_nine_plus_others() {
        let records = eleven_categories();
        let ranking = CategoryRanking::from_records(&records);

        let distribution = ranking.distribution(DISTRIBUTION_CAP);

        assert_eq!(distribution.entries.len(), 9);
        assert_eq!(distribution.others, Some(11.0));
        assert_eq!(distribution.labels().last().map(String::as_str), Some(OTHERS_LABEL));
        assert_eq!(distribution.total(), ranking.total_expense());
    }

    #[test]
    fn test_distribution_omits_others_without_remainder() {
        let records: Vec<TransactionRecord> = (1..=9)
            .map(|i| expense_record(&format!("C{}", i), i as f64))
            .collect();

        let distribution = CategoryRanking::from_records(&records).distribution(DISTRIBUTION_CAP);

        assert_eq!(distribution.entries.len(), 9);
        assert_eq!(distribution.others, None);
    }

    #[test]
    fn test_top_expenses_is_prefix_of_ranking() {
        let records = eleven_categories();
        let aggregates = aggregate(&records, &records.iter().collect::<Vec<_>>(), &ActiveFilterState::default());

        assert_eq!(aggregates.top_expenses.entries.len(), TOP_EXPENSES_LIMIT);
        assert_eq!(
            aggregates.top_expenses.entries[..],
            aggregates.distribution.entries[..TOP_EXPENSES_LIMIT]
        );
        assert_eq!(aggregates.top_expenses.entries[0].total_expense, 100.0);
        assert_eq!(aggregates.top_expenses.entries[4].total_expense, 60.0);
    }

    #[test]
    fn test_context_rule_uses_full_dataset_for_selected_month() {
        let records = vec![
            create_test_record(Some("2024-01"), Some("Groceries"), None, Some("40")),
            create_test_record(Some("2024-01"), Some("Rent"), None, Some("800")),
            create_test_record(Some("2024-02"), Some("Groceries"), None, Some("35")),
            create_test_record(Some("2024-03"), Some("Dining"), None, Some("20")),
        ];
        let filters = ActiveFilterState {
            month: FilterValue::from("2024-01"),
            category: FilterValue::from("Groceries"),
            search: String::new(),
        };
        let filtered = filter_records(&filters, &records);

        let aggregates = aggregate(&records, &filtered, &filters);

        // monthly chart keeps every month of the full dataset
        assert_eq!(
            aggregates.monthly.labels(),
            vec!["2024-01".to_string(), "2024-02".to_string(), "2024-03".to_string()]
        );
        assert_eq!(aggregates.monthly.months[0].expense, 840.0);
        // category views only see 2024-01 + Groceries
        assert_eq!(aggregates.top_expenses.labels(), vec!["Groceries".to_string()]);
        assert_eq!(aggregates.distribution.total(), 40.0);
    }

    #[test]
    fn test_context_rule_follows_filtered_subset_for_all_months() {
        let records = vec![
            create_test_record(Some("2024-01"), Some("Groceries"), None, Some("40")),
            create_test_record(Some("2024-02"), Some("Rent"), None, Some("800")),
        ];
        let filters = ActiveFilterState {
            category: FilterValue::from("Groceries"),
            ..Default::default()
        };
        let filtered = filter_records(&filters, &records);

        let aggregates = aggregate(&records, &filtered, &filters);

        assert_eq!(aggregates.monthly.labels(), vec!["2024-01".to_string()]);
    }

    #[test]
    fn test_summary_totals() {
        let records = vec![
            create_test_record(None, None, Some("1000"), None),
            create_test_record(None, None, Some("1,5"), Some("250")),
            create_test_record(None, None, None, Some("garbage")),
        ];

        let totals = summary_totals(&records);

        assert_eq!(totals.count, 3);
        assert_eq!(totals.income, 1001.5);
        assert_eq!(totals.expenses, 250.0);
        assert_eq!(totals.net, 751.5);
    }

    #[test]
    fn test_empty_subset_yields_empty_aggregates() {
        let aggregates = aggregate(&[], &[], &ActiveFilterState::default());
        assert_eq!(aggregates, DashboardAggregates::default());
        assert_eq!(summary_totals(std::iter::empty()), SummaryTotals::default());
    }
}
