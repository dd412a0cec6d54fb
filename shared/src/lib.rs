use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Bucket used for records without a category
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";
/// Synthetic distribution entry summing every category ranked below the cap
pub const OTHERS_LABEL: &str = "Others";
/// Wire value meaning "no constraint" for the month and category filters
pub const ALL_FILTER_VALUE: &str = "all";
/// Shown by presentation collaborators when a record has no description
pub const NO_DESCRIPTION_LABEL: &str = "No description";

/// One transaction row as delivered by the spreadsheet source.
///
/// Every field is optional. Numeric cells are kept as source text and only
/// normalized when parsed for arithmetic, so exports can hand the record on
/// unmodified.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Calendar date as source text (ISO date, RFC 3339 or dd/mm/yyyy)
    #[serde(default, alias = "Fecha", deserialize_with = "deserialize_cell")]
    pub date: Option<String>,
    #[serde(default, alias = "Descripcion", deserialize_with = "deserialize_cell")]
    pub description: Option<String>,
    #[serde(default, alias = "Categoria", deserialize_with = "deserialize_cell")]
    pub category: Option<String>,
    /// Income amount as source text, may use a comma decimal separator
    #[serde(default, alias = "Ingresos", deserialize_with = "deserialize_cell")]
    pub income: Option<String>,
    /// Expense amount as source text, may use a comma decimal separator
    #[serde(default, alias = "Gastos", deserialize_with = "deserialize_cell")]
    pub expense: Option<String>,
    /// Precomputed "month-year" grouping label
    #[serde(default, alias = "Mes Ano", deserialize_with = "deserialize_cell")]
    pub month_key: Option<String>,
}

/// Spreadsheet cells arrive as strings, numbers or (rarely) booleans.
#[derive(Deserialize)]
#[serde(untagged)]
enum SourceCell {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

fn deserialize_cell<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<SourceCell>::deserialize(deserializer)?;
    Ok(cell
        .map(|cell| match cell {
            SourceCell::Text(text) => text,
            SourceCell::Number(number) => number.to_string(),
            SourceCell::Flag(flag) => flag.to_string(),
        })
        .filter(|text| !text.trim().is_empty()))
}

/// Parse a source amount, normalizing the first comma to a decimal point.
///
/// Reads the longest leading number, so trailing text such as a currency
/// ("12,50 €") is ignored. Absent text, or text without a leading number,
/// counts as zero.
pub fn parse_amount(raw: Option<&str>) -> f64 {
    raw.map(|text| text.trim_start().replacen(',', ".", 1))
        .and_then(|text| numeric_prefix(&text).and_then(|prefix| prefix.parse::<f64>().ok()))
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Longest leading `[+-]digits[.digits][e[+-]digits]` slice of `text`
fn numeric_prefix(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let digits_from = |start: usize| {
        start
            + bytes[start.min(bytes.len())..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        let frac_digits = frac_end - (end + 1);
        if digits > 0 || frac_digits > 0 {
            digits += frac_digits;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    // An exponent only counts when digits follow it
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_start = end + 1;
        if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
            exp_start += 1;
        }
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }
    Some(&text[..end])
}

impl TransactionRecord {
    pub fn income_amount(&self) -> f64 {
        parse_amount(self.income.as_deref())
    }

    pub fn expense_amount(&self) -> f64 {
        parse_amount(self.expense.as_deref())
    }

    /// Category used for grouping, falling back to [`UNCATEGORIZED_LABEL`]
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(UNCATEGORIZED_LABEL)
    }

    /// Description for display, falling back to [`NO_DESCRIPTION_LABEL`]
    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or(NO_DESCRIPTION_LABEL)
    }

    /// Parse the source date. Returns `None` for missing or unrecognized text.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?.trim();
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
            return Some(timestamp.date_naive());
        }
        ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"]
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
    }

    /// Lower-cased text the free-text search runs against
    pub fn search_haystack(&self) -> String {
        [
            &self.description,
            &self.category,
            &self.month_key,
            &self.income,
            &self.expense,
        ]
        .iter()
        .map(|field| field.as_deref().unwrap_or(""))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
    }
}

/// A month or category filter: either everything or one exact value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterValue {
    #[default]
    All,
    Only(String),
}

impl FilterValue {
    pub fn is_all(&self) -> bool {
        matches!(self, FilterValue::All)
    }

    /// A missing field never matches a concrete value
    pub fn matches(&self, field: Option<&str>) -> bool {
        match self {
            FilterValue::All => true,
            FilterValue::Only(expected) => field == Some(expected.as_str()),
        }
    }

    /// Project a chart selection slot into filter shape
    pub fn from_selection(selection: Option<&str>) -> Self {
        match selection {
            Some(value) => FilterValue::Only(value.to_string()),
            None => FilterValue::All,
        }
    }

    pub fn as_selection(&self) -> Option<&str> {
        match self {
            FilterValue::All => None,
            FilterValue::Only(value) => Some(value.as_str()),
        }
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        if value.is_empty() || value == ALL_FILTER_VALUE {
            FilterValue::All
        } else {
            FilterValue::Only(value)
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::from(value.to_string())
    }
}

impl From<FilterValue> for String {
    fn from(value: FilterValue) -> Self {
        match value {
            FilterValue::All => ALL_FILTER_VALUE.to_string(),
            FilterValue::Only(value) => value,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::All => write!(f, "{}", ALL_FILTER_VALUE),
            FilterValue::Only(value) => write!(f, "{}", value),
        }
    }
}

/// The three explicit filter values currently applied
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFilterState {
    pub month: FilterValue,
    pub category: FilterValue,
    /// Free text, empty means no constraint
    pub search: String,
}

impl ActiveFilterState {
    pub fn is_unfiltered(&self) -> bool {
        self.month.is_all() && self.category.is_all() && self.search.trim().is_empty()
    }
}

/// Selectable chart axis. The category axis is shared by the distribution
/// and top-expenses charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartAxis {
    Month,
    Category,
}

impl fmt::Display for ChartAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartAxis::Month => write!(f, "month"),
            ChartAxis::Category => write!(f, "category"),
        }
    }
}

/// Chart-click driven selections, one slot per axis
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub selected_month: Option<String>,
    pub selected_category: Option<String>,
}

impl SelectionState {
    pub fn slot(&self, axis: ChartAxis) -> Option<&str> {
        match axis {
            ChartAxis::Month => self.selected_month.as_deref(),
            ChartAxis::Category => self.selected_category.as_deref(),
        }
    }
}

/// Income and expense totals for one month key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    pub month_key: String,
    pub income: f64,
    pub expense: f64,
}

/// Monthly comparison chart data, ascending by month key
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub months: Vec<MonthlyTotal>,
}

impl MonthlySummary {
    pub fn labels(&self) -> Vec<String> {
        self.months.iter().map(|m| m.month_key.clone()).collect()
    }

    pub fn total_income(&self) -> f64 {
        self.months.iter().map(|m| m.income).sum()
    }

    pub fn total_expense(&self) -> f64 {
        self.months.iter().map(|m| m.expense).sum()
    }
}

/// Summed expense for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub total_expense: f64,
}

/// Expense distribution chart data: the top ranked categories plus an
/// optional "Others" bucket for the remainder
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryDistribution {
    pub entries: Vec<CategoryTotal>,
    pub others: Option<f64>,
}

impl CategoryDistribution {
    /// Chart labels, with [`OTHERS_LABEL`] last when the bucket is present
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.entries.iter().map(|e| e.category.clone()).collect();
        if self.others.is_some() {
            labels.push(OTHERS_LABEL.to_string());
        }
        labels
    }

    pub fn values(&self) -> Vec<f64> {
        let mut values: Vec<f64> = self.entries.iter().map(|e| e.total_expense).collect();
        values.extend(self.others);
        values
    }

    pub fn total(&self) -> f64 {
        self.values().iter().sum()
    }
}

/// Top-N category ranking, a prefix of the uncapped ranking
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TopExpenses {
    pub entries: Vec<CategoryTotal>,
}

impl TopExpenses {
    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.category.clone()).collect()
    }
}

/// Summary card figures over the filtered records
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTotals {
    pub income: f64,
    pub expenses: f64,
    pub count: usize,
    /// income - expenses
    pub net: f64,
}

/// Everything the rendering collaborators need for one consistent redraw
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Increments on every pipeline run
    pub revision: u64,
    pub filters: ActiveFilterState,
    pub selection: SelectionState,
    /// Filtered records, oldest first, unknown dates last
    pub transactions: Vec<TransactionRecord>,
    pub monthly: MonthlySummary,
    pub distribution: CategoryDistribution,
    pub top_expenses: TopExpenses,
    pub totals: SummaryTotals,
}

/// Dashboard lifecycle as seen by the front-end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum DashboardStatusResponse {
    /// Initial fetch in flight, controls are inert
    Loading,
    /// Initial fetch failed, no partial dataset was accepted
    #[serde(rename_all = "camelCase")]
    Failed {
        message: String,
        detail: String,
        retry_hint: String,
    },
    Ready { snapshot: Box<DashboardSnapshot> },
}

/// Request for a dropdown filter change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetFilterRequest {
    pub value: FilterValue,
}

/// Request carrying the current search box text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// Response for a search keystroke, applied after the quiet period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAcceptedResponse {
    pub query: String,
    pub debounce_ms: u64,
}

/// Chart click: the axis, the clicked index and the labels the chart showed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartClickRequest {
    pub axis: ChartAxis,
    pub index: usize,
    pub labels: Vec<String>,
}

/// Dropdown option lists taken from the full dataset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterOptionsResponse {
    pub months: Vec<String>,
    pub categories: Vec<String>,
}

/// One row of the per-category report summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub category: String,
    pub total_expense: f64,
    /// Share of the filtered expense total, 0-100
    pub percentage: f64,
}

/// Data behind the printable report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    /// RFC 3339 generation timestamp
    pub generated_at: String,
    pub filters: ActiveFilterState,
    pub totals: SummaryTotals,
    pub category_summary: Vec<CategoryShare>,
    pub transactions: Vec<TransactionRecord>,
}
