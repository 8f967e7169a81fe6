// 📊 Reporter - read-only aggregates over the denormalized transaction view
//
// Aggregations are plain functions over &[TransactionView]; Reporter loads a
// fresh view from the database on every call and delegates to them.

use crate::chart::{render_pivot, ChartKind};
use crate::config::Config;
use crate::db::{date_column, Store};
use crate::entities::{AccountType, CategoryTree};
use crate::error::Result;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::Write;
use std::path::PathBuf;

/// Label printed for the bucket of rows whose joined name is NULL
pub const UNNAMED: &str = "(unnamed)";

// ============================================================================
// TRANSACTION VIEW
// ============================================================================

/// One transaction with its category and account names resolved.
/// Names are None when the reference is NULL or dangling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionView {
    pub transaction_id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub category: Option<String>,
    pub account: Option<String>,
    pub account_type: Option<AccountType>,
}

const LOAD_TRANSACTIONS: &str = "SELECT
        t.id AS transaction_id,
        t.date,
        t.amount,
        t.description,
        t.category_id,
        c.name AS category,
        a.name AS account,
        a.type AS account_type
    FROM transactions t
    LEFT JOIN categories c ON t.category_id = c.id
    LEFT JOIN accounts a ON t.account_id = a.id
    ORDER BY t.id";

// ============================================================================
// YEAR-MONTH
// ============================================================================

/// Calendar month a date falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        YearMonth { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ============================================================================
// PIVOT
// ============================================================================

/// Month-indexed table with one column per group name.
///
/// Months ascend; named columns ascend with the unnamed bucket (None) last.
/// Every (month, column) cell is present, 0.0 where nothing was spent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub group_by: String,
    pub months: Vec<YearMonth>,
    pub columns: Vec<Option<String>>,
    /// values[month_idx][column_idx]
    pub values: Vec<Vec<f64>>,
}

impl Pivot {
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    fn column_index(&self, column: Option<&str>) -> Option<usize> {
        self.columns.iter().position(|c| c.as_deref() == column)
    }

    /// Cell value; None if the month or column is not in the table
    pub fn get(&self, month: YearMonth, column: Option<&str>) -> Option<f64> {
        let row = self.months.iter().position(|m| *m == month)?;
        let col = self.column_index(column)?;
        Some(self.values[row][col])
    }

    /// (month, value) pairs of one column
    pub fn column(&self, column: Option<&str>) -> Option<Vec<(YearMonth, f64)>> {
        let col = self.column_index(column)?;
        Some(
            self.months
                .iter()
                .zip(&self.values)
                .map(|(month, row)| (*month, row[col]))
                .collect(),
        )
    }

    pub fn column_labels(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|c| c.as_deref().unwrap_or(UNNAMED))
            .collect()
    }
}

impl fmt::Display for Pivot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "(no transactions)");
        }

        let labels = self.column_labels();
        let widths: Vec<usize> = labels.iter().map(|l| l.chars().count().max(10)).collect();

        write!(f, "{:<8}", "month")?;
        for (label, width) in labels.iter().zip(&widths) {
            write!(f, "  {:>width$}", label, width = width)?;
        }
        writeln!(f)?;

        for (month, row) in self.months.iter().zip(&self.values) {
            write!(f, "{:<8}", month.to_string())?;
            for (value, width) in row.iter().zip(&widths) {
                write!(f, "  {:>width$.2}", value, width = width)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

// ============================================================================
// GROUP TOTALS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotal {
    pub name: Option<String>,
    pub total: f64,
}

impl GroupTotal {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED)
    }
}

pub fn format_totals(heading: &str, totals: &[GroupTotal]) -> String {
    let width = totals
        .iter()
        .map(|t| t.label().chars().count())
        .chain(std::iter::once(heading.len()))
        .max()
        .unwrap_or(0);

    let mut out = format!("{:<width$}  {:>12}\n", heading, "amount", width = width);
    for total in totals {
        out.push_str(&format!(
            "{:<width$}  {:>12.2}\n",
            total.label(),
            total.total,
            width = width
        ));
    }
    out
}

pub fn format_transactions(rows: &[TransactionView]) -> String {
    let mut out = format!(
        "{:>6}  {:<10}  {:>10}  {:<20}  {:<15}  {:<20}  {:<10}\n",
        "id", "date", "amount", "description", "category", "account", "type"
    );
    for row in rows {
        out.push_str(&format!(
            "{:>6}  {:<10}  {:>10.2}  {:<20}  {:<15}  {:<20}  {:<10}\n",
            row.transaction_id,
            row.date.format("%Y-%m-%d").to_string(),
            row.amount,
            row.description.as_deref().unwrap_or(""),
            row.category.as_deref().unwrap_or(UNNAMED),
            row.account.as_deref().unwrap_or(UNNAMED),
            row.account_type.map(|t| t.as_str()).unwrap_or(""),
        ));
    }
    out
}

// ============================================================================
// AGGREGATIONS
// ============================================================================

fn pivot_by_month<F>(rows: &[TransactionView], group_by: &str, key: F) -> Pivot
where
    F: Fn(&TransactionView) -> Option<&str>,
{
    let mut sums: BTreeMap<YearMonth, HashMap<Option<&str>, f64>> = BTreeMap::new();
    let mut columns: Vec<Option<&str>> = Vec::new();

    for row in rows {
        let column = key(row);
        if !columns.contains(&column) {
            columns.push(column);
        }
        *sums
            .entry(YearMonth::from_date(row.date))
            .or_default()
            .entry(column)
            .or_insert(0.0) += row.amount;
    }

    columns.sort_by(|a, b| (a.is_none(), a).cmp(&(b.is_none(), b)));

    let values = sums
        .values()
        .map(|cells| {
            columns
                .iter()
                .map(|c| cells.get(c).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();

    Pivot {
        group_by: group_by.to_string(),
        months: sums.keys().copied().collect(),
        columns: columns.into_iter().map(|c| c.map(str::to_string)).collect(),
        values,
    }
}

/// Sum per (month, category name)
pub fn monthly_spending_by_category(rows: &[TransactionView]) -> Pivot {
    pivot_by_month(rows, "category", |r| r.category.as_deref())
}

/// Sum per (month, account name)
pub fn monthly_spending_by_account(rows: &[TransactionView]) -> Pivot {
    pivot_by_month(rows, "account", |r| r.account.as_deref())
}

fn totals_by<F>(rows: &[TransactionView], key: F) -> Vec<GroupTotal>
where
    F: Fn(&TransactionView) -> Option<String>,
{
    let mut sums: BTreeMap<Option<String>, f64> = BTreeMap::new();
    for row in rows {
        *sums.entry(key(row)).or_insert(0.0) += row.amount;
    }

    let mut totals: Vec<GroupTotal> = sums
        .into_iter()
        .map(|(name, total)| GroupTotal { name, total })
        .collect();
    // stable: equal totals stay in name order
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    totals
}

/// Sum per account name, largest first
pub fn total_spending_summary(rows: &[TransactionView]) -> Vec<GroupTotal> {
    totals_by(rows, |r| r.account.clone())
}

/// Sum per top-level category, largest first. Subcategory spending rolls up
/// into its outermost reachable ancestor.
pub fn spending_by_top_level_category(
    rows: &[TransactionView],
    tree: &CategoryTree,
) -> Vec<GroupTotal> {
    totals_by(rows, |r| {
        r.category_id
            .and_then(|id| tree.root_of(id))
            .map(|root| root.name.clone())
    })
}

/// The `n` latest rows by date; rows on the same date keep their input order
pub fn recent_transactions(rows: &[TransactionView], n: usize) -> Vec<TransactionView> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(n);
    sorted
}

// ============================================================================
// REPORTER
// ============================================================================

pub struct Reporter {
    store: Store,
}

impl Reporter {
    pub fn new(config: Config) -> Self {
        Reporter {
            store: Store::new(config),
        }
    }

    pub fn from_store(store: Store) -> Self {
        Reporter { store }
    }

    pub fn config(&self) -> &Config {
        self.store.config()
    }

    /// Every transaction joined with category and account names (LEFT JOIN,
    /// so NULL or dangling references keep the row)
    pub fn load_transactions(&self) -> Result<Vec<TransactionView>> {
        self.store.query(LOAD_TRANSACTIONS, [], |row| {
            Ok(TransactionView {
                transaction_id: row.get(0)?,
                date: date_column(row, 1)?,
                amount: row.get(2)?,
                description: row.get(3)?,
                category_id: row.get(4)?,
                category: row.get(5)?,
                account: row.get(6)?,
                account_type: row.get(7)?,
            })
        })
    }

    pub fn monthly_spending_by_category(&self) -> Result<Pivot> {
        Ok(monthly_spending_by_category(&self.load_transactions()?))
    }

    pub fn monthly_spending_by_account(&self) -> Result<Pivot> {
        Ok(monthly_spending_by_account(&self.load_transactions()?))
    }

    pub fn total_spending_summary(&self) -> Result<Vec<GroupTotal>> {
        Ok(total_spending_summary(&self.load_transactions()?))
    }

    pub fn recent_transactions(&self, n: usize) -> Result<Vec<TransactionView>> {
        Ok(recent_transactions(&self.load_transactions()?, n))
    }

    /// `recent_transactions` with the configured limit (10 unless overridden)
    pub fn recent(&self) -> Result<Vec<TransactionView>> {
        self.recent_transactions(self.config().recent_limit)
    }

    pub fn spending_by_top_level_category(&self) -> Result<Vec<GroupTotal>> {
        let tree = self.store.category_tree()?;
        Ok(spending_by_top_level_category(
            &self.load_transactions()?,
            &tree,
        ))
    }

    /// Render the month x category pivot to the configured chart path
    pub fn plot_summary(&self, kind: ChartKind) -> Result<PathBuf> {
        let pivot = self.monthly_spending_by_category()?;
        let path = self.config().chart_path.clone();
        render_pivot(&pivot, kind, &path, "Monthly Spending by Category")?;
        log::info!("Wrote {} chart to {}", kind, path.display());
        Ok(path)
    }

    /// Print every table to `out` from a single load of the view
    pub fn write_report<W: Write>(&self, out: &mut W) -> Result<()> {
        let rows = self.load_transactions()?;
        log::debug!("Loaded {} transactions for report", rows.len());

        writeln!(out, "\n🔹 Recent Transactions:")?;
        write!(
            out,
            "{}",
            format_transactions(&recent_transactions(&rows, self.config().recent_limit))
        )?;

        writeln!(out, "\n🔹 Total Spending per Account:")?;
        write!(out, "{}", format_totals("account", &total_spending_summary(&rows)))?;

        writeln!(out, "\n🔹 Monthly Spending by Category:")?;
        write!(out, "{}", monthly_spending_by_category(&rows))?;

        writeln!(out, "\n🔹 Monthly Spending by Account:")?;
        write!(out, "{}", monthly_spending_by_account(&rows))?;

        Ok(())
    }

    /// Default report: all tables on stdout, then the chart
    pub fn run_all_analyses(&self) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.write_report(&mut out)?;
        self.plot_summary(ChartKind::default())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Category;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn view(id: i64, date: NaiveDate, amount: f64, category: Option<&str>, account: Option<&str>) -> TransactionView {
        TransactionView {
            transaction_id: id,
            date,
            amount,
            description: None,
            category_id: None,
            category: category.map(str::to_string),
            account: account.map(str::to_string),
            account_type: None,
        }
    }

    #[test]
    fn test_year_month_display_and_order() {
        let jan = YearMonth::from_date(day(2024, 1, 31));
        let dec = YearMonth::from_date(day(2023, 12, 1));

        assert_eq!(jan.to_string(), "2024-01");
        assert!(dec < jan);
        assert_eq!(jan, YearMonth::new(2024, 1));
    }

    #[test]
    fn test_monthly_by_category_sums_per_month() {
        let rows = vec![
            view(1, day(2024, 1, 5), 100.0, Some("Food"), None),
            view(2, day(2024, 1, 20), 50.0, Some("Food"), None),
            view(3, day(2024, 2, 1), 30.0, Some("Food"), None),
        ];

        let pivot = monthly_spending_by_category(&rows);

        assert_eq!(
            pivot.column(Some("Food")).unwrap(),
            vec![(YearMonth::new(2024, 1), 150.0), (YearMonth::new(2024, 2), 30.0)]
        );
    }

    #[test]
    fn test_missing_combinations_are_zero() {
        let rows = vec![
            view(1, day(2024, 1, 5), 10.0, Some("Transport"), None),
            view(2, day(2024, 2, 5), 20.0, Some("Groceries"), None),
        ];

        let pivot = monthly_spending_by_category(&rows);

        assert_eq!(pivot.column_labels(), vec!["Groceries", "Transport"]);
        assert_eq!(pivot.get(YearMonth::new(2024, 1), Some("Groceries")), Some(0.0));
        assert_eq!(pivot.get(YearMonth::new(2024, 2), Some("Transport")), Some(0.0));
        assert_eq!(pivot.get(YearMonth::new(2024, 3), Some("Transport")), None);
    }

    #[test]
    fn test_null_category_collapses_into_one_bucket_last() {
        let rows = vec![
            view(1, day(2024, 1, 5), 10.0, None, None),
            view(2, day(2024, 1, 6), 5.0, Some("Water"), None),
            view(3, day(2024, 1, 7), 2.5, None, None),
        ];

        let pivot = monthly_spending_by_category(&rows);

        assert_eq!(pivot.columns, vec![Some("Water".to_string()), None]);
        assert_eq!(pivot.get(YearMonth::new(2024, 1), None), Some(12.5));
    }

    #[test]
    fn test_monthly_by_account() {
        let rows = vec![
            view(1, day(2024, 3, 1), 10.0, Some("Food"), Some("Cash Wallet")),
            view(2, day(2024, 3, 2), 15.0, Some("Fun"), Some("Cash Wallet")),
            view(3, day(2024, 4, 2), 7.0, Some("Fun"), Some("Credit Card")),
        ];

        let pivot = monthly_spending_by_account(&rows);

        assert_eq!(pivot.group_by, "account");
        assert_eq!(pivot.get(YearMonth::new(2024, 3), Some("Cash Wallet")), Some(25.0));
        assert_eq!(pivot.get(YearMonth::new(2024, 4), Some("Credit Card")), Some(7.0));
        assert_eq!(pivot.get(YearMonth::new(2024, 4), Some("Cash Wallet")), Some(0.0));
    }

    #[test]
    fn test_total_summary_sorted_descending() {
        let rows = vec![
            view(1, day(2024, 1, 1), 100.0, None, Some("A")),
            view(2, day(2024, 1, 2), 200.0, None, Some("A")),
            view(3, day(2024, 1, 3), 500.0, None, Some("B")),
        ];

        let totals = total_spending_summary(&rows);

        assert_eq!(
            totals,
            vec![
                GroupTotal { name: Some("B".to_string()), total: 500.0 },
                GroupTotal { name: Some("A".to_string()), total: 300.0 },
            ]
        );
    }

    #[test]
    fn test_recent_transactions_by_date_desc() {
        let rows = vec![
            view(1, day(2024, 1, 1), 1.0, None, None),
            view(2, day(2024, 1, 3), 1.0, None, None),
            view(3, day(2024, 1, 2), 1.0, None, None),
        ];

        let ids: Vec<i64> = recent_transactions(&rows, 2)
            .iter()
            .map(|r| r.transaction_id)
            .collect();

        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_recent_transactions_ties_keep_input_order() {
        let rows = vec![
            view(1, day(2024, 1, 1), 1.0, None, None),
            view(2, day(2024, 1, 5), 1.0, None, None),
            view(3, day(2024, 1, 5), 1.0, None, None),
            view(4, day(2024, 1, 5), 1.0, None, None),
        ];

        let ids: Vec<i64> = recent_transactions(&rows, 10)
            .iter()
            .map(|r| r.transaction_id)
            .collect();

        assert_eq!(ids, vec![2, 3, 4, 1]);
    }

    #[test]
    fn test_top_level_rollup() {
        let tree = CategoryTree::from_categories(vec![
            Category { id: 4, name: "Utilities".into(), parent_id: None },
            Category { id: 7, name: "Internet".into(), parent_id: Some(4) },
            Category { id: 2, name: "Groceries".into(), parent_id: None },
        ]);
        let mut internet = view(1, day(2024, 1, 1), 999.0, Some("Internet"), None);
        internet.category_id = Some(7);
        let mut utilities = view(2, day(2024, 1, 2), 1.0, Some("Utilities"), None);
        utilities.category_id = Some(4);
        let mut groceries = view(3, day(2024, 1, 3), 50.0, Some("Groceries"), None);
        groceries.category_id = Some(2);
        let uncategorized = view(4, day(2024, 1, 4), 3.0, None, None);

        let totals = spending_by_top_level_category(
            &[internet, utilities, groceries, uncategorized],
            &tree,
        );

        assert_eq!(totals[0].label(), "Utilities");
        assert_eq!(totals[0].total, 1000.0);
        assert_eq!(totals[1].label(), "Groceries");
        assert_eq!(totals[2].label(), UNNAMED);
    }

    #[test]
    fn test_pivot_display() {
        let rows = vec![
            view(1, day(2024, 1, 5), 100.0, Some("Food"), None),
            view(2, day(2024, 2, 1), 30.0, None, None),
        ];

        let text = monthly_spending_by_category(&rows).to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("month"));
        assert!(lines[0].contains("Food"));
        assert!(lines[0].contains(UNNAMED));
        assert!(lines[1].starts_with("2024-01"));
        assert!(lines[1].contains("100.00"));
        assert!(lines[2].contains("30.00"));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(monthly_spending_by_category(&[]).is_empty());
        assert!(total_spending_summary(&[]).is_empty());
        assert!(recent_transactions(&[], 10).is_empty());
        assert_eq!(monthly_spending_by_account(&[]).to_string(), "(no transactions)\n");
    }
}
