use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{date_key, parse_date, ExpenseRecord, SalaryDetail};

/// Rows shown when no filter is active.
pub const DEFAULT_DISPLAY_LIMIT: usize = 20;

/// Filter value meaning "no restriction".
pub const ALL: &str = "all";

/// Records that carry a stored calendar date.
pub trait Dated {
    fn date(&self) -> &str;
}

impl Dated for ExpenseRecord {
    fn date(&self) -> &str {
        &self.date
    }
}

impl Dated for SalaryDetail {
    fn date(&self) -> &str {
        &self.date
    }
}

fn record_date<T: Dated>(item: &T) -> Option<NaiveDate> {
    let parsed = parse_date(item.date());
    if parsed.is_none() {
        tracing::debug!(date = item.date(), "skipping record with unparsable date");
    }
    parsed
}

// ---------------------------------------------------------------------------
// Distinct values
// ---------------------------------------------------------------------------

pub fn unique_categories(records: &[ExpenseRecord]) -> Vec<String> {
    let set: BTreeSet<&str> = records.iter().map(|r| r.category.as_str()).collect();
    set.into_iter().map(String::from).collect()
}

pub fn unique_descriptions(records: &[ExpenseRecord]) -> Vec<String> {
    let set: BTreeSet<&str> = records.iter().map(|r| r.description.as_str()).collect();
    set.into_iter().map(String::from).collect()
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub category: Option<String>,
    /// Empty means every description passes.
    pub descriptions: BTreeSet<String>,
    pub expense_type: Option<String>,
}

fn restriction(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(ALL))
}

fn bound(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(date_key).filter(|v| !v.is_empty())
}

impl ExpenseFilter {
    /// True when any field restricts the result.
    pub fn is_active(&self) -> bool {
        bound(&self.from_date).is_some()
            || bound(&self.to_date).is_some()
            || restriction(&self.category).is_some()
            || !self.descriptions.is_empty()
            || restriction(&self.expense_type).is_some()
    }

    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        let date = date_key(&record.date);
        if let Some(from) = bound(&self.from_date) {
            if date < from {
                return false;
            }
        }
        if let Some(to) = bound(&self.to_date) {
            if date > to {
                return false;
            }
        }
        if let Some(category) = restriction(&self.category) {
            if record.category != category {
                return false;
            }
        }
        if !self.descriptions.is_empty() && !self.descriptions.contains(&record.description) {
            return false;
        }
        if let Some(expense_type) = restriction(&self.expense_type) {
            if record.expense_type != expense_type {
                return false;
            }
        }
        true
    }
}

/// Records passing every active predicate, in input order. With no active
/// predicate only the first [`DEFAULT_DISPLAY_LIMIT`] records are returned.
pub fn filter_expenses<'a>(records: &'a [ExpenseRecord], filter: &ExpenseFilter) -> Vec<&'a ExpenseRecord> {
    if !filter.is_active() {
        return records.iter().take(DEFAULT_DISPLAY_LIMIT).collect();
    }
    records.iter().filter(|r| filter.matches(r)).collect()
}

/// Items dated in `year` (and `month`, 1-12, when given).
pub fn in_period<T: Dated>(items: &[T], year: i32, month: Option<u32>) -> Vec<&T> {
    items
        .iter()
        .filter(|item| match record_date(*item) {
            Some(d) => d.year() == year && month.map_or(true, |m| d.month() == m),
            None => false,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Period totals
// ---------------------------------------------------------------------------

/// Sum `amount` per key. Records whose date does not parse, or for which the
/// extractor returns None, are left out.
pub fn group_sum_by_period<K, F>(records: &[ExpenseRecord], key: F) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(NaiveDate) -> Option<K>,
{
    let mut totals = BTreeMap::new();
    for record in records {
        let Some(k) = record_date(record).and_then(&key) else {
            continue;
        };
        *totals.entry(k).or_insert(0.0) += record.amount;
    }
    totals
}

/// Total per calendar year, ascending.
pub fn yearly_totals(records: &[ExpenseRecord]) -> Vec<(i32, f64)> {
    group_sum_by_period(records, |d| Some(d.year())).into_iter().collect()
}

/// Total per month of `year`, always 12 entries January first.
pub fn monthly_totals(records: &[ExpenseRecord], year: i32) -> Vec<(u32, f64)> {
    let sums = group_sum_by_period(records, |d| (d.year() == year).then(|| d.month()));
    (1..=12).map(|m| (m, sums.get(&m).copied().unwrap_or(0.0))).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeTotal {
    pub label: String,
    pub total: f64,
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Sum per expense type within a year (and month), largest first. Types are
/// grouped case-insensitively and labelled with a leading capital.
pub fn group_sum_by_expense_type(records: &[ExpenseRecord], year: i32, month: Option<u32>) -> Vec<TypeTotal> {
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    for record in in_period(records, year, month) {
        *sums.entry(record.expense_type.trim().to_lowercase()).or_insert(0.0) += record.amount;
    }
    let mut totals: Vec<TypeTotal> = sums
        .into_iter()
        .map(|(t, total)| TypeTotal { label: capitalize(&t), total })
        .collect();
    totals.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.label.cmp(&b.label)));
    totals
}

/// Records whose type matches a display label, ignoring case.
pub fn transactions_of_type<'a>(records: &'a [ExpenseRecord], label: &str) -> Vec<&'a ExpenseRecord> {
    let wanted = label.trim().to_lowercase();
    records
        .iter()
        .filter(|r| r.expense_type.trim().to_lowercase() == wanted)
        .collect()
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthOverview {
    pub income: f64,
    pub expense: f64,
    pub total: f64,
    pub balance: f64,
    pub count: usize,
}

/// Card figures for one month. `expense` sums every record in the month,
/// income rows included.
pub fn month_overview(records: &[ExpenseRecord], year: i32, month: u32) -> MonthOverview {
    let rows = in_period(records, year, Some(month));
    let income: f64 = rows
        .iter()
        .filter(|r| r.expense_type.trim().eq_ignore_ascii_case("income"))
        .map(|r| r.amount)
        .sum();
    let expense: f64 = rows.iter().map(|r| r.amount).sum();
    MonthOverview {
        income,
        expense,
        total: income + expense,
        balance: income - expense,
        count: rows.len(),
    }
}

// ---------------------------------------------------------------------------
// Salary vs. expense summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub gross_salary: f64,
    pub direct_saving: f64,
    pub expenses_total: f64,
    pub balance: f64,
    pub saving_percent: f64,
}

// Direct saving is taken out of the balance but not out of the percentage.
fn saving_percent(gross_salary: f64, expenses_total: f64) -> f64 {
    if gross_salary > 0.0 {
        (gross_salary - expenses_total) / gross_salary * 100.0
    } else {
        0.0
    }
}

pub fn monthly_summary<'a, S, E>(salaries: S, expenses: E) -> MonthlySummary
where
    S: IntoIterator<Item = &'a SalaryDetail>,
    E: IntoIterator<Item = &'a ExpenseRecord>,
{
    let (gross_salary, direct_saving) = salaries
        .into_iter()
        .fold((0.0, 0.0), |(g, d), s| (g + s.gross_salary, d + s.direct_saving()));
    let expenses_total: f64 = expenses.into_iter().map(|e| e.amount).sum();
    MonthlySummary {
        gross_salary,
        direct_saving,
        expenses_total,
        balance: gross_salary - direct_saving - expenses_total,
        saving_percent: saving_percent(gross_salary, expenses_total),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthSummary {
    /// 1 = January.
    pub month: u32,
    #[serde(flatten)]
    pub summary: MonthlySummary,
}

/// One summary per calendar month of `year`, January first.
pub fn yearly_summary(salaries: &[SalaryDetail], expenses: &[ExpenseRecord], year: i32) -> Vec<MonthSummary> {
    (1..=12)
        .map(|month| MonthSummary {
            month,
            summary: monthly_summary(
                in_period(salaries, year, Some(month)),
                in_period(expenses, year, Some(month)),
            ),
        })
        .collect()
}

/// Year total: sums of the monthly fields, percentage recomputed from the sums.
pub fn overall_summary(months: &[MonthSummary]) -> MonthlySummary {
    let mut total = MonthlySummary::default();
    for m in months {
        total.gross_salary += m.summary.gross_salary;
        total.direct_saving += m.summary.direct_saving;
        total.expenses_total += m.summary.expenses_total;
        total.balance += m.summary.balance;
    }
    total.saving_percent = saving_percent(total.gross_salary, total.expenses_total);
    total
}

/// (month, saving %) for months that had any salary.
pub fn saving_percent_by_month(months: &[MonthSummary]) -> Vec<(u32, f64)> {
    months
        .iter()
        .filter(|m| m.summary.gross_salary > 0.0)
        .map(|m| (m.month, m.summary.saving_percent))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exp(id: i64, description: &str, amount: f64, category: &str, expense_type: &str, date: &str) -> ExpenseRecord {
        ExpenseRecord {
            id,
            description: description.into(),
            amount,
            category: category.into(),
            expense_type: expense_type.into(),
            date: date.into(),
        }
    }

    fn sal(id: i64, date: &str, gross: f64, epf: f64) -> SalaryDetail {
        SalaryDetail {
            id,
            date: date.into(),
            gross_salary: gross,
            epf,
            mf: 0.0,
            vpf: 0.0,
            etf: 0.0,
        }
    }

    fn sample() -> Vec<ExpenseRecord> {
        vec![
            exp(1, "Rent", 12000.0, "House Rent", "expense", "2024-03-01"),
            exp(2, "Pizza", 450.0, "Food", "expense", "2024-03-10"),
            exp(3, "Refund", 200.0, "Other", "income", "2024-02-15"),
            exp(4, "Bus", 40.0, "Transport", "Expense", "2024-02-01"),
            exp(5, "Pizza", 380.0, "Food", "expense", "2023-12-24"),
            exp(6, "Broken", 99.0, "Other", "expense", "yesterday"),
        ]
    }

    #[test]
    fn test_unique_categories_sorted_and_distinct() {
        let cats = unique_categories(&sample());
        assert_eq!(cats, vec!["Food", "House Rent", "Other", "Transport"]);
        assert_eq!(unique_categories(&sample()), cats);
    }

    #[test]
    fn test_unique_descriptions() {
        assert_eq!(unique_descriptions(&sample()), vec!["Broken", "Bus", "Pizza", "Refund", "Rent"]);
        assert!(unique_descriptions(&[]).is_empty());
    }

    #[test]
    fn test_empty_filter_caps_to_display_limit() {
        let records: Vec<ExpenseRecord> = (1..=30)
            .map(|i| exp(i, "x", 1.0, "Food", "expense", "2024-01-01"))
            .collect();
        let shown = filter_expenses(&records, &ExpenseFilter::default());
        assert_eq!(shown.len(), DEFAULT_DISPLAY_LIMIT);
        assert_eq!(shown[0].id, 1);
        assert_eq!(filter_expenses(&records[..5], &ExpenseFilter::default()).len(), 5);
    }

    #[test]
    fn test_active_filter_is_never_capped() {
        let records: Vec<ExpenseRecord> = (1..=30)
            .map(|i| exp(i, "x", 1.0, "Food", "expense", "2024-01-01"))
            .collect();
        let filter = ExpenseFilter { category: Some("Food".into()), ..Default::default() };
        assert_eq!(filter_expenses(&records, &filter).len(), 30);
    }

    #[test]
    fn test_all_sentinel_is_inactive() {
        let filter = ExpenseFilter {
            category: Some("all".into()),
            expense_type: Some(ALL.into()),
            from_date: Some(String::new()),
            ..Default::default()
        };
        assert!(!filter.is_active());
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let filter = ExpenseFilter {
            from_date: Some("2024-02-01".into()),
            to_date: Some("2024-03-01".into()),
            ..Default::default()
        };
        let data = sample();
        let ids: Vec<i64> = filter_expenses(&data, &filter).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn test_filter_conjunction_holds_for_every_result() {
        let data = sample();
        let filters = vec![
            ExpenseFilter { category: Some("Food".into()), ..Default::default() },
            ExpenseFilter {
                descriptions: ["Pizza".to_string(), "Bus".to_string()].into_iter().collect(),
                to_date: Some("2024-02-28".into()),
                ..Default::default()
            },
            ExpenseFilter {
                expense_type: Some("expense".into()),
                from_date: Some("2024-01-01".into()),
                ..Default::default()
            },
        ];
        for f in &filters {
            let out = filter_expenses(&data, f);
            for r in &out {
                assert!(data.contains(*r));
                assert!(f.matches(r));
                if let Some(c) = &f.category {
                    assert_eq!(&r.category, c);
                }
                if !f.descriptions.is_empty() {
                    assert!(f.descriptions.contains(&r.description));
                }
            }
            let expected = data.iter().filter(|r| f.matches(r)).count();
            assert_eq!(out.len(), expected);
        }
    }

    #[test]
    fn test_type_filter_is_exact() {
        let filter = ExpenseFilter { expense_type: Some("expense".into()), ..Default::default() };
        let data = sample();
        let ids: Vec<i64> = filter_expenses(&data, &filter).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 5, 6]);
    }

    #[test]
    fn test_yearly_totals_ascending_and_skip_bad_dates() {
        let totals = yearly_totals(&sample());
        assert_eq!(totals, vec![(2023, 380.0), (2024, 12690.0)]);
    }

    #[test]
    fn test_monthly_totals_has_twelve_entries() {
        let data = sample();
        let months = monthly_totals(&data, 2024);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0], (1, 0.0));
        assert_eq!(months[1], (2, 240.0));
        assert_eq!(months[2], (3, 12450.0));
        let sum: f64 = months.iter().map(|(_, v)| v).sum();
        let direct: f64 = data.iter().filter(|r| r.date.starts_with("2024")).map(|r| r.amount).sum();
        assert_eq!(sum, direct);
    }

    #[test]
    fn test_group_by_expense_type_scenario() {
        let records = vec![
            exp(1, "a", 100.0, "Food", "expense", "2024-01-05"),
            exp(2, "b", 50.0, "Other", "income", "2024-01-10"),
        ];
        let totals = group_sum_by_expense_type(&records, 2024, None);
        assert_eq!(
            totals,
            vec![
                TypeTotal { label: "Expense".into(), total: 100.0 },
                TypeTotal { label: "Income".into(), total: 50.0 },
            ]
        );
    }

    #[test]
    fn test_group_by_expense_type_merges_case() {
        let totals = group_sum_by_expense_type(&sample(), 2024, Some(2));
        assert_eq!(
            totals,
            vec![
                TypeTotal { label: "Income".into(), total: 200.0 },
                TypeTotal { label: "Expense".into(), total: 40.0 },
            ]
        );
        assert!(group_sum_by_expense_type(&sample(), 2030, None).is_empty());
    }

    #[test]
    fn test_transactions_of_type_ignores_case() {
        let data = sample();
        let rows = transactions_of_type(&data, "Expense");
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn test_month_overview() {
        let o = month_overview(&sample(), 2024, 2);
        assert_eq!(o.count, 2);
        assert_eq!(o.income, 200.0);
        assert_eq!(o.expense, 240.0);
        assert_eq!(o.total, 440.0);
        assert_eq!(o.balance, -40.0);
    }

    #[test]
    fn test_monthly_summary_empty_is_all_zero() {
        let none_s: Vec<SalaryDetail> = Vec::new();
        let none_e: Vec<ExpenseRecord> = Vec::new();
        let s = monthly_summary(&none_s, &none_e);
        assert_eq!(s, MonthlySummary::default());
        assert_eq!(s.saving_percent, 0.0);
        assert!(!s.saving_percent.is_nan());
    }

    #[test]
    fn test_monthly_summary_scenario() {
        let salaries = vec![sal(1, "2024-01-31", 1000.0, 100.0)];
        let expenses = vec![exp(1, "stuff", 300.0, "Food", "expense", "2024-01-10")];
        let s = monthly_summary(&salaries, &expenses);
        assert_eq!(
            s,
            MonthlySummary {
                gross_salary: 1000.0,
                direct_saving: 100.0,
                expenses_total: 300.0,
                balance: 600.0,
                saving_percent: 70.0,
            }
        );
    }

    #[test]
    fn test_yearly_summary_sums_match_direct_totals() {
        let salaries = vec![
            sal(1, "2024-01-31", 1000.0, 100.0),
            sal(2, "2024-03-31", 1200.0, 120.0),
            sal(3, "2023-12-31", 900.0, 90.0),
        ];
        let expenses = sample();
        let months = yearly_summary(&salaries, &expenses, 2024);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].month, 1);
        assert_eq!(months[11].month, 12);

        let total = overall_summary(&months);
        assert_eq!(total.gross_salary, 2200.0);
        assert_eq!(total.direct_saving, 220.0);
        assert_eq!(total.expenses_total, 12690.0);
        assert_eq!(total.balance, 2200.0 - 220.0 - 12690.0);
        assert_eq!(total.saving_percent, (2200.0 - 12690.0) / 2200.0 * 100.0);
    }

    #[test]
    fn test_overall_percent_is_not_an_average() {
        let salaries = vec![sal(1, "2024-01-31", 1000.0, 0.0), sal(2, "2024-02-29", 3000.0, 0.0)];
        let expenses = vec![
            exp(1, "a", 500.0, "Food", "expense", "2024-01-10"),
            exp(2, "b", 300.0, "Food", "expense", "2024-02-10"),
        ];
        let months = yearly_summary(&salaries, &expenses, 2024);
        assert_eq!(months[0].summary.saving_percent, 50.0);
        assert_eq!(months[1].summary.saving_percent, 90.0);
        assert_eq!(overall_summary(&months).saving_percent, 80.0);
    }

    #[test]
    fn test_saving_percent_by_month_skips_months_without_salary() {
        let salaries = vec![sal(1, "2024-01-31", 1000.0, 0.0)];
        let expenses = vec![exp(1, "a", 250.0, "Food", "expense", "2024-01-10")];
        let months = yearly_summary(&salaries, &expenses, 2024);
        assert_eq!(saving_percent_by_month(&months), vec![(1, 75.0)]);
    }

    #[test]
    fn test_in_period_for_salary() {
        let salaries = vec![sal(1, "2024-01-31", 1000.0, 0.0), sal(2, "bad", 5.0, 0.0)];
        assert_eq!(in_period(&salaries, 2024, None).len(), 1);
        assert!(in_period(&salaries, 2024, Some(2)).is_empty());
    }
}
