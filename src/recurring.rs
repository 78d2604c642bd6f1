use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{Result, SpendbookError};
use crate::models::{ExpenseRecord, NewExpense};

/// First and last day of the calendar month before `today`, as stored dates.
pub fn previous_month_range(today: NaiveDate) -> (String, String) {
    let first_of_this = today.with_day(1).unwrap_or(today);
    let last_of_prev = first_of_this - Duration::days(1);
    let first_of_prev = last_of_prev.with_day(1).unwrap_or(last_of_prev);
    (
        first_of_prev.format("%Y-%m-%d").to_string(),
        last_of_prev.format("%Y-%m-%d").to_string(),
    )
}

/// One row per recurring category, prefilled from the most recent expense in
/// `last_month` for that category. `last_month` must be sorted newest first.
pub fn build_template(categories: &[String], last_month: &[ExpenseRecord], date: &str) -> Vec<NewExpense> {
    categories
        .iter()
        .map(|category| {
            let previous = last_month.iter().find(|e| &e.category == category);
            NewExpense {
                description: previous
                    .map(|e| e.description.clone())
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| category.clone()),
                amount: previous.map(|e| e.amount).unwrap_or(0.0),
                category: category.clone(),
                expense_type: previous
                    .map(|e| e.expense_type.clone())
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| "expense".to_string()),
                date: date.to_string(),
            }
        })
        .collect()
}

/// Parse a `CATEGORY=AMOUNT` override.
pub fn parse_override(raw: &str) -> Result<(String, f64)> {
    let (category, amount) = raw
        .rsplit_once('=')
        .ok_or_else(|| SpendbookError::invalid("amount", format!("Expected CATEGORY=AMOUNT, got '{raw}'")))?;
    let amount: f64 = amount
        .trim()
        .parse()
        .map_err(|_| SpendbookError::invalid("amount", format!("Not a number: '{}'", amount.trim())))?;
    Ok((category.trim().to_string(), amount))
}

/// Apply amount overrides (matched case-insensitively) and keep the rows
/// worth saving.
pub fn finalize(mut rows: Vec<NewExpense>, overrides: &[(String, f64)]) -> Result<Vec<NewExpense>> {
    for (category, amount) in overrides {
        let row = rows
            .iter_mut()
            .find(|r| r.category.eq_ignore_ascii_case(category))
            .ok_or_else(|| SpendbookError::Other(format!("Not a recurring category: {category}")))?;
        row.amount = *amount;
    }
    rows.retain(|r| r.amount > 0.0);
    Ok(rows)
}
