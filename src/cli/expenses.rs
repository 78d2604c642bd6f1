use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::aggregate::{self, ExpenseFilter};
use crate::cli::{open_for_edit, open_ledger, today};
use crate::error::{Result, SpendbookError};
use crate::fmt::money;
use crate::ledger::Ledger;
use crate::models::{ExpensePatch, ExpenseRecord, NewExpense};

pub fn add(
    description: &str,
    amount: f64,
    category: &str,
    expense_type: Option<&str>,
    date: Option<&str>,
) -> Result<()> {
    let mut ledger = open_for_edit()?;
    let known_type = known_category_type(&ledger, category, expense_type)?;
    let expense = NewExpense {
        description: description.trim().to_string(),
        amount,
        category: category.trim().to_string(),
        expense_type: known_type
            .clone()
            .or_else(|| expense_type.map(|t| t.trim().to_lowercase()))
            .unwrap_or_default(),
        date: date.map(str::to_string).unwrap_or_else(today),
    };
    let is_new_category = known_type.is_none();
    let record = ledger.add_expense(&expense, if is_new_category { expense_type } else { None })?;
    if is_new_category {
        println!("Added category: {} ({})", record.category, record.expense_type);
    }
    println!("Added expense {}: {} {}", record.id, record.description, money(record.amount));
    Ok(())
}

/// Type of a category already in the master list. A known category always
/// keeps its own type, so a conflicting `--type` is an error.
fn known_category_type(ledger: &Ledger, category: &str, requested: Option<&str>) -> Result<Option<String>> {
    let Some(known) = ledger.expense_type_for(category) else {
        return Ok(None);
    };
    match requested.map(str::trim) {
        Some(t) if !t.eq_ignore_ascii_case(known) => Err(SpendbookError::invalid(
            "expense_type",
            format!("Category {} has type {known}", category.trim()),
        )),
        _ => Ok(Some(known.to_string())),
    }
}

pub fn list(filter: ExpenseFilter, json: bool) -> Result<()> {
    let ledger = open_ledger()?;
    let rows = aggregate::filter_expenses(ledger.expenses(), &filter);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    print_table("Expenses", &rows);
    if !filter.is_active() && ledger.expenses().len() > rows.len() {
        println!(
            "Showing the {} most recent of {}. Add a filter to see more.",
            rows.len(),
            ledger.expenses().len()
        );
    }
    Ok(())
}

pub(crate) fn print_table(title: &str, rows: &[&ExpenseRecord]) {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Description", "Category", "Type", "Amount"]);
    let mut total = 0.0;
    for r in rows {
        total += r.amount;
        let amount = if r.expense_type.eq_ignore_ascii_case("income") {
            money(r.amount).green().to_string()
        } else {
            money(r.amount)
        };
        table.add_row(vec![
            Cell::new(r.id),
            Cell::new(&r.date),
            Cell::new(&r.description),
            Cell::new(&r.category),
            Cell::new(&r.expense_type),
            Cell::new(amount),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(money(total).bold()),
    ]);
    println!("{title}\n{table}");
}

pub fn edit(id: i64, mut patch: ExpensePatch) -> Result<()> {
    if patch.is_empty() {
        return Err(SpendbookError::Other("Nothing to update. Pass at least one field.".into()));
    }
    let mut ledger = open_for_edit()?;
    let mut new_category_type = None;
    if let Some(category) = patch.category.as_deref() {
        match known_category_type(&ledger, category, patch.expense_type.as_deref())? {
            Some(known) => patch.expense_type = Some(known),
            None => new_category_type = patch.expense_type.clone(),
        }
    }
    let masters_before = ledger.masters().len();
    let record = ledger.update_expense(id, &patch, new_category_type.as_deref())?;
    if ledger.masters().len() > masters_before {
        println!("Added category: {} ({})", record.category, record.expense_type);
    }
    println!("Updated expense {}: {} {}", record.id, record.description, money(record.amount));
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let mut ledger = open_for_edit()?;
    ledger.delete_expense(id)?;
    println!("Deleted expense {id}");
    Ok(())
}

pub fn categories() -> Result<()> {
    let ledger = open_ledger()?;
    for c in aggregate::unique_categories(ledger.expenses()) {
        println!("{c}");
    }
    Ok(())
}

pub fn descriptions() -> Result<()> {
    let ledger = open_ledger()?;
    for d in aggregate::unique_descriptions(ledger.expenses()) {
        println!("{d}");
    }
    Ok(())
}
