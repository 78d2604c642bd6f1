use comfy_table::{Cell, Table};

use crate::cli::{open_for_edit, open_ledger, today};
use crate::error::Result;
use crate::fmt::money;
use crate::ledger::Ledger;
use crate::models::NewExpense;
use crate::recurring::{build_template, finalize, parse_override, previous_month_range};
use crate::settings::load_settings;
use crate::store;

fn template(ledger: &Ledger, date: &str) -> Result<Vec<NewExpense>> {
    let categories = load_settings().recurring_categories;
    let (from, to) = previous_month_range(chrono::Local::now().date_naive());
    let last_month = store::expenses_in_categories(ledger.conn(), &categories, &from, &to)?;
    tracing::debug!(%from, %to, found = last_month.len(), "loaded last month's recurring expenses");
    Ok(build_template(&categories, &last_month, date))
}

fn print_rows(title: &str, rows: &[NewExpense]) {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Description", "Type", "Amount", "Date"]);
    for r in rows {
        table.add_row(vec![
            Cell::new(&r.category),
            Cell::new(&r.description),
            Cell::new(&r.expense_type),
            Cell::new(money(r.amount)),
            Cell::new(&r.date),
        ]);
    }
    println!("{title}\n{table}");
}

pub fn show() -> Result<()> {
    let ledger = open_ledger()?;
    let rows = template(&ledger, &today())?;
    print_rows("Recurring Expenses", &rows);
    println!("Rows with amount 0 are skipped by `spendbook recurring apply`.");
    Ok(())
}

pub fn apply(date: Option<String>, amounts: &[String]) -> Result<()> {
    let overrides = amounts
        .iter()
        .map(|a| parse_override(a))
        .collect::<Result<Vec<_>>>()?;
    let mut ledger = open_for_edit()?;
    let date = date.unwrap_or_else(today);
    let rows = finalize(template(&ledger, &date)?, &overrides)?;
    if rows.is_empty() {
        println!("No recurring expenses with an amount greater than 0.");
        return Ok(());
    }
    let written = ledger.add_expenses(&rows)?;
    let total: f64 = written.iter().map(|r| r.amount).sum();
    println!("Added {} recurring expenses totalling {}", written.len(), money(total));
    Ok(())
}
