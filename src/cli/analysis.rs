use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::aggregate;
use crate::cli::{current_year, expenses::print_table, open_ledger, parse_period};
use crate::error::Result;
use crate::fmt::{bar, money, month_label, percent};

const BAR_WIDTH: usize = 30;

fn max_of(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, f64::max)
}

pub fn yearly() -> Result<()> {
    let ledger = open_ledger()?;
    let totals = aggregate::yearly_totals(ledger.expenses());
    let max = max_of(totals.iter().map(|(_, t)| *t));

    let mut table = Table::new();
    table.set_header(vec!["Year", "Total", ""]);
    for (year, total) in &totals {
        table.add_row(vec![
            Cell::new(year),
            Cell::new(money(*total)),
            Cell::new(bar(*total, max, BAR_WIDTH).cyan()),
        ]);
    }
    println!("Spending by Year\n{table}");
    Ok(())
}

pub fn monthly(year: Option<i32>) -> Result<()> {
    let ledger = open_ledger()?;
    let year = year.unwrap_or_else(current_year);
    let totals = aggregate::monthly_totals(ledger.expenses(), year);
    let max = max_of(totals.iter().map(|(_, t)| *t));

    let mut table = Table::new();
    table.set_header(vec!["Month", "Total", ""]);
    for (month, total) in &totals {
        table.add_row(vec![
            Cell::new(month_label(*month)),
            Cell::new(money(*total)),
            Cell::new(bar(*total, max, BAR_WIDTH).cyan()),
        ]);
    }
    let sum: f64 = totals.iter().map(|(_, t)| t).sum();
    table.add_row(vec![Cell::new("Total".bold()), Cell::new(money(sum).bold()), Cell::new("")]);
    println!("Spending by Month {year}\n{table}");
    Ok(())
}

pub fn types(year: Option<i32>, month: Option<String>, show: Option<String>) -> Result<()> {
    let ledger = open_ledger()?;
    let (year, month) = parse_period(month.as_deref(), year)?;
    let period = match month {
        Some(m) => format!("{} {year}", month_label(m)),
        None => year.to_string(),
    };

    if let Some(label) = show {
        let in_period = aggregate::in_period(ledger.expenses(), year, month);
        let owned: Vec<_> = in_period.into_iter().cloned().collect();
        let rows = aggregate::transactions_of_type(&owned, &label);
        print_table(&format!("{label} transactions, {period}"), &rows);
        return Ok(());
    }

    let totals = aggregate::group_sum_by_expense_type(ledger.expenses(), year, month);
    let grand: f64 = totals.iter().map(|t| t.total).sum();
    let max = max_of(totals.iter().map(|t| t.total));

    let mut table = Table::new();
    table.set_header(vec!["Type", "Total", "%", ""]);
    for t in &totals {
        let share = if grand > 0.0 { t.total / grand * 100.0 } else { 0.0 };
        table.add_row(vec![
            Cell::new(&t.label),
            Cell::new(money(t.total)),
            Cell::new(percent(share)),
            Cell::new(bar(t.total, max, BAR_WIDTH).cyan()),
        ]);
    }
    println!("Spending by Type, {period}\n{table}");
    Ok(())
}

pub fn savings(year: Option<i32>) -> Result<()> {
    let ledger = open_ledger()?;
    let year = year.unwrap_or_else(current_year);
    let months = aggregate::yearly_summary(ledger.salaries(), ledger.expenses(), year);
    let points = aggregate::saving_percent_by_month(&months);

    if points.is_empty() {
        println!("No salary recorded for {year}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Month", "Saving %", ""]);
    for (month, pct) in &points {
        let label = if *pct < 0.0 {
            percent(*pct).red().to_string()
        } else {
            percent(*pct).green().to_string()
        };
        table.add_row(vec![
            Cell::new(month_label(*month)),
            Cell::new(label),
            Cell::new(bar(*pct, 100.0, BAR_WIDTH).green()),
        ]);
    }
    let overall = aggregate::overall_summary(&months);
    table.add_row(vec![
        Cell::new("Year".bold()),
        Cell::new(percent(overall.saving_percent).bold()),
        Cell::new(""),
    ]);
    println!("Saving Percentage {year}\n{table}");
    Ok(())
}
