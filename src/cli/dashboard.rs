use chrono::Datelike;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::aggregate;
use crate::cli::{open_ledger, parse_period};
use crate::error::Result;
use crate::fmt::{bar, money, month_label, percent};

pub fn run(month: Option<String>) -> Result<()> {
    let ledger = open_ledger()?;
    let (year, month) = match month {
        Some(m) => parse_period(Some(&m), None)?,
        None => {
            let now = chrono::Local::now();
            (now.year(), Some(now.month()))
        }
    };
    let month = month.unwrap_or(1);
    let title = format!("{} {year}", month_label(month));

    let overview = aggregate::month_overview(ledger.expenses(), year, month);
    let balance = if overview.balance >= 0.0 {
        money(overview.balance).green().bold()
    } else {
        money(overview.balance).red().bold()
    };

    println!("{}", format!("Dashboard: {title}").bold());
    println!();
    println!("  Income:        {}", money(overview.income).green());
    println!("  Spent:         {}", money(overview.expense));
    println!("  Total:         {}", money(overview.total));
    println!("  Balance:       {balance}");
    println!("  Transactions:  {}", overview.count);

    let salaries = aggregate::in_period(ledger.salaries(), year, Some(month));
    let expenses = aggregate::in_period(ledger.expenses(), year, Some(month));
    let summary = aggregate::monthly_summary(salaries, expenses);
    if summary.gross_salary > 0.0 {
        println!();
        println!("  Gross salary:  {}", money(summary.gross_salary));
        println!("  Direct saving: {}", money(summary.direct_saving));
        println!("  Saving:        {}", percent(summary.saving_percent));
    }

    let totals = aggregate::group_sum_by_expense_type(ledger.expenses(), year, Some(month));
    if !totals.is_empty() {
        let max = totals.iter().map(|t| t.total).fold(0.0, f64::max);
        let mut table = Table::new();
        table.set_header(vec!["Type", "Total", ""]);
        for t in &totals {
            table.add_row(vec![
                Cell::new(&t.label),
                Cell::new(money(t.total)),
                Cell::new(bar(t.total, max, 24).cyan()),
            ]);
        }
        println!();
        println!("By Type\n{table}");
    }
    Ok(())
}
