use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::aggregate::{self, MonthSummary};
use crate::cli::{current_year, open_for_edit, open_ledger};
use crate::error::{Result, SpendbookError};
use crate::fmt::{money, month_label, percent};
use crate::models::{NewSalary, SalaryPatch};

pub fn add(salary: NewSalary) -> Result<()> {
    let mut ledger = open_for_edit()?;
    let record = ledger.add_salary(&salary)?;
    println!(
        "Added salary detail {} for {}: gross {}, direct saving {}",
        record.id,
        record.date,
        money(record.gross_salary),
        money(record.direct_saving())
    );
    Ok(())
}

pub fn edit(id: i64, patch: SalaryPatch) -> Result<()> {
    if patch.is_empty() {
        return Err(SpendbookError::Other("Nothing to update. Pass at least one field.".into()));
    }
    let mut ledger = open_for_edit()?;
    let record = ledger.update_salary(id, &patch)?;
    println!("Updated salary detail {} ({})", record.id, record.date);
    Ok(())
}

pub fn list() -> Result<()> {
    let ledger = open_ledger()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Gross", "EPF", "MF", "VPF", "ETF", "Direct Saving"]);
    for s in ledger.salaries() {
        table.add_row(vec![
            Cell::new(s.id),
            Cell::new(&s.date),
            Cell::new(money(s.gross_salary)),
            Cell::new(money(s.epf)),
            Cell::new(money(s.mf)),
            Cell::new(money(s.vpf)),
            Cell::new(money(s.etf)),
            Cell::new(money(s.direct_saving())),
        ]);
    }
    println!("Salary Details\n{table}");
    Ok(())
}

pub fn summary(year: Option<i32>, json: bool) -> Result<()> {
    let ledger = open_ledger()?;
    let year = year.unwrap_or_else(current_year);
    let months = aggregate::yearly_summary(ledger.salaries(), ledger.expenses(), year);
    let overall = aggregate::overall_summary(&months);

    if json {
        let value = serde_json::json!({ "year": year, "months": months, "overall": overall });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Month", "Gross Salary", "Direct Saving", "Expenses", "Balance", "Saving %"]);
    for m in &months {
        table.add_row(summary_row(month_label(m.month).to_string(), m));
    }
    let total = MonthSummary { month: 0, summary: overall };
    table.add_row(summary_row("Total".bold().to_string(), &total));
    println!("Salary Summary {year}\n{table}");
    Ok(())
}

fn summary_row(label: String, m: &MonthSummary) -> Vec<Cell> {
    let s = &m.summary;
    let balance = if s.balance < 0.0 {
        money(s.balance).red().to_string()
    } else {
        money(s.balance)
    };
    vec![
        Cell::new(label),
        Cell::new(money(s.gross_salary)),
        Cell::new(money(s.direct_saving)),
        Cell::new(money(s.expenses_total)),
        Cell::new(balance),
        Cell::new(percent(s.saving_percent)),
    ]
}
