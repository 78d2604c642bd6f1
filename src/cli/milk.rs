use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_for_edit, open_ledger};
use crate::error::Result;
use crate::fmt::money;
use crate::models::{MilkDetail, NewMilkDetail};
use crate::settings::load_settings;

/// Total quantity and its cost at `rate` per kg.
pub fn totals(rows: &[MilkDetail], rate: f64) -> (f64, f64) {
    let kg: f64 = rows.iter().map(|r| r.kg).sum();
    (kg, kg * rate)
}

pub fn list(rate: Option<f64>) -> Result<()> {
    let ledger = open_ledger()?;
    let rate = rate.unwrap_or_else(|| load_settings().milk_rate);
    let rows = ledger.milk();

    let mut table = Table::new();
    table.set_header(vec!["Sr No", "Kg", "Added"]);
    for r in rows {
        table.add_row(vec![Cell::new(r.sr_no), Cell::new(format!("{:.2}", r.kg)), Cell::new(&r.created_at)]);
    }
    let (kg, cost) = totals(rows, rate);
    table.add_row(vec![Cell::new("Total".bold()), Cell::new(format!("{kg:.2}").bold()), Cell::new("")]);
    println!("Milk\n{table}");
    println!("Rate {} per kg, amount due {}", money(rate), money(cost).bold());
    Ok(())
}

pub fn set(sr_no: i64, kg: f64) -> Result<()> {
    let mut ledger = open_for_edit()?;
    let row = ledger.set_milk_kg(sr_no, kg)?;
    println!("Sr no {}: {:.2} kg", row.sr_no, row.kg);
    Ok(())
}

pub fn add(sr_no: i64, kg: f64) -> Result<()> {
    let mut ledger = open_for_edit()?;
    let row = ledger.add_milk(&NewMilkDetail { sr_no, kg })?;
    println!("Added sr no {}: {:.2} kg", row.sr_no, row.kg);
    Ok(())
}
