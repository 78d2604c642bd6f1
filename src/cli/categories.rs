use comfy_table::{Cell, Table};

use crate::cli::{open_for_edit, open_ledger};
use crate::error::Result;
use crate::models::NewCategory;

pub fn list() -> Result<()> {
    let ledger = open_ledger()?;
    let mut masters: Vec<_> = ledger.masters().iter().collect();
    masters.sort_by(|a, b| a.category.to_lowercase().cmp(&b.category.to_lowercase()));

    let mut table = Table::new();
    table.set_header(vec!["ID", "Category", "Type"]);
    for m in masters {
        table.add_row(vec![Cell::new(m.id), Cell::new(&m.category), Cell::new(&m.expense_type)]);
    }
    println!("Categories\n{table}");
    Ok(())
}

pub fn add(name: &str, expense_type: &str) -> Result<()> {
    let mut ledger = open_for_edit()?;
    let master = ledger.add_category(&NewCategory {
        category: name.trim().to_string(),
        expense_type: expense_type.to_string(),
    })?;
    println!("Added category {}: {} ({})", master.id, master.category, master.expense_type);
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let mut ledger = open_for_edit()?;
    ledger.delete_category(id)?;
    println!("Deleted category {id}");
    Ok(())
}
