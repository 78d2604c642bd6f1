use std::path::{Path, PathBuf};

use crate::cli::{open_for_edit, open_ledger, TableKind};
use crate::error::Result;
use crate::ledger::Ledger;
use crate::models::{CategoryMaster, ExpenseRecord, MilkDetail, SalaryDetail};
use crate::settings::get_data_dir;
use crate::store::{self, Entity};

/// Write every row of `E` to `path` with the stored column names as headers.
pub fn write_csv<E: Entity>(ledger: &Ledger, path: &Path) -> Result<usize> {
    let rows: Vec<E> = store::list_all(ledger.conn())?;
    let mut writer = csv::Writer::from_path(path)?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(rows.len())
}

pub fn read_csv<E: Entity>(path: &Path) -> Result<Vec<E>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

fn table_name(kind: TableKind) -> &'static str {
    match kind {
        TableKind::Expenses => ExpenseRecord::TABLE,
        TableKind::Salary => SalaryDetail::TABLE,
        TableKind::Categories => CategoryMaster::TABLE,
        TableKind::Milk => MilkDetail::TABLE,
    }
}

pub fn export(kind: TableKind, output: Option<String>) -> Result<()> {
    let ledger = open_ledger()?;
    let dest = match output {
        Some(p) => PathBuf::from(p),
        None => {
            let exports_dir = get_data_dir().join("exports");
            std::fs::create_dir_all(&exports_dir)?;
            let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
            exports_dir.join(format!("{}-{stamp}.csv", table_name(kind)))
        }
    };
    let count = match kind {
        TableKind::Expenses => write_csv::<ExpenseRecord>(&ledger, &dest)?,
        TableKind::Salary => write_csv::<SalaryDetail>(&ledger, &dest)?,
        TableKind::Categories => write_csv::<CategoryMaster>(&ledger, &dest)?,
        TableKind::Milk => write_csv::<MilkDetail>(&ledger, &dest)?,
    };
    println!("Exported {count} rows to {}", dest.display());
    Ok(())
}

pub fn import(kind: TableKind, file: &str) -> Result<()> {
    let path = Path::new(file);
    let mut ledger = open_for_edit()?;
    let count = match kind {
        TableKind::Expenses => ledger.import_rows(&read_csv::<ExpenseRecord>(path)?)?,
        TableKind::Salary => ledger.import_rows(&read_csv::<SalaryDetail>(path)?)?,
        TableKind::Categories => ledger.import_rows(&read_csv::<CategoryMaster>(path)?)?,
        TableKind::Milk => ledger.import_rows(&read_csv::<MilkDetail>(path)?)?,
    };
    println!("Imported {count} rows into {}", table_name(kind));
    Ok(())
}
