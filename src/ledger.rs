use std::path::Path;

use rusqlite::Connection;

use crate::auth::{AccessGate, StoredCredential};
use crate::collection::Collection;
use crate::db::{get_connection, init_db};
use crate::error::{Result, SpendbookError};
use crate::models::{
    CategoryMaster, ExpensePatch, ExpenseRecord, MilkDetail, NewCategory, NewExpense,
    NewMilkDetail, NewSalary, SalaryDetail, SalaryPatch,
};
use crate::store::{self, Entity};

/// In-memory view of the database for one session. Reads come from the
/// collections; every write goes to the store first and is then applied
/// locally.
pub struct Ledger {
    conn: Connection,
    gate: AccessGate,
    expenses: Collection<ExpenseRecord>,
    salaries: Collection<SalaryDetail>,
    masters: Collection<CategoryMaster>,
    milk: Collection<MilkDetail>,
}

impl Ledger {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = get_connection(db_path)?;
        init_db(&conn)?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            gate: AccessGate::new(),
            expenses: Collection::new(),
            salaries: Collection::new(),
            masters: Collection::new(),
            milk: Collection::new(),
        }
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // -- access --------------------------------------------------------------

    pub fn enter_view(&mut self) {
        self.gate.enter_view();
    }

    pub fn logout(&mut self) {
        self.gate.logout();
    }

    /// Try to unlock edit mode with the stored password.
    pub fn unlock(&mut self, secret: &str) -> bool {
        let credential = StoredCredential::new(&self.conn);
        self.gate.enter_edit(&credential, secret)
    }

    // -- loading -------------------------------------------------------------

    pub fn load(&mut self) -> Result<()> {
        self.refresh_expenses()?;
        self.refresh_salaries()?;
        self.refresh_masters()?;
        self.refresh_milk()?;
        Ok(())
    }

    pub fn refresh_expenses(&mut self) -> Result<()> {
        let token = self.expenses.begin_refresh();
        let rows = store::list_all(&self.conn)?;
        self.expenses.finish_refresh(token, rows);
        Ok(())
    }

    pub fn refresh_salaries(&mut self) -> Result<()> {
        let token = self.salaries.begin_refresh();
        let rows = store::list_all(&self.conn)?;
        self.salaries.finish_refresh(token, rows);
        Ok(())
    }

    pub fn refresh_masters(&mut self) -> Result<()> {
        let token = self.masters.begin_refresh();
        let rows = store::list_masters(&self.conn)?;
        self.masters.finish_refresh(token, rows);
        Ok(())
    }

    pub fn refresh_milk(&mut self) -> Result<()> {
        let token = self.milk.begin_refresh();
        let rows = store::list_all(&self.conn)?;
        self.milk.finish_refresh(token, rows);
        Ok(())
    }

    pub fn expenses(&self) -> &[ExpenseRecord] {
        self.expenses.items()
    }

    pub fn salaries(&self) -> &[SalaryDetail] {
        self.salaries.items()
    }

    pub fn masters(&self) -> &[CategoryMaster] {
        self.masters.items()
    }

    pub fn milk(&self) -> &[MilkDetail] {
        self.milk.items()
    }

    /// Default type for a category, from the loaded master list.
    pub fn expense_type_for(&self, category: &str) -> Option<&str> {
        let category = category.trim();
        self.masters
            .items()
            .iter()
            .find(|m| m.category.eq_ignore_ascii_case(category))
            .map(|m| m.expense_type.as_str())
    }

    // -- expenses ------------------------------------------------------------

    /// Save an expense. An unknown category needs `new_category_type` and is
    /// added to the master list in the same transaction.
    pub fn add_expense(&mut self, expense: &NewExpense, new_category_type: Option<&str>) -> Result<ExpenseRecord> {
        self.gate.require_edit()?;
        expense.validate()?;
        let (record, created) = store::insert_expense_with_category(&self.conn, expense, new_category_type)?;
        if let Some(master) = created {
            self.masters.prepend(master);
        }
        self.expenses.prepend(record.clone());
        tracing::info!(id = record.id, amount = record.amount, "added expense");
        Ok(record)
    }

    pub fn add_expenses(&mut self, batch: &[NewExpense]) -> Result<Vec<ExpenseRecord>> {
        self.gate.require_edit()?;
        for expense in batch {
            expense.validate()?;
        }
        let written = store::insert_expenses(&self.conn, batch)?;
        self.expenses.prepend_all(written.clone());
        tracing::info!(count = written.len(), "added expenses");
        Ok(written)
    }

    /// Apply a patch. Moving the expense into an unknown category needs
    /// `new_category_type`, exactly like `add_expense`.
    pub fn update_expense(
        &mut self,
        id: i64,
        patch: &ExpensePatch,
        new_category_type: Option<&str>,
    ) -> Result<ExpenseRecord> {
        self.gate.require_edit()?;
        patch.validate()?;
        let (record, created) = store::update_expense_with_category(&self.conn, id, patch, new_category_type)?;
        if let Some(master) = created {
            self.masters.prepend(master);
        }
        self.expenses.replace(record.clone());
        tracing::info!(id, "updated expense");
        Ok(record)
    }

    pub fn delete_expense(&mut self, id: i64) -> Result<()> {
        self.gate.require_edit()?;
        store::delete::<ExpenseRecord>(&self.conn, id)?;
        self.expenses.remove(id);
        tracing::info!(id, "deleted expense");
        Ok(())
    }

    // -- salary --------------------------------------------------------------

    pub fn add_salary(&mut self, salary: &NewSalary) -> Result<SalaryDetail> {
        self.gate.require_edit()?;
        salary.validate()?;
        let record = store::insert_salary(&self.conn, salary)?;
        self.salaries.prepend(record.clone());
        tracing::info!(id = record.id, date = %record.date, "added salary detail");
        Ok(record)
    }

    pub fn update_salary(&mut self, id: i64, patch: &SalaryPatch) -> Result<SalaryDetail> {
        self.gate.require_edit()?;
        patch.validate()?;
        let record = store::update_salary(&self.conn, id, patch)?;
        self.salaries.replace(record.clone());
        tracing::info!(id, "updated salary detail");
        Ok(record)
    }

    // -- categories ----------------------------------------------------------

    pub fn add_category(&mut self, category: &NewCategory) -> Result<CategoryMaster> {
        self.gate.require_edit()?;
        category.validate()?;
        if let Some(existing) = store::find_master(&self.conn, &category.category)? {
            return Err(SpendbookError::Other(format!(
                "Category already exists: {}",
                existing.category
            )));
        }
        let master = store::insert_master(&self.conn, category)?;
        self.masters.prepend(master.clone());
        Ok(master)
    }

    /// Remove a master row. Expenses that use the category are left as they are.
    pub fn delete_category(&mut self, id: i64) -> Result<()> {
        self.gate.require_edit()?;
        store::delete::<CategoryMaster>(&self.conn, id)?;
        self.masters.remove(id);
        Ok(())
    }

    // -- milk ----------------------------------------------------------------

    /// Add a milk row. Serial numbers are unique.
    pub fn add_milk(&mut self, row: &NewMilkDetail) -> Result<MilkDetail> {
        self.gate.require_edit()?;
        check_kg(row.kg)?;
        if self.milk.items().iter().any(|m| m.sr_no == row.sr_no) {
            return Err(SpendbookError::invalid(
                "sr_no",
                format!("Serial number {} already exists", row.sr_no),
            ));
        }
        let record = store::insert_milk(&self.conn, row)?;
        self.milk.prepend(record.clone());
        Ok(record)
    }

    pub fn set_milk_kg(&mut self, sr_no: i64, kg: f64) -> Result<MilkDetail> {
        self.gate.require_edit()?;
        check_kg(kg)?;
        let record = store::update_milk_kg(&self.conn, sr_no, kg)?;
        self.milk.replace(record.clone());
        Ok(record)
    }

    // -- bulk restore --------------------------------------------------------

    /// Write rows back with their own ids in one transaction, then reload.
    pub fn import_rows<E: Entity>(&mut self, rows: &[E]) -> Result<usize> {
        self.gate.require_edit()?;
        let tx = self.conn.unchecked_transaction()?;
        for row in rows {
            row.restore(&tx)?;
        }
        tx.commit()?;
        tracing::info!(table = E::TABLE, rows = rows.len(), "imported rows");
        self.load()?;
        Ok(rows.len())
    }
}

fn check_kg(kg: f64) -> Result<()> {
    if !kg.is_finite() || kg < 0.0 {
        return Err(SpendbookError::invalid("kg", "Quantity must be a number of kg, 0 or more"));
    }
    Ok(())
}
