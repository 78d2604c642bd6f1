use rusqlite::types::ToSql;
use rusqlite::{Connection, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::seed_default_categories;
use crate::error::{Result, SpendbookError};
use crate::models::{
    CategoryMaster, ExpensePatch, ExpenseRecord, MilkDetail, NewCategory, NewExpense,
    NewMilkDetail, NewSalary, SalaryDetail, SalaryPatch,
};

/// Rows fetched per round trip when listing a whole table.
pub const PAGE_SIZE: usize = 1000;

/// A persisted table row with a store-assigned integer key.
pub trait Entity: Sized + Clone + Serialize + DeserializeOwned {
    /// Human-readable name used in error messages.
    const KIND: &'static str;
    const TABLE: &'static str;
    const COLUMNS: &'static str;
    const ORDER_BY: &'static str;

    fn id(&self) -> i64;
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
    /// Write this row back with its existing id (used by CSV import).
    fn restore(&self, conn: &Connection) -> rusqlite::Result<usize>;
}

impl Entity for ExpenseRecord {
    const KIND: &'static str = "Expense";
    const TABLE: &'static str = "expenses";
    const COLUMNS: &'static str = "id, description, amount, category, expense_type, date";
    const ORDER_BY: &'static str = "date DESC, id DESC";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            description: row.get(1)?,
            amount: row.get(2)?,
            category: row.get(3)?,
            expense_type: row.get(4)?,
            date: row.get(5)?,
        })
    }

    fn restore(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT OR REPLACE INTO expenses (id, description, amount, category, expense_type, date) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                self.id,
                self.description,
                self.amount,
                self.category,
                self.expense_type,
                self.date
            ],
        )
    }
}

impl Entity for SalaryDetail {
    const KIND: &'static str = "Salary detail";
    const TABLE: &'static str = "salary_details";
    const COLUMNS: &'static str = "id, date, gross_salary, epf, mf, vpf, etf";
    const ORDER_BY: &'static str = "date DESC, id DESC";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            date: row.get(1)?,
            gross_salary: row.get(2)?,
            epf: row.get(3)?,
            mf: row.get(4)?,
            vpf: row.get(5)?,
            etf: row.get(6)?,
        })
    }

    fn restore(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT OR REPLACE INTO salary_details (id, date, gross_salary, epf, mf, vpf, etf) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                self.id,
                self.date,
                self.gross_salary,
                self.epf,
                self.mf,
                self.vpf,
                self.etf
            ],
        )
    }
}

impl Entity for CategoryMaster {
    const KIND: &'static str = "Category";
    const TABLE: &'static str = "master";
    const COLUMNS: &'static str = "id, category, expense_type";
    const ORDER_BY: &'static str = "category ASC, id ASC";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            category: row.get(1)?,
            expense_type: row.get(2)?,
        })
    }

    fn restore(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT OR REPLACE INTO master (id, category, expense_type) VALUES (?1, ?2, ?3)",
            rusqlite::params![self.id, self.category, self.expense_type],
        )
    }
}

impl Entity for MilkDetail {
    const KIND: &'static str = "Milk row";
    const TABLE: &'static str = "milk_details";
    const COLUMNS: &'static str = "id, sr_no, kg, created_at";
    const ORDER_BY: &'static str = "sr_no ASC, id ASC";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            sr_no: row.get(1)?,
            kg: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn restore(&self, conn: &Connection) -> rusqlite::Result<usize> {
        if self.created_at.is_empty() {
            conn.execute(
                "INSERT OR REPLACE INTO milk_details (id, sr_no, kg) VALUES (?1, ?2, ?3)",
                rusqlite::params![self.id, self.sr_no, self.kg],
            )
        } else {
            conn.execute(
                "INSERT OR REPLACE INTO milk_details (id, sr_no, kg, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![self.id, self.sr_no, self.kg, self.created_at],
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Generic list / get / delete
// ---------------------------------------------------------------------------

/// Fetch every row of a table, one page at a time, until a short page.
pub fn list_all<E: Entity>(conn: &Connection) -> Result<Vec<E>> {
    list_all_paged(conn, PAGE_SIZE)
}

pub(crate) fn list_all_paged<E: Entity>(conn: &Connection, page_size: usize) -> Result<Vec<E>> {
    let sql = format!(
        "SELECT {} FROM {} ORDER BY {} LIMIT ?1 OFFSET ?2",
        E::COLUMNS,
        E::TABLE,
        E::ORDER_BY
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut all = Vec::new();
    let mut offset = 0i64;
    let mut pages = 0usize;
    loop {
        let page: Vec<E> = stmt
            .query_map(rusqlite::params![page_size as i64, offset], E::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        pages += 1;
        let len = page.len();
        all.extend(page);
        if len < page_size {
            break;
        }
        offset += page_size as i64;
    }
    tracing::debug!(table = E::TABLE, rows = all.len(), pages, "listed table");
    Ok(all)
}

pub fn get<E: Entity>(conn: &Connection, id: i64) -> Result<E> {
    let sql = format!("SELECT {} FROM {} WHERE id = ?1", E::COLUMNS, E::TABLE);
    conn.query_row(&sql, [id], E::from_row).map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => SpendbookError::NotFound { kind: E::KIND, id },
        other => SpendbookError::Db(other),
    })
}

pub fn delete<E: Entity>(conn: &Connection, id: i64) -> Result<()> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", E::TABLE);
    let deleted = conn.execute(&sql, [id])?;
    if deleted == 0 {
        return Err(SpendbookError::NotFound { kind: E::KIND, id });
    }
    tracing::debug!(table = E::TABLE, id, "deleted row");
    Ok(())
}

fn update_columns<E: Entity>(conn: &Connection, id: i64, sets: &[(&str, &dyn ToSql)]) -> Result<E> {
    if sets.is_empty() {
        return get(conn, id);
    }
    let assignments: Vec<String> = sets
        .iter()
        .enumerate()
        .map(|(i, (col, _))| format!("{col} = ?{}", i + 1))
        .collect();
    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?{}",
        E::TABLE,
        assignments.join(", "),
        sets.len() + 1
    );
    let mut params: Vec<&dyn ToSql> = sets.iter().map(|(_, v)| *v).collect();
    params.push(&id);
    let updated = conn.execute(&sql, params.as_slice())?;
    if updated == 0 {
        return Err(SpendbookError::NotFound { kind: E::KIND, id });
    }
    get(conn, id)
}

// ---------------------------------------------------------------------------
// Expenses
// ---------------------------------------------------------------------------

pub fn insert_expense(conn: &Connection, expense: &NewExpense) -> Result<ExpenseRecord> {
    conn.execute(
        "INSERT INTO expenses (description, amount, category, expense_type, date) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            expense.description.trim(),
            expense.amount,
            expense.category,
            expense.expense_type,
            expense.date
        ],
    )?;
    get(conn, conn.last_insert_rowid())
}

/// Insert several expenses atomically. Nothing is written if any insert fails.
pub fn insert_expenses(conn: &Connection, expenses: &[NewExpense]) -> Result<Vec<ExpenseRecord>> {
    let tx = conn.unchecked_transaction()?;
    let mut written = Vec::with_capacity(expenses.len());
    for expense in expenses {
        written.push(insert_expense(&tx, expense)?);
    }
    tx.commit()?;
    Ok(written)
}

/// Insert an expense, first creating the master row for its category if the
/// category is unknown. Both writes happen in one transaction.
pub fn insert_expense_with_category(
    conn: &Connection,
    expense: &NewExpense,
    new_category_type: Option<&str>,
) -> Result<(ExpenseRecord, Option<CategoryMaster>)> {
    let tx = conn.unchecked_transaction()?;
    let created = match find_master(&tx, &expense.category)? {
        Some(_) => None,
        None => {
            let expense_type = new_category_type.map(str::trim).unwrap_or("");
            let category = NewCategory {
                category: expense.category.trim().to_string(),
                expense_type: expense_type.to_string(),
            };
            category.validate()?;
            Some(insert_master(&tx, &category)?)
        }
    };
    let record = insert_expense(&tx, expense)?;
    tx.commit()?;
    if let Some(c) = &created {
        tracing::info!(category = %c.category, expense_type = %c.expense_type, "added category with expense");
    }
    Ok((record, created))
}

/// Apply an expense patch. When the patch moves the expense into an unknown
/// category, the master row is created in the same transaction from
/// `new_category_type` and the expense takes that type. A known category
/// supplies its type when the patch has none.
pub fn update_expense_with_category(
    conn: &Connection,
    id: i64,
    patch: &ExpensePatch,
    new_category_type: Option<&str>,
) -> Result<(ExpenseRecord, Option<CategoryMaster>)> {
    let Some(category) = patch.category.as_deref() else {
        return Ok((update_expense(conn, id, patch)?, None));
    };
    let tx = conn.unchecked_transaction()?;
    let mut patch = patch.clone();
    patch.category = Some(category.trim().to_string());
    let created = match find_master(&tx, category)? {
        Some(master) => {
            if patch.expense_type.is_none() {
                patch.expense_type = Some(master.expense_type);
            }
            None
        }
        None => {
            let new_category = NewCategory {
                category: category.trim().to_string(),
                expense_type: new_category_type.map(str::trim).unwrap_or("").to_string(),
            };
            new_category.validate()?;
            let master = insert_master(&tx, &new_category)?;
            patch.expense_type = Some(master.expense_type.clone());
            Some(master)
        }
    };
    let record = update_expense(&tx, id, &patch)?;
    tx.commit()?;
    if let Some(c) = &created {
        tracing::info!(category = %c.category, expense_type = %c.expense_type, "added category on edit");
    }
    Ok((record, created))
}

fn update_expense(conn: &Connection, id: i64, patch: &ExpensePatch) -> Result<ExpenseRecord> {
    let mut sets: Vec<(&str, &dyn ToSql)> = Vec::new();
    if let Some(v) = &patch.description {
        sets.push(("description", v as &dyn ToSql));
    }
    if let Some(v) = &patch.amount {
        sets.push(("amount", v as &dyn ToSql));
    }
    if let Some(v) = &patch.category {
        sets.push(("category", v as &dyn ToSql));
    }
    if let Some(v) = &patch.expense_type {
        sets.push(("expense_type", v as &dyn ToSql));
    }
    if let Some(v) = &patch.date {
        sets.push(("date", v as &dyn ToSql));
    }
    update_columns(conn, id, &sets)
}

/// Expenses in `categories` dated within `[from, to]`, newest first.
pub fn expenses_in_categories(
    conn: &Connection,
    categories: &[String],
    from: &str,
    to: &str,
) -> Result<Vec<ExpenseRecord>> {
    if categories.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders: Vec<String> = (0..categories.len()).map(|i| format!("?{}", i + 3)).collect();
    let sql = format!(
        "SELECT {} FROM expenses WHERE date >= ?1 AND date <= ?2 AND category IN ({}) \
         ORDER BY date DESC, id DESC",
        ExpenseRecord::COLUMNS,
        placeholders.join(", ")
    );
    let mut params: Vec<&dyn ToSql> = Vec::with_capacity(categories.len() + 2);
    params.push(&from);
    params.push(&to);
    params.extend(categories.iter().map(|c| c as &dyn ToSql));
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params.as_slice(), ExpenseRecord::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Salary
// ---------------------------------------------------------------------------

pub fn insert_salary(conn: &Connection, salary: &NewSalary) -> Result<SalaryDetail> {
    conn.execute(
        "INSERT INTO salary_details (date, gross_salary, epf, mf, vpf, etf) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            salary.date,
            salary.gross_salary,
            salary.epf,
            salary.mf,
            salary.vpf,
            salary.etf
        ],
    )?;
    get(conn, conn.last_insert_rowid())
}

pub fn update_salary(conn: &Connection, id: i64, patch: &SalaryPatch) -> Result<SalaryDetail> {
    let mut sets: Vec<(&str, &dyn ToSql)> = Vec::new();
    if let Some(v) = &patch.date {
        sets.push(("date", v as &dyn ToSql));
    }
    if let Some(v) = &patch.gross_salary {
        sets.push(("gross_salary", v as &dyn ToSql));
    }
    if let Some(v) = &patch.epf {
        sets.push(("epf", v as &dyn ToSql));
    }
    if let Some(v) = &patch.mf {
        sets.push(("mf", v as &dyn ToSql));
    }
    if let Some(v) = &patch.vpf {
        sets.push(("vpf", v as &dyn ToSql));
    }
    if let Some(v) = &patch.etf {
        sets.push(("etf", v as &dyn ToSql));
    }
    update_columns(conn, id, &sets)
}

// ---------------------------------------------------------------------------
// Category master
// ---------------------------------------------------------------------------

/// List the category master, seeding the defaults the first time it is empty.
pub fn list_masters(conn: &Connection) -> Result<Vec<CategoryMaster>> {
    seed_default_categories(conn)?;
    list_all(conn)
}

/// Case-insensitive lookup by category name.
pub fn find_master(conn: &Connection, category: &str) -> Result<Option<CategoryMaster>> {
    let sql = format!(
        "SELECT {} FROM master WHERE lower(category) = lower(?1) ORDER BY id LIMIT 1",
        CategoryMaster::COLUMNS
    );
    match conn.query_row(&sql, [category.trim()], CategoryMaster::from_row) {
        Ok(m) => Ok(Some(m)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn insert_master(conn: &Connection, category: &NewCategory) -> Result<CategoryMaster> {
    conn.execute(
        "INSERT INTO master (category, expense_type) VALUES (?1, ?2)",
        rusqlite::params![category.category.trim(), category.expense_type.trim().to_lowercase()],
    )?;
    get(conn, conn.last_insert_rowid())
}

// ---------------------------------------------------------------------------
// Milk
// ---------------------------------------------------------------------------

pub fn insert_milk(conn: &Connection, row: &NewMilkDetail) -> Result<MilkDetail> {
    conn.execute(
        "INSERT INTO milk_details (sr_no, kg) VALUES (?1, ?2)",
        rusqlite::params![row.sr_no, row.kg],
    )?;
    get(conn, conn.last_insert_rowid())
}

/// Set the quantity of the row with serial number `sr_no`.
pub fn update_milk_kg(conn: &Connection, sr_no: i64, kg: f64) -> Result<MilkDetail> {
    let updated = conn.execute(
        "UPDATE milk_details SET kg = ?1 WHERE sr_no = ?2",
        rusqlite::params![kg, sr_no],
    )?;
    if updated == 0 {
        return Err(SpendbookError::NotFound { kind: MilkDetail::KIND, id: sr_no });
    }
    let sql = format!(
        "SELECT {} FROM milk_details WHERE sr_no = ?1",
        MilkDetail::COLUMNS
    );
    Ok(conn.query_row(&sql, [sr_no], MilkDetail::from_row)?)
}
