use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const DB_FILE: &str = "spendbook.db";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS expenses (
    id INTEGER PRIMARY KEY,
    description TEXT NOT NULL,
    amount REAL NOT NULL,
    category TEXT NOT NULL,
    expense_type TEXT NOT NULL,
    date TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);

CREATE TABLE IF NOT EXISTS salary_details (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL,
    gross_salary REAL NOT NULL,
    epf REAL NOT NULL DEFAULT 0,
    mf REAL NOT NULL DEFAULT 0,
    vpf REAL NOT NULL DEFAULT 0,
    etf REAL NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS master (
    id INTEGER PRIMARY KEY,
    category TEXT NOT NULL,
    expense_type TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS milk_details (
    id INTEGER PRIMARY KEY,
    sr_no INTEGER NOT NULL,
    kg REAL NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_milk_details_sr_no ON milk_details(sr_no);

CREATE TABLE IF NOT EXISTS user_master (
    id INTEGER PRIMARY KEY,
    password_salt TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
";

// (category, expense_type)
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Food", "expense"),
    ("Transport", "expense"),
    ("Shopping", "expense"),
    ("Bills", "expense"),
    ("Entertainment", "expense"),
    ("Health", "expense"),
    ("Other", "expense"),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Insert the default category list if the master table is empty.
/// Returns the number of rows inserted.
pub fn seed_default_categories(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT count(*) FROM master", [], |row| row.get(0))?;
    if count > 0 {
        tracing::debug!("master table already has data, skipping seed");
        return Ok(0);
    }
    for (category, expense_type) in DEFAULT_CATEGORIES {
        conn.execute(
            "INSERT INTO master (category, expense_type) VALUES (?1, ?2)",
            rusqlite::params![category, expense_type],
        )?;
    }
    tracing::info!(count = DEFAULT_CATEGORIES.len(), "seeded default categories");
    Ok(DEFAULT_CATEGORIES.len())
}

#[cfg(test)]
pub(crate) fn test_db() -> (tempfile::TempDir, Connection) {
    let dir = tempfile::tempdir().unwrap();
    let conn = get_connection(&dir.path().join("test.db")).unwrap();
    init_db(&conn).unwrap();
    (dir, conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["expenses", "salary_details", "master", "milk_details", "user_master"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
    }

    #[test]
    fn test_init_db_does_not_seed_categories() {
        let (_dir, conn) = test_db();
        let count: i64 = conn.query_row("SELECT count(*) FROM master", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_seed_only_when_empty() {
        let (_dir, conn) = test_db();
        assert_eq!(seed_default_categories(&conn).unwrap(), DEFAULT_CATEGORIES.len());
        assert_eq!(seed_default_categories(&conn).unwrap(), 0);
        let count: i64 = conn.query_row("SELECT count(*) FROM master", [], |r| r.get(0)).unwrap();
        assert_eq!(count as usize, DEFAULT_CATEGORIES.len());
    }

    #[test]
    fn test_salary_components_default_to_zero() {
        let (_dir, conn) = test_db();
        conn.execute(
            "INSERT INTO salary_details (date, gross_salary) VALUES ('2024-01-31', 1000.0)",
            [],
        )
        .unwrap();
        let epf: f64 = conn.query_row("SELECT epf FROM salary_details", [], |r| r.get(0)).unwrap();
        assert_eq!(epf, 0.0);
    }
}
