use crate::auth::StoredCredential;
use crate::db::{get_connection, DB_FILE};
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join(DB_FILE);

    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:    {}", format_bytes(size));

        let conn = get_connection(&db_path)?;
        let password = if StoredCredential::new(&conn).is_set()? { "set" } else { "(not set)" };
        println!("Password:   {password}");

        let count = |table: &str| -> Result<i64> {
            Ok(conn.query_row(&format!("SELECT count(*) FROM {table}"), [], |r| r.get(0))?)
        };
        println!();
        println!("Expenses:      {}", count("expenses")?);
        println!("Salary rows:   {}", count("salary_details")?);
        println!("Categories:    {}", count("master")?);
        println!("Milk rows:     {}", count("milk_details")?);
    } else {
        println!();
        println!("Database not found. Run `spendbook init` to set up.");
    }

    Ok(())
}
