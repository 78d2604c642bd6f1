pub mod analysis;
pub mod backup;
pub mod categories;
pub mod completions;
pub mod dashboard;
pub mod expenses;
pub mod init;
pub mod milk;
pub mod password;
pub mod recurring;
pub mod salary;
pub mod status;
pub mod transfer;

use clap::{Parser, Subcommand, ValueEnum};
use zeroize::Zeroizing;

use crate::error::{Result, SpendbookError};
use crate::fmt::parse_month;
use crate::ledger::Ledger;
use crate::settings::db_path;

/// Environment variable checked before prompting for the edit password.
pub const PASSWORD_ENV: &str = "SPENDBOOK_PASSWORD";
/// Same, for the replacement password in `password change`.
pub const NEW_PASSWORD_ENV: &str = "SPENDBOOK_NEW_PASSWORD";

/// Open the configured database in view mode with every collection loaded.
pub(crate) fn open_ledger() -> Result<Ledger> {
    let path = db_path();
    if !path.exists() {
        return Err(SpendbookError::Settings(
            "Database not found. Run `spendbook init` to set up.".into(),
        ));
    }
    let mut ledger = Ledger::open(&path)?;
    ledger.load()?;
    ledger.enter_view();
    Ok(ledger)
}

/// Open the database and unlock edit mode, or fail with `InvalidPassword`.
pub(crate) fn open_for_edit() -> Result<Ledger> {
    let mut ledger = open_ledger()?;
    let secret = read_secret(PASSWORD_ENV, "Password: ")?;
    if !ledger.unlock(&secret) {
        return Err(SpendbookError::InvalidPassword);
    }
    Ok(ledger)
}

/// Read a secret from `env` if set, otherwise prompt without echo.
pub(crate) fn read_secret(env: &str, prompt: &str) -> Result<Zeroizing<String>> {
    if let Ok(secret) = std::env::var(env) {
        return Ok(Zeroizing::new(secret));
    }
    Ok(Zeroizing::new(rpassword::prompt_password(prompt)?))
}

/// Resolve `--month YYYY-MM` (or `YYYY-Mar`) / `--year YYYY`, falling back to the current year.
pub(crate) fn parse_period(month: Option<&str>, year: Option<i32>) -> Result<(i32, Option<u32>)> {
    if let Some(m) = month {
        let parsed = m.split_once('-').and_then(|(y, mm)| {
            let y: i32 = y.parse().ok()?;
            Some((y, parse_month(mm)?))
        });
        return match parsed {
            Some((y, mm)) => Ok((y, Some(mm))),
            None => Err(SpendbookError::invalid("month", format!("Expected YYYY-MM, got '{m}'"))),
        };
    }
    Ok((year.unwrap_or_else(current_year), None))
}

pub(crate) fn current_year() -> i32 {
    use chrono::Datelike;
    chrono::Local::now().year()
}

pub(crate) fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

#[derive(Parser)]
#[command(name = "spendbook", about = "Personal expense and salary tracker.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory, create the database and set the edit password.
    Init {
        /// Path for spendbook data (default: ~/Documents/spendbook)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Show the current database and row counts.
    Status,
    /// Record and browse expenses.
    Expenses {
        #[command(subcommand)]
        command: ExpensesCommands,
    },
    /// Record and summarise salary details.
    Salary {
        #[command(subcommand)]
        command: SalaryCommands,
    },
    /// Manage the category master list.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Totals by year, month and expense type.
    Analysis {
        #[command(subcommand)]
        command: AnalysisCommands,
    },
    /// One-month overview: income, spending and type breakdown.
    Dashboard {
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Milk delivery log.
    Milk {
        #[command(subcommand)]
        command: MilkCommands,
    },
    /// Enter this month's recurring expenses from last month's values.
    Recurring {
        #[command(subcommand)]
        command: RecurringCommands,
    },
    /// Manage the edit password.
    Password {
        #[command(subcommand)]
        command: PasswordCommands,
    },
    /// Export a table to CSV.
    Export {
        #[arg(value_enum)]
        kind: TableKind,
        /// Output path (default: <data_dir>/exports/<table>-YYYYMMDD-HHMMSS.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Import rows from a CSV file produced by `export`.
    Import {
        #[arg(value_enum)]
        kind: TableKind,
        /// Path to the CSV file
        file: String,
    },
    /// Back up the database.
    Backup {
        /// Output path (default: <data_dir>/backups/spendbook-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TableKind {
    Expenses,
    Salary,
    Categories,
    Milk,
}

#[derive(Subcommand)]
pub enum ExpensesCommands {
    /// Add an expense.
    Add {
        /// What the money was spent on
        description: String,
        /// Amount, greater than 0
        amount: f64,
        /// Category name; an unknown category is created with --type
        #[arg(long)]
        category: String,
        /// Type of a new category. A known category keeps its own type
        #[arg(long = "type")]
        expense_type: Option<String>,
        /// Date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List expenses. Without filters only the 20 most recent are shown.
    List {
        /// Start date: YYYY-MM-DD
        #[arg(long = "from")]
        from_date: Option<String>,
        /// End date: YYYY-MM-DD
        #[arg(long = "to")]
        to_date: Option<String>,
        /// Category, or "all"
        #[arg(long)]
        category: Option<String>,
        /// Description to match exactly; repeat for several
        #[arg(long = "description")]
        descriptions: Vec<String>,
        /// Expense type, or "all"
        #[arg(long = "type")]
        expense_type: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Update fields of an expense.
    Edit {
        /// Expense ID (shown in `spendbook expenses list`)
        id: i64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        /// New category; an unknown one is created with --type
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "type")]
        expense_type: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete an expense by ID.
    Delete {
        id: i64,
    },
    /// Distinct categories used by expenses.
    Categories,
    /// Distinct descriptions used by expenses.
    Descriptions,
}

#[derive(Subcommand)]
pub enum SalaryCommands {
    /// Add a salary detail.
    Add {
        /// Salary date: YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Gross salary, greater than 0
        #[arg(long)]
        gross: f64,
        #[arg(long, default_value = "0")]
        epf: f64,
        #[arg(long, default_value = "0")]
        mf: f64,
        #[arg(long, default_value = "0")]
        vpf: f64,
        #[arg(long, default_value = "0")]
        etf: f64,
    },
    /// Update fields of a salary detail.
    Edit {
        id: i64,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        gross: Option<f64>,
        #[arg(long)]
        epf: Option<f64>,
        #[arg(long)]
        mf: Option<f64>,
        #[arg(long)]
        vpf: Option<f64>,
        #[arg(long)]
        etf: Option<f64>,
    },
    /// List salary details.
    List,
    /// Month-by-month salary, saving and spending summary for a year.
    Summary {
        #[arg(long)]
        year: Option<i32>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// List the category master.
    List,
    /// Add a category.
    Add {
        name: String,
        /// Expense type for the category, e.g. expense, income, investment
        #[arg(long = "type")]
        expense_type: String,
    },
    /// Delete a category by ID. Existing expenses keep their category text.
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum AnalysisCommands {
    /// Total spending per year.
    Yearly,
    /// Total spending per month of a year.
    Monthly {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Spending per expense type.
    Types {
        #[arg(long)]
        year: Option<i32>,
        /// Limit to one month: YYYY-MM
        #[arg(long)]
        month: Option<String>,
        /// List the transactions of one type
        #[arg(long)]
        show: Option<String>,
    },
    /// Saving percentage per month.
    Savings {
        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Subcommand)]
pub enum MilkCommands {
    /// List deliveries with the total quantity and cost.
    List {
        /// Price per kg (default: from settings)
        #[arg(long)]
        rate: Option<f64>,
    },
    /// Set the quantity for a serial number.
    Set {
        sr_no: i64,
        kg: f64,
    },
    /// Add a delivery row.
    Add {
        sr_no: i64,
        kg: f64,
    },
}

#[derive(Subcommand)]
pub enum RecurringCommands {
    /// Show the prefilled recurring expenses for this month.
    Show,
    /// Save the recurring expenses whose amount is greater than 0.
    Apply {
        /// Date for every row: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Override an amount: CATEGORY=AMOUNT; repeat for several
        #[arg(long = "amount")]
        amounts: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum PasswordCommands {
    /// Change the edit password.
    Change,
}
