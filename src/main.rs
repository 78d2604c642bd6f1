mod aggregate;
mod auth;
mod cli;
mod collection;
mod db;
mod error;
mod fmt;
mod ledger;
mod models;
mod recurring;
mod settings;
mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{
    AnalysisCommands, CategoriesCommands, Cli, Commands, ExpensesCommands, MilkCommands,
    PasswordCommands, RecurringCommands, SalaryCommands,
};
use models::{ExpensePatch, NewSalary, SalaryPatch};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Status => cli::status::run(),
        Commands::Expenses { command } => match command {
            ExpensesCommands::Add {
                description,
                amount,
                category,
                expense_type,
                date,
            } => cli::expenses::add(&description, amount, &category, expense_type.as_deref(), date.as_deref()),
            ExpensesCommands::List {
                from_date,
                to_date,
                category,
                descriptions,
                expense_type,
                json,
            } => {
                let filter = aggregate::ExpenseFilter {
                    from_date,
                    to_date,
                    category,
                    descriptions: descriptions.into_iter().collect(),
                    expense_type,
                };
                cli::expenses::list(filter, json)
            }
            ExpensesCommands::Edit {
                id,
                description,
                amount,
                category,
                expense_type,
                date,
            } => cli::expenses::edit(
                id,
                ExpensePatch {
                    description,
                    amount,
                    category,
                    expense_type,
                    date,
                },
            ),
            ExpensesCommands::Delete { id } => cli::expenses::delete(id),
            ExpensesCommands::Categories => cli::expenses::categories(),
            ExpensesCommands::Descriptions => cli::expenses::descriptions(),
        },
        Commands::Salary { command } => match command {
            SalaryCommands::Add {
                date,
                gross,
                epf,
                mf,
                vpf,
                etf,
            } => cli::salary::add(NewSalary {
                date,
                gross_salary: gross,
                epf,
                mf,
                vpf,
                etf,
            }),
            SalaryCommands::Edit {
                id,
                date,
                gross,
                epf,
                mf,
                vpf,
                etf,
            } => cli::salary::edit(
                id,
                SalaryPatch {
                    date,
                    gross_salary: gross,
                    epf,
                    mf,
                    vpf,
                    etf,
                },
            ),
            SalaryCommands::List => cli::salary::list(),
            SalaryCommands::Summary { year, json } => cli::salary::summary(year, json),
        },
        Commands::Categories { command } => match command {
            CategoriesCommands::List => cli::categories::list(),
            CategoriesCommands::Add { name, expense_type } => cli::categories::add(&name, &expense_type),
            CategoriesCommands::Delete { id } => cli::categories::delete(id),
        },
        Commands::Analysis { command } => match command {
            AnalysisCommands::Yearly => cli::analysis::yearly(),
            AnalysisCommands::Monthly { year } => cli::analysis::monthly(year),
            AnalysisCommands::Types { year, month, show } => cli::analysis::types(year, month, show),
            AnalysisCommands::Savings { year } => cli::analysis::savings(year),
        },
        Commands::Dashboard { month } => cli::dashboard::run(month),
        Commands::Milk { command } => match command {
            MilkCommands::List { rate } => cli::milk::list(rate),
            MilkCommands::Set { sr_no, kg } => cli::milk::set(sr_no, kg),
            MilkCommands::Add { sr_no, kg } => cli::milk::add(sr_no, kg),
        },
        Commands::Recurring { command } => match command {
            RecurringCommands::Show => cli::recurring::show(),
            RecurringCommands::Apply { date, amounts } => cli::recurring::apply(date, &amounts),
        },
        Commands::Password { command } => match command {
            PasswordCommands::Change => cli::password::change(),
        },
        Commands::Export { kind, output } => cli::transfer::export(kind, output),
        Commands::Import { kind, file } => cli::transfer::import(kind, &file),
        Commands::Backup { output } => cli::backup::run(output),
        Commands::Completions { shell } => cli::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
