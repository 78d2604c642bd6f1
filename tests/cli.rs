use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PASSWORD: &str = "hunter22";

fn spendbook(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("spendbook").unwrap();
    cmd.env("HOME", home.path())
        .env("NO_COLOR", "1")
        .env("SPENDBOOK_PASSWORD", PASSWORD)
        .env_remove("SPENDBOOK_NEW_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn init() -> TempDir {
    let home = tempfile::tempdir().unwrap();
    let data_dir = home.path().join("data");
    spendbook(&home)
        .args(["init", "--data-dir", data_dir.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Edit password set"));
    home
}

fn add_expense(home: &TempDir, description: &str, amount: &str, category: &str, date: &str) {
    spendbook(home)
        .args(["expenses", "add", description, amount, "--category", category, "--date", date])
        .assert()
        .success();
}

#[test]
fn test_commands_need_a_database() {
    let home = tempfile::tempdir().unwrap();
    spendbook(&home)
        .args(["expenses", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Database not found"));
}

#[test]
fn test_init_seeds_categories_and_password() {
    let home = init();
    spendbook(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Password:   set"))
        .stdout(predicate::str::contains("Categories:    7"));
    spendbook(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already set"));
}

#[test]
fn test_add_and_list_expense() {
    let home = init();
    spendbook(&home)
        .args(["expenses", "add", "Coffee", "120", "--category", "Food", "--date", "2024-03-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added expense 1: Coffee \u{20b9}120.00"));
    spendbook(&home)
        .args(["expenses", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Coffee"))
        .stdout(predicate::str::contains("2024-03-05"));
}

#[test]
fn test_list_filters_to_json() {
    let home = init();
    add_expense(&home, "Coffee", "120", "Food", "2024-03-05");
    add_expense(&home, "Bus", "40", "Transport", "2024-03-06");
    add_expense(&home, "Lunch", "200", "Food", "2024-04-01");

    let output = spendbook(&home)
        .args(["expenses", "list", "--category", "Food", "--from", "2024-03-01", "--to", "2024-03-31", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["description"], "Coffee");
}

#[test]
fn test_wrong_password_is_read_only() {
    let home = init();
    spendbook(&home)
        .env("SPENDBOOK_PASSWORD", "wrong-pass")
        .args(["expenses", "add", "Coffee", "120", "--category", "Food"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid password"));
    spendbook(&home)
        .env("SPENDBOOK_PASSWORD", "wrong-pass")
        .args(["expenses", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Coffee").not());
}

#[test]
fn test_validation_errors_are_reported() {
    let home = init();
    spendbook(&home)
        .args(["expenses", "add", "Coffee", "0", "--category", "Food"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Amount must be greater than 0"));
    spendbook(&home)
        .args(["expenses", "add", "Coffee", "10", "--category", "Food", "--date", "05/03/2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("YYYY-MM-DD"));
}

#[test]
fn test_new_category_needs_a_type() {
    let home = init();
    spendbook(&home)
        .args(["expenses", "add", "Vet", "500", "--category", "Pets", "--date", "2024-03-05"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please select an expense type"));
    spendbook(&home)
        .args(["expenses", "add", "Vet", "500", "--category", "Pets", "--type", "expense", "--date", "2024-03-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added category: Pets"));
    spendbook(&home)
        .args(["categories", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pets"));
}

#[test]
fn test_edit_and_delete_expense() {
    let home = init();
    add_expense(&home, "Coffee", "120", "Food", "2024-03-05");
    spendbook(&home)
        .args(["expenses", "edit", "1", "--amount", "99.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{20b9}99.50"));
    spendbook(&home).args(["expenses", "delete", "1"]).assert().success();
    spendbook(&home)
        .args(["expenses", "delete", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expense not found: id 1"));
}

#[test]
fn test_edit_into_new_category_needs_a_type() {
    let home = init();
    add_expense(&home, "Vet", "500", "Food", "2024-03-05");
    spendbook(&home)
        .args(["expenses", "edit", "1", "--category", "Pets"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please select an expense type"));
    spendbook(&home)
        .args(["expenses", "edit", "1", "--category", "Pets", "--type", "expense"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added category: Pets (expense)"));
    spendbook(&home)
        .args(["categories", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pets"));
}

#[test]
fn test_known_category_keeps_its_type() {
    let home = init();
    spendbook(&home)
        .args(["expenses", "add", "Coffee", "120", "--category", "Food", "--type", "income"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Category Food has type expense"));
    spendbook(&home)
        .args(["expenses", "add", "Coffee", "120", "--category", "food", "--type", "Expense"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added category").not());
}

#[test]
fn test_monthly_analysis() {
    let home = init();
    add_expense(&home, "Coffee", "120", "Food", "2024-03-05");
    add_expense(&home, "Rent", "1000", "Bills", "2024-03-01");
    spendbook(&home)
        .args(["analysis", "monthly", "--year", "2024"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mar"))
        .stdout(predicate::str::contains("\u{20b9}1,120.00"));
    spendbook(&home)
        .args(["analysis", "types", "--month", "2024-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Expense"));
}

#[test]
fn test_salary_summary_json() {
    let home = init();
    spendbook(&home)
        .args(["salary", "add", "--date", "2024-01-31", "--gross", "1000", "--epf", "100", "--mf", "50"])
        .assert()
        .success();
    add_expense(&home, "Groceries", "400", "Food", "2024-01-15");

    let output = spendbook(&home)
        .args(["salary", "summary", "--year", "2024", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let jan = &value["months"][0];
    assert_eq!(jan["gross_salary"], 1000.0);
    assert_eq!(jan["direct_saving"], 150.0);
    assert_eq!(jan["balance"], 450.0);
    assert_eq!(jan["saving_percent"], 60.0);
    assert_eq!(value["months"].as_array().unwrap().len(), 12);
}

#[test]
fn test_export_then_import_restores_rows() {
    let home = init();
    add_expense(&home, "Coffee", "120", "Food", "2024-03-05");
    let csv_path = home.path().join("expenses.csv");
    spendbook(&home)
        .args(["export", "expenses", "--output", csv_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 rows"));
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("id,description,amount,category,expense_type,date"));

    spendbook(&home).args(["expenses", "delete", "1"]).assert().success();
    spendbook(&home)
        .args(["import", "expenses", csv_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 rows into expenses"));
    spendbook(&home)
        .args(["expenses", "list", "--description", "Coffee"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-05"));
}

#[test]
fn test_milk_totals_use_rate() {
    let home = init();
    spendbook(&home).args(["milk", "add", "1", "1.5"]).assert().success();
    spendbook(&home).args(["milk", "add", "2", "1"]).assert().success();
    spendbook(&home).args(["milk", "set", "2", "0.5"]).assert().success();
    spendbook(&home)
        .args(["milk", "list", "--rate", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("amount due \u{20b9}100.00"));
    spendbook(&home)
        .args(["milk", "add", "2", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Serial number 2 already exists"));
}

#[test]
fn test_recurring_apply_saves_rows_with_amounts() {
    let home = init();
    spendbook(&home)
        .args(["recurring", "apply", "--date", "2024-03-01", "--amount", "Wifi=700"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 1 recurring expenses"));
    spendbook(&home)
        .args(["expenses", "list", "--category", "Wifi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\u{20b9}700.00"));
}

#[test]
fn test_password_change() {
    let home = init();
    spendbook(&home)
        .env("SPENDBOOK_NEW_PASSWORD", "new-secret")
        .args(["password", "change"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Password changed"));
    spendbook(&home)
        .args(["milk", "add", "1", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid password"));
    spendbook(&home)
        .env("SPENDBOOK_PASSWORD", "new-secret")
        .args(["milk", "add", "1", "1"])
        .assert()
        .success();
}

#[test]
fn test_backup_writes_copy() {
    let home = init();
    let dest = home.path().join("copy.db");
    spendbook(&home)
        .args(["backup", "--output", dest.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup saved to"));
    assert!(dest.exists());
}

#[test]
fn test_completions() {
    let home = tempfile::tempdir().unwrap();
    spendbook(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("spendbook"));
}
