use std::path::PathBuf;

use crate::auth::StoredCredential;
use crate::cli::{read_secret, PASSWORD_ENV};
use crate::db::DB_FILE;
use crate::error::{Result, SpendbookError};
use crate::ledger::Ledger;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    std::fs::create_dir_all(resolved.join("exports"))?;

    let mut ledger = Ledger::open(&resolved.join(DB_FILE))?;
    ledger.load()?;

    let credential = StoredCredential::new(ledger.conn());
    if credential.is_set()? {
        println!("Edit password already set. Use `spendbook password change` to replace it.");
    } else {
        let secret = read_secret(PASSWORD_ENV, "Choose an edit password: ")?;
        if std::env::var(PASSWORD_ENV).is_err() {
            let confirm = read_secret(PASSWORD_ENV, "Confirm password: ")?;
            if *secret != *confirm {
                return Err(SpendbookError::invalid("confirm", "Passwords do not match"));
            }
        }
        credential.set(&secret)?;
        println!("Edit password set.");
    }

    println!("Initialized spendbook at {}", resolved.display());
    Ok(())
}
