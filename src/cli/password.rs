use crate::auth::StoredCredential;
use crate::cli::{open_ledger, read_secret, NEW_PASSWORD_ENV, PASSWORD_ENV};
use crate::error::Result;

pub fn change() -> Result<()> {
    let mut ledger = open_ledger()?;
    let current = read_secret(PASSWORD_ENV, "Current password: ")?;
    let new = read_secret(NEW_PASSWORD_ENV, "New password: ")?;
    let confirm = if std::env::var(NEW_PASSWORD_ENV).is_ok() {
        new.clone()
    } else {
        read_secret(NEW_PASSWORD_ENV, "Confirm new password: ")?
    };
    StoredCredential::new(ledger.conn()).change(&current, &new, &confirm)?;
    // back to Locked once the password changes
    ledger.logout();
    println!("Password changed.");
    Ok(())
}
