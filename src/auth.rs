use rand::Rng;
use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::error::{Result, SpendbookError};
use crate::models::AccessMode;

pub const MIN_PASSWORD_LEN: usize = 4;

/// Checks a secret against whatever credential backs edit mode.
pub trait CredentialVerifier {
    fn verify(&self, secret: &str) -> Result<bool>;
}

fn hash_secret(salt: &[u8], secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// Salted hash kept in the user_master table
// ---------------------------------------------------------------------------

pub struct StoredCredential<'a> {
    conn: &'a Connection,
}

impl<'a> StoredCredential<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn is_set(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row("SELECT count(*) FROM user_master", [], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Store a new password, replacing any existing one.
    pub fn set(&self, secret: &str) -> Result<()> {
        if secret.trim().chars().count() < MIN_PASSWORD_LEN {
            return Err(SpendbookError::invalid(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters long"),
            ));
        }
        let salt: [u8; 16] = rand::thread_rng().gen();
        let hash = hash_secret(&salt, secret);
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM user_master", [])?;
        tx.execute(
            "INSERT INTO user_master (id, password_salt, password_hash) VALUES (1, ?1, ?2)",
            rusqlite::params![hex::encode(salt), hash],
        )?;
        tx.commit()?;
        tracing::info!("password updated");
        Ok(())
    }

    pub fn change(&self, current: &str, new: &str, confirm: &str) -> Result<()> {
        validate_password_change(current, new, confirm)?;
        if !self.verify(current)? {
            return Err(SpendbookError::InvalidPassword);
        }
        self.set(new)
    }
}

impl CredentialVerifier for StoredCredential<'_> {
    fn verify(&self, secret: &str) -> Result<bool> {
        let row: std::result::Result<(String, String), _> = self.conn.query_row(
            "SELECT password_salt, password_hash FROM user_master ORDER BY id LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        );
        let (salt_hex, expected) = match row {
            Ok(r) => r,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(SpendbookError::Settings(
                    "No password has been set. Run `spendbook init` first.".into(),
                ))
            }
            Err(e) => return Err(e.into()),
        };
        let salt = hex::decode(&salt_hex)
            .map_err(|e| SpendbookError::Other(format!("Corrupt password salt: {e}")))?;
        Ok(hash_secret(&salt, secret) == expected)
    }
}

/// Checks run before the current password is even looked at.
pub fn validate_password_change(current: &str, new: &str, confirm: &str) -> Result<()> {
    if current.trim().is_empty() {
        return Err(SpendbookError::invalid("current", "Please enter your current password"));
    }
    if new.trim().is_empty() {
        return Err(SpendbookError::invalid("new", "Please enter a new password"));
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err(SpendbookError::invalid(
            "new",
            format!("New password must be at least {MIN_PASSWORD_LEN} characters long"),
        ));
    }
    if new != confirm {
        return Err(SpendbookError::invalid("confirm", "Passwords do not match"));
    }
    if current == new {
        return Err(SpendbookError::invalid(
            "new",
            "New password must be different from current password",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// View / edit gate
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AccessGate {
    mode: AccessMode,
}

impl AccessGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn enter_view(&mut self) {
        self.mode = AccessMode::Viewing;
    }

    /// Switch to edit mode if the verifier accepts `secret`. A verifier error
    /// counts as a wrong password and locks the gate.
    pub fn enter_edit(&mut self, verifier: &dyn CredentialVerifier, secret: &str) -> bool {
        match verifier.verify(secret) {
            Ok(true) => {
                self.mode = AccessMode::Editing;
                true
            }
            Ok(false) => false,
            Err(e) => {
                tracing::warn!(error = %e, "password verification failed");
                self.mode = AccessMode::Locked;
                false
            }
        }
    }

    pub fn logout(&mut self) {
        self.mode = AccessMode::Locked;
    }

    pub fn can_edit(&self) -> bool {
        self.mode() == AccessMode::Editing
    }

    pub fn require_edit(&self) -> Result<()> {
        if self.can_edit() {
            Ok(())
        } else {
            Err(SpendbookError::ReadOnly)
        }
    }
}
