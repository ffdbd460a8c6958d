//! Optional "remember me" storage of the login password in the OS
//! keychain.
//!
//! This is separate from the session credential: the keychain keeps the
//! password for the next login, while `SessionStore` keeps the bearer
//! token and profile for the current session.

use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "issuedeck";

pub struct SavedLogin;

impl SavedLogin {
    /// Remember the password for a username in the OS keychain
    pub fn remember(username: &str, password: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, username)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(password)
            .context("Failed to store password in keychain")?;
        Ok(())
    }

    /// Retrieve the remembered password for a username
    pub fn password(username: &str) -> Result<String> {
        let entry = Entry::new(SERVICE_NAME, username)
            .context("Failed to create keyring entry")?;
        entry
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    /// Forget the remembered password for a username
    pub fn forget(username: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, username)
            .context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to delete password from keychain")?;
        Ok(())
    }

    /// Whether a password is remembered for a username
    pub fn exists(username: &str) -> bool {
        Entry::new(SERVICE_NAME, username)
            .map(|entry| entry.get_password().is_ok())
            .unwrap_or(false)
    }
}
