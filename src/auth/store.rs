//! Durable persistence of the session credential.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::UserProfile;

/// Session document name inside the data directory
const SESSION_FILE: &str = "session.json";

/// A bearer token plus the profile it was issued for.
///
/// The token is opaque to the client: it is forwarded on requests and
/// never parsed. Token and profile travel together - the store writes and
/// clears them as a pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    pub user: UserProfile,
}

/// File-backed store for the current session's credential.
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Store under the platform data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(crate::config::Config::data_dir()?))
    }

    /// Persist the credential pair.
    ///
    /// The document is written to a temp file and renamed into place, so a
    /// concurrent `load` observes the old pair or the new one, never half
    /// of each.
    pub fn save(&self, credential: &Credential) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("Failed to create session directory")?;
        let contents = serde_json::to_string_pretty(credential)?;
        let path = self.session_path();
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).context("Failed to write session file")?;
        std::fs::rename(&tmp, &path).context("Failed to persist session file")?;
        Ok(())
    }

    /// Load the stored credential, if any.
    ///
    /// Fails soft: a missing, unreadable, or malformed document means "no
    /// session" and never raises past this boundary. A malformed document
    /// is also removed, so a stale token is not left on disk.
    pub fn load(&self) -> Option<Credential> {
        let path = self.session_path();
        if !path.exists() {
            return None;
        }

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(error = %e, "Failed to read session file");
                return None;
            }
        };

        match serde_json::from_str::<Credential>(&contents) {
            Ok(credential) if !credential.token.is_empty() => Some(credential),
            Ok(_) => {
                warn!("Stored session has an empty token, clearing");
                self.clear_quiet();
                None
            }
            Err(e) => {
                warn!(error = %e, "Stored session is malformed, clearing");
                self.clear_quiet();
                None
            }
        }
    }

    /// Remove the credential pair. Clearing an empty store is a no-op.
    pub fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    fn clear_quiet(&self) {
        if let Err(e) = self.clear() {
            warn!(error = %e, "Failed to clear session store");
        }
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }
}
