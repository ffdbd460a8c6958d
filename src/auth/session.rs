//! In-memory session state derived from the credential store.
//!
//! The store is consulted exactly once, at initialization; afterwards the
//! in-memory state is the single source of truth and every durable write
//! goes through the same `login`/`logout` path, so memory and disk cannot
//! diverge.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Result;
use tracing::{debug, info, warn};

use super::store::{Credential, SessionStore};

/// Whether a user is currently authenticated.
///
/// `Loading` is observed only before `SessionHandle::initialize` has
/// consulted the store. Callers must treat it as "not yet known" rather
/// than anonymous, so the first rendered view is not a premature redirect.
#[derive(Debug, Clone)]
pub enum SessionState {
    Loading,
    Authenticated(Credential),
    Anonymous,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn credential(&self) -> Option<&Credential> {
        match self {
            SessionState::Authenticated(credential) => Some(credential),
            _ => None,
        }
    }
}

struct SessionInner {
    store: SessionStore,
    state: SessionState,
    initialized: bool,
}

/// Shared handle to the session, injected wherever session knowledge is
/// needed. Clones observe and mutate the same state.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<RwLock<SessionInner>>,
}

impl SessionHandle {
    /// New handle in the `Loading` phase. Call `initialize` before
    /// trusting `state`.
    pub fn new(store: SessionStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionInner {
                store,
                state: SessionState::Loading,
                initialized: false,
            })),
        }
    }

    /// Consult the store and resolve the initial state. Runs once; later
    /// calls return the current state unchanged.
    pub fn initialize(&self) -> SessionState {
        let mut inner = self.write();
        if inner.initialized {
            return inner.state.clone();
        }
        inner.initialized = true;
        inner.state = match inner.store.load() {
            Some(credential) => {
                debug!(username = %credential.user.username, "Restored session from store");
                SessionState::Authenticated(credential)
            }
            None => SessionState::Anonymous,
        };
        inner.state.clone()
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        self.read().state.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().state.is_authenticated()
    }

    /// Bearer token snapshot, if authenticated.
    pub fn token(&self) -> Option<String> {
        self.read().state.credential().map(|c| c.token.clone())
    }

    pub fn credential(&self) -> Option<Credential> {
        self.read().state.credential().cloned()
    }

    /// Persist the credential and move to `Authenticated`. Logging in
    /// while already authenticated overwrites the previous credential.
    pub fn login(&self, credential: Credential) -> Result<()> {
        let mut inner = self.write();
        inner.store.save(&credential)?;
        info!(username = %credential.user.username, "Logged in");
        inner.initialized = true;
        inner.state = SessionState::Authenticated(credential);
        Ok(())
    }

    /// Clear the stored credential and move to `Anonymous`.
    pub fn logout(&self) -> Result<()> {
        let mut inner = self.write();
        inner.store.clear()?;
        info!("Logged out");
        inner.initialized = true;
        inner.state = SessionState::Anonymous;
        Ok(())
    }

    /// The server rejected the credential: drop the session
    /// unconditionally. Only the request gateway calls this; a store
    /// failure here is logged and swallowed so the state transition always
    /// completes.
    pub(crate) fn force_logout(&self) {
        let mut inner = self.write();
        if let Err(e) = inner.store.clear() {
            warn!(error = %e, "Failed to clear session store on forced logout");
        }
        inner.initialized = true;
        inner.state = SessionState::Anonymous;
        info!("Session invalidated by server");
    }

    // State is a plain value, so a panicked writer cannot leave it torn;
    // recover the guard rather than propagating the poison.
    fn read(&self) -> RwLockReadGuard<'_, SessionInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
