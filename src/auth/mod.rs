//! Authentication module: session state, durable credential storage,
//! saved logins.
//!
//! This module provides:
//! - `SessionStore`: durable persistence of the token + profile pair
//! - `SessionHandle` / `SessionState`: process-wide session knowledge
//! - `SavedLogin`: optional OS-keychain password storage for "remember me"
//!
//! The session credential survives process restarts; whether it is still
//! honored is for the server to decide on the next request.

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::SavedLogin;
pub use session::{SessionHandle, SessionState};
pub use store::{Credential, SessionStore};
