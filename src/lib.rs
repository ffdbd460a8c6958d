//! Core client library for the issuedeck issue tracker.
//!
//! issuedeck talks to a remote issue-tracking REST API. This crate owns
//! everything below the UI: the authenticated API client, session and
//! credential management, route guarding, configuration, and the wire
//! models. Frontends render views and call into this layer.
//!
//! The session credential is persisted across restarts, attached to every
//! outbound request as a bearer token, and dropped the moment the server
//! rejects it - from any endpoint, through a single chokepoint.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod routes;

pub use api::{ApiClient, ApiError};
pub use auth::{Credential, SavedLogin, SessionHandle, SessionState, SessionStore};
pub use config::Config;
pub use routes::{decide, RouteDecision, View};
