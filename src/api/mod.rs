//! REST API client module for the issuedeck service.
//!
//! This module provides the `ApiClient` for communicating with the remote
//! issue tracker: authentication, issue CRUD, analytics, and user lookup.
//!
//! Every call passes through one chokepoint that attaches the session's
//! bearer token before dispatch and watches responses for authorization
//! failures afterwards.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
