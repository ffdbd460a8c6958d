//! Wire models for the issuedeck API.
//!
//! This module contains the data structures exchanged with the remote
//! service:
//!
//! - `Issue`, `IssueDraft`: issue CRUD payloads with status/priority enums
//! - `UserProfile`, `UserSummary`, `UserEntry`: user shapes at their three
//!   levels of detail
//! - `AnalyticsSummary`: aggregate issue statistics

pub mod analytics;
pub mod issue;
pub mod user;

pub use analytics::AnalyticsSummary;
pub use issue::{Issue, IssueDraft, IssuePriority, IssueStatus};
pub use user::{UserEntry, UserProfile, UserSummary};
