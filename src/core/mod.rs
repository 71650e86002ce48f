//! Core operations - framework-agnostic access to users and transactions.
//!
//! Everything here takes a `DatabaseConnection` and returns the crate `Result`,
//! so the same functions back the HTTP handlers and the tests.

/// Per-user CSV export
pub mod export;
/// Totals by type over an effective-date window
pub mod stats;
/// Transaction recording and listing
pub mod transaction;
/// User creation, lookup and language preference
pub mod user;
