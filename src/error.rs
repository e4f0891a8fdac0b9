//! Error handling for the sector selection service
//!
//! A small closed taxonomy using thiserror: every failure mode the service
//! can report maps to exactly one variant, and all of them are terminal from
//! the caller's perspective (the request must change, retrying identically
//! cannot succeed).

use std::collections::BTreeMap;

use thiserror::Error;

/// Main error type for the sector selection service
#[derive(Error, Debug)]
pub enum SelectError {
    /// A selection-existence precondition failed: create on an occupied
    /// session, or update on a vacant one.
    #[error("conflict: {0}")]
    Conflict(String),

    /// One or more referenced sector ids do not exist in the catalog.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The request body is structurally invalid (blank name, empty sector
    /// set, terms not accepted). Keyed by field name.
    #[error("validation failed: {errors:?}")]
    Validation { errors: BTreeMap<String, String> },

    /// Stored data violates an invariant the service relies on: a catalog
    /// that is not a well-formed forest, or a selection row missing
    /// mid-operation. Never expected in normal operation.
    #[error("integrity error: {0}")]
    Integrity(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type alias for convenience
pub type SelectResult<T> = Result<T, SelectError>;
