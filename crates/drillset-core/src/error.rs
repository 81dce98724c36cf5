//! Session integrity error types.
//!
//! These errors describe states the drill loop refuses to continue from.
//! They are typed so callers (and tests) can tell a broken record apart from
//! a plain I/O failure without string matching.

use thiserror::Error;

/// Errors raised when a session cannot be started or continued safely.
#[derive(Debug, Error)]
pub enum DrillError {
    /// The persisted record parsed, but its contents are inconsistent.
    #[error("invalid session record: {0}")]
    InvalidRecord(String),

    /// The question bank cannot fill a working set.
    #[error("question bank has {size} questions, at least {required} are needed")]
    BankTooSmall { size: usize, required: usize },

    /// The answer source was closed before the session finished.
    #[error("input closed before the session finished")]
    InputClosed,

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
