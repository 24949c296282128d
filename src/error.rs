//! Domain error taxonomy. None of these conditions is fatal: callers either
//! swallow them (validation), log them (persistence, import rows), or treat
//! them as "nothing to record" (empty sessions).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LotteryError {
    /// A participant name was blank or already registered.
    #[error("invalid participant name {0:?}")]
    Validation(String),

    /// The key-value store could not be read or written.
    #[error("storage failure: {0}")]
    Persistence(#[source] anyhow::Error),

    /// A CSV row did not contain a usable participant name.
    #[error("line {line}: {reason}")]
    ImportParse { line: usize, reason: String },

    /// A draw session must name at least one winner.
    #[error("a draw session needs at least one winner")]
    InvalidSession,
}
