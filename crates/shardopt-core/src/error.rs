use thiserror::Error;

use crate::ast::StatementKind;
use crate::rule::RuleError;

/// Canonical result for shardopt.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported statement kind: {0}")]
    UnsupportedStatementKind(StatementKind),

    #[error("optimizer routine already registered for {0}")]
    DuplicateRoutine(StatementKind),

    // Rule engine failures pass through untouched.
    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error("optimization cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Hashing error: {0}")]
    Hash(String),

    #[error("Internal invariant failed: {0}")]
    Invariant(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Hash(e.to_string())
    }
}
