//! Error taxonomy for the update service.

use tokio_postgres::error::SqlState;

use crate::StrategyKind;

/// Failures surfaced by the service and its strategies.
///
/// Nothing is swallowed or retried internally: storage errors propagate with
/// the server's own diagnostics attached, and a failed call leaves the target
/// table in whatever state the chosen strategy's transaction boundaries imply.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Any failure reported by the storage engine or its connection,
    /// including constraint violations and mid-call connectivity loss.
    #[error("storage error: {0}")]
    Storage(#[from] tokio_postgres::Error),

    /// Strategy lookup missed. Unreachable with a well-formed registry, but
    /// handled explicitly rather than panicking.
    #[error("no strategy registered for kind {0}")]
    UnknownStrategy(StrategyKind),

    /// A strategy identifier string did not match any known kind.
    #[error("unknown strategy identifier {0:?}")]
    UnknownStrategyName(String),

    /// Table names are interpolated into SQL text and must be plain
    /// identifiers.
    #[error("invalid table name {0:?}")]
    InvalidTableName(String),

    /// Malformed environment configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// True when the underlying failure is a schema-constraint violation
    /// (duplicate key, null value, or a check constraint).
    pub fn is_constraint_violation(&self) -> bool {
        let Error::Storage(err) = self else {
            return false;
        };
        match err.code() {
            Some(code) => {
                *code == SqlState::UNIQUE_VIOLATION
                    || *code == SqlState::NOT_NULL_VIOLATION
                    || *code == SqlState::CHECK_VIOLATION
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_errors_name_the_kind() {
        let err = Error::UnknownStrategy(StrategyKind::TempTableJoin);
        assert!(err.to_string().contains("TEMP_TABLE_JOIN"));
        assert!(!err.is_constraint_violation());
    }
}
