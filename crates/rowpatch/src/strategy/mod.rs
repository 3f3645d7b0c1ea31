//! Update strategies: interchangeable algorithms for applying one batch of
//! `(key, value)` mutations, trading transaction granularity against client
//! round trips.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use tokio_postgres::Client;

use crate::{Error, Record, TableSpec};

mod batch_statement;
mod one_transaction;
mod separate_transaction;
mod temp_table;

pub use batch_statement::BatchStatement;
pub use one_transaction::OneTransaction;
pub use separate_transaction::SeparateTransaction;
pub use temp_table::TempTableJoin;

/// Closed enumeration of the available strategies.
///
/// The `as_str` forms are wire-stable identifiers accepted by CLI/config
/// surfaces and must not change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// N UPDATE statements inside one transaction. Atomic.
    OneTransaction,
    /// One transaction per record; prior commits survive a mid-batch failure.
    SeparateTransaction,
    /// N UPDATE statements pipelined on one connection inside one
    /// transaction. Atomic.
    BatchStatement,
    /// Staged bulk load plus a single join-update inside one transaction.
    /// Atomic.
    TempTableJoin,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::OneTransaction,
        StrategyKind::SeparateTransaction,
        StrategyKind::BatchStatement,
        StrategyKind::TempTableJoin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::OneTransaction => "ONE_TRANSACTION",
            StrategyKind::SeparateTransaction => "SEPARATE_TRANSACTION",
            StrategyKind::BatchStatement => "BATCH_STATEMENT",
            StrategyKind::TempTableJoin => "TEMP_TABLE_JOIN",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == raw)
            .ok_or_else(|| Error::UnknownStrategyName(raw.to_string()))
    }
}

/// One concrete algorithm for applying a batch of updates.
///
/// Implementations are stateless beyond their table spec: every call opens
/// its own transaction scope(s) on the provided client and releases them
/// before returning.
#[async_trait]
pub trait UpdateStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Applies `records` to the target table with this strategy's
    /// transaction-boundary semantics (see the [`StrategyKind`] variants for
    /// what survives a mid-batch failure).
    async fn update(&self, client: &mut Client, records: &[Record]) -> Result<(), Error>;
}

/// Parameterized single-row update shared by the per-statement strategies.
pub(crate) fn single_update_sql(table: &TableSpec) -> String {
    format!("UPDATE {} SET data = $1 WHERE id = $2", table.name())
}
