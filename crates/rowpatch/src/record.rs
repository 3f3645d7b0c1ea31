//! Record model and target-table description.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::Error;

/// One `(key, value)` pair destined for the target table.
///
/// The key is the table's primary key. Keys must be unique within any single
/// batch passed to an insert or update call; a duplicate inside one batch
/// surfaces as a constraint violation from the storage engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub key: i64,
    pub value: String,
}

impl Record {
    pub fn new(key: i64, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

/// Process-wide sequence used to give every staging table a distinct name.
static STAGE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Default name of the target table.
pub const DEFAULT_TABLE: &str = "records";

/// The target table this service operates on.
///
/// The schema shape is fixed (`id BIGINT PRIMARY KEY, data TEXT NOT NULL`);
/// only the table name is configurable. Table creation is the caller's
/// responsibility.
#[derive(Clone, Debug)]
pub struct TableSpec {
    name: String,
}

impl Default for TableSpec {
    fn default() -> Self {
        Self {
            name: DEFAULT_TABLE.to_string(),
        }
    }
}

impl TableSpec {
    /// Builds a spec for a caller-chosen table name.
    ///
    /// The name is interpolated into SQL text, so it is restricted to plain
    /// unquoted identifiers rather than passed through verbatim.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if !is_plain_identifier(&name) {
            return Err(Error::InvalidTableName(name));
        }
        Ok(Self { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a staging-table name unique to one strategy invocation.
    ///
    /// Staging tables are created `TEMPORARY` (session-local namespace), and
    /// the process-wide sequence suffix keeps two invocations on the same
    /// session from colliding.
    pub(crate) fn next_stage_name(&self) -> String {
        let seq = STAGE_SEQ.fetch_add(1, Ordering::Relaxed);
        format!("{}_stage_{seq}", self.name)
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
