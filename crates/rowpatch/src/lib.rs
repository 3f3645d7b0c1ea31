//! Bulk primary-key update strategies for PostgreSQL.
//!
//! A single target table `(id BIGINT PRIMARY KEY, data TEXT NOT NULL)` is
//! seeded through a multi-row bulk insert path and mutated in place through
//! one of four interchangeable update strategies that trade transaction
//! granularity against client/server round trips:
//!
//! - [`StrategyKind::OneTransaction`]: N UPDATE statements, one commit.
//! - [`StrategyKind::SeparateTransaction`]: N UPDATE statements, N commits.
//! - [`StrategyKind::BatchStatement`]: N UPDATEs pipelined on one
//!   connection inside one transaction.
//! - [`StrategyKind::TempTableJoin`]: staged bulk load plus a single
//!   join-update, all inside one transaction.
//!
//! [`UpdateService`] is the composition root: it owns the connection and one
//! eagerly constructed instance of every strategy, and dispatches
//! `update(kind, records)` calls to the matching one. All calls follow a
//! scoped-transaction discipline: each `insert`/`update` acquires exactly one
//! transaction scope, uses it for every statement in the call, and commits or
//! rolls back before returning.

mod config;
mod error;
mod insert;
mod record;
mod service;
pub mod strategy;

pub use config::StorageConfig;
pub use error::Error;
pub use record::{Record, TableSpec};
pub use service::UpdateService;
pub use strategy::{StrategyKind, UpdateStrategy};
