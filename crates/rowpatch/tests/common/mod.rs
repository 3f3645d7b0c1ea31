//! Shared helpers for integration tests.
//!
//! Tests need a reachable PostgreSQL database named by
//! `ROWPATCH_TEST_DATABASE_URL`. When the variable is unset the tests skip
//! themselves instead of failing, so the suite stays green on machines
//! without a database.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use rowpatch::{Record, TableSpec, UpdateService};
use tokio_postgres::{Client, NoTls};

pub const ENV_URL: &str = "ROWPATCH_TEST_DATABASE_URL";

/// One test's worth of state: a service on its own connection, a second
/// verification connection, and a per-test table so tests can run in
/// parallel against one database.
pub struct TestContext {
    pub service: UpdateService,
    pub verifier: Client,
    pub table: String,
}

impl TestContext {
    /// Connects and creates a fresh target table, or returns `None` when no
    /// test database is configured.
    ///
    /// The table carries a `CHECK (char_length(data) > 0)` constraint so
    /// tests can force a mid-batch failure with an empty-string value.
    pub async fn start(test_name: &str) -> Result<Option<Self>> {
        let Ok(url) = std::env::var(ENV_URL) else {
            eprintln!("skipping {test_name}: {ENV_URL} not set");
            return Ok(None);
        };
        let service_client = connect(&url).await?;
        let verifier = connect(&url).await?;

        let table = format!("rowpatch_{test_name}");
        verifier
            .batch_execute(&format!(
                "DROP TABLE IF EXISTS {table}; \
                 CREATE TABLE {table} (\
                     id BIGINT PRIMARY KEY, \
                     data TEXT NOT NULL CHECK (char_length(data) > 0)\
                 );"
            ))
            .await
            .context("create test table")?;

        let spec = TableSpec::new(table.clone()).context("test table name")?;
        Ok(Some(Self {
            service: UpdateService::with_table(service_client, spec),
            verifier,
            table,
        }))
    }

    /// Reads the whole target table into key order.
    pub async fn read_all(&self) -> Result<BTreeMap<i64, String>> {
        let rows = self
            .verifier
            .query(
                format!("SELECT id, data FROM {} ORDER BY id", self.table).as_str(),
                &[],
            )
            .await
            .context("read back target table")?;
        let mut out = BTreeMap::new();
        for row in rows {
            out.insert(row.try_get::<_, i64>(0)?, row.try_get::<_, String>(1)?);
        }
        Ok(out)
    }
}

async fn connect(url: &str) -> Result<Client> {
    let (client, connection) = tokio_postgres::connect(url, NoTls)
        .await
        .context("connect to test database")?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    Ok(client)
}

/// Records with keys `1..=n` and values `v1..vn`.
pub fn seed_records(n: i64) -> Vec<Record> {
    (1..=n).map(|i| Record::new(i, format!("v{i}"))).collect()
}

/// Replacement values `w1..wn` for keys `1..=n`.
pub fn replacement_records(n: i64) -> Vec<Record> {
    (1..=n).map(|i| Record::new(i, format!("w{i}"))).collect()
}

/// The table state expected after seeding `total` records and applying the
/// replacements for keys `1..=updated`.
pub fn expected_state(total: i64, updated: i64) -> BTreeMap<i64, String> {
    (1..=total)
        .map(|i| {
            let value = if i <= updated {
                format!("w{i}")
            } else {
                format!("v{i}")
            };
            (i, value)
        })
        .collect()
}
