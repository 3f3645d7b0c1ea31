//! One transaction per record.

use async_trait::async_trait;
use tokio_postgres::Client;

use super::{single_update_sql, StrategyKind, UpdateStrategy};
use crate::{Error, Record, TableSpec};

/// Each record is updated and committed in its own transaction: N round
/// trips, N commits. Not atomic across the batch. Processing stops at the
/// first failure, leaving records before it committed and records after it
/// untouched — the strategy to pick when per-record durability must survive
/// a crash mid-batch.
pub struct SeparateTransaction {
    table: TableSpec,
}

impl SeparateTransaction {
    pub fn new(table: TableSpec) -> Self {
        Self { table }
    }
}

#[async_trait]
impl UpdateStrategy for SeparateTransaction {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SeparateTransaction
    }

    async fn update(&self, client: &mut Client, records: &[Record]) -> Result<(), Error> {
        let sql = single_update_sql(&self.table);
        for (index, record) in records.iter().enumerate() {
            let tx = client.transaction().await?;
            let result = tx.execute(sql.as_str(), &[&record.value, &record.key]).await;
            match result {
                Ok(_) => tx.commit().await?,
                Err(err) => {
                    // Stop-on-first-failure: everything committed so far
                    // stays committed, the remainder is never attempted.
                    tracing::debug!(
                        strategy = %self.kind(),
                        failed_index = index,
                        committed = index,
                        remaining = records.len() - index - 1,
                        "per-record transaction failed; stopping batch"
                    );
                    return Err(err.into());
                }
            }
        }
        tracing::debug!(
            strategy = %self.kind(),
            records = records.len(),
            "batch applied"
        );
        Ok(())
    }
}
