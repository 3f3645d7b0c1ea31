//! One statement per record, one transaction for the whole batch.

use async_trait::async_trait;
use tokio_postgres::Client;

use super::{single_update_sql, StrategyKind, UpdateStrategy};
use crate::{Error, Record, TableSpec};

/// N sequential UPDATE statements nested in a single transaction: N round
/// trips, one commit. Any failure rolls back every prior update in the call.
pub struct OneTransaction {
    table: TableSpec,
}

impl OneTransaction {
    pub fn new(table: TableSpec) -> Self {
        Self { table }
    }
}

#[async_trait]
impl UpdateStrategy for OneTransaction {
    fn kind(&self) -> StrategyKind {
        StrategyKind::OneTransaction
    }

    async fn update(&self, client: &mut Client, records: &[Record]) -> Result<(), Error> {
        let tx = client.transaction().await?;
        let stmt = tx.prepare(&single_update_sql(&self.table)).await?;
        let mut updated = 0u64;
        for record in records {
            updated += tx.execute(&stmt, &[&record.value, &record.key]).await?;
        }
        tx.commit().await?;
        tracing::debug!(
            strategy = %self.kind(),
            records = records.len(),
            updated,
            "batch applied"
        );
        Ok(())
    }
}
