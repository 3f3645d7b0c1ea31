//! The update service: strategy registry plus the bulk insert entry point.

use tokio_postgres::Client;

use crate::insert::bulk_insert;
use crate::strategy::{
    BatchStatement, OneTransaction, SeparateTransaction, StrategyKind, TempTableJoin,
    UpdateStrategy,
};
use crate::{Error, Record, TableSpec};

/// Owns the connection and one eagerly constructed instance of every
/// strategy; immutable after construction and free of per-call state (all
/// state lives in the storage engine and in call-scoped locals).
///
/// Dispatch is a fixed-size table over the closed [`StrategyKind`]
/// enumeration, not a dynamic map: exactly one instance per kind, built once
/// and reused for the lifetime of the service.
pub struct UpdateService {
    client: Client,
    table: TableSpec,
    strategies: [Box<dyn UpdateStrategy>; 4],
}

impl UpdateService {
    /// Builds the service against the default target table.
    pub fn new(client: Client) -> Self {
        Self::with_table(client, TableSpec::default())
    }

    /// Builds the service against a caller-chosen target table.
    pub fn with_table(client: Client, table: TableSpec) -> Self {
        let strategies: [Box<dyn UpdateStrategy>; 4] = [
            Box::new(OneTransaction::new(table.clone())),
            Box::new(SeparateTransaction::new(table.clone())),
            Box::new(BatchStatement::new(table.clone())),
            Box::new(TempTableJoin::new(table.clone())),
        ];
        Self {
            client,
            table,
            strategies,
        }
    }

    pub fn table(&self) -> &TableSpec {
        &self.table
    }

    /// Inserts all `records` as one atomic multi-row insert.
    pub async fn insert(&mut self, records: &[Record]) -> Result<(), Error> {
        self.insert_with(records, false).await
    }

    /// Inserts all `records`, optionally asking the server to stream
    /// generated column values back (`RETURNING`). The flag changes the
    /// statement's wire shape and cost but not the resulting table state.
    pub async fn insert_with(
        &mut self,
        records: &[Record],
        return_generated: bool,
    ) -> Result<(), Error> {
        let tx = self.client.transaction().await?;
        bulk_insert(&tx, self.table.name(), records, return_generated).await?;
        tx.commit().await?;
        tracing::debug!(
            table = self.table.name(),
            records = records.len(),
            return_generated,
            "insert committed"
        );
        Ok(())
    }

    /// Applies `records` through the strategy registered for `kind`.
    ///
    /// The service adds no transactional behavior of its own; the chosen
    /// strategy defines what survives a mid-batch failure.
    pub async fn update(&mut self, kind: StrategyKind, records: &[Record]) -> Result<(), Error> {
        let strategy = self
            .strategies
            .iter()
            .find(|strategy| strategy.kind() == kind)
            .ok_or(Error::UnknownStrategy(kind))?;
        strategy.update(&mut self.client, records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_kind_exactly_once() {
        // The registry is data, not a match, so cover it the way a dispatch
        // table regression would actually show up.
        let table = TableSpec::default();
        let strategies: [Box<dyn UpdateStrategy>; 4] = [
            Box::new(OneTransaction::new(table.clone())),
            Box::new(SeparateTransaction::new(table.clone())),
            Box::new(BatchStatement::new(table.clone())),
            Box::new(TempTableJoin::new(table.clone())),
        ];
        for kind in StrategyKind::ALL {
            let matches = strategies
                .iter()
                .filter(|strategy| strategy.kind() == kind)
                .count();
            assert_eq!(matches, 1, "kind {kind} must be registered exactly once");
        }
    }
}
