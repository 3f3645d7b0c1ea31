//! Multi-row bulk insert path.
//!
//! Shared between the service's seeding API and the temp-table strategy's
//! staging load. The caller owns the transaction scope; every statement this
//! module issues runs inside it.

use tokio_postgres::types::ToSql;
use tokio_postgres::Transaction;

use crate::{Error, Record};

/// Positional parameters consumed per row: `(id, data)`.
const PARAMS_PER_ROW: usize = 2;

/// PostgreSQL caps bind parameters per statement at `u16::MAX`, so larger
/// batches are split into multiple statements inside the one transaction.
pub(crate) const MAX_ROWS_PER_STATEMENT: usize = u16::MAX as usize / PARAMS_PER_ROW;

/// Builds a multi-row `INSERT ... VALUES` statement for `rows` records.
///
/// `return_generated` appends a `RETURNING` clause, which changes the wire
/// shape and cost of the statement: the server streams every inserted key
/// back even though this schema has no server-computed columns.
pub(crate) fn multi_row_insert_sql(table: &str, rows: usize, return_generated: bool) -> String {
    debug_assert!(rows > 0 && rows <= MAX_ROWS_PER_STATEMENT);
    let mut sql = format!("INSERT INTO {table} (id, data) VALUES ");
    for row in 0..rows {
        if row > 0 {
            sql.push(',');
        }
        let base = row * PARAMS_PER_ROW;
        sql.push_str(&format!("(${}, ${})", base + 1, base + 2));
    }
    if return_generated {
        sql.push_str(" RETURNING id");
    }
    sql
}

/// Inserts all `records` into `table` within the caller's transaction.
///
/// No partial application: a constraint violation on any row aborts the
/// enclosing transaction and propagates to the caller.
pub(crate) async fn bulk_insert(
    tx: &Transaction<'_>,
    table: &str,
    records: &[Record],
    return_generated: bool,
) -> Result<(), Error> {
    for chunk in records.chunks(MAX_ROWS_PER_STATEMENT) {
        let sql = multi_row_insert_sql(table, chunk.len(), return_generated);
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(chunk.len() * PARAMS_PER_ROW);
        for record in chunk {
            params.push(&record.key);
            params.push(&record.value);
        }
        if return_generated {
            // Keys are caller-supplied, so the returned values carry no new
            // information; they are drained and discarded.
            let returned = tx.query(sql.as_str(), &params).await?;
            tracing::debug!(table, rows = chunk.len(), returned = returned.len(), "inserted chunk");
        } else {
            let inserted = tx.execute(sql.as_str(), &params).await?;
            tracing::debug!(table, rows = chunk.len(), inserted, "inserted chunk");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_row_statement() {
        assert_eq!(
            multi_row_insert_sql("records", 1, false),
            "INSERT INTO records (id, data) VALUES ($1, $2)"
        );
    }

    #[test]
    fn multi_row_statement_numbers_parameters_consecutively() {
        assert_eq!(
            multi_row_insert_sql("records", 3, false),
            "INSERT INTO records (id, data) VALUES ($1, $2),($3, $4),($5, $6)"
        );
    }

    #[test]
    fn returning_clause_is_appended_on_request() {
        let sql = multi_row_insert_sql("records", 2, true);
        assert!(sql.ends_with(" RETURNING id"));
    }

    #[test]
    fn chunk_limit_respects_parameter_cap() {
        assert_eq!(MAX_ROWS_PER_STATEMENT, 32_767);
        assert!(MAX_ROWS_PER_STATEMENT * PARAMS_PER_ROW <= u16::MAX as usize);
    }
}
