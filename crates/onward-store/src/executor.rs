//! rusqlite-backed executor
//!
//! Borrows a caller-owned [`Connection`]; the connection's lifecycle stays
//! with the caller.

use crate::errors::from_rusqlite;
use chrono::SecondsFormat;
use onward_core::{BoxError, ExecSummary, Executor, Row, Rows, StoreError, Value};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};

/// [`Executor`] over a borrowed SQLite connection
///
/// Timestamps are bound as RFC 3339 text with microsecond precision.
#[derive(Clone, Copy)]
pub struct SqliteExecutor<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteExecutor<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &'c Connection {
        self.conn
    }
}

impl std::fmt::Debug for SqliteExecutor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteExecutor")
            .field("path", &self.conn.path())
            .finish()
    }
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(v) => SqlValue::Integer(*v),
        Value::Real(v) => SqlValue::Real(*v),
        Value::Text(v) => SqlValue::Text(v.clone()),
        Value::Blob(v) => SqlValue::Blob(v.clone()),
        Value::Timestamp(v) => SqlValue::Text(v.to_rfc3339_opts(SecondsFormat::Micros, true)),
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(v) => Value::Text(String::from_utf8_lossy(v).into_owned()),
        ValueRef::Blob(v) => Value::Blob(v.to_vec()),
    }
}

impl Executor for SqliteExecutor<'_> {
    fn execute(&self, statement: &str, params: &[Value]) -> Result<ExecSummary, StoreError> {
        tracing::trace!(statement, params = params.len(), "execute");
        let rows_affected = self
            .conn
            .execute(statement, params_from_iter(params.iter().map(to_sql)))
            .map_err(from_rusqlite)?;
        Ok(ExecSummary { rows_affected })
    }

    fn query(&self, statement: &str, params: &[Value]) -> Result<Rows, StoreError> {
        tracing::trace!(statement, params = params.len(), "query");
        let mut stmt = self.conn.prepare(statement).map_err(from_rusqlite)?;
        let columns = stmt.column_count();
        let mut rows = stmt
            .query(params_from_iter(params.iter().map(to_sql)))
            .map_err(from_rusqlite)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(from_rusqlite)? {
            let values = (0..columns)
                .map(|idx| row.get_ref(idx).map(from_sql))
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(from_rusqlite)?;
            out.push(Row::new(values));
        }
        Ok(Rows::new(out))
    }

    fn execute_batch(&self, script: &str) -> Result<(), StoreError> {
        tracing::trace!(bytes = script.len(), "execute_batch");
        self.conn.execute_batch(script).map_err(from_rusqlite)
    }

    fn with_transaction(
        &self,
        body: &mut dyn FnMut(&dyn Executor) -> Result<(), BoxError>,
    ) -> Result<(), BoxError> {
        let tx = self.conn.unchecked_transaction().map_err(from_rusqlite)?;
        let result = body(&SqliteExecutor::new(&tx));
        match result {
            Ok(()) => {
                tx.commit().map_err(from_rusqlite)?;
                Ok(())
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback() {
                    tracing::debug!(error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }
}
