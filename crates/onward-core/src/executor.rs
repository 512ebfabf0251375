//! SQL execution capability
//!
//! The engine never talks to a database driver directly. It drives an
//! [`Executor`] supplied by the caller, which owns the connection and its
//! lifecycle. Rows are materialised into [`Row`] values so that backends do
//! not leak cursor lifetimes into the engine.

use crate::errors::{BoxError, ErrorKind, StoreError};
use chrono::{DateTime, NaiveDateTime, Utc};

/// A statement parameter or column value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Conversion from a column [`Value`] into a typed output
pub trait FromValue: Sized {
    /// Convert `value`, returning `None` when the types are incompatible
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Real(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(v) => Some(v.clone()),
            Value::Timestamp(v) => Some(v.to_rfc3339()),
            _ => None,
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Blob(v) => Some(v.clone()),
            Value::Text(v) => Some(v.clone().into_bytes()),
            _ => None,
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Timestamp(v) => Some(*v),
            Value::Text(v) => parse_timestamp(v),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Parse a stored timestamp
///
/// Accepts RFC 3339, SQLite's `YYYY-MM-DD HH:MM:SS[.fff][+HH:MM]` and the
/// same form without an offset (read as UTC).
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// A single result row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw column value at `idx`
    pub fn value(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Scan the column at `idx` into a typed output
    pub fn get<T: FromValue>(&self, idx: usize) -> Result<T, StoreError> {
        let value = self.values.get(idx).ok_or_else(|| {
            StoreError::new(ErrorKind::InvalidInput)
                .with_op("row_scan")
                .with_message(format!(
                    "column index {} out of range for row of {} columns",
                    idx,
                    self.values.len()
                ))
        })?;
        T::from_value(value).ok_or_else(|| {
            StoreError::new(ErrorKind::InvalidInput)
                .with_op("row_scan")
                .with_message(format!(
                    "column {} holds {:?}, which cannot be read as {}",
                    idx,
                    value,
                    std::any::type_name::<T>()
                ))
        })
    }
}

/// Rows returned by [`Executor::query`], in result order
#[derive(Debug, Default)]
pub struct Rows {
    rows: std::vec::IntoIter<Row>,
}

impl Rows {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }
}

impl Iterator for Rows {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.rows.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

/// Outcome of a non-row-returning statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecSummary {
    pub rows_affected: usize,
}

/// Blocking SQL execution capability
///
/// Implementations run each call as a single round-trip against the
/// underlying store. Positional parameters bind to `?` placeholders in
/// order.
pub trait Executor {
    /// Run a statement that returns no rows
    fn execute(&self, statement: &str, params: &[Value]) -> Result<ExecSummary, StoreError>;

    /// Run a row-returning statement
    ///
    /// Must fail (rather than return no rows) when a referenced table does
    /// not exist; the ledger existence probe relies on it.
    fn query(&self, statement: &str, params: &[Value]) -> Result<Rows, StoreError>;

    /// Run a script of zero or more statements without parameters
    fn execute_batch(&self, script: &str) -> Result<(), StoreError>;

    /// Run `body` inside a transaction, committing when it returns `Ok` and
    /// rolling back otherwise
    ///
    /// Stores without transactions may call `body(self)` directly.
    fn with_transaction(
        &self,
        body: &mut dyn FnMut(&dyn Executor) -> Result<(), BoxError>,
    ) -> Result<(), BoxError>;
}
