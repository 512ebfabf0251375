//! Scripted in-memory executor for engine tests
//!
//! Understands the SQLite dialect's ledger statements and records every
//! other statement in an execution log. Failures can be injected for each
//! ledger step.

#![allow(dead_code)]

use chrono::Utc;
use onward_core::{
    BoxError, Dialect, ErrorKind, ExecSummary, Executor, Record, Row, Rows, Sqlite3, StoreError,
    Value,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
struct State {
    ledger: Option<Vec<(i64, String)>>,
    next_id: i64,
    log: Vec<String>,
}

pub struct FakeExecutor {
    table: String,
    state: RefCell<State>,
    pub fail_create: Cell<bool>,
    pub fail_version_read: Cell<bool>,
    /// Fail the ledger insert for this description
    pub fail_insert_for: RefCell<Option<String>>,
    pub transactions: Cell<usize>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::with_table("dbversion")
    }

    pub fn with_table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            state: RefCell::new(State {
                next_id: 1,
                ..State::default()
            }),
            fail_create: Cell::new(false),
            fail_version_read: Cell::new(false),
            fail_insert_for: RefCell::new(None),
            transactions: Cell::new(0),
        }
    }

    /// Start with an existing ledger holding `descriptions`
    pub fn with_ledger(descriptions: &[&str]) -> Self {
        let fake = Self::new();
        {
            let mut state = fake.state.borrow_mut();
            state.ledger = Some(
                descriptions
                    .iter()
                    .enumerate()
                    .map(|(i, d)| (i as i64 + 1, d.to_string()))
                    .collect(),
            );
            state.next_id = descriptions.len() as i64 + 1;
        }
        fake
    }

    pub fn has_ledger(&self) -> bool {
        self.state.borrow().ledger.is_some()
    }

    pub fn ledger_descriptions(&self) -> Vec<String> {
        self.state
            .borrow()
            .ledger
            .as_ref()
            .map(|rows| rows.iter().map(|(_, d)| d.clone()).collect())
            .unwrap_or_default()
    }

    /// Every statement seen, in order
    pub fn log(&self) -> Vec<String> {
        self.state.borrow().log.clone()
    }

    /// Statements that were not ledger statements
    pub fn effect_log(&self) -> Vec<String> {
        let d = Sqlite3;
        let ledger_stmts = [
            d.create_table(&self.table),
            d.table_exists(&self.table),
            d.check_version(&self.table),
            d.insert_version(&self.table),
            d.list_versions(&self.table),
        ];
        self.log()
            .into_iter()
            .filter(|s| !ledger_stmts.contains(s))
            .collect()
    }

    fn persistence_error(op: &str, message: &str) -> StoreError {
        StoreError::new(ErrorKind::Persistence)
            .with_op(op.to_string())
            .with_message(message.to_string())
    }
}

impl Executor for FakeExecutor {
    fn execute(&self, statement: &str, params: &[Value]) -> Result<ExecSummary, StoreError> {
        let d = Sqlite3;
        let mut state = self.state.borrow_mut();
        state.log.push(statement.to_string());

        if statement == d.create_table(&self.table) {
            if self.fail_create.get() {
                return Err(Self::persistence_error("create", "disk is read-only"));
            }
            if state.ledger.is_some() {
                return Err(Self::persistence_error("create", "table already exists"));
            }
            state.ledger = Some(Vec::new());
            return Ok(ExecSummary::default());
        }

        if statement == d.insert_version(&self.table) {
            let description = match params.first() {
                Some(Value::Text(d)) => d.clone(),
                other => panic!("unexpected description parameter {:?}", other),
            };
            assert!(
                matches!(params.get(1), Some(Value::Timestamp(_))),
                "applied must be bound as a timestamp"
            );
            if self.fail_insert_for.borrow().as_deref() == Some(description.as_str()) {
                return Err(Self::persistence_error("insert", "constraint failed"));
            }
            let id = state.next_id;
            state.next_id += 1;
            match state.ledger.as_mut() {
                Some(rows) => rows.push((id, description)),
                None => return Err(Self::persistence_error("insert", "no such table")),
            }
            return Ok(ExecSummary { rows_affected: 1 });
        }

        Ok(ExecSummary { rows_affected: 0 })
    }

    fn query(&self, statement: &str, _params: &[Value]) -> Result<Rows, StoreError> {
        let d = Sqlite3;
        let mut state = self.state.borrow_mut();
        state.log.push(statement.to_string());

        let rows = match state.ledger.as_ref() {
            Some(rows) => rows.clone(),
            None => {
                return Err(StoreError::new(ErrorKind::NotFound)
                    .with_op("query")
                    .with_message(format!("no such table: {}", self.table)))
            }
        };

        if statement == d.check_version(&self.table) {
            if self.fail_version_read.get() {
                return Err(Self::persistence_error("version", "database is locked"));
            }
            return Ok(Rows::new(
                rows.iter()
                    .rev()
                    .take(1)
                    .map(|(id, _)| Row::new(vec![Value::Integer(*id)]))
                    .collect(),
            ));
        }

        let now = Utc::now();
        Ok(Rows::new(
            rows.iter()
                .map(|(id, desc)| {
                    Row::new(vec![
                        Value::Integer(*id),
                        Value::Text(desc.clone()),
                        Value::Timestamp(now),
                    ])
                })
                .collect(),
        ))
    }

    fn execute_batch(&self, script: &str) -> Result<(), StoreError> {
        self.state.borrow_mut().log.push(script.to_string());
        Ok(())
    }

    fn with_transaction(
        &self,
        body: &mut dyn FnMut(&dyn Executor) -> Result<(), BoxError>,
    ) -> Result<(), BoxError> {
        self.transactions.set(self.transactions.get() + 1);
        let snapshot = self.state.borrow().clone();
        let result = body(self);
        if result.is_err() {
            let mut state = self.state.borrow_mut();
            state.ledger = snapshot.ledger;
            state.next_id = snapshot.next_id;
        }
        result
    }
}

/// Records that execute `stmt-<i>` and count how often each ran
pub fn counted_records(n: usize) -> (Vec<Record>, Rc<RefCell<Vec<usize>>>) {
    let counts = Rc::new(RefCell::new(vec![0usize; n]));
    let records = (0..n)
        .map(|i| {
            let counts = Rc::clone(&counts);
            Record::new(format!("migration {}", i), move |ex: &dyn Executor| {
                counts.borrow_mut()[i] += 1;
                ex.execute(&format!("stmt-{}", i), &[])?;
                Ok(())
            })
        })
        .collect();
    (records, counts)
}
