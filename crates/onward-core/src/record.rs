//! Migration records
//!
//! A [`Record`] is one forward-only unit of work: a human description and
//! the effect that performs it. Records are applied in list order and each
//! is recorded in the ledger once, so a list must only ever grow at its
//! end.

use crate::errors::BoxError;
use crate::executor::Executor;
use std::fmt;

/// Effect run against the executor when a migration is applied
pub type Effect = Box<dyn Fn(&dyn Executor) -> Result<(), BoxError>>;

/// A single migration
pub struct Record {
    description: String,
    effect: Effect,
}

impl Record {
    /// Create a migration from a closure
    ///
    /// # Example
    ///
    /// ```
    /// use onward_core::{Executor, Record};
    ///
    /// let m = Record::new("create people table", |ex: &dyn Executor| {
    ///     ex.execute("CREATE TABLE people (given_name VARCHAR(20))", &[])?;
    ///     Ok(())
    /// });
    /// assert_eq!(m.description(), "create people table");
    /// ```
    pub fn new<F>(description: impl Into<String>, effect: F) -> Self
    where
        F: Fn(&dyn Executor) -> Result<(), BoxError> + 'static,
    {
        Self {
            description: description.into(),
            effect: Box::new(effect),
        }
    }

    /// Create a migration that runs a SQL script
    pub fn sql(description: impl Into<String>, script: impl Into<String>) -> Self {
        let script = script.into();
        Self::new(description, move |ex: &dyn Executor| {
            ex.execute_batch(&script)?;
            Ok(())
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Run the effect
    ///
    /// # Errors
    ///
    /// Returns whatever the effect returns, unchanged.
    pub fn run(&self, executor: &dyn Executor) -> Result<(), BoxError> {
        (self.effect)(executor)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
