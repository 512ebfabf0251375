//! SQL dialects for the version ledger
//!
//! A [`Dialect`] maps a ledger table name to the handful of statements the
//! engine needs. Implementations are pure string builders; one exists per
//! backend.

/// Statement templates for the version ledger
pub trait Dialect {
    /// DDL creating the ledger with `id` (auto-increment primary key),
    /// `description` and `applied` columns
    fn create_table(&self, table: &str) -> String;

    /// Existence probe: executing it fails when the table is absent
    fn table_exists(&self, table: &str) -> String;

    /// The most recent ledger row, ordered by descending id, at most one row
    fn check_version(&self, table: &str) -> String;

    /// Parameterized insert taking `(description, applied)`
    fn insert_version(&self, table: &str) -> String;

    /// Every ledger row as `(id, description, applied)`, oldest first
    fn list_versions(&self, table: &str) -> String {
        format!(
            "SELECT id, description, applied FROM {} ORDER BY id ASC;",
            table
        )
    }
}

/// SQLite dialect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sqlite3;

/// Convenience constructor for the SQLite dialect
pub fn sqlite3() -> Sqlite3 {
    Sqlite3
}

impl Dialect for Sqlite3 {
    fn create_table(&self, table: &str) -> String {
        format!(
            "CREATE TABLE {} ( id INTEGER PRIMARY KEY AUTOINCREMENT, description VARCHAR, applied TIMESTAMP);",
            table
        )
    }

    fn table_exists(&self, table: &str) -> String {
        format!("SELECT * FROM {};", table)
    }

    fn check_version(&self, table: &str) -> String {
        format!("SELECT id FROM {} ORDER BY id DESC LIMIT 0, 1;", table)
    }

    fn insert_version(&self, table: &str) -> String {
        format!("INSERT INTO {}(description, applied) VALUES (?,?);", table)
    }
}
