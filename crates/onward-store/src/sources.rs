//! Migrations loaded from SQL files
//!
//! A migrations directory holds one `.sql` script per migration. Files are
//! applied in file-name order, so names should carry a zero-padded numeric
//! prefix (`001_create_people.sql`, `002_add_age.sql`). The description
//! recorded in the ledger is derived from the file name.

use crate::errors::{io_error, Result};
use onward_core::errors::{ErrorKind, StoreError};
use onward_core::Record;
use std::path::Path;

/// A migration script read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlMigration {
    pub file_name: String,
    pub description: String,
    pub sql: String,
}

impl SqlMigration {
    pub fn new(file_name: impl Into<String>, sql: impl Into<String>) -> Self {
        let file_name = file_name.into();
        Self {
            description: describe(sql_stem(&file_name)),
            file_name,
            sql: sql.into(),
        }
    }

    pub fn into_record(self) -> Record {
        Record::sql(self.description, self.sql)
    }
}

/// File name without a `.sql` extension, matched case-insensitively
fn sql_stem(file_name: &str) -> &str {
    let ext_len = ".sql".len();
    match file_name.len().checked_sub(ext_len) {
        Some(stem_len)
            if file_name.is_char_boundary(stem_len)
                && file_name[stem_len..].eq_ignore_ascii_case(".sql") =>
        {
            &file_name[..stem_len]
        }
        _ => file_name,
    }
}

/// Derive a ledger description from a file stem
///
/// Drops a leading numeric prefix and its separator, then turns `_` and `-`
/// into spaces: `001_create_people` becomes `create people`. A stem with
/// nothing left after the prefix is returned unchanged.
pub fn describe(stem: &str) -> String {
    let rest = stem
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .trim_start_matches(['_', '-', '.', ' ']);
    let words: Vec<&str> = rest
        .split(['_', '-'])
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        stem.to_string()
    } else {
        words.join(" ")
    }
}

/// Read every `.sql` file in `dir`, sorted by file name
///
/// # Errors
///
/// - `Io`: the directory or a file cannot be read
/// - `InvalidInput`: a file name is not valid UTF-8
pub fn load_dir(dir: impl AsRef<Path>) -> Result<Vec<SqlMigration>> {
    let dir = dir.as_ref();
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_error("read_migrations_dir", e))? {
        let path = entry.map_err(|e| io_error("read_migrations_dir", e))?.path();
        let is_sql = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("sql"))
            .unwrap_or(false);
        if path.is_file() && is_sql {
            paths.push(path);
        }
    }
    paths.sort();

    let mut migrations = Vec::with_capacity(paths.len());
    for path in paths {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                StoreError::new(ErrorKind::InvalidInput)
                    .with_op("read_migration")
                    .with_message(format!("file name is not UTF-8: {}", path.display()))
            })?
            .to_string();
        let sql = std::fs::read_to_string(&path).map_err(|e| io_error("read_migration", e))?;
        tracing::debug!(file = %file_name, bytes = sql.len(), "loaded migration script");
        let description = describe(sql_stem(&file_name));
        migrations.push(SqlMigration {
            file_name,
            description,
            sql,
        });
    }
    Ok(migrations)
}

/// Turn loaded scripts into engine records, keeping their order
pub fn into_records(migrations: Vec<SqlMigration>) -> Vec<Record> {
    migrations.into_iter().map(SqlMigration::into_record).collect()
}
