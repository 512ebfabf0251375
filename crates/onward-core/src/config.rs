//! Engine configuration
//!
//! The ledger table name is configuration rather than a constant, so
//! independent migration sets can share one database by using different
//! tables.

use crate::errors::ConfigError;
use serde::Deserialize;

/// Ledger table used when none is configured
pub const DEFAULT_TABLE: &str = "dbversion";

/// Migration engine configuration
///
/// # Example
///
/// ```
/// use onward_core::MigrateConfig;
///
/// let config = MigrateConfig::from_toml_str("table = \"app_versions\"\natomic = true").unwrap();
/// assert_eq!(config.table, "app_versions");
/// assert!(config.atomic);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrateConfig {
    /// Ledger table name
    pub table: String,
    /// Run each migration and its ledger insert in one transaction
    pub atomic: bool,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            atomic: false,
        }
    }
}

impl MigrateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ledger table name
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Enable or disable per-migration transactions
    pub fn with_atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    /// Parse and validate a TOML document
    ///
    /// Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML or unknown keys, and
    /// `ConfigError::InvalidTableName` when the table is not an identifier.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: MigrateConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the table name can be spliced into SQL safely
    ///
    /// Accepts an identifier, optionally qualified by a schema name
    /// (`main.dbversion`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidTableName` otherwise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parts: Vec<&str> = self.table.split('.').collect();
        if parts.len() > 2 || !parts.iter().all(|p| is_identifier(p)) {
            return Err(ConfigError::InvalidTableName {
                name: self.table.clone(),
            });
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
