use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Result type alias using MigrateError
pub type Result<T> = std::result::Result<T, MigrateError>;

/// Boxed error produced by migration effects and transaction bodies
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// handling, log filtering and process exit reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // Input/Configuration
    InvalidInput,
    InvalidConfig,
    NotFound,

    // Storage
    Persistence,
    Io,

    // Engine
    /// The version ledger was absent and could not be created
    Initialization,
    /// The version ledger exists but its latest row could not be read
    VersionRead,
    /// A migration effect (or its ledger insert) failed
    MigrationFailed,

    // Internal
    Internal,
}

impl ErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ErrorKind::NotFound => "ERR_NOT_FOUND",
            ErrorKind::Persistence => "ERR_PERSISTENCE",
            ErrorKind::Io => "ERR_IO",
            ErrorKind::Initialization => "ERR_INITIALIZATION",
            ErrorKind::VersionRead => "ERR_VERSION_READ",
            ErrorKind::MigrationFailed => "ERR_MIGRATION_FAILED",
            ErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Structured error raised by an [`Executor`](crate::Executor)
///
/// Backends convert their native errors into this type, keeping the native
/// error reachable through [`std::error::Error::source`].
#[derive(Debug)]
pub struct StoreError {
    kind: ErrorKind,
    op: Option<String>,
    message: String,
    source: Option<BoxError>,
}

impl StoreError {
    /// Create a new error with the specified kind
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            op: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl StdError for StoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// A failed migration, wrapping the error its effect (or ledger insert)
/// produced
///
/// Renders as `error performing migration "<description>": <cause>`. The
/// cause is returned untouched by [`source`](StdError::source),
/// [`cause`](MigrationError::cause) and
/// [`into_cause`](MigrationError::into_cause), so callers can tell a
/// migration's own failure apart from a framework failure by downcasting.
#[derive(Debug)]
pub struct MigrationError {
    description: String,
    migration: String,
    version: i64,
    wrapped: BoxError,
}

impl MigrationError {
    /// Wrap `cause` as the failure of the migration labelled `migration`
    /// that would have become ledger version `version`
    pub fn new(migration: impl Into<String>, version: i64, cause: BoxError) -> Self {
        let migration = migration.into();
        Self {
            description: format!("error performing migration \"{}\"", migration),
            migration,
            version,
            wrapped: cause,
        }
    }

    /// Human description of the failure
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Description of the migration record that failed
    pub fn migration(&self) -> &str {
        &self.migration
    }

    /// Ledger version the failed migration would have been recorded as
    pub fn version(&self) -> i64 {
        self.version
    }

    /// The underlying cause
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.wrapped
    }

    /// Downcast the underlying cause to a concrete error type
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.wrapped.downcast_ref::<E>()
    }

    /// Consume the wrapper, returning the underlying cause
    pub fn into_cause(self) -> BoxError {
        self.wrapped
    }
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.description, self.wrapped)
    }
}

impl StdError for MigrationError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.wrapped as &(dyn StdError + 'static))
    }
}

/// Errors raised while validating or loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Ledger table name is not a plain SQL identifier
    #[error("invalid ledger table name {name:?}: expected an identifier such as \"dbversion\"")]
    InvalidTableName { name: String },

    /// Configuration text could not be parsed
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

// ========== End Error Facility ==========

/// Errors returned by the migration engine
///
/// Initialization and version-read failures are surfaced as-is: their
/// display and source are those of the underlying [`StoreError`]. A failed
/// migration is wrapped in a [`MigrationError`] whose source is the
/// original effect error.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// The ledger table was absent and could not be created
    #[error(transparent)]
    Initialize(StoreError),

    /// The ledger table exists but the current version could not be read
    #[error(transparent)]
    VersionRead(StoreError),

    /// A migration effect or its ledger insert failed
    #[error(transparent)]
    Migration(#[from] MigrationError),

    /// Invalid engine configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Ledger inspection failed
    #[error(transparent)]
    Store(StoreError),
}

impl MigrateError {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            MigrateError::Initialize(_) => ErrorKind::Initialization,
            MigrateError::VersionRead(_) => ErrorKind::VersionRead,
            MigrateError::Migration(_) => ErrorKind::MigrationFailed,
            MigrateError::Config(_) => ErrorKind::InvalidConfig,
            MigrateError::Store(e) => e.kind(),
        }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// The wrapped migration failure, if this error came from a migration
    pub fn as_migration(&self) -> Option<&MigrationError> {
        match self {
            MigrateError::Migration(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Sentinel;

    impl fmt::Display for Sentinel {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "I should fail")
        }
    }

    impl StdError for Sentinel {}

    #[test]
    fn test_migration_error_display() {
        let err = MigrationError::new("create people table", 1, Box::new(Sentinel));
        assert_eq!(
            err.to_string(),
            "error performing migration \"create people table\": I should fail"
        );
        assert_eq!(err.migration(), "create people table");
        assert_eq!(err.version(), 1);
    }

    #[test]
    fn test_migration_error_unwraps_to_cause() {
        let err = MigrationError::new("m", 3, Box::new(Sentinel));
        assert_eq!(err.downcast_ref::<Sentinel>(), Some(&Sentinel));

        let source = err.source().expect("wrapped cause");
        assert!(source.downcast_ref::<Sentinel>().is_some());

        let cause = err.into_cause();
        assert!(cause.downcast_ref::<Sentinel>().is_some());
    }

    #[test]
    fn test_migrate_error_forwards_source() {
        let err: MigrateError = MigrationError::new("m", 1, Box::new(Sentinel)).into();
        assert_eq!(err.kind(), ErrorKind::MigrationFailed);
        let source = err.source().expect("migration cause");
        assert!(source.downcast_ref::<Sentinel>().is_some());
    }

    #[test]
    fn test_initialize_error_is_transparent() {
        let store = StoreError::new(ErrorKind::Persistence)
            .with_op("sqlite")
            .with_message("disk I/O error");
        let rendered = store.to_string();
        let err = MigrateError::Initialize(store);
        assert_eq!(err.to_string(), rendered);
        assert_eq!(err.code(), "ERR_INITIALIZATION");
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::new(ErrorKind::NotFound)
            .with_op("ledger_probe")
            .with_message("no such table: dbversion");
        assert_eq!(
            err.to_string(),
            "[ERR_NOT_FOUND] in operation 'ledger_probe': no such table: dbversion"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn test_store_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err = StoreError::new(ErrorKind::Io).with_source(io);
        let source = err.source().expect("source");
        assert!(source.downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn test_error_kind_code_mapping() {
        let kinds = vec![
            (ErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
            (ErrorKind::InvalidConfig, "ERR_INVALID_CONFIG"),
            (ErrorKind::Persistence, "ERR_PERSISTENCE"),
            (ErrorKind::Initialization, "ERR_INITIALIZATION"),
            (ErrorKind::VersionRead, "ERR_VERSION_READ"),
            (ErrorKind::MigrationFailed, "ERR_MIGRATION_FAILED"),
        ];

        for (kind, expected_code) in kinds {
            assert_eq!(kind.code(), expected_code);
        }
    }
}
