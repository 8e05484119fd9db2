//! Error types for colscope

use thiserror::Error;

/// Core error type for colscope operations
#[derive(Error, Debug)]
pub enum ColscopeError {
    #[error("Column \"{column}\" does not exist in table \"{table}\"")]
    ColumnNotFound { table: String, column: String },

    #[error("Unsupported case: {0}")]
    UnsupportedTypeCase(String),

    #[error("Column \"{0}\" is not numeric")]
    NotNumeric(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Invalid data for insert: {0}")]
    SchemaMismatch(String),

    #[error("Updating primary key column \"{column}\" is not supported")]
    PrimaryKeyUpdateUnsupported { column: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error raised by the underlying database driver, kept as the source.
    #[error("Driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ColscopeError {
    /// Wrap a driver error without losing it as the error source
    pub fn driver(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        ColscopeError::Driver(Box::new(err))
    }
}

/// Result type alias for colscope operations
pub type Result<T> = std::result::Result<T, ColscopeError>;
