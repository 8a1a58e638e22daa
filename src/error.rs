//! Error types for schema generation

use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema generation errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Unsupported array element type for field '{field}': {element}")]
    UnsupportedType { field: String, element: String },

    #[error("Cyclic type reference: {path}")]
    CyclicType { path: String },

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Entity '{0}' has no version information")]
    MissingVersion(String),

    #[error("Iterable field '{field}' does not declare an element type")]
    MissingElementType { field: String },

    #[error("Duplicate field name: {name}")]
    DuplicateField { name: String },

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
