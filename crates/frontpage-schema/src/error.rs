//! Schema declaration and validation errors.

use thiserror::Error;

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema errors.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Two types registered under the same name.
    #[error("duplicate schema type: {0}")]
    DuplicateType(String),

    /// Two fields of one type share a name.
    #[error("duplicate field `{field}` in type `{type_name}`")]
    DuplicateField { type_name: String, field: String },

    /// Type or field name is not a valid identifier.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Document `_type` is not registered.
    #[error("unknown document type: {0}")]
    UnknownType(String),

    /// Document failed validation against its type.
    #[error("invalid `{type_name}` document: {}", issues.join("; "))]
    Validation {
        type_name: String,
        issues: Vec<String>,
    },
}
