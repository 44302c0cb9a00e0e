//! Error types for loading and validating claims

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the claim loader, schema validator and reference resolver
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The file is not a recognised D3 claim document
    #[error("{path} is not a D3 claim: {message}")]
    Format {
        /// File being loaded
        path: PathBuf,
        /// What is wrong with it
        message: String,
    },

    /// The file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File being loaded
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The claim does not satisfy a schema
    #[error("Claim does not match the {schema} schema at '{path}': {message}")]
    Violation {
        /// Name of the schema (`claim`, `type`, `behaviour`, `firmware`)
        schema: String,
        /// JSON path of the offending value
        path: String,
        /// Validator message
        message: String,
    },

    /// A schema could not be read or compiled
    #[error("Invalid JSON schema {name}: {message}")]
    InvalidSchema {
        /// Name or path of the schema
        name: String,
        /// Compilation failure detail
        message: String,
    },

    /// The HTTP client could not be set up
    #[error("HTTP client error: {0}")]
    Http(String),
}

impl SchemaError {
    /// Whether this is a read failure because the file no longer exists
    pub fn is_not_found(&self) -> bool {
        matches!(self, SchemaError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;
