//! Error types for the build

use d3_resolver::{GraphError, RegistryError, ResolveError};
use d3_schema::SchemaError;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single claim could not be processed
#[derive(Debug, Error)]
pub enum ClaimError {
    /// Loading or schema validation failed
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Inheritance could not be resolved
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The source file disappeared or became unreadable after discovery
    #[error("Claim source {path} is no longer readable: {source}")]
    Io {
        /// Source file
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The artifact could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Artifact file
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The artifact could not be serialised
    #[error("Failed to serialise artifact: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClaimError {
    /// Whether the claim failed only because its source file is gone
    pub fn is_not_found(&self) -> bool {
        match self {
            ClaimError::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            ClaimError::Schema(error) => error.is_not_found(),
            _ => false,
        }
    }
}

/// Errors that stop a build
#[derive(Debug, Error)]
pub enum BuildError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// An input folder does not exist
    #[error("Input directory {} does not exist", .0.display())]
    MissingInput(PathBuf),

    /// Duplicate or malformed identifiers
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Unknown parent or cycle in an inheritance graph
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Schemas or the HTTP client could not be set up
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A claim failed and failures are not being passed over
    #[error("Error processing {}: {source}", .path.display())]
    Claim {
        /// Source file of the claim
        path: PathBuf,
        /// What went wrong
        #[source]
        source: ClaimError,
    },

    /// The worker pool could not be created
    #[error("Worker pool error: {0}")]
    Worker(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use d3_domain::ClaimId;

    #[test]
    fn test_not_found_detection() {
        let vanished = ClaimError::Io {
            path: PathBuf::from("a.type.d3.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(vanished.is_not_found());

        let resolve = ClaimError::Resolve(ResolveError::UnknownType {
            type_ref: ClaimId::from("X"),
            claim: ClaimId::from("fw"),
        });
        assert!(!resolve.is_not_found());
    }

    #[test]
    fn test_claim_error_names_path() {
        let error = BuildError::Claim {
            path: PathBuf::from("fw/fw.firmware.d3.yaml"),
            source: ClaimError::Resolve(ResolveError::UnknownType {
                type_ref: ClaimId::from("X"),
                claim: ClaimId::from("fw"),
            }),
        };
        assert_eq!(
            error.to_string(),
            "Error processing fw/fw.firmware.d3.yaml: Type X of firmware claim fw not found"
        );
    }
}
