//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between the build and the things it
//! consumes: parsing claim files, validating against schemas and checking
//! that URIs are reachable. Implementations live in `d3-schema`.

use crate::{Claim, ClaimKind};
use serde_json::Value;
use std::path::Path;

/// Turns a filesystem path into a parsed claim
///
/// Implemented by the infrastructure layer (d3-schema)
pub trait ClaimLoader: Send + Sync {
    /// Error type for load operations
    type Error;

    /// Cheap filename check: is this path worth trying to load?
    fn is_candidate(&self, path: &Path) -> bool;

    /// Parse the claim at `path`
    fn load(&self, path: &Path) -> Result<Claim, Self::Error>;
}

/// Validates claim documents against the meta-schema and per-kind schemas
///
/// Implemented by the infrastructure layer (d3-schema)
pub trait SchemaValidator: Send + Sync {
    /// Error type for validation failures
    type Error;

    /// Validate the whole `{ type, credentialSubject }` document
    fn validate_document(&self, document: &Value) -> Result<(), Self::Error>;

    /// Validate a `credentialSubject` against the schema of its kind
    fn validate_subject(&self, kind: ClaimKind, subject: &Value) -> Result<(), Self::Error>;
}

/// Checks whether a URI is reachable
///
/// Each call is a single pass/fail bounded by the implementation's own
/// timeout; callers never retry.
pub trait ReferenceResolver: Send + Sync {
    /// Whether `uri` can be reached
    fn resolves(&self, uri: &str) -> bool;
}
