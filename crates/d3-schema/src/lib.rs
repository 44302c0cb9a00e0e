//! D3 Schema
//!
//! Concrete implementations of the collaborator traits in `d3_domain::traits`:
//!
//! - [`YamlClaimLoader`] parses `<name>.<kind>.d3.yaml` sources
//! - [`JsonSchemaValidator`] checks documents against the claim meta-schema
//!   and the schema of their kind
//! - [`HttpReferenceResolver`] checks that URIs embedded in a claim answer
//!
//! # Example
//!
//! ```no_run
//! use d3_domain::traits::{ClaimLoader, SchemaValidator};
//! use d3_schema::{JsonSchemaValidator, YamlClaimLoader};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let claim = YamlClaimLoader::new().load(Path::new("echo.behaviour.d3.yaml"))?;
//! let validator = JsonSchemaValidator::embedded()?;
//! validator.validate_document(&claim.to_document())?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod loader;
pub mod references;
pub mod validator;

pub use error::{Result, SchemaError};
pub use loader::{claim_kind_from_path, YamlClaimLoader};
pub use references::{collect_uris, HttpReferenceResolver, DEFAULT_TIMEOUT_SECS};
pub use validator::{JsonSchemaValidator, META_SCHEMA};
