//! YAML claim loader
//!
//! Claim sources follow the `<name>.<kind>.d3.yaml` naming convention (the
//! `.yml` extension is accepted too). The kind in the file name must agree
//! with the `type` code inside the document.

use crate::error::{Result, SchemaError};
use d3_domain::traits::ClaimLoader;
use d3_domain::{Claim, ClaimKind};
use serde_json::Value;
use std::path::Path;

/// Claim kind encoded in a file name, if it follows the naming convention
///
/// # Examples
///
/// ```
/// use d3_domain::ClaimKind;
/// use d3_schema::claim_kind_from_path;
/// use std::path::Path;
///
/// assert_eq!(claim_kind_from_path(Path::new("echo/echo.behaviour.d3.yaml")), Some(ClaimKind::Behaviour));
/// assert_eq!(claim_kind_from_path(Path::new("README.md")), None);
/// ```
pub fn claim_kind_from_path(path: &Path) -> Option<ClaimKind> {
    let name = path.file_name()?.to_str()?;
    let stem = name
        .strip_suffix(".d3.yaml")
        .or_else(|| name.strip_suffix(".d3.yml"))?;
    let (base, kind) = stem.rsplit_once('.')?;
    if base.is_empty() {
        return None;
    }
    ClaimKind::parse(kind)
}

/// Loads claims from YAML source files
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlClaimLoader;

impl YamlClaimLoader {
    /// Create a loader
    pub fn new() -> Self {
        Self
    }

    /// Parse claim YAML into its JSON document form
    pub fn parse_document(path: &Path, text: &str) -> Result<Value> {
        serde_yaml::from_str(text).map_err(|e| SchemaError::Format {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

impl ClaimLoader for YamlClaimLoader {
    type Error = SchemaError;

    fn is_candidate(&self, path: &Path) -> bool {
        claim_kind_from_path(path).is_some()
    }

    fn load(&self, path: &Path) -> Result<Claim> {
        let expected = claim_kind_from_path(path).ok_or_else(|| SchemaError::Format {
            path: path.to_path_buf(),
            message: "file name does not follow <name>.<kind>.d3.yaml".to_string(),
        })?;

        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let document = Self::parse_document(path, &text)?;
        let claim = Claim::from_document(document).map_err(|message| SchemaError::Format {
            path: path.to_path_buf(),
            message,
        })?;

        if claim.kind != expected {
            return Err(SchemaError::Format {
                path: path.to_path_buf(),
                message: format!("file is named as a {} claim but declares a {} claim", expected, claim.kind),
            });
        }

        Ok(claim)
    }
}
