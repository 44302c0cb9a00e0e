//! JSON Schema validation of claim documents
//!
//! Every claim is checked twice: the whole document against the claim
//! meta-schema, then its `credentialSubject` against the schema of its kind.
//! The four schemas are compiled into the binary and can be replaced with a
//! directory holding `claim.schema.json` and `<kind>.schema.json` files.

use crate::error::{Result, SchemaError};
use d3_domain::traits::SchemaValidator;
use d3_domain::ClaimKind;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the meta-schema used in error reports
pub const META_SCHEMA: &str = "claim";

const EMBEDDED_CLAIM: &str = include_str!("../schemas/claim.schema.json");
const EMBEDDED_TYPE: &str = include_str!("../schemas/type.schema.json");
const EMBEDDED_BEHAVIOUR: &str = include_str!("../schemas/behaviour.schema.json");
const EMBEDDED_FIRMWARE: &str = include_str!("../schemas/firmware.schema.json");

/// Schema validator backed by the `jsonschema` crate
///
/// Compiled once and then shared read-only by every worker.
#[derive(Debug)]
pub struct JsonSchemaValidator {
    meta: jsonschema::Validator,
    kinds: BTreeMap<ClaimKind, jsonschema::Validator>,
}

impl JsonSchemaValidator {
    /// Validator using the schemas shipped with this crate
    pub fn embedded() -> Result<Self> {
        let meta = parse(META_SCHEMA, EMBEDDED_CLAIM)?;
        let kinds = ClaimKind::ALL
            .into_iter()
            .map(|kind| {
                let source = match kind {
                    ClaimKind::Type => EMBEDDED_TYPE,
                    ClaimKind::Behaviour => EMBEDDED_BEHAVIOUR,
                    ClaimKind::Firmware => EMBEDDED_FIRMWARE,
                };
                parse(kind.as_str(), source).map(|schema| (kind, schema))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_schemas(&meta, kinds)
    }

    /// Validator using `claim.schema.json` and `<kind>.schema.json` from `dir`
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let read = |name: &str| -> Result<Value> {
            let path = dir.join(format!("{}.schema.json", name));
            let text = std::fs::read_to_string(&path).map_err(|e| SchemaError::InvalidSchema {
                name: path.display().to_string(),
                message: e.to_string(),
            })?;
            parse(&path.display().to_string(), &text)
        };

        let meta = read(META_SCHEMA)?;
        let kinds = ClaimKind::ALL
            .into_iter()
            .map(|kind| read(kind.as_str()).map(|schema| (kind, schema)))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!("Loaded claim schemas from {}", dir.display());
        Self::from_schemas(&meta, kinds)
    }

    /// Compile a meta-schema and one schema per kind
    pub fn from_schemas(meta: &Value, kinds: Vec<(ClaimKind, Value)>) -> Result<Self> {
        let meta = compile(META_SCHEMA, meta)?;
        let kinds = kinds
            .into_iter()
            .map(|(kind, schema)| compile(kind.as_str(), &schema).map(|validator| (kind, validator)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        if let Some(missing) = ClaimKind::ALL.into_iter().find(|kind| !kinds.contains_key(kind)) {
            return Err(SchemaError::InvalidSchema {
                name: missing.as_str().to_string(),
                message: "no schema provided for this claim kind".to_string(),
            });
        }

        Ok(Self { meta, kinds })
    }
}

impl SchemaValidator for JsonSchemaValidator {
    type Error = SchemaError;

    fn validate_document(&self, document: &Value) -> Result<()> {
        check(META_SCHEMA, &self.meta, document)
    }

    fn validate_subject(&self, kind: ClaimKind, subject: &Value) -> Result<()> {
        let validator = self.kinds.get(&kind).ok_or_else(|| SchemaError::InvalidSchema {
            name: kind.as_str().to_string(),
            message: "no schema provided for this claim kind".to_string(),
        })?;
        check(kind.as_str(), validator, subject)
    }
}

fn parse(name: &str, text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| SchemaError::InvalidSchema {
        name: name.to_string(),
        message: e.to_string(),
    })
}

fn compile(name: &str, schema: &Value) -> Result<jsonschema::Validator> {
    jsonschema::options()
        .should_validate_formats(true)
        .build(schema)
        .map_err(|e| SchemaError::InvalidSchema {
            name: name.to_string(),
            message: e.to_string(),
        })
}

fn check(name: &str, validator: &jsonschema::Validator, instance: &Value) -> Result<()> {
    validator.validate(instance).map_err(|error| {
        let path = error.instance_path.to_string();
        let path = if path.is_empty() { "$".to_string() } else { format!("${path}") };
        SchemaError::Violation {
            schema: name.to_string(),
            path,
            message: error.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    const ID: &str = "0b5d1a6e-5f39-4c43-a1b2-3c4d5e6f7a8b";

    #[test]
    fn test_embedded_schemas_compile() {
        assert!(JsonSchemaValidator::embedded().is_ok());
    }

    #[test]
    fn test_meta_schema() {
        let validator = JsonSchemaValidator::embedded().unwrap();
        let valid = json!({ "type": "d3-device-type-assertion", "credentialSubject": { "id": ID } });
        assert!(validator.validate_document(&valid).is_ok());

        let unknown_code = json!({ "type": "d3-unknown", "credentialSubject": { "id": ID } });
        let error = validator.validate_document(&unknown_code).unwrap_err();
        assert!(matches!(&error, SchemaError::Violation { schema, path, .. } if schema == "claim" && path == "$/type"));
    }

    #[test]
    fn test_behaviour_rule_needs_name() {
        let validator = JsonSchemaValidator::embedded().unwrap();
        let subject = json!({ "id": ID, "rules": [{ "matches": {} }] });
        let error = validator.validate_subject(ClaimKind::Behaviour, &subject).unwrap_err();
        assert!(matches!(&error, SchemaError::Violation { path, .. } if path == "$/rules/0"));
    }

    #[test]
    fn test_destination_tree() {
        let validator = JsonSchemaValidator::embedded().unwrap();
        let subject = json!({
            "id": ID,
            "rules": [{
                "name": "egress",
                "matches": { "ip4": { "destinationIp4": {
                    "addr": "10.0.0.0/8",
                    "children": [{ "addr": "10.0.0.1", "allowed": false }]
                } } }
            }]
        });
        assert!(validator.validate_subject(ClaimKind::Behaviour, &subject).is_ok());

        let bad = json!({
            "id": ID,
            "rules": [{ "name": "egress", "matches": { "ip4": { "destinationIp4": { "allowed": true } } } }]
        });
        assert!(validator.validate_subject(ClaimKind::Behaviour, &bad).is_err());
    }

    #[test]
    fn test_firmware_needs_type() {
        let validator = JsonSchemaValidator::embedded().unwrap();
        assert!(validator
            .validate_subject(ClaimKind::Firmware, &json!({ "id": ID, "type": { "id": ID } }))
            .is_ok());
        assert!(validator.validate_subject(ClaimKind::Firmware, &json!({ "id": ID })).is_err());
    }

    #[test]
    fn test_type_properties() {
        let validator = JsonSchemaValidator::embedded().unwrap();
        let subject = json!({
            "id": ID,
            "parents": [ID, { "id": ID, "properties": ["tags"] }],
            "tags": ["camera"],
            "behaviour": ID
        });
        assert!(validator.validate_subject(ClaimKind::Type, &subject).is_ok());
        assert!(validator
            .validate_subject(ClaimKind::Type, &json!({ "id": ID, "tags": "camera" }))
            .is_err());
    }

    #[test]
    fn test_from_dir_overrides() {
        let dir = TempDir::new().unwrap();
        let permissive = json!({ "type": "object" }).to_string();
        for name in ["claim", "type", "behaviour", "firmware"] {
            fs::write(dir.path().join(format!("{}.schema.json", name)), &permissive).unwrap();
        }
        let validator = JsonSchemaValidator::from_dir(dir.path()).unwrap();
        assert!(validator.validate_subject(ClaimKind::Firmware, &json!({})).is_ok());
    }

    #[test]
    fn test_from_dir_missing_schema() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("claim.schema.json"), "{}").unwrap();
        let error = JsonSchemaValidator::from_dir(dir.path()).unwrap_err();
        assert!(matches!(error, SchemaError::InvalidSchema { .. }));
    }

    #[test]
    fn test_from_schemas_requires_every_kind() {
        let error = JsonSchemaValidator::from_schemas(&json!({}), vec![(ClaimKind::Type, json!({}))]).unwrap_err();
        assert!(error.to_string().contains("behaviour"));
    }
}
