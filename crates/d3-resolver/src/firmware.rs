//! Firmware claim resolution

use crate::error::ResolveError;
use crate::properties::TypeTable;
use d3_domain::Claim;
use serde_json::Value;

/// Resolve a firmware claim against the resolved types
///
/// The referenced type must exist and must itself have resolved. A firmware
/// claim that declares no behaviour takes the behaviour of its type; one
/// that declares its own keeps it.
pub fn resolve_firmware(claim: &Claim, types: &TypeTable) -> Result<Claim, ResolveError> {
    let type_ref = claim.type_ref().ok_or_else(|| ResolveError::MissingReference {
        claim: claim.id.clone(),
        field: "type",
    })?;

    let device_type = match types.get(&type_ref) {
        Some(Ok(device_type)) => device_type,
        Some(Err(_)) => {
            return Err(ResolveError::InheritsFailure {
                id: claim.id.clone(),
                parent: type_ref,
            })
        }
        None => {
            return Err(ResolveError::UnknownType {
                type_ref,
                claim: claim.id.clone(),
            })
        }
    };

    if has_value(claim.get("behaviour")) {
        return Ok(claim.clone());
    }

    match device_type.get("behaviour") {
        Some(behaviour) if has_value(Some(behaviour)) => {
            tracing::debug!("Firmware {} falls back to the behaviour of type {}", claim.id, type_ref);
            let mut subject = claim.subject.clone();
            subject.insert("behaviour".to_string(), behaviour.clone());
            Ok(claim.with_subject(subject))
        }
        _ => Ok(claim.clone()),
    }
}

fn has_value(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim_map;
    use crate::graph::ClaimGraph;
    use d3_domain::{ClaimId, ClaimKind};
    use serde_json::json;

    fn types(claims: &[Claim]) -> TypeTable {
        let graph = ClaimGraph::build(ClaimKind::Type, claims).unwrap();
        TypeTable::build(&graph, &claim_map(ClaimKind::Type, claims))
    }

    fn claim(document: Value) -> Claim {
        Claim::from_document(document).unwrap()
    }

    fn device_type(id: &str, behaviour: Option<&str>) -> Claim {
        let mut subject = json!({ "id": id });
        if let Some(behaviour) = behaviour {
            subject["behaviour"] = json!({ "id": behaviour });
        }
        claim(json!({ "type": "d3-device-type-assertion", "credentialSubject": subject }))
    }

    fn firmware(id: &str, type_ref: &str, behaviour: Option<&str>) -> Claim {
        let mut subject = json!({ "id": id, "type": type_ref });
        if let Some(behaviour) = behaviour {
            subject["behaviour"] = json!({ "id": behaviour });
        }
        claim(json!({ "type": "d3-firmware-manufacturer-assertion", "credentialSubject": subject }))
    }

    #[test]
    fn test_falls_back_to_type_behaviour() {
        let table = types(&[device_type("t", Some("b"))]);
        let resolved = resolve_firmware(&firmware("fw", "t", None), &table).unwrap();
        assert_eq!(resolved.behaviour_ref(), Some(ClaimId::from("b")));
    }

    #[test]
    fn test_own_behaviour_wins() {
        let table = types(&[device_type("t", Some("b"))]);
        let source = firmware("fw", "t", Some("b2"));
        let resolved = resolve_firmware(&source, &table).unwrap();
        assert_eq!(resolved.behaviour_ref(), Some(ClaimId::from("b2")));
        assert_eq!(resolved, source);
    }

    #[test]
    fn test_type_without_behaviour() {
        let table = types(&[device_type("t", None)]);
        let resolved = resolve_firmware(&firmware("fw", "t", None), &table).unwrap();
        assert_eq!(resolved.behaviour_ref(), None);
    }

    #[test]
    fn test_unknown_type() {
        let table = types(&[device_type("t", None)]);
        let error = resolve_firmware(&firmware("fw", "X", None), &table).unwrap_err();
        assert_eq!(error.to_string(), "Type X of firmware claim fw not found");
    }

    #[test]
    fn test_missing_type_field() {
        let table = types(&[]);
        let source = claim(json!({
            "type": "d3-firmware-manufacturer-assertion",
            "credentialSubject": { "id": "fw" }
        }));
        assert!(matches!(
            resolve_firmware(&source, &table),
            Err(ResolveError::MissingReference { field: "type", .. })
        ));
    }

    #[test]
    fn test_failed_type_fails_firmware() {
        let claims = vec![
            claim(json!({ "type": "d3-device-type-assertion", "credentialSubject": { "id": "p1", "tags": [] } })),
            claim(json!({ "type": "d3-device-type-assertion", "credentialSubject": { "id": "p2", "tags": [] } })),
            claim(json!({ "type": "d3-device-type-assertion", "credentialSubject": { "id": "t", "parents": ["p1", "p2"] } })),
        ];
        let table = types(&claims);
        assert!(matches!(
            resolve_firmware(&firmware("fw", "t", None), &table),
            Err(ResolveError::InheritsFailure { .. })
        ));
    }
}
