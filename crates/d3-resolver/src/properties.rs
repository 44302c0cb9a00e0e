//! Type property inheritance

use crate::error::ResolveError;
use crate::graph::ClaimGraph;
use crate::ClaimMap;
use d3_domain::{Claim, ClaimId, ClaimKind, ParentRef};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Properties that describe the graph itself and are never inherited
const NON_INHERITABLE: [&str; 3] = ["id", "parents", "children"];

/// Which claim declared each property of a resolved type
type Origins = BTreeMap<String, ClaimId>;

/// Merge a type's own properties with those of its (already resolved) parents
///
/// With a single parent every selected property is taken as is. With several
/// parents, a property that reaches the type from two different declaring
/// claims is ambiguous and the whole set of such properties is reported. A
/// property that arrives through several parents from the same declaring
/// ancestor (a diamond) is not a conflict. A parent entry that names
/// `properties` inherits only those, and each must exist on that parent.
/// Own properties are then deep-merged over the inherited set and win.
pub fn resolve_type(claim: &Claim, table: &TypeTable) -> Result<Claim, ResolveError> {
    resolve_with_origins(claim, table).map(|(resolved, _)| resolved)
}

fn resolve_with_origins(claim: &Claim, table: &TypeTable) -> Result<(Claim, Origins), ResolveError> {
    let multiple_parents = claim.parents.len() > 1;
    let mut inherited = Map::new();
    let mut origins = Origins::new();
    let mut duplicates: Vec<String> = Vec::new();
    let mut seen_parents: Vec<&ClaimId> = Vec::new();

    for parent_ref in &claim.parents {
        if seen_parents.contains(&&parent_ref.id) {
            continue;
        }
        seen_parents.push(&parent_ref.id);

        let parent = table.resolved.get(&parent_ref.id).ok_or_else(|| ResolveError::UnknownParent {
            kind: ClaimKind::Type,
            child: claim.id.clone(),
            parent: parent_ref.id.clone(),
        })?;

        for (property, value) in inheritable(&claim.id, parent, parent_ref)? {
            let origin = table.origin(&parent.id, &property);
            match origins.get(&property) {
                Some(existing) if *existing == origin => {}
                Some(_) => {
                    if multiple_parents && !duplicates.contains(&property) {
                        duplicates.push(property);
                    }
                }
                None => {
                    origins.insert(property.clone(), origin);
                    inherited.insert(property, value);
                }
            }
        }
    }

    if !duplicates.is_empty() {
        return Err(ResolveError::DuplicateInheritedProperty {
            id: claim.id.clone(),
            properties: duplicates,
        });
    }

    let mut subject = inherited;
    for (key, value) in &claim.subject {
        if !NON_INHERITABLE.contains(&key.as_str()) {
            origins.insert(key.clone(), claim.id.clone());
        }
        match subject.get_mut(key) {
            Some(existing) => deep_merge(existing, value),
            None => {
                subject.insert(key.clone(), value.clone());
            }
        }
    }
    Ok((claim.with_subject(subject), origins))
}

/// The properties `child` takes from `parent` under `parent_ref`
fn inheritable(child: &ClaimId, parent: &Claim, parent_ref: &ParentRef) -> Result<Vec<(String, Value)>, ResolveError> {
    match &parent_ref.properties {
        None => Ok(parent
            .subject
            .iter()
            .filter(|(key, _)| !NON_INHERITABLE.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()),
        Some(names) => names
            .iter()
            .map(|name| match parent.subject.get(name) {
                Some(value) if !NON_INHERITABLE.contains(&name.as_str()) => Ok((name.clone(), value.clone())),
                _ => Err(ResolveError::MissingInheritedProperty {
                    id: child.clone(),
                    parent: parent.id.clone(),
                    property: name.clone(),
                }),
            })
            .collect(),
    }
}

/// Overlay `overlay` onto `base`; nested mappings merge, anything else replaces
fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// Every type resolved once, in topological order
///
/// Each type is computed at most once. Descendant types and firmware claims
/// read from the table; nothing writes to it after [`TypeTable::build`].
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    resolved: ClaimMap,
    origins: BTreeMap<ClaimId, Origins>,
    failed: BTreeMap<ClaimId, ResolveError>,
}

impl TypeTable {
    /// Resolve every type of `graph`
    ///
    /// Failures are recorded rather than returned so the caller can apply its
    /// own failure policy per claim. A type whose parent failed records
    /// [`ResolveError::InheritsFailure`].
    pub fn build(graph: &ClaimGraph, types: &ClaimMap) -> Self {
        let mut table = Self::default();

        for id in graph.topological_order() {
            let Some(claim) = types.get(&id) else {
                continue;
            };

            let outcome = match claim.parent_ids().find(|parent| table.failed.contains_key(*parent)) {
                Some(parent) => Err(ResolveError::InheritsFailure {
                    id: id.clone(),
                    parent: parent.clone(),
                }),
                None => resolve_with_origins(claim, &table)
                    .map(|(resolved, origins)| (with_children(resolved, graph), origins)),
            };

            match outcome {
                Ok((resolved, origins)) => {
                    table.origins.insert(id.clone(), origins);
                    table.resolved.insert(id, resolved);
                }
                Err(e) => {
                    tracing::debug!("Type {} failed to resolve: {}", id, e);
                    table.failed.insert(id, e);
                }
            }
        }

        table
    }

    /// Resolution outcome for `id`, or `None` when it is not a known type
    pub fn get(&self, id: &ClaimId) -> Option<Result<&Claim, &ResolveError>> {
        if let Some(claim) = self.resolved.get(id) {
            return Some(Ok(claim));
        }
        self.failed.get(id).map(Err)
    }

    /// Claim that declared `property` on the resolved type `id`
    fn origin(&self, id: &ClaimId, property: &str) -> ClaimId {
        self.origins
            .get(id)
            .and_then(|origins| origins.get(property))
            .cloned()
            .unwrap_or_else(|| id.clone())
    }

    /// Successfully resolved types
    pub fn resolved(&self) -> &ClaimMap {
        &self.resolved
    }

    /// Types that failed, with their error
    pub fn failures(&self) -> impl Iterator<Item = (&ClaimId, &ResolveError)> {
        self.failed.iter()
    }

    /// Number of types, resolved or failed
    pub fn len(&self) -> usize {
        self.resolved.len() + self.failed.len()
    }

    /// Whether the table holds no types
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Record the direct children of a type on its resolved form
fn with_children(claim: Claim, graph: &ClaimGraph) -> Claim {
    let children = graph.children_of(&claim.id);
    if children.is_empty() {
        return claim;
    }
    let mut subject = claim.subject.clone();
    let children: Vec<Value> = children.iter().map(|child| json!({ "id": child })).collect();
    subject.insert("children".to_string(), Value::Array(children));
    claim.with_subject(subject)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim_map;

    fn device_type(id: &str, parents: Value, properties: Value) -> Claim {
        let mut subject = properties;
        subject["id"] = json!(id);
        subject["parents"] = parents;
        Claim::from_document(json!({ "type": "d3-device-type-assertion", "credentialSubject": subject })).unwrap()
    }

    fn table(claims: &[Claim]) -> TypeTable {
        let graph = ClaimGraph::build(ClaimKind::Type, claims).unwrap();
        TypeTable::build(&graph, &claim_map(ClaimKind::Type, claims))
    }

    fn resolved<'a>(table: &'a TypeTable, id: &str) -> &'a Claim {
        table.get(&ClaimId::from(id)).unwrap().unwrap()
    }

    #[test]
    fn test_single_parent_properties_are_adopted() {
        let claims = vec![
            device_type("router", json!([]), json!({ "tags": ["network"], "manufacturer": "Acme" })),
            device_type("model-x", json!(["router"]), json!({ "name": "Model X" })),
        ];
        let table = table(&claims);
        let model = resolved(&table, "model-x");
        assert_eq!(model.get("tags"), Some(&json!(["network"])));
        assert_eq!(model.get("manufacturer"), Some(&json!("Acme")));
        assert_eq!(model.get("name"), Some(&json!("Model X")));
    }

    #[test]
    fn test_two_parents_with_same_property_fail() {
        let claims = vec![
            device_type("camera", json!([]), json!({ "tags": ["camera"] })),
            device_type("speaker", json!([]), json!({ "tags": ["audio"] })),
            device_type("doorbell", json!(["camera", "speaker"]), json!({})),
        ];
        let table = table(&claims);
        match table.get(&ClaimId::from("doorbell")) {
            Some(Err(ResolveError::DuplicateInheritedProperty { properties, .. })) => {
                assert_eq!(properties, &vec!["tags".to_string()]);
            }
            other => panic!("Expected DuplicateInheritedProperty, got {:?}", other),
        }
    }

    #[test]
    fn test_diamond_shares_grandparent_property() {
        let claims = vec![
            device_type("root", json!([]), json!({ "manufacturer": "Acme" })),
            device_type("left", json!(["root"]), json!({ "name": "Left" })),
            device_type("right", json!(["root"]), json!({ "cpe": "cpe:2.3:h:acme:right" })),
            device_type("leaf", json!(["left", "right"]), json!({})),
        ];
        let table = table(&claims);
        let leaf = resolved(&table, "leaf");
        assert_eq!(leaf.get("manufacturer"), Some(&json!("Acme")));
        assert_eq!(leaf.get("name"), Some(&json!("Left")));
        assert_eq!(leaf.get("cpe"), Some(&json!("cpe:2.3:h:acme:right")));
    }

    #[test]
    fn test_diamond_with_overridden_property_conflicts() {
        let claims = vec![
            device_type("root", json!([]), json!({ "manufacturer": "Acme" })),
            device_type("left", json!(["root"]), json!({ "manufacturer": "Acme Audio" })),
            device_type("right", json!(["root"]), json!({})),
            device_type("leaf", json!(["left", "right"]), json!({})),
        ];
        let table = table(&claims);
        match table.get(&ClaimId::from("leaf")) {
            Some(Err(ResolveError::DuplicateInheritedProperty { properties, .. })) => {
                assert_eq!(properties, &vec!["manufacturer".to_string()]);
            }
            other => panic!("Expected DuplicateInheritedProperty, got {:?}", other),
        }
    }

    #[test]
    fn test_selected_properties_avoid_conflicts() {
        let claims = vec![
            device_type("camera", json!([]), json!({ "tags": ["camera"], "cpe": "cpe:2.3:h:acme:cam" })),
            device_type("speaker", json!([]), json!({ "tags": ["audio"] })),
            device_type(
                "doorbell",
                json!([{ "id": "camera", "properties": ["cpe"] }, { "id": "speaker", "properties": ["tags"] }]),
                json!({}),
            ),
        ];
        let table = table(&claims);
        let doorbell = resolved(&table, "doorbell");
        assert_eq!(doorbell.get("tags"), Some(&json!(["audio"])));
        assert_eq!(doorbell.get("cpe"), Some(&json!("cpe:2.3:h:acme:cam")));
    }

    #[test]
    fn test_missing_inherited_property() {
        let claims = vec![
            device_type("camera", json!([]), json!({ "tags": ["camera"] })),
            device_type("cam-2", json!([{ "id": "camera", "properties": ["cpe"] }]), json!({})),
        ];
        let table = table(&claims);
        assert!(matches!(
            table.get(&ClaimId::from("cam-2")),
            Some(Err(ResolveError::MissingInheritedProperty { property, .. })) if property == "cpe"
        ));
    }

    #[test]
    fn test_own_properties_win_and_merge_deeply() {
        let claims = vec![
            device_type("base", json!([]), json!({ "name": "Base", "network": { "wifi": true, "lan": false } })),
            device_type("child", json!(["base"]), json!({ "name": "Child", "network": { "lan": true } })),
        ];
        let table = table(&claims);
        let child = resolved(&table, "child");
        assert_eq!(child.get("name"), Some(&json!("Child")));
        assert_eq!(child.get("network"), Some(&json!({ "wifi": true, "lan": true })));
        assert_eq!(child.get("id"), Some(&json!("child")));
        assert_eq!(child.get("parents"), Some(&json!(["base"])));
    }

    #[test]
    fn test_transitive_inheritance_and_children() {
        let claims = vec![
            device_type("a", json!([]), json!({ "manufacturer": "Acme" })),
            device_type("b", json!(["a"]), json!({})),
            device_type("c", json!(["b"]), json!({})),
        ];
        let table = table(&claims);
        assert_eq!(resolved(&table, "c").get("manufacturer"), Some(&json!("Acme")));
        assert_eq!(resolved(&table, "a").get("children"), Some(&json!([{ "id": "b" }])));
        assert_eq!(resolved(&table, "c").get("children"), None);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_failure_propagates_to_descendants() {
        let claims = vec![
            device_type("camera", json!([]), json!({ "tags": ["camera"] })),
            device_type("speaker", json!([]), json!({ "tags": ["audio"] })),
            device_type("doorbell", json!(["camera", "speaker"]), json!({})),
            device_type("doorbell-pro", json!(["doorbell"]), json!({})),
        ];
        let table = table(&claims);
        assert!(matches!(
            table.get(&ClaimId::from("doorbell-pro")),
            Some(Err(ResolveError::InheritsFailure { parent, .. })) if parent.as_str() == "doorbell"
        ));
        assert_eq!(table.failures().count(), 2);
        assert_eq!(table.resolved().len(), 2);
    }

    #[test]
    fn test_resolve_type_without_resolved_parent() {
        let claim = device_type("child", json!(["ghost"]), json!({}));
        let error = resolve_type(&claim, &TypeTable::default()).unwrap_err();
        assert!(matches!(error, ResolveError::UnknownParent { kind: ClaimKind::Type, .. }));
    }
}
