//! Behaviour rule inheritance

use crate::error::ResolveError;
use crate::graph::ClaimGraph;
use crate::ClaimMap;
use d3_domain::{Claim, ClaimKind, Rule};
use serde_json::Value;

/// Parse the `rules` of a behaviour claim (absent means none)
pub fn rules_of(claim: &Claim) -> Result<Vec<Rule>, ResolveError> {
    match claim.get("rules") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(rules) => serde_json::from_value(rules.clone()).map_err(|e| ResolveError::InvalidRules {
            id: claim.id.clone(),
            message: e.to_string(),
        }),
    }
}

/// Aggregate the rules of a behaviour with those of all its ancestors
///
/// The claim's own rules come first, in declaration order. Ancestors are then
/// merged in ascending id order. An inherited rule whose name is already
/// taken is renamed `"{prefix}/{name}"`, where the prefix is the ancestor's
/// `name` or, failing that, its id. This holds even when the two rules are
/// otherwise identical. Structurally identical rules declared by the same
/// claim collapse to their first occurrence.
///
/// Returns a new claim; `claim` and `behaviours` are not modified.
pub fn resolve_behaviour(claim: &Claim, graph: &ClaimGraph, behaviours: &ClaimMap) -> Result<Claim, ResolveError> {
    let mut aggregate = Vec::new();
    for rule in rules_of(claim)? {
        push_unique(&mut aggregate, rule);
    }

    for ancestor_id in graph.ancestors_of(&claim.id) {
        let ancestor = behaviours.get(&ancestor_id).ok_or_else(|| ResolveError::UnknownParent {
            kind: ClaimKind::Behaviour,
            child: claim.id.clone(),
            parent: ancestor_id.clone(),
        })?;
        let prefix = ancestor.name().unwrap_or(ancestor_id.as_str());

        for rule in rules_of(ancestor)? {
            let rule = if aggregate.iter().any(|existing| existing.name == rule.name) {
                let renamed = format!("{}/{}", prefix, rule.name);
                tracing::debug!("Renaming inherited rule '{}' of {} to '{}'", rule.name, ancestor_id, renamed);
                rule.renamed(renamed)
            } else {
                rule
            };
            push_unique(&mut aggregate, rule);
        }
    }

    let rules = serde_json::to_value(&aggregate).map_err(|e| ResolveError::InvalidRules {
        id: claim.id.clone(),
        message: e.to_string(),
    })?;
    let mut subject = claim.subject.clone();
    subject.insert("rules".to_string(), rules);
    Ok(claim.with_subject(subject))
}

/// Check that the behaviour a Type or Firmware points at exists
pub fn check_behaviour_reference(claim: &Claim, behaviours: &ClaimMap) -> Result<(), ResolveError> {
    match claim.behaviour_ref() {
        Some(behaviour) if !behaviours.contains_key(&behaviour) => Err(ResolveError::UnknownBehaviour {
            behaviour,
            claim: claim.id.clone(),
        }),
        _ => Ok(()),
    }
}

/// Append `rule` unless an identical one is already present
fn push_unique(rules: &mut Vec<Rule>, rule: Rule) {
    if !rules.contains(&rule) {
        rules.push(rule);
    }
}

/// Names of the rules in a (resolved) behaviour claim
pub fn rule_names(claim: &Claim) -> Vec<String> {
    claim
        .get("rules")
        .and_then(Value::as_array)
        .map(|rules| {
            rules
                .iter()
                .filter_map(|rule| rule.get("name").and_then(Value::as_str).map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
