//! Resolver error types

use d3_domain::{ClaimId, ClaimKind};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// An identifier declared by more than one claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateIdentifier {
    /// The shared identifier
    pub id: ClaimId,
    /// Every file that declares it
    pub locations: Vec<PathBuf>,
}

/// An identifier that is not a canonical lowercase hyphenated UUID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedIdentifier {
    /// The offending identifier
    pub id: ClaimId,
    /// File that declares it
    pub location: PathBuf,
}

/// Every identifier problem found in one registry pass
///
/// Both lists are filled to completion before the error is raised, so a
/// single failed build enumerates all offenders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryError {
    /// Identifiers declared more than once
    pub duplicates: Vec<DuplicateIdentifier>,
    /// Identifiers with bad syntax
    pub malformed: Vec<MalformedIdentifier>,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sections = Vec::new();
        if !self.duplicates.is_empty() {
            let mut lines = vec!["Duplicate GUIDs found:".to_string()];
            for duplicate in &self.duplicates {
                lines.push(format!("{} in files:", duplicate.id));
                lines.extend(duplicate.locations.iter().map(|l| format!("  {}", l.display())));
            }
            sections.push(lines.join("\n"));
        }
        if !self.malformed.is_empty() {
            let mut lines = vec!["Invalid GUID format:".to_string()];
            for malformed in &self.malformed {
                lines.push(format!("{:?} in file {}", malformed.id.as_str(), malformed.location.display()));
            }
            sections.push(lines.join("\n"));
        }
        write!(f, "{}", sections.join("\n"))
    }
}

impl std::error::Error for RegistryError {}

/// Errors raised while building an inheritance graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A claim names a parent that is not a claim of the same kind
    #[error("Parent {kind} with id {parent} of {child} doesn't exist")]
    UnknownParent {
        /// Kind of graph the edge belongs to
        kind: ClaimKind,
        /// Claim declaring the parent
        child: ClaimId,
        /// The missing parent
        parent: ClaimId,
    },

    /// Parent references form a cycle
    #[error("{kind} Graph has Cyclic dependency involving {id}")]
    CyclicDependency {
        /// Kind of graph containing the cycle
        kind: ClaimKind,
        /// A claim on the cycle
        id: ClaimId,
    },
}

/// Errors raised while resolving a single claim
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// An ancestor could not be found in the claim map
    #[error("Parent {kind} id {parent} of {child} doesn't exist")]
    UnknownParent {
        /// Kind of the missing ancestor
        kind: ClaimKind,
        /// Claim being resolved
        child: ClaimId,
        /// The missing ancestor
        parent: ClaimId,
    },

    /// Several parents of a multi-parent type provide the same property
    #[error("Duplicate inherited properties in type definition {id}: {}", .properties.join(", "))]
    DuplicateInheritedProperty {
        /// Type being resolved
        id: ClaimId,
        /// Properties provided by more than one parent
        properties: Vec<String>,
    },

    /// A type asks to inherit a property its parent does not have
    #[error("Attempted to inherit missing property '{property}' from parent {parent} in type definition {id}")]
    MissingInheritedProperty {
        /// Type being resolved
        id: ClaimId,
        /// Parent that lacks the property
        parent: ClaimId,
        /// The missing property
        property: String,
    },

    /// A firmware claim points at a type that is not in the claim set
    #[error("Type {type_ref} of firmware claim {claim} not found")]
    UnknownType {
        /// Referenced type id
        type_ref: ClaimId,
        /// Firmware claim
        claim: ClaimId,
    },

    /// A type or firmware claim points at a behaviour that is not in the claim set
    #[error("Behaviour {behaviour} of claim {claim} not found")]
    UnknownBehaviour {
        /// Referenced behaviour id
        behaviour: ClaimId,
        /// Referring claim
        claim: ClaimId,
    },

    /// A required reference field is absent
    #[error("Claim {claim} has no '{field}' reference")]
    MissingReference {
        /// Claim lacking the field
        claim: ClaimId,
        /// Name of the field
        field: &'static str,
    },

    /// A parent failed to resolve, so this claim cannot either
    #[error("Claim {id} inherits from {parent}, which failed to resolve")]
    InheritsFailure {
        /// Claim being resolved
        id: ClaimId,
        /// Parent that failed
        parent: ClaimId,
    },

    /// The rules of a behaviour do not have the expected shape
    #[error("Invalid rules in behaviour {id}: {message}")]
    InvalidRules {
        /// Behaviour claim
        id: ClaimId,
        /// Parse failure detail
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_lists_every_offender() {
        let error = RegistryError {
            duplicates: vec![DuplicateIdentifier {
                id: ClaimId::from("a"),
                locations: vec![PathBuf::from("one.type.d3.yaml"), PathBuf::from("two.type.d3.yaml")],
            }],
            malformed: vec![
                MalformedIdentifier {
                    id: ClaimId::from("b"),
                    location: PathBuf::from("three.type.d3.yaml"),
                },
                MalformedIdentifier {
                    id: ClaimId::from("c"),
                    location: PathBuf::from("four.type.d3.yaml"),
                },
            ],
        };
        let text = error.to_string();
        assert!(text.contains("Duplicate GUIDs found"));
        assert!(text.contains("one.type.d3.yaml"));
        assert!(text.contains("two.type.d3.yaml"));
        assert!(text.contains("three.type.d3.yaml"));
        assert!(text.contains("four.type.d3.yaml"));
    }

    #[test]
    fn test_unknown_type_names_both_ids() {
        let error = ResolveError::UnknownType {
            type_ref: ClaimId::from("X"),
            claim: ClaimId::from("fw"),
        };
        assert_eq!(error.to_string(), "Type X of firmware claim fw not found");
    }
}
