//! Global identifier uniqueness and syntax checks

use crate::error::{DuplicateIdentifier, MalformedIdentifier, RegistryError};
use d3_domain::ClaimId;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Collects every claim identifier with the files that declare it
///
/// # Examples
///
/// ```
/// use d3_resolver::IdentifierRegistry;
/// use d3_domain::ClaimId;
///
/// let mut registry = IdentifierRegistry::new();
/// registry.register(&ClaimId::new(), "a.type.d3.yaml");
/// registry.register(&ClaimId::new(), "b.type.d3.yaml");
/// assert!(registry.finalize().is_ok());
/// ```
#[derive(Debug, Default)]
pub struct IdentifierRegistry {
    locations: BTreeMap<ClaimId, Vec<PathBuf>>,
}

impl IdentifierRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `location` declares `id`
    pub fn register(&mut self, id: &ClaimId, location: impl Into<PathBuf>) {
        self.locations.entry(id.clone()).or_default().push(location.into());
    }

    /// Number of distinct identifiers seen
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Check uniqueness and syntax of every registered identifier
    ///
    /// Both checks run over the whole set; the error lists every duplicate
    /// and every malformed id, in id order.
    pub fn finalize(self) -> Result<(), RegistryError> {
        let mut duplicates = Vec::new();
        let mut malformed = Vec::new();

        for (id, locations) in self.locations {
            if !id.is_canonical() {
                malformed.extend(locations.iter().map(|location| MalformedIdentifier {
                    id: id.clone(),
                    location: location.clone(),
                }));
            }
            if locations.len() > 1 {
                duplicates.push(DuplicateIdentifier { id, locations });
            }
        }

        if duplicates.is_empty() && malformed.is_empty() {
            Ok(())
        } else {
            Err(RegistryError { duplicates, malformed })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "0b5d1a6e-5f39-4c43-a1b2-3c4d5e6f7a8b";
    const B: &str = "9c8b7a6f-5e4d-4c3b-8a1f-0e9d8c7b6a5f";

    #[test]
    fn test_unique_canonical_ids_pass() {
        let mut registry = IdentifierRegistry::new();
        registry.register(&ClaimId::from(A), "a.type.d3.yaml");
        registry.register(&ClaimId::from(B), "b.type.d3.yaml");
        assert_eq!(registry.len(), 2);
        assert!(registry.finalize().is_ok());
    }

    #[test]
    fn test_duplicate_names_both_locations() {
        let mut registry = IdentifierRegistry::new();
        registry.register(&ClaimId::from(A), "a.type.d3.yaml");
        registry.register(&ClaimId::from(A), "copy/a.type.d3.yaml");

        let error = registry.finalize().unwrap_err();
        assert_eq!(error.duplicates.len(), 1);
        assert_eq!(
            error.duplicates[0].locations,
            vec![PathBuf::from("a.type.d3.yaml"), PathBuf::from("copy/a.type.d3.yaml")]
        );
        assert!(error.malformed.is_empty());
    }

    #[test]
    fn test_reports_all_problems_at_once() {
        let mut registry = IdentifierRegistry::new();
        registry.register(&ClaimId::from(A), "a.type.d3.yaml");
        registry.register(&ClaimId::from(A), "a2.type.d3.yaml");
        registry.register(&ClaimId::from(B), "b.type.d3.yaml");
        registry.register(&ClaimId::from(B), "b2.type.d3.yaml");
        registry.register(&ClaimId::from("not-a-guid"), "c.type.d3.yaml");
        registry.register(&ClaimId::from(A.to_uppercase()), "d.type.d3.yaml");

        let error = registry.finalize().unwrap_err();
        assert_eq!(error.duplicates.len(), 2);
        assert_eq!(error.malformed.len(), 2);
    }

    #[test]
    fn test_malformed_duplicate_is_reported_twice_over() {
        let mut registry = IdentifierRegistry::new();
        registry.register(&ClaimId::from("bad"), "x.type.d3.yaml");
        registry.register(&ClaimId::from("bad"), "y.type.d3.yaml");

        let error = registry.finalize().unwrap_err();
        assert_eq!(error.duplicates.len(), 1);
        assert_eq!(error.malformed.len(), 2);
    }
}
