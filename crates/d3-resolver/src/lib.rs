//! D3 Resolver
//!
//! Turns a loaded claim set into resolved claims. Nothing here touches the
//! filesystem; the build layer hands in claims and receives new ones back.
//!
//! # Stages
//!
//! 1. [`IdentifierRegistry`] checks that every id is unique and canonical
//! 2. [`ClaimGraph`] links claims of one kind to their parents and rejects
//!    unknown parents and cycles
//! 3. [`TypeTable`] resolves every type once, parents before children
//! 4. [`resolve_behaviour`] aggregates inherited rules per behaviour
//! 5. [`resolve_firmware`] checks a firmware's type and fills in its behaviour
//!
//! # Usage
//!
//! ```
//! use d3_domain::{Claim, ClaimKind};
//! use d3_resolver::{claim_map, ClaimGraph, TypeTable};
//! use serde_json::json;
//!
//! let claims = vec![
//!     Claim::from_document(json!({
//!         "type": "d3-device-type-assertion",
//!         "credentialSubject": { "id": "base", "manufacturer": "Acme" }
//!     })).unwrap(),
//!     Claim::from_document(json!({
//!         "type": "d3-device-type-assertion",
//!         "credentialSubject": { "id": "model", "parents": ["base"] }
//!     })).unwrap(),
//! ];
//!
//! let graph = ClaimGraph::build(ClaimKind::Type, &claims).unwrap();
//! let table = TypeTable::build(&graph, &claim_map(ClaimKind::Type, &claims));
//! let model = table.get(&"model".into()).unwrap().unwrap();
//! assert_eq!(model.get("manufacturer"), Some(&json!("Acme")));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod behaviour;
pub mod error;
pub mod firmware;
pub mod graph;
pub mod properties;
pub mod registry;

use d3_domain::{Claim, ClaimId, ClaimKind};
use std::collections::BTreeMap;

pub use behaviour::{check_behaviour_reference, resolve_behaviour, rule_names, rules_of};
pub use error::{DuplicateIdentifier, GraphError, MalformedIdentifier, RegistryError, ResolveError};
pub use firmware::resolve_firmware;
pub use graph::ClaimGraph;
pub use properties::{resolve_type, TypeTable};
pub use registry::IdentifierRegistry;

/// Claims of one kind keyed by id
pub type ClaimMap = BTreeMap<ClaimId, Claim>;

/// Collect the claims of `kind` into a [`ClaimMap`]
pub fn claim_map<'a, I>(kind: ClaimKind, claims: I) -> ClaimMap
where
    I: IntoIterator<Item = &'a Claim>,
{
    claims
        .into_iter()
        .filter(|claim| claim.kind == kind)
        .map(|claim| (claim.id.clone(), claim.clone()))
        .collect()
}
