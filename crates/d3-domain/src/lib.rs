//! D3 Domain Layer
//!
//! This crate contains the core domain model shared by every stage of the D3
//! claim build. It defines the value types and the trait interfaces the other
//! layers implement; it performs no I/O of its own.
//!
//! ## Key Concepts
//!
//! - **Claim**: a declarative document describing a device Type, a Behaviour
//!   policy or a Firmware release
//! - **ClaimId**: the globally unique identifier of a claim (canonical UUID form)
//! - **Parents**: single or multiple inheritance between claims of the same kind
//! - **Rule**: a named network-access policy entry carried by Behaviour claims
//! - **Warning**: a non-fatal finding attached to one claim
//!
//! ## Architecture
//!
//! - Only `uuid` and `serde`/`serde_json` as external dependencies
//! - Pure value types; resolvers return new claims instead of mutating
//! - Trait definitions for the loader, schema validator and reference resolver

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod claim;
pub mod rule;
pub mod traits;
pub mod warning;

// Re-exports for convenience
pub use claim::{Claim, ClaimId, ClaimKind, ParentRef};
pub use rule::{Destination, Ip4Match, Rule, RuleMatches};
pub use warning::{Warning, WarningKind};
