//! Non-fatal findings attached to a single claim

use crate::ClaimId;
use std::fmt;

/// A non-fatal finding; surfaced to the caller, never aborts a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Claim the finding is about
    pub claim: ClaimId,

    /// What was found
    pub kind: WarningKind,
}

/// Kinds of warning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    /// A URI embedded in the claim could not be reached
    UnresolvedReference {
        /// The unreachable URI
        uri: String,
    },
}

impl Warning {
    /// Warning for an unreachable URI
    pub fn unresolved_reference(claim: ClaimId, uri: impl Into<String>) -> Self {
        Self {
            claim,
            kind: WarningKind::UnresolvedReference { uri: uri.into() },
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            WarningKind::UnresolvedReference { uri } => {
                write!(f, "URI {} cannot be resolved (claim {})", uri, self.claim)
            }
        }
    }
}
