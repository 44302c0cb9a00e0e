//! Per-claim validation and resolution
//!
//! Runs on the worker pool. Everything here reads shared state only; the
//! graphs and claim maps were built before the first claim was dispatched.

use crate::discovery::SourceClaim;
use crate::error::ClaimError;
use d3_domain::traits::{ReferenceResolver, SchemaValidator};
use d3_domain::{Claim, ClaimKind, Warning};
use d3_resolver::{
    check_behaviour_reference, resolve_behaviour, resolve_firmware, resolve_type, ClaimGraph, ClaimMap, ResolveError,
    TypeTable,
};
use d3_schema::{collect_uris, SchemaError};
use serde_json::Value;

/// Read-only state shared by every per-claim unit of work
pub struct ClaimContext<'a, V, R> {
    /// Schema validator
    pub validator: &'a V,
    /// Reachability checker; `None` skips URI checks
    pub resolver: Option<&'a R>,
    /// Behaviour inheritance graph
    pub behaviour_graph: &'a ClaimGraph,
    /// Behaviour claims by id
    pub behaviours: &'a ClaimMap,
    /// Every type, resolved once up front
    pub types: &'a TypeTable,
}

/// A claim that passed every check
#[derive(Debug, Clone)]
pub struct Processed {
    /// The resolved claim
    pub resolved: Claim,
    /// Its artifact document
    pub artifact: Value,
    /// Non-fatal findings
    pub warnings: Vec<Warning>,
}

/// A claim that failed, with the warnings found before it did
#[derive(Debug)]
pub struct Rejected {
    /// Why the claim failed
    pub error: ClaimError,
    /// Non-fatal findings collected before the failure
    pub warnings: Vec<Warning>,
}

impl From<ClaimError> for Rejected {
    fn from(error: ClaimError) -> Self {
        Self {
            error,
            warnings: Vec::new(),
        }
    }
}

/// Validate and resolve one claim
///
/// Checks run in order: the source file is still there, the document
/// matches the meta-schema, the subject matches the schema of its kind, URIs
/// in the source subject resolve, then inheritance resolves and any
/// referenced behaviour exists. URI checks only ever produce warnings, and
/// those warnings are kept when a later check fails.
pub fn process_claim<V, R>(source: &SourceClaim, ctx: &ClaimContext<'_, V, R>) -> Result<Processed, Rejected>
where
    V: SchemaValidator<Error = SchemaError>,
    R: ReferenceResolver,
{
    std::fs::metadata(&source.path).map_err(|e| ClaimError::Io {
        path: source.path.clone(),
        source: e,
    })?;

    let claim = &source.claim;
    ctx.validator
        .validate_document(&claim.to_document())
        .map_err(ClaimError::from)?;
    ctx.validator
        .validate_subject(claim.kind, &Value::Object(claim.subject.clone()))
        .map_err(ClaimError::from)?;

    let warnings = match ctx.resolver {
        Some(resolver) => unresolved_references(claim, resolver),
        None => Vec::new(),
    };

    let resolved = match resolve(claim, ctx) {
        Ok(resolved) => resolved,
        Err(e) => {
            return Err(Rejected {
                error: ClaimError::Resolve(e),
                warnings,
            });
        }
    };

    tracing::debug!("Resolved {} claim {}", resolved.kind, resolved.id);
    Ok(Processed {
        artifact: resolved.to_document(),
        resolved,
        warnings,
    })
}

/// Resolve inheritance, then check the behaviour a type or firmware points at
fn resolve<V, R>(claim: &Claim, ctx: &ClaimContext<'_, V, R>) -> Result<Claim, ResolveError> {
    let resolved = resolve_kind(claim, ctx)?;
    if resolved.kind != ClaimKind::Behaviour {
        check_behaviour_reference(&resolved, ctx.behaviours)?;
    }
    Ok(resolved)
}

fn resolve_kind<V, R>(claim: &Claim, ctx: &ClaimContext<'_, V, R>) -> Result<Claim, ResolveError> {
    match claim.kind {
        ClaimKind::Behaviour => resolve_behaviour(claim, ctx.behaviour_graph, ctx.behaviours),
        ClaimKind::Firmware => resolve_firmware(claim, ctx.types),
        ClaimKind::Type => match ctx.types.get(&claim.id) {
            Some(Ok(resolved)) => Ok(resolved.clone()),
            Some(Err(e)) => Err(e.clone()),
            None => resolve_type(claim, ctx.types),
        },
    }
}

/// One warning per distinct URI in the claim that does not resolve
fn unresolved_references<R: ReferenceResolver>(claim: &Claim, resolver: &R) -> Vec<Warning> {
    collect_uris(&Value::Object(claim.subject.clone()))
        .into_iter()
        .filter(|uri| !resolver.resolves(uri))
        .map(|uri| {
            let warning = Warning::unresolved_reference(claim.id.clone(), uri);
            tracing::warn!("{}", warning);
            warning
        })
        .collect()
}
