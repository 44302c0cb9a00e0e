//! Incremental output cache
//!
//! Artifacts are compared structurally with what is already on disk; key
//! order and formatting do not matter.

use d3_domain::{Claim, ClaimKind};
use serde_json::Value;
use std::path::Path;

/// Whether writing `artifact` to `existing` can be skipped
///
/// Only claims with no upstream dependencies are ever skipped. A claim with
/// parents may resolve differently even when its own source is untouched,
/// and a firmware claim may pick up a changed behaviour from its type.
pub fn should_skip(existing: &Path, artifact: &Value, claim: &Claim) -> bool {
    if claim.has_parents() || claim.kind == ClaimKind::Firmware {
        return false;
    }
    match previous_artifact(existing) {
        Some(previous) => previous == *artifact,
        None => false,
    }
}

fn previous_artifact(path: &Path) -> Option<Value> {
    let text = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}
