//! Export command implementation.
//!
//! Reads built artifacts and writes one markdown file per behaviour and type,
//! named after the claim id.

use crate::error::{CliError, Result};
use crate::markdown;
use crate::output::Formatter;
use d3_domain::{Claim, ClaimId, ClaimKind};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const BEHAVIOUR_SUFFIX: &str = ".behaviour.d3.json";
const TYPE_SUFFIX: &str = ".type.d3.json";

/// Execute the export command.
///
/// Behaviours are rendered first so each type can carry the markdown of the
/// behaviour it references.
pub fn execute_export(inputs: &[PathBuf], output: &Path, formatter: &Formatter) -> Result<Vec<PathBuf>> {
    let artifacts = collect_artifacts(inputs)?;
    fs::create_dir_all(output)?;

    let mut behaviours: BTreeMap<ClaimId, String> = BTreeMap::new();
    let mut written = Vec::new();

    for (path, claim) in artifacts.iter().filter(|(_, claim)| claim.kind == ClaimKind::Behaviour) {
        let rendered = markdown::behaviour_markdown(claim).map_err(|e| CliError::Export {
            path: path.clone(),
            message: e.to_string(),
        })?;
        written.push(write_markdown(output, &claim.id, &rendered)?);
        behaviours.insert(claim.id.clone(), rendered);
    }

    for (_, claim) in artifacts.iter().filter(|(_, claim)| claim.kind == ClaimKind::Type) {
        let behaviour = match claim.behaviour_ref() {
            Some(id) => {
                let rendered = behaviours.get(&id).map(String::as_str);
                if rendered.is_none() {
                    tracing::warn!("Behaviour {} of type {} was not exported", id, claim.id);
                }
                rendered
            }
            None => None,
        };
        let rendered = markdown::type_markdown(claim, behaviour);
        written.push(write_markdown(output, &claim.id, &rendered)?);
    }

    println!(
        "{}",
        formatter.success(&format!("Exported {} claim(s) to {}", written.len(), output.display()))
    );

    Ok(written)
}

/// Built behaviour and type artifacts under the input folders, in path order
fn collect_artifacts(inputs: &[PathBuf]) -> Result<Vec<(PathBuf, Claim)>> {
    let mut artifacts = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            return Err(CliError::InvalidInput(format!("{} is not a directory", input.display())));
        }

        for entry in WalkDir::new(input).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            let name = entry.file_name().to_string_lossy();
            if !entry.file_type().is_file() || !(name.ends_with(BEHAVIOUR_SUFFIX) || name.ends_with(TYPE_SUFFIX)) {
                continue;
            }

            let path = entry.path().to_path_buf();
            let document = serde_json::from_str(&fs::read_to_string(&path)?)?;
            let claim = Claim::from_document(document).map_err(|message| CliError::Export {
                path: path.clone(),
                message,
            })?;
            tracing::debug!("Exporting {} claim {}", claim.kind, claim.id);
            artifacts.push((path, claim));
        }
    }
    Ok(artifacts)
}

fn write_markdown(output: &Path, id: &ClaimId, markdown: &str) -> Result<PathBuf> {
    let path = output.join(format!("{}.md", id));
    tracing::info!("Writing markdown file to {}", path.display());
    fs::write(&path, format!("{}\n", markdown))?;
    Ok(path)
}
