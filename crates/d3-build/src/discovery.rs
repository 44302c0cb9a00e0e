//! Discovery of claim sources under the input folders

use crate::BuildError;
use d3_domain::traits::ClaimLoader;
use d3_domain::Claim;
use d3_schema::SchemaError;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A claim together with where it came from
#[derive(Debug, Clone)]
pub struct SourceClaim {
    /// Source file
    pub path: PathBuf,

    /// Source file relative to the input folder it was found in
    pub relative: PathBuf,

    /// The parsed claim
    pub claim: Claim,
}

impl SourceClaim {
    /// Where the artifact of this claim is written
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_path(&self.relative, output_dir)
    }
}

/// Map a source path (relative to its input folder) to its artifact path
///
/// # Examples
///
/// ```
/// use d3_build::discovery::output_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     output_path(Path::new("amazon/echo.type.d3.yaml"), Path::new("build")),
///     PathBuf::from("build/amazon/echo.type.d3.json")
/// );
/// ```
pub fn output_path(relative: &Path, output_dir: &Path) -> PathBuf {
    let mut path = output_dir.join(relative);
    path.set_extension("json");
    path
}

/// A candidate claim file and the input folder it was found under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Input folder
    pub root: PathBuf,
    /// File found under it
    pub path: PathBuf,
}

/// Walk every input folder for files the loader is willing to try
///
/// Files are returned sorted by name within each folder, folders in the
/// order given. A missing input folder is an error.
pub fn candidate_files<L: ClaimLoader>(inputs: &[PathBuf], loader: &L) -> Result<Vec<Candidate>, BuildError> {
    let mut candidates = Vec::new();
    for root in inputs {
        if !root.is_dir() {
            return Err(BuildError::MissingInput(root.clone()));
        }
        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && loader.is_candidate(e.path()))
        {
            candidates.push(Candidate {
                root: root.clone(),
                path: entry.into_path(),
            });
        }
    }
    Ok(candidates)
}

/// Load candidates on the worker pool, keeping only valid claims
///
/// Files that are not claims are skipped without complaint; files that
/// cannot be read are skipped with a warning.
pub fn load_claims<L>(pool: &ThreadPool, candidates: Vec<Candidate>, loader: &L) -> Vec<SourceClaim>
where
    L: ClaimLoader<Error = SchemaError>,
{
    pool.install(|| {
        candidates
            .into_par_iter()
            .filter_map(|candidate| match loader.load(&candidate.path) {
                Ok(claim) => {
                    let relative = candidate
                        .path
                        .strip_prefix(&candidate.root)
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|_| candidate.path.clone());
                    Some(SourceClaim {
                        path: candidate.path,
                        relative,
                        claim,
                    })
                }
                Err(e @ SchemaError::Io { .. }) => {
                    tracing::warn!("Skipping unreadable file: {}", e);
                    None
                }
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", candidate.path.display(), e);
                    None
                }
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use d3_schema::YamlClaimLoader;
    use std::fs;
    use tempfile::TempDir;

    const TYPE_CLAIM: &str = "type: d3-device-type-assertion\ncredentialSubject:\n  id: 7f3b2a10-8c4d-4e5f-9a6b-1c2d3e4f5a6b\n";

    fn pool() -> ThreadPool {
        rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap()
    }

    #[test]
    fn test_output_path_mirrors_source() {
        assert_eq!(
            output_path(Path::new("a/b/c.behaviour.d3.yml"), Path::new("/out")),
            PathBuf::from("/out/a/b/c.behaviour.d3.json")
        );
    }

    #[test]
    fn test_candidates_and_loading() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("amazon")).unwrap();
        fs::write(dir.path().join("amazon/echo.type.d3.yaml"), TYPE_CLAIM).unwrap();
        fs::write(dir.path().join("amazon/notes.md"), "# notes").unwrap();
        fs::write(dir.path().join("broken.type.d3.yaml"), "just: text").unwrap();

        let loader = YamlClaimLoader::new();
        let candidates = candidate_files(&[dir.path().to_path_buf()], &loader).unwrap();
        assert_eq!(candidates.len(), 2);

        let sources = load_claims(&pool(), candidates, &loader);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].relative, PathBuf::from("amazon/echo.type.d3.yaml"));
        assert_eq!(
            sources[0].output_path(Path::new("out")),
            PathBuf::from("out/amazon/echo.type.d3.json")
        );
    }

    #[test]
    fn test_missing_input_folder() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let error = candidate_files(&[missing], &YamlClaimLoader::new()).unwrap_err();
        assert!(matches!(error, BuildError::MissingInput(_)));
    }
}
