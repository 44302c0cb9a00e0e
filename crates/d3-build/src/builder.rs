//! Build orchestrator

use crate::cache;
use crate::discovery::{self, SourceClaim};
use crate::error::{BuildError, ClaimError};
use crate::pipeline::{self, ClaimContext, Processed, Rejected};
use crate::{BuildConfig, BuildReport};
use d3_domain::traits::{ClaimLoader, ReferenceResolver, SchemaValidator};
use d3_domain::{Claim, ClaimKind};
use d3_resolver::{claim_map, ClaimGraph, IdentifierRegistry, TypeTable};
use d3_schema::{HttpReferenceResolver, JsonSchemaValidator, SchemaError, YamlClaimLoader};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Stage of a build
///
/// `Discover → Register → GraphBuild → ResolveValidate → Emit → Done`; any
/// stage may end in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    /// Nothing has run yet
    Idle,
    /// Walking the input folders and loading claims
    Discover,
    /// Checking identifiers across the whole claim set
    Register,
    /// Building inheritance graphs and resolving types
    GraphBuild,
    /// Validating and resolving each claim on the pool
    ResolveValidate,
    /// Writing artifacts
    Emit,
    /// Finished
    Done,
    /// Stopped on a fatal error
    Failed,
}

impl BuildStage {
    /// Stage name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStage::Idle => "idle",
            BuildStage::Discover => "discover",
            BuildStage::Register => "register",
            BuildStage::GraphBuild => "graph-build",
            BuildStage::ResolveValidate => "resolve+validate",
            BuildStage::Emit => "emit",
            BuildStage::Done => "done",
            BuildStage::Failed => "failed",
        }
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of writing one artifact
enum Emitted {
    Written(PathBuf),
    Skipped(PathBuf),
}

/// Runs a build over the claim sources named in a [`BuildConfig`]
///
/// Registration and graph building run once over the whole claim set. The
/// per-claim stages run on a single worker pool with a barrier between them:
/// every claim is resolved and validated before the first artifact is
/// written.
///
/// # Examples
///
/// ```no_run
/// use d3_build::{BuildConfig, Builder};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BuildConfig {
///     inputs: vec!["claims".into()],
///     output_dir: "build".into(),
///     ..BuildConfig::default()
/// };
/// let mut builder = Builder::from_config(config)?;
/// let report = builder.run()?;
/// println!("{}", report.summary());
/// # Ok(())
/// # }
/// ```
pub struct Builder<L, V, R> {
    config: BuildConfig,
    loader: L,
    validator: V,
    resolver: Option<R>,
    stage: BuildStage,
}

impl Builder<YamlClaimLoader, JsonSchemaValidator, HttpReferenceResolver> {
    /// Builder with the YAML loader, JSON schemas and HTTP reachability checks
    pub fn from_config(config: BuildConfig) -> Result<Self, BuildError> {
        config.validate()?;
        let validator = match &config.schema_dir {
            Some(dir) => JsonSchemaValidator::from_dir(dir)?,
            None => JsonSchemaValidator::embedded()?,
        };
        let resolver = if config.check_uri_resolves {
            Some(HttpReferenceResolver::new(config.uri_timeout())?)
        } else {
            None
        };
        Ok(Self::new(config, YamlClaimLoader::new(), validator, resolver))
    }
}

impl<L, V, R> Builder<L, V, R>
where
    L: ClaimLoader<Error = SchemaError>,
    V: SchemaValidator<Error = SchemaError>,
    R: ReferenceResolver,
{
    /// Create a builder from its collaborators
    pub fn new(config: BuildConfig, loader: L, validator: V, resolver: Option<R>) -> Self {
        Self {
            config,
            loader,
            validator,
            resolver,
            stage: BuildStage::Idle,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Stage the last run reached
    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    /// Run the build
    ///
    /// Identifier, graph and configuration problems always fail the build.
    /// A per-claim failure fails it too unless `pass_on_failure` is set, in
    /// which case the failure is logged, recorded in the report and the
    /// claim's artifact is not written.
    pub fn run(&mut self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        match self.execute() {
            Ok(mut report) => {
                self.stage = BuildStage::Done;
                report.elapsed = start.elapsed();
                tracing::info!(
                    "Build finished: {} written, {} up to date, {} failed, {} warnings",
                    report.written.len(),
                    report.skipped.len(),
                    report.failures.len(),
                    report.warnings.len()
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!("Build failed during {}: {}", self.stage, e);
                self.stage = BuildStage::Failed;
                Err(e)
            }
        }
    }

    fn enter(&mut self, stage: BuildStage) {
        tracing::debug!("Entering stage {}", stage);
        self.stage = stage;
    }

    fn execute(&mut self) -> Result<BuildReport, BuildError> {
        self.config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs)
            .thread_name(|i| format!("d3-worker-{}", i))
            .build()
            .map_err(|e| BuildError::Worker(e.to_string()))?;

        let mut report = BuildReport::new();

        self.enter(BuildStage::Discover);
        let candidates = discovery::candidate_files(&self.config.inputs, &self.loader)?;
        tracing::info!("Discovering claims in {} candidate files", candidates.len());
        let sources = discovery::load_claims(&pool, candidates, &self.loader);
        report.discovered = sources.len();

        self.enter(BuildStage::Register);
        tracing::info!("Checking identifiers of {} claims", sources.len());
        let mut registry = IdentifierRegistry::new();
        for source in &sources {
            registry.register(&source.claim.id, &source.path);
        }
        registry.finalize()?;

        self.enter(BuildStage::GraphBuild);
        let claims: Vec<&Claim> = sources.iter().map(|source| &source.claim).collect();
        let behaviour_graph = ClaimGraph::build(ClaimKind::Behaviour, claims.iter().copied())?;
        let type_graph = ClaimGraph::build(ClaimKind::Type, claims.iter().copied())?;
        tracing::info!(
            "Built inheritance graphs: {} behaviours, {} types",
            behaviour_graph.len(),
            type_graph.len()
        );
        let behaviours = claim_map(ClaimKind::Behaviour, claims.iter().copied());
        let types = TypeTable::build(&type_graph, &claim_map(ClaimKind::Type, claims.iter().copied()));

        self.enter(BuildStage::ResolveValidate);
        tracing::info!("Resolving and validating {} claims", sources.len());
        let ctx = ClaimContext {
            validator: &self.validator,
            resolver: if self.config.check_uri_resolves { self.resolver.as_ref() } else { None },
            behaviour_graph: &behaviour_graph,
            behaviours: &behaviours,
            types: &types,
        };
        let outcomes = run_on_pool(&pool, &sources, self.config.pass_on_failure, |source| {
            pipeline::process_claim(source, &ctx)
        });

        let mut ready: Vec<(&SourceClaim, Processed)> = Vec::new();
        for (source, outcome) in sources.iter().zip(outcomes) {
            match outcome {
                Some(Ok(processed)) => {
                    report.processed += 1;
                    report.record_warnings(processed.warnings.iter().cloned());
                    ready.push((source, processed));
                }
                Some(Err(Rejected { error, warnings })) => {
                    report.record_warnings(warnings);
                    self.handle_failure(&mut report, source, error)?;
                }
                None => {}
            }
        }

        if !self.config.emit {
            tracing::info!("Checked {} claims, nothing written", report.processed);
            return Ok(report);
        }

        self.enter(BuildStage::Emit);
        tracing::info!("Writing {} artifacts to {}", ready.len(), self.config.output_dir.display());
        let output_dir = self.config.output_dir.clone();
        let emitted = run_on_pool(&pool, &ready, self.config.pass_on_failure, |(source, processed)| {
            emit(source, processed, &output_dir)
        });

        for ((source, _), outcome) in ready.iter().zip(emitted) {
            match outcome {
                Some(Ok(Emitted::Written(path))) => report.record_written(path),
                Some(Ok(Emitted::Skipped(path))) => report.record_skipped(path),
                Some(Err(e)) => self.handle_failure(&mut report, source, e)?,
                None => {}
            }
        }

        Ok(report)
    }

    /// Apply the failure policy to one failed claim
    fn handle_failure(&self, report: &mut BuildReport, source: &SourceClaim, error: ClaimError) -> Result<(), BuildError> {
        if !self.config.pass_on_failure {
            return Err(BuildError::Claim {
                path: source.path.clone(),
                source: error,
            });
        }
        if error.is_not_found() {
            tracing::warn!("Skipping {}: source no longer exists", source.path.display());
            report.record_missing(source.path.clone());
        } else {
            tracing::error!("Error processing {}: {}", source.path.display(), error);
            report.record_failure(source.path.clone(), source.claim.id.clone(), error.to_string());
        }
        Ok(())
    }
}

/// Run `work` over `items` on the pool, preserving order
///
/// Unless failures are passed over, the first failure stops new items from
/// starting; items already running finish. Items that never started come
/// back as `None`.
fn run_on_pool<T, O, E, F>(pool: &ThreadPool, items: &[T], pass_on_failure: bool, work: F) -> Vec<Option<Result<O, E>>>
where
    T: Sync,
    O: Send,
    E: Send,
    F: Fn(&T) -> Result<O, E> + Sync,
{
    let abort = AtomicBool::new(false);
    pool.install(|| {
        items
            .par_iter()
            .map(|item| {
                if abort.load(Ordering::Relaxed) {
                    return None;
                }
                let outcome = work(item);
                if outcome.is_err() && !pass_on_failure {
                    abort.store(true, Ordering::Relaxed);
                }
                Some(outcome)
            })
            .collect()
    })
}

/// Write one artifact unless the cache says it is up to date
fn emit(source: &SourceClaim, processed: &Processed, output_dir: &std::path::Path) -> Result<Emitted, ClaimError> {
    let path = source.output_path(output_dir);
    if cache::should_skip(&path, &processed.artifact, &source.claim) {
        tracing::debug!("{} is up to date", path.display());
        return Ok(Emitted::Skipped(path));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ClaimError::Write {
            path: path.clone(),
            source: e,
        })?;
    }
    let mut text = serde_json::to_string_pretty(&processed.artifact)?;
    text.push('\n');
    std::fs::write(&path, text).map_err(|e| ClaimError::Write {
        path: path.clone(),
        source: e,
    })?;
    tracing::debug!("Wrote {}", path.display());
    Ok(Emitted::Written(path))
}
