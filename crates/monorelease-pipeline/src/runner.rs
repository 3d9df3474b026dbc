use std::collections::HashMap;
use std::sync::Arc;

use monorelease_core::{DepsConfig, PackageId, PackageSet, ReleaseDecision, ReleaseType};
use monorelease_deps::{
    plan_manifest_update, resolve_release_type, upgrade_notes, DependencyChange, DepsError,
};
use monorelease_version::{next_pre_version, next_version, VersionError};
use semver::Version;
use tokio::sync::RwLock;
use tokio::task::JoinSet;
use tracing::debug;

use crate::error::PipelineError;
use crate::gate::{BatchGate, TagLock};
use crate::hooks::{HookError, Phase, ReleaseHooks};

/// What one package's pipeline produced, surfaced at the end of the run.
#[derive(Debug, Clone)]
pub struct PackageOutcome {
    pub name: String,
    /// `None` when the package resolved to "no release" after analysis.
    pub release_type: Option<ReleaseType>,
    pub next_version: Option<Version>,
    /// The package's own notes plus the dependency-upgrade section.
    pub notes: Option<String>,
    /// Manifest scope changes applied for this release.
    pub changes: Vec<DependencyChange>,
}

impl PackageOutcome {
    #[must_use]
    pub fn released(&self) -> bool {
        self.release_type.is_some()
    }
}

/// Concurrent release runner over a package set.
///
/// Every package runs its five phases as an independent task; the only
/// cross-package coordination is the tag lock around the prepare→publish
/// window and the optional per-package batch gates in front of analysis.
pub struct MultiRelease<H> {
    set: PackageSet,
    hooks: Arc<H>,
    config: DepsConfig,
    tag_lock: TagLock,
    batch_gates: HashMap<PackageId, BatchGate>,
}

impl<H: ReleaseHooks> MultiRelease<H> {
    #[must_use]
    pub fn new(set: PackageSet, hooks: H, config: DepsConfig) -> Self {
        Self {
            set,
            hooks: Arc::new(hooks),
            config,
            tag_lock: TagLock::new(),
            batch_gates: HashMap::new(),
        }
    }

    /// Installs a batch gate in front of the named package's analyze
    /// phase and returns the handle the scheduler opens once the
    /// package's dependency cohort has finished analyzing.
    ///
    /// Returns `None` for a package not in the set.
    pub fn batch_gate(&mut self, package: &str) -> Option<BatchGate> {
        let id = self.set.by_name(package)?;
        let gate = self.batch_gates.entry(id).or_default();
        Some(gate.clone())
    }

    /// Runs every package's pipeline to completion and returns the
    /// per-package results in completion order. A failed package never
    /// aborts its siblings.
    pub async fn run(self) -> Vec<Result<PackageOutcome, PipelineError>> {
        let ids = self.set.ids();
        let set = Arc::new(RwLock::new(self.set));
        let mut tasks = JoinSet::new();

        for id in ids {
            let gate = self.batch_gates.get(&id).cloned();
            tasks.spawn(release_package(
                Arc::clone(&set),
                Arc::clone(&self.hooks),
                self.config,
                self.tag_lock.clone(),
                gate,
                id,
            ));
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            results.push(match joined {
                Ok(result) => result,
                Err(source) => Err(PipelineError::Task { source }),
            });
        }
        results
    }
}

async fn release_package<H: ReleaseHooks>(
    set: Arc<RwLock<PackageSet>>,
    hooks: Arc<H>,
    config: DepsConfig,
    tag_lock: TagLock,
    gate: Option<BatchGate>,
    id: PackageId,
) -> Result<PackageOutcome, PipelineError> {
    let snapshot = set.read().await.get(id).clone();
    let name = snapshot.name.clone();

    hooks
        .verify(&snapshot)
        .await
        .map_err(hook_error(&name, Phase::Verify))?;

    if let Some(gate) = &gate {
        gate.wait_open().await;
    }

    let own_type = hooks
        .analyze_commits(&snapshot)
        .await
        .map_err(hook_error(&name, Phase::Analyze))?;

    let (release_type, resolved_next) =
        analyze(&set, id, &name, own_type, config).await?;

    let Some(release_type) = release_type else {
        debug!(package = %name, "no release required, pipeline complete");
        return Ok(PackageOutcome {
            name,
            release_type: None,
            next_version: None,
            notes: None,
            changes: Vec::new(),
        });
    };

    // Re-snapshot: propagation may have rewritten this package's manifest.
    let snapshot = set.read().await.get(id).clone();
    let own_notes = hooks
        .generate_notes(&snapshot)
        .await
        .map_err(hook_error(&name, Phase::GenerateNotes))?;
    let upgrades = {
        let set = set.read().await;
        upgrade_notes(&set, id)
    };
    let notes = match (own_notes, upgrades) {
        (Some(own), Some(section)) => Some(format!("{own}\n\n{section}")),
        (own, section) => own.or(section),
    };

    let write = {
        let set = set.read().await;
        plan_manifest_update(&set, id).map_err(deps_error(&name, Phase::Prepare))?
    };

    // Tag window: held across prepare-time work (which may create a
    // local tag) until publish begins, so only one package is ever
    // between tag creation and tag push. RAII drops it on every failure
    // path.
    let permit = tag_lock.acquire().await;
    debug!(package = %name, "entered tag window");
    hooks
        .prepare(&snapshot, write.as_ref())
        .await
        .map_err(hook_error(&name, Phase::Prepare))?;

    drop(permit);
    hooks
        .publish(&snapshot)
        .await
        .map_err(hook_error(&name, Phase::Publish))?;

    debug!(
        package = %name,
        release_type = %release_type,
        version = ?resolved_next,
        "pipeline complete"
    );

    Ok(PackageOutcome {
        name,
        release_type: Some(release_type),
        next_version: resolved_next,
        notes,
        changes: write.map(|write| write.changes).unwrap_or_default(),
    })
}

/// Records the hook's own release type, runs dependency propagation and
/// memoizes the resulting next version on the package.
async fn analyze(
    set: &Arc<RwLock<PackageSet>>,
    id: PackageId,
    name: &str,
    own_type: Option<ReleaseType>,
    config: DepsConfig,
) -> Result<(Option<ReleaseType>, Option<Version>), PipelineError> {
    let mut set = set.write().await;

    if let Some(own) = own_type {
        set.get_mut(id).decision = ReleaseDecision::Release(own);
    }

    let resolved =
        resolve_release_type(&mut set, id, &config).map_err(deps_error(name, Phase::Analyze))?;

    let Some(release_type) = resolved else {
        return Ok((None, None));
    };

    let next = {
        let package = set.get(id);
        if package.pre_release.is_some() {
            next_pre_version(package, None).map_err(version_error(name, Phase::Analyze))?
        } else {
            next_version(package)
        }
    };
    set.get_mut(id).set_next_version(next);

    Ok((Some(release_type), set.get(id).next_version.clone()))
}

fn hook_error(package: &str, phase: Phase) -> impl FnOnce(HookError) -> PipelineError {
    let package = package.to_string();
    move |source| PipelineError::Hook {
        package,
        phase,
        source,
    }
}

fn deps_error(package: &str, phase: Phase) -> impl FnOnce(DepsError) -> PipelineError {
    let package = package.to_string();
    move |source| PipelineError::Resolve {
        package,
        phase,
        source,
    }
}

fn version_error(package: &str, phase: Phase) -> impl FnOnce(VersionError) -> PipelineError {
    let package = package.to_string();
    move |source| PipelineError::Version {
        package,
        phase,
        source,
    }
}
