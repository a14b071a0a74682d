//! Core build, package and clean pipelines, extracted from the CLI.
//!
//! Validation happens once, up front; every later stage receives the validated [`Recipe`]
//! explicitly. External effects (orchestrator, report writing) go through the port traits.

use crate::ports::{BuildContext, Orchestrator, WritePort};
use crate::settings::{CleanSettings, PackageSettings, RecipeSettings};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use pkgrecipe_apply::{ApplyError, apply_package, apply_sync, remove_if_exists, write_manifest};
use pkgrecipe_domain::{
    Classifier, ConfigError, FsTreeView, Recipe, SyncPlanError, collect_manifest, plan_sync,
    scan_outputs,
};
use pkgrecipe_types::package::{Bucket, PackageInfo, PackageOutcome, PackagePlan};
use pkgrecipe_types::recipe::RecipeMetadata;
use pkgrecipe_types::report::{
    PackageCounts, Phase, RecipeRef, RecipeReport, RunCommand, ToolInfo, VerdictStatus,
};
use pkgrecipe_types::sync::SyncSummary;
use pkgrecipe_types::{BUILD_DIR_NAME, MANIFEST_FILE_NAME, STATE_DIR_NAME};
use tracing::{debug, info, warn};

/// Name of the run report inside the state directory.
pub const REPORT_FILE_NAME: &str = "report.json";

/// Source subtree of the workspace that the manifest enumerates.
pub const SOURCE_DIR_NAME: &str = "src";

/// Default package root, relative to the workspace.
pub const PACKAGE_DIR_NAME: &str = "package";

/// Error type for pipeline results. Exit code 2 = bad inputs or layout, 1 = everything else.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("invalid recipe: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid workspace layout: {0}")]
    Layout(SyncPlanError),

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error("{phase} failed: {source:#}")]
    Orchestrator {
        phase: Phase,
        #[source]
        source: anyhow::Error,
    },

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::Config(_) | ToolError::Layout(_) => 2,
            _ => 1,
        }
    }

    /// Lifecycle phase the error aborted, when the error itself knows it.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            ToolError::Config(_) => Some(Phase::Validate),
            ToolError::Layout(_) => Some(Phase::Sync),
            ToolError::Apply(e) => Some(e.phase()),
            ToolError::Orchestrator { phase, .. } => Some(*phase),
            ToolError::Internal(_) => None,
        }
    }
}

impl From<SyncPlanError> for ToolError {
    fn from(err: SyncPlanError) -> Self {
        match err {
            SyncPlanError::View(e) => ToolError::Internal(e.context("plan source sync")),
            other => ToolError::Layout(other),
        }
    }
}

/// Outcome of `run_build`.
#[derive(Debug)]
pub struct BuildOutcome {
    pub recipe: Recipe,
    pub workspace: Utf8PathBuf,
    pub sync: SyncSummary,
    pub manifest: Vec<String>,
    pub report: RecipeReport,
}

/// Outcome of `run_package`.
#[derive(Debug)]
pub struct PackageRunOutcome {
    pub plan: PackagePlan,
    pub outcome: PackageOutcome,
    pub info: PackageInfo,
    pub report: RecipeReport,
}

/// Outcome of `run_clean`.
#[derive(Debug, Default)]
pub struct CleanOutcome {
    pub removed: Vec<Utf8PathBuf>,
}

/// Libraries exposed to downstream consumers: the artifact name for `lib` recipes, nothing
/// otherwise.
pub fn package_info(metadata: &RecipeMetadata) -> PackageInfo {
    let libs = if metadata.artifact_type.is_lib() {
        vec![metadata.artifact_name.clone()]
    } else {
        vec![]
    };
    PackageInfo { libs }
}

/// Create `path` if needed and resolve it to its canonical form.
fn canonical_dir(
    writer: &dyn WritePort,
    path: &Utf8Path,
    what: &str,
) -> anyhow::Result<Utf8PathBuf> {
    writer.create_dir_all(path)?;
    let canonical =
        dunce::canonicalize(path).with_context(|| format!("canonicalize {what} {}", path))?;
    Utf8PathBuf::from_path_buf(canonical)
        .map_err(|p| anyhow::anyhow!("{what} path {} is not valid UTF-8", p.display()))
}

fn canonical_workspace(writer: &dyn WritePort, path: &Utf8Path) -> anyhow::Result<Utf8PathBuf> {
    canonical_dir(writer, path, "workspace")
}

fn report_for(recipe: &Recipe, tool: ToolInfo, command: RunCommand) -> RecipeReport {
    RecipeReport::new(
        tool,
        RecipeRef {
            name: recipe.metadata.name.clone(),
            version: recipe.metadata.version.clone(),
        },
        command,
    )
}

/// Path of the run report for `workspace`.
pub fn report_path(workspace: &Utf8Path) -> Utf8PathBuf {
    workspace.join(STATE_DIR_NAME).join(REPORT_FILE_NAME)
}

fn write_report(
    writer: &dyn WritePort,
    workspace: &Utf8Path,
    report: &RecipeReport,
) -> anyhow::Result<()> {
    let path = report_path(workspace);
    let json = serde_json::to_vec_pretty(report).context("serialize run report")?;
    writer.write_file(&path, &json)?;
    debug!(path = %path, "wrote run report");
    Ok(())
}

/// Close out `report` with `result` and persist it if requested.
///
/// A report that cannot be written never masks the run's own error.
fn finish<T>(
    writer: &dyn WritePort,
    workspace: &Utf8Path,
    report: &mut RecipeReport,
    enabled: bool,
    result: Result<T, ToolError>,
) -> Result<T, ToolError> {
    report.run.ended_at = Some(Utc::now());
    match &result {
        Ok(_) => {
            if report.verdict.status == VerdictStatus::Unknown {
                report.verdict.status = VerdictStatus::Pass;
            }
        }
        Err(e) => {
            report.verdict.status = VerdictStatus::Fail;
            if let Some(phase) = e.phase() {
                report.verdict.phase = phase;
            }
            report.verdict.reasons.push(e.to_string());
        }
    }
    if !enabled {
        return result;
    }
    match (write_report(writer, workspace, report), result) {
        (Ok(()), result) => result,
        (Err(write_err), Ok(_)) => Err(ToolError::Internal(write_err)),
        (Err(write_err), Err(e)) => {
            warn!(error = %format!("{write_err:#}"), "could not write run report");
            Err(e)
        }
    }
}

/// Validate the recipe, mirror the module into the workspace, write the manifest, then run the
/// orchestrator's configure and build phases.
pub fn run_build(
    settings: &RecipeSettings,
    orchestrator: &dyn Orchestrator,
    writer: &dyn WritePort,
    tool: ToolInfo,
) -> Result<BuildOutcome, ToolError> {
    let recipe = settings.inputs.validate(&settings.recipe_dir)?;
    let workspace = canonical_workspace(writer, &settings.workspace)?;

    let meta = &recipe.metadata;
    info!("module: {} {} ({})", meta.name, meta.version, meta.license);
    info!("module folder: {}", recipe.module_path);
    info!("source folder: {}", recipe.module_path.join(SOURCE_DIR_NAME));
    info!("current folder: {}", workspace);
    match &recipe.requirements {
        Some(reqs) => info!("requirements: {}", reqs),
        None => info!("requirements: none"),
    }

    let mut report = report_for(&recipe, tool, RunCommand::Build);
    let result = build_steps(settings, orchestrator, &recipe, &workspace, &mut report);
    // The module is read-only, even for the report of a rejected self-sync.
    let write_report = settings.write_report && workspace != recipe.module_path;
    let (sync, manifest) = finish(writer, &workspace, &mut report, write_report, result)?;

    Ok(BuildOutcome {
        recipe,
        workspace,
        sync,
        manifest,
        report,
    })
}

fn build_steps(
    settings: &RecipeSettings,
    orchestrator: &dyn Orchestrator,
    recipe: &Recipe,
    workspace: &Utf8Path,
    report: &mut RecipeReport,
) -> Result<(SyncSummary, Vec<String>), ToolError> {
    report.verdict.phase = Phase::Sync;
    let plan = plan_sync(
        &FsTreeView,
        &recipe.module_path,
        workspace,
        &settings.recipe_file_name,
    )?;
    let sync = apply_sync(&plan)?;
    report.sync = Some(sync);
    info!(
        removed = sync.removed,
        copied = sync.copied,
        skipped = sync.skipped,
        "synchronized module into workspace"
    );

    report.verdict.phase = Phase::Manifest;
    let manifest = collect_manifest(&workspace.join(SOURCE_DIR_NAME))
        .context("collect source manifest")?;
    write_manifest(&workspace.join(MANIFEST_FILE_NAME), &manifest)?;
    report.manifest_files = Some(manifest.len() as u64);

    let build_dir = workspace.join(BUILD_DIR_NAME);
    let ctx = BuildContext {
        metadata: &recipe.metadata,
        requirements: recipe.requirements.as_ref(),
        workspace,
        build_dir: &build_dir,
        settings: &settings.orchestrator,
    };

    report.verdict.phase = Phase::Configure;
    orchestrator
        .configure(&ctx)
        .map_err(|source| ToolError::Orchestrator {
            phase: Phase::Configure,
            source,
        })?;

    report.verdict.phase = Phase::Build;
    orchestrator
        .build(&ctx)
        .map_err(|source| ToolError::Orchestrator {
            phase: Phase::Build,
            source,
        })?;

    Ok((sync, manifest))
}

fn counts(plan: &PackagePlan, outcome: &PackageOutcome) -> PackageCounts {
    let in_bucket = |b: Bucket| outcome.packaged.iter().filter(|e| e.bucket == b).count() as u64;
    PackageCounts {
        include: in_bucket(Bucket::Include),
        lib: in_bucket(Bucket::Lib),
        bin: in_bucket(Bucket::Bin),
        unmatched: plan.unmatched.len() as u64,
        failed: outcome.failures.len() as u64,
    }
}

fn plan_outputs(
    workspace: &Utf8Path,
    package_root: &Utf8Path,
    state_dir: &Utf8Path,
) -> Result<PackagePlan, ToolError> {
    let outputs = scan_outputs(workspace, &[package_root, state_dir]).context("scan build outputs")?;
    let classifier = Classifier::builtin()?;
    Ok(classifier.plan_package(&outputs, package_root))
}

/// Classify the workspace's build outputs and copy them into the package root.
///
/// Per-file copy failures are logged and reported; they do not make this function fail.
pub fn run_package(
    settings: &PackageSettings,
    writer: &dyn WritePort,
    tool: ToolInfo,
) -> Result<PackageRunOutcome, ToolError> {
    let recipe = settings.inputs.validate(&settings.recipe_dir)?;
    let workspace = canonical_workspace(writer, &settings.workspace)?;
    let package_root = match &settings.package_root {
        Some(p) if p.is_absolute() => p.clone(),
        Some(p) => workspace.join(p),
        None => workspace.join(PACKAGE_DIR_NAME),
    };
    // Scan exclusion compares paths, so an aliased package root must be resolved first.
    let package_root = canonical_dir(writer, &package_root, "package root")?;

    let mut report = report_for(&recipe, tool, RunCommand::Package);
    report.verdict.phase = Phase::Package;

    let state_dir = workspace.join(STATE_DIR_NAME);
    let plan = match plan_outputs(&workspace, &package_root, &state_dir) {
        Ok(plan) => plan,
        Err(e) => return finish(writer, &workspace, &mut report, settings.write_report, Err(e)),
    };

    let outcome = apply_package(&plan);
    let info = package_info(&recipe.metadata);
    let counts = counts(&plan, &outcome);
    info!(
        include = counts.include,
        lib = counts.lib,
        bin = counts.bin,
        unmatched = counts.unmatched,
        failed = counts.failed,
        "packaged {} into {}",
        recipe.metadata.name,
        package_root
    );

    report.package = Some(counts);
    report.package_failures = outcome.failures.clone();
    if !outcome.is_complete() {
        report.verdict.status = VerdictStatus::Warn;
        report.verdict.reasons.push(format!(
            "{} artifact(s) could not be packaged",
            outcome.failures.len()
        ));
    }
    finish(writer, &workspace, &mut report, settings.write_report, Ok(()))?;

    Ok(PackageRunOutcome {
        plan,
        outcome,
        info,
        report,
    })
}

/// Remove orchestrator output and the manifest from the workspace. Missing entries are fine.
pub fn run_clean(settings: &CleanSettings) -> Result<CleanOutcome, ToolError> {
    let mut out = CleanOutcome::default();
    for name in [BUILD_DIR_NAME, MANIFEST_FILE_NAME] {
        let path = settings.workspace.join(name);
        if remove_if_exists(&path).with_context(|| format!("remove {}", path))? {
            info!("removed {}", path);
            out.removed.push(path);
        }
    }
    Ok(out)
}
