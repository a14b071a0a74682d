use crate::ports::TreeView;
use camino::{Utf8Path, Utf8PathBuf};
use pkgrecipe_types::sync::{EntryKind, SkipReason, SkippedEntry, SyncOp, SyncPlan};
use pkgrecipe_types::{BUILD_DIR_NAME, MANIFEST_FILE_NAME, STATE_DIR_NAME};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SyncPlanError {
    #[error("module {0} and the workspace are the same directory; refusing to sync a tree onto itself")]
    SelfSync(Utf8PathBuf),

    #[error("replacing {dest} would delete the module source at {module}")]
    DestinationContainsModule {
        dest: Utf8PathBuf,
        module: Utf8PathBuf,
    },

    #[error(transparent)]
    View(#[from] anyhow::Error),
}

impl SyncPlanError {
    /// True for errors caused by how module and workspace are laid out, rather than by I/O.
    pub fn is_layout_error(&self) -> bool {
        !matches!(self, SyncPlanError::View(_))
    }
}

/// Workspace entries the pipeline itself owns. They survive a sync even though the module
/// does not have them.
pub const WORKSPACE_OWNED_NAMES: [&str; 3] = [BUILD_DIR_NAME, STATE_DIR_NAME, MANIFEST_FILE_NAME];

/// Plan mirroring every top-level entry of `module` into `workspace`.
///
/// Both paths are expected to be canonical. Top-level workspace entries the module lacks are
/// removed first (except [`WORKSPACE_OWNED_NAMES`] and `recipe_file`). Then, for each module
/// entry in name order, the plan removes any same-named destination entry and copies the
/// source entry. `recipe_file` and any entry that encloses the workspace are skipped. The plan
/// is rejected as a whole before any op would run if executing it could destroy the module.
pub fn plan_sync(
    view: &dyn TreeView,
    module: &Utf8Path,
    workspace: &Utf8Path,
    recipe_file: &str,
) -> Result<SyncPlan, SyncPlanError> {
    if module == workspace {
        return Err(SyncPlanError::SelfSync(module.to_path_buf()));
    }

    let mut entries = view.list_dir(module)?;
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let mut plan = SyncPlan::new(module.to_path_buf(), workspace.to_path_buf());

    let source_names: BTreeSet<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    if view.entry_kind(workspace) == Some(EntryKind::Dir) {
        let mut existing = view.list_dir(workspace)?;
        existing.sort_by(|a, b| a.name.cmp(&b.name));
        for entry in existing {
            let name = entry.name.as_str();
            if source_names.contains(name)
                || name == recipe_file
                || WORKSPACE_OWNED_NAMES.contains(&name)
            {
                continue;
            }
            let dst = workspace.join(name);
            guard_module(&dst, module)?;
            debug!(path = %dst, "removing entry absent from the module");
            plan.ops.push(SyncOp::Remove {
                path: dst,
                kind: entry.kind,
            });
        }
    }

    for entry in entries {
        let src = module.join(&entry.name);

        if entry.name == recipe_file {
            debug!(path = %src, "skipping recipe file");
            plan.skipped.push(SkippedEntry {
                name: entry.name,
                reason: SkipReason::RecipeFile,
            });
            continue;
        }

        if workspace.starts_with(&src) {
            debug!(path = %src, "skipping entry that contains the workspace");
            plan.skipped.push(SkippedEntry {
                name: entry.name,
                reason: SkipReason::ContainsWorkspace,
            });
            continue;
        }

        let dst = workspace.join(&entry.name);
        if let Some(existing) = view.entry_kind(&dst) {
            guard_module(&dst, module)?;
            plan.ops.push(SyncOp::Remove {
                path: dst.clone(),
                kind: existing,
            });
        }

        plan.ops.push(SyncOp::Copy {
            from: src,
            to: dst,
            kind: entry.kind,
        });
    }

    debug!(
        module = %module,
        workspace = %workspace,
        ops = plan.ops.len(),
        skipped = plan.skipped.len(),
        "planned sync"
    );
    Ok(plan)
}

fn guard_module(dst: &Utf8Path, module: &Utf8Path) -> Result<(), SyncPlanError> {
    if module.starts_with(dst) {
        return Err(SyncPlanError::DestinationContainsModule {
            dest: dst.to_path_buf(),
            module: module.to_path_buf(),
        });
    }
    Ok(())
}
