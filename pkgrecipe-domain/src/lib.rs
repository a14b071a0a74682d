//! Domain logic: turn a recipe and a module tree into deterministic plans.
//!
//! This crate owns *what* should happen to the workspace and the package root. It does not own
//! *how* plans are executed; that's the `pkgrecipe-apply` crate.

mod classify;
mod manifest;
mod ports;
mod recipe;
mod requires;
mod sync_planner;

pub use classify::{ARTIFACT_RULES, ArtifactRule, Classifier, HEADER_ROOT, scan_outputs};
pub use manifest::{collect_manifest, normalize_separators, render_manifest};
pub use ports::{DirEntryInfo, FsTreeView, TreeView};
pub use recipe::{ConfigError, LEGACY_KEY_PREFIX, Recipe, RecipeInputs, keys};
pub use requires::{REQUIRES_DELIMITER, resolve_requires};
pub use sync_planner::{SyncPlanError, WORKSPACE_OWNED_NAMES, plan_sync};
