//! Shared DTOs (schemas-as-code) for the pkgrecipe workspace.
//!
//! # Design constraints
//! - Plans are plain data: computing one never touches the filesystem's write side.
//! - Reports are serialized to disk; prefer adding optional fields over changing semantics.

pub mod package;
pub mod recipe;
pub mod report;
pub mod sync;

/// Schema identifiers.
pub mod schema {
    pub const PKGRECIPE_REPORT_V1: &str = "pkgrecipe.report.v1";
}

/// Fixed name of the source manifest written into the workspace root.
pub const MANIFEST_FILE_NAME: &str = "filelist.txt";

/// Default name of the recipe-definition file, excluded from synchronization.
pub const RECIPE_FILE_NAME: &str = "recipe.toml";

/// Directory (relative to the workspace) that holds orchestrator build output.
pub const BUILD_DIR_NAME: &str = "build";

/// Directory (relative to the workspace) that holds pkgrecipe's own run artifacts.
pub const STATE_DIR_NAME: &str = ".pkgrecipe";
