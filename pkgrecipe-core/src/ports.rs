//! Port traits abstracting external effects away from the pipeline.

use crate::settings::OrchestratorSettings;
use camino::Utf8Path;
use pkgrecipe_types::recipe::{RecipeMetadata, Requirements};

/// Everything the orchestrator is told about one build.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    /// For diagnostics only.
    pub metadata: &'a RecipeMetadata,
    pub requirements: Option<&'a Requirements>,
    /// Synchronized source tree.
    pub workspace: &'a Utf8Path,
    /// Where the orchestrator keeps generated files and build output.
    pub build_dir: &'a Utf8Path,
    pub settings: &'a OrchestratorSettings,
}

/// The external native build orchestrator's two-phase lifecycle.
pub trait Orchestrator {
    fn configure(&self, ctx: &BuildContext<'_>) -> anyhow::Result<()>;
    fn build(&self, ctx: &BuildContext<'_>) -> anyhow::Result<()>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
