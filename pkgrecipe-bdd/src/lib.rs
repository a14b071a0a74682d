//! BDD harness (cucumber-rs).
//!
//! Scenario tests live here, apart from the production crates. The helpers lay out a module
//! directory and an empty workspace side by side in a temp dir.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use tempfile::TempDir;

/// A module `<root>/<name>` and a workspace `<root>/ws` that does not exist yet.
#[derive(Debug)]
pub struct Layout {
    _temp: TempDir,
    pub module: Utf8PathBuf,
    pub workspace: Utf8PathBuf,
}

impl Layout {
    pub fn new(module_name: &str) -> anyhow::Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .map_err(|p| anyhow::anyhow!("non-UTF-8 temp dir {}", p.display()))?;
        let module = root.join(module_name);
        fs::create_dir_all(&module)?;
        Ok(Self {
            _temp: temp,
            module,
            workspace: root.join("ws"),
        })
    }

    /// Write `contents` to `rel` inside the module, creating parent directories.
    pub fn module_file(&self, rel: &str, contents: &str) -> anyhow::Result<()> {
        write_file(&self.module.join(rel), contents)
    }

    /// Write `contents` to `rel` inside the workspace, creating parent directories.
    pub fn workspace_file(&self, rel: &str, contents: &str) -> anyhow::Result<()> {
        write_file(&self.workspace.join(rel), contents)
    }
}

fn write_file(path: &Utf8Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}
