use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Kind of a filesystem entry, as seen without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
}

/// One step of a source synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncOp {
    /// Delete a stale destination entry (recursively for directories).
    Remove { path: Utf8PathBuf, kind: EntryKind },

    /// Copy a top-level module entry into the workspace.
    Copy {
        from: Utf8PathBuf,
        to: Utf8PathBuf,
        kind: EntryKind,
    },
}

impl SyncOp {
    pub fn target(&self) -> &Utf8PathBuf {
        match self {
            SyncOp::Remove { path, .. } => path,
            SyncOp::Copy { to, .. } => to,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The recipe-definition file itself.
    RecipeFile,
    /// The entry is (or encloses) the workspace; copying it would recurse into itself.
    ContainsWorkspace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: SkipReason,
}

/// Data-only description of a module-to-workspace synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPlan {
    pub module: Utf8PathBuf,
    pub workspace: Utf8PathBuf,

    #[serde(default)]
    pub ops: Vec<SyncOp>,

    #[serde(default)]
    pub skipped: Vec<SkippedEntry>,
}

impl SyncPlan {
    pub fn new(module: Utf8PathBuf, workspace: Utf8PathBuf) -> Self {
        Self {
            module,
            workspace,
            ops: vec![],
            skipped: vec![],
        }
    }

    pub fn removals(&self) -> impl Iterator<Item = &SyncOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, SyncOp::Remove { .. }))
    }

    pub fn copies(&self) -> impl Iterator<Item = &SyncOp> {
        self.ops.iter().filter(|op| matches!(op, SyncOp::Copy { .. }))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub removed: u64,
    pub copied: u64,
    pub skipped: u64,
}
