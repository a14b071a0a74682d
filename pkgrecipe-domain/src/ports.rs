use anyhow::Context;
use camino::Utf8Path;
use fs_err as fs;
use pkgrecipe_types::sync::EntryKind;

/// A directory entry as reported by a [`TreeView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub kind: EntryKind,
}

/// Read-only view of a directory tree.
///
/// The sync planner only ever reads through this trait, so plans can be computed against an
/// in-memory tree in tests.
pub trait TreeView {
    /// Lists the immediate children of `dir`. Order is unspecified.
    fn list_dir(&self, dir: &Utf8Path) -> anyhow::Result<Vec<DirEntryInfo>>;

    /// Kind of the entry at `path` without following symlinks, or `None` if nothing is there.
    fn entry_kind(&self, path: &Utf8Path) -> Option<EntryKind>;
}

/// File-system backed `TreeView`.
#[derive(Debug, Clone, Default)]
pub struct FsTreeView;

fn kind_of(ft: std::fs::FileType) -> EntryKind {
    if ft.is_symlink() {
        EntryKind::Symlink
    } else if ft.is_dir() {
        EntryKind::Dir
    } else {
        EntryKind::File
    }
}

impl TreeView for FsTreeView {
    fn list_dir(&self, dir: &Utf8Path) -> anyhow::Result<Vec<DirEntryInfo>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("read_dir {}", dir))? {
            let entry = entry.with_context(|| format!("read entry in {}", dir))?;
            let name = entry.file_name().into_string().map_err(|raw| {
                anyhow::anyhow!("non UTF-8 entry name {:?} in {}", raw, dir)
            })?;
            let ft = entry
                .file_type()
                .with_context(|| format!("file type of {}", dir.join(&name)))?;
            out.push(DirEntryInfo {
                name,
                kind: kind_of(ft),
            });
        }
        Ok(out)
    }

    fn entry_kind(&self, path: &Utf8Path) -> Option<EntryKind> {
        std::fs::symlink_metadata(path)
            .ok()
            .map(|m| kind_of(m.file_type()))
    }
}
