use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Replace platform separators with `/`.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Every regular file under `src_dir`, in walk order.
///
/// Directories are visited depth-first with siblings in file-name order, so the same tree
/// always yields the same listing. Symlinks are neither followed nor listed. Paths are
/// `src_dir` joined with the file's relative path. A missing `src_dir` yields an empty list.
pub fn collect_manifest(src_dir: &Utf8Path) -> anyhow::Result<Vec<String>> {
    if std::fs::symlink_metadata(src_dir).is_err() {
        debug!(dir = %src_dir, "no source directory; manifest is empty");
        return Ok(vec![]);
    }

    let mut out = Vec::new();
    for entry in WalkDir::new(src_dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk {}", src_dir))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = Utf8PathBuf::from_path_buf(entry.into_path())
            .map_err(|p| anyhow::anyhow!("non UTF-8 path {}", p.display()))?;
        out.push(normalize_separators(path.as_str()));
    }

    debug!(dir = %src_dir, files = out.len(), "collected manifest");
    Ok(out)
}

/// Render manifest entries as newline-terminated lines.
pub fn render_manifest(entries: &[String]) -> String {
    let mut out = String::with_capacity(entries.iter().map(|e| e.len() + 1).sum());
    for entry in entries {
        out.push_str(entry);
        out.push('\n');
    }
    out
}
