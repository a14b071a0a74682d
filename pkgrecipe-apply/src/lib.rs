//! Executes plans produced by `pkgrecipe-domain` against the real filesystem.
//!
//! Sync and manifest writes are fail-fast: the first error aborts and is returned. Packaging is
//! best-effort: every entry is attempted and failures are collected.

pub mod error;

pub use error::{ApplyError, ApplyResult};

use camino::Utf8Path;
use fs_err as fs;
use pkgrecipe_domain::render_manifest;
use pkgrecipe_types::package::{PackageEntry, PackageFailure, PackageOutcome, PackagePlan};
use pkgrecipe_types::sync::{EntryKind, SyncOp, SyncPlan, SyncSummary};
use tracing::{debug, warn};

/// Run every op of `plan` in order, stopping at the first failure.
pub fn apply_sync(plan: &SyncPlan) -> ApplyResult<SyncSummary> {
    let mut summary = SyncSummary {
        skipped: plan.skipped.len() as u64,
        ..SyncSummary::default()
    };

    for op in &plan.ops {
        match op {
            SyncOp::Remove { path, kind } => {
                debug!(path = %path, ?kind, "removing stale entry");
                remove_entry(path, *kind).map_err(|source| ApplyError::Remove {
                    path: path.clone(),
                    source,
                })?;
                summary.removed += 1;
            }
            SyncOp::Copy { from, to, kind } => {
                debug!(from = %from, to = %to, ?kind, "copying entry");
                copy_entry(from, to, *kind).map_err(|source| ApplyError::Copy {
                    from: from.clone(),
                    to: to.clone(),
                    source,
                })?;
                summary.copied += 1;
            }
        }
    }

    Ok(summary)
}

fn remove_entry(path: &Utf8Path, kind: EntryKind) -> std::io::Result<()> {
    match kind {
        EntryKind::Dir => fs::remove_dir_all(path),
        EntryKind::File | EntryKind::Symlink => remove_link_or_file(path),
    }
}

// Directory symlinks on Windows are removed with remove_dir.
fn remove_link_or_file(path: &Utf8Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if cfg!(windows) && path.is_dir() => fs::remove_dir(path).map_err(|_| e),
        other => other,
    }
}

fn copy_entry(from: &Utf8Path, to: &Utf8Path, kind: EntryKind) -> std::io::Result<()> {
    match kind {
        EntryKind::Dir => copy_tree(from.as_std_path(), to.as_std_path()),
        EntryKind::File => fs::copy(from, to).map(|_| ()),
        EntryKind::Symlink => copy_symlink(from.as_std_path(), to.as_std_path()),
    }
}

/// Recursively copy `src` into `dst`, recreating symlinks rather than following them.
pub fn copy_tree(src: &std::path::Path, dst: &std::path::Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let ty = entry.file_type()?;
        let dst_path = dst.join(entry.file_name());
        if ty.is_symlink() {
            copy_symlink(&entry.path(), &dst_path)?;
        } else if ty.is_dir() {
            copy_tree(&entry.path(), &dst_path)?;
        } else {
            fs::copy(entry.path(), dst_path)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &std::path::Path, dst: &std::path::Path) -> std::io::Result<()> {
    let target = fs::read_link(src)?;
    fs_err::os::unix::fs::symlink(target, dst)
}

// Without portable symlink creation the link's target contents are copied instead.
#[cfg(not(unix))]
fn copy_symlink(src: &std::path::Path, dst: &std::path::Path) -> std::io::Result<()> {
    if src.is_dir() {
        copy_tree(src, dst)
    } else {
        fs::copy(src, dst).map(|_| ())
    }
}

/// Write `entries` to `path`, one per line, replacing any previous content.
pub fn write_manifest(path: &Utf8Path, entries: &[String]) -> ApplyResult<()> {
    fs::write(path, render_manifest(entries)).map_err(|source| ApplyError::Manifest {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path, files = entries.len(), "wrote manifest");
    Ok(())
}

/// Copy every planned entry into the package root.
///
/// Failures are logged and collected; they never stop the remaining entries. When two entries
/// share a destination, the later one wins.
pub fn apply_package(plan: &PackagePlan) -> PackageOutcome {
    let mut outcome = PackageOutcome::default();
    for entry in &plan.entries {
        match package_entry(entry) {
            Ok(()) => {
                debug!(src = %entry.source, dest = %entry.dest, bucket = %entry.bucket, "packaged");
                outcome.packaged.push(entry.clone());
            }
            Err(e) => {
                warn!(src = %entry.source, dest = %entry.dest, error = %e, "failed to package artifact");
                outcome.failures.push(PackageFailure {
                    source: entry.source.clone(),
                    dest: entry.dest.clone(),
                    message: e.to_string(),
                });
            }
        }
    }
    outcome
}

fn package_entry(entry: &PackageEntry) -> std::io::Result<()> {
    if let Some(parent) = entry.dest.parent() {
        fs::create_dir_all(parent)?;
    }
    // Copying a file onto itself truncates it.
    if same_entry(&entry.source, &entry.dest) {
        debug!(src = %entry.source, dest = %entry.dest, "source is already in place");
        return Ok(());
    }
    // fs::copy writes through an existing symlink; replace it instead.
    if is_symlink(&entry.dest) || (entry.link && entry.dest.exists()) {
        remove_link_or_file(&entry.dest)?;
    }
    if entry.link {
        copy_symlink(entry.source.as_std_path(), entry.dest.as_std_path())
    } else {
        fs::copy(&entry.source, &entry.dest).map(|_| ())
    }
}

/// Whether `a` and `b` name the same directory entry once their parent directories are resolved.
/// The final component is not followed, so a symlink and its target are different entries.
fn same_entry(a: &Utf8Path, b: &Utf8Path) -> bool {
    fn resolved(p: &Utf8Path) -> Option<std::path::PathBuf> {
        let parent = dunce::canonicalize(p.parent()?).ok()?;
        Some(parent.join(p.file_name()?))
    }
    match (resolved(a), resolved(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn is_symlink(path: &Utf8Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Remove `path` (recursively for directories) if it exists. Returns whether anything was removed.
pub fn remove_if_exists(path: &Utf8Path) -> std::io::Result<bool> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if meta.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        remove_link_or_file(path)?;
    }
    debug!(path = %path, "removed");
    Ok(true)
}
