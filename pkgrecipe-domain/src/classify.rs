//! Artifact classification: which build outputs go into which install bucket.
//!
//! Classification is a table of independent rules. Adding an artifact type is one more
//! [`ArtifactRule`] in [`ARTIFACT_RULES`].

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use glob::{MatchOptions, Pattern};
use pkgrecipe_types::package::{Bucket, OutputFile, PackageEntry, PackagePlan, PathLayout};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Search root for headers, relative to the build root.
pub const HEADER_ROOT: &str = "src";

#[derive(Debug, Clone, Copy)]
pub struct ArtifactRule {
    /// File-name glob, case-sensitive.
    pub pattern: &'static str,
    pub bucket: Bucket,
    pub layout: PathLayout,
    /// Only files under this directory (relative to the build root) are considered.
    pub root: Option<&'static str>,
    /// Symlinked matches are recreated as symlinks.
    pub keep_symlinks: bool,
}

const fn header(pattern: &'static str) -> ArtifactRule {
    ArtifactRule {
        pattern,
        bucket: Bucket::Include,
        layout: PathLayout::Preserve,
        root: Some(HEADER_ROOT),
        keep_symlinks: false,
    }
}

const fn flat(pattern: &'static str, bucket: Bucket, keep_symlinks: bool) -> ArtifactRule {
    ArtifactRule {
        pattern,
        bucket,
        layout: PathLayout::Flatten,
        root: None,
        keep_symlinks,
    }
}

pub static ARTIFACT_RULES: &[ArtifactRule] = &[
    header("*.h"),
    header("*.hh"),
    header("*.hpp"),
    flat("*.lib", Bucket::Lib, false),
    flat("*.dll", Bucket::Bin, false),
    flat("*.dylib*", Bucket::Lib, false),
    flat("*.so", Bucket::Lib, true),
    flat("*.a", Bucket::Lib, false),
];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Compiled rule table.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<(ArtifactRule, Pattern)>,
}

impl Classifier {
    pub fn new(rules: &[ArtifactRule]) -> anyhow::Result<Self> {
        let rules = rules
            .iter()
            .map(|r| {
                Pattern::new(r.pattern)
                    .with_context(|| format!("invalid artifact pattern {}", r.pattern))
                    .map(|p| (*r, p))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn builtin() -> anyhow::Result<Self> {
        Self::new(ARTIFACT_RULES)
    }

    /// First rule matching `file`, if any.
    pub fn classify(&self, file: &OutputFile) -> Option<&ArtifactRule> {
        let name = file.rel.file_name()?;
        self.rules
            .iter()
            .find(|(rule, pattern)| {
                rule.root.is_none_or(|root| file.rel.starts_with(root))
                    && pattern.matches_with(name, MATCH_OPTIONS)
            })
            .map(|(rule, _)| rule)
    }

    /// Map discovered outputs to package destinations. Pure.
    pub fn plan_package(&self, outputs: &[OutputFile], package_root: &Utf8Path) -> PackagePlan {
        let mut plan = PackagePlan::new(package_root.to_path_buf());
        for file in outputs {
            let Some(rule) = self.classify(file) else {
                trace!(path = %file.rel, "no artifact rule matched");
                plan.unmatched.push(file.rel.clone());
                continue;
            };
            let Some(dest) = destination(rule, file, package_root) else {
                plan.unmatched.push(file.rel.clone());
                continue;
            };
            plan.entries.push(PackageEntry {
                source: file.path.clone(),
                dest,
                bucket: rule.bucket,
                link: rule.keep_symlinks && file.is_symlink,
            });
        }
        debug!(
            entries = plan.entries.len(),
            unmatched = plan.unmatched.len(),
            "planned package"
        );
        plan
    }
}

fn destination(rule: &ArtifactRule, file: &OutputFile, package_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let bucket_dir = package_root.join(rule.bucket.dir_name());
    match rule.layout {
        PathLayout::Flatten => file.rel.file_name().map(|n| bucket_dir.join(n)),
        PathLayout::Preserve => {
            let rel = match rule.root {
                Some(root) => file.rel.strip_prefix(root).ok()?,
                None => file.rel.as_path(),
            };
            Some(bucket_dir.join(rel))
        }
    }
}

/// Files (and non-directory symlinks) under `build_root`, in sorted walk order.
///
/// Anything under one of `exclude` (typically the package root) is skipped. Symlinks are
/// reported, not followed.
pub fn scan_outputs(build_root: &Utf8Path, exclude: &[&Utf8Path]) -> anyhow::Result<Vec<OutputFile>> {
    let mut out = Vec::new();
    let walker = WalkDir::new(build_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !exclude.iter().any(|x| e.path() == x.as_std_path()));

    for entry in walker {
        let entry = entry.with_context(|| format!("walk {}", build_root))?;
        let ft = entry.file_type();
        let is_symlink = ft.is_symlink();
        if ft.is_dir() || (is_symlink && entry.path().is_dir()) {
            continue;
        }
        let path = Utf8PathBuf::from_path_buf(entry.into_path())
            .map_err(|p| anyhow::anyhow!("non UTF-8 path {}", p.display()))?;
        let rel = path
            .strip_prefix(build_root)
            .with_context(|| format!("{} is outside {}", path, build_root))?
            .to_path_buf();
        out.push(OutputFile {
            path,
            rel,
            is_symlink,
        });
    }
    Ok(out)
}
