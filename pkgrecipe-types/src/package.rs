use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Install destination for a classified artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Include,
    Lib,
    Bin,
}

impl Bucket {
    pub fn dir_name(self) -> &'static str {
        match self {
            Bucket::Include => "include",
            Bucket::Lib => "lib",
            Bucket::Bin => "bin",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// How a matched file's path is laid out inside its bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathLayout {
    /// Keep the path relative to the rule's search root.
    Preserve,
    /// Drop all directories; only the file name is kept.
    Flatten,
}

/// A file discovered in the build output tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    pub path: Utf8PathBuf,
    /// Path relative to the build root.
    pub rel: Utf8PathBuf,
    #[serde(default)]
    pub is_symlink: bool,
}

/// One planned copy into the package root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    pub source: Utf8PathBuf,
    pub dest: Utf8PathBuf,
    pub bucket: Bucket,
    /// Recreate `source` as a symlink at `dest` instead of copying its contents.
    #[serde(default)]
    pub link: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagePlan {
    pub package_root: Utf8PathBuf,

    #[serde(default)]
    pub entries: Vec<PackageEntry>,

    /// Output files that matched no rule (relative to the build root).
    #[serde(default)]
    pub unmatched: Vec<Utf8PathBuf>,
}

impl PackagePlan {
    pub fn new(package_root: Utf8PathBuf) -> Self {
        Self {
            package_root,
            entries: vec![],
            unmatched: vec![],
        }
    }

    pub fn in_bucket(&self, bucket: Bucket) -> impl Iterator<Item = &PackageEntry> {
        self.entries.iter().filter(move |e| e.bucket == bucket)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageFailure {
    pub source: Utf8PathBuf,
    pub dest: Utf8PathBuf,
    pub message: String,
}

/// Result of best-effort packaging: every entry lands in exactly one of the two lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageOutcome {
    #[serde(default)]
    pub packaged: Vec<PackageEntry>,

    #[serde(default)]
    pub failures: Vec<PackageFailure>,
}

impl PackageOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Information exposed to downstream consumers of the package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Library names to link against. Empty unless the recipe builds a `lib`.
    #[serde(default)]
    pub libs: Vec<String>,
}
