use crate::package::PackageFailure;
use crate::sync::SyncSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Advisory record of one `build` or `package` run, written to `.pkgrecipe/report.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeReport {
    pub schema: String,
    pub run_id: Uuid,
    pub tool: ToolInfo,
    pub run: RunInfo,
    pub recipe: RecipeRef,
    pub command: RunCommand,
    pub verdict: Verdict,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_files: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageCounts>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub package_failures: Vec<PackageFailure>,
}

impl RecipeReport {
    pub fn new(tool: ToolInfo, recipe: RecipeRef, command: RunCommand) -> Self {
        Self {
            schema: crate::schema::PKGRECIPE_REPORT_V1.to_string(),
            run_id: Uuid::new_v4(),
            tool,
            run: RunInfo {
                started_at: Some(Utc::now()),
                ended_at: None,
            },
            recipe,
            command,
            verdict: Verdict::default(),
            sync: None,
            manifest_files: None,
            package: None,
            package_failures: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeRef {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunCommand {
    Build,
    Package,
}

/// Last lifecycle phase a run reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Validate,
    Sync,
    Manifest,
    Configure,
    Build,
    Package,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Validate => "validate",
            Phase::Sync => "sync",
            Phase::Manifest => "manifest",
            Phase::Configure => "configure",
            Phase::Build => "build",
            Phase::Package => "package",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Pass,
    /// Completed, but some artifacts could not be packaged.
    Warn,
    Fail,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Verdict {
    #[serde(default)]
    pub status: VerdictStatus,

    #[serde(default)]
    pub phase: Phase,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageCounts {
    pub include: u64,
    pub lib: u64,
    pub bin: u64,
    pub unmatched: u64,
    pub failed: u64,
}
