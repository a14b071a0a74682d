//! Clap-free settings for the build, package, and clean pipelines.

use camino::Utf8PathBuf;
use pkgrecipe_domain::RecipeInputs;
use pkgrecipe_types::RECIPE_FILE_NAME;

/// Settings surface handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub os: Option<String>,
    pub compiler: Option<String>,
    pub build_type: String,
    pub arch: Option<String>,
    pub shared: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            os: None,
            compiler: None,
            build_type: "Release".to_string(),
            arch: None,
            shared: false,
        }
    }
}

/// Settings for `run_build`.
#[derive(Debug, Clone)]
pub struct RecipeSettings {
    /// Directory the module is mirrored into. Created if missing.
    pub workspace: Utf8PathBuf,
    /// Anchor for a relative `module_path` (the directory holding the recipe file).
    pub recipe_dir: Utf8PathBuf,
    /// Module entry with this name is never copied.
    pub recipe_file_name: String,
    pub inputs: RecipeInputs,
    pub orchestrator: OrchestratorSettings,
    pub write_report: bool,
}

impl Default for RecipeSettings {
    fn default() -> Self {
        Self {
            workspace: Utf8PathBuf::from("."),
            recipe_dir: Utf8PathBuf::from("."),
            recipe_file_name: RECIPE_FILE_NAME.to_string(),
            inputs: RecipeInputs::default(),
            orchestrator: OrchestratorSettings::default(),
            write_report: true,
        }
    }
}

/// Settings for `run_package`.
#[derive(Debug, Clone)]
pub struct PackageSettings {
    /// Build output tree to classify.
    pub workspace: Utf8PathBuf,
    pub recipe_dir: Utf8PathBuf,
    pub inputs: RecipeInputs,
    /// Where `include/`, `lib/` and `bin/` are created. Relative paths are taken from the
    /// workspace; `None` means `<workspace>/package`.
    pub package_root: Option<Utf8PathBuf>,
    pub write_report: bool,
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            workspace: Utf8PathBuf::from("."),
            recipe_dir: Utf8PathBuf::from("."),
            inputs: RecipeInputs::default(),
            package_root: None,
            write_report: true,
        }
    }
}

/// Settings for `run_clean`.
#[derive(Debug, Clone)]
pub struct CleanSettings {
    pub workspace: Utf8PathBuf,
}

impl Default for CleanSettings {
    fn default() -> Self {
        Self {
            workspace: Utf8PathBuf::from("."),
        }
    }
}
