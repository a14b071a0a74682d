//! Recipe file loading for pkgrecipe.
//!
//! Discovers and loads `recipe.toml` from the workspace (or an explicit path), then merges
//! `--set key=value` overrides and CLI settings on top (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use pkgrecipe_core::RecipeInputs;
use pkgrecipe_core::settings::OrchestratorSettings;
use pkgrecipe_types::RECIPE_FILE_NAME;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Top-level structure of `recipe.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecipeFile {
    /// Templated recipe values, already substituted.
    pub recipe: BTreeMap<String, RecipeValue>,

    /// Orchestrator settings surface.
    pub settings: SettingsConfig,
}

/// A recipe value. Lists (e.g. `requires`) are joined with `,`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RecipeValue {
    Text(String),
    List(Vec<String>),
    Bool(bool),
    Int(i64),
}

impl RecipeValue {
    pub fn into_text(self) -> String {
        match self {
            RecipeValue::Text(s) => s,
            RecipeValue::List(items) => items.join(","),
            RecipeValue::Bool(b) => b.to_string(),
            RecipeValue::Int(i) => i.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsConfig {
    pub os: Option<String>,
    pub compiler: Option<String>,
    pub build_type: Option<String>,
    pub arch: Option<String>,
    pub shared: Option<bool>,
}

/// Find the recipe file: an explicit path wins, otherwise `<workspace>/recipe.toml` if present.
pub fn discover_recipe(workspace: &Utf8Path, explicit: Option<&Utf8Path>) -> Option<Utf8PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let path = workspace.join(RECIPE_FILE_NAME);
    if path.exists() {
        debug!("found recipe file at {}", path);
        Some(path)
    } else {
        debug!("no recipe file found at {}", path);
        None
    }
}

pub fn load_recipe(path: &Utf8Path) -> anyhow::Result<RecipeFile> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read recipe file {}", path))?;
    parse_recipe(&contents).with_context(|| format!("parse recipe file {}", path))
}

pub fn parse_recipe(contents: &str) -> anyhow::Result<RecipeFile> {
    let file: RecipeFile = toml::from_str(contents).context("invalid TOML")?;
    Ok(file)
}

/// Parse a `key=value` pair for `--set`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Recipe file, overrides, and settings folded into pipeline inputs.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub inputs: RecipeInputs,
    /// Anchor for a relative `module_path`.
    pub recipe_dir: Utf8PathBuf,
    pub orchestrator: OrchestratorSettings,
}

/// Builder for merging the recipe file with CLI arguments.
pub struct ConfigMerger {
    file: RecipeFile,
    recipe_dir: Utf8PathBuf,
}

impl ConfigMerger {
    pub fn new(file: RecipeFile, recipe_dir: Utf8PathBuf) -> Self {
        Self { file, recipe_dir }
    }

    /// `sets` are applied in order after the file's values; later entries win.
    pub fn merge(
        self,
        sets: &[(String, String)],
        build_type: Option<&str>,
        shared: bool,
    ) -> MergedConfig {
        let mut inputs = RecipeInputs::new();
        for (key, value) in self.file.recipe {
            inputs.insert(&key, value.into_text());
        }
        for (key, value) in sets {
            inputs.insert(key, value.clone());
        }

        let file_settings = self.file.settings;
        let defaults = OrchestratorSettings::default();
        let orchestrator = OrchestratorSettings {
            os: file_settings.os,
            compiler: file_settings.compiler,
            build_type: build_type
                .map(str::to_string)
                .or(file_settings.build_type)
                .unwrap_or(defaults.build_type),
            arch: file_settings.arch,
            shared: shared || file_settings.shared.unwrap_or(defaults.shared),
        };

        MergedConfig {
            inputs,
            recipe_dir: self.recipe_dir,
            orchestrator,
        }
    }
}

/// Load the recipe (if any) for `workspace` and merge CLI overrides.
pub fn load_merged(
    workspace: &Utf8Path,
    explicit: Option<&Utf8Path>,
    sets: &[(String, String)],
    build_type: Option<&str>,
    shared: bool,
) -> anyhow::Result<MergedConfig> {
    let (file, recipe_dir) = match discover_recipe(workspace, explicit) {
        Some(path) => {
            let file = load_recipe(&path)?;
            let dir = match path.parent() {
                Some(p) if !p.as_str().is_empty() => p.to_path_buf(),
                _ => Utf8PathBuf::from("."),
            };
            (file, dir)
        }
        None => (RecipeFile::default(), workspace.to_path_buf()),
    };
    Ok(ConfigMerger::new(file, recipe_dir).merge(sets, build_type, shared))
}
