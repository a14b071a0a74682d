//! Recipe inputs and their one-time validation.
//!
//! Templated values arrive as a flat key/value set. They are checked once, here, and turned into
//! an immutable [`Recipe`] that every later stage receives explicitly.

use crate::requires::resolve_requires;
use camino::{Utf8Path, Utf8PathBuf};
use pkgrecipe_types::recipe::{ArtifactType, RecipeMetadata, Requirements};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Recognised recipe keys.
pub mod keys {
    pub const NAME: &str = "name";
    pub const VERSION: &str = "version";
    pub const DESCRIPTION: &str = "description";
    pub const LICENSE: &str = "license";
    pub const REQUIRES: &str = "requires";
    pub const MODULE_PATH: &str = "module_path";
    pub const ARTIFACT_TYPE: &str = "artifact_type";
    pub const ARTIFACT_NAME: &str = "artifact_name";
    pub const USER: &str = "user";
    pub const CHANNEL: &str = "channel";
    pub const URL: &str = "url";

    pub const ALL: &[&str] = &[
        NAME,
        VERSION,
        DESCRIPTION,
        LICENSE,
        REQUIRES,
        MODULE_PATH,
        ARTIFACT_TYPE,
        ARTIFACT_NAME,
        USER,
        CHANNEL,
        URL,
    ];
}

/// Prefix accepted on every key for compatibility with `conan.*` style property files.
pub const LEGACY_KEY_PREFIX: &str = "conan.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be defined")]
    Missing { key: &'static str },

    #[error("{key} must not be empty")]
    Empty { key: &'static str },

    #[error("artifact_type was defined as \"lib\" but artifact_name was not defined")]
    MissingArtifactName,

    #[error("module path {path} does not exist")]
    ModuleMissing { path: Utf8PathBuf },

    #[error("module path {path} is not a directory")]
    ModuleNotDir { path: Utf8PathBuf },

    #[error("cannot canonicalize {path}: {message}")]
    Canonicalize { path: Utf8PathBuf, message: String },

    #[error("path {path} is not valid UTF-8")]
    NonUtf8Path { path: String },

    #[error("unknown recipe key {key}")]
    UnknownKey { key: String },
}

/// Resolved key/value configuration, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeInputs {
    values: BTreeMap<String, String>,
}

impl RecipeInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; a `conan.` prefix on the key is stripped. Later inserts win.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let key = key.strip_prefix(LEGACY_KEY_PREFIX).unwrap_or(key);
        self.values.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Reject keys that no stage understands.
    pub fn check_known_keys(&self) -> Result<(), ConfigError> {
        match self.values.keys().find(|k| !keys::ALL.contains(&k.as_str())) {
            Some(key) => Err(ConfigError::UnknownKey { key: key.clone() }),
            None => Ok(()),
        }
    }

    fn required(&self, key: &'static str) -> Result<&str, ConfigError> {
        match self.get(key) {
            None => Err(ConfigError::Missing { key }),
            Some(v) if v.trim().is_empty() => Err(ConfigError::Empty { key }),
            Some(v) => Ok(v),
        }
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Validate into a [`Recipe`].
    ///
    /// `base_dir` anchors a relative `module_path` and is the module itself when `module_path`
    /// is absent (the recipe file lives inside the module it describes).
    pub fn validate(&self, base_dir: &Utf8Path) -> Result<Recipe, ConfigError> {
        let version = self.required(keys::VERSION)?.to_string();
        let artifact_type = ArtifactType::parse(self.required(keys::ARTIFACT_TYPE)?.trim());
        let artifact_name = self.optional(keys::ARTIFACT_NAME).unwrap_or_default();
        if artifact_type.is_lib() && artifact_name.is_empty() {
            return Err(ConfigError::MissingArtifactName);
        }

        let module_path = match self.optional(keys::MODULE_PATH) {
            Some(p) => {
                let p = Utf8PathBuf::from(p);
                if p.is_absolute() { p } else { base_dir.join(p) }
            }
            None => base_dir.to_path_buf(),
        };
        let module_path = canonical_dir(&module_path)?;

        let name = match self.optional(keys::NAME) {
            Some(n) => n,
            None => module_path
                .file_name()
                .map(str::to_string)
                .ok_or(ConfigError::Missing { key: keys::NAME })?,
        };

        let requirements = resolve_requires(self.get(keys::REQUIRES));
        debug!(
            name = %name,
            module = %module_path,
            requires = requirements.as_ref().map(|r| r.len()).unwrap_or(0),
            "validated recipe inputs"
        );

        Ok(Recipe {
            metadata: RecipeMetadata {
                name,
                version,
                description: self.optional(keys::DESCRIPTION).unwrap_or_default(),
                license: self.optional(keys::LICENSE).unwrap_or_default(),
                artifact_type,
                artifact_name,
                user: self.optional(keys::USER),
                channel: self.optional(keys::CHANNEL),
                url: self.optional(keys::URL),
            },
            requirements,
            module_path,
        })
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for RecipeInputs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut inputs = RecipeInputs::new();
        for (k, v) in iter {
            inputs.insert(k.as_ref(), v);
        }
        inputs
    }
}

/// Canonicalize an existing directory, keeping UTF-8 paths.
pub(crate) fn canonical_dir(path: &Utf8Path) -> Result<Utf8PathBuf, ConfigError> {
    let meta = std::fs::metadata(path).map_err(|_| ConfigError::ModuleMissing {
        path: path.to_path_buf(),
    })?;
    if !meta.is_dir() {
        return Err(ConfigError::ModuleNotDir {
            path: path.to_path_buf(),
        });
    }
    let canonical = dunce::canonicalize(path).map_err(|e| ConfigError::Canonicalize {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Utf8PathBuf::from_path_buf(canonical).map_err(|p| ConfigError::NonUtf8Path {
        path: p.display().to_string(),
    })
}

/// A validated recipe: immutable for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub metadata: RecipeMetadata,
    pub requirements: Option<Requirements>,
    /// Canonical module directory. Read-only.
    pub module_path: Utf8PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn module_dir(temp: &TempDir, name: &str) -> Utf8PathBuf {
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn lib_inputs() -> RecipeInputs {
        [
            ("version", "1.0.0"),
            ("artifact_type", "lib"),
            ("artifact_name", "hello"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn name_defaults_to_module_dir() {
        let temp = TempDir::new().unwrap();
        let dir = module_dir(&temp, "hello");
        let recipe = lib_inputs().validate(&dir).expect("valid");
        assert_eq!(recipe.metadata.name, "hello");
        assert_eq!(recipe.requirements, None);
        assert!(recipe.module_path.is_absolute());
    }

    #[test]
    fn legacy_prefix_is_accepted() {
        let temp = TempDir::new().unwrap();
        let dir = module_dir(&temp, "m");
        let inputs: RecipeInputs = [
            ("conan.version", "2.0"),
            ("conan.artifact_type", "bin"),
            ("conan.requires", "zlib/1.2.11,fmt/8.0.1"),
        ]
        .into_iter()
        .collect();
        let recipe = inputs.validate(&dir).expect("valid");
        assert_eq!(recipe.metadata.version, "2.0");
        assert_eq!(
            recipe.requirements.map(Requirements::into_vec),
            Some(vec!["zlib/1.2.11".to_string(), "fmt/8.0.1".to_string()])
        );
    }

    #[test]
    fn lib_requires_artifact_name() {
        let temp = TempDir::new().unwrap();
        let dir = module_dir(&temp, "m");
        let inputs: RecipeInputs = [("version", "1"), ("artifact_type", "lib")]
            .into_iter()
            .collect();
        assert_eq!(
            inputs.validate(&dir).unwrap_err(),
            ConfigError::MissingArtifactName
        );
    }

    #[test]
    fn other_artifact_types_need_no_name() {
        let temp = TempDir::new().unwrap();
        let dir = module_dir(&temp, "m");
        let inputs: RecipeInputs = [("version", "1"), ("artifact_type", "exe")]
            .into_iter()
            .collect();
        let recipe = inputs.validate(&dir).expect("valid");
        assert_eq!(
            recipe.metadata.artifact_type,
            ArtifactType::Other("exe".to_string())
        );
    }

    #[test]
    fn version_is_required() {
        let temp = TempDir::new().unwrap();
        let dir = module_dir(&temp, "m");
        let inputs: RecipeInputs = [("artifact_type", "exe")].into_iter().collect();
        assert_eq!(
            inputs.validate(&dir).unwrap_err(),
            ConfigError::Missing { key: "version" }
        );
    }

    #[test]
    fn blank_version_is_rejected() {
        let temp = TempDir::new().unwrap();
        let dir = module_dir(&temp, "m");
        let inputs: RecipeInputs = [("version", "  "), ("artifact_type", "exe")]
            .into_iter()
            .collect();
        assert_eq!(
            inputs.validate(&dir).unwrap_err(),
            ConfigError::Empty { key: "version" }
        );
    }

    #[test]
    fn relative_module_path_resolves_against_base() {
        let temp = TempDir::new().unwrap();
        let base = module_dir(&temp, "recipes");
        module_dir(&temp, "hello");
        let mut inputs = lib_inputs();
        inputs.insert("module_path", "../hello");
        let recipe = inputs.validate(&base).expect("valid");
        assert_eq!(recipe.module_path.file_name(), Some("hello"));
    }

    #[test]
    fn missing_module_path_is_input_error() {
        let temp = TempDir::new().unwrap();
        let base = module_dir(&temp, "recipes");
        let mut inputs = lib_inputs();
        inputs.insert("module_path", "does-not-exist");
        assert!(matches!(
            inputs.validate(&base).unwrap_err(),
            ConfigError::ModuleMissing { .. }
        ));
    }

    #[test]
    fn module_path_must_be_directory() {
        let temp = TempDir::new().unwrap();
        let base = module_dir(&temp, "recipes");
        std::fs::write(base.join("file.txt"), "x").unwrap();
        let mut inputs = lib_inputs();
        inputs.insert("module_path", "file.txt");
        assert!(matches!(
            inputs.validate(&base).unwrap_err(),
            ConfigError::ModuleNotDir { .. }
        ));
    }

    #[test]
    fn unknown_keys_are_reported() {
        let mut inputs = lib_inputs();
        inputs.insert("conan.flavour", "spicy");
        assert_eq!(
            inputs.check_known_keys().unwrap_err(),
            ConfigError::UnknownKey {
                key: "flavour".to_string()
            }
        );
        assert!(lib_inputs().check_known_keys().is_ok());
    }
}
