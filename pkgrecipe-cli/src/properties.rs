//! Property documentation for the `pkgrecipe properties` and `pkgrecipe explain` commands.

use pkgrecipe_domain::{LEGACY_KEY_PREFIX, keys};

/// When a property must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    /// Required when `artifact_type = "lib"`.
    RequiredForLib,
    Optional,
}

impl Presence {
    pub fn label(self) -> &'static str {
        match self {
            Presence::Required => "required",
            Presence::RequiredForLib => "required for lib",
            Presence::Optional => "optional",
        }
    }
}

/// Documentation for one recipe property.
#[derive(Debug, Clone)]
pub struct PropertyDoc {
    pub key: &'static str,
    pub presence: Presence,
    /// One line, shown by `properties`.
    pub summary: &'static str,
    /// Full text, shown by `explain`.
    pub description: &'static str,
    pub example: &'static str,
}

pub static PROPERTY_REGISTRY: &[PropertyDoc] = &[
    PropertyDoc {
        key: keys::NAME,
        presence: Presence::Optional,
        summary: "Package name.",
        description: r#"The name of the package. Defaults to the file name of the module directory."#,
        example: r#"name = "hello""#,
    },
    PropertyDoc {
        key: keys::VERSION,
        presence: Presence::Required,
        summary: "Package version.",
        description: r#"The version of the package. Passed through to the orchestrator unchanged."#,
        example: r#"version = "1.0.0""#,
    },
    PropertyDoc {
        key: keys::DESCRIPTION,
        presence: Presence::Optional,
        summary: "Package description.",
        description: r#"Free-form description of the package."#,
        example: r#"description = "Greets the world""#,
    },
    PropertyDoc {
        key: keys::LICENSE,
        presence: Presence::Optional,
        summary: "Package license.",
        description: r#"License identifier reported in diagnostics and package metadata."#,
        example: r#"license = "MIT""#,
    },
    PropertyDoc {
        key: keys::REQUIRES,
        presence: Presence::Optional,
        summary: "Dependencies, as a list or a comma-separated string.",
        description: r#"The dependencies of the package. Either a TOML array or a single string with
entries separated by ",". Whitespace around entries and empty entries are ignored; order
and duplicates are kept. Entry syntax is not checked here; the orchestrator's resolver
does that.

If unspecified (or empty) the package has no dependencies."#,
        example: r#"requires = ["zlib/1.2.11", "fmt/8.0.1"]"#,
    },
    PropertyDoc {
        key: keys::MODULE_PATH,
        presence: Presence::Optional,
        summary: "Path to the module root directory.",
        description: r#"The module whose sources are mirrored into the workspace. May be relative or
absolute; relative paths are taken from the directory containing the recipe file.

If unspecified, the directory containing the recipe file is the module. The module must
be a directory and must not be the workspace itself."#,
        example: r#"module_path = "../hello""#,
    },
    PropertyDoc {
        key: keys::ARTIFACT_TYPE,
        presence: Presence::Required,
        summary: "Kind of artifact the module produces (\"lib\" or anything else).",
        description: r#"The type of artifact this module produces. "lib" means a library: its
artifact_name is registered as the library downstream consumers link against. Any other
value (for example "bin") registers no library."#,
        example: r#"artifact_type = "lib""#,
    },
    PropertyDoc {
        key: keys::ARTIFACT_NAME,
        presence: Presence::RequiredForLib,
        summary: "Library name exposed to consumers.",
        description: r#"The name of the library this module produces, without file extension and
without the "lib" prefix used on Unix systems."#,
        example: r#"artifact_name = "hello""#,
    },
    PropertyDoc {
        key: keys::USER,
        presence: Presence::Optional,
        summary: "Package user (namespace).",
        description: r#"The user part of the package reference. Recorded as metadata."#,
        example: r#"user = "acme""#,
    },
    PropertyDoc {
        key: keys::CHANNEL,
        presence: Presence::Optional,
        summary: "Package channel.",
        description: r#"The channel part of the package reference. Recorded as metadata."#,
        example: r#"channel = "stable""#,
    },
    PropertyDoc {
        key: keys::URL,
        presence: Presence::Optional,
        summary: "Project home page.",
        description: r#"Home page or repository URL of the package. Recorded as metadata."#,
        example: r#"url = "https://example.com/hello""#,
    },
];

/// Look up a property by key. The `conan.` prefix is accepted.
pub fn lookup_property(key: &str) -> Option<&'static PropertyDoc> {
    let key = key.strip_prefix(LEGACY_KEY_PREFIX).unwrap_or(key);
    PROPERTY_REGISTRY.iter().find(|p| p.key == key)
}

pub fn list_property_keys() -> Vec<&'static str> {
    PROPERTY_REGISTRY.iter().map(|p| p.key).collect()
}
