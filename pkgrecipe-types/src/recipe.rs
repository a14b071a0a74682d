use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of artifact a recipe produces.
///
/// Only `lib` carries meaning downstream (it registers a link-time library name);
/// every other declared value is kept verbatim for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ArtifactType {
    Lib,
    Other(String),
}

impl ArtifactType {
    pub const LIB: &'static str = "lib";

    pub fn parse(s: &str) -> Self {
        if s == Self::LIB {
            ArtifactType::Lib
        } else {
            ArtifactType::Other(s.to_string())
        }
    }

    pub fn is_lib(&self) -> bool {
        matches!(self, ArtifactType::Lib)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ArtifactType::Lib => Self::LIB,
            ArtifactType::Other(s) => s,
        }
    }
}

impl From<String> for ArtifactType {
    fn from(s: String) -> Self {
        ArtifactType::parse(&s)
    }
}

impl From<ArtifactType> for String {
    fn from(t: ArtifactType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved, immutable recipe metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeMetadata {
    pub name: String,
    pub version: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub license: String,

    pub artifact_type: ArtifactType,

    /// Library/executable base name (no extension, no `lib` prefix).
    #[serde(default)]
    pub artifact_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Ordered, non-empty list of dependency identifiers.
///
/// Absence of requirements is expressed as `Option::<Requirements>::None`, never as an
/// empty list, so a declaration can always be told apart from "no declaration".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Requirements(Vec<String>);

impl Requirements {
    /// Returns `None` when `items` is empty.
    pub fn new(items: Vec<String>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self(items))
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for Requirements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}
