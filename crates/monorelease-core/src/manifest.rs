use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ManifestError;
use crate::types::DependencyScope;

/// Parsed npm package manifest, limited to the fields the release core
/// cares about. Everything else is carried verbatim in `extra` so a
/// rewrite never drops data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub dependencies: IndexMap<String, String>,

    #[serde(
        default,
        rename = "devDependencies",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub dev_dependencies: IndexMap<String, String>,

    #[serde(
        default,
        rename = "peerDependencies",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub peer_dependencies: IndexMap<String, String>,

    #[serde(
        default,
        rename = "optionalDependencies",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub optional_dependencies: IndexMap<String, String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Manifest {
    /// Creates an empty manifest for the given package name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            dependencies: IndexMap::new(),
            dev_dependencies: IndexMap::new(),
            peer_dependencies: IndexMap::new(),
            optional_dependencies: IndexMap::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// # Errors
    ///
    /// Returns `ManifestError::Parse` if the raw text is not a valid
    /// manifest object.
    pub fn parse(raw: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(raw).map_err(|source| ManifestError::Parse { source })
    }

    #[must_use]
    pub fn scope(&self, scope: DependencyScope) -> &IndexMap<String, String> {
        match scope {
            DependencyScope::Runtime => &self.dependencies,
            DependencyScope::Dev => &self.dev_dependencies,
            DependencyScope::Peer => &self.peer_dependencies,
            DependencyScope::Optional => &self.optional_dependencies,
        }
    }

    pub fn scope_mut(&mut self, scope: DependencyScope) -> &mut IndexMap<String, String> {
        match scope {
            DependencyScope::Runtime => &mut self.dependencies,
            DependencyScope::Dev => &mut self.dev_dependencies,
            DependencyScope::Peer => &mut self.peer_dependencies,
            DependencyScope::Optional => &mut self.optional_dependencies,
        }
    }

    /// Serializes the manifest following a previously detected format.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Render` if serialization fails.
    pub fn render(&self, format: &ManifestFormat) -> Result<String, ManifestError> {
        self.serialize_value(self, format)
    }

    /// Serializes the manifest by rewriting this manifest's dependency
    /// scope values into the re-parsed original text, so the file keeps
    /// its exact key order; only range values change.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Parse` if `raw` is not a valid manifest
    /// object, or `ManifestError::Render` if serialization fails.
    pub fn render_updated(
        &self,
        raw: &str,
        format: &ManifestFormat,
    ) -> Result<String, ManifestError> {
        let mut document: serde_json::Value =
            serde_json::from_str(raw).map_err(|source| ManifestError::Parse { source })?;

        if let Some(object) = document.as_object_mut() {
            for scope in DependencyScope::ALL {
                let entries = self.scope(scope);
                if entries.is_empty() {
                    continue;
                }
                let Some(serde_json::Value::Object(declared)) =
                    object.get_mut(scope.manifest_key())
                else {
                    continue;
                };
                for (dep_name, range) in entries {
                    if let Some(slot) = declared.get_mut(dep_name) {
                        *slot = serde_json::Value::String(range.clone());
                    }
                }
            }
        }

        self.serialize_value(&document, format)
    }

    fn serialize_value<T: Serialize>(
        &self,
        value: &T,
        format: &ManifestFormat,
    ) -> Result<String, ManifestError> {
        let render_err = |source| ManifestError::Render {
            package: self.name.clone(),
            source,
        };

        let mut text = if format.indent.is_empty() {
            serde_json::to_string(value).map_err(render_err)?
        } else {
            let mut buf = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(format.indent.as_bytes());
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            value.serialize(&mut ser).map_err(render_err)?;
            // PrettyFormatter only ever emits the indent string and JSON
            // punctuation, both valid UTF-8.
            String::from_utf8_lossy(&buf).into_owned()
        };

        text.push_str(&format.trailing);
        Ok(text)
    }
}

/// Indentation and trailing-whitespace convention of an on-disk manifest,
/// detected so a rewrite preserves the file's original style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFormat {
    pub indent: String,
    pub trailing: String,
}

impl Default for ManifestFormat {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            trailing: "\n".to_string(),
        }
    }
}

impl ManifestFormat {
    /// Detects the indent unit (leading whitespace of the first indented
    /// line) and the trailing whitespace after the last non-whitespace
    /// character.
    #[must_use]
    pub fn detect(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }

        let indent = raw
            .lines()
            .find_map(|line| {
                let trimmed = line.trim_start();
                if trimmed.is_empty() || trimmed.len() == line.len() {
                    None
                } else {
                    Some(line[..line.len() - trimmed.len()].to_string())
                }
            })
            .unwrap_or_default();

        let trailing = raw[raw.trim_end().len()..].to_string();

        Self { indent, trailing }
    }
}
