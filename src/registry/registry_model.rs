use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::field::field_types::FieldType;

/// Board name under which cross-platform fallback entries live.
pub const GENERIC_BOARD: &str = "generic";

const BUILTIN_REGISTRY: &str = include_str!("default_registry.yaml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Active,
    /// Still tried, but known to be flaky on its board.
    Degraded,
    /// Kept for history; never participates in resolution.
    Deprecated,
}

/// One declarative selector rule: "on board B, these selectors mean type T".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub id: String,
    pub board: String,
    pub field_type: FieldType,
    /// Tried in order; first structural match wins.
    pub selectors: Vec<String>,
    /// Lower is tried first.
    pub priority: i32,
    pub status: EntryStatus,
    /// ISO date the entry was added.
    #[serde(default)]
    pub added: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RegistryEntry {
    pub fn is_generic(&self) -> bool {
        self.board == GENERIC_BOARD
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read registry {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid registry YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid registry JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("registry entry #{index} has an empty id")]
    EmptyId { index: usize },

    #[error("duplicate registry entry id \"{id}\"")]
    DuplicateId { id: String },

    #[error("registry entry \"{id}\" has no selectors")]
    NoSelectors { id: String },

    #[error("registry entry \"{id}\" maps to fieldType \"unknown\"")]
    UnknownFieldType { id: String },
}

/// Serialized form of a registry file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    pub entries: Vec<RegistryEntry>,
}

impl Registry {
    /// The registry compiled into the crate.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_yaml(BUILTIN_REGISTRY)
    }

    /// Accepts either `{ entries: [...] }` or a bare list of entries.
    ///
    /// The top-level shape picks the form, so a bad entry reports its own
    /// error rather than a shape mismatch.
    pub fn from_yaml(content: &str) -> Result<Self, RegistryError> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        let registry = if value.is_sequence() {
            Registry {
                entries: serde_yaml::from_value(value)?,
            }
        } else {
            serde_yaml::from_value(value)?
        };
        registry.validate()?;
        Ok(registry)
    }

    pub fn from_json(content: &str) -> Result<Self, RegistryError> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let registry = if value.is_array() {
            Registry {
                entries: serde_json::from_value(value)?,
            }
        } else {
            serde_json::from_value(value)?
        };
        registry.validate()?;
        Ok(registry)
    }

    /// Load by extension: `.json` is parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut ids = HashSet::new();
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.id.trim().is_empty() {
                return Err(RegistryError::EmptyId { index });
            }
            if !ids.insert(entry.id.as_str()) {
                return Err(RegistryError::DuplicateId {
                    id: entry.id.clone(),
                });
            }
            if entry.selectors.is_empty() {
                return Err(RegistryError::NoSelectors {
                    id: entry.id.clone(),
                });
            }
            if entry.field_type == FieldType::Unknown {
                return Err(RegistryError::UnknownFieldType {
                    id: entry.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// SHA-1 over the canonical JSON of the entries.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.entries)
    }

    /// Distinct board names, in first-seen order.
    pub fn boards(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(|e| e.board.as_str())
            .filter(|b| seen.insert(*b))
            .collect()
    }
}

/// Identifies the registry configuration a decision was made with.
pub fn fingerprint(entries: &[RegistryEntry]) -> String {
    use sha1::{Digest, Sha1};

    // Serializing plain data with string keys cannot fail
    let canonical = serde_json::to_string(entries).unwrap_or_default();
    let mut hasher = Sha1::new();
    hasher.update(canonical.as_bytes());
    format!("{:x}", hasher.finalize())
}
