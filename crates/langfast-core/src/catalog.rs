//! Static model catalog served by `GET /v1/models`.
//!
//! The catalog is loaded once at startup, either from a JSON file or from the
//! built-in list, and never changes afterwards.

use std::path::{Path, PathBuf};

use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

const BUILTIN_MODELS: &str = include_str!("default_models.json");

/// One model the backend can run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Model identifier accepted in chat completion requests.
    pub slug: String,
    /// Vendor name, reported as `owned_by`.
    pub provider: String,
    /// Release time in epoch milliseconds. Files may also use RFC 3339.
    #[serde(deserialize_with = "timestamp_millis")]
    pub created_at: i64,
}

impl CatalogEntry {
    /// Creation time in whole epoch seconds, rounded toward negative infinity.
    pub const fn created_secs(&self) -> i64 {
        self.created_at.div_euclid(1000)
    }
}

/// Errors that can occur while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("Failed to read model catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not a JSON array of entries.
    #[error("Invalid model catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Ordered list of catalog entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelCatalog {
    entries: Vec<CatalogEntry>,
}

impl ModelCatalog {
    pub const fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Parse a JSON array of entries.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    /// Load a catalog file.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        tracing::debug!(path = %path.display(), models = catalog.len(), "Loaded model catalog");
        Ok(catalog)
    }

    /// The catalog shipped with the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_MODELS)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn timestamp_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Millis(ms) => Ok(ms),
        Raw::Text(text) => {
            if let Ok(ms) = text.trim().parse::<i64>() {
                return Ok(ms);
            }
            DateTime::parse_from_rfc3339(text.trim())
                .map(|dt| dt.timestamp_millis())
                .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{text}': {e}")))
        }
    }
}
