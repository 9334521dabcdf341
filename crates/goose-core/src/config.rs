//! Service configuration: the named, URL-bound processing targets loaded
//! from `service-config.yaml` at startup and read-only thereafter.

use crate::error::GooseError;
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// One named processing target: the status "context" name, the statuses URL
/// template (containing a literal `{sha}` placeholder), and path filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub name: String,
    pub url: String,
    pub file_patterns: Vec<String>,
}

impl ConfigEntry {
    /// Patterns containing `*` are dropped at construction; only literal
    /// paths are ever stored or matched.
    // TODO: wildcard entries are silently discarded instead of being compiled
    // into glob matchers; revisit once the intended filter semantics are
    // confirmed.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        raw_patterns: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            file_patterns: raw_patterns
                .into_iter()
                .filter(|p| !p.contains('*'))
                .collect(),
        }
    }

    /// Literal path match against the stored patterns. An entry with no
    /// patterns matches every path.
    pub fn matches_path(&self, path: &str) -> bool {
        self.file_patterns.is_empty() || self.file_patterns.iter().any(|p| p == path)
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    name: String,
    url: String,
    #[serde(default, rename = "filePatterns")]
    file_patterns: Vec<String>,
}

/// Load the ordered entry list from a YAML file.
///
/// Expected shape: a list of `{name, url, filePatterns?}` mappings.
pub fn load_service_config(path: &Path) -> Result<Vec<ConfigEntry>, GooseError> {
    let text = std::fs::read_to_string(path).map_err(|e| GooseError::Config {
        message: format!("failed to read {}: {e}", path.display()),
    })?;
    let raw: Vec<RawEntry> = serde_yaml::from_str(&text).map_err(|e| GooseError::Config {
        message: format!("failed to parse {}: {e}", path.display()),
    })?;

    let entries: Vec<ConfigEntry> = raw
        .into_iter()
        .map(|e| ConfigEntry::new(e.name, e.url, e.file_patterns))
        .collect();

    for entry in &entries {
        if !entry.url.contains("{sha}") {
            warn!(
                "config entry '{}' has no {{sha}} placeholder in its url",
                entry.name
            );
        }
    }

    Ok(entries)
}
