//! Extension catalog configuration.
//!
//! The catalog lists the extensions a host wants, one `[[extension]]` table
//! per entry, in the order they should be discovered:
//!
//! ```toml
//! [[extension]]
//! name = "repository"
//!
//! [[extension]]
//! name = "agent"
//! kind = "remote-agent"
//! depends_on = ["repository"]
//! port = 7777
//! ```
//!
//! `kind` selects the factory that builds the extension and defaults to the
//! name. Keys other than the known ones are collected into `settings` and
//! passed to the factory untouched.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::extension::ExtensionInfo;

/// The canonical filename for an extension catalog.
pub const CATALOG_FILENAME: &str = "extensions.toml";

/// A parsed extension catalog.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ExtensionsConfig {
    /// Catalog entries, in discovery order.
    #[serde(default, rename = "extension")]
    pub extensions: Vec<ExtensionEntry>,
}

/// One `[[extension]]` table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExtensionEntry {
    /// Unique extension name.
    pub name: String,
    /// Factory key; falls back to `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Names of the extensions this one needs.
    #[serde(default, alias = "depends-on")]
    pub depends_on: Vec<String>,
    /// Disabled entries are skipped by discovery.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Arbitrary extension-specific settings.
    #[serde(default, flatten)]
    pub settings: HashMap<String, toml::Value>,
}

fn default_enabled() -> bool {
    true
}

impl ExtensionEntry {
    /// Create an enabled entry with no settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            depends_on: Vec::new(),
            enabled: true,
            settings: HashMap::new(),
        }
    }

    /// Add a dependency.
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on.push(name.into());
        self
    }

    /// Set the factory kind.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// The factory key for this entry.
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or(&self.name)
    }

    /// Identity of the extension this entry describes.
    pub fn info(&self) -> ExtensionInfo {
        ExtensionInfo::new(self.name.clone(), self.depends_on.iter().cloned())
    }
}

impl ExtensionsConfig {
    /// Parse and validate a catalog from TOML.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        debug!(path = %path.display(), "Loading extension catalog");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Enabled entries, in catalog order.
    pub fn enabled(&self) -> impl Iterator<Item = &ExtensionEntry> {
        self.extensions.iter().filter(|e| e.enabled)
    }

    /// Identities of the enabled entries, in catalog order.
    pub fn infos(&self) -> Vec<ExtensionInfo> {
        self.enabled().map(ExtensionEntry::info).collect()
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.extensions {
            validate_name(&entry.name)?;
            if !seen.insert(entry.name.as_str()) {
                return Err(Error::DuplicateExtension {
                    name: entry.name.clone(),
                });
            }
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidName {
            name: name.to_string(),
            reason: "extension name must not be empty".to_string(),
        });
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::InvalidName {
            name: name.to_string(),
            reason: "extension name must contain only alphanumeric characters, hyphens, or underscores"
                .to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_catalog() {
        let config = ExtensionsConfig::from_toml(
            r#"
[[extension]]
name = "repository"

[[extension]]
name = "agent"
kind = "remote-agent"
depends_on = ["repository"]
port = 7777
"#,
        )
        .unwrap();

        assert_eq!(config.extensions.len(), 2);
        let agent = &config.extensions[1];
        assert_eq!(agent.kind(), "remote-agent");
        assert_eq!(agent.depends_on, vec!["repository"]);
        assert_eq!(
            agent.settings.get("port"),
            Some(&toml::Value::Integer(7777))
        );
        assert!(
            !agent.settings.contains_key("kind"),
            "known keys must not leak into settings: {:?}",
            agent.settings
        );
    }

    #[test]
    fn test_kind_defaults_to_name() {
        let entry = ExtensionEntry::new("metrics");
        assert_eq!(entry.kind(), "metrics");
        assert_eq!(entry.with_kind("prometheus").kind(), "prometheus");
    }

    #[test]
    fn test_depends_on_kebab_alias() {
        let config = ExtensionsConfig::from_toml(
            r#"
[[extension]]
name = "a"

[[extension]]
name = "b"
depends-on = ["a"]
"#,
        )
        .unwrap();
        assert_eq!(config.extensions[1].depends_on, vec!["a"]);
    }

    #[test]
    fn test_disabled_entries_are_skipped() {
        let config = ExtensionsConfig::from_toml(
            r#"
[[extension]]
name = "on"

[[extension]]
name = "off"
enabled = false
"#,
        )
        .unwrap();
        let names: Vec<String> = config.infos().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["on"]);
    }

    #[test]
    fn test_empty_catalog() {
        let config = ExtensionsConfig::from_toml("").unwrap();
        assert!(config.extensions.is_empty());
    }

    #[test]
    fn test_invalid_name_rejected() {
        let err = ExtensionsConfig::from_toml("[[extension]]\nname = \"bad name\"\n").unwrap_err();
        assert!(matches!(err, Error::InvalidName { .. }));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = ExtensionsConfig::from_toml("[[extension]]\nname = \"\"\n").unwrap_err();
        assert!(matches!(err, Error::InvalidName { .. }));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = ExtensionsConfig::from_toml(
            "[[extension]]\nname = \"twin\"\n\n[[extension]]\nname = \"twin\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateExtension { .. }));
    }

    #[test]
    fn test_malformed_toml() {
        let err = ExtensionsConfig::from_toml("[[extension]\nname =").unwrap_err();
        assert!(matches!(err, Error::TomlDe(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = ExtensionsConfig::load(temp.path().join(CATALOG_FILENAME)).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join(CATALOG_FILENAME);
        std::fs::write(&path, "[[extension]]\nname = \"solo\"\n").unwrap();

        let config = ExtensionsConfig::load(&path).unwrap();
        assert_eq!(config.infos(), vec![ExtensionInfo::new("solo", Vec::<String>::new())]);
    }

    #[test]
    fn test_builder_entry_info() {
        let entry = ExtensionEntry::new("agent").depends_on("repository");
        assert_eq!(entry.info(), ExtensionInfo::new("agent", ["repository"]));
    }
}
