//! Switcher configuration.
//!
//! [`SwitcherConfig`] is the single immutable value a [`ThemeManager`](crate::ThemeManager)
//! is built from: the catalog, the default theme, the storage key, and the
//! element ids the switcher owns in the document. Every field has a default,
//! so a configuration file only needs to name what it changes.
//!
//! ```yaml
//! storage_key: siteTheme
//! default_theme: light
//! themes:
//!   - { id: light, name: Light, path: css/light.css }
//!   - { id: dark, name: Dark, path: css/dark.css }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::theme::{Catalog, ThemeId};

/// Storage key the selected theme id is persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "selectedStylesheet";

/// Theme used when nothing (valid) has been persisted.
pub const DEFAULT_THEME: &str = "style1";

/// Ids of the document elements owned by the switcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    /// The injected `<link rel="stylesheet">`.
    pub stylesheet: String,
    /// The container wrapping the label and select.
    pub container: String,
    /// The `<select>` element.
    pub select: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            stylesheet: "dynamicStylesheet".to_string(),
            container: "styleSwitcher".to_string(),
            select: "styleSelect".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitcherConfig {
    pub storage_key: String,
    pub default_theme: ThemeId,
    pub elements: ElementIds,
    /// Visible label text next to the select.
    pub label: String,
    pub aria_label: String,
    pub themes: Catalog,
}

impl Default for SwitcherConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_theme: ThemeId::from(DEFAULT_THEME),
            elements: ElementIds::default(),
            label: "Theme:".to_string(),
            aria_label: "Select theme".to_string(),
            themes: Catalog::builtin(),
        }
    }
}

impl SwitcherConfig {
    /// Builds a configuration around a custom catalog, keeping every other default.
    ///
    /// The default theme becomes the first catalog entry.
    pub fn with_catalog(themes: Catalog) -> Self {
        let default_theme = themes
            .iter()
            .next()
            .map(|theme| theme.id().clone())
            .unwrap_or_else(|| ThemeId::from(DEFAULT_THEME));
        Self {
            default_theme,
            themes,
            ..Self::default()
        }
    }

    /// Parses and validates a YAML configuration.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(source).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the default theme is in the catalog.
    ///
    /// The catalog itself is validated when it is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.themes.contains(self.default_theme.as_str()) {
            return Err(ConfigError::UnknownDefault {
                id: self.default_theme.to_string(),
            });
        }
        Ok(())
    }
}
