//! The ordered theme catalog.
//!
//! Insertion order is display order: the selector control lists themes in
//! the order they were added, and [`Catalog::summaries`] reports them the
//! same way.

use serde::{Deserialize, Serialize};

use super::theme::{Theme, ThemeId, ThemeSummary};
use crate::error::ConfigError;

/// The fixed, ordered set of themes known at startup.
///
/// A catalog is never empty and never holds two themes with the same id.
///
/// # Example
///
/// ```rust
/// use stylesheet_switcher::{Catalog, Theme};
///
/// let catalog = Catalog::new(vec![
///     Theme::new("light", "Light", "css/light.css"),
///     Theme::new("dark", "Dark", "css/dark.css"),
/// ])
/// .unwrap();
///
/// assert_eq!(catalog.get("dark").unwrap().path(), "css/dark.css");
/// assert!(catalog.get("sepia").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Theme>", into = "Vec<Theme>")]
pub struct Catalog {
    themes: Vec<Theme>,
}

impl Catalog {
    /// Builds a catalog, rejecting empty lists and duplicate ids.
    pub fn new(themes: Vec<Theme>) -> Result<Self, ConfigError> {
        if themes.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        for (i, theme) in themes.iter().enumerate() {
            if themes[..i].iter().any(|earlier| earlier.id() == theme.id()) {
                return Err(ConfigError::DuplicateTheme {
                    id: theme.id().to_string(),
                });
            }
        }
        Ok(Self { themes })
    }

    /// The three stock themes: Professional, Dark Mode, High Contrast.
    pub fn builtin() -> Self {
        Self {
            themes: vec![
                Theme::new("style1", "Professional", "styles/style1.css"),
                Theme::new("style2", "Dark Mode", "styles/style2.css"),
                Theme::new("style3", "High Contrast", "styles/style3.css"),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Theme> {
        self.themes.iter().find(|theme| theme.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Iterates themes in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Theme> {
        self.themes.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ThemeId> {
        self.themes.iter().map(Theme::id)
    }

    /// Returns `{id, name}` pairs in display order.
    pub fn summaries(&self) -> Vec<ThemeSummary> {
        self.themes.iter().map(Theme::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    /// Always `false`: catalogs are never empty.
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TryFrom<Vec<Theme>> for Catalog {
    type Error = ConfigError;

    fn try_from(themes: Vec<Theme>) -> Result<Self, Self::Error> {
        Self::new(themes)
    }
}

impl From<Catalog> for Vec<Theme> {
    fn from(catalog: Catalog) -> Self {
        catalog.themes
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Theme;
    type IntoIter = std::slice::Iter<'a, Theme>;

    fn into_iter(self) -> Self::IntoIter {
        self.themes.iter()
    }
}
