//! Theme and theme identifier types.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// The key a theme is selected, persisted, and looked up by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeId(String);

impl ThemeId {
    /// Creates an id from any string. Whether it names a real theme is
    /// decided by the [`Catalog`](super::Catalog), not here.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ThemeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ThemeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ThemeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ThemeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ThemeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for ThemeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ThemeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A named, addressable stylesheet.
///
/// # Example
///
/// ```rust
/// use stylesheet_switcher::Theme;
///
/// let theme = Theme::new("style2", "Dark Mode", "styles/style2.css");
/// assert_eq!(theme.id(), "style2");
/// assert_eq!(theme.path(), "styles/style2.css");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    id: ThemeId,
    name: String,
    path: String,
}

impl Theme {
    pub fn new(id: impl Into<ThemeId>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn id(&self) -> &ThemeId {
        &self.id
    }

    /// Display name shown in the selector control.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resource path of the theme's stylesheet, used as the link `href`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn summary(&self) -> ThemeSummary {
        ThemeSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// The `{id, name}` view of a theme exposed to scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSummary {
    pub id: ThemeId,
    pub name: String,
}
