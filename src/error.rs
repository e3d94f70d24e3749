//! Error types for theme switching, configuration, and preference storage.
//!
//! None of these errors are fatal to the page. The [`ThemeManager`](crate::ThemeManager)
//! logs each one as it happens and keeps showing some theme; the `Result`
//! values exist so programmatic callers can see what went wrong.

use std::path::PathBuf;

/// Error returned by theme manager operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    /// The requested theme id is not in the catalog.
    ThemeNotFound { id: String },
    /// The preference store could not be read or written.
    PersistenceUnavailable { key: String, message: String },
    /// A stylesheet resource failed to load.
    ResourceLoadFailure { path: String, message: String },
}

impl std::fmt::Display for ThemeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemeError::ThemeNotFound { id } => write!(f, "theme not found: '{}'", id),
            ThemeError::PersistenceUnavailable { key, message } => {
                write!(f, "preference '{}' is unavailable: {}", key, message)
            }
            ThemeError::ResourceLoadFailure { path, message } => {
                write!(f, "failed to load stylesheet '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for ThemeError {}

/// Error returned when a switcher configuration is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The catalog has no themes.
    EmptyCatalog,
    /// Two catalog entries share an id.
    DuplicateTheme { id: String },
    /// The configured default theme is not in the catalog.
    UnknownDefault { id: String },
    /// The configuration source could not be parsed.
    Parse { message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EmptyCatalog => write!(f, "theme catalog is empty"),
            ConfigError::DuplicateTheme { id } => {
                write!(f, "theme '{}' is defined more than once", id)
            }
            ConfigError::UnknownDefault { id } => {
                write!(f, "default theme '{}' is not in the catalog", id)
            }
            ConfigError::Parse { message } => write!(f, "invalid configuration: {}", message),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Error returned by a [`PreferenceStore`](crate::store::PreferenceStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store is not accessible at all (disabled storage, private mode).
    Unavailable { message: String },
    /// Reading or writing the backing file failed.
    Io { path: PathBuf, message: String },
    /// The backing file exists but does not hold a key/value object.
    Corrupt { path: PathBuf, message: String },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable { message } => write!(f, "storage unavailable: {}", message),
            StoreError::Io { path, message } => {
                write!(f, "failed to access \"{}\": {}", path.display(), message)
            }
            StoreError::Corrupt { path, message } => {
                write!(f, "corrupt preference file \"{}\": {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for StoreError {}
