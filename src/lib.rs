//! # Stylesheet Switcher
//!
//! Lets visitors pick one of a fixed set of page themes, remembers the
//! choice, and re-applies it on later visits.
//!
//! ## Core Concepts
//!
//! - [`Theme`]: An id, a display name, and the path of its stylesheet
//! - [`Catalog`]: The fixed, ordered list of themes offered
//! - [`SwitcherConfig`]: Catalog plus storage key, default theme, and element ids
//! - [`ThemeManager`]: Applies, persists, and displays the selected theme
//! - [`Document`](document::Document): The page, as the manager sees it
//! - [`PreferenceStore`](store::PreferenceStore): Where the choice is kept
//!
//! ## Quick Start
//!
//! ```rust
//! use stylesheet_switcher::document::MemoryDocument;
//! use stylesheet_switcher::store::MemoryStore;
//! use stylesheet_switcher::{SwitcherConfig, ThemeManager};
//!
//! let document = MemoryDocument::new();
//! let manager = ThemeManager::new(SwitcherConfig::default(), document.clone(), MemoryStore::new())
//!     .unwrap();
//!
//! manager.init();
//! assert_eq!(manager.selected(), "style1");
//!
//! // What the selector's change event does:
//! manager.switch_theme("style3").unwrap();
//! assert_eq!(
//!     document.stylesheet("dynamicStylesheet").as_deref(),
//!     Some("styles/style3.css")
//! );
//! ```
//!
//! ## In the Browser
//!
//! On `wasm32` targets the switcher starts itself as soon as the module is
//! initialized, backed by the live DOM and `localStorage`. The exported
//! `StyleSwitcher` class is a handle to that running switcher:
//!
//! ```js
//! import init, { StyleSwitcher } from "./stylesheet_switcher.js";
//! await init(); // applies the saved theme, mounts the selector
//! const switcher = new StyleSwitcher();
//! switcher.switch("style2");
//! switcher.getCurrent();   // "style2"
//! switcher.getAvailable(); // [{ id: "style1", name: "Professional" }, ...]
//! ```
//!
//! ## Logging
//!
//! Diagnostics go through [`tracing`]. The crate never installs a
//! subscriber; hosts that want the output install their own.

pub mod config;
pub mod document;
mod error;
pub mod manager;
pub mod markup;
pub mod store;
mod theme;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{ElementIds, SwitcherConfig, DEFAULT_STORAGE_KEY, DEFAULT_THEME};
pub use error::{ConfigError, StoreError, ThemeError};
pub use manager::ThemeManager;
pub use theme::{Catalog, Theme, ThemeId, ThemeSummary};
