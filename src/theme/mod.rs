//! Theme definitions and the ordered catalog.
//!
//! This module provides:
//!
//! - [`Theme`]: An id, display name, and stylesheet path
//! - [`ThemeId`]: The key a theme is selected and persisted by
//! - [`ThemeSummary`]: The `{id, name}` pair shown to users and scripts
//! - [`Catalog`]: The fixed, ordered set of themes known at startup

mod catalog;
#[allow(clippy::module_inception)]
mod theme;

pub use catalog::Catalog;
pub use theme::{Theme, ThemeId, ThemeSummary};
