//! Document adapter.
//!
//! The [`ThemeManager`](crate::ThemeManager) never touches a DOM directly.
//! Everything it does to the page goes through [`Document`]:
//!
//! - one stylesheet link, replaced on every theme change
//! - one selector control, mounted once and kept in sync
//! - readiness, so the control is mounted only after the body is parsed
//!
//! [`MemoryDocument`] implements the trait in memory for tests and
//! server-side rendering; the `web` module implements it over `web-sys` on
//! wasm32 targets.

mod memory;

pub use memory::MemoryDocument;

use serde::Serialize;
use std::rc::Rc;

use crate::config::SwitcherConfig;

/// Handler invoked with the newly selected option value.
pub type ChangeHandler = Rc<dyn Fn(&str)>;

/// Callback invoked once a stylesheet load settles.
pub type LoadCallback = Box<dyn FnOnce(LoadOutcome)>;

/// How a stylesheet load settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed { message: String },
}

/// Document parsing state, as reported by `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// Still parsing; structural content is not available yet.
    Loading,
    /// Parsed; sub-resources may still be loading.
    Interactive,
    Complete,
}

impl ReadyState {
    /// Maps a `document.readyState` string. Unknown values count as complete.
    pub fn from_dom(state: &str) -> Self {
        match state {
            "loading" => ReadyState::Loading,
            "interactive" => ReadyState::Interactive,
            _ => ReadyState::Complete,
        }
    }

    pub fn is_parsed(self) -> bool {
        !matches!(self, ReadyState::Loading)
    }
}

/// A stylesheet `<link>` to attach to the document head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StylesheetLink {
    pub id: String,
    pub href: String,
}

/// One `<option>` of the selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlOption {
    pub value: String,
    pub text: String,
}

/// Everything needed to build the selector control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlSpec {
    pub container_id: String,
    pub select_id: String,
    pub label: String,
    pub aria_label: String,
    pub options: Vec<ControlOption>,
}

impl ControlSpec {
    /// Builds the control description for a configuration, one option per
    /// catalog entry in display order.
    pub fn from_config(config: &SwitcherConfig) -> Self {
        Self {
            container_id: config.elements.container.clone(),
            select_id: config.elements.select.clone(),
            label: config.label.clone(),
            aria_label: config.aria_label.clone(),
            options: config
                .themes
                .iter()
                .map(|theme| ControlOption {
                    value: theme.id().to_string(),
                    text: theme.name().to_string(),
                })
                .collect(),
        }
    }
}

/// The page the switcher styles.
///
/// Implementations are single-threaded handles to an externally owned,
/// mutable document; methods take `&self` for that reason.
pub trait Document {
    /// Appends `link` to the head. `on_settled` fires once the resource
    /// loads or fails, possibly after the link has been removed again.
    fn set_stylesheet(&self, link: &StylesheetLink, on_settled: LoadCallback);

    /// Removes the element with id `id`, if present.
    fn remove_stylesheet(&self, id: &str);

    /// Whether an element with id `container_id` exists.
    fn has_control(&self, container_id: &str) -> bool;

    /// Appends the control to the body and routes its change events to `on_change`.
    fn mount_control(&self, control: &ControlSpec, on_change: ChangeHandler);

    /// Sets the displayed value of the select with id `select_id`.
    ///
    /// Returns `false` if no such select exists.
    fn set_control_value(&self, select_id: &str, value: &str) -> bool;

    fn ready_state(&self) -> ReadyState;

    /// Runs `callback` once structural content has been parsed.
    fn on_content_loaded(&self, callback: Box<dyn FnOnce()>);
}

impl<D: Document + ?Sized> Document for Rc<D> {
    fn set_stylesheet(&self, link: &StylesheetLink, on_settled: LoadCallback) {
        (**self).set_stylesheet(link, on_settled)
    }

    fn remove_stylesheet(&self, id: &str) {
        (**self).remove_stylesheet(id)
    }

    fn has_control(&self, container_id: &str) -> bool {
        (**self).has_control(container_id)
    }

    fn mount_control(&self, control: &ControlSpec, on_change: ChangeHandler) {
        (**self).mount_control(control, on_change)
    }

    fn set_control_value(&self, select_id: &str, value: &str) -> bool {
        (**self).set_control_value(select_id, value)
    }

    fn ready_state(&self) -> ReadyState {
        (**self).ready_state()
    }

    fn on_content_loaded(&self, callback: Box<dyn FnOnce()>) {
        (**self).on_content_loaded(callback)
    }
}
