//! In-memory document for tests and server-side rendering.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::{
    ChangeHandler, ControlOption, ControlSpec, Document, LoadCallback, LoadOutcome, ReadyState,
    StylesheetLink,
};
use crate::markup;

struct MountedControl {
    spec: ControlSpec,
    value: Option<String>,
    on_change: ChangeHandler,
}

struct PendingLoad {
    href: String,
    callback: LoadCallback,
}

struct DocumentState {
    ready: ReadyState,
    head: Vec<StylesheetLink>,
    body: Vec<MountedControl>,
    pending_loads: VecDeque<PendingLoad>,
    content_loaded: Vec<Box<dyn FnOnce()>>,
}

/// A [`Document`] held entirely in memory.
///
/// Clones share the same document. Stylesheet loads stay pending until the
/// test settles them, and a document created with [`MemoryDocument::loading`]
/// queues content-loaded callbacks until [`MemoryDocument::finish_parsing`].
///
/// # Example
///
/// ```rust
/// use stylesheet_switcher::document::MemoryDocument;
/// use stylesheet_switcher::store::MemoryStore;
/// use stylesheet_switcher::{SwitcherConfig, ThemeManager};
///
/// let document = MemoryDocument::new();
/// let manager = ThemeManager::new(
///     SwitcherConfig::default(),
///     document.clone(),
///     MemoryStore::new(),
/// )
/// .unwrap();
///
/// manager.init();
/// assert_eq!(document.stylesheet("dynamicStylesheet").as_deref(), Some("styles/style1.css"));
/// assert_eq!(document.control_text("styleSelect").as_deref(), Some("Professional"));
/// ```
#[derive(Clone)]
pub struct MemoryDocument {
    state: Rc<RefCell<DocumentState>>,
}

impl MemoryDocument {
    /// Creates a fully parsed, empty document.
    pub fn new() -> Self {
        Self::with_ready_state(ReadyState::Complete)
    }

    /// Creates a document that is still being parsed.
    pub fn loading() -> Self {
        Self::with_ready_state(ReadyState::Loading)
    }

    fn with_ready_state(ready: ReadyState) -> Self {
        Self {
            state: Rc::new(RefCell::new(DocumentState {
                ready,
                head: Vec::new(),
                body: Vec::new(),
                pending_loads: VecDeque::new(),
                content_loaded: Vec::new(),
            })),
        }
    }

    /// Marks parsing as done and runs queued content-loaded callbacks.
    pub fn finish_parsing(&self) {
        let callbacks = {
            let mut state = self.state.borrow_mut();
            if state.ready.is_parsed() {
                return;
            }
            state.ready = ReadyState::Interactive;
            std::mem::take(&mut state.content_loaded)
        };
        for callback in callbacks {
            callback();
        }
    }

    /// All stylesheet links currently in the head, in insertion order.
    pub fn stylesheets(&self) -> Vec<StylesheetLink> {
        self.state.borrow().head.clone()
    }

    /// The `href` of the link with id `id`.
    pub fn stylesheet(&self, id: &str) -> Option<String> {
        self.state
            .borrow()
            .head
            .iter()
            .find(|link| link.id == id)
            .map(|link| link.href.clone())
    }

    /// Number of mounted controls whose container has id `container_id`.
    pub fn control_count(&self, container_id: &str) -> usize {
        self.state
            .borrow()
            .body
            .iter()
            .filter(|control| control.spec.container_id == container_id)
            .count()
    }

    /// The options of the select with id `select_id`.
    pub fn control_options(&self, select_id: &str) -> Vec<ControlOption> {
        self.with_control(select_id, |control| control.spec.options.clone())
            .unwrap_or_default()
    }

    /// The value of the select with id `select_id`, `None` if nothing is selected.
    pub fn control_value(&self, select_id: &str) -> Option<String> {
        self.with_control(select_id, |control| control.value.clone())
            .flatten()
    }

    /// The text of the selected option, as the user sees it.
    pub fn control_text(&self, select_id: &str) -> Option<String> {
        self.with_control(select_id, |control| {
            let value = control.value.as_deref()?;
            control
                .spec
                .options
                .iter()
                .find(|option| option.value == value)
                .map(|option| option.text.clone())
        })
        .flatten()
    }

    /// Simulates a user picking `value` in the select with id `select_id`.
    ///
    /// Returns `false` without firing anything if there is no such select or
    /// no such option.
    pub fn choose(&self, select_id: &str, value: &str) -> bool {
        let handler = {
            let mut state = self.state.borrow_mut();
            let Some(control) = state
                .body
                .iter_mut()
                .find(|control| control.spec.select_id == select_id)
            else {
                return false;
            };
            if !control.spec.options.iter().any(|option| option.value == value) {
                return false;
            }
            control.value = Some(value.to_string());
            Rc::clone(&control.on_change)
        };
        handler(value);
        true
    }

    /// The `href`s of stylesheet loads that have not settled yet, oldest first.
    pub fn pending_loads(&self) -> Vec<String> {
        self.state
            .borrow()
            .pending_loads
            .iter()
            .map(|load| load.href.clone())
            .collect()
    }

    /// Settles the oldest pending load, returning its `href`.
    pub fn settle_next(&self, outcome: LoadOutcome) -> Option<String> {
        let load = self.state.borrow_mut().pending_loads.pop_front()?;
        (load.callback)(outcome);
        Some(load.href)
    }

    /// Settles every pending load with the outcome `outcome_for` picks per `href`.
    pub fn settle_all(&self, mut outcome_for: impl FnMut(&str) -> LoadOutcome) {
        loop {
            let Some(load) = self.state.borrow_mut().pending_loads.pop_front() else {
                break;
            };
            let outcome = outcome_for(&load.href);
            (load.callback)(outcome);
        }
    }

    /// Serializes the document to HTML.
    pub fn to_html(&self) -> Result<String, minijinja::Error> {
        let state = self.state.borrow();
        let mut html = String::from("<html><head>");
        for link in &state.head {
            html.push_str(&markup::render_link(link)?);
        }
        html.push_str("</head><body>");
        for control in &state.body {
            html.push_str(&markup::render_control(
                &control.spec,
                control.value.as_deref(),
            )?);
        }
        html.push_str("</body></html>");
        Ok(html)
    }

    fn with_control<T>(&self, select_id: &str, f: impl FnOnce(&MountedControl) -> T) -> Option<T> {
        self.state
            .borrow()
            .body
            .iter()
            .find(|control| control.spec.select_id == select_id)
            .map(f)
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MemoryDocument")
            .field("ready", &state.ready)
            .field("head", &state.head)
            .field("controls", &state.body.len())
            .field("pending_loads", &state.pending_loads.len())
            .finish()
    }
}

impl Document for MemoryDocument {
    fn set_stylesheet(&self, link: &StylesheetLink, on_settled: LoadCallback) {
        let mut state = self.state.borrow_mut();
        state.head.push(link.clone());
        state.pending_loads.push_back(PendingLoad {
            href: link.href.clone(),
            callback: on_settled,
        });
    }

    fn remove_stylesheet(&self, id: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(pos) = state.head.iter().position(|link| link.id == id) {
            state.head.remove(pos);
        }
    }

    fn has_control(&self, container_id: &str) -> bool {
        self.control_count(container_id) > 0
    }

    fn mount_control(&self, control: &ControlSpec, on_change: ChangeHandler) {
        // A fresh select shows its first option, as browsers do.
        let value = control.options.first().map(|option| option.value.clone());
        self.state.borrow_mut().body.push(MountedControl {
            spec: control.clone(),
            value,
            on_change,
        });
    }

    fn set_control_value(&self, select_id: &str, value: &str) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(control) = state
            .body
            .iter_mut()
            .find(|control| control.spec.select_id == select_id)
        else {
            return false;
        };
        // Assigning a value with no matching option leaves nothing selected.
        control.value = control
            .spec
            .options
            .iter()
            .any(|option| option.value == value)
            .then(|| value.to_string());
        true
    }

    fn ready_state(&self) -> ReadyState {
        self.state.borrow().ready
    }

    fn on_content_loaded(&self, callback: Box<dyn FnOnce()>) {
        if self.state.borrow().ready.is_parsed() {
            callback();
            return;
        }
        self.state.borrow_mut().content_loaded.push(callback);
    }
}
