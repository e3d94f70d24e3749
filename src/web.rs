#![forbid(unsafe_code)]

//! Browser backend and `wasm-bindgen` exports.
//!
//! Only compiled on `wasm32` targets. [`WebDocument`] drives the live DOM,
//! [`LocalStorage`] persists to `window.localStorage`, and [`StyleSwitcher`]
//! is the class scripts on the page talk to.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlLinkElement, HtmlSelectElement};

use crate::config::SwitcherConfig;
use crate::document::{
    ChangeHandler, ControlSpec, Document, LoadCallback, LoadOutcome, ReadyState, StylesheetLink,
};
use crate::error::StoreError;
use crate::manager::ThemeManager;
use crate::markup;
use crate::store::PreferenceStore;

fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            console_error(&format!("stylesheet-switcher panicked: {info}"));
        }));
    });
}

/// The page's live DOM.
#[derive(Debug, Clone)]
pub struct WebDocument {
    document: web_sys::Document,
}

impl WebDocument {
    pub fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    /// The current window's document, if there is one.
    pub fn from_window() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }

    fn select(&self, select_id: &str) -> Option<HtmlSelectElement> {
        self.document
            .get_element_by_id(select_id)?
            .dyn_into::<HtmlSelectElement>()
            .ok()
    }

    fn attach_link(&self, link: &StylesheetLink, on_settled: LoadCallback) -> Result<(), JsValue> {
        let element = self
            .document
            .create_element("link")?
            .dyn_into::<HtmlLinkElement>()?;
        element.set_id(&link.id);
        element.set_rel("stylesheet");
        element.set_type("text/css");
        element.set_href(&link.href);

        // Whichever of load/error fires first takes the callback.
        let callback = Rc::new(RefCell::new(Some(on_settled)));
        let on_load = {
            let callback = Rc::clone(&callback);
            Closure::once_into_js(move || {
                if let Some(settle) = callback.borrow_mut().take() {
                    settle(LoadOutcome::Loaded);
                }
            })
        };
        let on_error = {
            let href = link.href.clone();
            Closure::once_into_js(move || {
                if let Some(settle) = callback.borrow_mut().take() {
                    settle(LoadOutcome::Failed {
                        message: format!("no stylesheet at '{}'", href),
                    });
                }
            })
        };
        element.set_onload(Some(on_load.unchecked_ref::<Function>()));
        element.set_onerror(Some(on_error.unchecked_ref::<Function>()));

        let head = self
            .document
            .head()
            .ok_or_else(|| JsValue::from_str("document has no <head>"))?;
        head.append_child(&element)?;
        Ok(())
    }

    fn build_control(
        &self,
        control: &ControlSpec,
        on_change: ChangeHandler,
    ) -> Result<(), JsValue> {
        let container = self.document.create_element("div")?;
        container.set_id(&control.container_id);
        let body_html = markup::render_control_body(control, None)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        container.set_inner_html(&body_html);

        let select = container
            .query_selector("select")?
            .ok_or_else(|| JsValue::from_str("control markup has no <select>"))?
            .dyn_into::<HtmlSelectElement>()?;
        let listener = {
            let select = select.clone();
            Closure::<dyn FnMut()>::new(move || on_change(&select.value()))
        };
        select.add_event_listener_with_callback("change", listener.as_ref().unchecked_ref())?;
        // The control lives as long as the page.
        listener.forget();

        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no <body>"))?;
        body.append_child(&container)?;
        Ok(())
    }
}

impl Document for WebDocument {
    fn set_stylesheet(&self, link: &StylesheetLink, on_settled: LoadCallback) {
        if let Err(e) = self.attach_link(link, on_settled) {
            tracing::error!(href = %link.href, "failed to attach stylesheet: {}", js_message(&e));
        }
    }

    fn remove_stylesheet(&self, id: &str) {
        if let Some(element) = self.document.get_element_by_id(id) {
            element.remove();
        }
    }

    fn has_control(&self, container_id: &str) -> bool {
        self.document.get_element_by_id(container_id).is_some()
    }

    fn mount_control(&self, control: &ControlSpec, on_change: ChangeHandler) {
        if let Err(e) = self.build_control(control, on_change) {
            tracing::error!(
                container = %control.container_id,
                "failed to mount control: {}",
                js_message(&e)
            );
        }
    }

    fn set_control_value(&self, select_id: &str, value: &str) -> bool {
        match self.select(select_id) {
            Some(select) => {
                select.set_value(value);
                true
            }
            None => false,
        }
    }

    fn ready_state(&self) -> ReadyState {
        ReadyState::from_dom(&self.document.ready_state())
    }

    fn on_content_loaded(&self, callback: Box<dyn FnOnce()>) {
        let listener = Closure::once_into_js(move || callback());
        if let Err(e) = self
            .document
            .add_event_listener_with_callback("DOMContentLoaded", listener.unchecked_ref())
        {
            tracing::error!("failed to wait for DOMContentLoaded: {}", js_message(&e));
        }
    }
}

/// `window.localStorage`, looked up on every access.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage(&self) -> Result<web_sys::Storage, StoreError> {
        let window = web_sys::window().ok_or_else(|| StoreError::Unavailable {
            message: "no window".to_string(),
        })?;
        window
            .local_storage()
            .map_err(|e| StoreError::Unavailable {
                message: js_message(&e),
            })?
            .ok_or_else(|| StoreError::Unavailable {
                message: "localStorage is disabled".to_string(),
            })
    }
}

impl PreferenceStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StoreError::Unavailable {
                message: js_message(&e),
            })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::Unavailable {
                message: js_message(&e),
            })
    }
}

thread_local! {
    static PAGE: RefCell<Option<ThemeManager<WebDocument, LocalStorage>>> = RefCell::new(None);
}

/// The page's manager, started on first use.
fn page_manager() -> Result<ThemeManager<WebDocument, LocalStorage>, JsValue> {
    if let Some(manager) = PAGE.with(|page| page.borrow().clone()) {
        return Ok(manager);
    }
    install_panic_hook();
    let document =
        WebDocument::from_window().ok_or_else(|| JsValue::from_str("no document to style"))?;
    let manager = ThemeManager::new(SwitcherConfig::default(), document, LocalStorage)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    manager.keep_alive();
    PAGE.with(|page| *page.borrow_mut() = Some(manager.clone()));
    manager.init();
    Ok(manager)
}

/// Runs when the module loads: applies the saved theme and mounts the selector.
#[wasm_bindgen(start)]
pub fn wasm_start() {
    if let Err(e) = page_manager() {
        console_error(&format!("stylesheet-switcher failed to start: {}", js_message(&e)));
    }
}

/// The switcher as seen from JavaScript.
///
/// Every instance is a handle to the one switcher the page started on load.
/// Dropping or freeing it leaves the selector working.
#[wasm_bindgen]
pub struct StyleSwitcher {
    manager: ThemeManager<WebDocument, LocalStorage>,
}

#[wasm_bindgen]
impl StyleSwitcher {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<StyleSwitcher, JsValue> {
        Ok(Self {
            manager: page_manager()?,
        })
    }

    /// Switches to `id`. Returns `false`, without throwing, for unknown ids.
    pub fn switch(&self, id: &str) -> bool {
        self.manager.switch_theme(id).is_ok()
    }

    /// The persisted theme id, or the default.
    #[wasm_bindgen(js_name = getCurrent)]
    pub fn get_current(&self) -> String {
        self.manager.selected().to_string()
    }

    /// `[{id, name}, ...]` in display order.
    #[wasm_bindgen(js_name = getAvailable)]
    pub fn get_available(&self) -> Array {
        self.manager
            .list_available()
            .into_iter()
            .map(|summary| {
                let entry = Object::new();
                let _ = Reflect::set(&entry, &"id".into(), &summary.id.as_str().into());
                let _ = Reflect::set(&entry, &"name".into(), &summary.name.into());
                JsValue::from(entry)
            })
            .collect()
    }
}
