//! The theme manager.
//!
//! [`ThemeManager`] ties the catalog, the preference store, and the document
//! together. It owns the single active stylesheet link and the selector
//! control, and is the only thing that writes the persisted preference.
//!
//! # Lifecycle
//!
//! 1. [`init`](ThemeManager::init) applies the persisted (or default) theme
//!    right away, so the stylesheet starts loading before content renders.
//! 2. Once the document body is parsed, the selector control is mounted and
//!    set to the applied theme.
//! 3. Each change in the control calls [`switch_theme`](ThemeManager::switch_theme),
//!    which applies, persists, and re-syncs the control.
//!
//! Every failure is logged and recovered from locally. Nothing here panics
//! on bad input, missing storage, or a stylesheet that fails to load.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, error, info, warn};

use crate::config::SwitcherConfig;
use crate::document::{ControlSpec, Document, LoadOutcome, StylesheetLink};
use crate::error::{ConfigError, ThemeError};
use crate::store::PreferenceStore;
use crate::theme::{Catalog, ThemeId, ThemeSummary};

struct Shared<D, S> {
    config: SwitcherConfig,
    document: D,
    store: S,
    active: RefCell<Option<ThemeId>>,
    pinned: RefCell<Option<ThemeManager<D, S>>>,
}

/// Applies, persists, and displays the selected theme.
///
/// A `ThemeManager` is a cheap handle: clones share the same state. The
/// change handler it registers on the document holds only a weak reference,
/// so dropping every handle releases the manager even while the control
/// stays mounted. Call [`keep_alive`](ThemeManager::keep_alive) when the
/// control must keep working for as long as the document exists.
///
/// # Example
///
/// ```rust
/// use stylesheet_switcher::document::MemoryDocument;
/// use stylesheet_switcher::store::MemoryStore;
/// use stylesheet_switcher::{SwitcherConfig, ThemeManager};
///
/// let document = MemoryDocument::new();
/// let store = MemoryStore::new();
/// let manager = ThemeManager::new(SwitcherConfig::default(), document.clone(), store.clone())
///     .unwrap();
///
/// manager.init();
/// manager.switch_theme("style2").unwrap();
///
/// assert_eq!(store.value("selectedStylesheet").as_deref(), Some("style2"));
/// assert_eq!(document.control_text("styleSelect").as_deref(), Some("Dark Mode"));
/// assert!(manager.switch_theme("bogus").is_err());
/// ```
pub struct ThemeManager<D, S> {
    shared: Rc<Shared<D, S>>,
}

impl<D, S> Clone for ThemeManager<D, S> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<D, S> std::fmt::Debug for ThemeManager<D, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeManager")
            .field("storage_key", &self.shared.config.storage_key)
            .field("active", &self.shared.active.borrow())
            .finish_non_exhaustive()
    }
}

impl<D, S> ThemeManager<D, S>
where
    D: Document + 'static,
    S: PreferenceStore + 'static,
{
    /// Creates a manager over `document` and `store`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownDefault`] if the configured default
    /// theme is not in the catalog.
    pub fn new(config: SwitcherConfig, document: D, store: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            shared: Rc::new(Shared {
                config,
                document,
                store,
                active: RefCell::new(None),
                pinned: RefCell::new(None),
            }),
        })
    }

    pub fn config(&self) -> &SwitcherConfig {
        &self.shared.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.shared.config.themes
    }

    pub fn document(&self) -> &D {
        &self.shared.document
    }

    pub fn store(&self) -> &S {
        &self.shared.store
    }

    /// The theme most recently applied by this manager.
    pub fn active(&self) -> Option<ThemeId> {
        self.shared.active.borrow().clone()
    }

    /// Lists available themes as `{id, name}` pairs in display order.
    pub fn list_available(&self) -> Vec<ThemeSummary> {
        self.catalog().summaries()
    }

    /// Returns the persisted theme if it is in the catalog, otherwise the default.
    ///
    /// Reads the store on every call. A store that cannot be read, or holds a
    /// value that names no theme, counts as holding nothing.
    pub fn selected(&self) -> ThemeId {
        let config = &self.shared.config;
        match self.shared.store.get(&config.storage_key) {
            Ok(Some(value)) if config.themes.contains(&value) => ThemeId::from(value),
            Ok(Some(value)) => {
                warn!(
                    value = %value,
                    default = %config.default_theme,
                    "ignoring unknown persisted theme"
                );
                config.default_theme.clone()
            }
            Ok(None) => {
                debug!(default = %config.default_theme, "no persisted theme, using default");
                config.default_theme.clone()
            }
            Err(e) => {
                let err = ThemeError::PersistenceUnavailable {
                    key: config.storage_key.clone(),
                    message: e.to_string(),
                };
                warn!(default = %config.default_theme, "{}", err);
                config.default_theme.clone()
            }
        }
    }

    /// Persists `id` as the selected theme.
    ///
    /// Ids outside the catalog are never written.
    pub fn set_selected(&self, id: &str) -> Result<(), ThemeError> {
        let config = &self.shared.config;
        if !config.themes.contains(id) {
            return Err(ThemeError::ThemeNotFound { id: id.to_string() });
        }
        self.shared
            .store
            .set(&config.storage_key, id)
            .map_err(|e| {
                let err = ThemeError::PersistenceUnavailable {
                    key: config.storage_key.clone(),
                    message: e.to_string(),
                };
                warn!(theme = %id, "{}", err);
                err
            })
    }

    /// Makes `id` the document's only dynamic stylesheet.
    ///
    /// Returns as soon as the new link is attached; whether the resource
    /// loaded is only logged later. A load that fails leaves the link in
    /// place and the preference untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::ThemeNotFound`] for ids outside the catalog, in
    /// which case the document is left exactly as it was.
    pub fn apply_theme(&self, id: &str) -> Result<(), ThemeError> {
        let config = &self.shared.config;
        let Some(theme) = config.themes.get(id) else {
            let err = ThemeError::ThemeNotFound { id: id.to_string() };
            error!("{}", err);
            return Err(err);
        };

        let document = &self.shared.document;
        document.remove_stylesheet(&config.elements.stylesheet);

        let link = StylesheetLink {
            id: config.elements.stylesheet.clone(),
            href: theme.path().to_string(),
        };
        let name = theme.name().to_string();
        let path = theme.path().to_string();
        // May fire after this link was replaced; it only logs.
        document.set_stylesheet(
            &link,
            Box::new(move |outcome: LoadOutcome| match outcome {
                LoadOutcome::Loaded => info!(theme = %name, "stylesheet loaded"),
                LoadOutcome::Failed { message } => {
                    let err = ThemeError::ResourceLoadFailure { path, message };
                    error!(theme = %name, "{}", err);
                }
            }),
        );

        *self.shared.active.borrow_mut() = Some(theme.id().clone());
        debug!(theme = %id, path = %theme.path(), "applied theme");
        Ok(())
    }

    /// Applies `id`, persists it, and shows it in the control.
    ///
    /// This is what the selector's change event calls. Unknown ids stop at
    /// the apply step, so neither the store nor the control changes. A
    /// persistence failure is logged and does not stop the control update.
    pub fn switch_theme(&self, id: &str) -> Result<(), ThemeError> {
        self.apply_theme(id)?;
        // Already logged; the page keeps the new theme for this visit.
        let _ = self.set_selected(id);
        self.update_control_display(id);
        info!(theme = %id, "switched theme");
        Ok(())
    }

    /// Shows `id` in the selector control, if the control is mounted.
    pub fn update_control_display(&self, id: &str) {
        let select_id = &self.shared.config.elements.select;
        if !self.shared.document.set_control_value(select_id, id) {
            debug!(select = %select_id, "selector control not mounted");
        }
    }

    /// Mounts the selector control unless one is already present.
    pub fn render_control(&self) {
        let config = &self.shared.config;
        let document = &self.shared.document;
        if document.has_control(&config.elements.container) {
            return;
        }

        let weak = self.downgrade();
        document.mount_control(
            &ControlSpec::from_config(config),
            Rc::new(move |value: &str| {
                let Some(manager) = Self::upgrade(&weak) else {
                    return;
                };
                if let Err(e) = manager.switch_theme(value) {
                    debug!("ignored selection: {}", e);
                }
            }),
        );
        debug!(container = %config.elements.container, "mounted selector control");
    }

    /// Applies the selected theme now and mounts the control once the
    /// document's body has been parsed.
    pub fn init(&self) {
        let selected = self.selected();
        // `selected` always names a catalog theme.
        let _ = self.apply_theme(selected.as_str());

        let document = &self.shared.document;
        if document.ready_state().is_parsed() {
            self.mount_and_sync(&selected);
            return;
        }

        let weak = self.downgrade();
        document.on_content_loaded(Box::new(move || {
            if let Some(manager) = Self::upgrade(&weak) {
                manager.mount_and_sync(&selected);
            }
        }));
    }

    /// Keeps this manager alive after every handle is dropped.
    ///
    /// The manager then lives as long as the process, and the mounted control
    /// keeps switching themes. Calling it again has no further effect.
    pub fn keep_alive(&self) {
        let mut pinned = self.shared.pinned.borrow_mut();
        if pinned.is_none() {
            *pinned = Some(self.clone());
            debug!("theme manager pinned for the document's lifetime");
        }
    }

    fn mount_and_sync(&self, fallback: &ThemeId) {
        self.render_control();
        // A script may have switched themes while the body was still parsing.
        let shown = self.active().unwrap_or_else(|| fallback.clone());
        self.update_control_display(shown.as_str());
    }

    fn downgrade(&self) -> Weak<Shared<D, S>> {
        Rc::downgrade(&self.shared)
    }

    fn upgrade(weak: &Weak<Shared<D, S>>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::store::MemoryStore;
    use crate::theme::Theme;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_logs(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    const LINK: &str = "dynamicStylesheet";
    const SELECT: &str = "styleSelect";
    const CONTAINER: &str = "styleSwitcher";
    const KEY: &str = "selectedStylesheet";

    fn manager_with(
        document: &MemoryDocument,
        store: &MemoryStore,
    ) -> ThemeManager<MemoryDocument, MemoryStore> {
        ThemeManager::new(SwitcherConfig::default(), document.clone(), store.clone()).unwrap()
    }

    #[test]
    fn test_new_rejects_unknown_default() {
        let config = SwitcherConfig {
            default_theme: ThemeId::from("sepia"),
            ..SwitcherConfig::default()
        };
        let result = ThemeManager::new(config, MemoryDocument::new(), MemoryStore::new());
        assert!(matches!(result, Err(ConfigError::UnknownDefault { .. })));
    }

    #[test]
    fn test_selected_defaults_without_preference() {
        let manager = manager_with(&MemoryDocument::new(), &MemoryStore::new());
        assert_eq!(manager.selected(), "style1");
    }

    #[test]
    fn test_selected_reads_persisted_value() {
        let store = MemoryStore::with_value(KEY, "style3");
        let manager = manager_with(&MemoryDocument::new(), &store);
        assert_eq!(manager.selected(), "style3");
    }

    #[test]
    fn test_selected_ignores_unknown_persisted_value() {
        let store = MemoryStore::with_value(KEY, "retro");
        let manager = manager_with(&MemoryDocument::new(), &store);
        assert_eq!(manager.selected(), "style1");
    }

    #[test]
    fn test_selected_survives_unavailable_store() {
        let store = MemoryStore::with_value(KEY, "style2");
        store.set_unavailable(true);
        let manager = manager_with(&MemoryDocument::new(), &store);
        assert_eq!(manager.selected(), "style1");
    }

    #[test]
    fn test_selected_is_not_cached() {
        let store = MemoryStore::new();
        let manager = manager_with(&MemoryDocument::new(), &store);
        assert_eq!(manager.selected(), "style1");

        // Written behind the manager's back.
        store.set(KEY, "style2").unwrap();
        assert_eq!(manager.selected(), "style2");
    }

    #[test]
    fn test_set_selected_rejects_unknown_id() {
        let store = MemoryStore::new();
        let manager = manager_with(&MemoryDocument::new(), &store);
        assert_eq!(
            manager.set_selected("bogus"),
            Err(ThemeError::ThemeNotFound {
                id: "bogus".to_string()
            })
        );
        assert_eq!(store.value(KEY), None);
    }

    #[test]
    fn test_set_selected_reports_unavailable_store() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let manager = manager_with(&MemoryDocument::new(), &store);
        assert!(matches!(
            manager.set_selected("style2"),
            Err(ThemeError::PersistenceUnavailable { .. })
        ));
    }

    #[test]
    fn test_apply_theme_replaces_link() {
        let document = MemoryDocument::new();
        let manager = manager_with(&document, &MemoryStore::new());

        manager.apply_theme("style1").unwrap();
        manager.apply_theme("style3").unwrap();

        let links = document.stylesheets();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id, LINK);
        assert_eq!(links[0].href, "styles/style3.css");
        assert_eq!(manager.active().unwrap(), "style3");
    }

    #[test]
    fn test_apply_unknown_theme_changes_nothing() {
        let document = MemoryDocument::new();
        let manager = manager_with(&document, &MemoryStore::new());
        manager.apply_theme("style2").unwrap();

        let err = manager.apply_theme("bogus").unwrap_err();
        assert_eq!(
            err,
            ThemeError::ThemeNotFound {
                id: "bogus".to_string()
            }
        );
        assert_eq!(document.stylesheet(LINK).as_deref(), Some("styles/style2.css"));
        assert_eq!(document.stylesheets().len(), 1);
        assert_eq!(manager.active().unwrap(), "style2");
    }

    #[test]
    fn test_unknown_theme_is_logged_as_error() {
        let manager = manager_with(&MemoryDocument::new(), &MemoryStore::new());
        let logs = capture_logs(|| {
            let _ = manager.apply_theme("bogus");
        });
        assert!(logs.contains("ERROR"), "{}", logs);
        assert!(logs.contains("theme not found: 'bogus'"), "{}", logs);
    }

    #[test]
    fn test_load_failure_is_logged_as_error() {
        let document = MemoryDocument::new();
        let manager = manager_with(&document, &MemoryStore::new());
        let logs = capture_logs(|| {
            manager.switch_theme("style2").unwrap();
            document.settle_all(|_| LoadOutcome::Failed {
                message: "404 Not Found".to_string(),
            });
        });
        assert!(logs.contains("ERROR"), "{}", logs);
        assert!(
            logs.contains("failed to load stylesheet 'styles/style2.css': 404 Not Found"),
            "{}",
            logs
        );
    }

    #[test]
    fn test_unavailable_store_is_logged_as_warning() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let manager = manager_with(&MemoryDocument::new(), &store);
        let logs = capture_logs(|| {
            assert_eq!(manager.selected(), "style1");
        });
        assert!(logs.contains("WARN"), "{}", logs);
        assert!(logs.contains("preference 'selectedStylesheet' is unavailable"), "{}", logs);
    }

    #[test]
    fn test_load_failure_keeps_link_and_preference() {
        let document = MemoryDocument::new();
        let store = MemoryStore::new();
        let manager = manager_with(&document, &store);

        manager.switch_theme("style2").unwrap();
        document.settle_all(|_| LoadOutcome::Failed {
            message: "404 Not Found".to_string(),
        });

        assert_eq!(document.stylesheet(LINK).as_deref(), Some("styles/style2.css"));
        assert_eq!(store.value(KEY).as_deref(), Some("style2"));
    }

    #[test]
    fn test_stale_load_callback_is_harmless() {
        let document = MemoryDocument::new();
        let manager = manager_with(&document, &MemoryStore::new());

        manager.apply_theme("style1").unwrap();
        manager.apply_theme("style2").unwrap();
        assert_eq!(document.pending_loads().len(), 2);

        // The first link is long gone when its load settles.
        assert_eq!(
            document.settle_next(LoadOutcome::Loaded).as_deref(),
            Some("styles/style1.css")
        );
        assert_eq!(document.stylesheet(LINK).as_deref(), Some("styles/style2.css"));
        assert_eq!(manager.active().unwrap(), "style2");
    }

    #[test]
    fn test_update_control_display_without_control_is_noop() {
        let document = MemoryDocument::new();
        let manager = manager_with(&document, &MemoryStore::new());
        manager.update_control_display("style2");
        assert_eq!(document.control_count(CONTAINER), 0);
    }

    #[test]
    fn test_render_control_is_idempotent() {
        let document = MemoryDocument::new();
        let manager = manager_with(&document, &MemoryStore::new());

        manager.render_control();
        manager.render_control();

        assert_eq!(document.control_count(CONTAINER), 1);
        let names: Vec<String> = document
            .control_options(SELECT)
            .into_iter()
            .map(|option| option.text)
            .collect();
        assert_eq!(names, vec!["Professional", "Dark Mode", "High Contrast"]);
    }

    #[test]
    fn test_control_change_switches_theme() {
        let document = MemoryDocument::new();
        let store = MemoryStore::new();
        let manager = manager_with(&document, &store);
        manager.init();

        assert!(document.choose(SELECT, "style3"));

        assert_eq!(store.value(KEY).as_deref(), Some("style3"));
        assert_eq!(document.stylesheet(LINK).as_deref(), Some("styles/style3.css"));
        assert_eq!(document.control_text(SELECT).as_deref(), Some("High Contrast"));
    }

    #[test]
    fn test_control_outlives_dropped_manager() {
        let document = MemoryDocument::new();
        let store = MemoryStore::new();
        let manager = manager_with(&document, &store);
        manager.init();
        drop(manager);

        // The handler holds a weak reference, so nothing happens.
        assert!(document.choose(SELECT, "style2"));
        assert_eq!(store.value(KEY), None);
        assert_eq!(document.stylesheet(LINK).as_deref(), Some("styles/style1.css"));
    }

    #[test]
    fn test_kept_alive_control_switches_after_handles_drop() {
        let document = MemoryDocument::new();
        let store = MemoryStore::new();
        let manager = manager_with(&document, &store);
        manager.keep_alive();
        manager.keep_alive();
        manager.init();
        drop(manager);

        assert!(document.choose(SELECT, "style3"));

        assert_eq!(document.stylesheet(LINK).as_deref(), Some("styles/style3.css"));
        assert_eq!(store.value(KEY).as_deref(), Some("style3"));
        assert_eq!(document.control_text(SELECT).as_deref(), Some("High Contrast"));
    }

    #[test]
    fn test_kept_alive_deferred_init_still_mounts() {
        let document = MemoryDocument::loading();
        let manager = manager_with(&document, &MemoryStore::new());
        manager.keep_alive();
        manager.init();
        drop(manager);

        document.finish_parsing();
        assert_eq!(document.control_count(CONTAINER), 1);
        assert_eq!(document.control_text(SELECT).as_deref(), Some("Professional"));
    }

    #[test]
    fn test_switch_still_updates_control_when_store_fails() {
        let document = MemoryDocument::new();
        let store = MemoryStore::new();
        let manager = manager_with(&document, &store);
        manager.init();
        store.set_unavailable(true);

        manager.switch_theme("style2").unwrap();

        assert_eq!(document.control_text(SELECT).as_deref(), Some("Dark Mode"));
        assert_eq!(document.stylesheet(LINK).as_deref(), Some("styles/style2.css"));
        assert_eq!(store.value(KEY), None);
    }

    #[test]
    fn test_init_defers_control_until_parsed() {
        let document = MemoryDocument::loading();
        let manager = manager_with(&document, &MemoryStore::with_value(KEY, "style2"));

        manager.init();
        // The stylesheet goes in before the body is parsed.
        assert_eq!(document.stylesheet(LINK).as_deref(), Some("styles/style2.css"));
        assert!(!document.has_control(CONTAINER));

        document.finish_parsing();
        assert_eq!(document.control_count(CONTAINER), 1);
        assert_eq!(document.control_text(SELECT).as_deref(), Some("Dark Mode"));
    }

    #[test]
    fn test_init_shows_theme_switched_before_parse() {
        let document = MemoryDocument::loading();
        let manager = manager_with(&document, &MemoryStore::new());

        manager.init();
        manager.switch_theme("style3").unwrap();
        document.finish_parsing();

        assert_eq!(document.control_text(SELECT).as_deref(), Some("High Contrast"));
    }

    #[test]
    fn test_list_available_follows_catalog_order() {
        let catalog = Catalog::new(vec![
            Theme::new("paper", "Paper", "css/paper.css"),
            Theme::new("ink", "Ink", "css/ink.css"),
        ])
        .unwrap();
        let manager = ThemeManager::new(
            SwitcherConfig::with_catalog(catalog),
            MemoryDocument::new(),
            MemoryStore::new(),
        )
        .unwrap();

        let ids: Vec<ThemeId> = manager
            .list_available()
            .into_iter()
            .map(|summary| summary.id)
            .collect();
        assert_eq!(ids, vec![ThemeId::from("paper"), ThemeId::from("ink")]);
        assert_eq!(manager.selected(), "paper");
    }
}
