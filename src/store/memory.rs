//! In-memory preference store.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::PreferenceStore;
use crate::error::StoreError;

/// A [`PreferenceStore`] backed by a shared `HashMap`.
///
/// Clones share the same map, so a test can hand one clone to a
/// [`ThemeManager`](crate::ThemeManager) and inspect the other.
///
/// # Example
///
/// ```rust
/// use stylesheet_switcher::store::{MemoryStore, PreferenceStore};
///
/// let store = MemoryStore::new();
/// let view = store.clone();
/// store.set("selectedStylesheet", "style2").unwrap();
/// assert_eq!(view.value("selectedStylesheet").as_deref(), Some("style2"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Rc<RefCell<HashMap<String, String>>>,
    unavailable: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one entry.
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Makes every subsequent `get`/`set` fail, as a browser does when
    /// storage is disabled.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    /// Reads a value directly, bypassing the availability switch.
    pub fn value(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.get() {
            return Err(StoreError::Unavailable {
                message: "storage is disabled".to_string(),
            });
        }
        Ok(())
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_available()?;
        Ok(self.value(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
