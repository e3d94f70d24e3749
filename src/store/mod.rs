//! Preference persistence.
//!
//! The switcher persists exactly one value: the selected theme id, under the
//! configured storage key. [`PreferenceStore`] abstracts the key/value store
//! so the same manager runs against browser `localStorage`, a JSON file, or
//! an in-memory map in tests.
//!
//! Stores are read on every lookup. Implementations must not cache values
//! that could drift from the backing store.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;

/// A string key/value store scoped to one origin (or one file).
///
/// Methods take `&self`: stores are ambient, externally owned resources and
/// the switcher runs on a single event-loop thread.
pub trait PreferenceStore {
    /// Returns the stored value, or `None` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for std::rc::Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}
