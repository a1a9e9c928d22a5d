//! Page-wide preference state.
//!
//! Uses `thread_local!` + `RefCell` for safe mutable access in single-threaded
//! WASM. The store is loaded lazily on first access so the active site
//! config (storage key names) is honored.

use std::cell::RefCell;

use crate::config;
use crate::prefs::store::PreferenceStore;
use crate::store::{self, KeyValueStore};

pub type Preferences = PreferenceStore<Box<dyn KeyValueStore>>;

thread_local! {
    static PREFS: RefCell<Option<Preferences>> = const { RefCell::new(None) };
}

fn fresh(backing: Box<dyn KeyValueStore>) -> Preferences {
    let mut prefs = PreferenceStore::new(backing, &config::current());
    prefs.load();
    prefs
}

/// Execute a closure with read access to the preferences.
pub fn with_prefs<F, R>(f: F) -> R
where
    F: FnOnce(&Preferences) -> R,
{
    PREFS.with(|cell| {
        let mut slot = cell.borrow_mut();
        let prefs = slot.get_or_insert_with(|| fresh(store::default_store()));
        f(prefs)
    })
}

/// Execute a closure with mutable access to the preferences.
pub fn with_prefs_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut Preferences) -> R,
{
    PREFS.with(|cell| {
        let mut slot = cell.borrow_mut();
        let prefs = slot.get_or_insert_with(|| fresh(store::default_store()));
        f(prefs)
    })
}

/// Swap in a different backing store and reload every preference from it.
pub fn replace_store(backing: Box<dyn KeyValueStore>) {
    PREFS.with(|cell| {
        *cell.borrow_mut() = Some(fresh(backing));
    });
}

/// Re-read every preference from the current backing store, e.g. after
/// another page of the same origin changed it.
pub fn reload() {
    with_prefs_mut(|p| p.load());
}
