//! LocalStorage backend for the session slots.
//!
//! Raw string values through `gloo-storage` (its typed `get`/`set` would
//! JSON-quote the tokens, which other tabs and older builds do not expect).

use gloo_storage::{LocalStorage as Backend, Storage};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::session::TokenStore;

/// Origin-scoped, cross-tab persistent store.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// Call `callback` whenever another tab of this origin changes storage.
    ///
    /// The argument is the changed key, or `None` when the other tab called
    /// `clear()`. The listener lives as long as the page.
    pub fn on_change<F>(callback: F)
    where
        F: Fn(Option<String>) + 'static,
    {
        let closure = Closure::<dyn Fn(web_sys::StorageEvent)>::new(move |event: web_sys::StorageEvent| {
            callback(event.key());
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref());
        }

        // app-lifetime listener
        closure.forget();
    }
}

impl TokenStore for LocalStorage {
    fn get(&self, name: &str) -> Option<String> {
        Self::storage()?.get_item(name).ok()?
    }

    fn set(&self, name: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(name, value).ok())
            .is_some()
    }

    fn remove(&self, name: &str) {
        if Self::storage().is_some() {
            Backend::delete(name);
        }
    }

    fn clear(&self) {
        if Self::storage().is_some() {
            Backend::clear();
        }
    }
}
