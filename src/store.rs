//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The controllers
//! own the state; this store only mirrors their latest views for rendering.

use leptos::prelude::*;
use notes_sync_engine::{ActionItem, ListView, Note, Tag};
use reactive_stores::Store;

/// Rendered copies of controller state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Notes list view (None until the first load starts)
    pub notes: Option<ListView<Note>>,
    /// Action items list view
    pub action_items: Option<ListView<ActionItem>>,
    /// Tag directory, ordered by name
    pub tags: Vec<Tag>,
    /// Notes row currently in inline edit mode
    pub editing_note: Option<u32>,
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Currently displayed notes, empty before the first page arrives
pub fn store_notes(store: &AppStore) -> Vec<Note> {
    store
        .notes()
        .read()
        .as_ref()
        .and_then(|view| view.page.as_ref())
        .map(|page| page.items.clone())
        .unwrap_or_default()
}

/// Currently displayed action items
pub fn store_action_items(store: &AppStore) -> Vec<ActionItem> {
    store
        .action_items()
        .read()
        .as_ref()
        .and_then(|view| view.page.as_ref())
        .map(|page| page.items.clone())
        .unwrap_or_default()
}
