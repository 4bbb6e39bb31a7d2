//! Application Context
//!
//! Controllers provided via Leptos Context API. They hold `Rc` state, so they
//! live in local-storage `StoredValue`s and are cloned out before awaiting.

use leptos::prelude::*;
use leptos::task::spawn_local;
use notes_sync_engine::{
    ActionItemsApi, ActionItemsController, ApiConfig, Http, NotesApi, NotesController, TagsApi,
    TagsController,
};

use crate::store::{AppStateStoreFields, AppStore};

/// Backend origin baked in at build time, e.g. `NOTES_API_BASE=http://localhost:8000`
const API_BASE: Option<&str> = option_env!("NOTES_API_BASE");

/// Build the client configuration for this page
pub fn api_config() -> ApiConfig {
    let base_url = API_BASE
        .map(str::to_string)
        .or_else(|| web_sys::window().and_then(|w| w.location().origin().ok()))
        .unwrap_or_else(|| ApiConfig::default().base_url);
    ApiConfig::with_base_url(base_url)
}

/// App-wide controllers provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    notes: StoredValue<NotesController, LocalStorage>,
    action_items: StoredValue<ActionItemsController, LocalStorage>,
    tags: StoredValue<TagsController<TagsApi>, LocalStorage>,
}

impl AppContext {
    pub fn new(config: ApiConfig) -> Self {
        let http = Http::new(config.clone());
        let notes = NotesController::new(NotesApi::new(http.clone()), config.notes_page_size, config.sort);
        let action_items = ActionItemsController::new(
            ActionItemsApi::new(http.clone()),
            config.action_items_page_size,
            config.sort,
        );
        let tags = TagsController::new(TagsApi::new(http));
        Self {
            notes: StoredValue::new_local(notes),
            action_items: StoredValue::new_local(action_items),
            tags: StoredValue::new_local(tags),
        }
    }

    pub fn notes(&self) -> NotesController {
        self.notes.get_value()
    }

    pub fn action_items(&self) -> ActionItemsController {
        self.action_items.get_value()
    }

    pub fn tags(&self) -> TagsController<TagsApi> {
        self.tags.get_value()
    }

    /// Mirror every controller change into the store
    pub fn connect(&self, store: AppStore) {
        let ctx = *self;
        self.notes().subscribe(move || store.notes().set(Some(ctx.notes().view())));
        self.action_items()
            .subscribe(move || store.action_items().set(Some(ctx.action_items().view())));
        self.tags()
            .subscribe(move || store.tags().set(ctx.tags().view().tags().to_vec()));

        // Extraction may have created tags, and action items from checklists
        self.notes().on_tags_changed(move || ctx.reload_tags());
        self.notes().on_action_items_changed(move || ctx.reload_action_items());
    }

    /// Initial loads
    pub fn start(&self) {
        let notes = self.notes();
        let action_items = self.action_items();
        spawn_local(async move {
            notes.reload().await;
        });
        spawn_local(async move {
            action_items.reload().await;
        });
        self.reload_tags();
    }

    pub fn reload_action_items(&self) {
        let action_items = self.action_items();
        spawn_local(async move {
            action_items.reload().await;
        });
    }

    pub fn reload_tags(&self) {
        let tags = self.tags();
        spawn_local(async move { tags.reload().await });
    }
}

pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}
