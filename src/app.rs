//! Notes Frontend App
//!
//! Two-column layout: notes on the left, action items on the right.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::components::{ActionItemForm, ActionItemsList, NoteForm, NoticeBanner, NotesList, TagFilterBar};
use crate::context::{api_config, AppContext};
use crate::store::AppState;

#[component]
pub fn App() -> impl IntoView {
    let config = api_config();
    log::info!("[APP] backend at {}", config.base_url);

    let store = Store::new(AppState::default());
    let ctx = AppContext::new(config);

    // Provide context to all children
    provide_context(store);
    provide_context(ctx);

    ctx.connect(store);
    ctx.start();

    view! {
        <div class="app-layout">
            <NoticeBanner />
            <main class="main-content">
                <div class="notes-column">
                    <NoteForm />
                    <TagFilterBar />
                    <NotesList />
                </div>
                <div class="actions-column">
                    <ActionItemForm />
                    <ActionItemsList />
                </div>
            </main>
        </div>
    }
}
