//! Notice Banner Component
//!
//! Non-blocking failure notices from both lists.

use leptos::prelude::*;

use crate::context::use_app_context;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn NoticeBanner() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    let notes_notice = move || store.notes().read().as_ref().and_then(|view| view.notice.clone());
    let actions_notice =
        move || store.action_items().read().as_ref().and_then(|view| view.notice.clone());

    view! {
        <div class="notices">
            {move || notes_notice().map(|message| view! {
                <div class="notice" role="alert">
                    <span>{message}</span>
                    <button class="notice-dismiss" on:click=move |_| ctx.notes().dismiss_notice()>"×"</button>
                </div>
            })}
            {move || actions_notice().map(|message| view! {
                <div class="notice" role="alert">
                    <span>{message}</span>
                    <button class="notice-dismiss" on:click=move |_| ctx.action_items().dismiss_notice()>"×"</button>
                </div>
            })}
        </div>
    }
}
