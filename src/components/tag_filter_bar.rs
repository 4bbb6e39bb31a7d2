//! Tag Filter Bar Component
//!
//! Tag chips that filter the notes list, plus tag add/delete.

use leptos::prelude::*;
use leptos::task::spawn_local;
use notes_sync_engine::Tag;

use crate::components::DeleteConfirmButton;
use crate::context::use_app_context;
use crate::store::{use_app_store, AppStateStoreFields};

/// Tag add input
#[component]
fn TagAddInput() -> impl IntoView {
    let ctx = use_app_context();

    let (new_tag_name, set_new_tag_name) = signal(String::new());
    let (error, set_error) = signal::<Option<String>>(None);

    let add_tag = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let name = new_tag_name.get();
        let tags = ctx.tags();
        spawn_local(async move {
            match tags.create(&name).await {
                Ok(_) => {
                    set_new_tag_name.set(String::new());
                    set_error.set(None);
                }
                Err(err) => set_error.set(Some(err.user_message())),
            }
        });
    };

    view! {
        <form class="tag-add-form" on:submit=add_tag>
            <input
                type="text"
                placeholder="Add tag..."
                prop:value=move || new_tag_name.get()
                on:input=move |ev| set_new_tag_name.set(event_target_value(&ev))
            />
            <button type="submit">"+"</button>
            {move || error.get().map(|message| view! { <span class="form-error">{message}</span> })}
        </form>
    }
}

#[component]
fn TagChip(tag: Tag, #[prop(into)] active: Signal<bool>) -> impl IntoView {
    let ctx = use_app_context();
    let id = tag.id;

    let select = move |_: leptos::ev::MouseEvent| {
        let notes = ctx.notes();
        let next = if active.get_untracked() { None } else { Some(id) };
        spawn_local(async move {
            notes.set_tag(next).await;
        });
    };

    let delete = move |_: ()| {
        let tags = ctx.tags();
        let notes = ctx.notes();
        spawn_local(async move {
            match tags.delete(id).await {
                Ok(()) => {
                    notes.tag_deleted(id).await;
                }
                Err(err) => log::warn!("[TAGS] delete #{} failed: {}", id, err),
            }
        });
    };

    view! {
        <span class=move || if active.get() { "tag-chip active" } else { "tag-chip" }>
            <button class="tag-chip-name" on:click=select>"#" {tag.name}</button>
            <DeleteConfirmButton button_class="tag-delete-btn" on_confirm=Callback::new(delete) />
        </span>
    }
}

#[component]
pub fn TagFilterBar() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    let active_tag = move || store.notes().read().as_ref().and_then(|view| view.query.tag_id);

    let clear = move |_| {
        let notes = ctx.notes();
        spawn_local(async move {
            notes.set_tag(None).await;
        });
    };

    view! {
        <div class="tag-filter-bar">
            <button
                class=move || if active_tag().is_none() { "tag-chip active" } else { "tag-chip" }
                on:click=clear
            >
                "All"
            </button>
            <For
                each=move || store.tags().get()
                key=|tag| (tag.id, tag.name.clone())
                children=move |tag| {
                    let id = tag.id;
                    view! { <TagChip tag=tag active=Signal::derive(move || active_tag() == Some(id)) /> }
                }
            />
            <TagAddInput />
        </div>
    }
}
