//! Notes List Component
//!
//! Search box, sort selector, the current page of notes with inline
//! edit/delete, and pagination.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use notes_sync_engine::{MutationOutcome, Note, NoteFields, SortOrder};

use crate::components::{DeleteConfirmButton, Pagination};
use crate::context::use_app_context;
use crate::markdown::{parse_markdown, preview_line};
use crate::store::{store_notes, use_app_store, AppStateStoreFields};

/// Quiet period before a search is sent
const SEARCH_DEBOUNCE_MS: u32 = 300;

#[component]
fn SearchBox() -> impl IntoView {
    let ctx = use_app_context();
    let (text, set_text) = signal(String::new());
    // Bumped per keystroke; only the newest timer fires a search
    let (keystroke, set_keystroke) = signal(0u64);

    let on_input = move |ev: leptos::ev::Event| {
        set_text.set(event_target_value(&ev));
        set_keystroke.update(|k| *k += 1);
        let mine = keystroke.get_untracked();
        let notes = ctx.notes();
        spawn_local(async move {
            TimeoutFuture::new(SEARCH_DEBOUNCE_MS).await;
            if keystroke.get_untracked() == mine {
                notes.set_search_text(text.get_untracked()).await;
            }
        });
    };

    let on_sort = move |ev: leptos::ev::Event| {
        let sort: SortOrder = event_target_value(&ev).parse().unwrap_or_default();
        let notes = ctx.notes();
        spawn_local(async move {
            notes.set_sort(sort).await;
        });
    };

    view! {
        <div class="search-row">
            <input
                type="search"
                placeholder="Search notes..."
                prop:value=move || text.get()
                on:input=on_input
            />
            <select on:change=on_sort>
                <option value="created_desc">"Newest first"</option>
                <option value="title_asc">"Title A–Z"</option>
            </select>
        </div>
    }
}

#[component]
fn NoteRow(note: Note) -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let id = note.id;

    let (draft_title, set_draft_title) = signal(note.title.clone());
    let (draft_content, set_draft_content) = signal(note.content.clone());
    let (error, set_error) = signal::<Option<String>>(None);

    let editing = move || store.editing_note().get() == Some(id);
    let pending = move || {
        store
            .notes()
            .read()
            .as_ref()
            .is_some_and(|view| view.is_pending(id))
    };

    let start_edit = {
        let note = note.clone();
        move |_: leptos::ev::MouseEvent| {
            set_draft_title.set(note.title.clone());
            set_draft_content.set(note.content.clone());
            set_error.set(None);
            store.editing_note().set(Some(id));
        }
    };

    let save = move |_: leptos::ev::MouseEvent| {
        let fields = NoteFields::new(draft_title.get(), draft_content.get());
        let notes = ctx.notes();
        store.editing_note().set(None);
        spawn_local(async move {
            match notes.update(id, fields).await {
                MutationOutcome::RolledBack { reopen: Some(fields), .. } => {
                    set_draft_title.set(fields.title);
                    set_draft_content.set(fields.content);
                    store.editing_note().set(Some(id));
                }
                MutationOutcome::Invalid { error, .. } => {
                    set_error.set(Some(error.to_string()));
                    store.editing_note().set(Some(id));
                }
                _ => set_error.set(None),
            }
        });
    };

    let delete = move |_: ()| {
        let notes = ctx.notes();
        spawn_local(async move {
            notes.delete(id).await;
        });
    };

    let tags = note.tags.clone();
    let title = note.title.clone();
    let preview = preview_line(&note.content).to_string();
    let rendered = parse_markdown(&note.content);

    view! {
        <li class=move || if pending() { "note-row pending" } else { "note-row" }>
            <Show
                when=editing
                fallback=move || view! {
                    <div class="note-header">
                        <span class="note-title">{title.clone()}</span>
                        <span class="note-tags">
                            {tags.iter().map(|tag| view! { <span class="tag-badge">"#" {tag.name.clone()}</span> }).collect_view()}
                        </span>
                        <button class="edit-btn" on:click=start_edit.clone()>"Edit"</button>
                        <DeleteConfirmButton
                            button_class="delete-btn"
                            on_confirm=Callback::new(delete)
                            disabled=Signal::derive(pending)
                        />
                    </div>
                    <details class="note-body">
                        <summary>{preview.clone()}</summary>
                        <div class="markdown" inner_html=rendered.clone()></div>
                    </details>
                }
            >
                <div class="note-edit">
                    <input
                        type="text"
                        prop:value=move || draft_title.get()
                        on:input=move |ev| set_draft_title.set(event_target_value(&ev))
                    />
                    <textarea
                        prop:value=move || draft_content.get()
                        on:input=move |ev| set_draft_content.set(event_target_value(&ev))
                    />
                    <div class="form-row">
                        <button on:click=save>"Save"</button>
                        <button class="cancel-btn" on:click=move |_| store.editing_note().set(None)>"Cancel"</button>
                    </div>
                </div>
            </Show>
            {move || error.get().map(|message| view! { <span class="form-error">{message}</span> })}
        </li>
    }
}

#[component]
pub fn NotesList() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    let notes = move || store_notes(&store);
    let loading = move || store.notes().read().as_ref().is_some_and(|view| view.loading);
    let page = Signal::derive(move || store.notes().read().as_ref().map_or(1, |view| view.query.page));
    let total_pages =
        Signal::derive(move || store.notes().read().as_ref().map_or(1, |view| view.total_pages()));
    let total = move || {
        store
            .notes()
            .read()
            .as_ref()
            .and_then(|view| view.page.as_ref())
            .map_or(0, |page| page.total)
    };

    let go_to_page = Callback::new(move |target: u32| {
        let notes = ctx.notes();
        spawn_local(async move {
            notes.set_page(target).await;
        });
    });

    view! {
        <section class="notes-section">
            <h2>"Notes"</h2>
            <SearchBox />
            <ul class=move || if loading() { "notes-list loading" } else { "notes-list" }>
                // Rows are keyed on content so a reconciled note re-renders
                <For
                    each=notes
                    key=|note| (note.id, note.title.clone(), note.content.clone(), note.tags.len())
                    children=move |note| view! { <NoteRow note=note /> }
                />
            </ul>
            <Show when=move || notes().is_empty() && !loading()>
                <p class="empty">"No notes found."</p>
            </Show>
            <p class="item-count">{move || format!("{} notes", total())}</p>
            <Pagination page=page total_pages=total_pages on_change=go_to_page />
        </section>
    }
}
