//! Note Form Component
//!
//! Creates a note. Validation runs in the controller before any request.

use leptos::prelude::*;
use leptos::task::spawn_local;
use notes_sync_engine::NoteFields;

use crate::context::use_app_context;

#[component]
pub fn NoteForm() -> impl IntoView {
    let ctx = use_app_context();

    let (title, set_title) = signal(String::new());
    let (content, set_content) = signal(String::new());
    let (saving, set_saving) = signal(false);
    let (error, set_error) = signal::<Option<String>>(None);

    let create_note = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let fields = NoteFields::new(title.get(), content.get());
        let notes = ctx.notes();
        set_saving.set(true);
        spawn_local(async move {
            match notes.create(fields).await {
                Ok(_) => {
                    set_title.set(String::new());
                    set_content.set(String::new());
                    set_error.set(None);
                }
                Err(err) => set_error.set(Some(err.user_message())),
            }
            set_saving.set(false);
        });
    };

    view! {
        <form class="note-form" on:submit=create_note>
            <input
                type="text"
                placeholder="Title"
                prop:value=move || title.get()
                on:input=move |ev| set_title.set(event_target_value(&ev))
            />
            <textarea
                placeholder="Content (markdown, #tags and - [ ] items welcome)"
                prop:value=move || content.get()
                on:input=move |ev| set_content.set(event_target_value(&ev))
            />
            <div class="form-row">
                <button type="submit" disabled=move || saving.get()>"Add note"</button>
                {move || error.get().map(|message| view! { <span class="form-error">{message}</span> })}
            </div>
        </form>
    }
}
