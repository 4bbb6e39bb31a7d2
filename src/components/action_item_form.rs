//! Action Item Form Component

use leptos::prelude::*;
use leptos::task::spawn_local;
use notes_sync_engine::ActionItemFields;

use crate::context::use_app_context;

#[component]
pub fn ActionItemForm() -> impl IntoView {
    let ctx = use_app_context();

    let (description, set_description) = signal(String::new());
    let (error, set_error) = signal::<Option<String>>(None);

    let create_item = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let fields = ActionItemFields::new(description.get());
        let action_items = ctx.action_items();
        spawn_local(async move {
            match action_items.create(fields).await {
                Ok(_) => {
                    set_description.set(String::new());
                    set_error.set(None);
                }
                Err(err) => set_error.set(Some(err.user_message())),
            }
        });
    };

    view! {
        <form class="action-item-form" on:submit=create_item>
            <input
                type="text"
                placeholder="Add action item..."
                prop:value=move || description.get()
                on:input=move |ev| set_description.set(event_target_value(&ev))
            />
            <button type="submit">"Add"</button>
            {move || error.get().map(|message| view! { <span class="form-error">{message}</span> })}
        </form>
    }
}
