//! Action Items List Component
//!
//! Status filter, paginated items with checkboxes and complete buttons, and
//! bulk completion of the checked ones.

use leptos::prelude::*;
use leptos::task::spawn_local;
use notes_sync_engine::ActionItem;

use crate::components::Pagination;
use crate::context::use_app_context;
use crate::store::{store_action_items, use_app_store, AppStateStoreFields};

/// Status filter options: (label, completed query value)
const STATUS_FILTERS: &[(&str, Option<bool>)] = &[
    ("All", None),
    ("Open", Some(false)),
    ("Done", Some(true)),
];

#[component]
fn StatusFilter() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    let current = move || {
        store
            .action_items()
            .read()
            .as_ref()
            .and_then(|view| view.query.completed)
    };

    view! {
        <div class="status-filter">
            {STATUS_FILTERS.iter().map(|(label, completed)| {
                let completed = *completed;
                view! {
                    <button
                        type="button"
                        class=move || if current() == completed { "type-btn small active" } else { "type-btn small" }
                        on:click=move |_| {
                            let action_items = ctx.action_items();
                            spawn_local(async move {
                                action_items.set_completed_filter(completed).await;
                            });
                        }
                    >
                        {*label}
                    </button>
                }
            }).collect_view()}
        </div>
    }
}

#[component]
fn ActionItemRow(item: ActionItem) -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();
    let id = item.id;
    let completed = item.completed;

    let selected = move || {
        store
            .action_items()
            .read()
            .as_ref()
            .is_some_and(|view| view.is_selected(id))
    };
    let pending = move || {
        store
            .action_items()
            .read()
            .as_ref()
            .is_some_and(|view| view.is_pending(id))
    };

    let complete = move |_: leptos::ev::MouseEvent| {
        let action_items = ctx.action_items();
        spawn_local(async move {
            action_items.complete(id).await;
        });
    };

    view! {
        <li class=move || {
            if completed { "action-row done" } else if pending() { "action-row pending" } else { "action-row" }
        }>
            <input
                type="checkbox"
                disabled=completed
                prop:checked=selected
                on:change=move |_| {
                    ctx.action_items().toggle_selection(id);
                }
            />
            <span class="action-description">{item.description.clone()}</span>
            <Show when=move || !completed>
                <button class="complete-btn" disabled=pending on:click=complete>"Complete"</button>
            </Show>
        </li>
    }
}

#[component]
pub fn ActionItemsList() -> impl IntoView {
    let ctx = use_app_context();
    let store = use_app_store();

    let items = move || store_action_items(&store);
    let loading = move || store.action_items().read().as_ref().is_some_and(|view| view.loading);
    let selected_count = move || {
        store
            .action_items()
            .read()
            .as_ref()
            .map_or(0, |view| view.selected.len())
    };
    let page = Signal::derive(move || {
        store.action_items().read().as_ref().map_or(1, |view| view.query.page)
    });
    let total_pages = Signal::derive(move || {
        store.action_items().read().as_ref().map_or(1, |view| view.total_pages())
    });

    let go_to_page = Callback::new(move |target: u32| {
        let action_items = ctx.action_items();
        spawn_local(async move {
            action_items.set_page(target).await;
        });
    });

    let complete_selected = move |_: leptos::ev::MouseEvent| {
        let action_items = ctx.action_items();
        spawn_local(async move {
            // Failures surface through the notice banner
            let _ = action_items.complete_selected().await;
        });
    };

    view! {
        <section class="action-items-section">
            <h2>"Action Items"</h2>
            <StatusFilter />
            <div class="bulk-row">
                <button disabled=move || selected_count() == 0 on:click=complete_selected>
                    {move || format!("Complete selected ({})", selected_count())}
                </button>
                <button class="cancel-btn" on:click=move |_| ctx.action_items().clear_selection()>
                    "Clear"
                </button>
            </div>
            <ul class=move || if loading() { "action-list loading" } else { "action-list" }>
                <For
                    each=items
                    key=|item| (item.id, item.completed, item.description.clone())
                    children=move |item| view! { <ActionItemRow item=item /> }
                />
            </ul>
            <Show when=move || items().is_empty() && !loading()>
                <p class="empty">"Nothing to do."</p>
            </Show>
            <Pagination page=page total_pages=total_pages on_change=go_to_page />
        </section>
    }
}
