//! Pagination Component
//!
//! Previous/next controls with a "page X of Y" label.

use leptos::prelude::*;

#[component]
pub fn Pagination(
    #[prop(into)] page: Signal<u32>,
    #[prop(into)] total_pages: Signal<u32>,
    #[prop(into)] on_change: Callback<u32>,
) -> impl IntoView {
    view! {
        <div class="pagination">
            <button
                class="page-btn"
                disabled=move || page.get() <= 1
                on:click=move |_| on_change.run(page.get().saturating_sub(1).max(1))
            >
                "‹ Prev"
            </button>
            <span class="page-label">
                {move || format!("Page {} of {}", page.get(), total_pages.get())}
            </span>
            <button
                class="page-btn"
                disabled=move || page.get() >= total_pages.get()
                on:click=move |_| on_change.run(page.get() + 1)
            >
                "Next ›"
            </button>
        </div>
    }
}
