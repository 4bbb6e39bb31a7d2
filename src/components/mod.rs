//! UI Components
//!
//! Reusable Leptos components.

mod action_item_form;
mod action_items_list;
mod delete_confirm_button;
mod note_form;
mod notes_list;
mod notice_banner;
mod pagination;
mod tag_filter_bar;

pub use action_item_form::ActionItemForm;
pub use action_items_list::ActionItemsList;
pub use delete_confirm_button::DeleteConfirmButton;
pub use note_form::NoteForm;
pub use notes_list::NotesList;
pub use notice_banner::NoticeBanner;
pub use pagination::Pagination;
pub use tag_filter_bar::TagFilterBar;
