//! Notes Sync Engine
//!
//! Client-side state for the notes and action-items backend: paginated
//! queries with last-writer-wins fetches, optimistic mutations with
//! rollback, selections for bulk operations and follow-up tag extraction.
//! Framework-free; the UI subscribes to controllers and renders their views.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod mutator;
pub mod query;
pub mod selection;
pub mod side_effect;
pub mod tags;
pub mod validate;

pub use api::{ActionItemsApi, Http, NotesApi, ResourceClient, TagClient, TagsApi};
pub use config::{ApiConfig, SortOrder, UnknownSortOrder, DEFAULT_PAGE_SIZE};
pub use controller::{ListController, ListView};
pub use error::{ApiResult, ClientError, CreateError, ValidationError};
pub use models::{ActionItem, ActionItemFields, Entity, Note, NoteFields, Page, ResourceId, Tag};
pub use mutator::{MutationIntent, MutationKind, MutationOutcome};
pub use query::{FetchApplied, Query, QueryMode};
pub use tags::{TagDirectory, TagsController};

pub type NotesController = ListController<NotesApi>;
pub type ActionItemsController = ListController<ActionItemsApi>;
