//! Resource Models
//!
//! Client-side projections of backend resources and the paginated result
//! envelope they arrive in.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::error::ValidationError;
use crate::side_effect::{has_checklist_items, is_tag_worthy};
use crate::validate;

/// Server-assigned resource identifier
pub type ResourceId = u32;

/// Core trait for every resource projection held in a page
///
/// The client never owns identity: `id` comes from the server and never
/// changes. `Fields` are the user-editable parts sent on create/update.
pub trait Entity: Clone + PartialEq + Debug + 'static {
    /// Mutable fields accepted by create/update
    type Fields: Clone + PartialEq + Debug + Serialize + 'static;

    /// Returns the entity's unique identifier
    fn id(&self) -> ResourceId;

    /// Current values of the mutable fields
    fn fields(&self) -> Self::Fields;

    /// Overwrite the mutable fields in place, leaving identity and
    /// server-owned data (tags) untouched
    fn apply_fields(&mut self, fields: &Self::Fields);

    fn is_completed(&self) -> bool {
        false
    }

    /// No-op for kinds without a completion flag
    fn set_completed(&mut self, _completed: bool) {}

    /// Completed items cannot take part in a bulk selection
    fn is_selectable(&self) -> bool {
        !self.is_completed()
    }

    /// Client-side checks run before any request is made
    fn validate(_fields: &Self::Fields) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Whether a successful create/update must be followed by tag extraction
    fn wants_extraction(_fields: &Self::Fields) -> bool {
        false
    }

    /// Whether extraction also turns part of the text into action items
    fn extracts_action_items(_fields: &Self::Fields) -> bool {
        false
    }
}

/// Tag data structure (matches backend)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: u32,
    pub name: String,
}

/// Note data structure (matches backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: ResourceId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Editable note fields, also the create/update request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteFields {
    pub title: String,
    pub content: String,
}

impl NoteFields {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

impl Entity for Note {
    type Fields = NoteFields;

    fn id(&self) -> ResourceId {
        self.id
    }

    fn fields(&self) -> NoteFields {
        NoteFields::new(self.title.clone(), self.content.clone())
    }

    fn apply_fields(&mut self, fields: &NoteFields) {
        self.title = fields.title.clone();
        self.content = fields.content.clone();
    }

    fn validate(fields: &NoteFields) -> Result<(), ValidationError> {
        validate::note_fields(fields)
    }

    fn wants_extraction(fields: &NoteFields) -> bool {
        is_tag_worthy(&fields.title, &fields.content)
    }

    fn extracts_action_items(fields: &NoteFields) -> bool {
        has_checklist_items(&fields.content)
    }
}

/// Action item data structure (matches backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: ResourceId,
    pub description: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItemFields {
    pub description: String,
}

impl ActionItemFields {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

impl Entity for ActionItem {
    type Fields = ActionItemFields;

    fn id(&self) -> ResourceId {
        self.id
    }

    fn fields(&self) -> ActionItemFields {
        ActionItemFields::new(self.description.clone())
    }

    fn apply_fields(&mut self, fields: &ActionItemFields) {
        self.description = fields.description.clone();
    }

    fn is_completed(&self) -> bool {
        self.completed
    }

    fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    fn validate(fields: &ActionItemFields) -> Result<(), ValidationError> {
        validate::action_item_fields(fields)
    }
}

/// One windowed result set of a query
///
/// `total` spans every page of the query, `items` only this window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Number of pages for `total`, never less than 1
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.page_size)
    }
}

impl<T: Entity> Page<T> {
    pub fn position(&self, id: ResourceId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn get(&self, id: ResourceId) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn ids(&self) -> Vec<ResourceId> {
        self.items.iter().map(Entity::id).collect()
    }
}

pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 || total == 0 {
        return 1;
    }
    let pages = total.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: u32, title: &str) -> Note {
        Note {
            id,
            title: title.to_string(),
            content: String::new(),
            tags: vec![],
        }
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 1);
    }

    #[test]
    fn test_apply_fields_keeps_tags() {
        let mut n = note(1, "Old");
        n.tags.push(Tag { id: 9, name: "milk".to_string() });
        n.apply_fields(&NoteFields::new("New", "body"));
        assert_eq!(n.title, "New");
        assert_eq!(n.content, "body");
        assert_eq!(n.tags.len(), 1);
    }

    #[test]
    fn test_completed_items_are_not_selectable() {
        let mut item = ActionItem { id: 1, description: "Ship it".to_string(), completed: false };
        assert!(item.is_selectable());
        item.set_completed(true);
        assert!(!item.is_selectable());
        assert!(note(2, "n").is_selectable());
    }

    #[test]
    fn test_note_deserializes_without_tags() {
        let n: Note = serde_json::from_str(r#"{"id":3,"title":"t","content":"c"}"#).unwrap();
        assert!(n.tags.is_empty());
    }
}
