//! Tag Directory
//!
//! Known tags for the filter bar. Reloads are generation-checked the same way
//! list fetches are, so a slow reload never overwrites a newer one.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};

use crate::api::TagClient;
use crate::error::{ApiResult, ClientError, CreateError};
use crate::models::Tag;
use crate::validate;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagDirectory {
    tags: Vec<Tag>,
    generation: u64,
    loading: bool,
    last_error: Option<ClientError>,
}

impl TagDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn find(&self, id: u32) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    /// Start a reload, returns its generation
    pub fn begin_reload(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.generation
    }

    /// Apply a reload result; returns false when it was superseded
    pub fn apply(&mut self, generation: u64, result: ApiResult<Vec<Tag>>) -> bool {
        if generation != self.generation {
            debug!("[TAGS] discarding generation {} (current {})", generation, self.generation);
            return false;
        }
        self.loading = false;
        match result {
            Ok(mut tags) => {
                tags.sort_by(|a, b| a.name.cmp(&b.name));
                self.tags = tags;
                self.last_error = None;
            }
            Err(err) => {
                warn!("[TAGS] reload failed, keeping previous tags: {}", err);
                self.last_error = Some(err);
            }
        }
        true
    }

    /// Add or replace a tag, keeping name order
    pub fn upsert(&mut self, tag: Tag) {
        self.tags.retain(|existing| existing.id != tag.id);
        let at = self.tags.partition_point(|existing| existing.name < tag.name);
        self.tags.insert(at, tag);
    }

    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.tags.len();
        self.tags.retain(|tag| tag.id != id);
        self.tags.len() != before
    }
}

type Listener = Rc<dyn Fn()>;

/// Drives a `TagDirectory` against the backend
pub struct TagsController<C: TagClient> {
    client: Rc<C>,
    state: Rc<RefCell<TagDirectory>>,
    listeners: Rc<RefCell<Vec<Listener>>>,
}

impl<C: TagClient> Clone for TagsController<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            state: self.state.clone(),
            listeners: self.listeners.clone(),
        }
    }
}

impl<C: TagClient + 'static> TagsController<C> {
    pub fn new(client: C) -> Self {
        Self {
            client: Rc::new(client),
            state: Rc::new(RefCell::new(TagDirectory::new())),
            listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    fn notify(&self) {
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener();
        }
    }

    pub fn view(&self) -> TagDirectory {
        self.state.borrow().clone()
    }

    pub async fn reload(&self) {
        let generation = self.state.borrow_mut().begin_reload();
        self.notify();
        let result = self.client.list_tags().await;
        let applied = self.state.borrow_mut().apply(generation, result);
        if applied {
            self.notify();
        }
    }

    pub async fn create(&self, name: &str) -> Result<Tag, CreateError> {
        let name = name.trim();
        validate::tag_name(name)?;
        let tag = self.client.create_tag(name).await?;
        debug!("[TAGS] created #{} {:?}", tag.id, tag.name);
        self.state.borrow_mut().upsert(tag.clone());
        self.notify();
        Ok(tag)
    }

    pub async fn delete(&self, id: u32) -> ApiResult<()> {
        self.client.delete_tag(id).await?;
        debug!("[TAGS] deleted #{}", id);
        self.state.borrow_mut().remove(id);
        self.notify();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(id: u32, name: &str) -> Tag {
        Tag { id, name: name.to_string() }
    }

    #[test]
    fn test_reload_sorts_by_name() {
        let mut dir = TagDirectory::new();
        let generation = dir.begin_reload();
        assert!(dir.apply(generation, Ok(vec![tag(2, "python"), tag(1, "milk")])));
        let names: Vec<&str> = dir.tags().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["milk", "python"]);
        assert!(!dir.is_loading());
    }

    #[test]
    fn test_stale_reload_is_discarded() {
        let mut dir = TagDirectory::new();
        let first = dir.begin_reload();
        let second = dir.begin_reload();
        assert!(dir.apply(second, Ok(vec![tag(1, "new")])));
        assert!(!dir.apply(first, Ok(vec![tag(9, "old")])));
        assert_eq!(dir.tags(), &[tag(1, "new")]);
    }

    #[test]
    fn test_failed_reload_keeps_tags() {
        let mut dir = TagDirectory::new();
        let generation = dir.begin_reload();
        dir.apply(generation, Ok(vec![tag(1, "milk")]));

        let generation = dir.begin_reload();
        dir.apply(generation, Err(ClientError::Network("offline".to_string())));
        assert_eq!(dir.tags().len(), 1);
        assert!(dir.last_error().is_some());
    }

    #[test]
    fn test_upsert_and_remove() {
        let mut dir = TagDirectory::new();
        dir.upsert(tag(1, "b"));
        dir.upsert(tag(2, "a"));
        dir.upsert(tag(1, "c"));
        assert_eq!(dir.tags(), &[tag(2, "a"), tag(1, "c")]);
        assert!(dir.remove(2));
        assert!(!dir.remove(2));
        assert_eq!(dir.find(1).map(|t| t.name.as_str()), Some("c"));
    }
}
