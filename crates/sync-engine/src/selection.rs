//! Selection Set
//!
//! Ids checked for a bulk operation. Only valid against the page version it
//! was last reconciled with.

use std::collections::BTreeSet;

use crate::models::{Entity, Page, ResourceId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet {
    ids: BTreeSet<ResourceId>,
    page_version: u64,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`, returns whether it is now selected
    pub fn toggle(&mut self, id: ResourceId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Toggle against a page: ids that are not on it, or not selectable,
    /// are never added.
    pub fn toggle_in<T: Entity>(&mut self, id: ResourceId, page: &Page<T>, page_version: u64) -> bool {
        self.reconcile(page_version);
        match page.get(id) {
            Some(item) if item.is_selectable() => self.toggle(id),
            _ => {
                self.ids.remove(&id);
                false
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn size(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn has(&self, id: ResourceId) -> bool {
        self.ids.contains(&id)
    }

    /// Selected ids in ascending order
    pub fn ids(&self) -> Vec<ResourceId> {
        self.ids.iter().copied().collect()
    }

    pub fn remove(&mut self, id: ResourceId) -> bool {
        self.ids.remove(&id)
    }

    pub(crate) fn insert(&mut self, id: ResourceId) {
        self.ids.insert(id);
    }

    /// Forget everything when the page underneath has been replaced
    pub fn reconcile(&mut self, page_version: u64) {
        if self.page_version != page_version {
            self.ids.clear();
            self.page_version = page_version;
        }
    }

    pub fn page_version(&self) -> u64 {
        self.page_version
    }
}
