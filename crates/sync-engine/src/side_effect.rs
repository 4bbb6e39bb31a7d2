//! Side-Effect Scheduler
//!
//! Tag extraction after a successful create/update of tag-worthy text.
//! Extraction is best-effort enrichment: it runs only after the primary
//! mutation was acknowledged, and its failure is logged, never surfaced and
//! never rolled back into the primary mutation.

use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::OnceLock;

use log::{debug, warn};
use regex::Regex;

use crate::api::ResourceClient;
use crate::models::{Entity, ResourceId};

static HASHTAG: OnceLock<Regex> = OnceLock::new();
static CHECKLIST_ITEM: OnceLock<Regex> = OnceLock::new();

fn hashtag() -> &'static Regex {
    HASHTAG.get_or_init(|| Regex::new(r"#\w+").expect("valid hashtag pattern"))
}

fn checklist_item() -> &'static Regex {
    CHECKLIST_ITEM.get_or_init(|| Regex::new(r"(?m)^- \[ \] .+$").expect("valid checklist pattern"))
}

/// Hashtag in title or content, or an unchecked `- [ ] ` item in content
pub fn is_tag_worthy(title: &str, content: &str) -> bool {
    hashtag().is_match(title) || hashtag().is_match(content) || has_checklist_items(content)
}

/// Unchecked items become action items on the server when extracted
pub fn has_checklist_items(content: &str) -> bool {
    checklist_item().is_match(content)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Created,
    Updated,
}

/// Extraction the controller must run after a confirmed mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowUp {
    pub resource_id: ResourceId,
    pub trigger: Trigger,
    pub creates_action_items: bool,
}

/// What the caller refreshes once extraction has resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionReport {
    pub resource_id: ResourceId,
    pub succeeded: bool,
    pub reload_page: bool,
    pub reload_tags: bool,
    pub reload_action_items: bool,
}

#[derive(Debug, Default)]
pub struct SideEffectScheduler {
    running: RefCell<HashSet<ResourceId>>,
}

impl SideEffectScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether a confirmed create/update needs extraction
    pub fn plan<T: Entity>(&self, trigger: Trigger, id: ResourceId, fields: &T::Fields) -> Option<FollowUp> {
        if T::wants_extraction(fields) {
            debug!("[EXTRACT] #{} scheduled after {:?}", id, trigger);
            Some(FollowUp {
                resource_id: id,
                trigger,
                creates_action_items: T::extracts_action_items(fields),
            })
        } else {
            None
        }
    }

    pub fn is_running(&self, id: ResourceId) -> bool {
        self.running.borrow().contains(&id)
    }

    /// Call `extract_tags` and report once it has resolved either way.
    /// The page and the tag directory are refreshed after every extraction,
    /// the action items list only when checklist items were sent.
    pub async fn run<C>(&self, client: &C, follow_up: FollowUp) -> ExtractionReport
    where
        C: ResourceClient + ?Sized,
    {
        let id = follow_up.resource_id;
        self.running.borrow_mut().insert(id);
        let result = client.extract_tags(id).await;
        self.running.borrow_mut().remove(&id);

        let succeeded = match result {
            Ok(()) => {
                debug!("[EXTRACT] #{} tags extracted", id);
                true
            }
            Err(err) => {
                warn!("[EXTRACT] #{} extraction failed, ignoring: {}", id, err);
                false
            }
        };

        ExtractionReport {
            resource_id: id,
            succeeded,
            reload_page: true,
            reload_tags: true,
            reload_action_items: follow_up.creates_action_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionItem, ActionItemFields, Note, NoteFields};

    #[test]
    fn test_hashtag_in_title() {
        assert!(is_tag_worthy("Buy #milk", ""));
    }

    #[test]
    fn test_hashtag_in_content() {
        assert!(is_tag_worthy("Groceries", "remember #errands today"));
    }

    #[test]
    fn test_checklist_item_in_content() {
        assert!(is_tag_worthy("Plan", "intro\n- [ ] write tests\n"));
        assert!(!is_tag_worthy("Plan", "- [x] done already"));
        assert!(!is_tag_worthy("- [ ] only in title", ""));
    }

    #[test]
    fn test_checklist_detection_ignores_hashtags() {
        assert!(has_checklist_items("- [ ] pack bags"));
        assert!(!has_checklist_items("#travel soon"));
        assert!(!has_checklist_items("- [x] packed"));
    }

    #[test]
    fn test_plain_text() {
        assert!(!is_tag_worthy("Groceries", "milk, eggs"));
        assert!(!is_tag_worthy("Price", "costs # 5"));
    }

    #[test]
    fn test_plan_uses_entity_rules() {
        let scheduler = SideEffectScheduler::new();
        let plan = scheduler.plan::<Note>(Trigger::Updated, 7, &NoteFields::new("Buy #milk", "x"));
        assert_eq!(
            plan,
            Some(FollowUp { resource_id: 7, trigger: Trigger::Updated, creates_action_items: false })
        );

        let plan = scheduler.plan::<Note>(Trigger::Created, 8, &NoteFields::new("Trip", "- [ ] pack bags"));
        assert!(plan.unwrap().creates_action_items);

        assert!(scheduler
            .plan::<ActionItem>(Trigger::Created, 1, &ActionItemFields::new("#urgent"))
            .is_none());
    }
}
