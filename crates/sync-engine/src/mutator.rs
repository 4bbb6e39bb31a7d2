//! Optimistic Mutator
//!
//! Applies a mutation to the displayed page before the server answers, then
//! reconciles or rolls back when it does.
//!
//! Mutations on one resource id are strictly serialized: while one is in
//! flight, later ones wait in a FIFO queue and are only started (with a fresh
//! snapshot) once the earlier one has been reconciled. Different ids run
//! concurrently with independent snapshots.
//!
//! If the page was replaced by a fetch while a mutation was in flight, its
//! result is applied to the new page by id lookup, or dropped when the id is
//! gone. Rollback never resurrects an item a refresh has removed.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::error::{ApiResult, ClientError, ValidationError};
use crate::models::{Entity, Page, ResourceId};
use crate::query::ListQueryState;
use crate::selection::SelectionSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Update,
    Delete,
    Complete,
}

impl MutationKind {
    pub fn label(&self) -> &'static str {
        match self {
            MutationKind::Update => "Update",
            MutationKind::Delete => "Delete",
            MutationKind::Complete => "Complete",
        }
    }
}

/// A requested change to one resource
#[derive(Debug, Clone, PartialEq)]
pub enum MutationIntent<T: Entity> {
    Update { id: ResourceId, fields: T::Fields },
    Delete { id: ResourceId },
    Complete { id: ResourceId },
}

impl<T: Entity> MutationIntent<T> {
    pub fn id(&self) -> ResourceId {
        match self {
            MutationIntent::Update { id, .. }
            | MutationIntent::Delete { id }
            | MutationIntent::Complete { id } => *id,
        }
    }

    pub fn kind(&self) -> MutationKind {
        match self {
            MutationIntent::Update { .. } => MutationKind::Update,
            MutationIntent::Delete { .. } => MutationKind::Delete,
            MutationIntent::Complete { .. } => MutationKind::Complete,
        }
    }
}

/// State captured right before an optimistic change
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub page: Page<T>,
    pub page_version: u64,
    pub was_selected: bool,
}

/// An optimistic change waiting for its server acknowledgment
#[derive(Debug, Clone)]
pub struct PendingMutation<T: Entity> {
    pub resource_id: ResourceId,
    pub kind: MutationKind,
    pub snapshot: Snapshot<T>,
    pub applied_at: DateTime<Utc>,
    seq: u64,
}

/// A started mutation; its remote call must be issued and the result passed
/// to `settle`
#[derive(Debug)]
pub struct Ticket<T: Entity> {
    seq: u64,
    intent: MutationIntent<T>,
}

impl<T: Entity> Ticket<T> {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn intent(&self) -> &MutationIntent<T> {
        &self.intent
    }
}

#[derive(Debug)]
pub enum Begin<T: Entity> {
    /// Applied locally; issue the remote call now
    Started(Ticket<T>),
    /// Another mutation for the same id is in flight; wait for promotion
    Queued { seq: u64 },
    /// The id is not on the displayed page
    NotDisplayed,
}

/// A queued intent leaving the queue after its predecessor settled
#[derive(Debug)]
pub enum Promotion<T: Entity> {
    Started(Ticket<T>),
    /// The id vanished from the page while the intent was queued
    Dropped { seq: u64 },
}

impl<T: Entity> Promotion<T> {
    pub fn seq(&self) -> u64 {
        match self {
            Promotion::Started(ticket) => ticket.seq,
            Promotion::Dropped { seq } => *seq,
        }
    }
}

/// Result of a mutation as seen by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<T: Entity> {
    /// The server accepted the change
    Confirmed { id: ResourceId, kind: MutationKind },
    /// The server refused; the page shows the pre-mutation state again.
    /// For updates `reopen` carries the original fields so editing can resume.
    RolledBack {
        id: ResourceId,
        kind: MutationKind,
        error: ClientError,
        reopen: Option<T::Fields>,
    },
    /// Nothing to apply: the id is not (or no longer) displayed
    Dropped { id: ResourceId, kind: MutationKind },
    /// Refused locally before anything was applied
    Invalid { id: ResourceId, error: ValidationError },
}

#[derive(Debug)]
pub struct Settled<T: Entity> {
    pub outcome: MutationOutcome<T>,
    pub promoted: Vec<Promotion<T>>,
}

#[derive(Debug)]
pub struct OptimisticMutator<T: Entity> {
    in_flight: HashMap<ResourceId, PendingMutation<T>>,
    queued: HashMap<ResourceId, VecDeque<(u64, MutationIntent<T>)>>,
    next_seq: u64,
}

impl<T: Entity> Default for OptimisticMutator<T> {
    fn default() -> Self {
        Self {
            in_flight: HashMap::new(),
            queued: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<T: Entity> OptimisticMutator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self, id: ResourceId) -> bool {
        self.in_flight.contains_key(&id)
    }

    pub fn pending(&self, id: ResourceId) -> Option<&PendingMutation<T>> {
        self.in_flight.get(&id)
    }

    /// Ids with a mutation in flight, ascending
    pub fn pending_ids(&self) -> Vec<ResourceId> {
        let mut ids: Vec<ResourceId> = self.in_flight.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn queued_len(&self, id: ResourceId) -> usize {
        self.queued.get(&id).map_or(0, VecDeque::len)
    }

    /// Start `intent` now, or queue it behind the in-flight mutation for the
    /// same id.
    pub fn begin(
        &mut self,
        intent: MutationIntent<T>,
        list: &mut ListQueryState<T>,
        selection: &mut SelectionSet,
    ) -> Begin<T> {
        self.next_seq += 1;
        let seq = self.next_seq;
        let id = intent.id();

        if self.in_flight.contains_key(&id) {
            debug!("[MUTATE] {} #{} queued behind in-flight mutation", intent.kind().label(), id);
            self.queued.entry(id).or_default().push_back((seq, intent));
            return Begin::Queued { seq };
        }

        match self.start(seq, intent, list, selection) {
            Some(ticket) => Begin::Started(ticket),
            None => Begin::NotDisplayed,
        }
    }

    fn start(
        &mut self,
        seq: u64,
        intent: MutationIntent<T>,
        list: &mut ListQueryState<T>,
        selection: &mut SelectionSet,
    ) -> Option<Ticket<T>> {
        let id = intent.id();
        let page_version = list.page_version();
        let page = list.page_mut()?;
        let position = page.position(id)?;

        let snapshot = Snapshot {
            page: page.clone(),
            page_version,
            was_selected: selection.has(id),
        };

        match &intent {
            MutationIntent::Delete { .. } => {
                page.items.remove(position);
                page.total = page.total.saturating_sub(1);
                selection.remove(id);
            }
            MutationIntent::Update { fields, .. } => {
                page.items[position].apply_fields(fields);
            }
            MutationIntent::Complete { .. } => {
                page.items[position].set_completed(true);
                selection.remove(id);
            }
        }

        debug!("[MUTATE] {} #{} applied optimistically", intent.kind().label(), id);
        self.in_flight.insert(
            id,
            PendingMutation {
                resource_id: id,
                kind: intent.kind(),
                snapshot,
                applied_at: Utc::now(),
                seq,
            },
        );
        Some(Ticket { seq, intent })
    }

    /// Reconcile a finished remote call and promote the next queued intent
    /// for the same id.
    ///
    /// `result` carries the server projection for update/complete and `None`
    /// for delete.
    pub fn settle(
        &mut self,
        ticket: Ticket<T>,
        result: ApiResult<Option<T>>,
        list: &mut ListQueryState<T>,
        selection: &mut SelectionSet,
    ) -> Settled<T> {
        let id = ticket.intent.id();
        let kind = ticket.intent.kind();

        let pending = match self.in_flight.remove(&id) {
            Some(pending) if pending.seq == ticket.seq => pending,
            other => {
                warn!("[MUTATE] settle for #{} without matching pending mutation", id);
                if let Some(pending) = other {
                    self.in_flight.insert(id, pending);
                }
                return Settled {
                    outcome: MutationOutcome::Dropped { id, kind },
                    promoted: Vec::new(),
                };
            }
        };

        let elapsed = Utc::now().signed_duration_since(pending.applied_at);
        let replaced = list.page_version() != pending.snapshot.page_version;
        let outcome = match result {
            Ok(server) => {
                info!(
                    "[MUTATE] {} #{} confirmed after {}ms",
                    kind.label(),
                    id,
                    elapsed.num_milliseconds()
                );
                reconcile(&pending, server, list, selection, replaced);
                MutationOutcome::Confirmed { id, kind }
            }
            Err(error) => {
                warn!("[MUTATE] {} #{} failed: {}", kind.label(), id, error);
                rollback(pending, error, list, selection, replaced)
            }
        };

        let promoted = self.promote(id, list, selection);
        Settled { outcome, promoted }
    }

    fn promote(
        &mut self,
        id: ResourceId,
        list: &mut ListQueryState<T>,
        selection: &mut SelectionSet,
    ) -> Vec<Promotion<T>> {
        let mut promoted = Vec::new();
        while let Some((seq, intent)) = self.queued.get_mut(&id).and_then(VecDeque::pop_front) {
            match self.start(seq, intent, list, selection) {
                Some(ticket) => {
                    promoted.push(Promotion::Started(ticket));
                    break;
                }
                None => {
                    debug!("[MUTATE] queued mutation for #{} dropped, no longer displayed", id);
                    promoted.push(Promotion::Dropped { seq });
                }
            }
        }
        if self.queued.get(&id).is_some_and(VecDeque::is_empty) {
            self.queued.remove(&id);
        }
        promoted
    }
}

fn reconcile<T: Entity>(
    pending: &PendingMutation<T>,
    server: Option<T>,
    list: &mut ListQueryState<T>,
    selection: &mut SelectionSet,
    replaced: bool,
) {
    let id = pending.resource_id;
    let Some(page) = list.page_mut() else {
        return;
    };

    match pending.kind {
        MutationKind::Delete => {
            // A refresh that raced the delete may still show the item
            if replaced {
                if let Some(position) = page.position(id) {
                    page.items.remove(position);
                    page.total = page.total.saturating_sub(1);
                    selection.remove(id);
                }
            }
        }
        MutationKind::Update | MutationKind::Complete => {
            let (Some(item), Some(server)) = (page.get_mut(id), server) else {
                return;
            };
            *item = server;
            if !item.is_selectable() {
                selection.remove(id);
            }
        }
    }
}

fn rollback<T: Entity>(
    pending: PendingMutation<T>,
    error: ClientError,
    list: &mut ListQueryState<T>,
    selection: &mut SelectionSet,
    replaced: bool,
) -> MutationOutcome<T> {
    let id = pending.resource_id;
    let kind = pending.kind;
    let dropped = MutationOutcome::Dropped { id, kind };

    let Some(original_position) = pending.snapshot.page.position(id) else {
        return dropped;
    };
    let original = &pending.snapshot.page.items[original_position];
    let Some(page) = list.page_mut() else {
        return dropped;
    };

    match kind {
        MutationKind::Delete => {
            if replaced {
                // The refreshed page is canonical: either it shows the item
                // already or the item is gone for good.
                return dropped;
            }
            let at = restore_position(&pending.snapshot.page.items[..original_position], page);
            page.items.insert(at, original.clone());
            page.total += 1;
            if pending.snapshot.was_selected && original.is_selectable() {
                selection.insert(id);
            }
            MutationOutcome::RolledBack { id, kind, error, reopen: None }
        }
        MutationKind::Update => {
            let Some(item) = page.get_mut(id) else {
                return dropped;
            };
            let fields = original.fields();
            item.apply_fields(&fields);
            MutationOutcome::RolledBack { id, kind, error, reopen: Some(fields) }
        }
        MutationKind::Complete => {
            let Some(item) = page.get_mut(id) else {
                return dropped;
            };
            item.set_completed(original.is_completed());
            if pending.snapshot.was_selected && !replaced && item.is_selectable() {
                selection.insert(id);
            }
            MutationOutcome::RolledBack { id, kind, error, reopen: None }
        }
    }
}

/// Index right after the nearest preceding neighbour (in snapshot order) that
/// is still displayed, so relative order survives concurrent removals.
fn restore_position<T: Entity>(preceding: &[T], page: &Page<T>) -> usize {
    preceding
        .iter()
        .rev()
        .find_map(|prev| page.position(prev.id()))
        .map_or(0, |position| position + 1)
}
