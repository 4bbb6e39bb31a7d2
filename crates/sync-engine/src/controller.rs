//! List Controller
//!
//! Glue between one resource kind's client and its list state: issues the
//! fetches, runs optimistic mutations through the mutator, hands promoted
//! mutations to their waiting callers and schedules tag extraction.
//!
//! Single-threaded. State sits behind `Rc<RefCell<_>>` and no borrow is held
//! across an `.await`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::channel::oneshot;
use log::{debug, info, warn};

use crate::api::ResourceClient;
use crate::config::SortOrder;
use crate::error::{ApiResult, ClientError, CreateError};
use crate::models::{Entity, Page, ResourceId};
use crate::mutator::{Begin, MutationIntent, MutationOutcome, OptimisticMutator, Promotion, Ticket};
use crate::query::{FetchApplied, FetchTicket, ListQueryState, Query, QueryMode};
use crate::selection::SelectionSet;
use crate::side_effect::{FollowUp, SideEffectScheduler, Trigger};

/// Read-only copy of everything a list view renders
#[derive(Debug, Clone, PartialEq)]
pub struct ListView<T> {
    pub query: Query,
    pub page: Option<Page<T>>,
    pub loading: bool,
    pub selected: Vec<ResourceId>,
    pub pending: Vec<ResourceId>,
    pub notice: Option<String>,
}

impl<T: Entity> ListView<T> {
    pub fn is_selected(&self, id: ResourceId) -> bool {
        self.selected.contains(&id)
    }

    pub fn is_pending(&self, id: ResourceId) -> bool {
        self.pending.contains(&id)
    }

    pub fn total_pages(&self) -> u32 {
        self.page.as_ref().map_or(1, Page::total_pages)
    }
}

struct ListState<T: Entity> {
    list: ListQueryState<T>,
    selection: SelectionSet,
    mutator: OptimisticMutator<T>,
    /// Callers parked behind an in-flight mutation, keyed by their seq
    waiters: HashMap<u64, oneshot::Sender<Promotion<T>>>,
    notice: Option<String>,
}

type Listener = Rc<dyn Fn()>;

/// Listeners may subscribe more listeners, so call a snapshot
fn call_all(listeners: &RefCell<Vec<Listener>>) {
    let snapshot: Vec<Listener> = listeners.borrow().clone();
    for listener in snapshot {
        listener();
    }
}

pub struct ListController<C: ResourceClient> {
    client: Rc<C>,
    state: Rc<RefCell<ListState<C::Item>>>,
    side_effects: Rc<SideEffectScheduler>,
    listeners: Rc<RefCell<Vec<Listener>>>,
    tag_listeners: Rc<RefCell<Vec<Listener>>>,
    action_item_listeners: Rc<RefCell<Vec<Listener>>>,
}

impl<C: ResourceClient> Clone for ListController<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            state: self.state.clone(),
            side_effects: self.side_effects.clone(),
            listeners: self.listeners.clone(),
            tag_listeners: self.tag_listeners.clone(),
            action_item_listeners: self.action_item_listeners.clone(),
        }
    }
}

impl<C: ResourceClient + 'static> ListController<C> {
    pub fn new(client: C, page_size: u32, sort: SortOrder) -> Self {
        Self {
            client: Rc::new(client),
            state: Rc::new(RefCell::new(ListState {
                list: ListQueryState::new(Query::new(page_size, sort)),
                selection: SelectionSet::new(),
                mutator: OptimisticMutator::new(),
                waiters: HashMap::new(),
                notice: None,
            })),
            side_effects: Rc::new(SideEffectScheduler::new()),
            listeners: Rc::new(RefCell::new(Vec::new())),
            tag_listeners: Rc::new(RefCell::new(Vec::new())),
            action_item_listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }

    // ========================
    // Observation
    // ========================

    /// Called after every visible state change
    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Called after an extraction may have created tags
    pub fn on_tags_changed(&self, listener: impl Fn() + 'static) {
        self.tag_listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Called after an extraction turned checklist items into action items
    pub fn on_action_items_changed(&self, listener: impl Fn() + 'static) {
        self.action_item_listeners.borrow_mut().push(Rc::new(listener));
    }

    fn notify(&self) {
        call_all(&self.listeners);
    }

    pub fn view(&self) -> ListView<C::Item> {
        let state = self.state.borrow();
        ListView {
            query: state.list.query().clone(),
            page: state.list.page().cloned(),
            loading: state.list.is_loading(),
            selected: state.selection.ids(),
            pending: state.mutator.pending_ids(),
            notice: state.notice.clone(),
        }
    }

    pub fn query(&self) -> Query {
        self.state.borrow().list.query().clone()
    }

    pub fn dismiss_notice(&self) {
        self.state.borrow_mut().notice = None;
        self.notify();
    }

    fn set_notice(&self, message: String) {
        self.state.borrow_mut().notice = Some(message);
    }

    // ========================
    // Query
    // ========================

    pub async fn reload(&self) -> FetchApplied {
        let ticket = self.state.borrow_mut().list.reload();
        self.fetch(ticket).await
    }

    pub async fn set_search_text(&self, text: impl Into<String>) -> FetchApplied {
        let ticket = self.state.borrow_mut().list.set_search_text(text);
        self.fetch(ticket).await
    }

    pub async fn set_tag(&self, tag_id: Option<u32>) -> FetchApplied {
        let ticket = self.state.borrow_mut().list.set_tag(tag_id);
        self.fetch(ticket).await
    }

    pub async fn set_completed_filter(&self, completed: Option<bool>) -> FetchApplied {
        let ticket = self.state.borrow_mut().list.set_completed_filter(completed);
        self.fetch(ticket).await
    }

    pub async fn set_sort(&self, sort: SortOrder) -> FetchApplied {
        let ticket = self.state.borrow_mut().list.set_sort(sort);
        self.fetch(ticket).await
    }

    pub async fn set_page(&self, page: u32) -> FetchApplied {
        let ticket = self.state.borrow_mut().list.set_page(page);
        self.fetch(ticket).await
    }

    /// A tag was deleted: drop it as a filter, or refetch so its badges go
    pub async fn tag_deleted(&self, tag_id: u32) -> FetchApplied {
        if self.query().tag_id == Some(tag_id) {
            self.set_tag(None).await
        } else {
            self.reload().await
        }
    }

    async fn fetch(&self, mut ticket: FetchTicket) -> FetchApplied {
        loop {
            self.notify();
            debug!(
                "[QUERY] fetching page {} ({:?}, generation {})",
                ticket.query.page,
                ticket.mode(),
                ticket.generation
            );
            let result = match ticket.mode() {
                QueryMode::Listing => self.client.list(&ticket.query).await,
                QueryMode::Search => self.client.search(&ticket.query).await,
            };

            let applied = {
                let mut state = self.state.borrow_mut();
                let state = &mut *state;
                let applied = state.list.apply(ticket, result);
                match &applied {
                    FetchApplied::Replaced => state.selection.reconcile(state.list.page_version()),
                    FetchApplied::Failed(err) => state.notice = Some(err.user_message()),
                    FetchApplied::Stale | FetchApplied::Clamped(_) => {}
                }
                applied
            };

            match applied {
                FetchApplied::Clamped(next) => ticket = next,
                FetchApplied::Stale => return FetchApplied::Stale,
                other => {
                    self.notify();
                    return other;
                }
            }
        }
    }

    // ========================
    // Selection
    // ========================

    /// Returns whether `id` is selected afterwards
    pub fn toggle_selection(&self, id: ResourceId) -> bool {
        let selected = {
            let mut state = self.state.borrow_mut();
            let state = &mut *state;
            let version = state.list.page_version();
            match state.list.page() {
                Some(page) => state.selection.toggle_in(id, page, version),
                None => false,
            }
        };
        self.notify();
        selected
    }

    pub fn clear_selection(&self) {
        self.state.borrow_mut().selection.clear();
        self.notify();
    }

    // ========================
    // Mutations
    // ========================

    pub async fn create(
        &self,
        fields: <C::Item as Entity>::Fields,
    ) -> Result<C::Item, CreateError> {
        if let Err(err) = <C::Item as Entity>::validate(&fields) {
            self.set_notice(err.to_string());
            self.notify();
            return Err(err.into());
        }

        let created = match self.client.create(&fields).await {
            Ok(created) => created,
            Err(err) => {
                warn!("[MUTATE] Create failed: {}", err);
                self.set_notice(format!("Create failed: {}", err.user_message()));
                self.notify();
                return Err(err.into());
            }
        };
        info!("[MUTATE] Create #{} confirmed", created.id());

        match self.side_effects.plan::<C::Item>(Trigger::Created, created.id(), &fields) {
            Some(follow_up) => self.extract_then_reload(follow_up).await,
            None => {
                self.reload().await;
            }
        }
        Ok(created)
    }

    pub async fn update(
        &self,
        id: ResourceId,
        fields: <C::Item as Entity>::Fields,
    ) -> MutationOutcome<C::Item> {
        if let Err(error) = <C::Item as Entity>::validate(&fields) {
            self.set_notice(error.to_string());
            self.notify();
            return MutationOutcome::Invalid { id, error };
        }
        self.run(MutationIntent::Update { id, fields }).await
    }

    pub async fn delete(&self, id: ResourceId) -> MutationOutcome<C::Item> {
        self.run(MutationIntent::Delete { id }).await
    }

    pub async fn complete(&self, id: ResourceId) -> MutationOutcome<C::Item> {
        self.run(MutationIntent::Complete { id }).await
    }

    /// Complete `ids` in one call. No local flag flipping: on success the
    /// selection is cleared and the page reloaded.
    pub async fn bulk_complete(&self, ids: Vec<ResourceId>) -> ApiResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        match self.client.bulk_complete(&ids).await {
            Ok(()) => {
                info!("[MUTATE] Bulk complete of {} items confirmed", ids.len());
                self.state.borrow_mut().selection.clear();
                self.reload().await;
                Ok(())
            }
            Err(err) => {
                warn!("[MUTATE] Bulk complete failed: {}", err);
                self.set_notice(format!("Bulk complete failed: {}", err.user_message()));
                self.notify();
                Err(err)
            }
        }
    }

    pub async fn complete_selected(&self) -> ApiResult<()> {
        let ids = self.state.borrow().selection.ids();
        self.bulk_complete(ids).await
    }

    async fn run(&self, intent: MutationIntent<C::Item>) -> MutationOutcome<C::Item> {
        let id = intent.id();
        let kind = intent.kind();

        let begin = {
            let mut state = self.state.borrow_mut();
            let state = &mut *state;
            state.mutator.begin(intent, &mut state.list, &mut state.selection)
        };

        let ticket = match begin {
            Begin::Started(ticket) => ticket,
            Begin::NotDisplayed => {
                debug!("[MUTATE] {} #{} ignored, not displayed", kind.label(), id);
                return MutationOutcome::Dropped { id, kind };
            }
            Begin::Queued { seq } => {
                let (tx, rx) = oneshot::channel();
                self.state.borrow_mut().waiters.insert(seq, tx);
                self.notify();
                match rx.await {
                    Ok(Promotion::Started(ticket)) => ticket,
                    Ok(Promotion::Dropped { .. }) | Err(_) => {
                        return MutationOutcome::Dropped { id, kind };
                    }
                }
            }
        };

        self.notify();
        self.execute(ticket).await
    }

    async fn execute(&self, ticket: Ticket<C::Item>) -> MutationOutcome<C::Item> {
        let result = match ticket.intent() {
            MutationIntent::Update { id, fields } => self.client.update(*id, fields).await.map(Some),
            MutationIntent::Delete { id } => self.client.delete(*id).await.map(|()| None),
            MutationIntent::Complete { id } => self.client.complete(*id).await.map(Some),
        };
        let follow_up = match (ticket.intent(), &result) {
            (MutationIntent::Update { id, fields }, Ok(_)) => {
                self.side_effects.plan::<C::Item>(Trigger::Updated, *id, fields)
            }
            _ => None,
        };

        let outcome = self.settle(ticket, result);

        if let (MutationOutcome::Confirmed { .. }, Some(follow_up)) = (&outcome, follow_up) {
            self.extract_then_reload(follow_up).await;
        }
        outcome
    }

    fn settle(
        &self,
        ticket: Ticket<C::Item>,
        result: ApiResult<Option<C::Item>>,
    ) -> MutationOutcome<C::Item> {
        let settled = {
            let mut state = self.state.borrow_mut();
            let state = &mut *state;
            let settled = state.mutator.settle(ticket, result, &mut state.list, &mut state.selection);
            if let MutationOutcome::RolledBack { kind, error, .. } = &settled.outcome {
                state.notice = Some(format!("{} failed: {}", kind.label(), error.user_message()));
            }
            settled
        };
        self.hand_off(settled.promoted);
        self.notify();
        settled.outcome
    }

    /// Wake the callers whose queued mutations were just promoted
    fn hand_off(&self, promoted: Vec<Promotion<C::Item>>) {
        for promotion in promoted {
            let waiter = self.state.borrow_mut().waiters.remove(&promotion.seq());
            let unclaimed = match waiter {
                Some(tx) => tx.send(promotion).err(),
                None => Some(promotion),
            };
            if let Some(promotion) = unclaimed {
                self.abandon(promotion);
            }
        }
    }

    /// A started mutation nobody will execute: undo it quietly so the next
    /// one for the same id can go.
    fn abandon(&self, promotion: Promotion<C::Item>) {
        let Promotion::Started(ticket) = promotion else {
            return;
        };
        debug!("[MUTATE] {} #{} abandoned by its caller", ticket.intent().kind().label(), ticket.intent().id());
        let promoted = {
            let mut state = self.state.borrow_mut();
            let state = &mut *state;
            let abandoned = Err(ClientError::Network("abandoned".to_string()));
            state.mutator.settle(ticket, abandoned, &mut state.list, &mut state.selection).promoted
        };
        self.hand_off(promoted);
    }

    async fn extract_then_reload(&self, follow_up: FollowUp) {
        let report = self.side_effects.run(self.client.as_ref(), follow_up).await;
        if report.reload_page {
            self.reload().await;
        }
        if report.reload_tags {
            call_all(&self.tag_listeners);
        }
        if report.reload_action_items {
            call_all(&self.action_item_listeners);
        }
    }

    pub fn is_extracting(&self, id: ResourceId) -> bool {
        self.side_effects.is_running(id)
    }
}
