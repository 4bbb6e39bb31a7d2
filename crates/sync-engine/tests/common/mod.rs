//! In-memory backend whose calls park until the test answers them

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use notes_sync_engine::{
    ActionItem, ApiResult, ClientError, Entity, ListController, Note, Page, Query, ResourceClient,
    ResourceId, SortOrder,
};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(Query),
    Search(Query),
    Create(Value),
    Update(ResourceId, Value),
    Delete(ResourceId),
    Complete(ResourceId),
    BulkComplete(Vec<ResourceId>),
    Extract(ResourceId),
}

impl Call {
    pub fn is_fetch(&self) -> bool {
        matches!(self, Call::List(_) | Call::Search(_))
    }
}

#[derive(Debug)]
pub enum Reply<T> {
    Page(Page<T>),
    Item(T),
    Done,
    Fail(ClientError),
}

struct Parked<T> {
    call: Call,
    reply: Option<oneshot::Sender<Reply<T>>>,
}

/// Test-side handle: inspect calls and answer them in any order
pub struct Server<T> {
    inbox: RefCell<Vec<Parked<T>>>,
}

impl<T: Entity> Server<T> {
    pub fn calls(&self) -> Vec<Call> {
        self.inbox.borrow().iter().map(|parked| parked.call.clone()).collect()
    }

    pub fn unanswered(&self) -> Vec<Call> {
        self.inbox
            .borrow()
            .iter()
            .filter(|parked| parked.reply.is_some())
            .map(|parked| parked.call.clone())
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.inbox.borrow().iter().filter(|parked| pred(&parked.call)).count()
    }

    /// Answer the oldest unanswered call matching `pred`
    pub fn answer(&self, pred: impl Fn(&Call) -> bool, reply: Reply<T>) {
        let sender = self
            .inbox
            .borrow_mut()
            .iter_mut()
            .find(|parked| parked.reply.is_some() && pred(&parked.call))
            .and_then(|parked| parked.reply.take())
            .expect("no unanswered call matches");
        sender.send(reply).map_err(|_| ()).expect("caller went away");
    }

    pub fn answer_fetch(&self, page: Page<T>) {
        self.answer(Call::is_fetch, Reply::Page(page));
    }

    pub fn last_fetch(&self) -> Option<Query> {
        self.calls().into_iter().rev().find_map(|call| match call {
            Call::List(query) | Call::Search(query) => Some(query),
            _ => None,
        })
    }
}

pub struct ScriptedClient<T> {
    server: Rc<Server<T>>,
}

impl<T: Entity> ScriptedClient<T> {
    pub fn new() -> (Self, Rc<Server<T>>) {
        let server = Rc::new(Server {
            inbox: RefCell::new(Vec::new()),
        });
        (Self { server: server.clone() }, server)
    }

    async fn park(&self, call: Call) -> Reply<T> {
        let (tx, rx) = oneshot::channel();
        self.server.inbox.borrow_mut().push(Parked { call, reply: Some(tx) });
        rx.await.unwrap_or_else(|_| Reply::Fail(ClientError::Network("unanswered".to_string())))
    }
}

fn page_of<T>(reply: Reply<T>) -> ApiResult<Page<T>> {
    match reply {
        Reply::Page(page) => Ok(page),
        Reply::Fail(err) => Err(err),
        other => panic!("expected a page reply, got {:?}", other.kind()),
    }
}

fn item_of<T>(reply: Reply<T>) -> ApiResult<T> {
    match reply {
        Reply::Item(item) => Ok(item),
        Reply::Fail(err) => Err(err),
        other => panic!("expected an item reply, got {:?}", other.kind()),
    }
}

fn done_of<T>(reply: Reply<T>) -> ApiResult<()> {
    match reply {
        Reply::Done => Ok(()),
        Reply::Fail(err) => Err(err),
        other => panic!("expected an empty reply, got {:?}", other.kind()),
    }
}

impl<T> Reply<T> {
    fn kind(&self) -> &'static str {
        match self {
            Reply::Page(_) => "page",
            Reply::Item(_) => "item",
            Reply::Done => "done",
            Reply::Fail(_) => "fail",
        }
    }
}

#[async_trait(?Send)]
impl<T: Entity> ResourceClient for ScriptedClient<T> {
    type Item = T;

    async fn list(&self, query: &Query) -> ApiResult<Page<T>> {
        page_of(self.park(Call::List(query.clone())).await)
    }

    async fn search(&self, query: &Query) -> ApiResult<Page<T>> {
        page_of(self.park(Call::Search(query.clone())).await)
    }

    async fn create(&self, fields: &T::Fields) -> ApiResult<T> {
        let body = serde_json::to_value(fields).unwrap_or(Value::Null);
        item_of(self.park(Call::Create(body)).await)
    }

    async fn update(&self, id: ResourceId, fields: &T::Fields) -> ApiResult<T> {
        let body = serde_json::to_value(fields).unwrap_or(Value::Null);
        item_of(self.park(Call::Update(id, body)).await)
    }

    async fn delete(&self, id: ResourceId) -> ApiResult<()> {
        done_of(self.park(Call::Delete(id)).await)
    }

    async fn complete(&self, id: ResourceId) -> ApiResult<T> {
        item_of(self.park(Call::Complete(id)).await)
    }

    async fn bulk_complete(&self, ids: &[ResourceId]) -> ApiResult<()> {
        done_of(self.park(Call::BulkComplete(ids.to_vec())).await)
    }

    async fn extract_tags(&self, id: ResourceId) -> ApiResult<()> {
        done_of(self.park(Call::Extract(id)).await)
    }
}

// ========================
// Fixtures
// ========================

pub fn note(id: u32, title: &str) -> Note {
    Note {
        id,
        title: title.to_string(),
        content: format!("content {}", id),
        tags: vec![],
    }
}

pub fn action(id: u32) -> ActionItem {
    ActionItem {
        id,
        description: format!("Task {}", id),
        completed: false,
    }
}

pub fn page<T>(items: Vec<T>, total: u64, page: u32) -> Page<T> {
    Page {
        items,
        total,
        page,
        page_size: 10,
    }
}

pub fn server_error() -> ClientError {
    ClientError::rejected(500, "Internal Server Error")
}

pub fn controller<T: Entity>() -> (ListController<ScriptedClient<T>>, Rc<Server<T>>) {
    let (client, server) = ScriptedClient::new();
    (ListController::new(client, 10, SortOrder::CreatedDesc), server)
}

/// Let spawned local tasks run until they park on the server
pub async fn flush() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Complete an initial reload with `first`
pub async fn load<T: Entity>(
    ctrl: &ListController<ScriptedClient<T>>,
    server: &Server<T>,
    first: Page<T>,
) {
    let task = tokio::task::spawn_local({
        let ctrl = ctrl.clone();
        async move { ctrl.reload().await }
    });
    flush().await;
    server.answer_fetch(first);
    task.await.expect("reload task panicked");
}

pub fn displayed_ids<T: Entity>(ctrl: &ListController<ScriptedClient<T>>) -> Vec<ResourceId> {
    ctrl.view().page.map(|page| page.ids()).unwrap_or_default()
}
