//! Action Item Endpoints

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;

use super::{Http, ResourceClient};
use crate::error::ApiResult;
use crate::models::{ActionItem, ActionItemFields, Page, ResourceId};
use crate::query::Query;

#[derive(Debug, Clone)]
pub struct ActionItemsApi {
    http: Http,
}

impl ActionItemsApi {
    pub fn new(http: Http) -> Self {
        Self { http }
    }
}

#[derive(Serialize)]
struct BulkCompleteArgs<'a> {
    ids: &'a [ResourceId],
}

fn list_params(query: &Query) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", query.page.to_string()),
        ("page_size", query.page_size.to_string()),
    ];
    if let Some(completed) = query.completed {
        params.push(("completed", completed.to_string()));
    }
    params
}

#[async_trait(?Send)]
impl ResourceClient for ActionItemsApi {
    type Item = ActionItem;

    async fn list(&self, query: &Query) -> ApiResult<Page<ActionItem>> {
        let request = self.http.request(Method::GET, "/action-items/").query(&list_params(query));
        self.http.send(request).await
    }

    async fn create(&self, fields: &ActionItemFields) -> ApiResult<ActionItem> {
        let request = self.http.request(Method::POST, "/action-items/").json(fields);
        self.http.send(request).await
    }

    async fn complete(&self, id: ResourceId) -> ApiResult<ActionItem> {
        let request = self.http.request(Method::PUT, &format!("/action-items/{}/complete", id));
        self.http.send(request).await
    }

    async fn bulk_complete(&self, ids: &[ResourceId]) -> ApiResult<()> {
        let request = self
            .http
            .request(Method::POST, "/action-items/bulk-complete")
            .json(&BulkCompleteArgs { ids });
        self.http.send_raw(request).await.map(|_| ())
    }
}
