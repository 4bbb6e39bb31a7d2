//! Backend Client
//!
//! Typed pass-through over the REST endpoints, organized by resource kind.
//! No retries and no recovery here: every failure is returned as a
//! `ClientError` for the caller to handle.

mod action_items;
mod notes;
mod tags;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ApiConfig;
use crate::error::{ApiResult, ClientError};
use crate::models::{Entity, Page, ResourceId, Tag};
use crate::query::Query;

pub use action_items::ActionItemsApi;
pub use notes::NotesApi;
pub use tags::TagsApi;

/// Contract for one resource kind
///
/// `list` and `create` exist for every kind. The remaining operations answer
/// 405 locally for kinds whose backend does not expose them.
#[async_trait(?Send)]
pub trait ResourceClient {
    type Item: Entity;

    async fn list(&self, query: &Query) -> ApiResult<Page<Self::Item>>;

    async fn search(&self, _query: &Query) -> ApiResult<Page<Self::Item>> {
        Err(ClientError::unsupported("search"))
    }

    async fn create(&self, fields: &<Self::Item as Entity>::Fields) -> ApiResult<Self::Item>;

    async fn update(
        &self,
        _id: ResourceId,
        _fields: &<Self::Item as Entity>::Fields,
    ) -> ApiResult<Self::Item> {
        Err(ClientError::unsupported("update"))
    }

    async fn delete(&self, _id: ResourceId) -> ApiResult<()> {
        Err(ClientError::unsupported("delete"))
    }

    async fn complete(&self, _id: ResourceId) -> ApiResult<Self::Item> {
        Err(ClientError::unsupported("complete"))
    }

    async fn bulk_complete(&self, _ids: &[ResourceId]) -> ApiResult<()> {
        Err(ClientError::unsupported("bulk complete"))
    }

    async fn extract_tags(&self, _id: ResourceId) -> ApiResult<()> {
        Err(ClientError::unsupported("tag extraction"))
    }
}

/// Tag directory endpoints
#[async_trait(?Send)]
pub trait TagClient {
    async fn list_tags(&self) -> ApiResult<Vec<Tag>>;
    async fn create_tag(&self, name: &str) -> ApiResult<Tag>;
    async fn delete_tag(&self, id: u32) -> ApiResult<()>;
}

// ========================
// Transport
// ========================

/// Success envelope: `{"ok": true, "data": ...}`
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Decode an enveloped success body
pub(crate) fn decode_envelope<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(|envelope| envelope.data)
        .map_err(|e| ClientError::Network(format!("malformed response: {}", e)))
}

/// Shared HTTP plumbing for the per-kind clients
#[derive(Debug, Clone)]
pub struct Http {
    client: reqwest::Client,
    config: ApiConfig,
}

impl Http {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.config.url(path))
    }

    /// Send and return the raw body of a 2xx response
    pub(crate) async fn send_raw(&self, request: RequestBuilder) -> ApiResult<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::rejected(status.as_u16(), body));
        }
        Ok(body)
    }

    pub(crate) async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let body = self.send_raw(request).await?;
        decode_envelope(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Note;

    #[test]
    fn test_decode_page_envelope() {
        let body = r#"{"ok":true,"data":{"items":[{"id":1,"title":"A","content":"a","tags":[{"id":5,"name":"milk"}]}],"total":11,"page":2,"page_size":10}}"#;
        let page: Page<Note> = decode_envelope(body).unwrap();
        assert_eq!(page.total, 11);
        assert_eq!(page.page, 2);
        assert_eq!(page.items[0].tags[0].name, "milk");
        assert_eq!(page.total_pages(), 2);
    }

    #[test]
    fn test_decode_bare_body_is_an_error() {
        let body = r#"[{"id":1,"title":"A","content":"a"}]"#;
        let result: ApiResult<Vec<Note>> = decode_envelope(body);
        assert!(matches!(result, Err(ClientError::Network(msg)) if msg.starts_with("malformed response")));
    }

    #[test]
    fn test_decode_tag_list() {
        let tags: Vec<Tag> = decode_envelope(r#"{"ok":true,"data":[{"id":1,"name":"python"}]}"#).unwrap();
        assert_eq!(tags, vec![Tag { id: 1, name: "python".to_string() }]);
    }
}
