//! Tag Endpoints

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;

use super::{Http, TagClient};
use crate::error::ApiResult;
use crate::models::Tag;

#[derive(Debug, Clone)]
pub struct TagsApi {
    http: Http,
}

impl TagsApi {
    pub fn new(http: Http) -> Self {
        Self { http }
    }
}

#[derive(Serialize)]
struct CreateTagArgs<'a> {
    name: &'a str,
}

#[async_trait(?Send)]
impl TagClient for TagsApi {
    async fn list_tags(&self) -> ApiResult<Vec<Tag>> {
        self.http.send(self.http.request(Method::GET, "/tags/")).await
    }

    async fn create_tag(&self, name: &str) -> ApiResult<Tag> {
        let request = self.http.request(Method::POST, "/tags/").json(&CreateTagArgs { name });
        self.http.send(request).await
    }

    async fn delete_tag(&self, id: u32) -> ApiResult<()> {
        let request = self.http.request(Method::DELETE, &format!("/tags/{}", id));
        self.http.send_raw(request).await.map(|_| ())
    }
}
