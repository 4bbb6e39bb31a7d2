//! Note Endpoints

use async_trait::async_trait;
use reqwest::Method;

use super::{Http, ResourceClient};
use crate::error::ApiResult;
use crate::models::{Note, NoteFields, Page, ResourceId};
use crate::query::Query;

#[derive(Debug, Clone)]
pub struct NotesApi {
    http: Http,
}

impl NotesApi {
    pub fn new(http: Http) -> Self {
        Self { http }
    }
}

fn list_params(query: &Query) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", query.page.to_string()),
        ("page_size", query.page_size.to_string()),
    ];
    if let Some(tag_id) = query.tag_id {
        params.push(("tag_id", tag_id.to_string()));
    }
    params
}

fn search_params(query: &Query) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("q", query.search_text.trim().to_string()),
        ("page", query.page.to_string()),
        ("page_size", query.page_size.to_string()),
        ("sort", query.sort.as_str().to_string()),
    ];
    if let Some(tag_id) = query.tag_id {
        params.push(("tag_id", tag_id.to_string()));
    }
    params
}

#[async_trait(?Send)]
impl ResourceClient for NotesApi {
    type Item = Note;

    async fn list(&self, query: &Query) -> ApiResult<Page<Note>> {
        let request = self.http.request(Method::GET, "/notes/").query(&list_params(query));
        self.http.send(request).await
    }

    async fn search(&self, query: &Query) -> ApiResult<Page<Note>> {
        let request = self.http.request(Method::GET, "/notes/search/").query(&search_params(query));
        self.http.send(request).await
    }

    async fn create(&self, fields: &NoteFields) -> ApiResult<Note> {
        let request = self.http.request(Method::POST, "/notes/").json(fields);
        self.http.send(request).await
    }

    async fn update(&self, id: ResourceId, fields: &NoteFields) -> ApiResult<Note> {
        let request = self.http.request(Method::PUT, &format!("/notes/{}", id)).json(fields);
        self.http.send(request).await
    }

    async fn delete(&self, id: ResourceId) -> ApiResult<()> {
        let request = self.http.request(Method::DELETE, &format!("/notes/{}", id));
        self.http.send_raw(request).await.map(|_| ())
    }

    async fn extract_tags(&self, id: ResourceId) -> ApiResult<()> {
        let request = self
            .http
            .request(Method::POST, &format!("/notes/{}/extract", id))
            .query(&[("apply", "true")]);
        self.http.send_raw(request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SortOrder;

    #[test]
    fn test_list_params() {
        let mut query = Query::new(10, SortOrder::CreatedDesc);
        query.page = 2;
        assert_eq!(
            list_params(&query),
            vec![("page", "2".to_string()), ("page_size", "10".to_string())]
        );

        query.tag_id = Some(5);
        assert!(list_params(&query).contains(&("tag_id", "5".to_string())));
    }

    #[test]
    fn test_search_params() {
        let mut query = Query::new(20, SortOrder::TitleAsc);
        query.search_text = "  milk ".to_string();
        let params = search_params(&query);
        assert_eq!(params[0], ("q", "milk".to_string()));
        assert!(params.contains(&("sort", "title_asc".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "tag_id"));
    }
}
