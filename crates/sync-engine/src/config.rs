//! Client Configuration

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sort order for note search results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    CreatedDesc,
    TitleAsc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::CreatedDesc => "created_desc",
            SortOrder::TitleAsc => "title_asc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort order: {0}")]
pub struct UnknownSortOrder(pub String);

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_desc" => Ok(SortOrder::CreatedDesc),
            "title_asc" => Ok(SortOrder::TitleAsc),
            other => Err(UnknownSortOrder(other.to_string())),
        }
    }
}

/// Backend location and list defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Absolute origin of the backend, e.g. `http://localhost:8000`
    pub base_url: String,
    pub notes_page_size: u32,
    pub action_items_page_size: u32,
    pub sort: SortOrder,
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            notes_page_size: DEFAULT_PAGE_SIZE,
            action_items_page_size: DEFAULT_PAGE_SIZE,
            sort: SortOrder::default(),
        }
    }
}

impl ApiConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Join `path` onto the base URL without doubling slashes
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
