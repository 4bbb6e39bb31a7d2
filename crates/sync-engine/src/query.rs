//! List Query State
//!
//! Owns the retrieval parameters of one list and the last page fetched for
//! them. Every transition hands back a `FetchTicket`; only the ticket of the
//! newest generation may replace the displayed page.

use log::{debug, warn};

use crate::config::SortOrder;
use crate::error::{ApiResult, ClientError};
use crate::models::Page;

/// Which backend operation serves the query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Plain listing, optionally tag/status filtered
    Listing,
    /// Full-text search, optionally tag filtered
    Search,
}

/// Retrieval parameters for one list
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub search_text: String,
    pub tag_id: Option<u32>,
    /// Status filter (action items): `Some(false)` open, `Some(true)` done
    pub completed: Option<bool>,
    pub page: u32,
    pub page_size: u32,
    pub sort: SortOrder,
}

impl Query {
    pub fn new(page_size: u32, sort: SortOrder) -> Self {
        Self {
            search_text: String::new(),
            tag_id: None,
            completed: None,
            page: 1,
            page_size: page_size.max(1),
            sort,
        }
    }

    pub fn mode(&self) -> QueryMode {
        if self.search_text.trim().is_empty() {
            QueryMode::Listing
        } else {
            QueryMode::Search
        }
    }

    /// True when both queries select the same result set (page ignored)
    pub fn same_result_set(&self, other: &Query) -> bool {
        self.search_text.trim() == other.search_text.trim()
            && self.tag_id == other.tag_id
            && self.completed == other.completed
            && self.page_size == other.page_size
            && self.sort == other.sort
    }
}

/// A fetch the caller must issue and hand back to `ListQueryState::apply`
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub generation: u64,
    pub query: Query,
}

impl FetchTicket {
    pub fn mode(&self) -> QueryMode {
        self.query.mode()
    }
}

/// What happened to a fetch result
#[derive(Debug, Clone, PartialEq)]
pub enum FetchApplied {
    /// The held page was replaced
    Replaced,
    /// A newer query superseded this one; result discarded
    Stale,
    /// The fetch failed; the previous page is still displayed
    Failed(ClientError),
    /// The requested page was past the end; issue this ticket instead
    Clamped(FetchTicket),
}

#[derive(Debug, Clone)]
pub struct ListQueryState<T> {
    query: Query,
    page: Option<Page<T>>,
    /// Query that produced `page`
    displayed: Option<Query>,
    generation: u64,
    page_version: u64,
    loading: bool,
    last_error: Option<ClientError>,
}

impl<T> ListQueryState<T> {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            page: None,
            displayed: None,
            generation: 0,
            page_version: 0,
            loading: false,
            last_error: None,
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn page(&self) -> Option<&Page<T>> {
        self.page.as_ref()
    }

    pub(crate) fn page_mut(&mut self) -> Option<&mut Page<T>> {
        self.page.as_mut()
    }

    pub fn mode(&self) -> QueryMode {
        self.query.mode()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Bumped on every page replacement
    pub fn page_version(&self) -> u64 {
        self.page_version
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    /// Pages available for the displayed result set, if one is displayed
    pub fn total_pages(&self) -> Option<u32> {
        self.page.as_ref().map(Page::total_pages)
    }

    // ========================
    // Transitions
    // ========================

    /// Any change of search text starts over at page 1; crossing between
    /// empty and non-empty also switches between listing and search.
    pub fn set_search_text(&mut self, text: impl Into<String>) -> FetchTicket {
        let text = text.into();
        let before = self.query.mode();
        self.query.search_text = text;
        self.query.page = 1;
        if before != self.query.mode() {
            debug!("[QUERY] mode {:?} -> {:?}", before, self.query.mode());
        }
        self.begin_fetch()
    }

    pub fn set_tag(&mut self, tag_id: Option<u32>) -> FetchTicket {
        self.query.tag_id = tag_id;
        self.query.page = 1;
        self.begin_fetch()
    }

    pub fn set_completed_filter(&mut self, completed: Option<bool>) -> FetchTicket {
        self.query.completed = completed;
        self.query.page = 1;
        self.begin_fetch()
    }

    pub fn set_sort(&mut self, sort: SortOrder) -> FetchTicket {
        self.query.sort = sort;
        self.query.page = 1;
        self.begin_fetch()
    }

    /// Change page only. Clamped to the last known page when the displayed
    /// result set belongs to the current filters.
    pub fn set_page(&mut self, page: u32) -> FetchTicket {
        let mut target = page.max(1);
        if let (Some(held), Some(displayed)) = (&self.page, &self.displayed) {
            if displayed.same_result_set(&self.query) {
                target = target.min(held.total_pages());
            }
        }
        self.query.page = target;
        self.begin_fetch()
    }

    /// Refetch the current query
    pub fn reload(&mut self) -> FetchTicket {
        self.begin_fetch()
    }

    fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket {
            generation: self.generation,
            query: self.query.clone(),
        }
    }

    /// Apply a fetch result. The page is replaced only for the newest
    /// generation and only as a whole (items and total together).
    pub fn apply(&mut self, ticket: FetchTicket, result: ApiResult<Page<T>>) -> FetchApplied {
        if ticket.generation != self.generation {
            debug!(
                "[QUERY] discarding generation {} (current {})",
                ticket.generation, self.generation
            );
            return FetchApplied::Stale;
        }
        self.loading = false;

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                warn!("[QUERY] fetch failed, keeping previous page: {}", err);
                // The retained page still answers the displayed query
                if let Some(displayed) = &self.displayed {
                    self.query = displayed.clone();
                }
                self.last_error = Some(err.clone());
                return FetchApplied::Failed(err);
            }
        };

        let last_page = page.total_pages();
        if page.items.is_empty() && ticket.query.page > last_page {
            debug!(
                "[QUERY] page {} past the end ({} pages), clamping",
                ticket.query.page, last_page
            );
            self.query.page = last_page;
            return FetchApplied::Clamped(self.begin_fetch());
        }

        self.page = Some(page);
        self.displayed = Some(ticket.query);
        self.page_version += 1;
        self.last_error = None;
        FetchApplied::Replaced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Note;

    fn note(id: u32) -> Note {
        Note {
            id,
            title: format!("Note {}", id),
            content: String::new(),
            tags: vec![],
        }
    }

    fn page_of(ids: &[u32], total: u64, page: u32) -> Page<Note> {
        Page {
            items: ids.iter().map(|id| note(*id)).collect(),
            total,
            page,
            page_size: 2,
        }
    }

    fn state() -> ListQueryState<Note> {
        ListQueryState::new(Query::new(2, SortOrder::CreatedDesc))
    }

    #[test]
    fn test_search_text_switches_mode_and_resets_page() {
        let mut s = state();
        let t = s.set_page(3);
        s.apply(t, Ok(page_of(&[5, 6], 6, 3)));
        assert_eq!(s.query().page, 3);

        let t = s.set_search_text("milk");
        assert_eq!(t.mode(), QueryMode::Search);
        assert_eq!(t.query.page, 1);

        s.apply(t, Ok(page_of(&[1, 2], 6, 1)));
        s.set_page(2);
        let t = s.set_search_text("");
        assert_eq!(t.mode(), QueryMode::Listing);
        assert_eq!(t.query.page, 1);
    }

    #[test]
    fn test_whitespace_search_is_listing() {
        let mut s = state();
        let t = s.set_search_text("   ");
        assert_eq!(t.mode(), QueryMode::Listing);
    }

    #[test]
    fn test_filter_change_preserves_mode() {
        let mut s = state();
        s.set_search_text("milk");
        s.set_page(2);
        let t = s.set_tag(Some(5));
        assert_eq!(t.mode(), QueryMode::Search);
        assert_eq!(t.query.page, 1);
        assert_eq!(t.query.tag_id, Some(5));

        let t = s.set_completed_filter(Some(true));
        assert_eq!(t.query.page, 1);
        assert_eq!(t.query.search_text, "milk");
    }

    #[test]
    fn test_page_change_preserves_filters() {
        let mut s = state();
        s.set_tag(Some(5));
        let t = s.set_page(2);
        assert_eq!(t.query.tag_id, Some(5));
        assert_eq!(t.query.page, 2);
    }

    #[test]
    fn test_tag_filter_from_page_three_requests_page_one() {
        let mut s = state();
        let t = s.set_page(3);
        assert_eq!(s.apply(t, Ok(page_of(&[5, 6], 6, 3))), FetchApplied::Replaced);

        let t = s.set_tag(Some(5));
        assert_eq!(t.query.page, 1);
        assert_eq!(s.apply(t, Ok(page_of(&[1], 1, 1))), FetchApplied::Replaced);
        assert_eq!(s.page().unwrap().page, 1);
        assert_eq!(s.page().unwrap().items.len(), 1);
    }

    #[test]
    fn test_set_page_clamps_to_known_total() {
        let mut s = state();
        let t = s.reload();
        s.apply(t, Ok(page_of(&[1, 2], 3, 1)));
        let t = s.set_page(9);
        assert_eq!(t.query.page, 2);
    }

    #[test]
    fn test_empty_page_past_end_is_clamped_not_displayed() {
        let mut s = state();
        let t = s.set_page(3);
        s.apply(t, Ok(page_of(&[5, 6], 6, 3)));
        let version = s.page_version();

        // Total shrank to 3 on the server; page 3 is now past the end
        let t = s.reload();
        let applied = s.apply(t, Ok(page_of(&[], 3, 3)));
        let next = match applied {
            FetchApplied::Clamped(next) => next,
            other => panic!("expected clamp, got {:?}", other),
        };
        assert_eq!(next.query.page, 2);
        assert_eq!(s.page_version(), version);
        assert_eq!(s.page().unwrap().page, 3);

        assert_eq!(s.apply(next, Ok(page_of(&[3], 3, 2))), FetchApplied::Replaced);
        assert_eq!(s.query().page, 2);
    }

    #[test]
    fn test_empty_first_page_is_displayed() {
        let mut s = state();
        let t = s.reload();
        assert_eq!(s.apply(t, Ok(page_of(&[], 0, 1))), FetchApplied::Replaced);
        assert!(s.page().unwrap().items.is_empty());
    }

    #[test]
    fn test_superseded_fetch_is_discarded() {
        let mut s = state();
        let a = s.set_tag(Some(1));
        let b = s.set_tag(Some(2));

        assert_eq!(s.apply(b, Ok(page_of(&[20], 1, 1))), FetchApplied::Replaced);
        assert_eq!(s.apply(a, Ok(page_of(&[10], 1, 1))), FetchApplied::Stale);
        assert_eq!(s.page().unwrap().items[0].id, 20);
    }

    #[test]
    fn test_failure_keeps_previous_page() {
        let mut s = state();
        let t = s.reload();
        s.apply(t, Ok(page_of(&[1, 2], 2, 1)));
        let version = s.page_version();

        let t = s.set_tag(Some(3));
        let err = ClientError::rejected(500, "boom");
        assert_eq!(s.apply(t, Err(err.clone())), FetchApplied::Failed(err));
        assert_eq!(s.page().unwrap().ids(), vec![1, 2]);
        assert_eq!(s.page_version(), version);
        assert!(!s.is_loading());
        assert!(s.last_error().is_some());
    }

    #[test]
    fn test_failed_fetch_restores_displayed_query() {
        let mut s = state();
        let t = s.reload();
        s.apply(t, Ok(page_of(&[1, 2], 20, 1)));

        let t = s.set_page(2);
        s.apply(t, Err(ClientError::rejected(500, "boom")));
        assert_eq!(s.query().page, 1);
        assert_eq!(s.page().unwrap().page, 1);

        let t = s.set_tag(Some(5));
        s.apply(t, Err(ClientError::Network("offline".to_string())));
        assert_eq!(s.query().tag_id, None);
        assert_eq!(s.query().page, 1);

        // The next change starts from what is on screen
        let t = s.set_page(2);
        assert_eq!(t.query.tag_id, None);
        assert_eq!(t.query.page, 2);
    }

    #[test]
    fn test_failed_first_fetch_keeps_requested_query() {
        let mut s = state();
        let t = s.set_tag(Some(5));
        s.apply(t, Err(ClientError::rejected(500, "boom")));
        assert_eq!(s.query().tag_id, Some(5));
        assert!(s.page().is_none());
    }
}
