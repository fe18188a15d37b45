//! Pagination types
//!
//! Defines the page request parameters and the accumulated page state.

use crate::types::{Item, PageIndex};
use std::collections::HashMap;
use std::sync::Arc;

/// Query parameter carrying the 1-based page index
pub const PAGE_PARAM: &str = "page";

/// Query parameter carrying the page size
pub const LIMIT_PARAM: &str = "limit";

/// Parameters of a single page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page index
    pub page: PageIndex,
    /// Items per page
    pub limit: u32,
}

impl PageRequest {
    /// Create a page request
    pub fn new(page: PageIndex, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Render the query parameters for this request
    pub fn query_params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert(PAGE_PARAM.to_string(), self.page.to_string());
        params.insert(LIMIT_PARAM.to_string(), self.limit.to_string());
        params
    }
}

/// Effect of applying a fetched page to the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Page 1 replaced the whole sequence
    Replaced {
        /// Items now held
        count: usize,
    },
    /// Items were appended at the end
    Appended {
        /// Items added
        count: usize,
    },
    /// The resource returned an empty page, no more data
    Exhausted,
}

impl PageOutcome {
    /// Check if the resource ran out of pages
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

/// Accumulated pagination state of one gallery view
#[derive(Debug, Clone, PartialEq)]
pub struct PageState {
    items: Arc<Vec<Item>>,
    page_index: PageIndex,
    has_more: bool,
    came_from_back: bool,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            page_index: 1,
            has_more: true,
            came_from_back: false,
        }
    }
}

impl PageState {
    /// Create the empty state a view mounts with
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a state that was stashed before navigating away.
    ///
    /// The next page-change reaction (the one at mount) is skipped, so the
    /// restored items are shown without refetching.
    pub fn restored(items: Vec<Item>, page_index: PageIndex, has_more: bool) -> Self {
        Self {
            items: Arc::new(items),
            page_index: page_index.max(1),
            has_more,
            came_from_back: true,
        }
    }

    /// Items in append order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Cheap shared handle on the items
    pub fn shared_items(&self) -> Arc<Vec<Item>> {
        Arc::clone(&self.items)
    }

    /// Number of items held
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if no items are held
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current page index
    pub fn page_index(&self) -> PageIndex {
        self.page_index
    }

    /// Whether the resource may have more pages
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Whether the next page-change reaction is suppressed
    pub fn came_from_back(&self) -> bool {
        self.came_from_back
    }

    /// Mark the state as restored from back navigation
    pub fn set_came_from_back(&mut self) {
        self.came_from_back = true;
    }

    /// Clear the back-navigation flag, returning its previous value
    pub fn take_came_from_back(&mut self) -> bool {
        std::mem::take(&mut self.came_from_back)
    }

    /// Advance to the next page and return the new index
    pub fn advance(&mut self) -> PageIndex {
        self.page_index = self.page_index.saturating_add(1);
        self.page_index
    }

    /// Apply a successfully fetched page.
    ///
    /// An empty batch ends the feed for good. Page 1 replaces everything,
    /// any other page is appended in order.
    pub fn apply_page(&mut self, page: PageIndex, batch: Vec<Item>) -> PageOutcome {
        self.page_index = page;

        if batch.is_empty() {
            self.has_more = false;
            return PageOutcome::Exhausted;
        }

        // has_more is left alone: once exhausted, stays exhausted
        if page == 1 {
            self.items = Arc::new(batch);
            PageOutcome::Replaced {
                count: self.items.len(),
            }
        } else {
            let count = batch.len();
            Arc::make_mut(&mut self.items).extend(batch);
            PageOutcome::Appended { count }
        }
    }
}
