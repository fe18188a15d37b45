//! Engine types
//!
//! Events the engine reacts to, effects it asks its driver to perform, and
//! the snapshot it exposes to the rendering layer.

use crate::error::Result;
use crate::types::{Item, PageIndex, RequestId, Sentinel, TimerId};
use crate::visibility::IntersectionEntry;
use std::sync::Arc;
use std::time::Duration;

/// Input to the engine
#[derive(Debug)]
pub enum Event {
    /// The gallery view mounted
    Mount,
    /// Device network signal
    ConnectivityChanged(bool),
    /// A sentinel element was rendered
    SentinelAttached(Sentinel),
    /// The sentinel element went away
    SentinelDetached,
    /// Viewport intersection observation
    Intersection(IntersectionEntry),
    /// User asked to retry
    ManualRetry,
    /// A page request finished
    FetchCompleted {
        /// Request that finished
        request: RequestId,
        /// Items on success
        result: Result<Vec<Item>>,
    },
    /// A retry timer elapsed
    RetryFired {
        /// Timer that elapsed
        timer: TimerId,
    },
    /// The gallery view is going away
    Teardown,
}

/// Side effect requested by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Issue a request for a page
    StartFetch {
        /// Identifier to report the completion with
        request: RequestId,
        /// Page to fetch
        page: PageIndex,
    },
    /// Abort a request; its completion will be ignored
    AbortFetch {
        /// Request to abort
        request: RequestId,
    },
    /// Fire `RetryFired` after a delay
    ScheduleRetry {
        /// Identifier to fire with
        timer: TimerId,
        /// Page the retry is for
        page: PageIndex,
        /// Delay before firing
        delay: Duration,
    },
    /// Drop a pending timer
    CancelRetry {
        /// Timer to cancel
        timer: TimerId,
    },
}

impl Effect {
    /// Check if this starts a fetch
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::StartFetch { .. })
    }

    /// Page of a `StartFetch`
    pub fn fetch_page(&self) -> Option<PageIndex> {
        match self {
            Self::StartFetch { page, .. } => Some(*page),
            _ => None,
        }
    }
}

/// State exposed to the rendering layer
#[derive(Debug, Clone, PartialEq)]
pub struct GallerySnapshot {
    /// Items in append order
    pub items: Arc<Vec<Item>>,
    /// Current page index
    pub page_index: PageIndex,
    /// Resource may have more pages
    pub has_more: bool,
    /// A request is in flight
    pub loading: bool,
    /// User-facing error message
    pub error: Option<String>,
    /// Device is online
    pub is_online: bool,
    /// Automatic retries since the last success or reset
    pub retry_attempt: u32,
    /// Retry cap
    pub max_attempts: u32,
    /// A retry timer is pending
    pub retry_pending: bool,
    /// Sentinel the visibility trigger observes
    pub sentinel: Option<Sentinel>,
    /// The view has mounted
    pub mounted: bool,
}

impl Default for GallerySnapshot {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            page_index: 1,
            has_more: true,
            loading: false,
            error: None,
            is_online: true,
            retry_attempt: 0,
            max_attempts: 0,
            retry_pending: false,
            sentinel: None,
            mounted: false,
        }
    }
}

impl GallerySnapshot {
    /// Number of items loaded
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if nothing is loaded
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Error that only a manual retry can clear
    pub fn is_terminal(&self) -> bool {
        self.error.is_some()
            && self.is_online
            && !self.loading
            && !self.retry_pending
            && self.retry_attempt >= self.max_attempts
    }

    /// Nothing more will happen without outside input
    pub fn is_settled(&self) -> bool {
        !self.loading && !self.retry_pending
    }
}
