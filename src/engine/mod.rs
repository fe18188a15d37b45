//! Gallery engine module
//!
//! The incremental loading state machine.
//!
//! # Overview
//!
//! [`GalleryEngine`] owns the page state, the fetch controller, the retry
//! scheduler, the connectivity monitor and the visibility trigger. It
//! consumes [`Event`]s one at a time and answers with [`Effect`]s for its
//! driver to carry out (start or abort a request, arm or cancel a timer).
//! Because every event runs to completion before the next one, the page
//! state has a single writer and no locking is involved.
//!
//! ```text
//!  Mount ─┐
//!         ├─► page-change reaction ─► fetch_page ─► StartFetch
//!  Intersection ─► advance ─┘                         │
//!                                                     ▼
//!  FetchCompleted ─► success: apply page, reset retries
//!                 └► failure: classify, ScheduleRetry ─► RetryFired ─► fetch_page
//! ```

mod types;

pub use types::{Effect, Event, GallerySnapshot};

use crate::config::FeedConfig;
use crate::connectivity::{ConnectivityMonitor, Transition};
use crate::error::Result;
use crate::fetch::{FetchController, FetchState, PendingRetry, RetryPolicy, RetryScheduler};
use crate::pagination::{PageOutcome, PageState};
use crate::types::{Item, PageIndex, RequestId, Sentinel, TimerId};
use crate::visibility::{AdvanceConditions, IntersectionEntry, VisibilityTrigger};
use tracing::{debug, info};

/// Incremental loading state machine for one gallery view
#[derive(Debug)]
pub struct GalleryEngine {
    page: PageState,
    fetch: FetchController,
    retry: RetryScheduler,
    connectivity: ConnectivityMonitor,
    visibility: VisibilityTrigger,
    mounted: bool,
    torn_down: bool,
}

impl GalleryEngine {
    /// Create an engine with an empty page state
    pub fn new(config: &FeedConfig, online: bool) -> Self {
        Self {
            page: PageState::new(),
            fetch: FetchController::new(),
            retry: RetryScheduler::new(RetryPolicy::from(&config.retry)),
            connectivity: ConnectivityMonitor::new(online),
            visibility: VisibilityTrigger::new(config.sentinel_threshold),
            mounted: false,
            torn_down: false,
        }
    }

    /// Start from a previously stashed page state
    #[must_use]
    pub fn with_state(mut self, page: PageState) -> Self {
        self.page = page;
        self
    }

    /// Current page state
    pub fn page_state(&self) -> &PageState {
        &self.page
    }

    /// Current fetch state
    pub fn fetch_state(&self) -> &FetchState {
        self.fetch.state()
    }

    /// Whether the device is online
    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// Retry timer waiting to fire
    pub fn pending_retry(&self) -> Option<PendingRetry> {
        self.retry.pending()
    }

    /// Whether the view has been torn down
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// State for the rendering layer
    pub fn snapshot(&self) -> GallerySnapshot {
        let fetch = self.fetch.state();
        GallerySnapshot {
            items: self.page.shared_items(),
            page_index: self.page.page_index(),
            has_more: self.page.has_more(),
            loading: fetch.loading,
            error: fetch.error.clone(),
            is_online: self.connectivity.is_online(),
            retry_attempt: fetch.retry_attempt,
            max_attempts: self.retry.policy().max_attempts,
            retry_pending: self.retry.pending().is_some(),
            sentinel: self.visibility.sentinel(),
            mounted: self.mounted,
        }
    }

    /// Process one event
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        if self.torn_down {
            debug!("Ignoring {:?} after teardown", event);
            return Vec::new();
        }

        match event {
            Event::Mount => self.mount(),
            Event::ConnectivityChanged(online) => self.set_online(online),
            Event::SentinelAttached(sentinel) => self.attach_sentinel(sentinel),
            Event::SentinelDetached => self.detach_sentinel(),
            Event::Intersection(entry) => self.observe(entry),
            Event::ManualRetry => self.retry(),
            Event::FetchCompleted { request, result } => self.complete(request, result),
            Event::RetryFired { timer } => self.retry_fired(timer),
            Event::Teardown => self.teardown(),
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Mount the view: runs the page-change reaction once
    pub fn mount(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.mounted || self.torn_down {
            return effects;
        }
        self.mounted = true;
        info!("Gallery mounted at page {}", self.page.page_index());

        if !self.connectivity.is_online() {
            self.fetch.set_offline();
        }
        self.on_page_change(&mut effects);
        effects
    }

    /// Apply a device network signal
    pub fn set_online(&mut self, online: bool) -> Vec<Effect> {
        let mut effects = Vec::new();
        match self.connectivity.signal(online) {
            Transition::Online => self.fetch.reset(),
            Transition::Offline => {
                self.fetch.set_offline();
                if let Some(request) = self.fetch.abort() {
                    effects.push(Effect::AbortFetch { request });
                }
                if let Some(timer) = self.retry.cancel() {
                    debug!("Offline, cancelling {}", timer);
                    effects.push(Effect::CancelRetry { timer });
                }
            }
            Transition::Unchanged => {}
        }
        effects
    }

    /// Observe a new sentinel element
    pub fn attach_sentinel(&mut self, sentinel: Sentinel) -> Vec<Effect> {
        self.visibility.observe(sentinel);
        Vec::new()
    }

    /// Stop observing the sentinel
    pub fn detach_sentinel(&mut self) -> Vec<Effect> {
        self.visibility.unobserve();
        Vec::new()
    }

    /// Apply an intersection observation
    pub fn observe(&mut self, entry: IntersectionEntry) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.visibility.record(entry) {
            self.try_advance(&mut effects);
        }
        effects
    }

    /// Manual retry.
    ///
    /// Cancels any pending timer and in-flight request, zeroes the retry
    /// counter and fetches page 1 when nothing is loaded, the current page
    /// otherwise. This is the only way to re-fetch a page that already
    /// succeeded.
    pub fn retry(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(timer) = self.retry.cancel() {
            effects.push(Effect::CancelRetry { timer });
        }
        if let Some(request) = self.fetch.abort() {
            effects.push(Effect::AbortFetch { request });
        }
        self.fetch.reset();

        if !self.connectivity.is_online() {
            self.fetch.set_offline();
            return effects;
        }

        let page = if self.page.is_empty() {
            1
        } else {
            self.page.page_index()
        };
        info!("Manual retry of page {}", page);
        self.fetch_page(page, &mut effects);
        effects
    }

    /// Record the end of a page request
    pub fn complete(&mut self, request: RequestId, result: Result<Vec<Item>>) -> Vec<Effect> {
        let mut effects = Vec::new();
        let Some(page) = self.fetch.finish(request) else {
            return effects;
        };

        match result {
            Ok(batch) => {
                let outcome = self.page.apply_page(page, batch);
                self.fetch.succeed();
                match outcome {
                    PageOutcome::Exhausted => info!("Page {} is empty, no more data", page),
                    PageOutcome::Replaced { count } => info!("Page {} loaded {} items", page, count),
                    PageOutcome::Appended { count } => info!(
                        "Page {} appended {} items ({} total)",
                        page,
                        count,
                        self.page.len()
                    ),
                }
                // The sentinel may still be on screen after a short page
                if self.visibility.is_visible() {
                    self.try_advance(&mut effects);
                }
            }
            Err(err) => {
                let online = self.connectivity.is_online();
                self.fetch.fail(page, &err, online);
                if let Some(scheduled) = self.retry.schedule(self.fetch.state_mut(), page, online)
                {
                    if let Some(timer) = scheduled.replaced {
                        effects.push(Effect::CancelRetry { timer });
                    }
                    effects.push(Effect::ScheduleRetry {
                        timer: scheduled.timer,
                        page: scheduled.page,
                        delay: scheduled.delay,
                    });
                }
            }
        }
        effects
    }

    /// Handle an elapsed retry timer
    pub fn retry_fired(&mut self, timer: TimerId) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(page) = self.retry.fire(timer) {
            info!(
                "Executing retry attempt {} for page {}",
                self.fetch.state().retry_attempt,
                page
            );
            self.fetch_page(page, &mut effects);
        }
        effects
    }

    /// Tear the view down, cancelling everything outstanding
    pub fn teardown(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(timer) = self.retry.cancel() {
            effects.push(Effect::CancelRetry { timer });
        }
        if let Some(request) = self.fetch.abort() {
            effects.push(Effect::AbortFetch { request });
        }
        self.visibility.unobserve();
        self.torn_down = true;
        info!("Gallery torn down with {} items", self.page.len());
        effects
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Page-change reaction: the only place a page index turns into a fetch
    fn on_page_change(&mut self, effects: &mut Vec<Effect>) {
        if self.page.take_came_from_back() {
            debug!(
                "Restored from back navigation, skipping fetch of page {}",
                self.page.page_index()
            );
            return;
        }
        if self.connectivity.is_online() {
            self.fetch_page(self.page.page_index(), effects);
        }
    }

    /// Advance the page index if the feed allows it
    fn try_advance(&mut self, effects: &mut Vec<Effect>) {
        let fetch = self.fetch.state();
        let conditions = AdvanceConditions {
            online: self.connectivity.is_online(),
            has_more: self.page.has_more(),
            loading: fetch.loading,
            has_error: fetch.error.is_some(),
            retries_exhausted: self.retry.is_exhausted(fetch),
        };
        if !conditions.allow() {
            debug!("Sentinel visible but not advancing: {:?}", conditions);
            return;
        }

        let page = self.page.advance();
        debug!("Sentinel visible, advancing to page {}", page);
        self.on_page_change(effects);
    }

    fn fetch_page(&mut self, page: PageIndex, effects: &mut Vec<Effect>) {
        if let Some(flight) = self.fetch.begin(page, self.connectivity.is_online()) {
            effects.push(Effect::StartFetch {
                request: flight.request,
                page: flight.page,
            });
        }
    }
}
