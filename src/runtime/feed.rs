//! Single-writer feed task

use crate::config::FeedConfig;
use crate::engine::{Effect, Event, GallerySnapshot, GalleryEngine};
use crate::error::{Error, Result};
use crate::http::PageSource;
use crate::pagination::{PageRequest, PageState};
use crate::types::{Item, PageIndex, RequestId, Sentinel, TimerId};
use crate::visibility::IntersectionEntry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Options for starting a feed
#[derive(Debug, Clone)]
pub struct FeedOptions {
    /// Device state at start
    pub online: bool,
    /// State stashed before a previous navigation away
    pub restore: Option<PageState>,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            online: true,
            restore: None,
        }
    }
}

/// Cloneable handle for talking to a running feed
#[derive(Debug, Clone)]
pub struct FeedHandle {
    tx: mpsc::UnboundedSender<Event>,
    snapshots: watch::Receiver<GallerySnapshot>,
}

impl FeedHandle {
    fn send(&self, event: Event) -> Result<()> {
        self.tx.send(event).map_err(|_| Error::Closed)
    }

    /// Mount the view, fetching the first page
    pub fn mount(&self) -> Result<()> {
        self.send(Event::Mount)
    }

    /// Report a device network signal
    pub fn set_online(&self, online: bool) -> Result<()> {
        self.send(Event::ConnectivityChanged(online))
    }

    /// Start observing a sentinel element
    pub fn attach_sentinel(&self, sentinel: Sentinel) -> Result<()> {
        self.send(Event::SentinelAttached(sentinel))
    }

    /// Stop observing the sentinel
    pub fn detach_sentinel(&self) -> Result<()> {
        self.send(Event::SentinelDetached)
    }

    /// Report an intersection observation
    pub fn intersect(&self, entry: IntersectionEntry) -> Result<()> {
        self.send(Event::Intersection(entry))
    }

    /// Report the sentinel as fully on or off screen
    pub fn sentinel_visible(&self, sentinel: Sentinel, visible: bool) -> Result<()> {
        let entry = if visible {
            IntersectionEntry::visible(sentinel)
        } else {
            IntersectionEntry::hidden(sentinel)
        };
        self.intersect(entry)
    }

    /// Manual retry
    pub fn retry(&self) -> Result<()> {
        self.send(Event::ManualRetry)
    }

    /// Tear the view down
    pub fn teardown(&self) -> Result<()> {
        self.send(Event::Teardown)
    }

    /// Latest published state
    pub fn snapshot(&self) -> GallerySnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<GallerySnapshot> {
        self.snapshots.clone()
    }

    /// Wait until the published state satisfies `condition`
    pub async fn wait_for(
        &self,
        mut condition: impl FnMut(&GallerySnapshot) -> bool,
    ) -> Result<GallerySnapshot> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(|snapshot| condition(snapshot))
            .await
            .map_err(|_| Error::Closed)?;
        Ok(snapshot.clone())
    }
}

/// A running feed
#[derive(Debug)]
pub struct Feed {
    handle: FeedHandle,
    task: JoinHandle<PageState>,
}

impl Feed {
    /// Start a feed on the current tokio runtime
    pub fn spawn<S: PageSource + 'static>(source: S, config: &FeedConfig) -> Self {
        Self::spawn_with(source, config, FeedOptions::default())
    }

    /// Start a feed with explicit options
    pub fn spawn_with<S: PageSource + 'static>(
        source: S,
        config: &FeedConfig,
        options: FeedOptions,
    ) -> Self {
        let mut engine = GalleryEngine::new(config, options.online);
        if let Some(state) = options.restore {
            engine = engine.with_state(state);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());

        let worker = Worker {
            engine,
            source: Arc::new(source),
            page_size: config.page_size,
            timeout: config.timeout(),
            events: tx.downgrade(),
            fetch: None,
            timer: None,
            snapshots: snapshot_tx,
        };

        Self {
            handle: FeedHandle {
                tx,
                snapshots: snapshot_rx,
            },
            task: tokio::spawn(worker.run(rx)),
        }
    }

    /// Handle for sending commands and reading state
    pub fn handle(&self) -> FeedHandle {
        self.handle.clone()
    }

    /// Tear the feed down and return its page state for later restore
    pub async fn close(self) -> Result<PageState> {
        // Already gone if the send fails; the join below still yields the state
        let _ = self.handle.teardown();
        drop(self.handle);
        self.task
            .await
            .map_err(|e| Error::unexpected(format!("feed task failed: {e}")))
    }
}

/// Owns the engine and carries out its effects
struct Worker {
    engine: GalleryEngine,
    source: Arc<dyn PageSource>,
    page_size: u32,
    timeout: Duration,
    events: mpsc::WeakUnboundedSender<Event>,
    fetch: Option<(RequestId, JoinHandle<()>)>,
    timer: Option<(TimerId, JoinHandle<()>)>,
    snapshots: watch::Sender<GallerySnapshot>,
}

impl Worker {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Event>) -> PageState {
        while let Some(event) = rx.recv().await {
            let effects = self.engine.handle(event);
            for effect in effects {
                self.apply(effect);
            }
            self.snapshots.send_replace(self.engine.snapshot());

            if self.engine.is_torn_down() {
                break;
            }
        }

        if !self.engine.is_torn_down() {
            debug!("All feed handles dropped, tearing down");
            for effect in self.engine.teardown() {
                self.apply(effect);
            }
            self.snapshots.send_replace(self.engine.snapshot());
        }
        self.engine.page_state().clone()
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::StartFetch { request, page } => self.start_fetch(request, page),
            Effect::AbortFetch { request } => {
                if let Some((id, task)) = self.fetch.take() {
                    if id == request {
                        debug!("Aborting {}", request);
                        task.abort();
                    } else {
                        self.fetch = Some((id, task));
                    }
                }
            }
            Effect::ScheduleRetry { timer, delay, .. } => self.schedule_retry(timer, delay),
            Effect::CancelRetry { timer } => {
                if let Some((id, task)) = self.timer.take() {
                    if id == timer {
                        task.abort();
                    } else {
                        self.timer = Some((id, task));
                    }
                }
            }
        }
    }

    fn start_fetch(&mut self, request: RequestId, page: PageIndex) {
        let guard = Completion {
            events: self.events.clone(),
            request,
            sent: false,
        };
        let source = Arc::clone(&self.source);
        let page_request = PageRequest::new(page, self.page_size);
        let timeout = self.timeout;

        let task = tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, source.fetch_page(page_request)).await {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                }),
            };
            guard.send(result);
        });

        // Finished handles are simply replaced
        self.fetch = Some((request, task));
    }

    fn schedule_retry(&mut self, timer: TimerId, delay: Duration) {
        if let Some((_, previous)) = self.timer.take() {
            previous.abort();
        }
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(tx) = events.upgrade() {
                let _ = tx.send(Event::RetryFired { timer });
            }
        });
        self.timer = Some((timer, task));
    }
}

/// Reports the end of one page request, even if the request task dies
struct Completion {
    events: mpsc::WeakUnboundedSender<Event>,
    request: RequestId,
    sent: bool,
}

impl Completion {
    fn send(mut self, result: Result<Vec<Item>>) {
        self.deliver(result);
    }

    fn deliver(&mut self, result: Result<Vec<Item>>) {
        self.sent = true;
        if let Some(tx) = self.events.upgrade() {
            let _ = tx.send(Event::FetchCompleted {
                request: self.request,
                result,
            });
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if !self.sent {
            warn!("{} ended without a result", self.request);
            self.deliver(Err(Error::unexpected("request task ended without a result")));
        }
    }
}
