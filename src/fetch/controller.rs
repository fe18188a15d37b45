//! Fetch controller
//!
//! Owns the `loading` guard, the user-facing error and the single retry
//! counter. The request itself is carried out by whoever executes the
//! `StartFetch` effect; this type only decides whether a request may start
//! and how its completion is recorded.

use crate::error::{Error, OFFLINE_MESSAGE, TIMEOUT_MESSAGE};
use crate::types::{IdSeq, PageIndex, RequestId};
use serde::Serialize;
use tracing::{debug, warn};

/// Observable fetch state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchState {
    /// A page request is in flight
    pub loading: bool,
    /// User-facing error message
    pub error: Option<String>,
    /// Automatic retries performed since the last success or reset
    pub retry_attempt: u32,
}

/// The request currently in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InFlight {
    /// Request identifier
    pub request: RequestId,
    /// Page being fetched
    pub page: PageIndex,
}

/// Decides when page requests start and records how they end
#[derive(Debug, Default)]
pub struct FetchController {
    state: FetchState,
    in_flight: Option<InFlight>,
    ids: IdSeq,
}

impl FetchController {
    /// Create an idle controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Observable state
    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// Mutable access for the retry scheduler
    pub(crate) fn state_mut(&mut self) -> &mut FetchState {
        &mut self.state
    }

    /// The request in flight, if any
    pub fn in_flight(&self) -> Option<InFlight> {
        self.in_flight
    }

    /// Whether a request is in flight
    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    /// Start fetching `page`.
    ///
    /// Returns `None` without touching any state when the device is
    /// offline, a request is already in flight, or `page` is 0.
    pub fn begin(&mut self, page: PageIndex, online: bool) -> Option<InFlight> {
        if !online {
            debug!("Fetch of page {} skipped: offline", page);
            return None;
        }
        if self.state.loading || self.in_flight.is_some() {
            debug!("Fetch of page {} dropped: request in flight", page);
            return None;
        }
        if page == 0 {
            warn!("Fetch of page 0 rejected");
            return None;
        }

        let flight = InFlight {
            request: RequestId(self.ids.next()),
            page,
        };
        self.state.loading = true;
        self.in_flight = Some(flight);
        debug!("Fetching page {} ({})", page, flight.request);
        Some(flight)
    }

    /// Release the in-flight slot for a completed request.
    ///
    /// `loading` is cleared whatever the outcome. Returns the fetched page,
    /// or `None` when `request` is not the one in flight (aborted or stale).
    pub fn finish(&mut self, request: RequestId) -> Option<PageIndex> {
        match self.in_flight {
            Some(flight) if flight.request == request => {
                self.in_flight = None;
                self.state.loading = false;
                Some(flight.page)
            }
            _ => {
                debug!("Ignoring completion of stale request {}", request);
                None
            }
        }
    }

    /// Abandon the request in flight
    pub fn abort(&mut self) -> Option<RequestId> {
        self.state.loading = false;
        self.in_flight.take().map(|flight| flight.request)
    }

    /// Record a successful fetch
    pub fn succeed(&mut self) {
        self.state.error = None;
        self.state.retry_attempt = 0;
    }

    /// Record a failed fetch and return the message shown to the user
    pub fn fail(&mut self, page: PageIndex, err: &Error, online: bool) -> &str {
        let message = classify(err, online);
        warn!("Fetch of page {} failed: {}", page, err);
        self.state.error.insert(message).as_str()
    }

    /// Enter the offline state
    pub fn set_offline(&mut self) {
        self.state.error = Some(OFFLINE_MESSAGE.to_string());
        self.state.loading = false;
    }

    /// Clear the error and the retry counter
    pub fn reset(&mut self) {
        self.state.error = None;
        self.state.retry_attempt = 0;
    }
}

/// Turn a fetch failure into the message shown to the user.
///
/// A timeout wins over everything; otherwise a device that went offline
/// while the request was running reports the connection loss.
pub fn classify(err: &Error, online: bool) -> String {
    use crate::error::FailureKind;

    match err.kind() {
        FailureKind::Timeout => TIMEOUT_MESSAGE.to_string(),
        _ if !online => OFFLINE_MESSAGE.to_string(),
        _ => err.user_message(),
    }
}
