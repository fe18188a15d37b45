//! Sentinel observation

use crate::types::Sentinel;
use tracing::debug;

/// Visible fraction at which the sentinel counts as on screen
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// One intersection observation for a sentinel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    /// Observed sentinel
    pub sentinel: Sentinel,
    /// Fraction of the sentinel inside the viewport, 0.0 to 1.0
    pub ratio: f64,
}

impl IntersectionEntry {
    /// Create an entry
    pub fn new(sentinel: Sentinel, ratio: f64) -> Self {
        Self { sentinel, ratio }
    }

    /// Fully visible sentinel
    pub fn visible(sentinel: Sentinel) -> Self {
        Self::new(sentinel, 1.0)
    }

    /// Sentinel scrolled out of view
    pub fn hidden(sentinel: Sentinel) -> Self {
        Self::new(sentinel, 0.0)
    }
}

/// Feed state the trigger consults before advancing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceConditions {
    /// Device is online
    pub online: bool,
    /// Resource may have more pages
    pub has_more: bool,
    /// A request is in flight
    pub loading: bool,
    /// An error is shown
    pub has_error: bool,
    /// Automatic retries are used up
    pub retries_exhausted: bool,
}

impl AdvanceConditions {
    /// Whether the page index may advance
    pub fn allow(&self) -> bool {
        self.online && self.has_more && !self.loading && !self.has_error && !self.retries_exhausted
    }
}

/// Tracks the observed sentinel and whether it is on screen
#[derive(Debug, Clone)]
pub struct VisibilityTrigger {
    threshold: f64,
    sentinel: Option<Sentinel>,
    visible: bool,
}

impl Default for VisibilityTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl VisibilityTrigger {
    /// Create a trigger with a visibility threshold
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            sentinel: None,
            visible: false,
        }
    }

    /// Observed sentinel
    pub fn sentinel(&self) -> Option<Sentinel> {
        self.sentinel
    }

    /// Whether the observed sentinel is on screen
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Start observing `sentinel`.
    ///
    /// Returns `true` when this replaced the subscription, i.e. the
    /// sentinel identity changed.
    pub fn observe(&mut self, sentinel: Sentinel) -> bool {
        if self.sentinel == Some(sentinel) {
            return false;
        }
        debug!("Observing {}", sentinel);
        self.sentinel = Some(sentinel);
        self.visible = false;
        true
    }

    /// Stop observing
    pub fn unobserve(&mut self) -> Option<Sentinel> {
        self.visible = false;
        self.sentinel.take()
    }

    /// Record an observation.
    ///
    /// Returns `true` when the observed sentinel is now on screen. Entries
    /// for sentinels not being observed are ignored.
    pub fn record(&mut self, entry: IntersectionEntry) -> bool {
        if self.sentinel != Some(entry.sentinel) {
            return false;
        }
        self.visible = entry.ratio >= self.threshold;
        self.visible
    }
}
