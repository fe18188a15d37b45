//! Retry scheduler
//!
//! After a failed fetch, schedules exactly one re-invocation of the same
//! page after an exponentially growing delay. The attempt counter lives in
//! [`FetchState::retry_attempt`] so that scheduling and the visibility
//! trigger read the same number.

use super::controller::FetchState;
use crate::config::RetryConfig;
use crate::types::{IdSeq, PageIndex, TimerId};
use std::time::Duration;
use tracing::{info, warn};

/// Backoff parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Automatic retries before the error is terminal
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Factor applied per further attempt
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_delay: config.initial_delay(),
            multiplier: config.backoff_multiplier,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let millis = self.initial_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        // float-to-int casts saturate
        Duration::from_millis(millis.round() as u64)
    }

    /// Whether `attempt` retries have used up the budget
    pub fn is_exhausted(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }
}

/// The retry timer waiting to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRetry {
    /// Timer identifier
    pub timer: TimerId,
    /// Page the timer will re-fetch
    pub page: PageIndex,
}

/// A newly scheduled retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledRetry {
    /// The new timer
    pub timer: TimerId,
    /// Page to re-fetch
    pub page: PageIndex,
    /// Delay before firing
    pub delay: Duration,
    /// Unfired timer replaced by this one
    pub replaced: Option<TimerId>,
}

/// Schedules retries with bounded exponential backoff
#[derive(Debug, Default)]
pub struct RetryScheduler {
    policy: RetryPolicy,
    pending: Option<PendingRetry>,
    ids: IdSeq,
}

impl RetryScheduler {
    /// Create a scheduler with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            pending: None,
            ids: IdSeq::default(),
        }
    }

    /// Backoff policy
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The timer waiting to fire, if any
    pub fn pending(&self) -> Option<PendingRetry> {
        self.pending
    }

    /// Whether the retry budget in `state` is used up
    pub fn is_exhausted(&self, state: &FetchState) -> bool {
        self.policy.is_exhausted(state.retry_attempt)
    }

    /// Schedule a retry of `page` after a failure.
    ///
    /// Does nothing when offline or once `retry_attempt` has reached the
    /// cap. Otherwise bumps the counter and replaces any unfired timer.
    pub fn schedule(
        &mut self,
        state: &mut FetchState,
        page: PageIndex,
        online: bool,
    ) -> Option<ScheduledRetry> {
        if !online {
            info!("Offline, not scheduling a retry for page {}", page);
            return None;
        }
        if self.is_exhausted(state) {
            warn!(
                "Max retry attempts ({}) reached for page {}, stopping auto retries",
                self.policy.max_attempts, page
            );
            return None;
        }

        state.retry_attempt += 1;
        let delay = self.policy.delay_for(state.retry_attempt);
        let replaced = self.pending.take().map(|p| p.timer);
        let timer = TimerId(self.ids.next());
        self.pending = Some(PendingRetry { timer, page });

        info!(
            "Auto retry attempt {}/{} for page {} in {:?}",
            state.retry_attempt, self.policy.max_attempts, page, delay
        );

        Some(ScheduledRetry {
            timer,
            page,
            delay,
            replaced,
        })
    }

    /// Consume a fired timer, returning the page to re-fetch.
    ///
    /// Timers that were cancelled or replaced yield `None`.
    pub fn fire(&mut self, timer: TimerId) -> Option<PageIndex> {
        match self.pending {
            Some(pending) if pending.timer == timer => {
                self.pending = None;
                Some(pending.page)
            }
            _ => None,
        }
    }

    /// Cancel the pending timer
    pub fn cancel(&mut self) -> Option<TimerId> {
        self.pending.take().map(|p| p.timer)
    }
}
