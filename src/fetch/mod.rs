//! Fetch module
//!
//! Page retrieval bookkeeping and the retry scheduler.
//!
//! # Features
//!
//! - **Single flight**: at most one page request is active; requests issued
//!   while one is in flight are dropped, not queued
//! - **Failure classification**: every failure becomes one user-facing message
//! - **Bounded backoff**: `INITIAL_DELAY × BACKOFF_MULTIPLIER^(attempt−1)`,
//!   capped at `MAX_ATTEMPTS`, with at most one pending timer

mod controller;
mod retry;

pub use controller::{classify, FetchController, FetchState, InFlight};
pub use retry::{PendingRetry, RetryPolicy, RetryScheduler, ScheduledRetry};
