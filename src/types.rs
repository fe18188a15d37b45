//! Common types used throughout the gallery feed
//!
//! Identifiers handed out by the engine and the record type the remote
//! resource returns.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// One record from the remote resource.
///
/// Items are opaque: identity is their position in the feed.
pub type Item = serde_json::Value;

/// 1-based page index
pub type PageIndex = u32;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifies one issued page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

/// Identifies one scheduled retry timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// Handle of the sentinel element observed by the visibility trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sentinel(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sentinel-{}", self.0)
    }
}

/// Monotonic id source
#[derive(Debug, Default)]
pub(crate) struct IdSeq(u64);

impl IdSeq {
    pub(crate) fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}
