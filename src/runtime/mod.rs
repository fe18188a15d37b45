//! Feed runtime module
//!
//! Drives a [`GalleryEngine`](crate::engine::GalleryEngine) on tokio.
//!
//! # Overview
//!
//! [`Feed::spawn`] starts one task that owns the engine, so the page state
//! has exactly one writer. Hosts talk to it through a cloneable
//! [`FeedHandle`]: commands go in over an unbounded channel, snapshots come
//! out through a `watch` channel. Page requests and retry timers run as
//! their own tasks and report back through the same command channel.

mod feed;

pub use feed::{Feed, FeedHandle, FeedOptions};

#[cfg(test)]
mod tests;
