// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Gallery Feed
//!
//! Incremental loading engine for paginated photo galleries.
//!
//! ## Features
//!
//! - **Page-numbered fetching**: `page`/`limit` query parameters, one page
//!   in flight at a time
//! - **Infinite scroll**: a sentinel visibility trigger advances the page
//! - **Bounded retries**: exponential backoff with a hard attempt cap and a
//!   manual retry once the cap is reached
//! - **Connectivity aware**: offline transitions cancel pending work and
//!   surface a dedicated message
//! - **Back-navigation restore**: a restored state skips the redundant fetch
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gallery_feed::{Feed, FeedConfig, HttpPageSource, Result, Sentinel};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = FeedConfig::builder()
//!         .base_url("https://picsum.photos")
//!         .path("/v2/list")
//!         .build();
//!
//!     let feed = Feed::spawn(HttpPageSource::new(&config)?, &config);
//!     let handle = feed.handle();
//!
//!     handle.attach_sentinel(Sentinel(1))?;
//!     handle.mount()?;
//!     let snapshot = handle.wait_for(|s| s.mounted && s.is_settled()).await?;
//!     println!("{} photos", snapshot.len());
//!
//!     // Sentinel scrolled into view: load the next page
//!     handle.sentinel_visible(Sentinel(1), true)?;
//!
//!     let state = feed.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Feed runtime (tokio)                        │
//! │  FeedHandle ─► events ─► GalleryEngine ─► effects ─► tasks      │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌────────────┬─────────────┬───┴──────────┬────────────┬──────────┐
//! │ Pagination │    Fetch    │    Retry     │ Visibility │ Connect. │
//! ├────────────┼─────────────┼──────────────┼────────────┼──────────┤
//! │ Items      │ Single      │ Backoff      │ Sentinel   │ Monitor  │
//! │ Page index │ flight      │ Attempt cap  │ Threshold  │ TCP probe│
//! │ has_more   │ Classify    │ One timer    │ Advance    │          │
//! └────────────┴─────────────┴──────────────┴────────────┴──────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the feed
pub mod error;

/// Common types and type aliases
pub mod types;

/// Feed configuration
pub mod config;

/// Page state and page requests
pub mod pagination;

/// Online/offline tracking
pub mod connectivity;

/// Fetch bookkeeping and retry scheduling
pub mod fetch;

/// Sentinel visibility trigger
pub mod visibility;

/// Incremental loading state machine
pub mod engine;

/// HTTP page source
pub mod http;

/// Tokio driver for the engine
pub mod runtime;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{FeedConfig, RetryConfig};
pub use engine::{GallerySnapshot, GalleryEngine};
pub use http::{HttpPageSource, PageSource};
pub use pagination::PageState;
pub use runtime::{Feed, FeedHandle, FeedOptions};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
