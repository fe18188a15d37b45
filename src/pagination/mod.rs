//! Pagination module
//!
//! Holds the accumulated feed: the ordered items, the current page index,
//! whether the remote resource has more pages, and the back-navigation
//! suppression flag.
//!
//! # Overview
//!
//! [`PageState`] is mutated in exactly two places: the fetch completion
//! handler ([`PageState::apply_page`]) and the visibility trigger's page
//! advance ([`PageState::advance`]). Pages are requested with
//! [`PageRequest`], which renders the `page`/`limit` query parameters.

mod types;

pub use types::{PageOutcome, PageRequest, PageState};
