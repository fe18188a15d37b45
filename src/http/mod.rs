//! HTTP module
//!
//! Retrieves pages from the remote resource.
//!
//! # Features
//!
//! - **Page source seam**: [`PageSource`] is what the feed runtime fetches
//!   through, so other transports (or canned data) can stand in for HTTP
//! - **Status handling**: non-2xx answers become `HttpStatus` errors carrying
//!   the status code and body
//! - **Body validation**: a page must be a JSON array

mod client;

pub use client::{HttpPageSource, PageSource};
