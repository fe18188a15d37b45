//! Visibility module
//!
//! Watches the sentinel element at the end of the gallery. When enough of
//! it is on screen and the feed is in a state that allows it, the trigger
//! asks for the next page by advancing the page index. It never fetches.

mod trigger;

pub use trigger::{AdvanceConditions, IntersectionEntry, VisibilityTrigger, DEFAULT_THRESHOLD};
