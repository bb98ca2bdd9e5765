//! Audioshelf core
//!
//! The in-memory model of an audiobook collection: a [`Bookshelf`] of
//! [`Book`]s, each an ordered list of [`Track`]s, with a cursor at both
//! levels. Structural edits (add, remove, move, swap) keep the cursors on
//! the elements they pointed at and keep each book's cached duration equal
//! to the sum of its tracks.
//!
//! Changes that should be observed by other parts of an application go
//! through [`ShelfService`], which publishes a [`ShelfEvent`] for each one.

pub mod error;
pub mod events;
pub mod service;
pub mod source;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, CoreResult};
pub use events::{EventHub, ShelfEvent, SubscriptionId};
pub use service::ShelfService;
pub use source::{ImportReport, SkippedTrack, TrackInfo, TrackSource};
pub use types::{Book, Bookshelf, Duration, Track};
