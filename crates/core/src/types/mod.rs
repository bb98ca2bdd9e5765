//! Domain types for Audioshelf
//!
//! - `track`: a single audio file with playback progress
//! - `book`: ordered tracks with a selected-track cursor
//! - `bookshelf`: ordered books with a selected-book cursor
//! - `common`: shared value types
//!
//! Books and the shelf share their cursor adjustment rules through the
//! private `cursor` module.

mod book;
mod bookshelf;
mod common;
mod cursor;
mod track;

pub use book::Book;
pub use bookshelf::Bookshelf;
pub use common::Duration;
pub use track::Track;
