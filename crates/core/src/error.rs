//! Error types for the Audioshelf model
//!
//! Every fallible operation in this crate reports one of a small set of
//! error kinds:
//! - **Construction**: a track or book could not be built from its inputs
//! - **IndexOutOfRange**: a selection or structural edit named a missing position
//! - **NoSelection**: a query needs a cursor that does not exist
//! - **InvalidArgument**: any other rejected input (negative time, bad swap order)
//!
//! All of them are caller errors. A failed call never leaves the shelf,
//! book or track partially modified.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the shelf model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Track could not be constructed
    #[error("Invalid track {path}: {reason}")]
    InvalidTrack { path: PathBuf, reason: String },

    /// Book title is empty or whitespace
    #[error("Invalid book title: '{title}'")]
    InvalidTitle { title: String },

    /// Index does not name an element of the sequence
    #[error("Index {index} out of range (len: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Operation requires a selected element
    #[error("No {what} is selected")]
    NoSelection { what: &'static str },

    /// Argument rejected for a reason other than range
    #[error("Invalid argument: {argument} - {reason}")]
    InvalidArgument { argument: String, reason: String },
}

impl CoreError {
    /// Returns a short message suitable for showing to a user
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidTrack { path, .. } => {
                format!("'{}' cannot be used as a track.", path.display())
            }
            Self::InvalidTitle { .. } => "A book needs a title.".to_string(),
            Self::IndexOutOfRange { index, len } => {
                if *len == 0 {
                    "There is nothing there yet.".to_string()
                } else {
                    format!("Position {} does not exist (1-{}).", index + 1, len)
                }
            }
            Self::NoSelection { what } => format!("Select a {} first.", what),
            Self::InvalidArgument { .. } => "Invalid input provided.".to_string(),
        }
    }

    /// Returns true if the error was caused by the caller's input rather
    /// than by the state of the shelf
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, Self::NoSelection { .. })
    }

    pub(crate) fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    pub(crate) fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results using CoreError
pub type CoreResult<T> = std::result::Result<T, CoreError>;
