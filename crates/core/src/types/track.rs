//! Track domain model

use crate::error::{CoreError, CoreResult};
use crate::types::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A single audio file of a book together with how much of it was heard
///
/// `path` and `duration` are fixed at construction; only the elapsed time
/// changes afterwards, and it never exceeds the duration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TrackRecord")]
pub struct Track {
    path: PathBuf,
    duration: Duration,
    elapsed: Duration,
}

/// Unvalidated wire shape of a track
#[derive(Deserialize)]
struct TrackRecord {
    path: PathBuf,
    duration: Duration,
    #[serde(default)]
    elapsed: Duration,
}

impl TryFrom<TrackRecord> for Track {
    type Error = CoreError;

    fn try_from(record: TrackRecord) -> CoreResult<Self> {
        let mut track = Track::new(record.path, record.duration)?;
        track.set_elapsed(record.elapsed);
        Ok(track)
    }
}

impl Track {
    /// Creates a track with nothing elapsed
    ///
    /// Fails if the path is empty or the duration is zero.
    pub fn new(path: impl Into<PathBuf>, duration: Duration) -> CoreResult<Self> {
        let path = path.into();

        if path.as_os_str().is_empty() {
            return Err(CoreError::InvalidTrack {
                path,
                reason: "path must not be empty".to_string(),
            });
        }

        if duration.is_zero() {
            return Err(CoreError::InvalidTrack {
                path,
                reason: "duration must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            path,
            duration,
            elapsed: Duration::ZERO,
        })
    }

    /// Returns the file path identifying this track
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the total length of the track
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Returns how much of the track has been played
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns how much of the track is left
    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.elapsed)
    }

    /// Returns true once the whole track has been played
    pub fn is_finished(&self) -> bool {
        self.elapsed == self.duration
    }

    /// Display name derived from the file name
    pub fn title(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Sets the elapsed time, clamping to the track duration
    ///
    /// Returns the value actually stored.
    pub fn set_elapsed(&mut self, elapsed: Duration) -> Duration {
        self.elapsed = elapsed.min(self.duration);
        self.elapsed
    }

    /// Sets the elapsed time from a signed millisecond position
    ///
    /// Negative positions are rejected and leave the track untouched;
    /// positions past the end are clamped.
    pub fn set_elapsed_millis(&mut self, millis: i64) -> CoreResult<Duration> {
        let millis = u64::try_from(millis).map_err(|_| {
            CoreError::invalid_argument("elapsed", format!("{}ms must not be negative", millis))
        })?;
        Ok(self.set_elapsed(Duration::from_millis(millis)))
    }

    /// Rewinds the track to its start
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}
