//! Boundary with whatever discovers audio files
//!
//! The model never touches the file system. A collaborator that scans
//! directories or reads tags hands over [`TrackInfo`] values through the
//! [`TrackSource`] trait, and the shelf service turns them into tracks.

use crate::error::{CoreError, CoreResult};
use crate::types::{Duration, Track};
use std::path::PathBuf;

/// Candidate track as reported by a file/metadata collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub path: PathBuf,
    pub duration: Duration,
    pub title: String,
}

impl TrackInfo {
    pub fn new(path: impl Into<PathBuf>, duration: Duration, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            duration,
            title: title.into(),
        }
    }

    /// Builds the track this info describes
    pub fn to_track(&self) -> CoreResult<Track> {
        Track::new(self.path.clone(), self.duration)
    }
}

/// Supplies candidate tracks in play order
pub trait TrackSource {
    fn tracks(&self) -> CoreResult<Vec<TrackInfo>>;
}

impl TrackSource for Vec<TrackInfo> {
    fn tracks(&self) -> CoreResult<Vec<TrackInfo>> {
        Ok(self.clone())
    }
}

impl TrackSource for [TrackInfo] {
    fn tracks(&self) -> CoreResult<Vec<TrackInfo>> {
        Ok(self.to_vec())
    }
}

/// A candidate that could not become a track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTrack {
    pub path: PathBuf,
    pub error: CoreError,
}

/// Outcome of importing a book from a [`TrackSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Shelf index of the new book
    pub book: usize,
    /// Number of tracks added to it
    pub added: usize,
    pub skipped: Vec<SkippedTrack>,
}

impl ImportReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Converts every candidate, separating the invalid ones
pub(crate) fn build_tracks(infos: &[TrackInfo]) -> (Vec<Track>, Vec<SkippedTrack>) {
    let mut tracks = Vec::with_capacity(infos.len());
    let mut skipped = Vec::new();

    for info in infos {
        match info.to_track() {
            Ok(track) => tracks.push(track),
            Err(error) => {
                log::warn!("Skipping track {}: {}", info.path.display(), error);
                skipped.push(SkippedTrack {
                    path: info.path.clone(),
                    error,
                });
            }
        }
    }

    (tracks, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_track() {
        let info = TrackInfo::new("/a/01.mp3", Duration::from_millis(10), "Opening");
        let track = info.to_track().unwrap();
        assert_eq!(track.path(), info.path.as_path());
        assert_eq!(track.duration(), info.duration);
    }

    #[test]
    fn test_build_tracks_reports_invalid() {
        let infos = vec![
            TrackInfo::new("/a/01.mp3", Duration::from_millis(10), "One"),
            TrackInfo::new("/a/02.mp3", Duration::ZERO, "Two"),
            TrackInfo::new("", Duration::from_millis(10), "Three"),
            TrackInfo::new("/a/04.mp3", Duration::from_millis(30), "Four"),
        ];

        let (tracks, skipped) = build_tracks(&infos);
        assert_eq!(tracks.len(), 2);
        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].path, PathBuf::from("/a/02.mp3"));
        assert!(matches!(skipped[1].error, CoreError::InvalidTrack { .. }));
    }

    #[test]
    fn test_vec_source() {
        let infos = vec![TrackInfo::new("/a.mp3", Duration::from_millis(1), "A")];
        assert_eq!(infos.tracks().unwrap(), infos);
        assert_eq!(infos.as_slice().tracks().unwrap().len(), 1);
    }
}
