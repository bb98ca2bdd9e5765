//! Listening behaviour: where to resume and when a track counts as done

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Longest rewind or completion window accepted, in milliseconds
pub const MAX_WINDOW_MS: u64 = 60_000;

/// Playback settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlaybackConfig {
    /// How far to step back from the saved position when resuming
    pub rewind_on_resume_ms: u64,

    /// Elapsed time this close to the end of a track counts as finished
    pub completion_threshold_ms: u64,

    /// Select the next track once the current one is finished
    pub auto_advance: bool,
}

impl PlaybackConfig {
    /// Position to resume from, given the saved position
    pub fn resume_position_ms(&self, saved_ms: u64) -> u64 {
        saved_ms.saturating_sub(self.rewind_on_resume_ms)
    }

    /// Whether `elapsed_ms` is close enough to `duration_ms` to be finished
    pub fn is_complete(&self, elapsed_ms: u64, duration_ms: u64) -> bool {
        elapsed_ms.saturating_add(self.completion_threshold_ms) >= duration_ms
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            rewind_on_resume_ms: 3_000,
            completion_threshold_ms: 1_000,
            auto_advance: true,
        }
    }
}

impl ConfigSection for PlaybackConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let results = vec![
            Validator::in_range(
                self.rewind_on_resume_ms,
                0,
                MAX_WINDOW_MS,
                "playback.rewind_on_resume_ms",
            ),
            Validator::in_range(
                self.completion_threshold_ms,
                0,
                MAX_WINDOW_MS,
                "playback.completion_threshold_ms",
            ),
        ];

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.rewind_on_resume_ms = other.rewind_on_resume_ms;
        self.completion_threshold_ms = other.completion_threshold_ms;
        self.auto_advance = other.auto_advance;
    }

    fn section_name(&self) -> &'static str {
        "playback"
    }
}
