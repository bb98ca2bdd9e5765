//! Book domain model

use crate::error::{CoreError, CoreResult};
use crate::types::{cursor, Duration, Track};
use serde::{Deserialize, Serialize};

/// An audiobook: an ordered list of tracks and a cursor into it
///
/// The cached total duration is refreshed by every call that changes the
/// track list, so `duration()` always equals the sum of the track
/// durations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BookRecord")]
pub struct Book {
    title: String,
    tracks: Vec<Track>,
    selected: Option<usize>,
    #[serde(skip_serializing)]
    duration: Duration,
}

/// Unvalidated wire shape of a book
#[derive(Deserialize)]
struct BookRecord {
    title: String,
    #[serde(default)]
    tracks: Vec<Track>,
    #[serde(default)]
    selected: Option<usize>,
}

impl TryFrom<BookRecord> for Book {
    type Error = CoreError;

    fn try_from(record: BookRecord) -> CoreResult<Self> {
        let mut book = Book::with_tracks(record.title, record.tracks)?;

        match record.selected {
            Some(index) if index >= book.len() => {
                return Err(CoreError::out_of_range(index, book.len()));
            }
            selected => book.selected = selected,
        }

        Ok(book)
    }
}

fn validate_title(title: &str) -> CoreResult<()> {
    if title.trim().is_empty() {
        Err(CoreError::InvalidTitle {
            title: title.to_string(),
        })
    } else {
        Ok(())
    }
}

impl Book {
    /// Creates an empty book
    pub fn new(title: impl Into<String>) -> CoreResult<Self> {
        let title = title.into();
        validate_title(&title)?;

        Ok(Self {
            title,
            tracks: Vec::new(),
            selected: None,
            duration: Duration::ZERO,
        })
    }

    /// Creates a book holding `tracks` in order, with the first one selected
    pub fn with_tracks(
        title: impl Into<String>,
        tracks: impl IntoIterator<Item = Track>,
    ) -> CoreResult<Self> {
        let mut book = Self::new(title)?;
        book.tracks.extend(tracks);
        if !book.tracks.is_empty() {
            book.selected = Some(0);
        }
        book.update_duration();
        Ok(book)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Renames the book; a blank title is rejected and the old one kept
    pub fn set_title(&mut self, title: impl Into<String>) -> CoreResult<()> {
        let title = title.into();
        validate_title(&title)?;
        self.title = title;
        Ok(())
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Total length of all tracks
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Recomputes the cached total duration from the track list
    pub fn update_duration(&mut self) -> Duration {
        self.duration = self.tracks.iter().map(Track::duration).sum();
        self.duration
    }

    pub fn track(&self, index: usize) -> CoreResult<&Track> {
        self.tracks
            .get(index)
            .ok_or_else(|| CoreError::out_of_range(index, self.tracks.len()))
    }

    /// Mutable access to a track; only its elapsed time can change
    pub fn track_mut(&mut self, index: usize) -> CoreResult<&mut Track> {
        let len = self.tracks.len();
        self.tracks
            .get_mut(index)
            .ok_or_else(|| CoreError::out_of_range(index, len))
    }

    pub fn selected_track_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_track(&self) -> CoreResult<&Track> {
        self.selected
            .and_then(|index| self.tracks.get(index))
            .ok_or(CoreError::NoSelection { what: "track" })
    }

    pub fn selected_track_mut(&mut self) -> CoreResult<&mut Track> {
        self.selected
            .and_then(|index| self.tracks.get_mut(index))
            .ok_or(CoreError::NoSelection { what: "track" })
    }

    /// Appends a track and returns its index
    ///
    /// The first track added to an empty book becomes the selected one.
    pub fn add_track(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        if self.tracks.len() == 1 {
            self.selected = Some(0);
        }
        self.update_duration();

        log::debug!(
            "Book '{}': added track {} (total {})",
            self.title,
            self.tracks.len() - 1,
            self.duration
        );
        self.tracks.len() - 1
    }

    /// Removes and returns the track at `index`
    pub fn remove_track(&mut self, index: usize) -> CoreResult<Track> {
        if index >= self.tracks.len() {
            return Err(CoreError::out_of_range(index, self.tracks.len()));
        }

        let removed = self.tracks.remove(index);
        self.selected = cursor::after_remove(self.selected, index, self.tracks.len());
        self.update_duration();

        log::debug!(
            "Book '{}': removed track {} (selected {:?}, total {})",
            self.title,
            index,
            self.selected,
            self.duration
        );
        Ok(removed)
    }

    /// Moves the track at `from` so that it ends up at `to`
    ///
    /// Tracks in between shift by one. The selection stays on the same track.
    pub fn move_track(&mut self, from: usize, to: usize) -> CoreResult<()> {
        let len = self.tracks.len();
        if from >= len {
            return Err(CoreError::out_of_range(from, len));
        }
        if to >= len {
            return Err(CoreError::out_of_range(to, len));
        }
        if from == to {
            return Ok(());
        }

        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);
        self.selected = cursor::after_move(self.selected, from, to);

        log::debug!(
            "Book '{}': moved track {} -> {} (selected {:?})",
            self.title,
            from,
            to,
            self.selected
        );
        Ok(())
    }

    /// Exchanges two tracks; `first` must be strictly less than `second`
    pub fn swap_tracks(&mut self, first: usize, second: usize) -> CoreResult<()> {
        let len = self.tracks.len();
        if first >= len {
            return Err(CoreError::out_of_range(first, len));
        }
        if second >= len {
            return Err(CoreError::out_of_range(second, len));
        }
        if first >= second {
            return Err(CoreError::invalid_argument(
                "first",
                format!("{} must be less than second ({})", first, second),
            ));
        }

        self.tracks.swap(first, second);
        self.selected = cursor::after_swap(self.selected, first, second);

        log::debug!(
            "Book '{}': swapped tracks {} <-> {} (selected {:?})",
            self.title,
            first,
            second,
            self.selected
        );
        Ok(())
    }

    /// Selects the track at `index`
    ///
    /// An index at or past the end means the book has been played through:
    /// the selection is cleared rather than wrapped or clamped. Returns the
    /// resulting selection.
    pub fn set_selected_track_index(&mut self, index: usize) -> Option<usize> {
        self.selected = if index < self.tracks.len() {
            Some(index)
        } else {
            None
        };
        self.selected
    }

    /// Moves the selection to the following track
    ///
    /// Past the last track the selection is cleared. Does nothing if no
    /// track is selected.
    pub fn select_next_track(&mut self) -> Option<usize> {
        match self.selected {
            Some(index) => self.set_selected_track_index(index + 1),
            None => None,
        }
    }

    /// Time listened across the whole book
    ///
    /// Full durations of every track before the selected one plus the
    /// elapsed time of the selected track.
    pub fn book_elapsed_time(&self) -> CoreResult<Duration> {
        let selected = self.selected.ok_or(CoreError::NoSelection { what: "track" })?;

        let before: Duration = self.tracks[..selected]
            .iter()
            .map(Track::duration)
            .sum();
        Ok(before + self.tracks[selected].elapsed())
    }

    /// Time left in the book
    ///
    /// A book whose selection was completed has nothing left.
    pub fn remaining_time(&self) -> Duration {
        match self.book_elapsed_time() {
            Ok(elapsed) => self.duration.saturating_sub(elapsed),
            Err(_) => Duration::ZERO,
        }
    }

    /// Fraction of the book listened to, from 0.0 to 1.0
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }

        let elapsed = self.duration.saturating_sub(self.remaining_time());
        elapsed.as_millis() as f64 / self.duration.as_millis() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(name: &str, ms: u64) -> Track {
        Track::new(format!("/books/test/{}.mp3", name), Duration::from_millis(ms)).unwrap()
    }

    fn book_with(durations: &[u64]) -> Book {
        let tracks = durations
            .iter()
            .enumerate()
            .map(|(i, &ms)| track(&format!("t{}", i), ms));
        Book::with_tracks("Test Book", tracks).unwrap()
    }

    fn assert_consistent(book: &Book) {
        let sum: Duration = book.tracks().iter().map(Track::duration).sum();
        assert_eq!(book.duration(), sum);
        if book.is_empty() {
            assert_eq!(book.selected_track_index(), None);
        }
        if let Some(index) = book.selected_track_index() {
            assert!(index < book.len());
        }
    }

    #[test]
    fn test_book_new() {
        let book = Book::new("Dune").unwrap();
        assert_eq!(book.title(), "Dune");
        assert!(book.is_empty());
        assert_eq!(book.selected_track_index(), None);
        assert_eq!(book.duration(), Duration::ZERO);
    }

    #[test]
    fn test_book_rejects_blank_title() {
        assert!(matches!(
            Book::new("   "),
            Err(CoreError::InvalidTitle { .. })
        ));
        assert!(Book::with_tracks("", vec![track("a", 1)]).is_err());
    }

    #[test]
    fn test_with_tracks_selects_first() {
        let book = book_with(&[5, 10]);
        assert_eq!(book.selected_track_index(), Some(0));
        assert_eq!(book.duration().as_millis(), 15);
    }

    #[test]
    fn test_set_title() {
        let mut book = Book::new("Old").unwrap();
        book.set_title("New").unwrap();
        assert_eq!(book.title(), "New");

        assert!(book.set_title("").is_err());
        assert_eq!(book.title(), "New");
    }

    #[test]
    fn test_add_first_track_selects_it() {
        let mut book = Book::new("Test").unwrap();
        assert_eq!(book.add_track(track("a", 10)), 0);
        assert_eq!(book.selected_track_index(), Some(0));
        assert_eq!(book.duration().as_millis(), 10);
    }

    #[test]
    fn test_add_does_not_move_selection() {
        let mut book = book_with(&[10, 20]);
        book.set_selected_track_index(1);
        book.add_track(track("c", 30));
        assert_eq!(book.selected_track_index(), Some(1));
        assert_eq!(book.duration().as_millis(), 60);
    }

    #[test]
    fn test_remove_first_track_repeatedly() {
        let mut book = book_with(&[5, 10, 15, 20]);
        assert_eq!(book.selected_track_index(), Some(0));

        let mut sizes = Vec::new();
        let mut durations = Vec::new();
        for _ in 0..4 {
            book.remove_track(0).unwrap();
            assert_consistent(&book);
            sizes.push(book.len());
            durations.push(book.duration().as_millis());
        }

        assert_eq!(sizes, vec![3, 2, 1, 0]);
        assert_eq!(durations, vec![45, 35, 20, 0]);
        assert_eq!(book.selected_track_index(), None);
    }

    #[test]
    fn test_remove_before_selection() {
        let mut book = book_with(&[1, 2, 3, 4]);
        book.set_selected_track_index(2);
        let removed = book.remove_track(1).unwrap();
        assert_eq!(removed.duration().as_millis(), 2);
        assert_eq!(book.selected_track_index(), Some(1));
        assert_eq!(book.selected_track().unwrap().duration().as_millis(), 3);
    }

    #[test]
    fn test_remove_selected_reselects_first() {
        let mut book = book_with(&[1, 2, 3, 4]);
        book.set_selected_track_index(2);
        book.remove_track(2).unwrap();
        assert_eq!(book.selected_track_index(), Some(0));
    }

    #[test]
    fn test_remove_after_selection() {
        let mut book = book_with(&[1, 2, 3, 4]);
        book.set_selected_track_index(1);
        book.remove_track(3).unwrap();
        assert_eq!(book.selected_track_index(), Some(1));
        assert_eq!(book.duration().as_millis(), 6);
    }

    #[test]
    fn test_remove_out_of_range_is_rejected() {
        let mut book = book_with(&[1, 2]);
        book.set_selected_track_index(1);
        let before = book.clone();

        let result = book.remove_track(2);
        assert!(matches!(
            result,
            Err(CoreError::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert_eq!(book, before);
    }

    #[test]
    fn test_move_selected_follows_track() {
        let mut book = book_with(&[10, 20]);
        book.track_mut(1)
            .unwrap()
            .set_elapsed(Duration::from_millis(7));
        book.set_selected_track_index(1);

        book.move_track(0, 1).unwrap();

        assert_eq!(book.selected_track_index(), Some(0));
        assert_eq!(book.selected_track().unwrap().duration().as_millis(), 20);
        assert_eq!(book.book_elapsed_time().unwrap().as_millis(), 7);
        assert_consistent(&book);
    }

    #[test]
    fn test_move_shifts_tracks_between() {
        let mut book = book_with(&[1, 2, 3, 4, 5]);
        book.set_selected_track_index(2);

        book.move_track(4, 0).unwrap();

        let order: Vec<u64> = book.tracks().iter().map(|t| t.duration().as_millis()).collect();
        assert_eq!(order, vec![5, 1, 2, 3, 4]);
        assert_eq!(book.selected_track().unwrap().duration().as_millis(), 3);
    }

    #[test]
    fn test_move_to_same_index_is_noop() {
        let mut book = book_with(&[1, 2, 3]);
        let before = book.clone();
        book.move_track(1, 1).unwrap();
        assert_eq!(book, before);
    }

    #[test]
    fn test_move_out_of_range_is_rejected() {
        let mut book = book_with(&[1, 2, 3]);
        let before = book.clone();
        assert!(book.move_track(3, 0).is_err());
        assert!(book.move_track(0, 3).is_err());
        assert_eq!(book, before);
    }

    #[test]
    fn test_swap_follows_selected_track() {
        let mut book = book_with(&[1, 2, 3]);
        book.swap_tracks(0, 2).unwrap();
        assert_eq!(book.selected_track_index(), Some(2));
        assert_eq!(book.selected_track().unwrap().duration().as_millis(), 1);

        book.set_selected_track_index(1);
        book.swap_tracks(0, 2).unwrap();
        assert_eq!(book.selected_track_index(), Some(1));
    }

    #[test]
    fn test_swap_requires_ascending_indices() {
        let mut book = book_with(&[1, 2, 3]);
        let before = book.clone();

        assert!(matches!(
            book.swap_tracks(2, 0),
            Err(CoreError::InvalidArgument { .. })
        ));
        assert!(matches!(
            book.swap_tracks(1, 1),
            Err(CoreError::InvalidArgument { .. })
        ));
        assert!(matches!(
            book.swap_tracks(0, 3),
            Err(CoreError::IndexOutOfRange { .. })
        ));
        assert_eq!(book, before);
    }

    #[test]
    fn test_select_one_past_end_clears_selection() {
        let mut book = book_with(&[1, 2, 3]);
        assert_eq!(book.set_selected_track_index(3), None);
        assert_eq!(book.selected_track_index(), None);
        assert!(matches!(
            book.book_elapsed_time(),
            Err(CoreError::NoSelection { .. })
        ));
    }

    #[test]
    fn test_select_in_range() {
        let mut book = book_with(&[1, 2, 3]);
        assert_eq!(book.set_selected_track_index(2), Some(2));
    }

    #[test]
    fn test_select_next_track_completes() {
        let mut book = book_with(&[1, 2]);
        assert_eq!(book.select_next_track(), Some(1));
        assert_eq!(book.select_next_track(), None);
        assert_eq!(book.select_next_track(), None);
    }

    #[test]
    fn test_book_elapsed_time() {
        let mut book = book_with(&[100, 200, 300]);
        book.track_mut(2)
            .unwrap()
            .set_elapsed(Duration::from_millis(50));
        book.set_selected_track_index(2);

        assert_eq!(book.book_elapsed_time().unwrap().as_millis(), 350);
        assert_eq!(book.remaining_time().as_millis(), 250);
        assert!((book.progress() - 350.0 / 600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_elapsed_time_requires_selection() {
        let book = Book::new("Empty").unwrap();
        assert!(matches!(
            book.book_elapsed_time(),
            Err(CoreError::NoSelection { what: "track" })
        ));
        assert_eq!(book.progress(), 0.0);
    }

    #[test]
    fn test_completed_book_progress() {
        let mut book = book_with(&[100]);
        book.select_next_track();
        assert_eq!(book.remaining_time(), Duration::ZERO);
        assert_eq!(book.progress(), 1.0);
    }

    #[test]
    fn test_selected_track_mut_updates_elapsed() {
        let mut book = book_with(&[100]);
        book.selected_track_mut()
            .unwrap()
            .set_elapsed(Duration::from_millis(40));
        assert_eq!(book.book_elapsed_time().unwrap().as_millis(), 40);
        assert_eq!(book.duration().as_millis(), 100);
    }

    #[test]
    fn test_track_out_of_range() {
        let mut book = book_with(&[1]);
        assert!(book.track(1).is_err());
        assert!(book.track_mut(1).is_err());
    }

    #[test]
    fn test_clone_is_deep_and_equal() {
        let mut book = book_with(&[10, 20, 30]);
        book.set_selected_track_index(1);
        book.track_mut(1)
            .unwrap()
            .set_elapsed(Duration::from_millis(5));

        let mut copy = book.clone();
        assert_eq!(copy, book);
        for (a, b) in copy.tracks().iter().zip(book.tracks()) {
            assert!(!std::ptr::eq(a, b));
        }

        copy.track_mut(1).unwrap().reset();
        assert_ne!(copy, book);
        assert_eq!(book.track(1).unwrap().elapsed().as_millis(), 5);
    }

    #[test]
    fn test_equality_considers_selection_and_title() {
        let a = book_with(&[1, 2]);
        let mut b = a.clone();
        b.set_selected_track_index(1);
        assert_ne!(a, b);

        let mut c = a.clone();
        c.set_title("Other").unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_serde_round_trip_recomputes_duration() {
        let mut book = book_with(&[10, 20]);
        book.set_selected_track_index(1);

        let json = serde_json::to_string(&book).unwrap();
        assert!(!json.contains("duration\":30"));

        let decoded: Book = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, book);
        assert_eq!(decoded.duration().as_millis(), 30);
    }

    #[test]
    fn test_deserialize_rejects_bad_cursor() {
        let json = r#"{"title":"T","tracks":[{"path":"/a.mp3","duration":5}],"selected":1}"#;
        assert!(serde_json::from_str::<Book>(json).is_err());

        let json = r#"{"title":"T","tracks":[],"selected":0}"#;
        assert!(serde_json::from_str::<Book>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_blank_title() {
        let json = r#"{"title":" ","tracks":[]}"#;
        assert!(serde_json::from_str::<Book>(json).is_err());
    }
}
