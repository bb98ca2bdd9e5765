//! Shelf service: the single entry point for observable shelf changes
//!
//! The service owns the bookshelf it is given and an [`EventHub`]. Each
//! method applies one change through the model, then publishes the events
//! describing it. A call that fails publishes nothing and leaves the shelf
//! as it was.

use crate::error::CoreResult;
use crate::events::{EventHub, ShelfEvent};
use crate::source::{build_tracks, ImportReport, TrackSource};
use crate::types::{Book, Bookshelf, Duration, Track};

/// Mutates a bookshelf and notifies subscribers of every change
#[derive(Debug, Default)]
pub struct ShelfService {
    shelf: Bookshelf,
    events: EventHub,
}

impl ShelfService {
    /// Wraps an existing shelf
    pub fn new(shelf: Bookshelf) -> Self {
        Self {
            shelf,
            events: EventHub::new(),
        }
    }

    pub fn shelf(&self) -> &Bookshelf {
        &self.shelf
    }

    /// Gives the shelf back, dropping all subscriptions
    pub fn into_shelf(self) -> Bookshelf {
        self.shelf
    }

    /// Subscription management
    pub fn events(&mut self) -> &mut EventHub {
        &mut self.events
    }

    fn emit(&mut self, event: ShelfEvent) {
        self.events.publish(&event);
    }

    fn emit_book_selection(&mut self, before: Option<usize>, removed: Option<usize>) {
        let after = self.shelf.selected_book_index();
        if after != before || (removed.is_some() && removed == before) {
            self.emit(ShelfEvent::BookSelected { index: after });
        }
    }

    fn emit_track_selection(&mut self, book: usize, before: Option<usize>, removed: Option<usize>) {
        let after = self
            .shelf
            .book_at(book)
            .map(Book::selected_track_index)
            .unwrap_or(None);
        if after != before || (removed.is_some() && removed == before) {
            self.emit(ShelfEvent::TrackIndexChanged { book, index: after });
        }
    }

    fn emit_track_order(&mut self, book: usize) {
        if let Ok(b) = self.shelf.book_at(book) {
            let order = b.tracks().iter().map(|t| t.path().to_path_buf()).collect();
            self.emit(ShelfEvent::TrackOrderChanged { book, order });
        }
    }

    fn emit_duration(&mut self, book: usize) {
        if let Ok(b) = self.shelf.book_at(book) {
            let duration = b.duration();
            self.emit(ShelfEvent::BookDurationChanged { book, duration });
        }
    }

    /// Appends a book to the shelf and returns its index
    pub fn add_book(&mut self, book: Book) -> usize {
        let before = self.shelf.selected_book_index();
        let title = book.title().to_string();
        let index = self.shelf.add_book(book);

        self.emit(ShelfEvent::BookAdded { index, title });
        self.emit_book_selection(before, None);
        index
    }

    pub fn remove_book(&mut self, index: usize) -> CoreResult<Book> {
        let before = self.shelf.selected_book_index();
        let book = self.shelf.remove_book_at(index)?;

        self.emit(ShelfEvent::BookRemoved {
            index,
            title: book.title().to_string(),
        });
        self.emit_book_selection(before, Some(index));
        Ok(book)
    }

    pub fn move_book(&mut self, from: usize, to: usize) -> CoreResult<()> {
        let before = self.shelf.selected_book_index();
        self.shelf.move_book(from, to)?;

        if from != to {
            self.emit(ShelfEvent::BookMoved { from, to });
            self.emit_book_selection(before, None);
        }
        Ok(())
    }

    pub fn select_book(&mut self, index: usize) -> CoreResult<()> {
        let before = self.shelf.selected_book_index();
        self.shelf.set_selected_book_index(index)?;
        self.emit_book_selection(before, None);
        Ok(())
    }

    pub fn rename_book(&mut self, book: usize, title: impl Into<String>) -> CoreResult<()> {
        let target = self.shelf.book_at_mut(book)?;
        let title = title.into();
        if target.title() == title {
            return Ok(());
        }
        target.set_title(title)?;

        let title = target.title().to_string();
        self.emit(ShelfEvent::BookTitleChanged { book, title });
        Ok(())
    }

    /// Appends a track to a book and returns the track's index
    pub fn add_track(&mut self, book: usize, track: Track) -> CoreResult<usize> {
        let target = self.shelf.book_at_mut(book)?;
        let before = target.selected_track_index();
        let path = track.path().to_path_buf();
        let index = target.add_track(track);

        self.emit(ShelfEvent::TrackAdded { book, index, path });
        self.emit_duration(book);
        self.emit_track_selection(book, before, None);
        Ok(index)
    }

    pub fn remove_track(&mut self, book: usize, index: usize) -> CoreResult<Track> {
        let target = self.shelf.book_at_mut(book)?;
        let before = target.selected_track_index();
        let track = target.remove_track(index)?;

        self.emit(ShelfEvent::TrackRemoved {
            book,
            index,
            path: track.path().to_path_buf(),
        });
        self.emit_duration(book);
        self.emit_track_selection(book, before, Some(index));
        Ok(track)
    }

    pub fn move_track(&mut self, book: usize, from: usize, to: usize) -> CoreResult<()> {
        let target = self.shelf.book_at_mut(book)?;
        let before = target.selected_track_index();
        target.move_track(from, to)?;

        if from != to {
            self.emit_track_order(book);
            self.emit_track_selection(book, before, None);
        }
        Ok(())
    }

    pub fn swap_tracks(&mut self, book: usize, first: usize, second: usize) -> CoreResult<()> {
        let target = self.shelf.book_at_mut(book)?;
        let before = target.selected_track_index();
        target.swap_tracks(first, second)?;

        self.emit_track_order(book);
        self.emit_track_selection(book, before, None);
        Ok(())
    }

    /// Selects a track; an index past the end marks the book as completed
    pub fn select_track(&mut self, book: usize, index: usize) -> CoreResult<Option<usize>> {
        let target = self.shelf.book_at_mut(book)?;
        let before = target.selected_track_index();
        let after = target.set_selected_track_index(index);

        self.emit_track_selection(book, before, None);
        Ok(after)
    }

    /// Advances a book to its next track
    pub fn next_track(&mut self, book: usize) -> CoreResult<Option<usize>> {
        let target = self.shelf.book_at_mut(book)?;
        let before = target.selected_track_index();
        let after = target.select_next_track();

        self.emit_track_selection(book, before, None);
        Ok(after)
    }

    /// Records playback progress of one track
    ///
    /// Negative positions are rejected; positions past the end are clamped.
    pub fn set_elapsed_time(
        &mut self,
        book: usize,
        track: usize,
        millis: i64,
    ) -> CoreResult<Duration> {
        let target = self.shelf.book_at_mut(book)?.track_mut(track)?;
        let before = target.elapsed();
        let elapsed = target.set_elapsed_millis(millis)?;

        if elapsed != before {
            self.emit(ShelfEvent::ElapsedTimeChanged {
                book,
                track,
                elapsed,
            });
        }
        Ok(elapsed)
    }

    /// Builds a book from a track source and appends it to the shelf
    ///
    /// Candidates that cannot become tracks are listed in the report
    /// instead of failing the whole import.
    pub fn import_book(
        &mut self,
        title: impl Into<String>,
        source: &dyn TrackSource,
    ) -> CoreResult<ImportReport> {
        let infos = source.tracks()?;
        let (tracks, skipped) = build_tracks(&infos);
        let added = tracks.len();
        let book = Book::with_tracks(title, tracks)?;

        log::info!(
            "Importing '{}': {} tracks, {} skipped",
            book.title(),
            added,
            skipped.len()
        );
        let index = self.add_book(book);

        Ok(ImportReport {
            book: index,
            added,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::source::TrackInfo;

    fn track(name: &str, ms: u64) -> Track {
        Track::new(format!("/books/{}.mp3", name), Duration::from_millis(ms)).unwrap()
    }

    fn book(title: &str, durations: &[u64]) -> Book {
        let tracks = durations
            .iter()
            .enumerate()
            .map(|(i, &ms)| track(&format!("{}-{}", title, i), ms));
        Book::with_tracks(title, tracks).unwrap()
    }

    fn recording_service(shelf: Bookshelf) -> (ShelfService, crossbeam_channel::Receiver<ShelfEvent>) {
        let mut service = ShelfService::new(shelf);
        let (_id, rx) = service.events().subscribe_channel();
        (service, rx)
    }

    fn names(rx: &crossbeam_channel::Receiver<ShelfEvent>) -> Vec<&'static str> {
        rx.try_iter().map(|e| e.name()).collect()
    }

    #[test]
    fn test_add_first_book_emits_selection() {
        let (mut service, rx) = recording_service(Bookshelf::new());
        assert_eq!(service.add_book(book("A", &[1])), 0);
        assert_eq!(names(&rx), vec!["book-added", "book-selected"]);

        service.add_book(book("B", &[1]));
        assert_eq!(names(&rx), vec!["book-added"]);
    }

    #[test]
    fn test_remove_book_before_selection() {
        let mut shelf = Bookshelf::new();
        for t in ["A", "B", "C"] {
            shelf.add_book(book(t, &[1]));
        }
        shelf.set_selected_book_index(2).unwrap();
        let (mut service, rx) = recording_service(shelf);

        let removed = service.remove_book(0).unwrap();
        assert_eq!(removed.title(), "A");

        let events: Vec<ShelfEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                ShelfEvent::BookRemoved {
                    index: 0,
                    title: "A".to_string()
                },
                ShelfEvent::BookSelected { index: Some(1) },
            ]
        );
    }

    #[test]
    fn test_remove_selected_book_at_zero_reports_new_selection() {
        let mut shelf = Bookshelf::new();
        shelf.add_book(book("A", &[1]));
        shelf.add_book(book("B", &[1]));
        let (mut service, rx) = recording_service(shelf);

        service.remove_book(0).unwrap();
        assert_eq!(names(&rx), vec!["book-removed", "book-selected"]);
        assert_eq!(service.shelf().selected_book().unwrap().title(), "B");
    }

    #[test]
    fn test_failed_operation_emits_nothing() {
        let mut shelf = Bookshelf::new();
        shelf.add_book(book("A", &[1, 2]));
        let (mut service, rx) = recording_service(shelf);
        let before = service.shelf().clone();

        assert!(service.remove_book(3).is_err());
        assert!(service.select_book(1).is_err());
        assert!(service.remove_track(0, 5).is_err());
        assert!(service.swap_tracks(0, 1, 0).is_err());
        assert!(service.set_elapsed_time(0, 0, -5).is_err());
        assert!(service.rename_book(0, " ").is_err());
        assert!(matches!(
            service.add_track(4, track("x", 1)),
            Err(CoreError::IndexOutOfRange { index: 4, len: 1 })
        ));

        assert!(names(&rx).is_empty());
        assert_eq!(service.shelf(), &before);
    }

    #[test]
    fn test_track_edits_emit_duration_and_selection() {
        let mut shelf = Bookshelf::new();
        shelf.add_book(Book::new("Empty").unwrap());
        let (mut service, rx) = recording_service(shelf);

        service.add_track(0, track("a", 10)).unwrap();
        let events: Vec<ShelfEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].name(), "track-added");
        assert_eq!(
            events[1],
            ShelfEvent::BookDurationChanged {
                book: 0,
                duration: Duration::from_millis(10)
            }
        );
        assert_eq!(
            events[2],
            ShelfEvent::TrackIndexChanged {
                book: 0,
                index: Some(0)
            }
        );

        service.remove_track(0, 0).unwrap();
        assert_eq!(
            names(&rx),
            vec!["track-removed", "book-duration-changed", "track-index-changed"]
        );
        assert_eq!(service.shelf().book_at(0).unwrap().selected_track_index(), None);
    }

    #[test]
    fn test_move_track_reports_order_and_selection() {
        let mut shelf = Bookshelf::new();
        shelf.add_book(book("A", &[10, 20]));
        shelf.book_at_mut(0).unwrap().set_selected_track_index(1);
        let (mut service, rx) = recording_service(shelf);

        service.move_track(0, 0, 1).unwrap();

        let events: Vec<ShelfEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        match &events[0] {
            ShelfEvent::TrackOrderChanged { book, order } => {
                assert_eq!(*book, 0);
                assert!(order[0].ends_with("A-1.mp3"));
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(
            events[1],
            ShelfEvent::TrackIndexChanged {
                book: 0,
                index: Some(0)
            }
        );
    }

    #[test]
    fn test_noop_move_emits_nothing() {
        let mut shelf = Bookshelf::new();
        shelf.add_book(book("A", &[10, 20]));
        shelf.add_book(book("B", &[10]));
        let (mut service, rx) = recording_service(shelf);

        service.move_track(0, 1, 1).unwrap();
        service.move_book(1, 1).unwrap();
        service.select_book(0).unwrap();
        service.rename_book(0, "A").unwrap();
        assert!(names(&rx).is_empty());
    }

    #[test]
    fn test_move_book_emits_selection_change() {
        let mut shelf = Bookshelf::new();
        shelf.add_book(book("A", &[1]));
        shelf.add_book(book("B", &[1]));
        let (mut service, rx) = recording_service(shelf);

        service.move_book(0, 1).unwrap();
        let events: Vec<ShelfEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                ShelfEvent::BookMoved { from: 0, to: 1 },
                ShelfEvent::BookSelected { index: Some(1) },
            ]
        );
    }

    #[test]
    fn test_swap_tracks_without_selection_change() {
        let mut shelf = Bookshelf::new();
        shelf.add_book(book("A", &[1, 2, 3]));
        shelf.book_at_mut(0).unwrap().set_selected_track_index(1);
        let (mut service, rx) = recording_service(shelf);

        service.swap_tracks(0, 0, 2).unwrap();
        assert_eq!(names(&rx), vec!["track-order-changed"]);
    }

    #[test]
    fn test_select_and_advance_tracks() {
        let mut shelf = Bookshelf::new();
        shelf.add_book(book("A", &[1, 2]));
        let (mut service, rx) = recording_service(shelf);

        assert_eq!(service.select_track(0, 1).unwrap(), Some(1));
        assert_eq!(service.next_track(0).unwrap(), None);
        assert_eq!(service.next_track(0).unwrap(), None);

        let events: Vec<ShelfEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                ShelfEvent::TrackIndexChanged {
                    book: 0,
                    index: Some(1)
                },
                ShelfEvent::TrackIndexChanged {
                    book: 0,
                    index: None
                },
            ]
        );
    }

    #[test]
    fn test_set_elapsed_time_clamps_and_emits_once() {
        let mut shelf = Bookshelf::new();
        shelf.add_book(book("A", &[100]));
        let (mut service, rx) = recording_service(shelf);

        assert_eq!(service.set_elapsed_time(0, 0, 500).unwrap().as_millis(), 100);
        assert_eq!(service.set_elapsed_time(0, 0, 100).unwrap().as_millis(), 100);

        let events: Vec<ShelfEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![ShelfEvent::ElapsedTimeChanged {
                book: 0,
                track: 0,
                elapsed: Duration::from_millis(100)
            }]
        );
    }

    #[test]
    fn test_rename_book() {
        let mut shelf = Bookshelf::new();
        shelf.add_book(book("A", &[1]));
        let (mut service, rx) = recording_service(shelf);

        service.rename_book(0, "Dune").unwrap();
        assert_eq!(service.shelf().book_at(0).unwrap().title(), "Dune");
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec![ShelfEvent::BookTitleChanged {
                book: 0,
                title: "Dune".to_string()
            }]
        );
    }

    #[test]
    fn test_import_book_reports_skipped() {
        let (mut service, rx) = recording_service(Bookshelf::new());
        let source = vec![
            TrackInfo::new("/dune/01.mp3", Duration::from_seconds(60), "Part 1"),
            TrackInfo::new("/dune/02.mp3", Duration::ZERO, "Broken"),
            TrackInfo::new("/dune/03.mp3", Duration::from_seconds(30), "Part 3"),
        ];

        let report = service.import_book("Dune", &source).unwrap();
        assert_eq!(report.book, 0);
        assert_eq!(report.added, 2);
        assert!(!report.is_complete());
        assert_eq!(report.skipped.len(), 1);

        let imported = service.shelf().book_at(0).unwrap();
        assert_eq!(imported.duration(), Duration::from_seconds(90));
        assert_eq!(imported.selected_track_index(), Some(0));
        assert_eq!(names(&rx), vec!["book-added", "book-selected"]);
    }

    #[test]
    fn test_import_rejects_blank_title() {
        let mut service = ShelfService::default();
        let source: Vec<TrackInfo> = Vec::new();
        assert!(service.import_book("", &source).is_err());
        assert!(service.shelf().is_empty());
    }

    #[test]
    fn test_into_shelf_returns_state() {
        let mut service = ShelfService::new(Bookshelf::new());
        service.add_book(book("A", &[1]));
        let shelf = service.into_shelf();
        assert_eq!(shelf.len(), 1);
    }
}
