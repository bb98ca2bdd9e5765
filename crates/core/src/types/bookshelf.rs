//! Bookshelf domain model

use crate::error::{CoreError, CoreResult};
use crate::types::{cursor, Book, Duration};
use serde::{Deserialize, Serialize};

/// The user's ordered collection of books and the currently selected one
///
/// A non-empty shelf always has a selected book; the first book added is
/// selected automatically and only removing the last book clears the
/// selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BookshelfRecord")]
pub struct Bookshelf {
    books: Vec<Book>,
    selected: Option<usize>,
}

/// Unvalidated wire shape of a bookshelf
#[derive(Deserialize)]
struct BookshelfRecord {
    #[serde(default)]
    books: Vec<Book>,
    #[serde(default)]
    selected: Option<usize>,
}

impl TryFrom<BookshelfRecord> for Bookshelf {
    type Error = CoreError;

    fn try_from(record: BookshelfRecord) -> CoreResult<Self> {
        let len = record.books.len();
        let selected = match (record.selected, len) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(index), len) if index >= len => {
                return Err(CoreError::out_of_range(index, len));
            }
            (selected, _) => selected,
        };

        Ok(Self {
            books: record.books,
            selected,
        })
    }
}

impl Bookshelf {
    /// Creates an empty shelf
    pub fn new() -> Self {
        Self::default()
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Sum of every book's duration
    pub fn total_duration(&self) -> Duration {
        self.books.iter().map(Book::duration).sum()
    }

    /// Index of the first book with the given title
    pub fn position_of(&self, title: &str) -> Option<usize> {
        self.books.iter().position(|book| book.title() == title)
    }

    pub fn selected_book_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_book(&self) -> CoreResult<&Book> {
        self.selected
            .and_then(|index| self.books.get(index))
            .ok_or(CoreError::NoSelection { what: "book" })
    }

    pub fn selected_book_mut(&mut self) -> CoreResult<&mut Book> {
        self.selected
            .and_then(|index| self.books.get_mut(index))
            .ok_or(CoreError::NoSelection { what: "book" })
    }

    pub fn book_at(&self, index: usize) -> CoreResult<&Book> {
        self.books
            .get(index)
            .ok_or_else(|| CoreError::out_of_range(index, self.books.len()))
    }

    pub fn book_at_mut(&mut self, index: usize) -> CoreResult<&mut Book> {
        let len = self.books.len();
        self.books
            .get_mut(index)
            .ok_or_else(|| CoreError::out_of_range(index, len))
    }

    /// Appends a book and returns its index
    pub fn add_book(&mut self, book: Book) -> usize {
        self.books.push(book);
        if self.selected.is_none() {
            self.selected = Some(0);
        }

        log::debug!("Shelf: added book {}", self.books.len() - 1);
        self.books.len() - 1
    }

    /// Removes and returns the book at `index`
    pub fn remove_book_at(&mut self, index: usize) -> CoreResult<Book> {
        if index >= self.books.len() {
            return Err(CoreError::out_of_range(index, self.books.len()));
        }

        let removed = self.books.remove(index);
        self.selected = cursor::after_remove(self.selected, index, self.books.len());

        log::debug!(
            "Shelf: removed book {} (selected {:?})",
            index,
            self.selected
        );
        Ok(removed)
    }

    /// Moves the book at `from` so that it ends up at `to`
    pub fn move_book(&mut self, from: usize, to: usize) -> CoreResult<()> {
        let len = self.books.len();
        if from >= len {
            return Err(CoreError::out_of_range(from, len));
        }
        if to >= len {
            return Err(CoreError::out_of_range(to, len));
        }
        if from == to {
            return Ok(());
        }

        let book = self.books.remove(from);
        self.books.insert(to, book);
        self.selected = cursor::after_move(self.selected, from, to);

        log::debug!(
            "Shelf: moved book {} -> {} (selected {:?})",
            from,
            to,
            self.selected
        );
        Ok(())
    }

    /// Selects the book at `index`; out-of-range indices keep the old selection
    pub fn set_selected_book_index(&mut self, index: usize) -> CoreResult<()> {
        if index >= self.books.len() {
            return Err(CoreError::out_of_range(index, self.books.len()));
        }
        self.selected = Some(index);
        Ok(())
    }
}
