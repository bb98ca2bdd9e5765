use anyhow::{anyhow, bail, Context, Result};
use audioshelf_config::PlaybackConfig;
use audioshelf_core::{
    Book, Bookshelf, CoreError, Duration, ShelfEvent, ShelfService, Track, TrackInfo,
};
use clap::ArgMatches;
use console::style;
use crossbeam_channel::Receiver;
use std::path::PathBuf;


/// The shelf being worked on plus the settings that shape a command
pub struct Session {
    service: ShelfService,
    events: Receiver<ShelfEvent>,
    playback: PlaybackConfig,
}

impl Session {
    pub fn new(shelf: Bookshelf, playback: PlaybackConfig) -> Self {
        let mut service = ShelfService::new(shelf);
        let (_, events) = service.events().subscribe_channel();
        Self {
            service,
            events,
            playback,
        }
    }

    pub fn shelf(&self) -> &Bookshelf {
        self.service.shelf()
    }

    /// Logs and discards the events raised so far, returning how many there were
    pub fn flush_events(&self) -> usize {
        self.events
            .try_iter()
            .inspect(|event| log::debug!("{}: {:?}", event.name(), event))
            .count()
    }
}

/// Parses a 1-based position from the command line into an index
pub fn parse_position(s: &str) -> std::result::Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("positions start at 1".to_string()),
        Ok(n) => Ok(n - 1),
        Err(_) => Err(format!("'{}' is not a position", s)),
    }
}

/// Parses `PATH=MILLIS` into a track candidate
///
/// The split is on the last `=`, so paths may contain `=` themselves.
pub fn parse_track_spec(spec: &str) -> Result<TrackInfo> {
    let (path, millis) = spec
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("Expected PATH=MILLIS, got '{}'", spec))?;
    let millis: u64 = millis
        .trim()
        .parse()
        .with_context(|| format!("Invalid length in '{}'", spec))?;

    let path = PathBuf::from(path);
    let title = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(TrackInfo::new(path, Duration::from_millis(millis), title))
}

/// Turns a model error into one whose top line is fit for the terminal
fn friendly(err: CoreError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

fn required<'a, T>(matches: &'a ArgMatches, name: &str) -> Result<&'a T>
where
    T: Clone + Send + Sync + 'static,
{
    matches
        .get_one::<T>(name)
        .ok_or_else(|| anyhow!("Missing argument: {}", name))
}

/// Resolves a BOOK argument: an exact title, otherwise a 1-based position
fn resolve_book(shelf: &Bookshelf, matches: &ArgMatches) -> Result<usize> {
    let arg = required::<String>(matches, "book")?;

    if let Some(index) = shelf.position_of(arg) {
        return Ok(index);
    }

    match arg.trim().parse::<usize>() {
        Ok(0) => bail!("Book positions start at 1"),
        Ok(position) => {
            let index = position - 1;
            shelf.book_at(index).map_err(friendly)?;
            Ok(index)
        }
        Err(_) => bail!("No book titled '{}'", arg),
    }
}

fn done(message: impl std::fmt::Display) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// List all books on the shelf
pub fn list_books(session: &Session) -> Result<()> {
    let shelf = session.shelf();

    if shelf.is_empty() {
        println!("No books on the shelf. Use 'add-book' to add one.");
        return Ok(());
    }

    println!("\n{} Books on the Shelf", style(shelf.len()).bold().cyan());
    println!("{}", "=".repeat(60));

    for (index, book) in shelf.books().iter().enumerate() {
        let current = shelf.selected_book_index() == Some(index);
        print_book_summary(index, book, current);
    }

    println!("\nTotal: {}", format_duration(shelf.total_duration()));
    Ok(())
}

/// Show every track of a book
pub fn show_book(session: &Session, matches: &ArgMatches) -> Result<()> {
    let shelf = session.shelf();
    let index = resolve_book(shelf, matches)?;
    let book = shelf.book_at(index).map_err(friendly)?;

    println!("\n{}", style(book.title()).bold().cyan());
    println!("{}", "=".repeat(60));
    println!("Duration: {}", book.duration());
    match book.book_elapsed_time() {
        Ok(elapsed) => println!("Listened: {} ({})", elapsed, format_percent(book.progress())),
        Err(_) if book.is_empty() => println!("No tracks yet."),
        Err(_) => println!("Finished."),
    }

    if !book.is_empty() {
        println!();
    }
    for (position, track) in book.tracks().iter().enumerate() {
        let current = book.selected_track_index() == Some(position);
        print_track_line(position, track, current);
    }

    Ok(())
}

/// Add a book, with any tracks given as PATH=MILLIS
pub fn add_book(session: &mut Session, matches: &ArgMatches) -> Result<()> {
    let title = required::<String>(matches, "title")?;
    let specs: Vec<TrackInfo> = matches
        .get_many::<String>("tracks")
        .into_iter()
        .flatten()
        .map(|spec| parse_track_spec(spec))
        .collect::<Result<_>>()?;

    let report = session
        .service
        .import_book(title.as_str(), &specs)
        .map_err(friendly)?;

    done(format!(
        "Added '{}' at position {} with {} track(s)",
        title,
        report.book + 1,
        report.added
    ));
    for skipped in &report.skipped {
        println!(
            "  {} skipped {}: {}",
            style("!").yellow().bold(),
            skipped.path.display(),
            skipped.error.user_message()
        );
    }

    Ok(())
}

/// Remove a book from the shelf
pub fn remove_book(session: &mut Session, matches: &ArgMatches) -> Result<()> {
    let index = resolve_book(session.shelf(), matches)?;
    let book = session.service.remove_book(index).map_err(friendly)?;
    done(format!("Removed '{}'", book.title()));
    Ok(())
}

/// Move a book to another position
pub fn move_book(session: &mut Session, matches: &ArgMatches) -> Result<()> {
    let from = resolve_book(session.shelf(), matches)?;
    let to = *required::<usize>(matches, "to")?;
    session.service.move_book(from, to).map_err(friendly)?;
    done(format!("Moved book {} to position {}", from + 1, to + 1));
    Ok(())
}

/// Make a book the current one
pub fn select_book(session: &mut Session, matches: &ArgMatches) -> Result<()> {
    let index = resolve_book(session.shelf(), matches)?;
    session.service.select_book(index).map_err(friendly)?;
    let book = session.shelf().book_at(index).map_err(friendly)?;
    done(format!("Now reading '{}'", book.title()));
    Ok(())
}

/// Change the title of a book
pub fn rename_book(session: &mut Session, matches: &ArgMatches) -> Result<()> {
    let index = resolve_book(session.shelf(), matches)?;
    let title = required::<String>(matches, "title")?;
    session
        .service
        .rename_book(index, title.as_str())
        .map_err(friendly)?;
    done(format!("Renamed book {} to '{}'", index + 1, title));
    Ok(())
}

/// Append a track to a book
pub fn add_track(session: &mut Session, matches: &ArgMatches) -> Result<()> {
    let book = resolve_book(session.shelf(), matches)?;
    let info = parse_track_spec(required::<String>(matches, "track")?)?;
    let track = info.to_track().map_err(friendly)?;
    let position = session.service.add_track(book, track).map_err(friendly)?;
    done(format!("Added '{}' as track {}", info.title, position + 1));
    Ok(())
}

/// Remove a track from a book
pub fn remove_track(session: &mut Session, matches: &ArgMatches) -> Result<()> {
    let book = resolve_book(session.shelf(), matches)?;
    let index = *required::<usize>(matches, "track")?;
    let track = session
        .service
        .remove_track(book, index)
        .map_err(friendly)?;
    done(format!("Removed track '{}'", track.title()));
    Ok(())
}

/// Move a track within its book
pub fn move_track(session: &mut Session, matches: &ArgMatches) -> Result<()> {
    let book = resolve_book(session.shelf(), matches)?;
    let from = *required::<usize>(matches, "from")?;
    let to = *required::<usize>(matches, "to")?;
    session
        .service
        .move_track(book, from, to)
        .map_err(friendly)?;
    done(format!("Moved track {} to position {}", from + 1, to + 1));
    Ok(())
}

/// Exchange two tracks of a book
pub fn swap_tracks(session: &mut Session, matches: &ArgMatches) -> Result<()> {
    let book = resolve_book(session.shelf(), matches)?;
    let first = *required::<usize>(matches, "first")?;
    let second = *required::<usize>(matches, "second")?;
    if first >= second {
        bail!("FIRST must come before SECOND");
    }
    session
        .service
        .swap_tracks(book, first, second)
        .map_err(friendly)?;
    done(format!("Swapped tracks {} and {}", first + 1, second + 1));
    Ok(())
}

/// Make a track the current one
pub fn select_track(session: &mut Session, matches: &ArgMatches) -> Result<()> {
    let book = resolve_book(session.shelf(), matches)?;
    let index = *required::<usize>(matches, "track")?;
    match session
        .service
        .select_track(book, index)
        .map_err(friendly)?
    {
        Some(selected) => done(format!("Now on track {}", selected + 1)),
        None => done("Book marked as finished"),
    }
    Ok(())
}

/// Record progress through the current track
///
/// Progress within `completion_threshold_ms` of the end finishes the track,
/// and with `auto_advance` the next track becomes current.
pub fn record_progress(session: &mut Session, matches: &ArgMatches) -> Result<()> {
    let book = resolve_book(session.shelf(), matches)?;
    let millis = *required::<i64>(matches, "millis")?;

    let (track, duration) = {
        let current = session.shelf().book_at(book).map_err(friendly)?;
        let track = current.selected_track_index().ok_or_else(|| {
            anyhow!("'{}' is finished; select a track first", current.title())
        })?;
        (track, current.tracks()[track].duration())
    };

    let mut elapsed = session
        .service
        .set_elapsed_time(book, track, millis)
        .map_err(|e| match e {
            CoreError::InvalidArgument { .. } => anyhow!("Elapsed time cannot be negative"),
            other => friendly(other),
        })?;

    if elapsed < duration
        && session
            .playback
            .is_complete(elapsed.as_millis(), duration.as_millis())
    {
        let full = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        elapsed = session
            .service
            .set_elapsed_time(book, track, full)
            .map_err(friendly)?;
    }

    done(format!("Track {} at {} of {}", track + 1, elapsed, duration));

    if elapsed == duration && session.playback.auto_advance {
        match session.service.next_track(book).map_err(friendly)? {
            Some(next) => done(format!("Advanced to track {}", next + 1)),
            None => done("Book finished"),
        }
    }

    Ok(())
}

/// Print where playback of a book resumes
pub fn resume_point(session: &Session, matches: &ArgMatches) -> Result<()> {
    let shelf = session.shelf();
    let book = shelf
        .book_at(resolve_book(shelf, matches)?)
        .map_err(friendly)?;

    let Some(index) = book.selected_track_index() else {
        println!("'{}' is finished.", book.title());
        return Ok(());
    };
    let track = book.track(index).map_err(friendly)?;
    let resume = Duration::from_millis(
        session
            .playback
            .resume_position_ms(track.elapsed().as_millis()),
    );

    println!("{}", style(book.title()).bold());
    println!(
        "  Track {} of {}: {}",
        index + 1,
        book.len(),
        track.title()
    );
    println!("  Resume at {} (saved {})", resume, track.elapsed());
    Ok(())
}

fn print_book_summary(index: usize, book: &Book, current: bool) {
    let marker = if current {
        style("▶").green().bold().to_string()
    } else {
        " ".to_string()
    };
    println!(
        "{} {:>3}. {}  ({} tracks, {}, {})",
        marker,
        index + 1,
        style(truncate(book.title(), 40)).bold(),
        book.len(),
        book.duration(),
        format_percent(book.progress())
    );
}

fn print_track_line(index: usize, track: &Track, current: bool) {
    let marker = if current {
        style("▶").green().bold().to_string()
    } else {
        " ".to_string()
    };
    println!(
        "{} {:>3}. {}  {} / {}",
        marker,
        index + 1,
        truncate(&track.title(), 40),
        track.elapsed(),
        track.duration()
    );
}

fn format_duration(duration: Duration) -> String {
    let seconds = duration.as_seconds();
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

fn format_percent(fraction: f64) -> String {
    format!("{:.0}%", (fraction * 100.0).floor())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}
