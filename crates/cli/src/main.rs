use anyhow::{Context, Result};
use audioshelf_config::ConfigManager;
use audioshelf_store::ShelfStore;
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

mod commands;

use commands::Session;

fn book_arg() -> Arg {
    Arg::new("book")
        .required(true)
        .value_name("BOOK")
        .help("Book position (1-based) or exact title")
}

fn position_arg(name: &'static str, value_name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .required(true)
        .value_name(value_name)
        .help(help)
        .value_parser(commands::parse_position)
}

fn build_cli() -> Command {
    Command::new("audioshelf")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Keep track of where you are in your audiobooks")
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("shelf")
                .short('s')
                .long("shelf")
                .value_name("FILE")
                .help("Shelf file to use instead of the configured one")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(Command::new("list").about("List the books on the shelf"))
        .subcommand(
            Command::new("show")
                .about("Show the tracks of a book")
                .arg(book_arg()),
        )
        .subcommand(
            Command::new("add-book")
                .about("Add a book, optionally with its tracks")
                .arg(Arg::new("title").required(true).value_name("TITLE").help("Book title"))
                .arg(
                    Arg::new("tracks")
                        .value_name("PATH=MILLIS")
                        .help("Tracks in play order, each a file path and its length in milliseconds")
                        .num_args(1..)
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("remove-book")
                .about("Remove a book from the shelf")
                .arg(book_arg()),
        )
        .subcommand(
            Command::new("move-book")
                .about("Move a book to another position")
                .arg(book_arg())
                .arg(position_arg("to", "TO", "New position (1-based)")),
        )
        .subcommand(
            Command::new("select-book")
                .about("Make a book the current one")
                .arg(book_arg()),
        )
        .subcommand(
            Command::new("rename-book")
                .about("Change the title of a book")
                .arg(book_arg())
                .arg(Arg::new("title").required(true).value_name("TITLE").help("New title")),
        )
        .subcommand(
            Command::new("add-track")
                .about("Append a track to a book")
                .arg(book_arg())
                .arg(
                    Arg::new("track")
                        .required(true)
                        .value_name("PATH=MILLIS")
                        .help("File path and length in milliseconds"),
                ),
        )
        .subcommand(
            Command::new("remove-track")
                .about("Remove a track from a book")
                .arg(book_arg())
                .arg(position_arg("track", "TRACK", "Track position (1-based)")),
        )
        .subcommand(
            Command::new("move-track")
                .about("Move a track to another position")
                .arg(book_arg())
                .arg(position_arg("from", "FROM", "Current position (1-based)"))
                .arg(position_arg("to", "TO", "New position (1-based)")),
        )
        .subcommand(
            Command::new("swap-tracks")
                .about("Exchange two tracks; FIRST must come before SECOND")
                .arg(book_arg())
                .arg(position_arg("first", "FIRST", "Earlier position (1-based)"))
                .arg(position_arg("second", "SECOND", "Later position (1-based)")),
        )
        .subcommand(
            Command::new("select-track")
                .about("Make a track the current one; one past the last marks the book finished")
                .arg(book_arg())
                .arg(position_arg("track", "TRACK", "Track position (1-based)")),
        )
        .subcommand(
            Command::new("progress")
                .about("Record how far into the current track you are")
                .arg(book_arg())
                .arg(
                    Arg::new("millis")
                        .required(true)
                        .value_name("MILLIS")
                        .help("Elapsed time of the current track in milliseconds")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64)),
                ),
        )
        .subcommand(
            Command::new("resume")
                .about("Show where playback of a book would resume")
                .arg(book_arg()),
        )
}

fn dispatch(session: &mut Session, name: &str, matches: &clap::ArgMatches) -> Result<()> {
    match name {
        "list" => commands::list_books(session),
        "show" => commands::show_book(session, matches),
        "add-book" => commands::add_book(session, matches),
        "remove-book" => commands::remove_book(session, matches),
        "move-book" => commands::move_book(session, matches),
        "select-book" => commands::select_book(session, matches),
        "rename-book" => commands::rename_book(session, matches),
        "add-track" => commands::add_track(session, matches),
        "remove-track" => commands::remove_track(session, matches),
        "move-track" => commands::move_track(session, matches),
        "swap-tracks" => commands::swap_tracks(session, matches),
        "select-track" => commands::select_track(session, matches),
        "progress" => commands::record_progress(session, matches),
        "resume" => commands::resume_point(session, matches),
        other => anyhow::bail!("Unknown command: {}", other),
    }
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let manager = match matches.get_one::<PathBuf>("config-dir") {
        Some(dir) => ConfigManager::with_directory(dir.clone()),
        None => ConfigManager::new(),
    }
    .context("Failed to locate config directory")?;
    let config = manager
        .load_with_env_overrides()
        .context("Failed to load config")?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.log_level.to_string()),
    )
    .init();

    let Some((name, sub_matches)) = matches.subcommand() else {
        build_cli().print_help()?;
        return Ok(());
    };

    let shelf_path = matches
        .get_one::<PathBuf>("shelf")
        .cloned()
        .unwrap_or_else(|| manager.shelf_path(&config));
    let store = ShelfStore::new(shelf_path).with_backup(config.app.backup_on_save);
    let shelf = store
        .load()
        .with_context(|| format!("Failed to load shelf from {}", store.path().display()))?;

    let mut session = Session::new(shelf, config.playback);
    let result = dispatch(&mut session, name, sub_matches);

    // Keep whatever succeeded before a failing step
    if session.flush_events() > 0 {
        store
            .save(session.shelf())
            .with_context(|| format!("Failed to save shelf to {}", store.path().display()))?;
    }

    result
}
