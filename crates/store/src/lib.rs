//! Audioshelf store
//!
//! Keeps a [`Bookshelf`] in a single pretty-printed JSON file. Saves are
//! atomic: the document is written to a temporary file next to the target
//! and renamed over it, optionally after copying the previous file to
//! `<name>.backup`.
//!
//! Loading goes through the model's own validation, so a file whose cursors
//! or durations are inconsistent is reported as a parse error rather than
//! producing a shelf that breaks its invariants.

mod error;

pub use error::{StoreError, StoreResult};

use audioshelf_core::Bookshelf;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A shelf file on disk
#[derive(Debug, Clone)]
pub struct ShelfStore {
    path: PathBuf,
    backup: bool,
}

impl ShelfStore {
    /// Creates a store for the file at `path`
    ///
    /// Backups are on by default.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup: true,
        }
    }

    /// Enables or disables the `.backup` copy made before each save
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    /// Path of the shelf file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path the previous file is copied to before a save
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".backup");
        self.path.with_file_name(name)
    }

    /// Whether the shelf file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the shelf
    ///
    /// A missing file is an empty shelf. An empty or whitespace-only file is
    /// an error, since it usually means a previous write was interrupted
    /// outside this store.
    pub fn load(&self) -> StoreResult<Bookshelf> {
        if !self.path.exists() {
            log::info!(
                "Shelf file not found at {}, starting with an empty shelf",
                self.path.display()
            );
            return Ok(Bookshelf::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| StoreError::Read {
            path: self.path.clone(),
            source: e,
        })?;

        if contents.trim().is_empty() {
            return Err(StoreError::Read {
                path: self.path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "Shelf file is empty or contains only whitespace",
                ),
            });
        }

        let shelf: Bookshelf =
            serde_json::from_str(&contents).map_err(|e| StoreError::Parse {
                path: self.path.clone(),
                source: e,
            })?;

        log::debug!(
            "Loaded {} book(s) from {}",
            shelf.len(),
            self.path.display()
        );
        Ok(shelf)
    }

    /// Writes the shelf atomically
    pub fn save(&self, shelf: &Bookshelf) -> StoreResult<()> {
        let dir = self.parent_dir()?;
        ensure_directory_exists(dir)?;

        if self.backup && self.path.exists() {
            self.backup_file()?;
        }

        let json = serde_json::to_string_pretty(shelf).map_err(StoreError::Serialize)?;

        let mut temp_file = NamedTempFile::new_in(dir)?;
        temp_file.write_all(json.as_bytes())?;
        temp_file.write_all(b"\n")?;
        temp_file.flush()?;
        temp_file
            .persist(&self.path)
            .map_err(|e| StoreError::Write {
                path: self.path.clone(),
                source: e.error,
            })?;

        log::info!(
            "Saved {} book(s) to {}",
            shelf.len(),
            self.path.display()
        );
        Ok(())
    }

    fn parent_dir(&self) -> StoreResult<&Path> {
        if self.path.file_name().is_none() {
            return Err(StoreError::PathResolution {
                path: self.path.clone(),
                reason: "path does not name a file".to_string(),
            });
        }

        match self.path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => Ok(Path::new(".")),
            Some(parent) => Ok(parent),
            None => Err(StoreError::PathResolution {
                path: self.path.clone(),
                reason: "path has no parent directory".to_string(),
            }),
        }
    }

    fn backup_file(&self) -> StoreResult<()> {
        let backup_path = self.backup_path();
        fs::copy(&self.path, &backup_path).map_err(|e| StoreError::Backup {
            path: backup_path.clone(),
            source: e,
        })?;
        log::debug!("Backed up shelf to {}", backup_path.display());
        Ok(())
    }
}

fn ensure_directory_exists(path: &Path) -> StoreResult<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| StoreError::DirectoryCreation {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::info!("Created shelf directory: {}", path.display());
    }
    Ok(())
}
