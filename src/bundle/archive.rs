//! Scoped zip writer
//!
//! Wraps a [`ZipWriter`] over a freshly created file. Entries are flat
//! (no directories), stored uncompressed, and stamped with the source
//! file's modification time.
//!
//! If a `ProjectArchive` is dropped without [`ProjectArchive::finish`],
//! the inner writer finalizes itself on drop and the file handle is closed.
//! A partially written archive is left on disk.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Datelike, Local, Timelike};
use log::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime as ZipDateTime, ZipWriter};

use crate::error::{FlpZipError, Result};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// An archive being written.
pub struct ProjectArchive {
    path: PathBuf,
    writer: ZipWriter<File>,
    entries: BTreeSet<String>,
    order: Vec<String>,
}

impl ProjectArchive {
    /// Create (or truncate) the archive at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| FlpZipError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!("opened archive {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            writer: ZipWriter::new(file),
            entries: BTreeSet::new(),
            order: Vec::new(),
        })
    }

    /// Path of the archive on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether an entry with this name was already written.
    pub fn contains(&self, entry_name: &str) -> bool {
        self.entries.contains(entry_name)
    }

    /// Copy the file at `source` into a new entry named `entry_name`.
    ///
    /// Only regular files are accepted. Read failures name `source`, write
    /// failures name the archive.
    pub fn add_file(&mut self, source: &Path, entry_name: &str) -> Result<()> {
        let read_error = |e: io::Error| FlpZipError::FileReadError {
            path: source.to_path_buf(),
            source: e,
        };

        let metadata = fs::metadata(source).map_err(read_error)?;
        if !metadata.is_file() {
            return Err(read_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }
        let mut input = File::open(source).map_err(read_error)?;

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(zip_timestamp(metadata.modified().ok()))
            .large_file(metadata.len() >= u32::MAX as u64);

        self.writer
            .start_file(entry_name, options)
            .map_err(|e| self.archive_error(e))?;

        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        loop {
            let n = match input.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(read_error(e)),
            };
            self.writer
                .write_all(&buf[..n])
                .map_err(|e| FlpZipError::FileWriteError {
                    path: self.path.clone(),
                    source: e,
                })?;
        }

        debug!("added {} as {}", source.display(), entry_name);
        self.entries.insert(entry_name.to_string());
        self.order.push(entry_name.to_string());
        Ok(())
    }

    /// Write the central directory and close the file.
    ///
    /// Returns the entry names in the order they were written.
    pub fn finish(self) -> Result<Vec<String>> {
        let ProjectArchive {
            path,
            writer,
            order,
            ..
        } = self;
        writer.finish().map_err(|e| FlpZipError::Archive {
            path: path.clone(),
            source: e,
        })?;
        debug!("finished archive {} ({} entries)", path.display(), order.len());
        Ok(order)
    }

    fn archive_error(&self, source: zip::result::ZipError) -> FlpZipError {
        FlpZipError::Archive {
            path: self.path.clone(),
            source,
        }
    }
}

/// Convert a file modification time into a zip timestamp.
///
/// Zip stores local wall-clock time from 1980 to 2107; anything unreadable
/// or out of range becomes the zip epoch.
pub fn zip_timestamp(modified: Option<SystemTime>) -> ZipDateTime {
    modified
        .map(DateTime::<Local>::from)
        .and_then(|t| {
            let year = u16::try_from(t.year()).ok()?;
            ZipDateTime::from_date_and_time(
                year,
                t.month() as u8,
                t.day() as u8,
                t.hour() as u8,
                t.minute() as u8,
                t.second() as u8,
            )
            .ok()
        })
        .unwrap_or_default()
}
