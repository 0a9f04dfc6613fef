//! # Tree Serializer
//!
//! Walks a directory depth-first and writes its records to a byte sink:
//!
//! ```text
//! START_OF_TRANSMISSION(0)
//!   START_OF_DIRECTORY(1)
//!     DIRECTORY_ENTRY(1) [FILE_DATA(1)]            -- regular file
//!     DIRECTORY_ENTRY(1) START_OF_DIRECTORY(2) ... END_OF_DIRECTORY(2)
//!   END_OF_DIRECTORY(1)
//! END_OF_TRANSMISSION(0)
//! ```
//!
//! Entries are visited in file-name order, so the same tree always produces
//! the same bytes.

use crate::common::EntryKind;
use crate::error::{Result, TransplantError};
use crate::fsx;
use crate::path_builder::PathBuilder;
use crate::record::{EntryFields, RecordHeader, RecordType};
use crate::stats::TransferStats;
use std::io::{self, Read, Write};
use tracing::{debug, warn};

pub struct Serializer<W: Write> {
    out: W,
    stats: TransferStats,
}

impl<W: Write> Serializer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            stats: TransferStats::default(),
        }
    }

    pub fn stats(&self) -> TransferStats {
        self.stats
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Serializes the contents of the directory named by `path`, bracketed by
    /// the transmission records. The directory itself is not recorded.
    pub fn serialize(&mut self, path: &mut PathBuilder) -> Result<TransferStats> {
        fsx::require_dir(path.as_path())?;
        RecordHeader::bracket(RecordType::StartOfTransmission, 0).write_to(&mut self.out)?;
        self.serialize_directory(path, 1)?;
        RecordHeader::bracket(RecordType::EndOfTransmission, 0).write_to(&mut self.out)?;
        self.out.flush()?;
        Ok(self.stats)
    }

    /// Emits the records for the directory named by `path`, recursing into
    /// subdirectories at `depth + 1`.
    pub fn serialize_directory(&mut self, path: &mut PathBuilder, depth: u32) -> Result<()> {
        RecordHeader::bracket(RecordType::StartOfDirectory, depth).write_to(&mut self.out)?;

        for name in fsx::list_dir(path.as_path())? {
            let mut child = path.enter(&name)?;
            let meta = fsx::lstat(child.as_path())?;
            let mode = fsx::mode(&meta);

            let kind = EntryKind::from_mode(mode);
            let file_size = match kind {
                EntryKind::File => meta.len(),
                EntryKind::Directory => 0,
                EntryKind::Other => {
                    warn!(path = %child.as_path().display(), mode = %format!("{mode:o}"), "skipping unsupported entry");
                    self.stats.record_skipped();
                    continue;
                }
            };

            debug!(path = %child.as_path().display(), depth, kind = kind.label(), size = file_size, "entry");
            RecordHeader::entry(depth, name.len()).write_to(&mut self.out)?;
            EntryFields { mode, file_size }.write_to(&mut self.out)?;
            self.out.write_all(&name)?;

            match kind {
                EntryKind::File => self.serialize_file(&child, depth, file_size)?,
                EntryKind::Directory => {
                    self.serialize_directory(&mut child, depth + 1)?;
                    self.stats.record_directory();
                }
                EntryKind::Other => {
                    return Err(TransplantError::UnsupportedEntryType {
                        path: child.as_path().to_path_buf(),
                        mode,
                    })
                }
            }
        }

        RecordHeader::bracket(RecordType::EndOfDirectory, depth).write_to(&mut self.out)?;
        Ok(())
    }

    /// Emits one `FILE_DATA` record holding exactly `size` bytes of the file
    /// named by `path`.
    pub fn serialize_file(&mut self, path: &PathBuilder, depth: u32, size: u64) -> Result<()> {
        let file = fsx::open_file(path.as_path())?;
        RecordHeader::file_data(depth, size).write_to(&mut self.out)?;

        let copied = io::copy(&mut file.take(size), &mut self.out)?;
        if copied != size {
            return Err(TransplantError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "'{}' shrank while being read: expected {size} bytes, got {copied}",
                    path.as_path().display()
                ),
            )));
        }
        self.stats.record_file(size);
        Ok(())
    }
}

/// Serializes the tree under `root` into `out`.
pub fn serialize<W: Write>(root: &mut PathBuilder, out: W) -> Result<TransferStats> {
    Serializer::new(out).serialize(root)
}
