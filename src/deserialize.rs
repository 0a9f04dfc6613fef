//! # Tree Deserializer
//!
//! Consumes a record stream and rebuilds the tree under a destination
//! directory. Each directory is parsed as
//!
//! ```text
//! EXPECT_START -> READ_ENTRY_OR_END <-> (DIRECTORY_ENTRY: recurse) -> END -> DONE
//! ```
//!
//! Any header with the wrong magic, type or depth aborts the whole run; the
//! stream is never resynchronized and entries created before the failure are
//! left in place.

use crate::common::EntryKind;
use crate::error::{Result, TransplantError};
use crate::fsx;
use crate::name::{validate_entry_name, NameBuf};
use crate::path_builder::PathBuilder;
use crate::record::{read_header, EntryFields, RecordType};
use crate::stats::TransferStats;
use std::io::{self, Read, Write};
use tracing::debug;

/// Deepest directory nesting accepted from a stream by default.
pub const DEFAULT_MAX_DEPTH: u32 = 1024;

#[derive(Debug, Clone, Copy)]
pub struct DeserializeOptions {
    /// Overwrite entries that already exist at the destination.
    pub clobber: bool,
    pub max_depth: u32,
}

impl Default for DeserializeOptions {
    fn default() -> Self {
        Self {
            clobber: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

pub struct Deserializer<R: Read> {
    input: R,
    name: NameBuf,
    options: DeserializeOptions,
    stats: TransferStats,
}

impl<R: Read> Deserializer<R> {
    pub fn new(input: R, options: DeserializeOptions) -> Self {
        Self {
            input,
            name: NameBuf::new(),
            options,
            stats: TransferStats::default(),
        }
    }

    pub fn stats(&self) -> TransferStats {
        self.stats
    }

    /// Reads a whole transmission and recreates its tree inside the directory
    /// named by `path`, creating that directory if needed.
    pub fn deserialize(&mut self, path: &mut PathBuilder) -> Result<TransferStats> {
        read_header(&mut self.input)?.expect(RecordType::StartOfTransmission, 0)?;
        self.deserialize_directory(path, 1)?;
        read_header(&mut self.input)?.expect(RecordType::EndOfTransmission, 0)?;
        Ok(self.stats)
    }

    /// Creates the directory named by `path` and fills it from the records of
    /// one `START_OF_DIRECTORY`..`END_OF_DIRECTORY` block at `depth`. Only the
    /// destination root (depth 1) may be a symbolic link to a directory.
    pub fn deserialize_directory(&mut self, path: &mut PathBuilder, depth: u32) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(TransplantError::corrupt(format!(
                "directory nesting exceeds the limit of {}",
                self.options.max_depth
            )));
        }
        if depth == 1 {
            fsx::create_root_dir(path.as_path())?;
        } else {
            fsx::create_dir(path.as_path())?;
        }
        read_header(&mut self.input)?.expect(RecordType::StartOfDirectory, depth)?;

        loop {
            let header = read_header(&mut self.input)?;
            if header.kind != RecordType::DirectoryEntry {
                header.expect(RecordType::EndOfDirectory, depth)?;
                return Ok(());
            }
            let header = header.expect(RecordType::DirectoryEntry, depth)?;

            let fields = EntryFields::read_from(&mut self.input)?;
            self.name.read_from(&mut self.input, header.name_len())?;
            validate_entry_name(self.name.as_bytes())?;

            let mut child = path.enter(self.name.as_bytes())?;
            debug!(path = %child.as_path().display(), depth, mode = %format!("{:o}", fields.mode), "entry");

            if fsx::exists(child.as_path()) {
                if !self.options.clobber {
                    return Err(TransplantError::AlreadyExists(child.as_path().to_path_buf()));
                }
                // Clobbering replaces a link itself, never what it points to.
                if fsx::remove_symlink(child.as_path())? {
                    debug!(path = %child.as_path().display(), "removed symbolic link");
                }
            }

            match EntryKind::from_mode(fields.mode) {
                EntryKind::File => {
                    self.deserialize_file(&child, depth, fields.file_size)?;
                }
                EntryKind::Directory => {
                    self.deserialize_directory(&mut child, depth + 1)?;
                    self.stats.record_directory();
                }
                EntryKind::Other => {
                    return Err(TransplantError::UnsupportedEntryType {
                        path: child.as_path().to_path_buf(),
                        mode: fields.mode,
                    });
                }
            }
            fsx::set_unix_permissions(child.as_path(), fields.mode)?;
        }
    }

    /// Reads one `FILE_DATA` record at `depth` into the file named by `path`,
    /// creating or truncating it. `expected_len` is the size announced by the
    /// preceding directory entry.
    pub fn deserialize_file(&mut self, path: &PathBuilder, depth: u32, expected_len: u64) -> Result<()> {
        let header = read_header(&mut self.input)?.expect(RecordType::FileData, depth)?;
        let len = header.payload_len();
        if len != expected_len {
            return Err(TransplantError::corrupt(format!(
                "file data for '{}' holds {len} bytes but its entry announced {expected_len}",
                path.as_path().display()
            )));
        }

        let mut file = fsx::create_file(path.as_path())?;
        let copied = io::copy(&mut (&mut self.input).take(len), &mut file)?;
        if copied != len {
            return Err(TransplantError::corrupt(format!(
                "unexpected end of stream in file data for '{}' ({copied} of {len} bytes)",
                path.as_path().display()
            )));
        }
        file.flush()?;
        self.stats.record_file(len);
        Ok(())
    }
}

/// Rebuilds the tree carried by `input` under `root`.
pub fn deserialize<R: Read>(
    root: &mut PathBuilder,
    input: R,
    options: DeserializeOptions,
) -> Result<TransferStats> {
    Deserializer::new(input, options).deserialize(root)
}
