//! # Record Codec
//!
//! Every record on the stream starts with the same 16-byte header:
//!
//! | bytes | field | encoding |
//! |-------|-------|----------|
//! | 0..3  | magic | `0C 0D ED` |
//! | 3     | type  | one of [`RecordType`] |
//! | 4..8  | depth | u32, big-endian |
//! | 8..16 | size  | u64, big-endian, *including* the header |
//!
//! A `DIRECTORY_ENTRY` header is followed by 12 bytes of [`EntryFields`]
//! (mode and file size) and the raw entry name. A `FILE_DATA` header is
//! followed by `size - 16` bytes of file content. The other four types are
//! bare brackets with `size == 16`.
//!
//! This module is the only code that touches header bytes directly.

use crate::error::{Result, TransplantError};
use std::fmt;
use std::io::{Read, Write};

pub const MAGIC: [u8; 3] = [0x0C, 0x0D, 0xED];
pub const HEADER_SIZE: u64 = 16;
/// Size of the fixed `mode` + `file_size` fields of a directory entry.
pub const ENTRY_FIELDS_SIZE: u64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordType {
    StartOfTransmission = 0,
    EndOfTransmission = 1,
    StartOfDirectory = 2,
    EndOfDirectory = 3,
    DirectoryEntry = 4,
    FileData = 5,
}

impl RecordType {
    pub fn name(self) -> &'static str {
        match self {
            RecordType::StartOfTransmission => "START_OF_TRANSMISSION",
            RecordType::EndOfTransmission => "END_OF_TRANSMISSION",
            RecordType::StartOfDirectory => "START_OF_DIRECTORY",
            RecordType::EndOfDirectory => "END_OF_DIRECTORY",
            RecordType::DirectoryEntry => "DIRECTORY_ENTRY",
            RecordType::FileData => "FILE_DATA",
        }
    }

    /// Brackets carry no payload.
    fn is_bracket(self) -> bool {
        !matches!(self, RecordType::DirectoryEntry | RecordType::FileData)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for RecordType {
    type Error = TransplantError;

    fn try_from(tag: u8) -> Result<Self> {
        Ok(match tag {
            0 => RecordType::StartOfTransmission,
            1 => RecordType::EndOfTransmission,
            2 => RecordType::StartOfDirectory,
            3 => RecordType::EndOfDirectory,
            4 => RecordType::DirectoryEntry,
            5 => RecordType::FileData,
            other => return Err(TransplantError::corrupt(format!("unknown record type {other}"))),
        })
    }
}

/// A decoded record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub kind: RecordType,
    pub depth: u32,
    /// Total record length, header included.
    pub size: u64,
}

impl RecordHeader {
    pub fn new(kind: RecordType, depth: u32, size: u64) -> Self {
        Self { kind, depth, size }
    }

    /// A payload-free bracket record (`START_*` / `END_*`).
    pub fn bracket(kind: RecordType, depth: u32) -> Self {
        Self::new(kind, depth, HEADER_SIZE)
    }

    /// Header of a `DIRECTORY_ENTRY` record for a name of `name_len` bytes.
    pub fn entry(depth: u32, name_len: usize) -> Self {
        Self::new(
            RecordType::DirectoryEntry,
            depth,
            HEADER_SIZE + ENTRY_FIELDS_SIZE + name_len as u64,
        )
    }

    /// Header of a `FILE_DATA` record carrying `content_len` bytes.
    pub fn file_data(depth: u32, content_len: u64) -> Self {
        Self::new(RecordType::FileData, depth, HEADER_SIZE + content_len)
    }

    /// Number of bytes that follow the header.
    pub fn payload_len(&self) -> u64 {
        self.size.saturating_sub(HEADER_SIZE)
    }

    /// Length of the name carried by a `DIRECTORY_ENTRY` record.
    pub fn name_len(&self) -> u64 {
        self.size.saturating_sub(HEADER_SIZE + ENTRY_FIELDS_SIZE)
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE as usize] {
        let mut buf = [0u8; HEADER_SIZE as usize];
        buf[0..3].copy_from_slice(&MAGIC);
        buf[3] = self.kind as u8;
        buf[4..8].copy_from_slice(&self.depth.to_be_bytes());
        buf[8..16].copy_from_slice(&self.size.to_be_bytes());
        buf
    }

    /// Decodes and validates a raw header.
    pub fn from_bytes(bytes: [u8; HEADER_SIZE as usize]) -> Result<Self> {
        if bytes[0..3] != MAGIC {
            return Err(TransplantError::corrupt(format!(
                "bad magic {:02x} {:02x} {:02x}",
                bytes[0], bytes[1], bytes[2]
            )));
        }
        let kind = RecordType::try_from(bytes[3])?;
        let [_, _, _, _, d0, d1, d2, d3, size @ ..] = bytes;
        let depth = u32::from_be_bytes([d0, d1, d2, d3]);
        let size = u64::from_be_bytes(size);

        let min_size = match kind {
            RecordType::DirectoryEntry => HEADER_SIZE + ENTRY_FIELDS_SIZE,
            _ => HEADER_SIZE,
        };
        if size < min_size || (kind.is_bracket() && size != HEADER_SIZE) {
            return Err(TransplantError::corrupt(format!(
                "{kind} record at depth {depth} has invalid size {size}"
            )));
        }
        Ok(Self { kind, depth, size })
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(&self.to_bytes())?;
        Ok(())
    }

    pub fn read_from<R: Read>(input: &mut R) -> Result<Self> {
        let mut buf = [0u8; HEADER_SIZE as usize];
        input
            .read_exact(&mut buf)
            .map_err(|e| TransplantError::from_stream_read(e, "record header"))?;
        Self::from_bytes(buf)
    }

    pub fn is(&self, kind: RecordType, depth: u32) -> bool {
        self.kind == kind && self.depth == depth
    }

    /// Fails with `CorruptStream` unless this is a `kind` record at `depth`.
    pub fn expect(self, kind: RecordType, depth: u32) -> Result<Self> {
        if self.is(kind, depth) {
            Ok(self)
        } else {
            Err(TransplantError::corrupt(format!(
                "expected {kind} at depth {depth}, found {} at depth {}",
                self.kind, self.depth
            )))
        }
    }
}

/// Emits a 16-byte header.
pub fn write_header<W: Write>(out: &mut W, kind: RecordType, depth: u32, size: u64) -> Result<()> {
    RecordHeader::new(kind, depth, size).write_to(out)
}

/// Reads and validates one 16-byte header.
pub fn read_header<R: Read>(input: &mut R) -> Result<RecordHeader> {
    RecordHeader::read_from(input)
}

/// Fixed-width payload prefix of a `DIRECTORY_ENTRY` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryFields {
    /// POSIX type and permission bits.
    pub mode: u32,
    /// Content length for regular files, zero for directories.
    pub file_size: u64,
}

impl EntryFields {
    pub fn to_bytes(&self) -> [u8; ENTRY_FIELDS_SIZE as usize] {
        let mut buf = [0u8; ENTRY_FIELDS_SIZE as usize];
        buf[0..4].copy_from_slice(&self.mode.to_be_bytes());
        buf[4..12].copy_from_slice(&self.file_size.to_be_bytes());
        buf
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(&self.to_bytes())?;
        Ok(())
    }

    pub fn read_from<R: Read>(input: &mut R) -> Result<Self> {
        let mut buf = [0u8; ENTRY_FIELDS_SIZE as usize];
        input
            .read_exact(&mut buf)
            .map_err(|e| TransplantError::from_stream_read(e, "directory entry fields"))?;
        let [m0, m1, m2, m3, file_size @ ..] = buf;
        Ok(Self {
            mode: u32::from_be_bytes([m0, m1, m2, m3]),
            file_size: u64::from_be_bytes(file_size),
        })
    }
}
