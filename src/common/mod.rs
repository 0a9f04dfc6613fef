//! Common types shared by the serializer, deserializer and lister.

use serde::Serialize;

/// The only entry kinds the stream format defines, plus a catch-all.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

impl EntryKind {
    /// Classifies raw `st_mode` bits.
    pub fn from_mode(mode: u32) -> Self {
        let fmt = mode & libc::S_IFMT as u32;
        if fmt == libc::S_IFREG as u32 {
            EntryKind::File
        } else if fmt == libc::S_IFDIR as u32 {
            EntryKind::Directory
        } else {
            EntryKind::Other
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "dir",
            EntryKind::Other => "other",
        }
    }
}

/// Metadata for a single entry as recorded in a stream.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    /// Path relative to the serialized root.
    pub path: String,
    pub kind: EntryKind,
    /// Permission bits only (`mode & 0o777`).
    pub permissions: u32,
    /// Content length; zero for directories.
    pub size: u64,
    pub depth: u32,
}
