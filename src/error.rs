use std::io;
use std::path::PathBuf;

/// The primary error type for all operations in the `transplant` crate.
///
/// Every variant is fatal to the traversal that raises it: the error unwinds
/// through each recursive call without any attempt to resynchronize the stream.
#[derive(thiserror::Error, Debug)]
pub enum TransplantError {
    /// Bad magic, unknown or unexpected record type, depth mismatch, or
    /// premature end of input.
    #[error("corrupt stream: {0}")]
    CorruptStream(String),

    /// A path or entry name does not fit its fixed-capacity buffer.
    #[error("{what} of {len} bytes exceeds capacity of {capacity} bytes")]
    CapacityExceeded {
        what: &'static str,
        len: usize,
        capacity: usize,
    },

    /// The destination already contains this path and clobbering is off.
    #[error("refusing to overwrite existing path '{}' (pass -c to clobber)", .0.display())]
    AlreadyExists(PathBuf),

    /// The entry is neither a regular file nor a directory.
    #[error("unsupported entry type {mode:#o} at '{}'", path.display())]
    UnsupportedEntryType { path: PathBuf, mode: u32 },

    /// A filesystem call (create, open, chmod, stat, list) failed on `path`.
    #[error("filesystem error on '{}': {source}", path.display())]
    Filesystem { path: PathBuf, source: io::Error },

    /// Read or write failure on the byte stream or an open file handle.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A path component contains a separator or NUL byte.
    #[error("invalid path component '{0}'")]
    InvalidComponent(String),

    /// `pop` was called with nothing left to remove.
    #[error("cannot pop a component from an empty path")]
    EmptyPath,
}

pub type Result<T> = std::result::Result<T, TransplantError>;

impl TransplantError {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        TransplantError::CorruptStream(msg.into())
    }

    pub(crate) fn fs(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TransplantError::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Maps a read failure on the input stream, turning a short read into
    /// `CorruptStream` so truncated input is never reported as plain I/O.
    pub(crate) fn from_stream_read(err: io::Error, context: &str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            TransplantError::CorruptStream(format!("unexpected end of stream while reading {context}"))
        } else {
            TransplantError::Io(err)
        }
    }
}
