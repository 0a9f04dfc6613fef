//! Fixed-capacity storage for the entry name currently being decoded.

use crate::error::{Result, TransplantError};
use std::io::Read;

/// Longest entry name accepted from a stream.
pub const NAME_MAX: usize = 255;

/// Scratch buffer holding one decoded entry name.
///
/// A name longer than [`NAME_MAX`] is rejected before any byte is copied.
pub struct NameBuf {
    bytes: [u8; NAME_MAX],
    len: usize,
}

impl NameBuf {
    pub fn new() -> Self {
        Self {
            bytes: [0u8; NAME_MAX],
            len: 0,
        }
    }

    pub fn clear(&mut self) {
        self.bytes[..self.len].fill(0);
        self.len = 0;
    }

    /// Reads exactly `len` name bytes from `input`.
    pub fn read_from<R: Read>(&mut self, input: &mut R, len: u64) -> Result<()> {
        if len > NAME_MAX as u64 {
            return Err(TransplantError::CapacityExceeded {
                what: "entry name",
                len: usize::try_from(len).unwrap_or(usize::MAX),
                capacity: NAME_MAX,
            });
        }
        self.clear();
        let len = len as usize;
        input
            .read_exact(&mut self.bytes[..len])
            .map_err(|e| TransplantError::from_stream_read(e, "entry name"))?;
        self.len = len;
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for NameBuf {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_dot_entry(name: &[u8]) -> bool {
    name == b"." || name == b".."
}

/// Rejects names that would alias or escape the directory they are created in.
pub fn validate_entry_name(name: &[u8]) -> Result<()> {
    if name.is_empty() || is_dot_entry(name) || name.iter().any(|&b| b == b'/' || b == 0) {
        return Err(TransplantError::corrupt(format!(
            "invalid entry name '{}'",
            String::from_utf8_lossy(name)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_exact_name() -> Result<()> {
        let mut name = NameBuf::new();
        let mut input = Cursor::new(b"a.txtREST".to_vec());
        name.read_from(&mut input, 5)?;
        assert_eq!(name.as_bytes(), b"a.txt");
        assert_eq!(input.position(), 5);
        Ok(())
    }

    #[test]
    fn oversized_name_leaves_buffer_untouched() -> Result<()> {
        let mut name = NameBuf::new();
        name.read_from(&mut Cursor::new(b"keep".to_vec()), 4)?;

        let long = vec![b'x'; NAME_MAX + 1];
        let mut input = Cursor::new(long);
        let err = name.read_from(&mut input, (NAME_MAX + 1) as u64).unwrap_err();
        assert!(matches!(
            err,
            TransplantError::CapacityExceeded { capacity: NAME_MAX, .. }
        ));
        assert_eq!(name.as_bytes(), b"keep");
        assert_eq!(input.position(), 0);
        Ok(())
    }

    #[test]
    fn name_at_capacity_fits() -> Result<()> {
        let mut name = NameBuf::new();
        name.read_from(&mut Cursor::new(vec![b'n'; NAME_MAX]), NAME_MAX as u64)?;
        assert_eq!(name.len(), NAME_MAX);
        Ok(())
    }

    #[test]
    fn shorter_name_replaces_longer_one() -> Result<()> {
        let mut name = NameBuf::new();
        name.read_from(&mut Cursor::new(b"longer".to_vec()), 6)?;
        name.read_from(&mut Cursor::new(b"ab".to_vec()), 2)?;
        assert_eq!(name.as_bytes(), b"ab");
        Ok(())
    }

    #[test]
    fn truncated_name_is_corrupt_stream() {
        let mut name = NameBuf::new();
        let err = name.read_from(&mut Cursor::new(b"ab".to_vec()), 3).unwrap_err();
        assert!(matches!(err, TransplantError::CorruptStream(_)));
    }

    #[test]
    fn entry_name_validation() {
        assert!(validate_entry_name(b"file.txt").is_ok());
        assert!(validate_entry_name(b"..hidden").is_ok());
        for bad in [&b""[..], b".", b"..", b"a/b", b"nul\0"] {
            assert!(validate_entry_name(bad).is_err(), "{:?}", bad);
        }
    }
}
