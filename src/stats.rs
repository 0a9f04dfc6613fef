//! Counters collected during one serialize or deserialize run.

use serde::Serialize;

#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransferStats {
    pub files: u64,
    pub directories: u64,
    /// File content bytes, headers excluded.
    pub bytes: u64,
    /// Entries left out because they are neither files nor directories.
    pub skipped: u64,
}

impl TransferStats {
    pub fn record_file(&mut self, len: u64) {
        self.files += 1;
        self.bytes += len;
    }

    pub fn record_directory(&mut self) {
        self.directories += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }
}
