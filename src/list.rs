//! Stream listing: validates a transmission exactly as the deserializer
//! does, but reports the entries instead of creating them.

use crate::common::{EntryKind, ListedEntry};
use crate::error::{Result, TransplantError};
use crate::fsx::PERMISSION_MASK;
use crate::name::{validate_entry_name, NameBuf};
use crate::path_builder::PathBuilder;
use crate::record::{read_header, EntryFields, RecordType};
use std::io::{self, Read};

struct Lister<R: Read> {
    input: R,
    name: NameBuf,
    max_depth: u32,
    entries: Vec<ListedEntry>,
}

impl<R: Read> Lister<R> {
    fn directory(&mut self, path: &mut PathBuilder, depth: u32) -> Result<()> {
        if depth > self.max_depth {
            return Err(TransplantError::corrupt(format!(
                "directory nesting exceeds the limit of {}",
                self.max_depth
            )));
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
            let kind = EntryKind::from_mode(fields.mode);
            self.entries.push(ListedEntry {
                path: relative(&child),
                kind,
                permissions: fields.mode & PERMISSION_MASK,
                size: fields.file_size,
                depth,
            });
            match kind {
                EntryKind::File => self.skip_file(depth, fields.file_size)?,
                EntryKind::Directory => self.directory(&mut child, depth + 1)?,
                EntryKind::Other => {
                    return Err(TransplantError::UnsupportedEntryType {
                        path: child.as_path().to_path_buf(),
                        mode: fields.mode,
                    })
                }
            }
        }
    }

    fn skip_file(&mut self, depth: u32, expected_len: u64) -> Result<()> {
        let header = read_header(&mut self.input)?.expect(RecordType::FileData, depth)?;
        let len = header.payload_len();
        if len != expected_len {
            return Err(TransplantError::corrupt(format!(
                "file data holds {len} bytes but its entry announced {expected_len}"
            )));
        }
        let skipped = io::copy(&mut (&mut self.input).take(len), &mut io::sink())?;
        if skipped != len {
            return Err(TransplantError::corrupt("unexpected end of stream in file data"));
        }
        Ok(())
    }
}

fn relative(path: &PathBuilder) -> String {
    let text = String::from_utf8_lossy(path.as_bytes());
    text.strip_prefix("./").unwrap_or(&text).to_string()
}

/// Reads a whole transmission from `input` and returns its entries in
/// stream order.
pub fn list<R: Read>(input: R, max_depth: u32) -> Result<Vec<ListedEntry>> {
    let mut lister = Lister {
        input,
        name: NameBuf::new(),
        max_depth,
        entries: Vec::new(),
    };
    let mut path = PathBuilder::from_base(".")?;
    read_header(&mut lister.input)?.expect(RecordType::StartOfTransmission, 0)?;
    lister.directory(&mut path, 1)?;
    read_header(&mut lister.input)?.expect(RecordType::EndOfTransmission, 0)?;
    Ok(lister.entries)
}
