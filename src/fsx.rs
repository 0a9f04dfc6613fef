//! Filesystem wrapper.
//!
//! The engine goes through these helpers instead of calling `std::fs`
//! directly, so every failure comes back as `TransplantError::Filesystem`
//! carrying the path it happened on. Only Unix is supported: the stream
//! records raw POSIX mode bits.

use crate::error::{Result, TransplantError};
use std::fs::{self, DirBuilder, File, Metadata};
use std::io;
use std::os::unix::fs::{DirBuilderExt, MetadataExt, PermissionsExt};
use std::path::Path;
use walkdir::WalkDir;

/// Permission bits restored on deserialization.
pub const PERMISSION_MASK: u32 = 0o777;

/// `lstat`: symbolic links are reported as links, never followed.
pub fn lstat(path: &Path) -> Result<Metadata> {
    fs::symlink_metadata(path).map_err(|e| TransplantError::fs(path, e))
}

pub fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

pub fn mode(meta: &Metadata) -> u32 {
    meta.mode()
}

/// Creates `path` with mode 0700, tolerating an existing directory. A
/// symbolic link at `path` is not a directory here, even if it points to one.
pub fn create_dir(path: &Path) -> Result<()> {
    create_dir_checked(path, false)
}

/// Like [`create_dir`], but an existing `path` is resolved through symbolic
/// links. Used for the destination root only.
pub fn create_root_dir(path: &Path) -> Result<()> {
    create_dir_checked(path, true)
}

fn create_dir_checked(path: &Path, follow_links: bool) -> Result<()> {
    match DirBuilder::new().mode(0o700).create(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            let meta = if follow_links {
                fs::metadata(path)
            } else {
                fs::symlink_metadata(path)
            }
            .map_err(|e| TransplantError::fs(path, e))?;
            if meta.is_dir() {
                Ok(())
            } else {
                Err(TransplantError::fs(
                    path,
                    io::Error::new(io::ErrorKind::AlreadyExists, "exists and is not a directory"),
                ))
            }
        }
        Err(e) => Err(TransplantError::fs(path, e)),
    }
}

/// Removes `path` if it is a symbolic link, leaving its target alone.
/// Returns whether a link was removed.
pub fn remove_symlink(path: &Path) -> Result<bool> {
    if !lstat(path)?.file_type().is_symlink() {
        return Ok(false);
    }
    fs::remove_file(path).map_err(|e| TransplantError::fs(path, e))?;
    Ok(true)
}

/// Creates or truncates `path` for writing.
pub fn create_file(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| TransplantError::fs(path, e))
}

pub fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| TransplantError::fs(path, e))
}

/// Set POSIX permission bits (masked to 0o777).
pub fn set_unix_permissions(path: &Path, mode: u32) -> Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode & PERMISSION_MASK))
        .map_err(|e| TransplantError::fs(path, e))
}

/// Fails unless `path` names a directory (following symbolic links).
pub fn require_dir(path: &Path) -> Result<()> {
    let meta = fs::metadata(path).map_err(|e| TransplantError::fs(path, e))?;
    if !meta.is_dir() {
        return Err(TransplantError::fs(
            path,
            io::Error::new(io::ErrorKind::Other, "not a directory"),
        ));
    }
    Ok(())
}

/// Names of the entries directly inside `dir`, sorted, without `.` and `..`.
pub fn list_dir(dir: &Path) -> Result<Vec<Vec<u8>>> {
    use std::os::unix::ffi::OsStrExt;

    require_dir(dir)?;
    let mut names = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
            TransplantError::fs(path, io::Error::from(e))
        })?;
        names.push(entry.file_name().as_bytes().to_vec());
    }
    Ok(names)
}
