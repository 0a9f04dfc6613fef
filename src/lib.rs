//! # Transplant Core Library
//!
//! Serializes a directory tree into a flat, self-describing stream of
//! depth-tagged records and rebuilds an equivalent tree from that stream.
//!
//! ## Key Modules
//!
//! - [`record`]: the 16-byte record header and directory-entry fields.
//! - [`path_builder`]: the capacity-checked current path with scoped push/pop.
//! - [`name`]: fixed-capacity storage for decoded entry names.
//! - [`serialize`]: the depth-first tree walk that writes records.
//! - [`deserialize`]: the recursive parser that recreates files and directories.
//! - [`list`]: structural validation and listing of a stream without side effects.
//!
//! ## Examples
//!
//! ```no_run
//! use transplant::deserialize::{deserialize, DeserializeOptions};
//! use transplant::path_builder::PathBuilder;
//! use transplant::serialize::serialize;
//!
//! # fn main() -> transplant::Result<()> {
//! let mut stream = Vec::new();
//! serialize(&mut PathBuilder::from_base("src")?, &mut stream)?;
//! deserialize(&mut PathBuilder::from_base("copy")?, &stream[..], DeserializeOptions::default())?;
//! # Ok(())
//! # }
//! ```

#[cfg(not(unix))]
compile_error!("transplant records POSIX mode bits and only builds on Unix targets");

pub mod cli;
pub mod cli_runner;
pub mod common;
pub mod error;
pub use error::{Result, TransplantError};

pub mod deserialize;
pub mod list;
pub mod name;
pub mod path_builder;
pub mod record;
pub mod serialize;
pub mod stats;

// Filesystem wrapper
pub mod fsx;
