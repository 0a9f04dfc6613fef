//! Runs one CLI invocation against process stdin/stdout.

use crate::cli::{self, Mode, Options};
use crate::common::{EntryKind, ListedEntry};
use crate::deserialize;
use crate::error::Result;
use crate::list;
use crate::path_builder::PathBuilder;
use crate::serialize;
use std::io::{self, BufReader, BufWriter, Write};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter (e.g. `debug`).
pub const LOG_ENV: &str = "TRANSPLANT_LOG";

/// Installs the stderr log subscriber. Stdout is reserved for the stream.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

/// Public entry for running CLI logic.
pub fn run_cli_app() -> Result<()> {
    let options = cli::run();
    run(&options)
}

pub fn run(options: &Options) -> Result<()> {
    match options.mode {
        Mode::Help => cli::print_usage()?,
        Mode::Serialize => {
            let mut path = PathBuilder::from_base(&options.root_path)?;
            let out = BufWriter::new(io::stdout().lock());
            let stats = serialize::serialize(&mut path, out)?;
            info!(
                root = %options.root_path.display(),
                files = stats.files,
                directories = stats.directories,
                bytes = stats.bytes,
                skipped = stats.skipped,
                "serialized"
            );
        }
        Mode::Deserialize => {
            let mut path = PathBuilder::from_base(&options.root_path)?;
            let input = BufReader::new(io::stdin().lock());
            let stats = deserialize::deserialize(&mut path, input, options.deserialize_options())?;
            info!(
                root = %options.root_path.display(),
                files = stats.files,
                directories = stats.directories,
                bytes = stats.bytes,
                "deserialized"
            );
        }
        Mode::List => {
            let input = BufReader::new(io::stdin().lock());
            let entries = list::list(input, options.max_depth)?;
            let mut out = BufWriter::new(io::stdout().lock());
            print_listing(&mut out, &entries, options.json)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn print_listing<W: Write>(out: &mut W, entries: &[ListedEntry], json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, entries).map_err(io::Error::from)?;
        writeln!(out)?;
        return Ok(());
    }
    for entry in entries {
        let size = match entry.kind {
            EntryKind::File => entry.size.to_string(),
            _ => "-".to_string(),
        };
        writeln!(
            out,
            "{:<4}  {:04o}  {:>12}  {}",
            entry.kind.label(),
            entry.permissions,
            size,
            entry.path
        )?;
    }
    Ok(())
}
