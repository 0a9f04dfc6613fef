use crate::deserialize::{DeserializeOptions, DEFAULT_MAX_DEPTH};
use clap::{ArgGroup, CommandFactory, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "transplant",
    author,
    version,
    about = "Serialize a directory tree to stdout, or rebuild one from stdin.",
    long_about = None,
    disable_help_flag = true
)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["help", "serialize", "deserialize", "list"])
))]
pub struct Args {
    /// Print this usage text and exit.
    #[arg(short = 'h', long = "help")]
    pub help: bool,

    /// Serialize the directory at --path to standard output.
    #[arg(short, long)]
    pub serialize: bool,

    /// Rebuild a tree from standard input inside the directory at --path.
    #[arg(short, long)]
    pub deserialize: bool,

    /// List the entries of a stream read from standard input.
    #[arg(short, long)]
    pub list: bool,

    /// Source directory (-s) or destination directory (-d).
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Allow -d to overwrite files and directories that already exist.
    #[arg(short, long, requires = "deserialize")]
    pub clobber: bool,

    /// Print the listing as JSON.
    #[arg(long, requires = "list")]
    pub json: bool,

    /// Deepest directory nesting accepted from a stream.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_depth: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Help,
    Serialize,
    Deserialize,
    List,
}

/// Settings for one run, fixed before any traversal starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub mode: Mode,
    pub clobber: bool,
    pub root_path: PathBuf,
    pub max_depth: u32,
    pub json: bool,
}

impl Options {
    pub fn deserialize_options(&self) -> DeserializeOptions {
        DeserializeOptions {
            clobber: self.clobber,
            max_depth: self.max_depth,
        }
    }
}

impl From<Args> for Options {
    fn from(args: Args) -> Self {
        let mode = if args.help {
            Mode::Help
        } else if args.serialize {
            Mode::Serialize
        } else if args.deserialize {
            Mode::Deserialize
        } else {
            Mode::List
        };
        Options {
            mode,
            clobber: args.clobber,
            root_path: args.path,
            max_depth: args.max_depth,
            json: args.json,
        }
    }
}

pub fn print_usage() -> std::io::Result<()> {
    Args::command().print_help()
}

/// Parses the process arguments. Usage errors print clap's message and exit
/// with a nonzero status.
pub fn run() -> Options {
    Args::parse().into()
}
