use crate::state::{FAILED_DOWNLOAD_FLAG, FAILED_FILE_CREATION_FLAG, FAILED_FILE_WRITE_FLAG};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;

pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

const REMARKS: &str = "\
EXAMPLE:
  jrdl jnlp-file.jnlp JnlpOutDir

REMARKS:
  <JNLP_FILE> and [DOWNLOAD_DIR] are positional arguments and must be specified in this order \
regardless of their position among the possibly specified options.
  Any command line argument starting with a dash (-) is considered an option and will be \
ignored if not supported.";

/// Flags clap is allowed to see. Every other dash-prefixed argument is dropped.
const KNOWN_FLAGS: &[&str] = &[
    FAILED_DOWNLOAD_FLAG,
    FAILED_FILE_CREATION_FLAG,
    FAILED_FILE_WRITE_FLAG,
    "-h",
    "--help",
    "-V",
    "--version",
];

#[derive(Parser, Debug)]
#[command(name = "jrdl")]
#[command(author, version, about = "JNLP resource downloader")]
#[command(
    long_about = "JNLP resource downloader\n\nThis utility downloads every JAR file listed in the provided JNLP file."
)]
#[command(after_help = REMARKS)]
pub struct Args {
    /// Path to the JNLP file to download
    #[arg(value_name = "JNLP_FILE")]
    pub jnlp_file: PathBuf,

    /// Directory to download the JAR files to
    #[arg(value_name = "DOWNLOAD_DIR", default_value = DEFAULT_DOWNLOAD_DIR)]
    pub download_dir: PathBuf,

    /// Exit with non-zero code if a download fails
    #[arg(long)]
    pub failed_download_exit: bool,

    /// Exit with non-zero code if a file cannot be created
    #[arg(long)]
    pub failed_file_creation_exit: bool,

    /// Exit with non-zero code if a file cannot be written
    #[arg(long)]
    pub failed_file_write_exit: bool,
}

/// Which per-jar failures stop the whole run. Everything is skip-and-continue by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailurePolicy {
    pub abort_on_download: bool,
    pub abort_on_create: bool,
    pub abort_on_write: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub jnlp_file: PathBuf,
    pub download_dir: PathBuf,
    pub policy: FailurePolicy,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            jnlp_file: args.jnlp_file,
            download_dir: args.download_dir,
            policy: FailurePolicy {
                abort_on_download: args.failed_download_exit,
                abort_on_create: args.failed_file_creation_exit,
                abort_on_write: args.failed_file_write_exit,
            },
        }
    }
}

/// Filters raw argv so clap only sees known flags and at most two positionals.
///
/// The program name is kept as is. Unknown options and extra positionals are dropped.
pub fn normalize_args<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = raw.into_iter().map(Into::into);
    let mut kept: Vec<String> = args.next().into_iter().collect();
    let mut positionals = 0;

    for arg in args {
        if arg.starts_with('-') {
            if KNOWN_FLAGS.contains(&arg.as_str()) {
                kept.push(arg);
            }
        } else if positionals < 2 {
            positionals += 1;
            kept.push(arg);
        }
    }

    kept
}

pub fn usage() -> String {
    Args::command().render_help().to_string()
}

/// What the process should do for a given argv.
#[derive(Debug)]
pub enum Invocation {
    /// No arguments at all: print usage and exit 0.
    Usage,
    /// `--help` or `--version`: clap's output, exit 0.
    Info(clap::Error),
    /// Missing `<JNLP_FILE>` once unknown flags are dropped: clap's message, exit 1.
    Invalid(clap::Error),
    Run(Config),
}

impl Invocation {
    pub fn from_args<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let raw: Vec<String> = raw.into_iter().map(Into::into).collect();
        if raw.len() < 2 {
            return Invocation::Usage;
        }

        match Args::try_parse_from(normalize_args(raw)) {
            Ok(args) => Invocation::Run(args.into()),
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                Invocation::Info(e)
            }
            Err(e) => Invocation::Invalid(e),
        }
    }
}
