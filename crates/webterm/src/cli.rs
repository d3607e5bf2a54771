//! Command line arguments.

use std::path::PathBuf;

use anyhow::{bail, Result};

/// Usage text printed for `--help`.
pub const USAGE: &str = "\
Usage: webterm [--config PATH] [HOST:USER:PASS]

Options:
  -c, --config PATH   Load settings from a YAML file
  -h, --help          Print this help
  -V, --version       Print the version

The optional connection string starts a session immediately.
Set RUST_LOG to override the configured log level.";

/// Parsed command line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// Configuration file
    pub config: Option<PathBuf>,
    /// Connection string to open on start
    pub descriptor: Option<String>,
    /// `--help` was given
    pub help: bool,
    /// `--version` was given
    pub version: bool,
}

impl CliArgs {
    /// Parse arguments, excluding the program name.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = Self::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => parsed.help = true,
                "-V" | "--version" => parsed.version = true,
                "-c" | "--config" => {
                    let Some(path) = args.next() else {
                        bail!("{arg} requires a path");
                    };
                    parsed.config = Some(PathBuf::from(path));
                }
                other if other.starts_with("--config=") => {
                    parsed.config = Some(PathBuf::from(&other["--config=".len()..]));
                }
                other if other.starts_with('-') => bail!("unknown option: {other}"),
                other => {
                    if parsed.descriptor.is_some() {
                        bail!("unexpected argument: {other}");
                    }
                    parsed.descriptor = Some(other.to_string());
                }
            }
        }

        Ok(parsed)
    }
}
