//! Command-line surface.
//!
//! The historical single-dash spellings (`-script`, `-port`, `-timeout`,
//! `-config`) are rewritten to their `--` forms before clap sees them.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

const USAGE: &str =
    "custom-exporter -script <script_path> -port <port> -timeout <seconds> [-config <file>]";

const LEGACY_FLAGS: [&str; 4] = ["script", "port", "timeout", "config"];

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "custom-exporter",
    about = "Run a script periodically and expose its output as Prometheus gauges",
    version,
    override_usage = USAGE,
)]
pub struct Cli {
    /// Script to execute each cycle.
    #[arg(long, value_name = "SCRIPT_PATH")]
    pub script: PathBuf,

    /// Port to serve /metrics on.
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Seconds to wait between successful script runs.
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Optional TOML file customising the metric and label schema.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse the process arguments, exiting with usage on error.
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args))
    }

    /// Delay between successful cycles.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Rewrite `-script` style flags to `--script`.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| match arg.to_str().and_then(|s| s.strip_prefix('-')) {
            Some(flag) if LEGACY_FLAGS.contains(&flag) => OsString::from(format!("--{flag}")),
            _ => arg,
        })
        .collect()
}
