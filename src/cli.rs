// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::FormatterKind;

/// Command-line arguments for `fanrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fanrun",
    version,
    about = "Run the same executable as several parallel processes and collect their output.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a run file (TOML). Flags below override its values.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Executable to launch.
    #[arg(long = "exe", value_name = "PATH")]
    pub executable: Option<String>,

    /// Argument string for one process instance. Repeat once per instance,
    /// or give it once together with `--count`.
    #[arg(long = "arg", value_name = "ARGS", allow_hyphen_values = true)]
    pub arguments: Vec<String>,

    /// Launch this many instances of the single `--arg` template.
    #[arg(long, value_name = "N")]
    pub count: Option<usize>,

    /// Show a console window per process (Windows only).
    #[arg(long)]
    pub show_window: bool,

    /// How captured output is aggregated.
    #[arg(long, value_enum, value_name = "KIND")]
    pub formatter: Option<FormatterArg>,

    /// Print the combined stdout/stderr stream instead of separate streams.
    #[arg(long)]
    pub combined: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FANRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the configuration, but don't launch anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Formatter choice as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum FormatterArg {
    AppendLine,
    LastLine,
    NoMessages,
}

impl From<FormatterArg> for FormatterKind {
    fn from(arg: FormatterArg) -> Self {
        match arg {
            FormatterArg::AppendLine => FormatterKind::AppendLine,
            FormatterArg::LastLine => FormatterKind::LastLine,
            FormatterArg::NoMessages => FormatterKind::NoMessages,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
