// src/lib.rs

pub mod cli;
pub mod config;
pub mod drain;
pub mod errors;
pub mod exec;
pub mod format;
pub mod logging;
pub mod runner;
pub mod types;

use std::io::Write;
use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{RawRunFile, RunFile, load_from_path};
use crate::exec::TokioLauncher;
use crate::format::RunResults;

pub use crate::format::{MessageFormatter, formatter_for};
pub use crate::runner::{OutputChange, ProcessRunner, RunHandle};
pub use crate::types::{Channel, FormatterKind};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - run file loading + CLI overrides
/// - the process runner with the real launcher
/// - Ctrl-C handling
/// - printing the collected output
pub async fn run(args: CliArgs) -> Result<()> {
    let file = resolve_run_file(&args)?;

    if args.dry_run {
        print_dry_run(&file);
        return Ok(());
    }

    let runner = ProcessRunner::from_run_file(&file, Arc::new(TokioLauncher::new()))?;
    let handle = runner.start()?;

    let results = tokio::select! {
        res = handle => res?,
        sig = tokio::signal::ctrl_c() => {
            if let Err(e) = sig {
                bail!("failed to listen for Ctrl+C: {e}");
            }
            warn!("interrupted; abandoning run");
            runner.dispose();
            bail!("interrupted before all processes exited");
        }
    };

    info!(process_count = file.process_count(), "all processes finished");
    print_results(&results, args.combined)?;

    runner.dispose();
    Ok(())
}

/// Merge the optional run file with CLI flags and validate the result.
pub fn resolve_run_file(args: &CliArgs) -> crate::errors::Result<RunFile> {
    let mut raw = match &args.config {
        Some(path) => load_from_path(path)?,
        None => RawRunFile::default(),
    };

    if let Some(exe) = &args.executable {
        raw.executable = exe.clone();
    }

    if !args.arguments.is_empty() || args.count.is_some() {
        raw.arguments = None;
        raw.argument = None;
        raw.count = None;

        match (args.arguments.as_slice(), args.count) {
            ([single], Some(count)) => {
                raw.argument = Some(single.clone());
                raw.count = Some(count);
            }
            ([], Some(count)) => {
                raw.argument = Some(String::new());
                raw.count = Some(count);
            }
            (_, Some(_)) => {
                return Err(crate::errors::FanrunError::ConfigError(
                    "--count takes exactly one --arg template".to_string(),
                ));
            }
            (list, None) => raw.arguments = Some(list.to_vec()),
        }
    }

    if args.show_window {
        raw.show_window = true;
    }
    if let Some(kind) = args.formatter {
        raw.formatter = kind.into();
    }

    RunFile::try_from(raw)
}

fn print_results(results: &RunResults, combined: bool) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    if combined {
        stdout.write_all(results.combined_output().as_bytes())?;
    } else {
        stdout.write_all(results.output().as_bytes())?;
        std::io::stderr().write_all(results.error().as_bytes())?;
    }
    stdout.flush()?;
    Ok(())
}

/// Simple dry-run output: print what would be launched.
fn print_dry_run(file: &RunFile) {
    println!("fanrun dry-run");
    println!("  executable = {}", file.executable);
    println!("  show_window = {}", file.show_window);
    println!("  formatter = {}", file.formatter);
    println!();

    println!("processes ({}):", file.process_count());
    for (index, arguments) in file.arguments.iter().enumerate() {
        println!("  #{index}: {arguments}");
    }

    debug!("dry-run complete (no execution)");
}
