// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`launcher`] defines the `ProcessLauncher` capability the runner
//!   consumes, plus the request / exit types crossing that boundary.
//! - [`tokio_launcher`] is the production launcher built on
//!   `tokio::process::Command`.
//! - [`creator`] turns a run configuration into one `ProcessHandle` per
//!   argument string.

pub mod creator;
pub mod launcher;
pub mod tokio_launcher;

pub use creator::{ProcessCreator, ProcessHandle};
pub use launcher::{LaunchRequest, LaunchedProcess, ProcessExit, ProcessLauncher};
pub use tokio_launcher::TokioLauncher;
