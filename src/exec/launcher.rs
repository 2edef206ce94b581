// src/exec/launcher.rs

//! Pluggable process launcher abstraction.
//!
//! The runner never touches OS process APIs directly. It hands a
//! [`LaunchRequest`] to a [`ProcessLauncher`] and gets back a
//! [`LaunchedProcess`] whose future resolves when the process has exited.
//! Production code uses [`super::TokioLauncher`]; tests provide launchers
//! that script output without spawning anything.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use anyhow::Result;

use crate::drain::OutputSink;

/// Trait abstracting how a single process is started.
pub trait ProcessLauncher: Send + Sync {
    /// Start the process described by `request`.
    ///
    /// Spawning happens before this returns; the returned value only waits
    /// for exit. If `request.sink` is present, every stdout / stderr line
    /// must be sent to it before the exit future resolves.
    fn launch(&self, request: LaunchRequest) -> Result<LaunchedProcess>;
}

/// Everything a launcher needs to start one process instance.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    /// Position of this instance within the batch.
    pub index: usize,
    pub executable: String,
    /// Raw argument string for this instance.
    pub arguments: String,
    pub show_window: bool,
    /// Where captured lines go. `None` means output is not redirected.
    pub sink: Option<OutputSink>,
}

impl LaunchRequest {
    pub fn redirects_output(&self) -> bool {
        self.sink.is_some()
    }
}

/// How a process finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    pub index: usize,
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ProcessExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

type ExitFuture = Pin<Box<dyn Future<Output = Result<ProcessExit>> + Send + 'static>>;

/// A started process. Await [`LaunchedProcess::wait`] for its exit.
pub struct LaunchedProcess {
    index: usize,
    exit: ExitFuture,
}

impl LaunchedProcess {
    pub fn new<F>(index: usize, exit: F) -> Self
    where
        F: Future<Output = Result<ProcessExit>> + Send + 'static,
    {
        Self {
            index,
            exit: Box::pin(exit),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub async fn wait(self) -> Result<ProcessExit> {
        self.exit.await
    }
}

impl fmt::Debug for LaunchedProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchedProcess")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}
