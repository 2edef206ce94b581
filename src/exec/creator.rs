// src/exec/creator.rs

//! Run configuration: what to launch, and how many times.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::drain::OutputSink;
use crate::errors::{FanrunError, Result};

use super::launcher::{LaunchRequest, LaunchedProcess, ProcessLauncher};

/// Immutable description of a batch of processes.
///
/// One process is created per entry of `arguments`. Handles from the most
/// recent [`ProcessCreator::create_handles`] call are kept so they can be
/// disposed when the creator is re-used or disposed.
pub struct ProcessCreator {
    executable: String,
    arguments: Vec<String>,
    show_window: bool,
    launcher: Arc<dyn ProcessLauncher>,
    state: Mutex<CreatorState>,
}

#[derive(Default)]
struct CreatorState {
    handles: Vec<ProcessHandle>,
    disposed: bool,
}

impl ProcessCreator {
    pub fn new(
        executable: impl Into<String>,
        arguments: Vec<String>,
        show_window: bool,
        launcher: Arc<dyn ProcessLauncher>,
    ) -> Result<Self> {
        let executable = executable.into();
        validate_executable(&executable)?;
        validate_arguments(&arguments)?;

        Ok(Self {
            executable,
            arguments,
            show_window,
            launcher,
            state: Mutex::new(CreatorState::default()),
        })
    }

    /// `count` instances sharing the same argument string.
    pub fn repeated(
        executable: impl Into<String>,
        argument: impl Into<String>,
        count: usize,
        show_window: bool,
        launcher: Arc<dyn ProcessLauncher>,
    ) -> Result<Self> {
        if count == 0 {
            return Err(FanrunError::ConfigError(
                "process count must be >= 1 (got 0)".to_string(),
            ));
        }
        let argument = argument.into();
        Self::new(executable, vec![argument; count], show_window, launcher)
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn show_window(&self) -> bool {
        self.show_window
    }

    pub fn process_count(&self) -> usize {
        self.arguments.len()
    }

    /// Create one handle per argument string, disposing the previous set.
    ///
    /// Output is only redirected when `sink` is given.
    pub fn create_handles(&self, sink: Option<OutputSink>) -> Result<Vec<ProcessHandle>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.disposed {
            return Err(FanrunError::Disposed("process creator"));
        }

        dispose_all(&mut state.handles);

        state.handles = self
            .arguments
            .iter()
            .enumerate()
            .map(|(index, arguments)| ProcessHandle {
                request: LaunchRequest {
                    index,
                    executable: self.executable.clone(),
                    arguments: arguments.clone(),
                    show_window: self.show_window,
                    sink: sink.clone(),
                },
                launcher: Arc::clone(&self.launcher),
                disposed: Arc::new(AtomicBool::new(false)),
            })
            .collect();

        Ok(state.handles.clone())
    }

    /// A fresh creator with the same configuration and no handles.
    pub fn try_clone(&self) -> Result<Self> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.disposed {
            return Err(FanrunError::Disposed("process creator"));
        }

        Ok(Self {
            executable: self.executable.clone(),
            arguments: self.arguments.clone(),
            show_window: self.show_window,
            launcher: Arc::clone(&self.launcher),
            state: Mutex::new(CreatorState::default()),
        })
    }

    /// Dispose every held handle. Safe to call repeatedly.
    pub fn dispose(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.disposed {
            return;
        }
        dispose_all(&mut state.handles);
        state.disposed = true;
        debug!(executable = %self.executable, "process creator disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .disposed
    }
}

impl fmt::Debug for ProcessCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessCreator")
            .field("executable", &self.executable)
            .field("arguments", &self.arguments)
            .field("show_window", &self.show_window)
            .finish_non_exhaustive()
    }
}

fn dispose_all(handles: &mut Vec<ProcessHandle>) {
    for handle in handles.drain(..) {
        handle.dispose();
    }
}

fn validate_executable(executable: &str) -> Result<()> {
    if executable.trim().is_empty() {
        return Err(FanrunError::ConfigError(
            "executable path must not be empty".to_string(),
        ));
    }
    if executable.contains('\0') {
        return Err(FanrunError::ConfigError(
            "executable path must not contain NUL bytes".to_string(),
        ));
    }
    Ok(())
}

fn validate_arguments(arguments: &[String]) -> Result<()> {
    if arguments.is_empty() {
        return Err(FanrunError::ConfigError(
            "at least one argument string is required (one per process)".to_string(),
        ));
    }
    if let Some(pos) = arguments.iter().position(|a| a.contains('\0')) {
        return Err(FanrunError::ConfigError(format!(
            "argument string #{pos} contains a NUL byte"
        )));
    }
    Ok(())
}

/// One not-yet-started process instance.
///
/// Clones share the disposed flag.
#[derive(Clone)]
pub struct ProcessHandle {
    request: LaunchRequest,
    launcher: Arc<dyn ProcessLauncher>,
    disposed: Arc<AtomicBool>,
}

impl ProcessHandle {
    pub fn index(&self) -> usize {
        self.request.index
    }

    pub fn arguments(&self) -> &str {
        &self.request.arguments
    }

    pub fn redirects_output(&self) -> bool {
        self.request.redirects_output()
    }

    /// Hand the process to the launcher.
    pub fn start(&self) -> Result<LaunchedProcess> {
        if self.is_disposed() {
            return Err(FanrunError::Disposed("process handle"));
        }

        self.launcher
            .launch(self.request.clone())
            .map_err(|source| FanrunError::LaunchError {
                index: self.request.index,
                source,
            })
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("request", &self.request)
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}
