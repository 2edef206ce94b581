// src/runner.rs

//! Orchestrates one batch of processes per run.
//!
//! Lifecycle: `Idle -> start() -> Running -> (all exits observed, drain
//! stopped) -> Idle`. Starting while `Running` is an error; starting again
//! from `Idle` is always allowed. After `dispose()` every start fails.
//!
//! The in-flight check and the spawning of the batch happen under one lock,
//! so two concurrent `start()` calls can never both launch processes.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use anyhow::anyhow;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::config::RunFile;
use crate::drain::{self, DrainLoop, SharedFormatter};
use crate::errors::{FanrunError, Result};
use crate::exec::{LaunchedProcess, ProcessCreator, ProcessLauncher, TokioLauncher};
use crate::format::{MessageFormatter, RunResults, formatter_for};
use crate::types::Channel;

/// Capacity of the change-notification channel. Slow subscribers lag and
/// skip intermediate values.
const EVENT_CAPACITY: usize = 256;

/// Live progress notification, carrying the full current text of the field
/// that changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputChange {
    Output(String),
    Error(String),
    CombinedOutput(String),
}

#[derive(Debug, Default)]
struct RunnerState {
    running: bool,
    disposed: bool,
    last: Option<RunResults>,
}

/// Launches a configured batch of processes in parallel and aggregates their
/// output through a [`MessageFormatter`].
pub struct ProcessRunner {
    creator: ProcessCreator,
    formatter: SharedFormatter,
    events: broadcast::Sender<OutputChange>,
    state: Arc<Mutex<RunnerState>>,
}

impl ProcessRunner {
    /// One process per entry of `arguments`, launched with [`TokioLauncher`].
    pub fn new(
        executable: impl Into<String>,
        arguments: Vec<String>,
        show_window: bool,
        formatter: Box<dyn MessageFormatter>,
    ) -> Result<Self> {
        let creator =
            ProcessCreator::new(executable, arguments, show_window, Arc::new(TokioLauncher))?;
        Ok(Self::with_creator(creator, formatter))
    }

    /// `count` processes sharing one argument string.
    pub fn repeated(
        executable: impl Into<String>,
        argument: impl Into<String>,
        count: usize,
        show_window: bool,
        formatter: Box<dyn MessageFormatter>,
    ) -> Result<Self> {
        let creator = ProcessCreator::repeated(
            executable,
            argument,
            count,
            show_window,
            Arc::new(TokioLauncher),
        )?;
        Ok(Self::with_creator(creator, formatter))
    }

    /// Build from a validated run file, using the given launcher.
    pub fn from_run_file(file: &RunFile, launcher: Arc<dyn ProcessLauncher>) -> Result<Self> {
        let creator = ProcessCreator::new(
            file.executable.clone(),
            file.arguments.clone(),
            file.show_window,
            launcher,
        )?;
        Ok(Self::with_creator(creator, formatter_for(file.formatter)))
    }

    pub fn with_creator(creator: ProcessCreator, formatter: Box<dyn MessageFormatter>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            creator,
            formatter: Arc::new(Mutex::new(formatter)),
            events,
            state: Arc::new(Mutex::new(RunnerState::default())),
        }
    }

    /// Start a run and return immediately.
    ///
    /// Must be called from within a Tokio runtime. Every process is spawned
    /// before this returns; the returned [`RunHandle`] resolves once all of
    /// them have exited and every captured line has been applied.
    pub fn start(&self) -> Result<RunHandle> {
        let runtime = Handle::try_current()
            .map_err(|e| anyhow!("ProcessRunner::start needs a Tokio runtime: {e}"))?;

        let mut state = self.lock_state();
        if state.disposed {
            return Err(FanrunError::Disposed("process runner"));
        }
        if state.running {
            return Err(FanrunError::AlreadyRunning);
        }

        let capture = {
            let mut formatter = lock_formatter(&self.formatter);
            formatter.clear();
            formatter.captures_output()
        };

        let (drain_loop, sink) = if capture {
            let (drain_loop, sink) = DrainLoop::new();
            (Some(drain_loop), Some(sink))
        } else {
            (None, None)
        };

        let handles = self.creator.create_handles(sink)?;

        // A failed spawn drops the processes launched so far, which kills
        // them.
        let launched = handles
            .iter()
            .map(|handle| handle.start())
            .collect::<Result<Vec<_>>>()?;

        let drain = drain_loop.map(|drain_loop| {
            let (cancel_tx, cancel_rx) = oneshot::channel();
            let worker = drain_loop.run(
                Arc::clone(&self.formatter),
                cancel_rx,
                notifier(self.events.clone()),
            );
            (cancel_tx, worker)
        });

        info!(
            executable = %self.creator.executable(),
            process_count = launched.len(),
            capture,
            "run started"
        );

        state.running = true;
        drop(state);

        let guard = RunningGuard {
            state: Arc::clone(&self.state),
        };
        let formatter = Arc::clone(&self.formatter);

        let task = runtime.spawn(async move {
            let result = drive_run(launched, drain, formatter).await;
            guard.complete(result.as_ref().ok());
            result
        });

        Ok(RunHandle { task })
    }

    /// Start a run and wait for it.
    pub async fn run(&self) -> Result<RunResults> {
        self.start()?.await
    }

    /// Blocking entry point for callers outside any async runtime.
    ///
    /// Builds a private runtime for the duration of the run. Errors from the
    /// run are returned unchanged.
    pub fn start_blocking(&self) -> Result<RunResults> {
        if Handle::try_current().is_ok() {
            return Err(FanrunError::Other(anyhow!(
                "start_blocking called from inside a Tokio runtime; use run() instead"
            )));
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.run())
    }

    /// Receive [`OutputChange`] notifications while runs apply lines.
    pub fn subscribe(&self) -> broadcast::Receiver<OutputChange> {
        self.events.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.lock_state().running
    }

    pub fn is_disposed(&self) -> bool {
        self.lock_state().disposed
    }

    /// Results of the most recently completed run, if any.
    pub fn last_results(&self) -> Option<RunResults> {
        self.lock_state().last.clone()
    }

    /// Current stdout text of the formatter.
    pub fn output(&self) -> String {
        lock_formatter(&self.formatter).output().to_string()
    }

    pub fn error(&self) -> String {
        lock_formatter(&self.formatter).error().to_string()
    }

    pub fn combined_output(&self) -> String {
        lock_formatter(&self.formatter).combined_output().to_string()
    }

    pub fn creator(&self) -> &ProcessCreator {
        &self.creator
    }

    /// An independent runner with the same configuration and an empty
    /// formatter of the same kind. Never shares in-flight state.
    pub fn try_clone(&self) -> Result<Self> {
        if self.lock_state().disposed {
            return Err(FanrunError::Disposed("process runner"));
        }

        let creator = self.creator.try_clone()?;
        let formatter = lock_formatter(&self.formatter).duplicate();
        Ok(Self::with_creator(creator, formatter))
    }

    /// Release held process handles. Safe to call repeatedly.
    ///
    /// A run already in flight is not interrupted.
    pub fn dispose(&self) {
        let mut state = self.lock_state();
        if state.disposed {
            return;
        }
        self.creator.dispose();
        state.disposed = true;
        debug!(executable = %self.creator.executable(), "process runner disposed");
    }

    fn lock_state(&self) -> MutexGuard<'_, RunnerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ProcessRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessRunner")
            .field("creator", &self.creator)
            .field("state", &*self.lock_state())
            .finish_non_exhaustive()
    }
}

/// An in-flight run. Resolves to the run's [`RunResults`].
#[derive(Debug)]
pub struct RunHandle {
    task: JoinHandle<Result<RunResults>>,
}

impl RunHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Future for RunHandle {
    type Output = Result<RunResults>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.task).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(e)) => {
                Poll::Ready(Err(FanrunError::Other(anyhow!("run task failed: {e}"))))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Clears the in-flight flag when the run task ends, however it ends.
struct RunningGuard {
    state: Arc<Mutex<RunnerState>>,
}

impl RunningGuard {
    fn complete(self, results: Option<&RunResults>) {
        if let Some(results) = results {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.last = Some(results.clone());
        }
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.running = false;
    }
}

/// Wait for every process, then stop the drain loop, then snapshot.
///
/// The snapshot is never taken while the drain worker might still apply a
/// queued line.
async fn drive_run(
    launched: Vec<LaunchedProcess>,
    drain: Option<(oneshot::Sender<()>, JoinHandle<usize>)>,
    formatter: SharedFormatter,
) -> Result<RunResults> {
    let mut exits = JoinSet::new();
    for process in launched {
        exits.spawn(process.wait());
    }

    let mut failed = 0usize;
    while let Some(joined) = exits.join_next().await {
        match joined {
            Ok(Ok(exit)) => {
                if !exit.success() {
                    failed += 1;
                    debug!(index = exit.index, exit_code = ?exit.code, "process reported failure");
                }
            }
            Ok(Err(e)) => {
                failed += 1;
                warn!(error = %e, "waiting for process failed");
            }
            Err(e) => {
                failed += 1;
                warn!(error = %e, "process wait task did not complete");
            }
        }
    }

    if let Some((cancel, worker)) = drain {
        let applied = drain::stop(cancel, worker).await?;
        debug!(applied, "captured output drained");
    }

    let results = lock_formatter(&formatter).snapshot();
    info!(failed, "run finished");
    Ok(results)
}

fn notifier(
    events: broadcast::Sender<OutputChange>,
) -> impl FnMut(Channel, &dyn MessageFormatter) + Send + 'static {
    move |channel, formatter| {
        if events.receiver_count() == 0 {
            return;
        }

        let changed = match channel {
            Channel::Stdout => OutputChange::Output(formatter.output().to_string()),
            Channel::Stderr => OutputChange::Error(formatter.error().to_string()),
        };
        let _ = events.send(changed);
        let _ = events.send(OutputChange::CombinedOutput(
            formatter.combined_output().to_string(),
        ));
    }
}

fn lock_formatter(formatter: &SharedFormatter) -> MutexGuard<'_, Box<dyn MessageFormatter>> {
    formatter.lock().unwrap_or_else(PoisonError::into_inner)
}
