use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use tokio::sync::watch;
use fanrun::exec::{LaunchRequest, LaunchedProcess, ProcessExit, ProcessLauncher};

/// What a fake process writes before exiting.
///
/// `None` entries model a launcher delivering a missing payload.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProcess {
    pub stdout: Vec<Option<String>>,
    pub stderr: Vec<Option<String>>,
    pub exit_code: i32,
}

impl ScriptedProcess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout(mut self, line: &str) -> Self {
        self.stdout.push(Some(line.to_string()));
        self
    }

    pub fn stdout_none(mut self) -> Self {
        self.stdout.push(None);
        self
    }

    pub fn stderr(mut self, line: &str) -> Self {
        self.stderr.push(Some(line.to_string()));
        self
    }

    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }
}

/// One recorded call to `launch`. The sink itself is not kept so recording
/// never holds a run's queue open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedLaunch {
    pub index: usize,
    pub executable: String,
    pub arguments: String,
    pub show_window: bool,
    pub redirected: bool,
}

/// A launcher that spawns nothing.
///
/// - records every launch request (spy)
/// - plays back a script per argument string; unscripted processes echo
///   their argument string as one stdout line and exit 0
/// - optionally holds every process open after its output is written,
///   until the gate is opened
/// - optionally fails to launch a given instance index
#[derive(Clone, Default)]
pub struct FakeLauncher {
    scripts: HashMap<String, ScriptedProcess>,
    launches: Arc<Mutex<Vec<RecordedLaunch>>>,
    gate: Option<watch::Receiver<bool>>,
    fail_index: Option<usize>,
}

/// Releases processes held by a gated [`FakeLauncher`].
pub struct Gate {
    tx: watch::Sender<bool>,
}

impl Gate {
    pub fn open(&self) {
        let _ = self.tx.send(true);
    }
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes stay "running" until the returned gate is opened.
    pub fn gated() -> (Self, Gate) {
        let (tx, rx) = watch::channel(false);
        let launcher = Self {
            gate: Some(rx),
            ..Self::default()
        };
        (launcher, Gate { tx })
    }

    pub fn script(mut self, arguments: &str, process: ScriptedProcess) -> Self {
        self.scripts.insert(arguments.to_string(), process);
        self
    }

    pub fn fail_at(mut self, index: usize) -> Self {
        self.fail_index = Some(index);
        self
    }

    pub fn launches(&self) -> Vec<RecordedLaunch> {
        self.launches.lock().unwrap().clone()
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch(&self, request: LaunchRequest) -> anyhow::Result<LaunchedProcess> {
        self.launches.lock().unwrap().push(RecordedLaunch {
            index: request.index,
            executable: request.executable.clone(),
            arguments: request.arguments.clone(),
            show_window: request.show_window,
            redirected: request.redirects_output(),
        });

        if self.fail_index == Some(request.index) {
            return Err(anyhow!("fake launch failure for #{}", request.index));
        }

        let script = self.scripts.get(&request.arguments).cloned().unwrap_or_else(|| {
            ScriptedProcess::new().stdout(&request.arguments)
        });
        let gate = self.gate.clone();
        let index = request.index;
        let sink = request.sink;

        Ok(LaunchedProcess::new(index, async move {
            if let Some(sink) = sink {
                for line in script.stdout {
                    sink.send_output(line);
                    tokio::task::yield_now().await;
                }
                for line in script.stderr {
                    sink.send_error(line);
                    tokio::task::yield_now().await;
                }
            }

            if let Some(mut gate) = gate {
                while !*gate.borrow() {
                    if gate.changed().await.is_err() {
                        break;
                    }
                }
            }

            Ok(ProcessExit {
                index,
                code: Some(script.exit_code),
            })
        }))
    }
}
