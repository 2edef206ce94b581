// src/exec/tokio_launcher.rs

//! Production launcher backed by `tokio::process::Command`.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::drain::OutputSink;
use crate::types::Channel;

use super::launcher::{LaunchRequest, LaunchedProcess, ProcessExit, ProcessLauncher};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Spawns real OS processes.
///
/// The argument string is split with shell quoting rules (no shell is
/// involved). When the request carries a sink, stdout and stderr are piped
/// and read line by line; otherwise they are inherited from the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLauncher;

impl TokioLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for TokioLauncher {
    fn launch(&self, request: LaunchRequest) -> Result<LaunchedProcess> {
        let index = request.index;
        let args = shell_words::split(&request.arguments).with_context(|| {
            format!("splitting arguments {:?} of process #{index}", request.arguments)
        })?;

        info!(
            index,
            executable = %request.executable,
            arguments = %request.arguments,
            redirect = request.redirects_output(),
            "starting process"
        );

        let mut cmd = Command::new(&request.executable);
        cmd.args(&args).stdin(Stdio::null()).kill_on_drop(true);
        configure_window(&mut cmd, request.show_window);

        if request.redirects_output() {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        let mut child = cmd.spawn().with_context(|| {
            format!("spawning '{}' for process #{index}", request.executable)
        })?;

        let mut readers: Vec<JoinHandle<()>> = Vec::with_capacity(2);
        if let Some(sink) = request.sink {
            if let Some(stdout) = child.stdout.take() {
                readers.push(spawn_line_reader(stdout, sink.clone(), Channel::Stdout, index));
            }
            if let Some(stderr) = child.stderr.take() {
                readers.push(spawn_line_reader(stderr, sink, Channel::Stderr, index));
            }
        }

        Ok(LaunchedProcess::new(index, async move {
            let status = child
                .wait()
                .await
                .with_context(|| format!("waiting for process #{index}"))?;

            // The exit is only reported once every line has been queued.
            for reader in readers {
                if let Err(e) = reader.await {
                    warn!(index, error = %e, "output reader task failed");
                }
            }

            let exit = ProcessExit {
                index,
                code: status.code(),
            };
            info!(
                index,
                exit_code = ?exit.code,
                success = exit.success(),
                "process exited"
            );
            Ok(exit)
        }))
    }
}

#[cfg(windows)]
fn configure_window(cmd: &mut Command, show_window: bool) {
    if !show_window {
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
}

#[cfg(not(windows))]
fn configure_window(_cmd: &mut Command, _show_window: bool) {}

/// Forward every line of `reader` into `sink` until EOF.
///
/// Lines are split on `\n`; a trailing `\r` is dropped and invalid UTF-8 is
/// replaced rather than ending the stream.
fn spawn_line_reader<R>(reader: R, sink: OutputSink, channel: Channel, index: usize) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut segments = BufReader::new(reader).split(b'\n');

        loop {
            match segments.next_segment().await {
                Ok(Some(mut bytes)) => {
                    if bytes.last() == Some(&b'\r') {
                        bytes.pop();
                    }
                    let line = String::from_utf8_lossy(&bytes).into_owned();
                    match channel {
                        Channel::Stdout => sink.send_output(Some(line)),
                        Channel::Stderr => sink.send_error(Some(line)),
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(index, ?channel, error = %e, "reading process output failed");
                    break;
                }
            }
        }

        debug!(index, ?channel, "output reader ended");
    })
}
