// src/drain.rs

//! Single-consumer drain loop for captured process output.
//!
//! Launchers push lines from many threads through cloned [`OutputSink`]s.
//! Exactly one worker task pulls them off the queue and applies them to the
//! shared formatter, one line at a time, so the formatter itself never sees
//! concurrent mutation.
//!
//! Ordering: lines from the same channel of the same producer are applied in
//! the order they were sent. Interleaving across processes or channels is
//! whatever order they reached the queue.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, trace};

use crate::errors::{FanrunError, Result};
use crate::format::MessageFormatter;
use crate::types::Channel;

/// Formatter shared between the runner (clear / snapshot) and the drain
/// worker (apply).
pub type SharedFormatter = Arc<Mutex<Box<dyn MessageFormatter>>>;

/// One captured line, tagged with the stream it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedLine {
    pub channel: Channel,
    pub text: String,
}

impl TaggedLine {
    /// A missing payload is kept as an empty line.
    pub fn new(channel: Channel, text: Option<String>) -> Self {
        Self {
            channel,
            text: text.unwrap_or_default(),
        }
    }
}

/// Producer side of the drain queue. Cheap to clone, never blocks.
#[derive(Debug, Clone)]
pub struct OutputSink {
    tx: mpsc::UnboundedSender<TaggedLine>,
}

impl OutputSink {
    pub fn send(&self, line: TaggedLine) {
        if self.tx.send(line).is_err() {
            // Only happens once the drain loop has been dropped.
            trace!("drain loop gone; dropping captured line");
        }
    }

    pub fn send_output(&self, text: Option<String>) {
        self.send(TaggedLine::new(Channel::Stdout, text));
    }

    pub fn send_error(&self, text: Option<String>) {
        self.send(TaggedLine::new(Channel::Stderr, text));
    }
}

/// Consumer side of the drain queue.
#[derive(Debug)]
pub struct DrainLoop {
    rx: mpsc::UnboundedReceiver<TaggedLine>,
}

impl DrainLoop {
    pub fn new() -> (Self, OutputSink) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, OutputSink { tx })
    }

    /// Spawn the worker.
    ///
    /// The worker applies lines as they arrive until `cancel` fires (or its
    /// sender is dropped). It then applies exactly the lines queued at that
    /// moment and stops, returning the total number of lines applied.
    ///
    /// `on_applied` runs after every line, with the formatter still locked.
    pub fn run<F>(
        self,
        formatter: SharedFormatter,
        mut cancel: oneshot::Receiver<()>,
        mut on_applied: F,
    ) -> JoinHandle<usize>
    where
        F: FnMut(Channel, &dyn MessageFormatter) + Send + 'static,
    {
        let mut rx = self.rx;

        tokio::spawn(async move {
            debug!("drain loop started");
            let mut applied = 0usize;

            loop {
                tokio::select! {
                    biased;

                    _ = &mut cancel => break,

                    line = rx.recv() => match line {
                        Some(line) => {
                            apply_line(&formatter, line, &mut on_applied);
                            applied += 1;
                        }
                        None => {
                            // Every sink is gone and the queue is empty.
                            let _ = (&mut cancel).await;
                            break;
                        }
                    },
                }
            }

            let pending = rx.len();
            for _ in 0..pending {
                match rx.try_recv() {
                    Ok(line) => {
                        apply_line(&formatter, line, &mut on_applied);
                        applied += 1;
                    }
                    Err(_) => break,
                }
            }

            debug!(applied, final_pass = pending, "drain loop stopped");
            applied
        })
    }
}

fn apply_line<F>(formatter: &SharedFormatter, line: TaggedLine, on_applied: &mut F)
where
    F: FnMut(Channel, &dyn MessageFormatter),
{
    let mut guard = formatter.lock().unwrap_or_else(PoisonError::into_inner);

    match line.channel {
        Channel::Stdout => guard.add_to_output(&line.text),
        Channel::Stderr => guard.add_to_error(&line.text),
    }

    on_applied(line.channel, &**guard);
}

/// Stop a running drain worker and wait for its final pass.
pub async fn stop(cancel: oneshot::Sender<()>, worker: JoinHandle<usize>) -> Result<usize> {
    // The worker may already be waiting on a closed queue; either way it
    // treats a send or a drop as the stop signal.
    let _ = cancel.send(());

    worker.await.map_err(drain_failure)
}

fn drain_failure(err: JoinError) -> FanrunError {
    if err.is_panic() {
        let payload = err.into_panic();
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "formatter panicked while applying a line".to_string());
        FanrunError::DrainFailed(msg)
    } else {
        FanrunError::DrainFailed(err.to_string())
    }
}
