// src/format/mod.rs

//! Output aggregation.
//!
//! A [`MessageFormatter`] turns the stream of captured lines into the final
//! `output` / `error` / `combined_output` text of a run. It is only ever
//! mutated from the drain worker (see [`crate::drain`]), so implementations
//! hold plain buffers and never lock anything themselves.
//!
//! - [`append_line`] keeps every line.
//! - [`last_line`] keeps only the most recent line.
//! - [`no_messages`] keeps nothing and disables output capture altogether.

pub mod append_line;
pub mod last_line;
pub mod no_messages;

use std::fmt;

use crate::types::FormatterKind;

pub use append_line::AppendLineFormatter;
pub use last_line::LastLineFormatter;
pub use no_messages::NoMessagesFormatter;

/// Strategy that accumulates captured lines into result text.
///
/// No method may panic on ordinary input, and `clear` must be safe to call
/// any number of times.
pub trait MessageFormatter: Send + fmt::Debug {
    fn output(&self) -> &str;

    fn error(&self) -> &str;

    fn combined_output(&self) -> &str;

    /// Apply one line read from a process's stdout.
    fn add_to_output(&mut self, line: &str);

    /// Apply one line read from a process's stderr.
    fn add_to_error(&mut self, line: &str);

    /// Reset to the empty state.
    fn clear(&mut self);

    /// A new instance of the same formatter with empty state.
    fn duplicate(&self) -> Box<dyn MessageFormatter>;

    /// Whether processes need their output redirected for this formatter.
    ///
    /// When this is `false` the runner never pipes stdout/stderr and never
    /// starts a drain loop.
    fn captures_output(&self) -> bool {
        true
    }

    /// Copy the current state into an immutable [`RunResults`].
    fn snapshot(&self) -> RunResults {
        RunResults::new(self.output(), self.error(), self.combined_output())
    }
}

/// Build one of the built-in formatters.
pub fn formatter_for(kind: FormatterKind) -> Box<dyn MessageFormatter> {
    match kind {
        FormatterKind::AppendLine => Box::new(AppendLineFormatter::default()),
        FormatterKind::LastLine => Box::new(LastLineFormatter::default()),
        FormatterKind::NoMessages => Box::new(NoMessagesFormatter),
    }
}

/// Text captured by a completed run.
///
/// Taken once after every process has exited and the drain loop has
/// stopped; there is no way to mutate it afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResults {
    output: String,
    error: String,
    combined_output: String,
}

impl RunResults {
    pub fn new(
        output: impl Into<String>,
        error: impl Into<String>,
        combined_output: impl Into<String>,
    ) -> Self {
        Self {
            output: output.into(),
            error: error.into(),
            combined_output: combined_output.into(),
        }
    }

    /// Everything the processes wrote to stdout.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Everything the processes wrote to stderr.
    pub fn error(&self) -> &str {
        &self.error
    }

    /// Stdout and stderr lines in the order they were applied.
    pub fn combined_output(&self) -> &str {
        &self.combined_output
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty() && self.error.is_empty() && self.combined_output.is_empty()
    }
}
