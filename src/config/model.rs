// src/config/model.rs

use serde::Deserialize;

use crate::types::FormatterKind;

/// Run file as read from TOML.
///
/// ```toml
/// executable = "python3"
/// arguments = ["job.py --shard 0", "job.py --shard 1"]
/// formatter = "append-line"
/// ```
///
/// or, for identical instances:
///
/// ```toml
/// executable = "python3"
/// argument = "job.py"
/// count = 4
/// ```
///
/// Exactly one of `arguments` or `argument` must be given; `count` only
/// applies to `argument`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRunFile {
    /// Binary to launch (path or name resolved through `PATH`).
    #[serde(default)]
    pub executable: String,

    /// One argument string per process instance.
    #[serde(default)]
    pub arguments: Option<Vec<String>>,

    /// Argument template shared by `count` instances.
    #[serde(default)]
    pub argument: Option<String>,

    /// Number of instances for `argument`. Defaults to 1.
    #[serde(default)]
    pub count: Option<usize>,

    /// Surface a console window per instance (Windows only).
    #[serde(default)]
    pub show_window: bool,

    #[serde(default)]
    pub formatter: FormatterKind,
}

/// Validated run configuration. Build it via `TryFrom<RawRunFile>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFile {
    pub executable: String,
    /// Always non-empty; its length is the process count.
    pub arguments: Vec<String>,
    pub show_window: bool,
    pub formatter: FormatterKind,
}

impl RunFile {
    pub(crate) fn new_unchecked(
        executable: String,
        arguments: Vec<String>,
        show_window: bool,
        formatter: FormatterKind,
    ) -> Self {
        Self {
            executable,
            arguments,
            show_window,
            formatter,
        }
    }

    pub fn process_count(&self) -> usize {
        self.arguments.len()
    }
}
