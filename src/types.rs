use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// One of the two output streams a process can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Stdout,
    Stderr,
}

/// Which built-in formatter aggregates captured lines.
///
/// - `AppendLine`: keep every line, each followed by `\n`.
/// - `LastLine`: keep only the most recent line per field.
/// - `NoMessages`: capture nothing. Output redirection is skipped entirely
///   (default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatterKind {
    AppendLine,
    LastLine,
    NoMessages,
}

impl Default for FormatterKind {
    fn default() -> Self {
        FormatterKind::NoMessages
    }
}

impl FromStr for FormatterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "append-line" | "append" => Ok(FormatterKind::AppendLine),
            "last-line" | "last" => Ok(FormatterKind::LastLine),
            "no-messages" | "none" => Ok(FormatterKind::NoMessages),
            other => Err(format!(
                "invalid formatter: {other} (expected \"append-line\", \"last-line\" or \"no-messages\")"
            )),
        }
    }
}

impl fmt::Display for FormatterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FormatterKind::AppendLine => "append-line",
            FormatterKind::LastLine => "last-line",
            FormatterKind::NoMessages => "no-messages",
        };
        f.write_str(s)
    }
}
