#![allow(dead_code)]

use fanrun::FormatterKind;
use fanrun::config::{RawRunFile, RunFile};

/// Builder for run files to simplify test setup.
pub struct RunFileBuilder {
    raw: RawRunFile,
}

impl RunFileBuilder {
    pub fn new(executable: &str) -> Self {
        Self {
            raw: RawRunFile {
                executable: executable.to_string(),
                ..RawRunFile::default()
            },
        }
    }

    pub fn arguments(mut self, args: &[&str]) -> Self {
        self.raw.arguments = Some(args.iter().map(|a| a.to_string()).collect());
        self
    }

    pub fn repeated(mut self, argument: &str, count: usize) -> Self {
        self.raw.argument = Some(argument.to_string());
        self.raw.count = Some(count);
        self
    }

    pub fn formatter(mut self, kind: FormatterKind) -> Self {
        self.raw.formatter = kind;
        self
    }

    pub fn show_window(mut self, val: bool) -> Self {
        self.raw.show_window = val;
        self
    }

    pub fn build_raw(self) -> RawRunFile {
        self.raw
    }

    pub fn build(self) -> RunFile {
        RunFile::try_from(self.raw).expect("Failed to build valid run file from builder")
    }
}
