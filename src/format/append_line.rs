// src/format/append_line.rs

use super::MessageFormatter;

/// Appends every line plus `\n` to its channel buffer and to the combined
/// buffer.
#[derive(Debug, Default)]
pub struct AppendLineFormatter {
    output: String,
    error: String,
    combined: String,
}

impl MessageFormatter for AppendLineFormatter {
    fn output(&self) -> &str {
        &self.output
    }

    fn error(&self) -> &str {
        &self.error
    }

    fn combined_output(&self) -> &str {
        &self.combined
    }

    fn add_to_output(&mut self, line: &str) {
        push_line(&mut self.output, line);
        push_line(&mut self.combined, line);
    }

    fn add_to_error(&mut self, line: &str) {
        push_line(&mut self.error, line);
        push_line(&mut self.combined, line);
    }

    fn clear(&mut self) {
        self.output.clear();
        self.error.clear();
        self.combined.clear();
    }

    fn duplicate(&self) -> Box<dyn MessageFormatter> {
        Box::new(AppendLineFormatter::default())
    }
}

fn push_line(buf: &mut String, line: &str) {
    buf.push_str(line);
    buf.push('\n');
}
