// src/format/last_line.rs

use super::MessageFormatter;

/// Keeps only the most recent line for each field.
///
/// `combined_output` holds whichever channel wrote last.
#[derive(Debug, Default)]
pub struct LastLineFormatter {
    output: String,
    error: String,
    combined: String,
}

impl LastLineFormatter {
    fn overwrite(field: &mut String, line: &str) {
        field.clear();
        field.push_str(line);
    }
}

impl MessageFormatter for LastLineFormatter {
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
        Self::overwrite(&mut self.output, line);
        Self::overwrite(&mut self.combined, line);
    }

    fn add_to_error(&mut self, line: &str) {
        Self::overwrite(&mut self.error, line);
        Self::overwrite(&mut self.combined, line);
    }

    fn clear(&mut self) {
        self.output.clear();
        self.error.clear();
        self.combined.clear();
    }

    fn duplicate(&self) -> Box<dyn MessageFormatter> {
        Box::new(LastLineFormatter::default())
    }
}
