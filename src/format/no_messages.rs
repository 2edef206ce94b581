// src/format/no_messages.rs

use super::MessageFormatter;

/// Discards everything. Selecting it turns off output redirection.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMessagesFormatter;

impl MessageFormatter for NoMessagesFormatter {
    fn output(&self) -> &str {
        ""
    }

    fn error(&self) -> &str {
        ""
    }

    fn combined_output(&self) -> &str {
        ""
    }

    fn add_to_output(&mut self, _line: &str) {}

    fn add_to_error(&mut self, _line: &str) {}

    fn clear(&mut self) {}

    fn duplicate(&self) -> Box<dyn MessageFormatter> {
        Box::new(NoMessagesFormatter)
    }

    fn captures_output(&self) -> bool {
        false
    }
}
