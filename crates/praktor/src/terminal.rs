//! Terminal rendering of the chat transcript

use console::style;
use std::io::Write;

use praktor_agent::ChatOutput;
use praktor_provider::ToolCall;

/// Writes the transcript to stdout. Colors switch off when stdout is not a tty.
pub struct TerminalOutput {
    out: std::io::Stdout,
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }

    pub fn banner(&mut self) {
        let _ = writeln!(self.out, "Chat with Praktor (use 'ctrl-c' to quit)");
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatOutput for TerminalOutput {
    fn prompt(&mut self) {
        let _ = write!(self.out, "{}: ", style("You").blue());
        let _ = self.out.flush();
    }

    fn assistant(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}: {}", style("Praktor").yellow(), text);
    }

    fn tool_call(&mut self, call: &ToolCall) {
        let _ = writeln!(
            self.out,
            "{}: {}({})",
            style("tool").green(),
            call.name,
            call.arguments
        );
    }
}
