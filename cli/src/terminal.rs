use std::io::{self, BufRead, Write};

use habit_core::{Prompt, View};
use tracing::warn;

/// Line-oriented terminal: the command source, the output sink, and the
/// controller's `Prompt`.
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Next input line, or `None` at end of input. Invalid UTF-8 is
    /// replaced rather than rejected.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut raw = Vec::new();
        if self.input.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
    }

    pub fn show(&mut self, view: &View) -> io::Result<()> {
        writeln!(self.output, "{view}")?;
        self.output.flush()
    }

    pub fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.output
    }
}

impl<R: BufRead, W: Write> Prompt for Terminal<R, W> {
    fn confirm(&mut self, message: &str) -> bool {
        if let Err(err) = write!(self.output, "{message} [y/N] ").and_then(|()| self.output.flush()) {
            warn!(error = %err, "could not write confirmation prompt");
            return false;
        }
        match self.next_line() {
            Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Ok(None) => false,
            Err(err) => {
                warn!(error = %err, "could not read confirmation");
                false
            }
        }
    }

    fn alert(&mut self, message: &str) {
        if let Err(err) = writeln!(self.output, "! {message}") {
            warn!(error = %err, "could not write alert");
        }
    }
}
