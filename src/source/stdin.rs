//! Stdin-based script source for piped input.

use crate::model::error::InputError;
use std::io::{BufRead, BufReader, IsTerminal, Read};

/// Scenario script piped on stdin (`cat scenario.jsonl | convwin`).
pub struct StdinSource<R: Read> {
    reader: BufReader<R>,
    complete: bool,
}

impl<R: Read> std::fmt::Debug for StdinSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdinSource")
            .field("complete", &self.complete)
            .finish()
    }
}

impl StdinSource<std::io::Stdin> {
    /// Read from the process's stdin.
    ///
    /// # Errors
    ///
    /// Returns `InputError::NoInput` if stdin is an interactive terminal, so
    /// the driver never blocks waiting for a script the user forgot to pipe.
    pub fn new() -> Result<Self, InputError> {
        let stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Err(InputError::NoInput);
        }
        Ok(Self::from_reader(stdin))
    }
}

impl<R: Read> StdinSource<R> {
    /// Read from any reader.
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            complete: false,
        }
    }

    /// Next line, without its line ending. A last line with no newline is
    /// still returned. Returns `None` and marks the source complete at EOF.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` for I/O errors.
    pub fn poll(&mut self) -> Result<Option<String>, InputError> {
        if self.complete {
            return Ok(None);
        }
        let mut buffer = String::new();
        let bytes = self.reader.read_line(&mut buffer)?;
        if bytes == 0 {
            self.complete = true;
            return Ok(None);
        }
        let line = buffer.strip_suffix('\n').unwrap_or(&buffer);
        Ok(Some(line.trim_end_matches('\r').to_string()))
    }

    /// Read every remaining line, joined with newlines.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` for I/O errors.
    pub fn read_to_end(&mut self) -> Result<String, InputError> {
        let mut lines = Vec::new();
        while let Some(line) = self.poll()? {
            lines.push(line);
        }
        Ok(lines.join("\n"))
    }

    /// Whether EOF has been reached.
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}
