//! Scenario inputs and in-memory collaborators.
//!
//! - File and stdin sources for JSONL scenario scripts
//! - The script event format and its parser
//! - Map-backed messaging core and preference store

use crate::model::error::InputError;
use std::path::PathBuf;

pub mod file;
pub mod memory;
pub mod script;
pub mod stdin;

pub use file::FileSource;
pub use memory::{InMemoryCore, MemoryPreferences};
pub use script::{parse_script, ParsedScript, ScriptEvent, ScriptLine};
pub use stdin::StdinSource;

/// Where a scenario script comes from.
///
/// Sum type enforces exactly one variant.
#[derive(Debug)]
pub enum InputSource {
    /// Script file given on the command line.
    File(FileSource),
    /// Script piped on stdin.
    Stdin(StdinSource<std::io::Stdin>),
}

impl InputSource {
    /// Read the whole script.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for I/O errors.
    pub fn read_script(&mut self) -> Result<String, InputError> {
        match self {
            InputSource::File(f) => f.read_to_end(),
            InputSource::Stdin(s) => s.read_to_end(),
        }
    }
}

/// Pick the script source.
///
/// # Logic:
/// 1. If a file path is provided: open it
/// 2. Otherwise: read stdin, which must be piped
///
/// # Errors
///
/// Returns `InputError::FileNotFound` if the file does not exist.
/// Returns `InputError::NoInput` if no file is given and stdin is a terminal.
pub fn detect_input_source(file: Option<PathBuf>) -> Result<InputSource, InputError> {
    match file {
        Some(path) => Ok(InputSource::File(FileSource::new(path)?)),
        None => Ok(InputSource::Stdin(StdinSource::new()?)),
    }
}
