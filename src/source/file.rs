//! File-based script source.

use crate::model::error::InputError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Scenario script read from a file, line by line.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    reader: BufReader<File>,
}

impl FileSource {
    /// Open a script file.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the file does not exist.
    /// Returns `InputError::Io` for other I/O errors.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InputError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
        })
    }

    /// Path of the script.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the rest of the file. A trailing partial line is included.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` if reading fails.
    pub fn read_to_end(&mut self) -> Result<String, InputError> {
        let mut content = String::new();
        let mut buffer = String::new();
        loop {
            buffer.clear();
            if self.reader.read_line(&mut buffer)? == 0 {
                break;
            }
            content.push_str(&buffer);
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn new_opens_existing_file() {
        let test_file = std::env::temp_dir().join("convwin_file_source_exists.jsonl");
        fs::write(&test_file, "{\"event\":\"idle\"}\n").expect("write script");

        let result = FileSource::new(&test_file);
        let _ = fs::remove_file(&test_file);

        assert!(result.is_ok());
    }

    #[test]
    fn new_returns_file_not_found_for_missing_file() {
        let missing = std::env::temp_dir().join("convwin_nonexistent_script_12345.jsonl");
        let result = FileSource::new(&missing);
        assert!(matches!(result, Err(InputError::FileNotFound { .. })));
    }

    #[test]
    fn read_to_end_returns_every_line() {
        let test_file = std::env::temp_dir().join("convwin_file_source_read.jsonl");
        fs::write(&test_file, "line1\nline2\npartial").expect("write script");

        let mut source = FileSource::new(&test_file).expect("opens");
        let content = source.read_to_end().expect("reads");
        let _ = fs::remove_file(&test_file);

        assert_eq!(content, "line1\nline2\npartial");
        assert_eq!(source.read_to_end().expect("reads again"), "", "Already drained");
    }
}
