use std::fs;
use std::path::{Path, PathBuf};

use crate::io::atomic::atomic_write;
use crate::model::todo::Todo;
use crate::parse::ledger::insert_into_document;

/// Error type for ledger file operations
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("could not read ledger {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write ledger {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The plain-text task ledger on disk
#[derive(Debug, Clone)]
pub struct LedgerFile {
    path: PathBuf,
}

impl LedgerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LedgerFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-modify-write: add `todo` under its date and project sections.
    /// A missing file starts from the comment preamble.
    pub fn record(&self, todo: &Todo) -> Result<(), LedgerError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(LedgerError::ReadError {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        let updated = insert_into_document(&content, todo);
        atomic_write(&self.path, updated.as_bytes()).map_err(|e| LedgerError::WriteError {
            path: self.path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %self.path.display(), id = %todo.id, "task logged to ledger");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::todo::Priority;
    use crate::util::test_helpers::{local, todo};
    use tempfile::TempDir;

    #[test]
    fn first_record_creates_file_with_preamble() {
        let dir = TempDir::new().unwrap();
        let ledger = LedgerFile::new(dir.path().join("tasks.txt"));
        ledger
            .record(&todo("Ship release", Priority::High, local(2024, 1, 10, 9, 0)))
            .unwrap();

        let text = fs::read_to_string(ledger.path()).unwrap();
        assert!(text.starts_with("# Todo Tasks Log\n# Generated by tasklog\n"));
        assert!(text.contains("Wednesday, January 10, 2024's tasks:\n\n#General\n- Ship release"));
    }

    #[test]
    fn records_accumulate() {
        let dir = TempDir::new().unwrap();
        let ledger = LedgerFile::new(dir.path().join("tasks.txt"));
        let created = local(2024, 1, 10, 9, 0);
        ledger.record(&todo("one", Priority::Medium, created)).unwrap();
        ledger.record(&todo("two", Priority::Medium, created)).unwrap();

        let text = fs::read_to_string(ledger.path()).unwrap();
        assert!(text.contains("- one\n- two"));
        assert_eq!(text.matches("'s tasks:").count(), 1);
    }

    #[test]
    fn missing_directory_is_a_write_error() {
        let dir = TempDir::new().unwrap();
        let ledger = LedgerFile::new(dir.path().join("absent/tasks.txt"));
        let err = ledger
            .record(&todo("x", Priority::Medium, local(2024, 1, 10, 9, 0)))
            .unwrap_err();
        assert!(matches!(err, LedgerError::WriteError { .. }));
    }
}
