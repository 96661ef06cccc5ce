// Append-only activity log. Entries are only ever appended; the file is
// never truncated or rewritten.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use pulse_common::LogEntry;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("failed to create journal directory {path}: {source}")]
    CreateDir { path: PathBuf, source: std::io::Error },

    #[error("failed to append to journal {path}: {source}")]
    Append { path: PathBuf, source: std::io::Error },
}

pub trait Journal {
    fn path(&self) -> &Path;

    /// Append one entry and return the journal length in bytes afterwards.
    fn append(&mut self, entry: &LogEntry) -> Result<u64, JournalError>;
}

/// Journal backed by a file opened in append mode for every entry.
#[derive(Debug, Clone)]
pub struct FileJournal {
    path: PathBuf,
}

impl FileJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Journal for FileJournal {
    fn path(&self) -> &Path {
        &self.path
    }

    fn append(&mut self, entry: &LogEntry) -> Result<u64, JournalError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| JournalError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let append_err = |source| JournalError::Append { path: self.path.clone(), source };
        let mut file =
            OpenOptions::new().create(true).append(true).open(&self.path).map_err(append_err)?;
        file.write_all(entry.render().as_bytes()).map_err(append_err)?;
        file.flush().map_err(append_err)?;
        let len = file.metadata().map_err(append_err)?.len();

        debug!(path = %self.path.display(), len, "journal entry appended");
        Ok(len)
    }
}

/// Counts the bytes that would have been written without touching disk.
#[derive(Debug, Clone)]
pub struct DryRunJournal {
    path: PathBuf,
    len: u64,
}

impl DryRunJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), len: 0 }
    }
}

impl Journal for DryRunJournal {
    fn path(&self) -> &Path {
        &self.path
    }

    fn append(&mut self, entry: &LogEntry) -> Result<u64, JournalError> {
        self.len += entry.render().len() as u64;
        Ok(self.len)
    }
}
