use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use engine_logging::engine_warn;
use tempfile::NamedTempFile;
use thiserror::Error;
use tubebatch_core::UrlEntry;

/// Well-known name of the failure log inside a batch's output directory.
pub const FAILURE_LOG_NAME: &str = "failed_downloads.txt";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Append-only record of URLs that could not be fetched, one per line.
#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(FAILURE_LOG_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `urls` in order, creating the file if needed. Earlier
    /// contents are never rewritten.
    pub fn record_failures(&self, urls: &[UrlEntry]) -> Result<PathBuf, PersistError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        for url in urls {
            writeln!(writer, "{}", url.as_str())?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()?;
        engine_warn!("Recorded {} failed url(s) in {:?}", urls.len(), self.path);
        Ok(self.path.clone())
    }
}
