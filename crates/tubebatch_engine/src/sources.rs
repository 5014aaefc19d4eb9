//! Plain-text link files: one URL per line, used as batch input.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use engine_logging::engine_info;

use crate::persist::{PersistError, FAILURE_LOG_NAME};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFile {
    pub path: PathBuf,
    /// Trimmed, non-blank lines in file order.
    pub lines: Vec<String>,
}

pub fn read_link_file(path: &Path) -> Result<LinkFile, PersistError> {
    let text = fs::read_to_string(path)?;
    let lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    Ok(LinkFile {
        path: path.to_path_buf(),
        lines,
    })
}

/// Reads every `*.txt` file directly inside `dir`, sorted by name. The
/// failure log is skipped so failed URLs are not retried by accident.
pub fn scan_links_dir(dir: &Path) -> Result<Vec<LinkFile>, PersistError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_txt = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        let is_failure_log = path
            .file_name()
            .is_some_and(|name| name == FAILURE_LOG_NAME);
        if path.is_file() && is_txt && !is_failure_log {
            paths.push(path);
        }
    }
    paths.sort();

    let files = paths
        .iter()
        .map(|path| read_link_file(path))
        .collect::<Result<Vec<_>, _>>()?;
    engine_info!("Found {} link file(s) in {:?}", files.len(), dir);
    Ok(files)
}

/// Empties link files whose URLs have been handed to a batch.
pub fn truncate_sources(paths: &[PathBuf]) -> Result<(), PersistError> {
    for path in paths {
        OpenOptions::new().write(true).truncate(true).open(path)?;
        engine_info!("Cleared link file {:?}", path);
    }
    Ok(())
}
