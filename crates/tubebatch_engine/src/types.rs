use std::fmt;
use std::path::PathBuf;

use tubebatch_core::UrlEntry;

/// Output wrapper yt-dlp merges video and audio into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Webm,
    Mkv,
}

impl Container {
    pub const PRIMARY: Container = Container::Webm;
    pub const FALLBACK: Container = Container::Mkv;

    pub fn as_str(self) -> &'static str {
        match self {
            Container::Webm => "webm",
            Container::Mkv => "mkv",
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the download engine needs for one attempt at one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: UrlEntry,
    pub output_dir: PathBuf,
    pub filename_template: String,
    pub format: String,
    pub container: Container,
    /// Applied only when the file exists at download time.
    pub cookie_file: Option<PathBuf>,
}

/// Status reported by the engine while an attempt runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    /// Free-form percent text, possibly with terminal color codes.
    Downloading(String),
    /// A file finished transferring.
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadError {
    pub kind: FailureKind,
    pub message: String,
}

impl DownloadError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The engine ran and reported a failure. Only these are worth a retry
    /// in another container.
    pub fn is_download_layer(&self) -> bool {
        matches!(self.kind, FailureKind::Exit { .. })
    }
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for DownloadError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    ToolUnavailable,
    Exit { code: Option<i32> },
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::ToolUnavailable => write!(f, "download tool unavailable"),
            FailureKind::Exit { code: Some(code) } => write!(f, "download failed (exit {code})"),
            FailureKind::Exit { code: None } => write!(f, "download failed (terminated)"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}
