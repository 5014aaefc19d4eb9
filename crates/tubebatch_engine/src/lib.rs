//! Tubebatch engine: download execution, batch orchestration and the files
//! a batch reads and writes.
mod attempt;
mod download;
mod engine;
mod orchestrator;
mod persist;
mod sources;
mod tools;
mod types;

pub use attempt::{AttemptPlan, DEFAULT_FILENAME_TEMPLATE};
pub use download::{parse_progress_line, Downloader, StatusSink, YtDlpDownloader, YtDlpSettings};
pub use engine::OrchestratorHandle;
pub use orchestrator::{
    BatchReport, ChannelEventSink, EventSink, Orchestrator, OrchestratorSettings,
    OrchestratorState, RunError, RunGuard,
};
pub use persist::{ensure_output_dir, FailureLog, PersistError, FAILURE_LOG_NAME};
pub use sources::{read_link_file, scan_links_dir, truncate_sources, LinkFile};
pub use tools::locate_ffmpeg;
pub use types::{Container, DownloadError, DownloadRequest, EngineStatus, FailureKind};
