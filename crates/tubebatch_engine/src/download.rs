use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use engine_logging::{engine_debug, engine_info, engine_warn, log_engine_line};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::{DownloadError, DownloadRequest, EngineStatus, FailureKind};

/// Prefix of the lines our progress template makes yt-dlp print.
const PROGRESS_PREFIX: &str = "[progress] ";
const PROGRESS_TEMPLATE: &str =
    "download:[progress] %(progress.status)s %(progress._percent_str)s";

pub trait StatusSink: Send + Sync {
    fn status(&self, status: EngineStatus);
}

/// Fetches one URL to local storage. Implementations report transfer
/// progress through `sink` and return once the attempt is over.
#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    async fn download(
        &self,
        request: &DownloadRequest,
        sink: &dyn StatusSink,
    ) -> Result<(), DownloadError>;
}

#[derive(Debug, Clone)]
pub struct YtDlpSettings {
    pub binary: PathBuf,
    pub ffmpeg_location: Option<PathBuf>,
    pub socket_timeout_secs: u32,
    pub retries: u32,
}

impl Default for YtDlpSettings {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
            ffmpeg_location: None,
            socket_timeout_secs: 30,
            retries: 3,
        }
    }
}

/// Runs the yt-dlp executable once per attempt.
#[derive(Debug, Clone, Default)]
pub struct YtDlpDownloader {
    settings: YtDlpSettings,
}

impl YtDlpDownloader {
    pub fn new(settings: YtDlpSettings) -> Self {
        Self { settings }
    }

    pub fn build_args(&self, request: &DownloadRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--newline".into(),
            "--continue".into(),
            "--socket-timeout".into(),
            self.settings.socket_timeout_secs.to_string().into(),
            "--retries".into(),
            self.settings.retries.to_string().into(),
            "--progress-template".into(),
            PROGRESS_TEMPLATE.into(),
            "-f".into(),
            request.format.clone().into(),
            "--merge-output-format".into(),
            request.container.as_str().into(),
            "-o".into(),
            request
                .output_dir
                .join(&request.filename_template)
                .into_os_string(),
        ];

        if let Some(ffmpeg) = &self.settings.ffmpeg_location {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.clone().into_os_string());
        }

        match &request.cookie_file {
            Some(cookies) if cookies.is_file() => {
                engine_info!("Using cookies from {:?}", cookies);
                args.push("--cookies".into());
                args.push(cookies.clone().into_os_string());
            }
            Some(cookies) => {
                engine_debug!("Cookie file {:?} not found, continuing without it", cookies);
            }
            None => {}
        }

        args.push("--".into());
        args.push(request.url.as_str().into());
        args
    }
}

#[async_trait::async_trait]
impl Downloader for YtDlpDownloader {
    async fn download(
        &self,
        request: &DownloadRequest,
        sink: &dyn StatusSink,
    ) -> Result<(), DownloadError> {
        engine_debug!(
            "Running {:?} for {} as {}",
            self.settings.binary,
            request.url,
            request.container
        );
        let mut child = Command::new(&self.settings.binary)
            .args(self.build_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                DownloadError::new(
                    FailureKind::ToolUnavailable,
                    format!("{}: {}", self.settings.binary.display(), err),
                )
            })?;

        let stderr_task = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut last_error = None;
                let mut reader = BufReader::new(stderr);
                let mut buf = Vec::new();
                loop {
                    match next_lossy_line(&mut reader, &mut buf).await {
                        Ok(Some(line)) => {
                            log_engine_line(&line);
                            if line.starts_with("ERROR:") {
                                last_error = Some(line);
                            }
                        }
                        Ok(None) => break,
                        Err(err) => {
                            engine_warn!("Reading yt-dlp stderr failed: {}", err);
                            break;
                        }
                    }
                }
                last_error
            })
        });

        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            while let Some(line) = next_lossy_line(&mut reader, &mut buf)
                .await
                .map_err(|err| DownloadError::new(FailureKind::Io, err.to_string()))?
            {
                match parse_progress_line(&line) {
                    Some(status) => sink.status(status),
                    None => log_engine_line(&line),
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|err| DownloadError::new(FailureKind::Io, err.to_string()))?;
        let last_error = match stderr_task {
            Some(task) => task.await.ok().flatten(),
            None => None,
        };

        if status.success() {
            Ok(())
        } else {
            Err(exit_error(status, last_error))
        }
    }
}

/// Reads one line of tool output. Bytes that are not UTF-8 (titles in a
/// legacy console code page) are replaced rather than failing the read.
async fn next_lossy_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(buf);
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn exit_error(status: ExitStatus, last_error: Option<String>) -> DownloadError {
    let message = last_error.unwrap_or_else(|| format!("yt-dlp exited with {status}"));
    DownloadError::new(
        FailureKind::Exit {
            code: status.code(),
        },
        message,
    )
}

/// Recognizes lines printed by our progress template.
pub fn parse_progress_line(line: &str) -> Option<EngineStatus> {
    let rest = line.trim_end().strip_prefix(PROGRESS_PREFIX)?;
    let (status, percent) = rest.split_once(' ').unwrap_or((rest, ""));
    match status {
        "downloading" => Some(EngineStatus::Downloading(percent.to_string())),
        "finished" => Some(EngineStatus::Finished),
        _ => None,
    }
}
