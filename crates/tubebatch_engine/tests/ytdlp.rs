use std::path::PathBuf;
use std::sync::Mutex;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tubebatch_core::UrlEntry;
use tubebatch_engine::{
    Container, DownloadRequest, EngineStatus, StatusSink, YtDlpDownloader, YtDlpSettings,
};

#[derive(Default)]
struct TestSink {
    statuses: Mutex<Vec<EngineStatus>>,
}

impl StatusSink for TestSink {
    fn status(&self, status: EngineStatus) {
        self.statuses.lock().unwrap().push(status);
    }
}

fn request(dir: PathBuf, cookie_file: Option<PathBuf>) -> DownloadRequest {
    DownloadRequest {
        url: UrlEntry::parse("https://www.youtube.com/watch?v=abc").unwrap(),
        output_dir: dir,
        filename_template: "%(title)s.%(ext)s".to_string(),
        format: "bestvideo[height<=1080]+bestaudio/best".to_string(),
        container: Container::Webm,
        cookie_file,
    }
}

fn args_as_strings(downloader: &YtDlpDownloader, request: &DownloadRequest) -> Vec<String> {
    downloader
        .build_args(request)
        .into_iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn args_carry_format_container_and_url_last() {
    let downloader = YtDlpDownloader::new(YtDlpSettings {
        ffmpeg_location: Some(PathBuf::from("/opt/ffmpeg")),
        ..YtDlpSettings::default()
    });
    let args = args_as_strings(&downloader, &request(PathBuf::from("/out"), None));

    let pair = |flag: &str| {
        let pos = args.iter().position(|a| a == flag).unwrap();
        args[pos + 1].clone()
    };
    assert_eq!(pair("-f"), "bestvideo[height<=1080]+bestaudio/best");
    assert_eq!(pair("--merge-output-format"), "webm");
    assert_eq!(pair("--socket-timeout"), "30");
    assert_eq!(pair("--retries"), "3");
    assert_eq!(pair("--ffmpeg-location"), "/opt/ffmpeg");
    assert_eq!(pair("-o"), "/out/%(title)s.%(ext)s");
    assert!(!args.contains(&"--cookies".to_string()));
    assert_eq!(
        &args[args.len() - 2..],
        &["--".to_string(), "https://www.youtube.com/watch?v=abc".to_string()]
    );
}

#[test]
fn cookies_are_passed_only_when_file_exists() {
    let temp = TempDir::new().unwrap();
    let cookies = temp.path().join("cookies.txt");
    let downloader = YtDlpDownloader::default();

    let missing = args_as_strings(&downloader, &request(temp.path().into(), Some(cookies.clone())));
    assert!(!missing.contains(&"--cookies".to_string()));

    std::fs::write(&cookies, "# Netscape HTTP Cookie File\n").unwrap();
    let present = args_as_strings(&downloader, &request(temp.path().into(), Some(cookies.clone())));
    let pos = present.iter().position(|a| a == "--cookies").unwrap();
    assert_eq!(present[pos + 1], cookies.to_string_lossy());
}

#[tokio::test]
async fn missing_binary_is_tool_unavailable() {
    use tubebatch_engine::{Downloader, FailureKind};

    let temp = TempDir::new().unwrap();
    let downloader = YtDlpDownloader::new(YtDlpSettings {
        binary: temp.path().join("no-such-yt-dlp"),
        ..YtDlpSettings::default()
    });
    let sink = TestSink::default();

    let err = downloader
        .download(&request(temp.path().into(), None), &sink)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::ToolUnavailable);
    assert!(!err.is_download_layer());
}

#[cfg(unix)]
mod with_fake_binary {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    use super::*;
    use pretty_assertions::assert_eq;
    use tubebatch_engine::{Downloader, FailureKind};

    fn fake_ytdlp(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-yt-dlp");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn progress_lines_reach_the_sink() {
        let temp = TempDir::new().unwrap();
        let binary = fake_ytdlp(
            temp.path(),
            "echo '[youtube] abc: Downloading webpage'\n\
             printf '[progress] downloading \\033[0;94m 12.5%%\\033[0m\\n'\n\
             echo '[progress] downloading  99.0%'\n\
             echo '[progress] finished 100.0%'\n\
             exit 0",
        );
        let downloader = YtDlpDownloader::new(YtDlpSettings {
            binary,
            ..YtDlpSettings::default()
        });
        let sink = TestSink::default();

        downloader
            .download(&request(temp.path().into(), None), &sink)
            .await
            .unwrap();

        assert_eq!(
            sink.statuses.into_inner().unwrap(),
            vec![
                EngineStatus::Downloading("\x1b[0;94m 12.5%\x1b[0m".to_string()),
                EngineStatus::Downloading(" 99.0%".to_string()),
                EngineStatus::Finished,
            ]
        );
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_download_layer_error_with_last_error_line() {
        let temp = TempDir::new().unwrap();
        let binary = fake_ytdlp(
            temp.path(),
            "echo 'WARNING: falling back' >&2\n\
             echo 'ERROR: [youtube] abc: Video unavailable' >&2\n\
             exit 1",
        );
        let downloader = YtDlpDownloader::new(YtDlpSettings {
            binary,
            ..YtDlpSettings::default()
        });

        let err = downloader
            .download(&request(temp.path().into(), None), &TestSink::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind, FailureKind::Exit { code: Some(1) });
        assert!(err.is_download_layer());
        assert_eq!(err.message, "ERROR: [youtube] abc: Video unavailable");
    }

    #[tokio::test]
    async fn non_utf8_output_does_not_fail_the_download() {
        let temp = TempDir::new().unwrap();
        let binary = fake_ytdlp(
            temp.path(),
            "printf '[download] Destination: \\322\\345\\361\\362.webm\\n'\n\
             printf 'WARNING: \\322\\345\\361\\362\\n' >&2\n\
             echo '[progress] finished 100.0%'\n\
             printf 'WARNING: after \\377\\n' >&2\n\
             exit 0",
        );
        let downloader = YtDlpDownloader::new(YtDlpSettings {
            binary,
            ..YtDlpSettings::default()
        });
        let sink = TestSink::default();

        let result = downloader
            .download(&request(temp.path().into(), None), &sink)
            .await;

        assert_eq!(result, Ok(()));
        assert_eq!(sink.statuses.into_inner().unwrap(), vec![EngineStatus::Finished]);
    }

    #[tokio::test]
    async fn arguments_reach_the_binary() {
        let temp = TempDir::new().unwrap();
        let recorded = temp.path().join("args.txt");
        let binary = fake_ytdlp(
            temp.path(),
            &format!("for a in \"$@\"; do echo \"$a\" >> '{}'; done", recorded.display()),
        );
        let downloader = YtDlpDownloader::new(YtDlpSettings {
            binary,
            ..YtDlpSettings::default()
        });
        let mut req = request(temp.path().into(), None);
        req.container = Container::Mkv;

        downloader.download(&req, &TestSink::default()).await.unwrap();

        let args = fs::read_to_string(&recorded).unwrap();
        let args: Vec<&str> = args.lines().collect();
        let pos = args.iter().position(|a| *a == "--merge-output-format").unwrap();
        assert_eq!(args[pos + 1], "mkv");
        assert_eq!(args.last(), Some(&"https://www.youtube.com/watch?v=abc"));
    }
}
