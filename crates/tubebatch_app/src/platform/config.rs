use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use engine_logging::engine_info;
use serde::{Deserialize, Serialize};
use tubebatch_core::{HostPolicy, Quality};
use tubebatch_engine::{locate_ffmpeg, YtDlpSettings};

use super::cli::Cli;
use super::logging::LogDestination;

pub const CONFIG_FILENAME: &str = "tubebatch.ron";
const DEFAULT_OUTPUT_DIR: &str = "result";
const DEFAULT_COOKIE_FILE: &str = "cookies.txt";

/// Contents of `tubebatch.ron`. Every field may be left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output_dir: Option<PathBuf>,
    pub quality: Option<String>,
    pub cookie_file: Option<PathBuf>,
    pub yt_dlp_binary: Option<PathBuf>,
    pub ffmpeg_location: Option<PathBuf>,
    pub socket_timeout_secs: Option<u32>,
    pub retries: Option<u32>,
    pub allowed_hosts: Vec<String>,
    pub log_destination: Option<LogDestination>,
}

impl AppConfig {
    /// Reads `explicit`, or `tubebatch.ron` in `app_dir` when no path was
    /// given. Only the default file is allowed to be missing.
    pub fn load(explicit: Option<&Path>, app_dir: &Path) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = app_dir.join(CONFIG_FILENAME);
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        ron::from_str(&content).with_context(|| format!("parsing config file {}", path.display()))
    }
}

/// Effective settings for one invocation: command line, then config file,
/// then built-in defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub quality: Quality,
    pub cookie_file: PathBuf,
    pub yt_dlp: YtDlpSettings,
    pub host_policy: HostPolicy,
    pub log_destination: LogDestination,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: AppConfig, app_dir: &Path) -> Self {
        let defaults = YtDlpSettings::default();

        let quality = cli
            .quality
            .as_deref()
            .or(config.quality.as_deref())
            .map(Quality::from_label)
            .unwrap_or_default();

        let hosts = if cli.allow_hosts.is_empty() {
            &config.allowed_hosts
        } else {
            &cli.allow_hosts
        };

        let ffmpeg_location = cli
            .ffmpeg
            .clone()
            .or(config.ffmpeg_location)
            .or_else(|| locate_ffmpeg(app_dir));

        Self {
            output_dir: cli
                .output
                .clone()
                .or(config.output_dir)
                .unwrap_or_else(|| app_dir.join(DEFAULT_OUTPUT_DIR)),
            quality,
            cookie_file: cli
                .cookies
                .clone()
                .or(config.cookie_file)
                .unwrap_or_else(|| app_dir.join(DEFAULT_COOKIE_FILE)),
            yt_dlp: YtDlpSettings {
                binary: cli
                    .yt_dlp
                    .clone()
                    .or(config.yt_dlp_binary)
                    .unwrap_or(defaults.binary),
                ffmpeg_location,
                socket_timeout_secs: config
                    .socket_timeout_secs
                    .unwrap_or(defaults.socket_timeout_secs),
                retries: config.retries.unwrap_or(defaults.retries),
            },
            host_policy: HostPolicy::from_hosts(hosts),
            log_destination: cli
                .log
                .or(config.log_destination)
                .unwrap_or_default(),
        }
    }

    pub fn log_summary(&self) {
        engine_info!(
            "Settings: output {:?}, quality {}, yt-dlp {:?}, ffmpeg {:?}, hosts {:?}",
            self.output_dir,
            self.quality,
            self.yt_dlp.binary,
            self.yt_dlp.ffmpeg_location,
            self.host_policy
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("tubebatch").chain(args.iter().copied()))
    }

    #[test]
    fn missing_default_config_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(AppConfig::load(None, dir.path()).unwrap(), AppConfig::default());
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("other.ron");
        assert!(AppConfig::load(Some(&path), dir.path()).is_err());
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "(quality: ").unwrap();
        assert!(AppConfig::load(None, dir.path()).is_err());
    }

    #[test]
    fn partial_config_is_read() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"(quality: Some("720p"), retries: Some(7), allowed_hosts: ["vimeo.com"])"#,
        )
        .unwrap();

        let config = AppConfig::load(None, dir.path()).unwrap();
        assert_eq!(config.quality.as_deref(), Some("720p"));
        assert_eq!(config.retries, Some(7));
        assert_eq!(config.allowed_hosts, vec!["vimeo.com".to_string()]);
        assert_eq!(config.output_dir, None);
    }

    #[test]
    fn defaults_live_next_to_the_application() {
        let dir = tempfile::TempDir::new().unwrap();
        let settings = Settings::resolve(
            &cli(&["--ffmpeg", "/opt/ffmpeg"]),
            AppConfig::default(),
            dir.path(),
        );

        assert_eq!(settings.output_dir, dir.path().join("result"));
        assert_eq!(settings.cookie_file, dir.path().join("cookies.txt"));
        assert_eq!(settings.quality, Quality::UpTo1080p);
        assert_eq!(settings.yt_dlp.binary, PathBuf::from("yt-dlp"));
        assert_eq!(settings.yt_dlp.socket_timeout_secs, 30);
        assert_eq!(settings.host_policy, HostPolicy::Any);
        assert_eq!(settings.log_destination, LogDestination::File);
    }

    #[test]
    fn command_line_beats_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig {
            output_dir: Some(PathBuf::from("/from/config")),
            quality: Some("480p".to_string()),
            allowed_hosts: vec!["vimeo.com".to_string()],
            ffmpeg_location: Some(PathBuf::from("/config/ffmpeg")),
            retries: Some(9),
            ..AppConfig::default()
        };
        let settings = Settings::resolve(
            &cli(&["-o", "/from/cli", "-q", "720p", "--allow-host", "youtu.be"]),
            config,
            dir.path(),
        );

        assert_eq!(settings.output_dir, PathBuf::from("/from/cli"));
        assert_eq!(settings.quality, Quality::UpTo720p);
        assert_eq!(
            settings.host_policy,
            HostPolicy::AllowList(vec!["youtu.be".to_string()])
        );
        assert_eq!(
            settings.yt_dlp.ffmpeg_location,
            Some(PathBuf::from("/config/ffmpeg"))
        );
        assert_eq!(settings.yt_dlp.retries, 9);
    }

    #[test]
    fn youtube_preset_from_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"(allowed_hosts: ["youtube"])"#,
        )
        .unwrap();
        let config = AppConfig::load(None, dir.path()).unwrap();
        let settings = Settings::resolve(&cli(&["--ffmpeg", "ffmpeg"]), config, dir.path());

        assert_eq!(settings.host_policy, HostPolicy::youtube());
    }

    #[test]
    fn unknown_quality_label_is_unrestricted() {
        let dir = tempfile::TempDir::new().unwrap();
        let settings = Settings::resolve(
            &cli(&["-q", "4k", "--ffmpeg", "ffmpeg"]),
            AppConfig::default(),
            dir.path(),
        );
        assert_eq!(settings.quality, Quality::Unrestricted);
    }
}
