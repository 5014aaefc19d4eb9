use std::path::PathBuf;

use clap::Parser;

use super::logging::LogDestination;

/// Download a batch of web videos one at a time.
#[derive(Debug, Parser)]
#[command(name = "tubebatch", version)]
pub struct Cli {
    /// Video URLs, downloaded in the order given.
    pub urls: Vec<String>,

    /// Text file with one URL per line. May be repeated.
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Read every *.txt file in this directory as a link file.
    #[arg(long, value_name = "DIR")]
    pub links_dir: Option<PathBuf>,

    /// Maximum resolution: 1080p, 720p, 480p or best.
    #[arg(short, long)]
    pub quality: Option<String>,

    /// Directory downloads and the failure log are written to.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Netscape cookie file passed to yt-dlp when it exists.
    #[arg(long, value_name = "FILE")]
    pub cookies: Option<PathBuf>,

    #[arg(long = "yt-dlp", value_name = "PATH")]
    pub yt_dlp: Option<PathBuf>,

    #[arg(long, value_name = "PATH")]
    pub ffmpeg: Option<PathBuf>,

    /// Only accept URLs on this host or its subdomains. May be repeated.
    /// `youtube` selects youtube.com and youtu.be.
    #[arg(long = "allow-host", value_name = "HOST")]
    pub allow_hosts: Vec<String>,

    /// Empty the link files whose URLs were queued once the batch is done.
    #[arg(long)]
    pub clear_sources: bool,

    /// Configuration file (RON). Defaults to tubebatch.ron next to the binary.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,
}
