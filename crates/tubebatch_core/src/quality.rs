use std::fmt;

/// Upper bound on video resolution requested from the download engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    #[default]
    UpTo1080p,
    UpTo720p,
    UpTo480p,
    Unrestricted,
}

impl Quality {
    pub const ALL: [Quality; 4] = [
        Quality::UpTo1080p,
        Quality::UpTo720p,
        Quality::UpTo480p,
        Quality::Unrestricted,
    ];

    /// Maps a user-facing label to a quality. Unknown labels mean no limit.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "1080p" | "1080" => Quality::UpTo1080p,
            "720p" | "720" => Quality::UpTo720p,
            "480p" | "480" => Quality::UpTo480p,
            _ => Quality::Unrestricted,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quality::UpTo1080p => "1080p",
            Quality::UpTo720p => "720p",
            Quality::UpTo480p => "480p",
            Quality::Unrestricted => "best",
        }
    }

    /// yt-dlp format selector: best video under the height cap plus best
    /// audio, falling back to the best single-file format.
    pub fn format_expression(self) -> &'static str {
        match self {
            Quality::UpTo1080p => "bestvideo[height<=1080]+bestaudio/best",
            Quality::UpTo720p => "bestvideo[height<=720]+bestaudio/best",
            Quality::UpTo480p => "bestvideo[height<=480]+bestaudio/best",
            Quality::Unrestricted => "bestvideo+bestaudio/best",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
