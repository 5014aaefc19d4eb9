use std::env;
use std::path::{Path, PathBuf};

use engine_logging::{engine_info, engine_warn};

#[cfg(windows)]
const FFMPEG_NAME: &str = "ffmpeg.exe";
#[cfg(not(windows))]
const FFMPEG_NAME: &str = "ffmpeg";

/// Finds ffmpeg for yt-dlp's merge step: a copy shipped next to the
/// application first, then `PATH`.
pub fn locate_ffmpeg(app_dir: &Path) -> Option<PathBuf> {
    let bundled = app_dir.join(FFMPEG_NAME);
    if bundled.is_file() {
        engine_info!("Using bundled ffmpeg: {:?}", bundled);
        return Some(bundled);
    }

    let found = env::var_os("PATH").and_then(|paths| {
        env::split_paths(&paths)
            .map(|dir| dir.join(FFMPEG_NAME))
            .find(|candidate| candidate.is_file())
    });
    match &found {
        Some(path) => engine_info!("Using system ffmpeg: {:?}", path),
        None => engine_warn!("ffmpeg not found; yt-dlp will use its own lookup"),
    }
    found
}
