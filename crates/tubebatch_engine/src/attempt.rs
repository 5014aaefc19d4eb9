use std::path::Path;

use tubebatch_core::{Batch, UrlEntry};

use crate::{Container, DownloadRequest};

pub const DEFAULT_FILENAME_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Two independent attempt descriptors for one URL. The fallback differs
/// from the primary only in its container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptPlan {
    pub primary: DownloadRequest,
    pub fallback: DownloadRequest,
}

impl AttemptPlan {
    pub fn for_entry(
        entry: &UrlEntry,
        batch: &Batch,
        filename_template: &str,
        cookie_file: Option<&Path>,
    ) -> Self {
        let primary = DownloadRequest {
            url: entry.clone(),
            output_dir: batch.output_dir().to_path_buf(),
            filename_template: filename_template.to_string(),
            format: batch.format_expression().to_string(),
            container: Container::PRIMARY,
            cookie_file: cookie_file.map(Path::to_path_buf),
        };
        let fallback = DownloadRequest {
            container: Container::FALLBACK,
            ..primary.clone()
        };
        Self { primary, fallback }
    }
}
