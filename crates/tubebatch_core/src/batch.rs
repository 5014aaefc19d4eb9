use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::{Quality, UrlEntry};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("batch has no urls")]
    Empty,
}

/// An ordered, immutable set of URLs with the settings they are fetched with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    entries: Vec<UrlEntry>,
    quality: Quality,
    output_dir: PathBuf,
}

impl Batch {
    pub fn new(
        entries: Vec<UrlEntry>,
        quality: Quality,
        output_dir: PathBuf,
    ) -> Result<Self, BatchError> {
        if entries.is_empty() {
            return Err(BatchError::Empty);
        }
        Ok(Self {
            entries,
            quality,
            output_dir,
        })
    }

    pub fn entries(&self) -> &[UrlEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn format_expression(&self) -> &'static str {
        self.quality.format_expression()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
