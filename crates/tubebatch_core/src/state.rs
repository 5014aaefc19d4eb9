use std::path::PathBuf;

use crate::view_model::AppViewModel;
use crate::{HostPolicy, Quality, UrlEntry, UrlRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Finished {
        had_failures: bool,
    },
}

/// Caller-side state: the URL list being edited plus what the last or
/// current batch has reported.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    registry: UrlRegistry,
    quality: Quality,
    output_dir: PathBuf,
    session: SessionState,
    item_percent: u8,
    overall_percent: u8,
    completed: usize,
    total: usize,
    failed: Vec<UrlEntry>,
    failure_log_error: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(policy: HostPolicy, quality: Quality, output_dir: PathBuf) -> Self {
        Self {
            registry: UrlRegistry::with_policy(policy),
            quality,
            output_dir,
            ..Self::default()
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn registry(&self) -> &UrlRegistry {
        &self.registry
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            session: self.session,
            urls: self
                .registry
                .entries()
                .iter()
                .map(|entry| entry.as_str().to_string())
                .collect(),
            quality: self.quality,
            output_dir: self.output_dir.clone(),
            item_percent: self.item_percent,
            overall_percent: self.overall_percent,
            completed: self.completed,
            total: self.total,
            failed: self
                .failed
                .iter()
                .map(|entry| entry.as_str().to_string())
                .collect(),
            failure_log_error: self.failure_log_error.clone(),
            can_start: self.session != SessionState::Running && !self.registry.is_empty(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn registry_mut(&mut self) -> &mut UrlRegistry {
        &mut self.registry
    }

    pub(crate) fn quality(&self) -> Quality {
        self.quality
    }

    pub(crate) fn set_quality(&mut self, quality: Quality) {
        self.quality = quality;
    }

    pub(crate) fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    pub(crate) fn set_output_dir(&mut self, dir: PathBuf) {
        self.output_dir = dir;
    }

    pub(crate) fn begin_run(&mut self, total: usize) {
        self.session = SessionState::Running;
        self.item_percent = 0;
        self.overall_percent = 0;
        self.completed = 0;
        self.total = total;
        self.failed.clear();
        self.failure_log_error = None;
        self.dirty = true;
    }

    pub(crate) fn set_item_percent(&mut self, percent: u8) {
        self.item_percent = percent.min(100);
        self.dirty = true;
    }

    /// Called once per concluded item.
    pub(crate) fn set_overall_percent(&mut self, percent: u8) {
        self.overall_percent = self.overall_percent.max(percent.min(100));
        self.completed = (self.completed + 1).min(self.total);
        self.dirty = true;
    }

    pub(crate) fn push_failed(&mut self, entry: UrlEntry) {
        self.failed.push(entry);
        self.dirty = true;
    }

    pub(crate) fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub(crate) fn set_failure_log_error(&mut self, message: String) {
        self.failure_log_error = Some(message);
        self.dirty = true;
    }

    pub(crate) fn finish_run(&mut self, had_failures: bool) {
        self.session = SessionState::Finished { had_failures };
        self.registry.clear();
        self.dirty = true;
    }
}
