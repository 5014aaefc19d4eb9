use std::path::PathBuf;

use crate::{Quality, SessionState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub urls: Vec<String>,
    pub quality: Quality,
    pub output_dir: PathBuf,
    pub item_percent: u8,
    pub overall_percent: u8,
    /// Items concluded so far in the current or last batch.
    pub completed: usize,
    pub total: usize,
    pub failed: Vec<String>,
    pub failure_log_error: Option<String>,
    /// False while a batch runs or when there is nothing to fetch.
    pub can_start: bool,
    pub dirty: bool,
}

impl AppViewModel {
    /// URL being fetched right now, if a batch is running.
    pub fn current_url(&self) -> Option<&str> {
        if self.session != SessionState::Running {
            return None;
        }
        self.urls.get(self.completed).map(String::as_str)
    }
}
