use std::path::PathBuf;

use crate::UrlEntry;

/// Notifications produced while a batch runs, in emission order.
///
/// Events for item `i` are all sent before any event for item `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// Progress of the item currently being fetched, 0..=100.
    ItemProgress(u8),
    /// Whole-batch progress after an item concluded.
    OverallProgress(u8),
    /// Both container attempts failed for this URL.
    ItemFailed(UrlEntry),
    /// The failure list could not be persisted. Always followed by `Finished`.
    FailureLogError { path: PathBuf, message: String },
    Finished { had_failures: bool },
}

impl BatchEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchEvent::Finished { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Success,
    Failed { reason: String },
}

impl ItemOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ItemOutcome::Failed { .. })
    }
}
