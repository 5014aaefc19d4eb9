use crate::InvalidReason;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartBatch(crate::Batch),
    Notify(Notice),
}

/// Something the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Duplicate(String),
    Invalid { url: String, reason: InvalidReason },
    NothingToDownload,
    AlreadyRunning,
    Completed,
    CompletedWithFailures { failed: usize },
    FailureLogLost { message: String },
}
