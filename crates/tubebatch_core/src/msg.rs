use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A single URL was dropped, typed or passed on the command line.
    UrlSubmitted(String),
    /// Multi-line text was pasted; every non-blank line is a candidate URL.
    UrlsPasted(String),
    /// User removed one URL from the list.
    UrlRemoved(String),
    /// User emptied the list.
    ClearClicked,
    QualitySelected(crate::Quality),
    OutputDirChanged(PathBuf),
    /// User asked to download everything in the list.
    StartClicked,
    /// Orchestrator notification for the running batch.
    Batch(crate::BatchEvent),
    /// Fallback for placeholder wiring.
    NoOp,
}
