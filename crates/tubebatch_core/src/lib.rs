//! Tubebatch core: url registry, quality mapping, progress parsing and the
//! pure caller-side state machine.
mod batch;
mod effect;
mod event;
mod msg;
mod progress;
mod quality;
mod registry;
mod state;
mod update;
mod view_model;

pub use batch::{Batch, BatchError};
pub use effect::{Effect, Notice};
pub use event::{BatchEvent, ItemOutcome};
pub use msg::Msg;
pub use progress::{overall_percent, parse_percent, strip_ansi, ProgressParseError};
pub use quality::Quality;
pub use registry::{AddOutcome, HostPolicy, InvalidReason, UrlEntry, UrlRegistry};
pub use state::{AppState, SessionState};
pub use update::update;
pub use view_model::AppViewModel;
