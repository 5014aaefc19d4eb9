use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{mpsc, Arc, Mutex};

use engine_logging::{engine_error, engine_info, engine_warn};
use thiserror::Error;
use tubebatch_core::{overall_percent, parse_percent, Batch, BatchEvent, ItemOutcome, UrlEntry};

use crate::attempt::{AttemptPlan, DEFAULT_FILENAME_TEMPLATE};
use crate::download::{Downloader, StatusSink};
use crate::persist::{FailureLog, PersistError};
use crate::EngineStatus;

/// Receives batch events. Implementations must not block the worker.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: BatchEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<BatchEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<BatchEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: BatchEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrchestratorState {
    #[default]
    Idle,
    Running,
    Completed,
    CompletedWithFailures,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("a batch is already running")]
    AlreadyRunning,
    #[error("could not record failed downloads in {path:?}: {source}")]
    FailureLog {
        path: PathBuf,
        #[source]
        source: PersistError,
    },
    #[error("orchestrator worker has stopped")]
    WorkerStopped,
}

#[derive(Debug, Clone, Default)]
pub struct OrchestratorSettings {
    pub filename_template: Option<String>,
    pub cookie_file: Option<PathBuf>,
}

/// What happened to every item of a finished batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<(UrlEntry, ItemOutcome)>,
    pub failure_log: Option<PathBuf>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed(&self) -> Vec<UrlEntry> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_failed())
            .map(|(entry, _)| entry.clone())
            .collect()
    }

    pub fn had_failures(&self) -> bool {
        self.outcomes.iter().any(|(_, outcome)| outcome.is_failed())
    }
}

/// Proof that the caller holds the single run slot. Dropping it without
/// finishing returns the orchestrator to `Idle`.
#[derive(Debug)]
pub struct RunGuard {
    state: Arc<Mutex<OrchestratorState>>,
}

impl RunGuard {
    fn finish(self, terminal: OrchestratorState) {
        *self.state.lock().expect("orchestrator state poisoned") = terminal;
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            if *state == OrchestratorState::Running {
                *state = OrchestratorState::Idle;
            }
        }
    }
}

/// Drives a batch through the download engine one URL at a time.
pub struct Orchestrator {
    downloader: Arc<dyn Downloader>,
    filename_template: String,
    cookie_file: Option<PathBuf>,
    state: Arc<Mutex<OrchestratorState>>,
}

impl Orchestrator {
    pub fn new(downloader: Arc<dyn Downloader>, settings: OrchestratorSettings) -> Self {
        Self {
            downloader,
            filename_template: settings
                .filename_template
                .unwrap_or_else(|| DEFAULT_FILENAME_TEMPLATE.to_string()),
            cookie_file: settings.cookie_file,
            state: Arc::new(Mutex::new(OrchestratorState::Idle)),
        }
    }

    pub fn state(&self) -> OrchestratorState {
        *self.state.lock().expect("orchestrator state poisoned")
    }

    /// Claims the run slot, refusing while another batch is in flight.
    pub fn acquire(&self) -> Result<RunGuard, RunError> {
        let mut state = self.state.lock().expect("orchestrator state poisoned");
        if *state == OrchestratorState::Running {
            return Err(RunError::AlreadyRunning);
        }
        *state = OrchestratorState::Running;
        Ok(RunGuard {
            state: self.state.clone(),
        })
    }

    pub async fn run(&self, batch: &Batch, events: &dyn EventSink) -> Result<BatchReport, RunError> {
        let guard = self.acquire()?;
        self.run_acquired(guard, batch, events).await
    }

    /// Runs `batch` under a slot obtained from [`Orchestrator::acquire`].
    ///
    /// Item failures never stop the batch. The only error is a failure log
    /// that could not be written; `Finished` is emitted in every case.
    pub async fn run_acquired(
        &self,
        guard: RunGuard,
        batch: &Batch,
        events: &dyn EventSink,
    ) -> Result<BatchReport, RunError> {
        let total = batch.len();
        engine_info!(
            "Batch started: {} url(s), format {}, into {:?}",
            total,
            batch.format_expression(),
            batch.output_dir()
        );

        let mut outcomes = Vec::with_capacity(total);
        for (index, entry) in batch.entries().iter().enumerate() {
            let position = index + 1;
            engine_info!("Download [{}/{}]: {}", position, total, entry);

            let plan = AttemptPlan::for_entry(
                entry,
                batch,
                &self.filename_template,
                self.cookie_file.as_deref(),
            );
            let item_sink = ItemProgressSink::new(events);
            let outcome = self.fetch_item(&plan, &item_sink).await;

            match &outcome {
                ItemOutcome::Success => {
                    engine_info!("Downloaded [{}/{}]: {}", position, total, entry);
                    item_sink.close();
                }
                ItemOutcome::Failed { reason } => {
                    engine_error!("Giving up on {}: {}", entry, reason);
                    events.emit(BatchEvent::ItemFailed(entry.clone()));
                    events.emit(BatchEvent::ItemProgress(100));
                }
            }
            events.emit(BatchEvent::OverallProgress(overall_percent(position, total)));
            outcomes.push((entry.clone(), outcome));
        }

        let mut report = BatchReport {
            outcomes,
            failure_log: None,
        };
        let had_failures = report.had_failures();
        let mut result = Ok(());
        if had_failures {
            let log = FailureLog::in_dir(batch.output_dir());
            match log.record_failures(&report.failed()) {
                Ok(path) => report.failure_log = Some(path),
                Err(source) => {
                    let path = log.path().to_path_buf();
                    engine_error!("Failed to write failure log {:?}: {}", path, source);
                    events.emit(BatchEvent::FailureLogError {
                        path: path.clone(),
                        message: source.to_string(),
                    });
                    result = Err(RunError::FailureLog { path, source });
                }
            }
        }

        guard.finish(if had_failures {
            OrchestratorState::CompletedWithFailures
        } else {
            OrchestratorState::Completed
        });
        engine_info!("Batch finished, failures: {}", had_failures);
        events.emit(BatchEvent::Finished { had_failures });

        result.map(|()| report)
    }

    async fn fetch_item(&self, plan: &AttemptPlan, sink: &ItemProgressSink<'_>) -> ItemOutcome {
        match self.downloader.download(&plan.primary, sink).await {
            Ok(()) => return ItemOutcome::Success,
            Err(err) if err.is_download_layer() => {
                engine_warn!(
                    "{} failed as {} ({}), retrying as {}",
                    plan.primary.url,
                    plan.primary.container,
                    err,
                    plan.fallback.container
                );
            }
            Err(err) => {
                return ItemOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }

        match self.downloader.download(&plan.fallback, sink).await {
            Ok(()) => {
                engine_info!("{} succeeded as {}", plan.fallback.url, plan.fallback.container);
                ItemOutcome::Success
            }
            Err(err) => ItemOutcome::Failed {
                reason: err.to_string(),
            },
        }
    }
}

/// Turns engine status for the current item into `ItemProgress` events.
struct ItemProgressSink<'a> {
    events: &'a dyn EventSink,
    last: AtomicU8,
}

impl<'a> ItemProgressSink<'a> {
    fn new(events: &'a dyn EventSink) -> Self {
        Self {
            events,
            last: AtomicU8::new(0),
        }
    }

    fn emit(&self, percent: u8) {
        self.last.store(percent, Ordering::Relaxed);
        self.events.emit(BatchEvent::ItemProgress(percent));
    }

    /// Makes sure a successful item ends at 100%.
    fn close(&self) {
        if self.last.load(Ordering::Relaxed) != 100 {
            self.emit(100);
        }
    }
}

impl StatusSink for ItemProgressSink<'_> {
    fn status(&self, status: EngineStatus) {
        match status {
            EngineStatus::Downloading(raw) => match parse_percent(&raw) {
                Ok(percent) => self.emit(percent),
                Err(err) => {
                    engine_warn!("Progress parse failed: {}", err);
                    self.emit(0);
                }
            },
            EngineStatus::Finished => self.emit(100),
        }
    }
}
