use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_error, engine_info};
use tubebatch_core::{Batch, BatchEvent};

use crate::orchestrator::{ChannelEventSink, Orchestrator, OrchestratorState, RunError, RunGuard};

enum EngineCommand {
    Run { batch: Batch, guard: RunGuard },
}

/// Owns the single worker thread that executes batches.
///
/// Events flow back over an unbounded channel, so the worker never waits on
/// the caller.
pub struct OrchestratorHandle {
    orchestrator: Arc<Orchestrator>,
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<BatchEvent>,
}

impl OrchestratorHandle {
    pub fn new(orchestrator: Orchestrator) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let orchestrator = Arc::new(orchestrator);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let worker = orchestrator.clone();
        thread::Builder::new()
            .name("tubebatch-worker".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::Run { batch, guard } => {
                            let sink = ChannelEventSink::new(event_tx.clone());
                            if let Err(err) =
                                runtime.block_on(worker.run_acquired(guard, &batch, &sink))
                            {
                                engine_error!("Batch ended with an error: {}", err);
                            }
                        }
                    }
                }
                engine_info!("Orchestrator worker shutting down");
            })?;

        Ok(Self {
            orchestrator,
            cmd_tx,
            event_rx,
        })
    }

    /// Queues `batch` for the worker. Refused while a batch is in flight.
    pub fn start(&self, batch: Batch) -> Result<(), RunError> {
        let guard = self.orchestrator.acquire()?;
        self.cmd_tx
            .send(EngineCommand::Run { batch, guard })
            .map_err(|_| RunError::WorkerStopped)
    }

    pub fn state(&self) -> OrchestratorState {
        self.orchestrator.state()
    }

    pub fn try_recv(&self) -> Option<BatchEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event. `None` once the worker is gone.
    pub fn recv(&self) -> Option<BatchEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<BatchEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}
