use engine_logging::{engine_error, engine_info};
use tubebatch_core::{BatchEvent, Effect, Notice};
use tubebatch_engine::{OrchestratorHandle, RunError};

use super::render::Renderer;

pub struct EffectRunner {
    engine: OrchestratorHandle,
}

impl EffectRunner {
    pub fn new(engine: OrchestratorHandle) -> Self {
        Self { engine }
    }

    /// Carries out effects from `update`. A batch the worker refused comes
    /// back as an error.
    pub fn enqueue(&self, effects: Vec<Effect>, renderer: &Renderer) -> Result<(), RunError> {
        for effect in effects {
            match effect {
                Effect::StartBatch(batch) => {
                    engine_info!("Handing {} url(s) to the worker", batch.len());
                    self.engine.start(batch)?;
                }
                Effect::Notify(notice) => {
                    if matches!(notice, Notice::FailureLogLost { .. }) {
                        engine_error!("{:?}", notice);
                    }
                    renderer.notice(&notice);
                }
            }
        }
        Ok(())
    }

    /// Blocks for the next event of the running batch. `None` means the
    /// worker thread is gone.
    pub fn next_event(&self) -> Option<BatchEvent> {
        self.engine.recv()
    }
}
