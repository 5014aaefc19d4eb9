use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::{AddOutcome, AppState, BatchEvent, Effect, Msg, Notice, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let running = state.session() == SessionState::Running;
    let effects = match msg {
        // The list backing a running batch is frozen; edits wait for Finished.
        Msg::UrlSubmitted(_)
        | Msg::UrlsPasted(_)
        | Msg::UrlRemoved(_)
        | Msg::ClearClicked
        | Msg::QualitySelected(_)
        | Msg::OutputDirChanged(_)
            if running =>
        {
            engine_debug!("Ignoring list edit while a batch is running");
            Vec::new()
        }
        Msg::UrlSubmitted(raw) => {
            let url = raw.trim().to_string();
            let outcome = state.registry_mut().add(&url);
            report_add(&mut state, url, outcome).into_iter().collect()
        }
        Msg::UrlsPasted(text) => {
            let outcomes = state.registry_mut().add_many(&text);
            outcomes
                .into_iter()
                .filter_map(|(url, outcome)| report_add(&mut state, url, outcome))
                .collect()
        }
        Msg::UrlRemoved(raw) => {
            if state.registry_mut().remove(&raw) {
                engine_info!("URL removed from list: {}", raw.trim());
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ClearClicked => {
            if !state.registry().is_empty() {
                state.registry_mut().clear();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::QualitySelected(quality) => {
            if state.quality() != quality {
                state.set_quality(quality);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::OutputDirChanged(dir) => {
            if *state.output_dir() != dir {
                engine_info!("Output directory changed: {:?} -> {:?}", state.output_dir(), dir);
                state.set_output_dir(dir);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::StartClicked => {
            if running {
                vec![Effect::Notify(Notice::AlreadyRunning)]
            } else {
                match state
                    .registry()
                    .to_batch(state.quality(), state.output_dir().clone())
                {
                    Ok(batch) => {
                        engine_info!(
                            "Starting batch of {} url(s), format: {}",
                            batch.len(),
                            batch.format_expression()
                        );
                        state.begin_run(batch.len());
                        vec![Effect::StartBatch(batch)]
                    }
                    Err(_) => {
                        engine_warn!("Start requested with an empty url list");
                        vec![Effect::Notify(Notice::NothingToDownload)]
                    }
                }
            }
        }
        Msg::Batch(event) if running => apply_batch_event(&mut state, event),
        Msg::Batch(event) => {
            engine_debug!("Dropping batch event outside a run: {:?}", event);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn report_add(state: &mut AppState, url: String, outcome: AddOutcome) -> Option<Effect> {
    match outcome {
        AddOutcome::Inserted => {
            engine_info!("URL added to list: {}", url);
            state.mark_dirty();
            None
        }
        AddOutcome::DuplicateRejected => {
            engine_warn!("Duplicate URL rejected: {}", url);
            Some(Effect::Notify(Notice::Duplicate(url)))
        }
        AddOutcome::InvalidRejected(reason) => {
            engine_warn!("Invalid URL rejected ({}): {}", reason, url);
            Some(Effect::Notify(Notice::Invalid { url, reason }))
        }
    }
}

fn apply_batch_event(state: &mut AppState, event: BatchEvent) -> Vec<Effect> {
    match event {
        BatchEvent::ItemProgress(percent) => {
            state.set_item_percent(percent);
            Vec::new()
        }
        BatchEvent::OverallProgress(percent) => {
            state.set_overall_percent(percent);
            Vec::new()
        }
        BatchEvent::ItemFailed(entry) => {
            state.push_failed(entry);
            Vec::new()
        }
        BatchEvent::FailureLogError { path, message } => {
            let message = format!("{}: {}", path.display(), message);
            state.set_failure_log_error(message.clone());
            vec![Effect::Notify(Notice::FailureLogLost { message })]
        }
        BatchEvent::Finished { had_failures } => {
            state.finish_run(had_failures);
            if had_failures {
                vec![Effect::Notify(Notice::CompletedWithFailures {
                    failed: state.failed_count(),
                })]
            } else {
                vec![Effect::Notify(Notice::Completed)]
            }
        }
    }
}
