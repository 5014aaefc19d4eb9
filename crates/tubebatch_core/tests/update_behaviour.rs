use std::path::PathBuf;
use std::sync::Once;

use pretty_assertions::assert_eq;
use tubebatch_core::{
    update, AppState, BatchEvent, Effect, HostPolicy, InvalidReason, Msg, Notice, Quality,
    SessionState, UrlEntry,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn state_with_urls(urls: &str) -> AppState {
    let state = AppState::with_settings(HostPolicy::Any, Quality::UpTo1080p, PathBuf::from("out"));
    let (state, _) = update(state, Msg::UrlsPasted(urls.to_string()));
    state
}

fn start(state: AppState) -> (AppState, Vec<Effect>) {
    update(state, Msg::StartClicked)
}

fn entry(url: &str) -> UrlEntry {
    UrlEntry::parse(url).unwrap()
}

#[test]
fn pasted_urls_are_listed_and_duplicates_reported() {
    init_logging();
    let state = AppState::new();
    let (mut state, effects) = update(
        state,
        Msg::UrlsPasted("https://a.example.com \n\nhttps://a.example.com\nbogus\n".to_string()),
    );

    assert_eq!(state.view().urls, vec!["https://a.example.com".to_string()]);
    assert_eq!(
        effects,
        vec![
            Effect::Notify(Notice::Duplicate("https://a.example.com".to_string())),
            Effect::Notify(Notice::Invalid {
                url: "bogus".to_string(),
                reason: InvalidReason::Malformed,
            }),
        ]
    );
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn start_with_empty_list_only_notifies() {
    init_logging();
    let (state, effects) = start(AppState::new());

    assert_eq!(effects, vec![Effect::Notify(Notice::NothingToDownload)]);
    assert_eq!(state.session(), SessionState::Idle);
}

#[test]
fn start_builds_batch_from_list_and_settings() {
    init_logging();
    let state = state_with_urls("https://a.example.com\nhttps://b.example.com\n");
    let (state, _) = update(state, Msg::QualitySelected(Quality::UpTo480p));
    let (state, _) = update(state, Msg::OutputDirChanged(PathBuf::from("videos")));
    let (state, effects) = start(state);

    let batch = match effects.as_slice() {
        [Effect::StartBatch(batch)] => batch.clone(),
        other => panic!("unexpected effects: {other:?}"),
    };
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.quality(), Quality::UpTo480p);
    assert_eq!(batch.output_dir(), PathBuf::from("videos"));

    let view = state.view();
    assert_eq!(view.session, SessionState::Running);
    assert!(!view.can_start);
}

#[test]
fn second_start_while_running_is_refused() {
    init_logging();
    let (state, _) = start(state_with_urls("https://a.example.com\n"));
    let (state, effects) = start(state);

    assert_eq!(effects, vec![Effect::Notify(Notice::AlreadyRunning)]);
    assert_eq!(state.session(), SessionState::Running);
}

#[test]
fn list_is_frozen_while_running() {
    init_logging();
    let (state, _) = start(state_with_urls("https://a.example.com\n"));
    let (state, effects) = update(state, Msg::UrlSubmitted("https://b.example.com".to_string()));
    let (state, _) = update(state, Msg::ClearClicked);
    let (state, _) = update(state, Msg::UrlRemoved("https://a.example.com".to_string()));
    let (state, _) = update(state, Msg::QualitySelected(Quality::UpTo480p));

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.urls, vec!["https://a.example.com".to_string()]);
    assert_eq!(view.quality, Quality::UpTo1080p);
}

#[test]
fn batch_events_drive_progress_and_completion() {
    init_logging();
    let (state, _) = start(state_with_urls("https://a.example.com\nhttps://b.example.com\n"));

    let (state, _) = update(state, Msg::Batch(BatchEvent::ItemProgress(40)));
    assert_eq!(state.view().item_percent, 40);

    let (state, _) = update(state, Msg::Batch(BatchEvent::ItemProgress(100)));
    let (state, _) = update(state, Msg::Batch(BatchEvent::OverallProgress(50)));
    let (state, _) = update(
        state,
        Msg::Batch(BatchEvent::ItemFailed(entry("https://b.example.com"))),
    );
    let (state, _) = update(state, Msg::Batch(BatchEvent::OverallProgress(100)));
    let (state, effects) = update(
        state,
        Msg::Batch(BatchEvent::Finished { had_failures: true }),
    );

    assert_eq!(
        effects,
        vec![Effect::Notify(Notice::CompletedWithFailures { failed: 1 })]
    );
    let view = state.view();
    assert_eq!(view.session, SessionState::Finished { had_failures: true });
    assert_eq!(view.overall_percent, 100);
    assert_eq!(view.failed, vec!["https://b.example.com".to_string()]);
    assert!(view.urls.is_empty(), "list is cleared after a run");
}

#[test]
fn clean_finish_allows_a_new_run() {
    init_logging();
    let (state, _) = start(state_with_urls("https://a.example.com\n"));
    let (state, _) = update(state, Msg::Batch(BatchEvent::ItemProgress(100)));
    let (state, _) = update(state, Msg::Batch(BatchEvent::OverallProgress(100)));
    let (state, effects) = update(
        state,
        Msg::Batch(BatchEvent::Finished { had_failures: false }),
    );
    assert_eq!(effects, vec![Effect::Notify(Notice::Completed)]);

    let (state, _) = update(state, Msg::UrlSubmitted("https://a.example.com".to_string()));
    let (state, effects) = start(state);
    assert!(matches!(effects.as_slice(), [Effect::StartBatch(_)]));
    let view = state.view();
    assert_eq!(view.overall_percent, 0, "new run resets progress");
    assert!(view.failed.is_empty());
}

#[test]
fn overall_progress_never_moves_backwards() {
    init_logging();
    let (state, _) = start(state_with_urls("https://a.example.com\n"));
    let (state, _) = update(state, Msg::Batch(BatchEvent::OverallProgress(66)));
    let (state, _) = update(state, Msg::Batch(BatchEvent::OverallProgress(33)));

    assert_eq!(state.view().overall_percent, 66);
}

#[test]
fn failure_log_error_is_surfaced_separately() {
    init_logging();
    let (state, _) = start(state_with_urls("https://a.example.com\n"));
    let (state, effects) = update(
        state,
        Msg::Batch(BatchEvent::FailureLogError {
            path: PathBuf::from("out/failed_downloads.txt"),
            message: "permission denied".to_string(),
        }),
    );

    assert_eq!(
        effects,
        vec![Effect::Notify(Notice::FailureLogLost {
            message: "out/failed_downloads.txt: permission denied".to_string(),
        })]
    );
    assert!(state.view().failure_log_error.is_some());
}

#[test]
fn batch_events_outside_a_run_are_ignored() {
    init_logging();
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::Batch(BatchEvent::ItemProgress(50)));

    assert_eq!(next, state);
    assert!(effects.is_empty());
}

#[test]
fn noop_changes_nothing() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn view_tracks_current_item() {
    init_logging();
    let (state, _) = start(state_with_urls("https://a.example.com\nhttps://b.example.com\n"));
    let view = state.view();
    assert_eq!((view.completed, view.total), (0, 2));
    assert_eq!(view.current_url(), Some("https://a.example.com"));

    let (state, _) = update(state, Msg::Batch(BatchEvent::OverallProgress(50)));
    assert_eq!(state.view().current_url(), Some("https://b.example.com"));

    let (state, _) = update(state, Msg::Batch(BatchEvent::OverallProgress(100)));
    let (state, _) = update(state, Msg::Batch(BatchEvent::Finished { had_failures: false }));
    let view = state.view();
    assert_eq!(view.completed, 2);
    assert_eq!(view.current_url(), None);
}

#[test]
fn pasted_urls_respect_the_youtube_host_preset() {
    init_logging();
    let state = AppState::with_settings(
        HostPolicy::from_hosts(["youtube"]),
        Quality::default(),
        PathBuf::from("out"),
    );
    let (state, effects) = update(
        state,
        Msg::UrlsPasted("https://youtu.be/abc\nhttps://vimeo.com/1\n".to_string()),
    );

    assert_eq!(state.view().urls, vec!["https://youtu.be/abc".to_string()]);
    assert_eq!(
        effects,
        vec![Effect::Notify(Notice::Invalid {
            url: "https://vimeo.com/1".to_string(),
            reason: InvalidReason::HostNotAllowed,
        })]
    );
}
