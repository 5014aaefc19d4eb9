use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use engine_logging::{engine_error, engine_info, engine_warn};
use tubebatch_core::{update, AppState, Msg, SessionState};
use tubebatch_engine::{
    ensure_output_dir, read_link_file, scan_links_dir, truncate_sources, LinkFile, Orchestrator,
    OrchestratorHandle, OrchestratorSettings, RunError, YtDlpDownloader, FAILURE_LOG_NAME,
};

use super::cli::Cli;
use super::config::{AppConfig, Settings};
use super::effects::EffectRunner;
use super::logging::{self, LOG_FILENAME};
use super::render::Renderer;

pub const EXIT_FAILURES: u8 = 1;
pub const EXIT_FATAL: u8 = 2;

pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let app_dir = app_dir()?;
    let config = AppConfig::load(cli.config.as_deref(), &app_dir)?;
    let settings = Settings::resolve(&cli, config, &app_dir);

    logging::initialize(settings.log_destination, &app_dir.join(LOG_FILENAME));
    engine_info!("tubebatch {} starting in {:?}", env!("CARGO_PKG_VERSION"), app_dir);
    settings.log_summary();

    ensure_output_dir(&settings.output_dir)
        .with_context(|| format!("output directory {}", settings.output_dir.display()))?;

    let orchestrator = Orchestrator::new(
        Arc::new(YtDlpDownloader::new(settings.yt_dlp.clone())),
        OrchestratorSettings {
            filename_template: None,
            cookie_file: Some(settings.cookie_file.clone()),
        },
    );
    let engine = OrchestratorHandle::new(orchestrator).context("starting download worker")?;

    let mut session = Session {
        state: AppState::with_settings(
            settings.host_policy.clone(),
            settings.quality,
            settings.output_dir.clone(),
        ),
        runner: EffectRunner::new(engine),
        renderer: Renderer::new(),
    };

    for url in &cli.urls {
        session.dispatch(Msg::UrlSubmitted(url.clone()))?;
    }
    let mut link_files = Vec::new();
    for path in &cli.inputs {
        link_files.push(
            read_link_file(path).with_context(|| format!("reading {}", path.display()))?,
        );
    }
    if let Some(dir) = &cli.links_dir {
        link_files.extend(
            scan_links_dir(dir).with_context(|| format!("scanning {}", dir.display()))?,
        );
    }
    let sources = session.queue_link_files(link_files)?;

    session.dispatch(Msg::StartClicked)?;
    if session.state.session() != SessionState::Running {
        return Ok(ExitCode::from(EXIT_FATAL));
    }

    while session.state.session() == SessionState::Running {
        let event = session
            .runner
            .next_event()
            .context("download worker stopped before the batch finished")?;
        session.dispatch(Msg::Batch(event))?;
    }

    let view = session.state.view();
    if view.failure_log_error.is_some() {
        engine_error!("Batch finished but failed downloads could not be recorded");
        return Ok(ExitCode::from(EXIT_FATAL));
    }

    if cli.clear_sources && !sources.is_empty() {
        truncate_sources(&sources).context("clearing link files")?;
    }

    match view.session {
        SessionState::Finished { had_failures: true } => {
            println!(
                "{} of {} download(s) failed, see {}",
                view.failed.len(),
                view.total,
                settings.output_dir.join(FAILURE_LOG_NAME).display()
            );
            Ok(ExitCode::from(EXIT_FAILURES))
        }
        _ => {
            println!(
                "{} download(s) saved to {}",
                view.total,
                settings.output_dir.display()
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Directory holding the executable; config, cookies and the log live here.
fn app_dir() -> anyhow::Result<PathBuf> {
    if let Some(dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        return Ok(dir);
    }
    engine_warn!("Could not locate the executable, using the working directory");
    env::current_dir().context("resolving working directory")
}

struct Session {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer,
}

impl Session {
    fn dispatch(&mut self, msg: Msg) -> Result<(), RunError> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.renderer.render(&state.view());
        }
        self.state = state;
        self.runner.enqueue(effects, &self.renderer)
    }

    /// Queues every line of `files`. Returns the files that added at least
    /// one URL to the list.
    fn queue_link_files(&mut self, files: Vec<LinkFile>) -> Result<Vec<PathBuf>, RunError> {
        let mut sources = Vec::new();
        for file in files {
            let before = self.state.registry().len();
            self.dispatch(Msg::UrlsPasted(file.lines.join("\n")))?;
            let added = self.state.registry().len() - before;
            engine_info!("{} new url(s) from {:?}", added, file.path);
            if added > 0 {
                sources.push(file.path);
            }
        }
        Ok(sources)
    }
}
