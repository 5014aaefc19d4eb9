use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tubebatch_core::{AppViewModel, Notice, SessionState};

const ITEM_TEMPLATE: &str = "{prefix:>9} [{bar:40.cyan/blue}] {pos:>3}% {wide_msg}";
const OVERALL_TEMPLATE: &str = "{prefix:>9} [{bar:40.green/white}] {pos:>3}% {msg}";

/// Terminal surface: one bar for the current item, one for the batch.
pub struct Renderer {
    multi: MultiProgress,
    bars: Option<Bars>,
    reported_failures: usize,
}

struct Bars {
    item: ProgressBar,
    overall: ProgressBar,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: None,
            reported_failures: 0,
        }
    }

    pub fn render(&mut self, view: &AppViewModel) {
        for url in view.failed.iter().skip(self.reported_failures) {
            self.line(format!("  failed: {url}"));
        }
        self.reported_failures = view.failed.len();

        match view.session {
            SessionState::Running => {
                let bars = self.bars.get_or_insert_with(|| Bars::new(&self.multi));
                bars.item.set_position(u64::from(view.item_percent));
                bars.item
                    .set_message(view.current_url().unwrap_or_default().to_string());
                bars.overall.set_position(u64::from(view.overall_percent));
                bars.overall
                    .set_message(format!("{}/{} done", view.completed, view.total));
            }
            SessionState::Idle | SessionState::Finished { .. } => {
                if let Some(bars) = self.bars.take() {
                    bars.item.finish_and_clear();
                    bars.overall.set_position(u64::from(view.overall_percent));
                    bars.overall
                        .finish_with_message(format!("{}/{} done", view.completed, view.total));
                }
            }
        }
    }

    pub fn notice(&self, notice: &Notice) {
        self.line(describe(notice));
    }

    fn line(&self, text: String) {
        if self.multi.println(&text).is_err() {
            eprintln!("{text}");
        }
    }
}

impl Bars {
    fn new(multi: &MultiProgress) -> Self {
        let item = multi.add(make_bar(ITEM_TEMPLATE, "item"));
        let overall = multi.add(make_bar(OVERALL_TEMPLATE, "overall"));
        Self { item, overall }
    }
}

fn make_bar(template: &str, prefix: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(100);
    let style = ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━━╌");
    bar.set_style(style);
    bar.set_prefix(prefix);
    bar
}

pub fn describe(notice: &Notice) -> String {
    match notice {
        Notice::Duplicate(url) => format!("skipped duplicate: {url}"),
        Notice::Invalid { url, reason } => format!("skipped {url}: {reason}"),
        Notice::NothingToDownload => "nothing to download".to_string(),
        Notice::AlreadyRunning => "a batch is already running".to_string(),
        Notice::Completed => "all downloads finished".to_string(),
        Notice::CompletedWithFailures { failed } => {
            format!("finished with {failed} failed download(s)")
        }
        Notice::FailureLogLost { message } => {
            format!("could not record failed downloads: {message}")
        }
    }
}
