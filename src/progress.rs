use std::time::{Duration, Instant};

use spinners_rs::{Spinner, Spinners};

// ESEQ is for "escape sequence"
const ESEQ_DELETE_LINE: &str = "\x1b[0J";
const ESEQ_RED: &str = "\x1b[38;5;1m";
const ESEQ_GREEN: &str = "\x1b[38;5;2m";
const ESEQ_WEAK: &str = "\x1b[38;5;240m";
const ESEQ_RESET: &str = "\x1b[m";

const SPINNER_MS: u64 = 50;

/// One spinner line per transfer step, terminated by `success` or `failure`.
pub struct ProgressView {
    task: String,
    spinner: Spinner,
    previous_update: Instant,
}

impl ProgressView {
    pub fn new(task: impl ToString) -> Self {
        let mut spinner = Spinner::new(Spinners::BouncingBar, task.to_string());
        spinner.set_interval(SPINNER_MS);
        spinner.start();

        Self {
            task: task.to_string(),
            spinner,
            previous_update: Instant::now(),
        }
    }

    /// Intermediate counter. Updates are throttled to the spinner's own pace,
    /// so reporting every chunk is fine.
    pub fn report(&mut self, progress: (usize, usize), comment: Option<&str>) {
        if self.previous_update.elapsed() <= Duration::from_millis(SPINNER_MS * 2) {
            return;
        }
        self.previous_update = Instant::now();

        self.spinner.set_message(format!(
            "{ESEQ_DELETE_LINE}[{}/{}] {}{}{ESEQ_RESET}",
            progress.0,
            progress.1,
            self.task,
            comment
                .map(|comment| format!("{ESEQ_WEAK} - {comment}"))
                .unwrap_or_default()
        ));
    }

    pub fn success(&mut self, note: Option<&str>) {
        self.finish(ESEQ_GREEN, '✓', note);
    }

    pub fn failure(&mut self, note: Option<&str>) {
        self.finish(ESEQ_RED, '!', note);
    }

    fn finish(&mut self, color: &str, mark: char, note: Option<&str>) {
        self.spinner.stop_with_message(format!(
            "{ESEQ_DELETE_LINE}{color}{mark} {}{}{ESEQ_RESET}",
            self.task,
            note.map(|note| format!(" - {note}")).unwrap_or_default()
        ));
        println!();
    }
}
