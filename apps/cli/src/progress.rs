//! Spinner-based pipeline progress.

use camara_core::{ProgressReporter, Step};
use indicatif::{ProgressBar, ProgressStyle};

/// CLI progress reporter using an indicatif spinner.
pub(crate) struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    pub(crate) fn new(message: &str) -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    pub(crate) fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn stage(&self, index: usize, total: usize, steps: &[Step]) {
        let names: Vec<&str> = steps.iter().map(Step::as_str).collect();
        self.spinner
            .set_message(format!("[{index}/{total}] {}", names.join(", ")));
    }

    fn step_done(&self, step: Step, ok: bool) {
        if !ok {
            self.spinner.println(format!("  ✗ {step} failed"));
        }
    }

    // Leaves the spinner running; `finish` clears it.
    fn done(&self, failures: usize) {
        match failures {
            0 => self.spinner.set_message("done"),
            n => self.spinner.set_message(format!("done, {n} part(s) failed")),
        }
    }
}
