// file: src/utils/progress.rs
// description: terminal spinner that reports search threshold relaxation
// reference: uses indicatif for progress display

use crate::client::{RelaxEvent, SearchObserver};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct RelaxSpinner {
    bar: ProgressBar,
}

impl RelaxSpinner {
    pub fn new(query: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(format!("Searching for \"{}\"", query));
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Spinner that draws nothing, for non-interactive output.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl SearchObserver for RelaxSpinner {
    fn on_relax(&self, event: &RelaxEvent) {
        self.bar.set_message(format!(
            "No results at {:.2}, trying {:.2} (attempt {})",
            event.from,
            event.to,
            event.attempt + 1
        ));
    }
}

impl Drop for RelaxSpinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
