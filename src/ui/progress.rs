use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Neutral "Loading..." spinner shown while a view waits on the API or the
/// route guard waits for the session to settle.
///
/// Drawn on stderr and hidden entirely when stderr is not a terminal, so
/// piped output stays clean.
pub struct LoadingIndicator {
    bar: ProgressBar,
}

impl LoadingIndicator {
    pub fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for LoadingIndicator {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
