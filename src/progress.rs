//! Spinner shown while hosts are being queried

use colored::Colorize;
use fanout::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner whose message counts down the hosts still outstanding
pub struct HostSpinner {
    pb: ProgressBar,
    message: fn(usize) -> String,
}

impl HostSpinner {
    /// `message` renders the spinner text for a number of outstanding hosts
    pub fn new(message: fn(usize) -> String, hidden: bool) -> Self {
        let pb = if hidden {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb
        };
        Self { pb, message }
    }
}

impl ProgressCallback for HostSpinner {
    fn on_start(&mut self, total: usize) {
        self.pb.set_message((self.message)(total));
        self.pb.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_step_complete(&mut self, key: &str, remaining: usize, succeeded: bool) {
        if !succeeded && !self.pb.is_hidden() {
            self.pb
                .suspend(|| println!("  {} {}", "✗".red(), key.dimmed()));
        }
        self.pb.set_message((self.message)(remaining));
    }

    fn on_finish(&mut self) {
        self.pb.finish_and_clear();
    }
}
