//! CLI presenter for output formatting

use std::sync::Mutex;
use std::time::Duration as StdDuration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::ports::BusyIndicator;
use crate::domain::conversion::ConversionResult;
use crate::domain::recording::{Duration, ElapsedTime};

const SPINNER_TICK: StdDuration = StdDuration::from_millis(80);

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn new_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(SPINNER_TICK);
    spinner
}

/// Presenter for CLI output formatting
#[derive(Default)]
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        self.stop_spinner();
        self.spinner = Some(new_spinner(message));
    }

    /// Handle to the running spinner, for updates from other tasks
    pub fn spinner_handle(&self) -> Option<ProgressBar> {
        self.spinner.clone()
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Spinner line shown while recording
    pub fn format_recording(&self, elapsed: ElapsedTime, max: Duration) -> String {
        format!(
            "{} {} / {}  {}",
            "Recording".red().bold(),
            elapsed,
            ElapsedTime::from_std(max.as_std()),
            "(Enter to stop)".dimmed()
        )
    }

    /// Print the conversion result. The download link goes to stdout.
    pub fn conversion_result(&self, result: &ConversionResult, download_url: Option<&str>) {
        self.success("Conversion complete");
        if let Some(filename) = result.filename.as_deref() {
            self.detail("File", filename);
        }
        if let Some(size) = result.file_size_label.as_deref() {
            self.detail("Size", size);
        }
        if let Some(format) = result.resolved_format.as_deref() {
            let quality = result
                .resolved_quality
                .as_deref()
                .map(|q| format!(" @ {}", q))
                .unwrap_or_default();
            self.detail("Format", &format!("{}{}", format.to_uppercase(), quality));
        }
        if let Some(url) = download_url {
            self.output(url);
        }
    }

    fn detail(&self, label: &str, value: &str) {
        eprintln!("  {} {}", format!("{}:", label).dimmed(), value);
    }
}

/// Busy indicator drawn as a terminal spinner
#[derive(Default)]
pub struct SpinnerIndicator {
    active: Mutex<Option<ProgressBar>>,
}

impl SpinnerIndicator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BusyIndicator for SpinnerIndicator {
    fn show(&self, message: &str) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = active.replace(new_spinner(message)) {
            previous.finish_and_clear();
        }
    }

    fn clear(&self) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(spinner) = active.take() {
            spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_recording_at_start() {
        let presenter = Presenter::new();
        let line = presenter.format_recording(ElapsedTime::default(), Duration::from_secs(600));
        assert!(line.contains("00:00 / 10:00"));
    }

    #[test]
    fn format_recording_past_an_hour() {
        let presenter = Presenter::new();
        let line = presenter.format_recording(
            ElapsedTime::from_millis(61 * 60_000 + 5_000),
            Duration::from_secs(7200),
        );
        assert!(line.contains("61:05 / 120:00"));
    }

    #[test]
    fn spinner_indicator_clear_is_idempotent() {
        let indicator = SpinnerIndicator::new();
        indicator.clear();
        indicator.show("Converting audio...");
        indicator.clear();
        indicator.clear();
        assert!(indicator.active.lock().unwrap().is_none());
    }
}
