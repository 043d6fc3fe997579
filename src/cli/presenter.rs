//! CLI presenter for output formatting

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::SessionSnapshot;
use crate::domain::recording::Duration;
use crate::domain::session::RecordingPhase;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.red} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
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
        } else {
            self.success(message);
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        } else {
            self.error(message);
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
        self.eprint(format!("{} {}", "ℹ".cyan(), message));
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        self.eprint(format!("{} {}", "✓".green(), message));
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        self.eprint(format!("{} {}", "⚠".yellow(), message));
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        self.eprint(format!("{} {}", "✗".red(), message));
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(|| println!("{}", text)),
            None => println!("{}", text),
        }
    }

    /// Keep stderr lines from tearing the live status line
    fn eprint(&self, line: String) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(|| eprintln!("{}", line)),
            None => eprintln!("{}", line),
        }
    }

    /// Format progress toward the max-duration limit
    pub fn format_progress(&self, elapsed_ms: u64, total_ms: u64) -> String {
        let percent = if total_ms > 0 {
            (elapsed_ms as f64 / total_ms as f64 * 100.0).min(100.0)
        } else {
            0.0
        };

        let bar_width = 20;
        let filled = ((percent / 100.0) * bar_width as f64) as usize;
        let empty = bar_width - filled;

        format!(
            "[{}{}] {} / {}",
            "█".repeat(filled).red(),
            "░".repeat(empty),
            Duration::from_millis(elapsed_ms).clock_label(),
            Duration::from_millis(total_ms).clock_label()
        )
    }

    /// One-line live status: phase, clock, limit bar and waveform
    pub fn format_status_line(
        &self,
        snapshot: &SessionSnapshot,
        max_ms: u64,
        waveform: Option<&str>,
    ) -> String {
        let label = match snapshot.phase {
            RecordingPhase::Recording => "REC".red().bold(),
            RecordingPhase::Paused => "PAUSED".yellow().bold(),
            RecordingPhase::Idle => "IDLE".normal(),
        };
        let mut line = format!(
            "{} {}",
            label,
            self.format_progress(snapshot.elapsed_ms, max_ms)
        );
        if let Some(waveform) = waveform {
            line.push(' ');
            line.push_str(&waveform.green().to_string());
        }
        line
    }

    /// Show or refresh the live status line
    pub fn show_recording(&mut self, status: &str) {
        if self.spinner.is_none() {
            self.start_spinner(status);
        } else {
            self.update_spinner(status);
        }
    }

    /// Print a full status report
    pub fn session_status(&self, snapshot: &SessionSnapshot) {
        self.key_value("state", snapshot.phase.as_str());
        self.key_value("format", snapshot.format.as_str());
        self.key_value("elapsed", &snapshot.elapsed_label);
        let artifact = snapshot
            .artifact
            .as_ref()
            .map(|a| format!("{} ({} bytes)", a.suggested_filename(), a.size_bytes()))
            .unwrap_or_else(|| "(none)".to_string());
        self.key_value("recording", &artifact);
        if let Some(error) = &snapshot.error_message {
            self.key_value("error", error);
        }
    }

    /// Print the command reference
    pub fn help(&self, commands: &[(&str, &str)]) {
        for (command, description) in commands {
            self.eprint(format!("  {:<20} {}", command.cyan(), description));
        }
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        self.output(&format!("{}: {}", key.cyan(), value));
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::AudioFormat;

    fn snapshot(phase: RecordingPhase, elapsed_ms: u64) -> SessionSnapshot {
        SessionSnapshot {
            phase,
            format: AudioFormat::RawPcm,
            elapsed_ms,
            elapsed_label: Duration::from_millis(elapsed_ms).clock_label(),
            error_message: None,
            artifact: None,
            captured_samples: 0,
        }
    }

    #[test]
    fn format_progress_at_start() {
        colored::control::set_override(false);
        let presenter = Presenter::new();
        let progress = presenter.format_progress(0, 600_000);
        assert!(progress.contains("00:00 / 10:00"));
    }

    #[test]
    fn format_progress_at_end() {
        colored::control::set_override(false);
        let presenter = Presenter::new();
        let progress = presenter.format_progress(600_000, 600_000);
        assert!(progress.contains("10:00 / 10:00"));
        assert!(!progress.contains('░'));
    }

    #[test]
    fn status_line_shows_phase_and_waveform() {
        colored::control::set_override(false);
        let presenter = Presenter::new();
        let line = presenter.format_status_line(
            &snapshot(RecordingPhase::Paused, 12_000),
            60_000,
            Some("▁▃▅"),
        );
        assert!(line.starts_with("PAUSED"));
        assert!(line.contains("00:12"));
        assert!(line.ends_with("▁▃▅"));
    }
}
