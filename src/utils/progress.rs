//! Progress indicators for long-running operations

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate operations
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("Failed to create spinner template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Spinner shown while a cluster operation runs
pub struct OperationProgress {
    pb: ProgressBar,
}

impl OperationProgress {
    pub fn new(message: &str) -> Self {
        Self {
            pb: create_spinner(message),
        }
    }

    pub fn set_step(&self, step: &str) {
        self.pb.set_message(step.to_string());
    }

    pub fn finish_success(&self, message: &str) {
        self.pb.finish_with_message(format!("✓ {}", message));
    }

    pub fn finish_error(&self, message: &str) {
        self.pb.finish_with_message(format!("✗ {}", message));
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_spinner() {
        let pb = create_spinner("Test operation");
        assert!(pb.message().contains("Test operation"));
        pb.finish_and_clear();
    }

    #[test]
    fn test_operation_progress() {
        let progress = OperationProgress::new("Collecting");
        progress.set_step("Collecting pod logs");
        progress.finish();
    }
}
