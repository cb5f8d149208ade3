//! Progress indicators
//!
//! Batch-sized progress bars driven by per-file completion events.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a progress bar for a batch of files
pub fn file_progress(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files ({eta}) {msg}")
            .unwrap()
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Finish a progress bar with a success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {}", message));
}

/// Finish a progress bar with an error message
pub fn finish_error(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✗ {}", message));
}

/// Stop a progress bar at its current position after a cancellation
pub fn finish_cancelled(pb: &ProgressBar, message: &str) {
    pb.abandon_with_message(format!("⚠ {}", message));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_progress_creation() {
        let pb = file_progress(10);
        pb.set_position(4);
        finish_success(&pb, "done");
    }

    #[test]
    fn test_cancelled_keeps_position() {
        let pb = file_progress(10);
        pb.set_position(3);
        finish_cancelled(&pb, "cancelled");
        assert_eq!(pb.position(), 3);
    }
}
