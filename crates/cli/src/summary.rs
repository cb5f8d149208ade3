//! End-of-run reporting.

use std::path::PathBuf;
use std::time::Duration;

use crate::output::Status;

/// What a finished batch run looked like, for terminal reporting.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Files written successfully.
    pub succeeded: usize,
    /// Files that could not be processed.
    pub failed: usize,
    /// Files the run was asked to process.
    pub total: usize,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
    /// Folder outputs were written to.
    pub output_dir: PathBuf,
}

impl RunSummary {
    /// True when the run stopped before reaching every input.
    pub fn cancelled(&self) -> bool {
        self.succeeded + self.failed < self.total
    }

    /// Print the summary with status markers.
    pub fn print(&self) {
        if self.cancelled() {
            Status::warning(format!(
                "Cancelled after {} of {}",
                self.succeeded + self.failed,
                files(self.total)
            ));
        }
        if self.succeeded > 0 {
            Status::success(format!(
                "Processed {} in {}",
                files(self.succeeded),
                format_elapsed(self.elapsed)
            ));
            Status::info(format!("Output folder: {}", self.output_dir.display()));
        }
        if self.failed > 0 {
            Status::error(format!("{} could not be processed", files(self.failed)));
        }
    }
}

/// Wall-clock time at summary resolution: milliseconds under a second,
/// tenths of a second under a minute, zero-padded seconds beyond.
fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    if millis < 1000 {
        format!("{millis}ms")
    } else if millis < 60_000 {
        format!("{:.1}s", millis as f64 / 1000.0)
    } else {
        let secs = elapsed.as_secs();
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}

fn files(count: usize) -> String {
    if count == 1 {
        "1 file".to_string()
    } else {
        format!("{count} files")
    }
}
