//! Sequential batch processing.
//!
//! One batch run walks the input list in order, transforms each file, and
//! tallies outcomes. A single file's failure never stops the run; only
//! pre-flight validation does. Progress is pushed through a caller-supplied
//! sink after every file, and the final result is delivered to the sink
//! exactly once when the loop ends, whether it ran to exhaustion or was
//! cancelled.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::error::ValidationError;
use crate::settings::ProcessingSettings;
use crate::transform::TransformEngine;

/// Snapshot emitted after each file, successful or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Files finished so far, counting from 1.
    pub completed: usize,
    /// Total files in this run.
    pub total: usize,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    /// Files transformed and written.
    pub succeeded: usize,
    /// Files that failed to decode, encode, or write.
    pub failed: usize,
    /// Where outputs were written.
    pub output_dir: PathBuf,
}

/// Receiver for batch notifications. The worker thread owns the sink for
/// the duration of the run.
pub trait ProgressSink: Send {
    /// Called after each file, in input order.
    fn on_progress(&self, event: ProgressEvent);

    /// Called exactly once when the run ends (exhaustion or cancellation).
    fn on_complete(&self, result: &BatchResult);
}

/// Shared cooperative cancellation flag.
///
/// The interactive side calls [`CancelFlag::cancel`]; the worker observes
/// the flag before starting each file and clears it when the run ends.
/// Cancellation never interrupts a file mid-transform.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A fresh, unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation before the next file starts.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Reset the flag so the handle can be reused for another run.
    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Pre-flight checks shared by [`run_batch`] and front-ends that want to
/// reject bad input before spawning a worker.
pub fn validate_run(
    paths: &[PathBuf],
    output_dir: &Path,
    settings: &ProcessingSettings,
) -> Result<(), ValidationError> {
    if paths.is_empty() {
        return Err(ValidationError::NoInputs);
    }
    if output_dir.as_os_str().is_empty() {
        return Err(ValidationError::NoOutputFolder);
    }
    settings.validate()
}

/// Process `paths` in order, writing outputs to `output_dir`.
///
/// Validation failures abort before any file is touched and before any sink
/// notification. After that, each file's outcome is tallied and reported;
/// the partial result of a cancelled run is returned as-is, with no rollback
/// of files already written.
pub fn run_batch(
    paths: &[PathBuf],
    output_dir: &Path,
    settings: ProcessingSettings,
    cancel: &CancelFlag,
    sink: &dyn ProgressSink,
) -> Result<BatchResult, ValidationError> {
    validate_run(paths, output_dir, &settings)?;
    let engine = TransformEngine::new(settings)?;

    let total = paths.len();
    let mut result = BatchResult {
        succeeded: 0,
        failed: 0,
        output_dir: output_dir.to_path_buf(),
    };
    info!(
        total,
        mode = %engine.settings().mode,
        format = %engine.settings().format,
        output_dir = %output_dir.display(),
        "starting batch"
    );

    for (index, path) in paths.iter().enumerate() {
        if cancel.is_cancelled() {
            info!(completed = index, total, "batch cancelled");
            break;
        }
        match engine.process_one(path, output_dir) {
            Ok(written) => {
                result.succeeded += 1;
                debug!(input = %path.display(), output = %written.display(), "processed");
            }
            Err(err) => {
                result.failed += 1;
                warn!(input = %path.display(), error = %err, "file failed");
            }
        }
        sink.on_progress(ProgressEvent {
            completed: index + 1,
            total,
        });
    }

    cancel.clear();
    info!(
        succeeded = result.succeeded,
        failed = result.failed,
        "batch finished"
    );
    sink.on_complete(&result);
    Ok(result)
}
