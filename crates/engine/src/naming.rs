//! Output file naming.
//!
//! Base names come from a template with four recognized placeholders:
//! `{filename}` (source stem), `{operation}` (mode name), `{timestamp}`
//! (run timestamp), `{format}` (lowercase target format). Unknown
//! placeholders are left verbatim. The lowercase format extension is
//! appended after substitution. Name collisions are not uniquified; the
//! last write wins.

use chrono::Local;

use crate::format::OutputFormat;
use crate::settings::Mode;

/// Timestamp for the `{timestamp}` placeholder, captured once per run.
pub(crate) fn run_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Substitute the recognized placeholders into `pattern`.
pub(crate) fn render_base(
    pattern: &str,
    stem: &str,
    mode: Mode,
    timestamp: &str,
    format: OutputFormat,
) -> String {
    pattern
        .replace("{filename}", stem)
        .replace("{operation}", mode.as_str())
        .replace("{timestamp}", timestamp)
        .replace("{format}", format.extension())
}

/// Full output file name: rendered base plus `.` and the format extension.
pub(crate) fn output_file_name(
    pattern: &str,
    stem: &str,
    mode: Mode,
    timestamp: &str,
    format: OutputFormat,
) -> String {
    format!(
        "{}.{}",
        render_base(pattern, stem, mode, timestamp, format),
        format.extension()
    )
}
