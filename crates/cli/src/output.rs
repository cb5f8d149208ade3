//! Status line output for the pixmill front-end.
//!
//! Glyph-prefixed one-liners plus a section header. Success and info lines
//! go to stdout; warnings and errors go to stderr so piped output stays
//! clean.

use owo_colors::OwoColorize;

/// Glyph-prefixed status lines.
pub struct Status;

impl Status {
    /// Green check line on stdout.
    pub fn success(message: impl AsRef<str>) {
        println!("{} {}", "✓".green().bold(), message.as_ref());
    }

    /// Red cross line on stderr.
    pub fn error(message: impl AsRef<str>) {
        eprintln!("{} {}", "✗".red().bold(), message.as_ref());
    }

    /// Yellow warning line on stderr.
    pub fn warning(message: impl AsRef<str>) {
        eprintln!("{} {}", "⚠".yellow().bold(), message.as_ref());
    }

    /// Blue note line on stdout.
    pub fn info(message: impl AsRef<str>) {
        println!("{} {}", "ℹ".blue().bold(), message.as_ref());
    }

    /// Bold title with an underline matching the title's width.
    pub fn header(title: impl AsRef<str>) {
        let title = title.as_ref();
        println!();
        println!("{}", title.bold());
        println!("{}", underline(title));
    }
}

/// Underline sized by character count, not byte length, so non-ASCII
/// titles line up.
fn underline(title: &str) -> String {
    "─".repeat(title.chars().count())
}
