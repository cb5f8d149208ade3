//! Terminal helpers for the pixmill front-end
//!
//! Provides the pieces the binary composes into its interface:
//! - Status line formatting
//! - Batch progress bars
//! - End-of-run summaries

#![warn(missing_docs)]

pub mod output;
pub mod progress;
pub mod summary;
