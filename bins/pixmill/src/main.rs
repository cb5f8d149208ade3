//! pixmill - batch image resizing, conversion, and watermarking.
//!
//! Front-end for the pixmill engine: collects input files, runs the batch on
//! a worker thread, and renders progress and the end-of-run summary.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use pixmill_cli::output::Status;
use pixmill_cli::progress;
use pixmill_cli::summary::RunSummary;
use pixmill_engine::{
    BatchResult, CancelFlag, Mode, OutputFormat, ProcessingSettings, ProgressEvent, ProgressSink,
    WatermarkPosition, exit_codes, run_batch, validate_run,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

mod store;

/// File extensions picked up when an input argument is a folder.
const INPUT_EXTENSIONS: [&str; 8] = ["bmp", "gif", "jpeg", "jpg", "png", "tif", "tiff", "webp"];

/// Batch image resizing, conversion, and watermarking
#[derive(Parser)]
#[command(name = "pixmill")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resize, convert, and watermark images
    Process(ProcessArgs),

    /// List supported formats
    Formats,
}

#[derive(Args)]
struct ProcessArgs {
    /// Image files or folders to process
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output folder (defaults to the last one used)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Operation to perform (resize, convert)
    #[arg(short, long, default_value = "resize")]
    mode: Mode,

    /// Resize percentage, 1-500
    #[arg(short, long, default_value = "100")]
    percent: u32,

    /// Exact output width in pixels (use with --height; replaces --percent)
    #[arg(long, requires = "height", conflicts_with = "percent")]
    width: Option<u32>,

    /// Exact output height in pixels (use with --width)
    #[arg(long, requires = "width", conflicts_with = "percent")]
    height: Option<u32>,

    /// Encoder quality, 1-100 (defaults to the stored preference)
    #[arg(short, long)]
    quality: Option<u8>,

    /// Output format (defaults to the stored preference)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Watermark text; empty disables watermarking
    #[arg(long, default_value = "")]
    watermark_text: String,

    /// Watermark anchor (top-left, top-right, bottom-left, bottom-right, center)
    #[arg(long, default_value = "bottom-right")]
    watermark_position: WatermarkPosition,

    /// Watermark opacity, 50-255
    #[arg(long, default_value = "128")]
    watermark_opacity: u8,

    /// Carry EXIF and ICC metadata over to outputs that can hold them
    #[arg(long)]
    preserve_metadata: bool,

    /// Spend extra encoding effort on smaller files
    #[arg(long)]
    optimize: bool,

    /// Output name template ({filename}, {operation}, {timestamp}, {format})
    #[arg(long, default_value = pixmill_engine::DEFAULT_NAMING_PATTERN)]
    naming_pattern: String,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "pixmill=debug,pixmill_engine=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let result = match cli.command {
        Commands::Process(args) => run_process(args),
        Commands::Formats => run_formats(),
    };

    std::process::exit(result);
}

/// Events forwarded from the worker thread to the terminal.
enum UiEvent {
    Progress(ProgressEvent),
    Done(BatchResult),
}

struct ChannelSink(mpsc::Sender<UiEvent>);

impl ProgressSink for ChannelSink {
    fn on_progress(&self, event: ProgressEvent) {
        let _ = self.0.send(UiEvent::Progress(event));
    }

    fn on_complete(&self, result: &BatchResult) {
        let _ = self.0.send(UiEvent::Done(result.clone()));
    }
}

fn run_process(args: ProcessArgs) -> i32 {
    let defaults = store::load();
    let output_dir = args
        .output
        .or(defaults.last_output_folder)
        .unwrap_or_default();
    let settings = ProcessingSettings {
        mode: args.mode,
        percent: args.percent,
        width: args.width,
        height: args.height,
        quality: args.quality.unwrap_or(defaults.default_quality),
        format: args.format.unwrap_or(defaults.default_format),
        watermark_text: args.watermark_text,
        watermark_position: args.watermark_position,
        watermark_opacity: args.watermark_opacity,
        preserve_metadata: args.preserve_metadata,
        optimize_compression: args.optimize,
        naming_pattern: args.naming_pattern,
    };

    let files = collect_inputs(&args.inputs);
    if let Err(err) = validate_run(&files, &output_dir, &settings) {
        Status::error(err.to_string());
        return exit_codes::VALIDATION_ERROR;
    }
    let total = files.len();

    let cancel = CancelFlag::new();
    {
        let handle = cancel.clone();
        if let Err(err) = ctrlc::set_handler(move || handle.cancel()) {
            warn!(error = %err, "Ctrl-C handler unavailable");
        }
    }

    let noun = if total == 1 { "file" } else { "files" };
    Status::header(format!("Processing {total} {noun}"));
    let bar = progress::file_progress(total as u64);
    let started = Instant::now();

    let (tx, rx) = mpsc::channel();
    let worker = {
        let files = files.clone();
        let output_dir = output_dir.clone();
        let settings = settings.clone();
        let cancel = cancel.clone();
        thread::spawn(move || {
            let sink = ChannelSink(tx);
            run_batch(&files, &output_dir, settings, &cancel, &sink)
        })
    };

    for event in rx {
        match event {
            UiEvent::Progress(progress) => bar.set_position(progress.completed as u64),
            UiEvent::Done(result) => {
                if result.succeeded + result.failed < total {
                    progress::finish_cancelled(&bar, "cancelled");
                } else if result.failed == 0 {
                    progress::finish_success(&bar, "done");
                } else {
                    progress::finish_error(&bar, &format!("{} failed", result.failed));
                }
            }
        }
    }

    match worker.join() {
        Ok(Ok(result)) => {
            RunSummary {
                succeeded: result.succeeded,
                failed: result.failed,
                total,
                elapsed: started.elapsed(),
                output_dir: output_dir.clone(),
            }
            .print();

            store::save(&store::StoredDefaults {
                last_output_folder: Some(output_dir),
                default_quality: settings.quality,
                default_format: settings.format,
            });

            if result.failed == 0 {
                exit_codes::SUCCESS
            } else {
                exit_codes::FAILURE
            }
        }
        Ok(Err(err)) => {
            Status::error(err.to_string());
            exit_codes::VALIDATION_ERROR
        }
        Err(_) => {
            Status::error("worker thread panicked");
            exit_codes::FAILURE
        }
    }
}

fn run_formats() -> i32 {
    Status::header("Output formats");
    for format in OutputFormat::ALL {
        println!("  {}", format);
    }
    Status::header("Accepted input extensions");
    println!("  {}", INPUT_EXTENSIONS.join(", "));
    exit_codes::SUCCESS
}

/// Expand folder arguments into their image files; plain files pass through.
///
/// Folder contents are walked recursively and sorted so runs are repeatable.
fn collect_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| has_input_extension(path))
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    files
}

fn has_input_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| INPUT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
