//! # CLI Module
//!
//! Command-line interface for the photo manager.
//!
//! ## Usage
//! ```bash
//! # Summarize a folder
//! photomanager scan ~/Photos
//!
//! # Show where files would go
//! photomanager preview ~/Photos ~/Sorted --pattern "{Year}/{Month}/{Camera}"
//!
//! # Move files, dropping byte-identical copies
//! photomanager organize ~/Photos ~/Sorted --mode move --skip-duplicates
//!
//! # JSON output
//! photomanager scan ~/Photos --output json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_manager::core::config::{parse_extension_list, PhotoManagerConfig, DEFAULT_EXTENSIONS, DEFAULT_PATTERN};
use photo_manager::core::metadata::{PhotoMetadata, ScanSummary};
use photo_manager::core::organize::{OperationType, PhotoOperation};
use photo_manager::core::pipeline::{CancellationToken, Pipeline};
use photo_manager::error::Result;
use photo_manager::events::{Event, EventChannel, EventSender, OrganizeEvent, ScanEvent};
use std::path::{Path, PathBuf};
use std::thread;

/// Operations shown by `preview` and before confirmation
const PREVIEW_LIMIT: usize = 10;

/// Photo Manager - Sort photos into folders by date, place and camera
#[derive(Parser, Debug)]
#[command(name = "photomanager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a folder and summarize its photos
    Scan {
        /// Folder to scan
        source: PathBuf,

        /// Comma separated file extensions
        #[arg(short, long)]
        extensions: Option<String>,

        /// Worker threads (defaults to the number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Show where photos would be placed
    Preview {
        /// Folder to scan
        source: PathBuf,

        /// Root of the organized tree
        destination: PathBuf,

        /// Folder pattern, e.g. "{Year}/{MonthName}/{Camera}"
        #[arg(short, long, default_value = DEFAULT_PATTERN)]
        pattern: String,

        /// Comma separated file extensions
        #[arg(short, long)]
        extensions: Option<String>,

        /// Worker threads (defaults to the number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Copy, move or link photos into an organized tree
    Organize {
        /// Folder to scan
        source: PathBuf,

        /// Root of the organized tree
        destination: PathBuf,

        /// Folder pattern, e.g. "{Year}/{MonthName}/{Camera}"
        #[arg(short, long, default_value = DEFAULT_PATTERN)]
        pattern: String,

        /// How files reach the destination
        #[arg(short, long, default_value = "copy")]
        mode: Mode,

        /// Plan and print without touching any file
        #[arg(long)]
        dry_run: bool,

        /// Keep only the first of each set of identical files
        #[arg(long)]
        skip_duplicates: bool,

        /// Comma separated file extensions
        #[arg(short, long)]
        extensions: Option<String>,

        /// Worker threads (defaults to the number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Copy files (keep originals)
    Copy,
    /// Move files
    Move,
    /// Link to the originals
    Symlink,
}

impl From<Mode> for OperationType {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Copy => OperationType::Copy,
            Mode::Move => OperationType::Move,
            Mode::Symlink => OperationType::Symlink,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Settings shared by every command
struct RunOptions {
    source: PathBuf,
    destination: Option<PathBuf>,
    pattern: String,
    operation: OperationType,
    extensions: Option<String>,
    jobs: Option<usize>,
    dry_run: bool,
    skip_duplicates: bool,
}

impl RunOptions {
    fn scan_only(source: PathBuf, extensions: Option<String>, jobs: Option<usize>) -> Self {
        Self {
            source,
            destination: None,
            pattern: DEFAULT_PATTERN.to_string(),
            operation: OperationType::Copy,
            extensions,
            jobs,
            dry_run: true,
            skip_duplicates: false,
        }
    }

    fn build_pipeline(&self) -> Result<Pipeline> {
        let extensions = match &self.extensions {
            Some(list) => parse_extension_list(list),
            None => DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        };

        let mut builder = PhotoManagerConfig::builder()
            .source_folder(&self.source)
            .organization_pattern(&self.pattern)
            .operation_type(self.operation)
            .file_extensions(extensions)
            .dry_run(self.dry_run);
        if let Some(destination) = &self.destination {
            builder = builder.destination_folder(destination);
        }
        if let Some(jobs) = self.jobs {
            builder = builder.max_parallelism(jobs);
        }

        let config = builder.build()?;
        tracing::debug!(?config, "Configuration");

        Ok(Pipeline::builder()
            .config(config)
            .deduplicate(self.skip_duplicates)
            .build())
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    photo_manager::init_tracing(cli.verbose);

    match cli.command {
        Commands::Scan {
            source,
            extensions,
            jobs,
            output,
        } => run_scan(RunOptions::scan_only(source, extensions, jobs), output),
        Commands::Preview {
            source,
            destination,
            pattern,
            extensions,
            jobs,
        } => run_preview(RunOptions {
            destination: Some(destination),
            pattern,
            ..RunOptions::scan_only(source, extensions, jobs)
        }),
        Commands::Organize {
            source,
            destination,
            pattern,
            mode,
            dry_run,
            skip_duplicates,
            extensions,
            jobs,
            yes,
        } => run_organize(
            RunOptions {
                source,
                destination: Some(destination),
                pattern,
                operation: mode.into(),
                extensions,
                jobs,
                dry_run,
                skip_duplicates,
            },
            yes,
        ),
    }
}

fn run_scan(options: RunOptions, output: OutputFormat) -> Result<()> {
    let term = Term::stderr();
    let pretty = matches!(output, OutputFormat::Pretty);
    if pretty {
        print_header(&term);
    }

    let pipeline = options.build_pipeline()?;
    let cancel = CancellationToken::new();
    let photos = with_progress(pretty, |events| pipeline.scan(events, &cancel))?;

    let summary = ScanSummary::from_photos(&photos);
    let duplicate_groups = pipeline.detect_duplicates(&photos);

    match output {
        OutputFormat::Pretty => {
            print_summary(&term, &summary);
            term.write_line(&format!(
                "  {} duplicate groups",
                style(duplicate_groups.len()).cyan()
            ))
            .ok();
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "summary": summary,
                "duplicate_groups": duplicate_groups.len(),
                "photos": photos,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn run_preview(options: RunOptions) -> Result<()> {
    let term = Term::stderr();
    print_header(&term);

    let pipeline = options.build_pipeline()?;
    let cancel = CancellationToken::new();
    let photos = with_progress(true, |events| pipeline.scan(events, &cancel))?;
    let operations = pipeline.plan(&photos)?;

    print_summary(&term, &ScanSummary::from_photos(&photos));
    print_operations(&term, &operations, pipeline.config().destination_folder());
    Ok(())
}

fn run_organize(options: RunOptions, assume_yes: bool) -> Result<()> {
    let term = Term::stderr();
    print_header(&term);

    let pipeline = options.build_pipeline()?;
    let cancel = CancellationToken::new();

    let scanned = with_progress(true, |events| pipeline.scan(events, &cancel))?;
    let scanned_count = scanned.len();
    let photos = pipeline.prepare(scanned);
    if options.skip_duplicates {
        term.write_line(&format!(
            "  {} duplicates skipped",
            style(scanned_count - photos.len()).yellow()
        ))
        .ok();
    }

    let operations = pipeline.plan(&photos)?;
    let destination = pipeline.config().destination_folder().to_path_buf();
    print_operations(&term, &operations, &destination);

    if operations.is_empty() {
        term.write_line("Nothing to do.").ok();
        return Ok(());
    }

    if pipeline.config().dry_run() {
        term.write_line(&format!(
            "{}",
            style("Dry run: no files were changed.").dim()
        ))
        .ok();
        return Ok(());
    }

    if !assume_yes && !confirm(&term, operations.len(), options.operation)? {
        term.write_line("Aborted.").ok();
        return Ok(());
    }

    let report = with_progress(true, |events| pipeline.execute(&operations, events, &cancel))?;

    term.write_line("").ok();
    term.write_line(&format!("{} Organize Complete", style("✓").green().bold()))
        .ok();
    term.write_line(&format!(
        "  {} files processed in {:.1}s",
        style(report.operations_completed).cyan(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} folders created",
        style(report.folders_created).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} transferred",
        style(format_bytes(report.total_size_bytes)).yellow()
    ))
    .ok();
    if report.already_in_place > 0 {
        term.write_line(&format!(
            "  {} already in place",
            style(report.already_in_place).dim()
        ))
        .ok();
    }

    Ok(())
}

/// Run `stage` while a separate thread turns its events into a progress bar
fn with_progress<T>(enabled: bool, stage: impl FnOnce(&EventSender) -> T) -> T {
    let (sender, receiver) = EventChannel::new();

    let progress = if enabled {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        let Some(pb) = progress_clone else {
            for _ in receiver.iter() {}
            return;
        };
        for event in receiver.iter() {
            match event {
                Event::Scan(ScanEvent::Started { total_files, .. }) => {
                    pb.set_length(total_files as u64);
                    pb.set_position(0);
                    pb.set_message("Scanning");
                }
                Event::Scan(ScanEvent::Progress(p)) => {
                    pb.set_position(p.processed as u64);
                    pb.set_message(file_label(&p.current_path));
                }
                Event::Scan(ScanEvent::Skipped { path }) => {
                    pb.println(format!(
                        "{} skipped {}",
                        style("!").yellow(),
                        path.display()
                    ));
                }
                Event::Organize(OrganizeEvent::Started { total_operations }) => {
                    pb.set_length(total_operations as u64);
                    pb.set_position(0);
                }
                Event::Organize(OrganizeEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    pb.set_message(file_label(&p.current_path));
                }
                _ => {}
            }
        }
    });

    let result = stage(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    result
}

fn confirm(term: &Term, count: usize, operation: OperationType) -> Result<bool> {
    term.write_str(&format!(
        "{} {} files? [y/N] ",
        operation,
        style(count).cyan()
    ))?;
    let answer = term.read_line()?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_header(term: &Term) {
    term.write_line(&format!(
        "{} {}",
        style("Photo Manager").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line("").ok();
}

fn print_summary(term: &Term, summary: &ScanSummary) {
    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();
    term.write_line(&format!(
        "  {} photos ({})",
        style(summary.total_photos).cyan(),
        style(format_bytes(summary.total_size_bytes)).yellow()
    ))
    .ok();
    term.write_line(&format!("  {} with date taken", style(summary.with_date).cyan()))
        .ok();
    term.write_line(&format!("  {} with GPS location", style(summary.with_location).cyan()))
        .ok();
    term.write_line(&format!("  {} with camera info", style(summary.with_camera).cyan()))
        .ok();
}

fn print_operations(term: &Term, operations: &[PhotoOperation], destination: &Path) {
    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style(format!("Planned operations ({}):", operations.len()))
            .bold()
            .underlined()
    ))
    .ok();

    for op in operations.iter().take(PREVIEW_LIMIT) {
        let target = op
            .destination_path
            .strip_prefix(destination)
            .unwrap_or(&op.destination_path);
        let detail = op
            .metadata
            .as_deref()
            .map(photo_detail)
            .unwrap_or_default();

        term.write_line(&format!(
            "  {:<8} {} {} {}{}",
            style(op.operation).dim(),
            file_label(&op.source_path),
            style("->").dim(),
            target.display(),
            detail
        ))
        .ok();
    }

    if operations.len() > PREVIEW_LIMIT {
        term.write_line(&format!(
            "  {}",
            style(format!("... and {} more", operations.len() - PREVIEW_LIMIT)).dim()
        ))
        .ok();
    }
    term.write_line("").ok();
}

fn photo_detail(photo: &PhotoMetadata) -> String {
    let parts: Vec<String> = [photo.camera_display(), photo.dimensions_display()]
        .into_iter()
        .flatten()
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!(" {}", style(format!("({})", parts.join(", "))).dim())
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
