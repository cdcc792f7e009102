mod annotations;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use inkburn::batch::{BatchOptions, BatchProcessor, BurnJob};
use inkburn::{AnnotationBurner, BurnOptions};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::annotations::{annotated_file_name, load_annotations};

#[derive(Parser)]
#[command(
    name = "inkburn",
    about = "Burns ink strokes, erasures, text boxes and sticky notes into PDF pages",
    version,
    author
)]
struct Cli {
    /// Log debug output (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Burn annotations into a single PDF
    Burn {
        /// Input PDF file
        input: PathBuf,

        /// JSON file with an array of page records, or a directory of page records
        #[arg(short, long)]
        annotations: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// JSON file with burn options
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Burn every PDF in a directory
    Batch {
        /// Directory of input PDFs
        pdf_dir: PathBuf,

        /// Root directory holding one annotation directory per PDF stem
        #[arg(short, long)]
        annotations: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Number of worker threads
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Stop starting new documents after the first failure
        #[arg(long)]
        stop_on_error: bool,

        /// JSON file with burn options
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("inkburn=debug,inkburn_cli=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "inkburn=info,inkburn_cli=info".into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_options(config: Option<&Path>) -> Result<BurnOptions> {
    match config {
        Some(path) => BurnOptions::from_json_file(path)
            .with_context(|| format!("Failed to load options from {}", path.display())),
        None => Ok(BurnOptions::default()),
    }
}

fn burn(input: &Path, annotations: &Path, output: &Path, config: Option<&Path>) -> Result<()> {
    let options = load_options(config)?;
    let parsed = load_annotations(annotations)?;
    if !parsed.skipped.is_empty() {
        warn!("{} annotation record(s) could not be parsed", parsed.skipped.len());
    }

    let report = AnnotationBurner::new(options)
        .burn_file(input, &parsed.records, output)
        .with_context(|| format!("Failed to burn annotations into {}", input.display()))?;

    println!("Annotated PDF written to {}", output.display());
    println!("  Pages burned: {}", report.pages_burned());
    println!("  Surviving segments: {}", report.surviving_segments());
    println!("  Sticky notes: {}", report.notes_added());
    for skipped in parsed.skipped.iter().chain(&report.skipped) {
        println!("  Skipped record {}: {}", skipped.index, skipped.reason);
    }
    Ok(())
}

fn batch(
    pdf_dir: &Path,
    annotation_root: &Path,
    output_dir: &Path,
    jobs: Option<usize>,
    stop_on_error: bool,
    config: Option<&Path>,
) -> Result<()> {
    let options = load_options(config)?;

    let mut inputs: Vec<PathBuf> = fs::read_dir(pdf_dir)
        .with_context(|| format!("Failed to list {}", pdf_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    inputs.sort();

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut batch_options = BatchOptions::default()
        .stop_on_error(stop_on_error)
        .with_burn_options(options);
    if let Some(jobs) = jobs {
        batch_options = batch_options.with_parallelism(jobs);
    }
    let mut processor = BatchProcessor::new(batch_options);

    for input in inputs {
        let Some(stem) = input.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        let annotation_dir = annotation_root.join(&stem);
        if !annotation_dir.is_dir() {
            info!("No annotations for {}, skipping", input.display());
            continue;
        }
        let parsed = match load_annotations(&annotation_dir) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Skipping {}: {:#}", input.display(), e);
                continue;
            }
        };
        if parsed.records.is_empty() {
            info!("No usable annotations for {}, skipping", input.display());
            continue;
        }
        let output = output_dir.join(annotated_file_name(&input));
        processor.add_job(BurnJob::new(input, output, parsed.records));
    }

    if processor.job_count() == 0 {
        println!("No annotated documents found in {}", pdf_dir.display());
        return Ok(());
    }

    let summary = processor.execute();
    println!("{summary}");
    for result in summary.results.iter().filter(|r| r.is_success()) {
        println!("  {result}");
    }

    if summary.failed > 0 {
        bail!("{} of {} document(s) failed", summary.failed, summary.total_jobs);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Burn {
            input,
            annotations,
            output,
            config,
        } => burn(&input, &annotations, &output, config.as_deref()),

        Commands::Batch {
            pdf_dir,
            annotations,
            output,
            jobs,
            stop_on_error,
            config,
        } => batch(
            &pdf_dir,
            &annotations,
            &output,
            jobs,
            stop_on_error,
            config.as_deref(),
        ),
    }
}
