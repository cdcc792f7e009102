//! Batch burning of many documents
//!
//! Each document is an independent [`BurnJob`]. Jobs run on a fixed pool of
//! worker threads; a failing job is reported in the [`BatchSummary`] and does
//! not stop the others unless `stop_on_error` is set.
//!
//! # Example
//!
//! ```rust,no_run
//! use inkburn::batch::{BatchOptions, BatchProcessor, BurnJob};
//! use inkburn::parse_records;
//!
//! # fn main() -> inkburn::Result<()> {
//! let records = parse_records(&std::fs::read_to_string("essay.json")?)?.records;
//!
//! let mut processor = BatchProcessor::new(BatchOptions::default().with_parallelism(4));
//! processor.add_job(BurnJob::new("essay.pdf", "essay_annotated.pdf", records));
//!
//! let summary = processor.execute();
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::burn::{AnnotationBurner, BurnOptions};
use crate::record::AnnotationRecord;

pub mod result;
mod worker;

pub use result::{BatchSummary, JobResult};

/// One document to burn
#[derive(Debug, Clone)]
pub struct BurnJob {
    pub name: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub records: Vec<AnnotationRecord>,
}

impl BurnJob {
    /// Job named after the input's file name
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        records: Vec<AnnotationRecord>,
    ) -> Self {
        let input = input.into();
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());
        Self {
            name,
            input,
            output: output.into(),
            records,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Number of worker threads
    pub parallelism: usize,
    /// Cancel the jobs not yet started after the first failure
    pub stop_on_error: bool,
    pub burn: BurnOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallelism: num_cpus::get().min(8),
            stop_on_error: false,
            burn: BurnOptions::default(),
        }
    }
}

impl BatchOptions {
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    pub fn stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }

    pub fn with_burn_options(mut self, burn: BurnOptions) -> Self {
        self.burn = burn;
        self
    }
}

pub struct BatchProcessor {
    options: BatchOptions,
    jobs: Vec<BurnJob>,
    cancelled: Arc<AtomicBool>,
}

impl BatchProcessor {
    pub fn new(options: BatchOptions) -> Self {
        Self {
            options,
            jobs: Vec::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn add_job(&mut self, job: BurnJob) {
        self.jobs.push(job);
    }

    pub fn add_jobs(&mut self, jobs: impl IntoIterator<Item = BurnJob>) {
        self.jobs.extend(jobs);
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Jobs that have not started yet are reported as cancelled
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn execute(self) -> BatchSummary {
        let start = Instant::now();
        if self.jobs.is_empty() {
            return BatchSummary::empty();
        }

        info!(
            "Burning {} document(s) on {} worker(s)",
            self.jobs.len(),
            self.options.parallelism
        );
        let burner = Arc::new(AnnotationBurner::new(self.options.burn.clone()));
        let results = worker::run_jobs(
            self.jobs,
            burner,
            self.options.parallelism,
            Arc::clone(&self.cancelled),
            self.options.stop_on_error,
        );

        BatchSummary::from_results(
            results,
            self.cancelled.load(Ordering::SeqCst),
            start.elapsed(),
        )
    }
}
