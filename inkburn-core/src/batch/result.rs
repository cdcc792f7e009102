//! Results and summaries for batch burns

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::burn::BurnReport;

/// Outcome of one document in a batch
#[derive(Debug, Clone)]
pub enum JobResult {
    Success {
        job_name: String,
        duration: Duration,
        output: PathBuf,
        report: BurnReport,
    },

    Failed {
        job_name: String,
        duration: Duration,
        error: String,
    },

    /// Never started because the batch was cancelled
    Cancelled { job_name: String },
}

impl JobResult {
    pub fn is_success(&self) -> bool {
        matches!(self, JobResult::Success { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, JobResult::Failed { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, JobResult::Cancelled { .. })
    }

    pub fn job_name(&self) -> &str {
        match self {
            JobResult::Success { job_name, .. }
            | JobResult::Failed { job_name, .. }
            | JobResult::Cancelled { job_name } => job_name,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        match self {
            JobResult::Success { duration, .. } | JobResult::Failed { duration, .. } => {
                Some(*duration)
            }
            JobResult::Cancelled { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            JobResult::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn output(&self) -> Option<&Path> {
        match self {
            JobResult::Success { output, .. } => Some(output),
            _ => None,
        }
    }

    pub fn report(&self) -> Option<&BurnReport> {
        match self {
            JobResult::Success { report, .. } => Some(report),
            _ => None,
        }
    }
}

impl fmt::Display for JobResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobResult::Success {
                job_name,
                duration,
                report,
                ..
            } => {
                write!(
                    f,
                    "✓ {} - burned {} page(s) in {:.2}s",
                    job_name,
                    report.pages_burned(),
                    duration.as_secs_f64()
                )?;
                if !report.skipped.is_empty() {
                    write!(f, ", {} record(s) skipped", report.skipped.len())?;
                }
                Ok(())
            }
            JobResult::Failed {
                job_name,
                duration,
                error,
            } => {
                write!(
                    f,
                    "✗ {job_name} - failed after {:.2}s: {error}",
                    duration.as_secs_f64()
                )
            }
            JobResult::Cancelled { job_name } => {
                write!(f, "⚠ {job_name} - cancelled")
            }
        }
    }
}

/// Summary of a batch run
#[derive(Debug)]
pub struct BatchSummary {
    pub total_jobs: usize,
    pub successful: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub duration: Duration,
    /// One entry per job, in submission order
    pub results: Vec<JobResult>,
}

impl BatchSummary {
    pub fn empty() -> Self {
        Self {
            total_jobs: 0,
            successful: 0,
            failed: 0,
            cancelled: false,
            duration: Duration::from_secs(0),
            results: Vec::new(),
        }
    }

    pub fn from_results(results: Vec<JobResult>, cancelled: bool, duration: Duration) -> Self {
        Self {
            total_jobs: results.len(),
            successful: results.iter().filter(|r| r.is_success()).count(),
            failed: results.iter().filter(|r| r.is_failed()).count(),
            cancelled,
            duration,
            results,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_jobs == 0 {
            100.0
        } else {
            (self.successful as f64 / self.total_jobs as f64) * 100.0
        }
    }

    pub fn average_duration(&self) -> Option<Duration> {
        let durations: Vec<_> = self.results.iter().filter_map(|r| r.duration()).collect();

        if durations.is_empty() {
            None
        } else {
            let total: Duration = durations.iter().sum();
            Some(total / durations.len() as u32)
        }
    }

    pub fn outputs(&self) -> Vec<&Path> {
        self.results.iter().filter_map(|r| r.output()).collect()
    }

    pub fn format_report(&self) -> String {
        let mut report = format!(
            "Batch Burn Summary\n\
             ==================\n\
             Documents: {}\n\
             Burned: {} ({:.1}%)\n\
             Failed: {}\n\
             Duration: {:.2}s\n",
            self.total_jobs,
            self.successful,
            self.success_rate(),
            self.failed,
            self.duration.as_secs_f64()
        );

        if let Some(avg) = self.average_duration() {
            report.push_str(&format!("Average Duration: {:.2}s\n", avg.as_secs_f64()));
        }

        if self.cancelled {
            report.push_str("\n⚠️  Batch was cancelled\n");
        }

        let failed: Vec<_> = self.results.iter().filter(|r| r.is_failed()).collect();
        if !failed.is_empty() {
            report.push_str("\nFailed Documents:\n");
            for job in failed {
                report.push_str(&format!("  - {job}\n"));
            }
        }

        report
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_report())
    }
}
