//! Worker threads for batch burns

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Instant;

use tracing::{debug, warn};

use super::{BurnJob, JobResult};
use crate::burn::AnnotationBurner;

/// Runs `jobs` on `num_workers` threads and returns one result per job, in
/// submission order.
pub(super) fn run_jobs(
    jobs: Vec<BurnJob>,
    burner: Arc<AnnotationBurner>,
    num_workers: usize,
    cancelled: Arc<AtomicBool>,
    stop_on_error: bool,
) -> Vec<JobResult> {
    let names: Vec<String> = jobs.iter().map(|job| job.name.clone()).collect();

    let (job_sender, job_receiver) = mpsc::channel::<(usize, BurnJob)>();
    let job_receiver = Arc::new(Mutex::new(job_receiver));
    let (result_sender, result_receiver) = mpsc::channel::<(usize, JobResult)>();

    for (idx, job) in jobs.into_iter().enumerate() {
        if job_sender.send((idx, job)).is_err() {
            break;
        }
    }
    drop(job_sender);

    let workers: Vec<_> = (0..num_workers.clamp(1, names.len().max(1)))
        .map(|id| {
            let receiver = Arc::clone(&job_receiver);
            let sender = result_sender.clone();
            let burner = Arc::clone(&burner);
            let cancelled = Arc::clone(&cancelled);
            thread::spawn(move || {
                work(id, receiver, sender, burner, cancelled, stop_on_error)
            })
        })
        .collect();
    drop(result_sender);

    let mut results: Vec<Option<JobResult>> = names.iter().map(|_| None).collect();
    for (idx, result) in result_receiver {
        results[idx] = Some(result);
    }

    for worker in workers {
        if worker.join().is_err() {
            warn!("A batch worker panicked");
        }
    }

    results
        .into_iter()
        .zip(names)
        .map(|(result, job_name)| {
            result.unwrap_or(JobResult::Failed {
                job_name,
                duration: Default::default(),
                error: "worker terminated before reporting".to_string(),
            })
        })
        .collect()
}

fn work(
    id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<(usize, BurnJob)>>>,
    sender: mpsc::Sender<(usize, JobResult)>,
    burner: Arc<AnnotationBurner>,
    cancelled: Arc<AtomicBool>,
    stop_on_error: bool,
) {
    loop {
        let message = match receiver.lock() {
            Ok(receiver) => receiver.recv(),
            Err(_) => break,
        };
        let Ok((idx, job)) = message else {
            break;
        };

        let result = if cancelled.load(Ordering::SeqCst) {
            JobResult::Cancelled { job_name: job.name }
        } else {
            debug!("Worker {} burning {}", id, job.input.display());
            let start = Instant::now();
            match burner.burn_file(&job.input, &job.records, &job.output) {
                Ok(report) => JobResult::Success {
                    job_name: job.name,
                    duration: start.elapsed(),
                    output: job.output,
                    report,
                },
                Err(e) => {
                    warn!("Burning {} failed: {}", job.input.display(), e);
                    if stop_on_error {
                        cancelled.store(true, Ordering::SeqCst);
                    }
                    JobResult::Failed {
                        job_name: job.name,
                        duration: start.elapsed(),
                        error: e.to_string(),
                    }
                }
            }
        };

        if sender.send((idx, result)).is_err() {
            break;
        }
    }
}
