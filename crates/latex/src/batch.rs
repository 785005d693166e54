//! Parallel conversion of independent documents.

use crate::Workspace;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;
use texmark_core::TexmarkError;

/// One document to convert: input and output, relative to the workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    /// Source markdown path.
    pub input: PathBuf,
    /// Destination LaTeX path.
    pub output: PathBuf,
}

impl BatchJob {
    /// Creates a job with an explicit output path.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }

    /// Creates a job writing next to the input with a `.tex` extension.
    pub fn beside(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let output = input.with_extension("tex");
        Self { input, output }
    }
}

/// Result for a single job in a batch.
#[derive(Debug)]
pub struct BatchResult {
    /// The job this result belongs to.
    pub job: BatchJob,
    /// Written path on success.
    pub output: Result<PathBuf, TexmarkError>,
}

/// Statistics for batch processing.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStats {
    /// Total number of jobs.
    pub total: u32,
    /// Number of successful conversions.
    pub succeeded: u32,
    /// Number of failed conversions.
    pub failed: u32,
    /// Total processing time in milliseconds.
    pub processing_time_ms: f64,
}

/// Options for batch processing.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Maximum number of threads to use. Defaults to number of CPU cores.
    pub max_threads: Option<usize>,
    /// Whether to continue processing after an error. Defaults to true.
    pub continue_on_error: Option<bool>,
}

/// Results in job order, plus statistics.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Individual results for each job that ran.
    pub results: Vec<BatchResult>,
    /// Processing statistics.
    pub stats: BatchStats,
}

impl BatchOutcome {
    /// Whether every job that ran succeeded.
    pub fn is_success(&self) -> bool {
        self.stats.failed == 0
    }
}

/// Converts every job against `workspace`.
///
/// Jobs share no state, so they run on the rayon pool. With
/// `continue_on_error = false` jobs run in order and stop at the first
/// failure.
pub fn convert_batch(
    workspace: &Workspace,
    jobs: Vec<BatchJob>,
    options: &BatchOptions,
) -> BatchOutcome {
    let start = Instant::now();
    let continue_on_error = options.continue_on_error.unwrap_or(true);

    // Configure thread pool if max_threads is specified
    let pool = options.max_threads.and_then(|max_threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(max_threads)
            .build()
            .ok()
    });

    let total = jobs.len() as u32;
    let succeeded = AtomicU32::new(0);
    let failed = AtomicU32::new(0);

    let process_job = |job: BatchJob| -> BatchResult {
        let output = workspace.convert_file(&job.input, &job.output);
        match &output {
            Ok(_) => {
                succeeded.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                log::warn!("failed to convert {}: {e}", job.input.display());
                failed.fetch_add(1, Ordering::Relaxed);
            }
        }
        BatchResult { job, output }
    };

    let results: Vec<BatchResult> = if continue_on_error {
        match pool {
            Some(pool) => pool.install(|| jobs.into_par_iter().map(process_job).collect()),
            None => jobs.into_par_iter().map(process_job).collect(),
        }
    } else {
        let mut results = Vec::with_capacity(jobs.len());
        for job in jobs {
            let result = process_job(job);
            let had_error = result.output.is_err();
            results.push(result);
            if had_error {
                break;
            }
        }
        results
    };

    let stats = BatchStats {
        total,
        succeeded: succeeded.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
        processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
    };
    log::debug!(
        "batch finished: {}/{} succeeded in {:.1}ms",
        stats.succeeded,
        stats.total,
        stats.processing_time_ms
    );
    BatchOutcome { results, stats }
}
