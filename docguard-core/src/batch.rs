// docguard-core/src/batch.rs
//! Bounded parallel redaction of independent documents.
//!
//! Pages stay sequential within one request (later stages depend on that
//! request's detection results), but independent documents are embarrassingly
//! parallel: the engine is immutable and every request owns its own state.
//! The pool bounds concurrency with a semaphore and runs each request's
//! blocking page work on the blocking thread pool.
//!
//! Output discipline: each job writes to a unique, request-scoped temp name
//! and renames into place only on success. There is no cooperative mid-page
//! cancellation; a request that finishes over its time budget has its output
//! discarded rather than returned.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{error, info};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::document::TextDocument;
use crate::engine::AnalyzerEngine;
use crate::errors::DocGuardError;
use crate::redactors::document_redactor::{
    DocumentRedactor, RedactionOptions, RedactionReport,
};

/// One input/output pair to redact.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Pool configuration for one batch.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Concurrent requests in flight; sized to CPU/OCR resources.
    pub max_workers: usize,
    /// Per-request time budget. Over-budget output is discarded.
    pub timeout: Option<Duration>,
    pub redaction: RedactionOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            timeout: None,
            redaction: RedactionOptions::default(),
        }
    }
}

/// Per-job outcome; failures never abort the other jobs in the batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: Result<RedactionReport, DocGuardError>,
}

/// Redacts every job, at most `max_workers` concurrently.
pub async fn redact_files(
    engine: Arc<AnalyzerEngine>,
    jobs: Vec<BatchJob>,
    opts: BatchOptions,
) -> Vec<BatchOutcome> {
    let semaphore = Arc::new(Semaphore::new(opts.max_workers.max(1)));
    let mut handles = Vec::with_capacity(jobs.len());

    for job in jobs {
        let engine = Arc::clone(&engine);
        let semaphore = Arc::clone(&semaphore);
        let redaction = opts.redaction.clone();
        let timeout = opts.timeout;

        handles.push(tokio::spawn(async move {
            let input = job.input.clone();
            let output = job.output.clone();

            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => {
                    let worker_input = input.clone();
                    let worker_output = output.clone();
                    match tokio::task::spawn_blocking(move || {
                        run_job(&engine, &worker_input, &worker_output, &redaction, timeout)
                    })
                    .await
                    {
                        Ok(result) => result,
                        Err(e) => Err(DocGuardError::AnyhowWrapper(anyhow::anyhow!(
                            "worker task failed: {e}"
                        ))),
                    }
                }
                Err(_) => Err(DocGuardError::AnyhowWrapper(anyhow::anyhow!(
                    "worker pool shut down"
                ))),
            };

            if let Err(e) = &result {
                error!("redaction of {} failed: {e}", input.display());
            }

            BatchOutcome {
                input,
                output,
                result,
            }
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => error!("batch worker panicked: {e}"),
        }
    }
    outcomes
}

/// Blocking body of one request: load, redact, stage, commit.
fn run_job(
    engine: &AnalyzerEngine,
    input: &Path,
    output: &Path,
    opts: &RedactionOptions,
    timeout: Option<Duration>,
) -> Result<RedactionReport, DocGuardError> {
    let started = Instant::now();

    let mut doc = TextDocument::load(input)?;
    let redactor = DocumentRedactor::new(engine)?;
    let report = redactor.redact_document(&mut doc, opts)?;

    let staged = staged_path(output);
    if let Err(e) = doc.save(&staged) {
        let _ = std::fs::remove_file(&staged);
        return Err(e);
    }

    if let Some(budget) = timeout {
        if started.elapsed() > budget {
            let _ = std::fs::remove_file(&staged);
            return Err(DocGuardError::Timeout(budget));
        }
    }

    if let Err(e) = std::fs::rename(&staged, output) {
        let _ = std::fs::remove_file(&staged);
        return Err(e.into());
    }
    info!(
        "redacted {} -> {} ({} region(s))",
        input.display(),
        output.display(),
        report.regions_redacted
    );
    Ok(report)
}

/// Unique, request-scoped staging name in the output's directory, so
/// concurrent requests never collide.
fn staged_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "output".into());
    name.push(format!(".{}.tmp", Uuid::new_v4()));
    output.with_file_name(name)
}
