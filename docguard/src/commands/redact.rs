// docguard/src/commands/redact.rs
//! The `redact` and `redact-literals` commands.
//!
//! `redact` fans documents out over the core worker pool: each input is an
//! independent request with its own staged output. `redact-literals` is the
//! analysis-free single-document path.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;

use docguard_core::batch::{redact_files, BatchJob, BatchOptions};
use docguard_core::{
    AnalyzerEngine, DocumentRedactor, RedactionOptions, RedactionReport, TextDocument,
};

use crate::cli::{RedactCommand, RedactLiteralsCommand};

#[derive(Serialize)]
struct JobSummary {
    input: PathBuf,
    output: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<RedactionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn run(engine: Arc<AnalyzerEngine>, cmd: &RedactCommand) -> Result<()> {
    let jobs = plan_jobs(cmd)?;

    let redaction = RedactionOptions {
        language: cmd.language.clone(),
        style: cmd.style.into(),
        extra_keywords: cmd.keywords.clone(),
        custom_regex: cmd.regex.clone(),
        entity_types: if cmd.entities.is_empty() {
            None
        } else {
            Some(cmd.entities.clone())
        },
        ..Default::default()
    };

    let mut options = BatchOptions {
        timeout: cmd.timeout_secs.map(Duration::from_secs),
        redaction,
        ..Default::default()
    };
    if let Some(workers) = cmd.workers {
        options.max_workers = workers;
    }

    let outcomes = redact_files(engine, jobs, options).await;

    let mut summaries = Vec::with_capacity(outcomes.len());
    let mut failures = 0usize;
    for outcome in outcomes {
        match outcome.result {
            Ok(report) => {
                if !cmd.json {
                    println!(
                        "{} {} -> {} ({} region(s), {} entit(y/ies))",
                        "redacted".green().bold(),
                        outcome.input.display(),
                        outcome.output.display(),
                        report.regions_redacted,
                        report.entities_detected.len(),
                    );
                }
                summaries.push(JobSummary {
                    input: outcome.input,
                    output: outcome.output,
                    report: Some(report),
                    error: None,
                });
            }
            Err(e) => {
                failures += 1;
                if !cmd.json {
                    eprintln!(
                        "{} {}: {e}",
                        "failed".red().bold(),
                        outcome.input.display()
                    );
                }
                summaries.push(JobSummary {
                    input: outcome.input,
                    output: outcome.output,
                    report: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        println!(
            "{} document(s) processed at {}",
            summaries.len(),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        );
    }

    if failures > 0 {
        bail!("{failures} document(s) failed to redact");
    }
    Ok(())
}

/// Maps inputs onto outputs: a single input writes to `--output` directly; a
/// set of inputs writes into `--output` as a directory.
fn plan_jobs(cmd: &RedactCommand) -> Result<Vec<BatchJob>> {
    if cmd.inputs.len() == 1 {
        return Ok(vec![BatchJob {
            input: cmd.inputs[0].clone(),
            output: cmd.output.clone(),
        }]);
    }

    std::fs::create_dir_all(&cmd.output)
        .with_context(|| format!("Failed to create output directory {}", cmd.output.display()))?;

    cmd.inputs
        .iter()
        .map(|input| {
            let Some(name) = input.file_name() else {
                bail!("Input path {} has no file name", input.display());
            };
            Ok(BatchJob {
                input: input.clone(),
                output: cmd.output.join(name),
            })
        })
        .collect()
}

pub fn run_literals(engine: &AnalyzerEngine, cmd: &RedactLiteralsCommand) -> Result<()> {
    let mut doc = TextDocument::load(&cmd.input)
        .with_context(|| format!("Failed to open {}", cmd.input.display()))?;

    let redactor = DocumentRedactor::new(engine)?;
    let report = redactor.redact_literals(&mut doc, &cmd.literals, cmd.style.into())?;

    doc.save(&cmd.output)
        .with_context(|| format!("Failed to write {}", cmd.output.display()))?;

    println!(
        "{} {} -> {} ({} region(s))",
        "redacted".green().bold(),
        cmd.input.display(),
        cmd.output.display(),
        report.regions_redacted,
    );
    Ok(())
}
