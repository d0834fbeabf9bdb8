// docguard/src/cli.rs
//! This file defines the command-line interface (CLI) for the docguard
//! application, including all available commands and their arguments.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use docguard_core::RedactionStyle;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "docguard",
    author = "DocGuard Contributors",
    version = env!("CARGO_PKG_VERSION"),
    about = "Detect and redact sensitive data in documents",
    long_about = "Docguard is a command-line utility for detecting and redacting Personally Identifiable Information (PII) in text documents. It analyzes input with a configurable recognizer registry (pattern matching, contextual scoring, and checksum validation) and obscures accepted detections with a destructive blackout or a labeled placeholder.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG for 'docguard' crates to DEBUG)
    #[arg(long, short = 'd', help = "Enable debug logging.")]
    pub debug: bool,

    /// Path to a custom recognizer registry (YAML), merged over the defaults.
    #[arg(long = "config", value_name = "FILE", global = true, help = "Path to a custom recognizer registry (YAML), merged over the defaults.")]
    pub config: Option<PathBuf>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `docguard` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyzes input for sensitive entities and prints the detections.
    #[command(about = "Analyzes an input file or stdin for sensitive entities without redacting.")]
    Analyze(AnalyzeCommand),

    /// Analyzes and redacts one or more documents.
    #[command(about = "Analyzes and redacts one or more documents.")]
    Redact(RedactCommand),

    /// Redacts specific literal strings without any analysis.
    #[command(name = "redact-literals", about = "Redacts specific literal strings without any analysis.")]
    RedactLiterals(RedactLiteralsCommand),
}

/// Arguments for the `analyze` command.
#[derive(Parser, Debug)]
pub struct AnalyzeCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Language of the input text.
    #[arg(long, short = 'l', default_value = "en", help = "Language of the input text.")]
    pub language: String,

    /// Restrict detection to these entity types (comma-separated).
    #[arg(long = "entities", value_delimiter = ',', help = "Restrict detection to these entity types (comma-separated).")]
    pub entities: Vec<String>,

    /// Drop results scoring below this threshold.
    #[arg(long = "threshold", value_name = "SCORE", help = "Drop results scoring below this threshold.")]
    pub threshold: Option<f64>,

    /// Literals that must never be reported (comma-separated).
    #[arg(long = "allow", value_delimiter = ',', help = "Literals that must never be reported (comma-separated).")]
    pub allow_list: Vec<String>,

    /// Emit results as JSON instead of a table.
    #[arg(long, help = "Emit results as JSON instead of a table.")]
    pub json: bool,

    /// Show raw matched text in the table instead of a redacted preview.
    #[arg(long = "show-text", help = "Show raw matched text in the table instead of a redacted preview.")]
    pub show_text: bool,
}

/// Arguments for the `redact` command.
#[derive(Parser, Debug)]
pub struct RedactCommand {
    /// Input document(s) to redact.
    #[arg(value_name = "INPUT", required = true, help = "Input document(s) to redact.")]
    pub inputs: Vec<PathBuf>,

    /// Output file (single input) or directory (multiple inputs).
    #[arg(long, short = 'o', value_name = "PATH", help = "Output file (single input) or directory (multiple inputs).")]
    pub output: PathBuf,

    /// Redaction style to apply.
    #[arg(long, value_enum, default_value = "blackout", help = "Redaction style to apply.")]
    pub style: StyleArg,

    /// Language of the documents.
    #[arg(long, short = 'l', default_value = "en", help = "Language of the documents.")]
    pub language: String,

    /// Extra literal keyword to redact (repeatable).
    #[arg(long = "keyword", value_name = "TEXT", help = "Extra literal keyword to redact (repeatable).")]
    pub keywords: Vec<String>,

    /// Extra regex pattern; its first match per page is redacted (repeatable).
    #[arg(long = "regex", value_name = "PATTERN", help = "Extra regex pattern; its first match per page is redacted (repeatable).")]
    pub regex: Vec<String>,

    /// Restrict detection to these entity types (comma-separated).
    #[arg(long = "entities", value_delimiter = ',', help = "Restrict detection to these entity types (comma-separated).")]
    pub entities: Vec<String>,

    /// Concurrent documents in flight (defaults to the CPU count).
    #[arg(long = "workers", value_name = "N", help = "Concurrent documents in flight (defaults to the CPU count).")]
    pub workers: Option<usize>,

    /// Per-document time budget in seconds; over-budget output is discarded.
    #[arg(long = "timeout-secs", value_name = "SECS", help = "Per-document time budget in seconds; over-budget output is discarded.")]
    pub timeout_secs: Option<u64>,

    /// Emit per-document reports as JSON.
    #[arg(long, help = "Emit per-document reports as JSON.")]
    pub json: bool,
}

/// Arguments for the `redact-literals` command.
#[derive(Parser, Debug)]
pub struct RedactLiteralsCommand {
    /// Input document to redact.
    #[arg(value_name = "INPUT", help = "Input document to redact.")]
    pub input: PathBuf,

    /// Output file.
    #[arg(long, short = 'o', value_name = "FILE", help = "Output file.")]
    pub output: PathBuf,

    /// Literal string to redact (repeatable, at least one).
    #[arg(long = "literal", value_name = "TEXT", required = true, help = "Literal string to redact (repeatable).")]
    pub literals: Vec<String>,

    /// Redaction style to apply.
    #[arg(long, value_enum, default_value = "blackout", help = "Redaction style to apply.")]
    pub style: StyleArg,
}

/// CLI-facing redaction style selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StyleArg {
    /// Permanent removal under an opaque black fill
    Blackout,
    /// Background fill with a centered entity-type label
    Label,
}

impl From<StyleArg> for RedactionStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Blackout => RedactionStyle::Blackout,
            StyleArg::Label => RedactionStyle::Label,
        }
    }
}
