//! errors.rs - Custom error types for the docguard-core library.
//!
//! This module defines a structured error enum for the library, following the
//! taxonomy used across the analysis and redaction pipeline: configuration
//! errors are fatal at registry build time, input errors fail a single
//! request, and per-candidate or per-target failures are absorbed by their
//! call sites and never surface here.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `docguard-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions. This prevents them from
/// matching all variants exhaustively, thus avoiding breaking changes.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DocGuardError {
    #[error("Failed to compile pattern '{0}': {1}")]
    PatternCompilationError(String, regex::Error),

    #[error("Pattern '{0}': length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("Recognizer '{0}': unknown validator '{1}'")]
    UnknownValidator(String, String),

    #[error("Invalid registry configuration: {0}")]
    Configuration(String),

    #[error("Input text is empty")]
    EmptyText,

    #[error("No language provided")]
    MissingLanguage,

    #[error("Invalid caller-supplied pattern '{0}': {1}")]
    InvalidRequestPattern(String, regex::Error),

    #[error("Page index {0} out of bounds for document with {1} page(s)")]
    PageOutOfBounds(usize, usize),

    #[error("Region lookup failed for target on page {page}: {reason}")]
    RegionLookup { page: usize, reason: String },

    #[error("Document I/O error: {0}")]
    DocumentIo(#[from] std::io::Error),

    #[error("Protection service error: {0}")]
    Protection(String),

    #[error("Request exceeded its time budget of {0:?}; partial output discarded")]
    Timeout(std::time::Duration),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),
}

impl DocGuardError {
    /// True for errors that must abort startup rather than a single request.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            DocGuardError::PatternCompilationError(..)
                | DocGuardError::PatternLengthExceeded(..)
                | DocGuardError::UnknownValidator(..)
                | DocGuardError::Configuration(..)
        )
    }
}
