// docguard-core/src/registry.rs
//! The recognizer registry: the unit of extensibility.
//!
//! A registry holds every registered recognizer in a stable order; that
//! order doubles as the deterministic tie-break key during overlap
//! resolution. Registries are built once from a [`RegistryConfig`] (failing
//! fast on any configuration problem) and are immutable afterwards, so they
//! can be shared freely across concurrently-served analysis requests.

use log::{debug, info};

use crate::config::RegistryConfig;
use crate::errors::DocGuardError;
use crate::recognizer::{PatternRecognizer, Recognizer};

/// Ordered, immutable collection of recognizers.
pub struct RecognizerRegistry {
    recognizers: Vec<Box<dyn Recognizer>>,
}

impl std::fmt::Debug for RecognizerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognizerRegistry")
            .field("recognizers", &self.recognizers.len())
            .finish()
    }
}

impl RecognizerRegistry {
    /// Builds a registry from configuration, compiling every recognizer.
    /// Any invalid pattern, indicator, or validator binding aborts the build.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, DocGuardError> {
        crate::config::validate_config(config)
            .map_err(|e| DocGuardError::Configuration(e.to_string()))?;

        let mut recognizers: Vec<Box<dyn Recognizer>> = Vec::new();
        for def in config.recognizers.iter().filter(|d| d.is_enabled()) {
            let recognizer = PatternRecognizer::from_definition(
                def,
                config.context.window_chars,
                config.context.word_weight,
            )?;
            debug!(
                "registered recognizer {}/{}",
                recognizer.entity_type(),
                recognizer.language()
            );
            recognizers.push(Box::new(recognizer));
        }

        info!("Recognizer registry built with {} recognizer(s).", recognizers.len());
        Ok(Self { recognizers })
    }

    /// Builds the registry from the embedded default recognizer set.
    pub fn with_defaults() -> Result<Self, DocGuardError> {
        let config = RegistryConfig::load_default_recognizers()
            .map_err(DocGuardError::AnyhowWrapper)?;
        Self::from_config(&config)
    }

    /// Registers an additional recognizer at the end of the order. Intended
    /// for pre-serving setup only; the registry is immutable once analyses
    /// begin.
    pub fn add_recognizer(&mut self, recognizer: Box<dyn Recognizer>) {
        self.recognizers.push(recognizer);
    }

    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }

    /// Recognizers applicable to one analysis call, keeping their
    /// registration order index for deterministic tie-breaking. A language
    /// with no recognizers simply yields nothing; that is not an error.
    pub fn applicable<'a>(
        &'a self,
        language: &'a str,
        entity_types: Option<&'a [String]>,
    ) -> impl Iterator<Item = (usize, &'a dyn Recognizer)> + 'a {
        self.recognizers
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.language() == language)
            .filter(move |(_, r)| match entity_types {
                Some(types) => types.iter().any(|t| t == r.entity_type()),
                None => true,
            })
            .map(|(i, r)| (i, r.as_ref()))
    }
}
