//! Configuration management for `docguard-core`.
//!
//! This module defines the data structures describing the recognizer
//! registry: per-entity pattern sets, context keywords, structural
//! indicators, replacement pairs, and validator bindings. It handles
//! serialization/deserialization of YAML configurations and provides
//! utilities for loading, merging, and validating these configs.
//!
//! Validation is deliberately strict and runs at registry build time: a
//! syntactically invalid regex, an out-of-range score, or an unknown
//! validator name must fail startup before any request is served.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::validators::ValidatorKind;

/// Maximum allowed length for a regex pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// A named regular-expression rule with a base confidence score.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PatternDefinition {
    /// Human-readable pattern name (e.g. "AADHAAR (Strong)").
    pub name: String,
    /// The regex pattern string.
    pub regex: String,
    /// Base confidence assigned to every match of this pattern, in `[0, 1]`.
    pub score: f64,
}

/// A structural context indicator with an explicit weight.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IndicatorDefinition {
    /// Regex matched (case-insensitively) inside the context window.
    pub pattern: String,
    /// Additive weight contributed when the indicator occurs.
    pub weight: f64,
}

/// Declarative definition of one recognizer: the unit of extensibility.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RecognizerDefinition {
    /// Entity type reported by this recognizer (e.g. "IN_AADHAAR").
    pub entity_type: String,
    /// Language this recognizer supports.
    pub language: String,
    /// Pattern set; every recognizer needs at least one pattern.
    pub patterns: Vec<PatternDefinition>,
    /// Free-form context words that raise confidence when nearby.
    pub context: Vec<String>,
    /// Structural indicators with explicit weights.
    pub indicators: Vec<IndicatorDefinition>,
    /// Normalization applied before validation, e.g. `[["-", ""], [" ", ""]]`.
    pub replacement_pairs: Vec<(String, String)>,
    /// Name of the programmatic validator, resolved at build time.
    pub validator: Option<String>,
    /// Explicit override for enabling/disabling the recognizer.
    pub enabled: Option<bool>,
}

impl Default for RecognizerDefinition {
    fn default() -> Self {
        Self {
            entity_type: String::new(),
            language: "en".to_string(),
            patterns: Vec::new(),
            context: Vec::new(),
            indicators: Vec::new(),
            replacement_pairs: Vec::new(),
            validator: None,
            enabled: None,
        }
    }
}

impl RecognizerDefinition {
    /// True unless explicitly disabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// Context-enhancer tuning shared by all recognizers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Characters scanned on each side of a match.
    pub window_chars: usize,
    /// Weight contributed by a plain context word.
    pub word_weight: f64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            window_chars: crate::context::DEFAULT_WINDOW_CHARS,
            word_weight: crate::context::DEFAULT_WORD_WEIGHT,
        }
    }
}

/// Top-level registry configuration: the full recognizer set plus shared
/// context-enhancer settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub recognizers: Vec<RecognizerDefinition>,
    pub context: ContextConfig,
}

impl RegistryConfig {
    /// Loads a registry configuration from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading recognizer config from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: RegistryConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_config(&config)?;
        info!(
            "Loaded {} recognizer(s) from file {}.",
            config.recognizers.len(),
            path.display()
        );

        Ok(config)
    }

    /// Loads the embedded default recognizer set.
    pub fn load_default_recognizers() -> Result<Self> {
        debug!("Loading default recognizers from embedded string...");
        let default_yaml = include_str!("../config/default_recognizers.yaml");
        let config: RegistryConfig =
            serde_yml::from_str(default_yaml).context("Failed to parse default recognizers")?;

        validate_config(&config).context("Embedded default recognizers failed validation")?;
        debug!("Loaded {} default recognizer(s).", config.recognizers.len());
        Ok(config)
    }

    /// Restricts the active recognizer set to the requested entity types.
    /// Unknown names are warned about, not fatal, mirroring caller-supplied
    /// filters elsewhere in the pipeline.
    pub fn retain_entities(&mut self, entity_types: &[String]) {
        let requested: HashSet<&str> = entity_types.iter().map(String::as_str).collect();
        let known: HashSet<&str> = self
            .recognizers
            .iter()
            .map(|r| r.entity_type.as_str())
            .collect();

        for missing in requested.difference(&known) {
            warn!("Requested entity type '{}' has no recognizer.", missing);
        }

        self.recognizers
            .retain(|r| requested.contains(r.entity_type.as_str()));
    }
}

/// Merges a user-defined registry over the defaults. User recognizers
/// override defaults with the same `(entity_type, language)` key; context
/// settings are taken from the user config wholesale when provided.
pub fn merge_registries(
    default_config: RegistryConfig,
    user_config: Option<RegistryConfig>,
) -> RegistryConfig {
    debug!(
        "merge_registries called. Default recognizer count: {}",
        default_config.recognizers.len()
    );

    let Some(user_cfg) = user_config else {
        return default_config;
    };

    let mut merged: Vec<RecognizerDefinition> = Vec::new();
    let mut overridden: HashMap<(String, String), RecognizerDefinition> = user_cfg
        .recognizers
        .into_iter()
        .map(|r| ((r.entity_type.clone(), r.language.clone()), r))
        .collect();

    for default_rec in default_config.recognizers {
        let key = (default_rec.entity_type.clone(), default_rec.language.clone());
        match overridden.remove(&key) {
            Some(user_rec) => {
                debug!("User config overrides recognizer {}/{}", key.0, key.1);
                merged.push(user_rec);
            }
            None => merged.push(default_rec),
        }
    }

    // Remaining user recognizers are new registrations, appended in a
    // deterministic order.
    let mut extra: Vec<RecognizerDefinition> = overridden.into_values().collect();
    extra.sort_by(|a, b| {
        (a.entity_type.as_str(), a.language.as_str())
            .cmp(&(b.entity_type.as_str(), b.language.as_str()))
    });
    merged.extend(extra);

    debug!("Final recognizer count after merge: {}", merged.len());

    RegistryConfig {
        recognizers: merged,
        context: user_cfg.context,
    }
}

/// Validates registry integrity: names, regex compilation, score ranges,
/// validator bindings, duplicates. All problems are collected into a single
/// report so a bad config fails loudly and completely.
pub fn validate_config(config: &RegistryConfig) -> Result<()> {
    let mut errors = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for rec in &config.recognizers {
        let id = format!("{}/{}", rec.entity_type, rec.language);

        if rec.entity_type.is_empty() {
            errors.push("A recognizer has an empty `entity_type` field.".to_string());
        }
        if rec.language.is_empty() {
            errors.push(format!("Recognizer '{id}' has an empty `language` field."));
        }
        if !seen.insert((rec.entity_type.clone(), rec.language.clone())) {
            errors.push(format!("Duplicate recognizer definition for '{id}'."));
        }
        if rec.patterns.is_empty() {
            errors.push(format!("Recognizer '{id}' defines no patterns."));
        }

        for pattern in &rec.patterns {
            if pattern.regex.is_empty() {
                errors.push(format!(
                    "Recognizer '{id}', pattern '{}': empty regex.",
                    pattern.name
                ));
                continue;
            }
            if pattern.regex.len() > MAX_PATTERN_LENGTH {
                errors.push(format!(
                    "Recognizer '{id}', pattern '{}': length ({}) exceeds maximum allowed ({}).",
                    pattern.name,
                    pattern.regex.len(),
                    MAX_PATTERN_LENGTH
                ));
                continue;
            }
            if let Err(e) = Regex::new(&pattern.regex) {
                errors.push(format!(
                    "Recognizer '{id}', pattern '{}': invalid regex: {e}",
                    pattern.name
                ));
            }
            if !(0.0..=1.0).contains(&pattern.score) {
                errors.push(format!(
                    "Recognizer '{id}', pattern '{}': score {} outside [0, 1].",
                    pattern.name, pattern.score
                ));
            }
        }

        for indicator in &rec.indicators {
            if let Err(e) = Regex::new(&indicator.pattern) {
                errors.push(format!(
                    "Recognizer '{id}', indicator '{}': invalid regex: {e}",
                    indicator.pattern
                ));
            }
        }

        if let Some(name) = &rec.validator {
            if ValidatorKind::from_name(name).is_none() {
                errors.push(format!("Recognizer '{id}': unknown validator '{name}'."));
            }
        }
    }

    if !errors.is_empty() {
        let full_error_message = format!("Registry validation failed:\n{}", errors.join("\n"));
        Err(anyhow!(full_error_message))
    } else {
        Ok(())
    }
}
