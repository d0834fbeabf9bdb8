// docguard/src/commands/mod.rs
//! Command implementations for the docguard CLI.

pub mod analyze;
pub mod redact;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};

use docguard_core::config::{merge_registries, RegistryConfig};
use docguard_core::{AnalyzerEngine, RecognizerRegistry};

/// Builds the engine once per invocation: embedded defaults, the user's
/// config-directory registry when present, then an explicit `--config`
/// override. Any configuration problem fails startup here, before input is
/// touched.
pub fn build_engine(config_path: Option<&Path>) -> Result<AnalyzerEngine> {
    let defaults = RegistryConfig::load_default_recognizers()?;

    let user_config = match config_path {
        Some(path) => Some(
            RegistryConfig::load_from_file(path)
                .with_context(|| format!("Failed to load --config {}", path.display()))?,
        ),
        None => match default_user_config_path() {
            Some(path) if path.is_file() => {
                info!("Using user registry at {}", path.display());
                Some(RegistryConfig::load_from_file(&path).with_context(|| {
                    format!("Failed to load user registry {}", path.display())
                })?)
            }
            _ => None,
        },
    };

    let merged = merge_registries(defaults, user_config);
    debug!("Building engine with {} recognizer(s)", merged.recognizers.len());
    let registry = RecognizerRegistry::from_config(&merged)?;
    Ok(AnalyzerEngine::new(registry))
}

/// `~/.config/docguard/recognizers.yaml` (platform equivalent).
fn default_user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("docguard").join("recognizers.yaml"))
}

/// Reads the whole input: a file when given, stdin otherwise.
pub fn read_input(input_file: Option<&Path>) -> Result<String> {
    match input_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display())),
        None => {
            use std::io::Read;
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}
