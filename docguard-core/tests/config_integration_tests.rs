// docguard-core/tests/config_integration_tests.rs
use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;

use docguard_core::config::{self, RegistryConfig};
use docguard_core::RecognizerRegistry;

#[test]
fn test_load_default_recognizers() {
    let config = RegistryConfig::load_default_recognizers().unwrap();
    assert!(!config.recognizers.is_empty());
    assert!(config
        .recognizers
        .iter()
        .any(|r| r.entity_type == "IN_AADHAAR" && r.language == "en"));
    assert!(config
        .recognizers
        .iter()
        .any(|r| r.entity_type == "IN_AADHAAR" && r.language == "hi"));
    assert_eq!(config.context.window_chars, 50);

    let aadhaar = config
        .recognizers
        .iter()
        .find(|r| r.entity_type == "IN_AADHAAR" && r.language == "en")
        .unwrap();
    assert_eq!(aadhaar.validator.as_deref(), Some("in_aadhaar"));
    assert!(aadhaar.patterns.iter().any(|p| p.score >= 0.75));
}

#[test]
fn test_load_from_file() -> Result<()> {
    let yaml_content = r#"
recognizers:
  - entity_type: TEST_ID
    language: en
    patterns:
      - name: "Test"
        regex: 'T-\d{4}'
        score: 0.8
    context:
      - test id
"#;
    let mut file = NamedTempFile::new()?;
    file.write_all(yaml_content.as_bytes())?;
    let config = RegistryConfig::load_from_file(file.path())?;
    assert_eq!(config.recognizers.len(), 1);
    assert_eq!(config.recognizers[0].entity_type, "TEST_ID");
    assert_eq!(config.recognizers[0].language, "en");
    assert!(config.recognizers[0].validator.is_none());
    Ok(())
}

#[test]
fn test_invalid_regex_fails_load() -> Result<()> {
    let yaml_content = r#"
recognizers:
  - entity_type: BROKEN
    language: en
    patterns:
      - name: "Broken"
        regex: '[unclosed'
        score: 0.5
"#;
    let mut file = NamedTempFile::new()?;
    file.write_all(yaml_content.as_bytes())?;
    let err = RegistryConfig::load_from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("validation failed"));
    Ok(())
}

#[test]
fn test_unknown_validator_fails_validation() {
    let mut config = RegistryConfig::load_default_recognizers().unwrap();
    config.recognizers[0].validator = Some("no_such_validator".to_string());
    assert!(config::validate_config(&config).is_err());
}

#[test]
fn test_duplicate_recognizer_fails_validation() {
    let mut config = RegistryConfig::load_default_recognizers().unwrap();
    let duplicate = config.recognizers[0].clone();
    config.recognizers.push(duplicate);
    let err = config::validate_config(&config).unwrap_err();
    assert!(err.to_string().contains("Duplicate"));
}

#[test]
fn test_out_of_range_score_fails_validation() {
    let mut config = RegistryConfig::load_default_recognizers().unwrap();
    config.recognizers[0].patterns[0].score = 1.5;
    assert!(config::validate_config(&config).is_err());
}

#[test]
fn test_merge_overrides_by_entity_and_language() {
    let default_config = RegistryConfig::load_default_recognizers().unwrap();
    let default_count = default_config.recognizers.len();

    let mut override_rec = default_config
        .recognizers
        .iter()
        .find(|r| r.entity_type == "IN_AADHAAR" && r.language == "en")
        .unwrap()
        .clone();
    override_rec.context.push("uid card".to_string());

    let mut new_rec = override_rec.clone();
    new_rec.entity_type = "IN_VOTER_ID".to_string();
    new_rec.validator = None;

    let user = RegistryConfig {
        recognizers: vec![override_rec, new_rec],
        context: default_config.context.clone(),
    };

    let merged = config::merge_registries(default_config, Some(user));
    assert_eq!(merged.recognizers.len(), default_count + 1);

    let aadhaar = merged
        .recognizers
        .iter()
        .find(|r| r.entity_type == "IN_AADHAAR" && r.language == "en")
        .unwrap();
    assert!(aadhaar.context.iter().any(|c| c == "uid card"));
    assert!(merged
        .recognizers
        .iter()
        .any(|r| r.entity_type == "IN_VOTER_ID"));
}

#[test]
fn test_merge_without_user_config_is_identity() {
    let default_config = RegistryConfig::load_default_recognizers().unwrap();
    let merged = config::merge_registries(default_config.clone(), None);
    assert_eq!(merged, default_config);
}

#[test]
fn test_retain_entities_filters_and_warns_on_unknown() {
    let mut config = RegistryConfig::load_default_recognizers().unwrap();
    config.retain_entities(&["IN_AADHAAR".to_string(), "NO_SUCH_TYPE".to_string()]);
    assert!(!config.recognizers.is_empty());
    assert!(config
        .recognizers
        .iter()
        .all(|r| r.entity_type == "IN_AADHAAR"));
}

#[test]
fn test_registry_build_fails_fast_on_bad_config() {
    let mut config = RegistryConfig::load_default_recognizers().unwrap();
    config.recognizers[0].patterns[0].regex = "[unclosed".to_string();
    let err = RecognizerRegistry::from_config(&config).unwrap_err();
    assert!(err.is_configuration_error());
}
