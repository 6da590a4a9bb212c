/*!
 * Tests for application configuration functionality
 */

use std::str::FromStr;

use dialoc::app_config::{Config, LogLevel, ProviderConfig, TranslationProvider};

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "fr");
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.translation.common.retry_count, 3);
    assert_eq!(config.translation.common.concurrent_requests, 4);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.database_path.is_none());

    let ollama = config
        .translation
        .get_provider_config(&TranslationProvider::Ollama)
        .expect("Ollama provider config should exist");
    assert_eq!(ollama.endpoint, "http://localhost:11434/v1");
}

#[test]
fn test_validate_withDefaults_shouldPass() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_validate_withSameLanguages_shouldFail() {
    let mut config = Config::default();
    config.target_language = "eng".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withUnknownLanguage_shouldFail() {
    let mut config = Config::default();
    config.source_language = "xx".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withHostedProviderWithoutKey_shouldFail() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Anthropic;
    assert!(config.validate().is_err());

    let provider = config
        .translation
        .available_providers
        .iter_mut()
        .find(|p| p.provider_type == "anthropic")
        .expect("Anthropic provider config should exist");
    provider.api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withBadEndpoint_shouldFail() {
    let mut config = Config::default();
    let mut provider = ProviderConfig::new(TranslationProvider::LMStudio);
    provider.endpoint = "not a url".to_string();
    config.translation.available_providers.retain(|p| p.provider_type != "lmstudio");
    config.translation.available_providers.push(provider);
    config.translation.provider = TranslationProvider::LMStudio;

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withZeroConcurrency_shouldFail() {
    let mut config = Config::default();
    config.translation.common.concurrent_requests = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("nested").join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config.target_language, "fr");
}

#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{"source_language": "en", "target_language": "de", "translation": {"provider": "mock"}}"#,
    )
    .unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.target_language, "de");
    assert_eq!(config.translation.provider, TranslationProvider::Mock);
    assert_eq!(config.translation.get_model(), "echo");
    assert_eq!(config.translation.common.retry_delay_ms, 1000);
}

#[test]
fn test_save_thenLoad_shouldKeepValues() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");
    let mut config = Config::default();
    config.target_language = "es".to_string();
    config.database_path = Some(dir.path().join("strings.db"));

    config.save(&path).unwrap();
    let loaded = Config::load_or_create(&path).unwrap();

    assert_eq!(loaded.target_language, "es");
    assert_eq!(loaded.resolved_database_path().unwrap(), dir.path().join("strings.db"));
}

#[test]
fn test_fromStr_withKnownNames_shouldParse() {
    assert_eq!(TranslationProvider::from_str("LMStudio").unwrap(), TranslationProvider::LMStudio);
    assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
    assert!(TranslationProvider::from_str("gemini").is_err());
}
