/*!
 * Tests for configuration loading, defaults and validation
 */

use std::str::FromStr;
use anyhow::Result;
use subtran::app_config::{Config, LogLevel, ProviderConfig, TranslationConfig, TranslationProvider};

/// Test the documented defaults
#[test]
fn test_default_config_withNoOverrides_shouldUseDocumentedDefaults() {
    let config = Config::default();

    assert_eq!(config.target_language, "Chinese");
    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);
    assert_eq!(config.translation.common.batch_size, 30);
    assert_eq!(config.translation.common.batch_delay_ms, 1000);
    assert_eq!(config.translation.common.temperature, 0.3);
    assert!(!config.translation.common.join_lines);
    assert_eq!(config.log_level, LogLevel::Info);
    // One pre-populated entry per supported provider
    assert_eq!(config.translation.available_providers.len(), 3);
}

/// Test that missing JSON fields fall back to defaults
#[test]
fn test_config_deserialization_withPartialJson_shouldFillDefaults() -> Result<()> {
    let config: Config = serde_json::from_str(r#"{"target_language": "French"}"#)?;

    assert_eq!(config.target_language, "French");
    assert_eq!(config.translation.common.batch_size, 30);
    assert_eq!(config.log_level, LogLevel::Info);

    let config: Config = serde_json::from_str(r#"{"translation": {"provider": "ollama"}}"#)?;

    assert_eq!(config.target_language, "Chinese");
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    Ok(())
}

/// Test provider entry deserialization with the renamed type field
#[test]
fn test_provider_config_deserialization_withTypeField_shouldMapFields() -> Result<()> {
    let provider: ProviderConfig =
        serde_json::from_str(r#"{"type": "ollama", "model": "mistral"}"#)?;

    assert_eq!(provider.provider_type, "ollama");
    assert_eq!(provider.model, "mistral");
    assert_eq!(provider.api_key, "");
    assert_eq!(provider.endpoint, "");
    assert_eq!(provider.timeout_secs, 30);
    Ok(())
}

/// Test provider name parsing
#[test]
fn test_provider_from_str_withValidNames_shouldParseCaseInsensitive() -> Result<()> {
    assert_eq!(TranslationProvider::from_str("openai")?, TranslationProvider::OpenAI);
    assert_eq!(TranslationProvider::from_str("OpenAI")?, TranslationProvider::OpenAI);
    assert_eq!(TranslationProvider::from_str("OLLAMA")?, TranslationProvider::Ollama);
    assert_eq!(TranslationProvider::from_str("lmstudio")?, TranslationProvider::LMStudio);
    assert_eq!(TranslationProvider::LMStudio.display_name(), "LM Studio");
    Ok(())
}

/// Test that an unknown provider name is rejected
#[test]
fn test_provider_from_str_withUnknownName_shouldFail() {
    let result = TranslationProvider::from_str("deepl");

    assert!(result.is_err());
    let message = result.unwrap_err().to_string();
    assert!(message.contains("Unknown translation provider: deepl"));
}

/// Test validation of the batch size lower bound
#[test]
fn test_validate_withZeroBatchSize_shouldFail() {
    let mut config = Config::default();
    config.translation.common.batch_size = 0;

    let result = config.validate();

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Invalid batch size: 0"));
}

/// Test validation of the temperature range
#[test]
fn test_validate_withOutOfRangeTemperature_shouldFail() {
    let mut config = Config::default();
    config.translation.common.temperature = 3.0;

    let result = config.validate();

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Invalid temperature"));
}

/// Test that local providers validate without credentials
#[test]
fn test_validate_withLocalProvider_shouldAcceptMissingKey() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;

    assert!(config.validate().is_ok());
}

/// Test model resolution through the active provider entry
#[test]
fn test_get_model_withConfiguredProvider_shouldPreferConfiguredValue() {
    let mut config = TranslationConfig {
        provider: TranslationProvider::Ollama,
        ..TranslationConfig::default()
    };

    // Default entry carries the built-in model name
    assert_eq!(config.get_model(), "llama2");

    if let Some(provider) = config
        .available_providers
        .iter_mut()
        .find(|p| p.provider_type == "ollama")
    {
        provider.model = "mistral:7b".to_string();
    }
    assert_eq!(config.get_model(), "mistral:7b");
}

/// Test model fallback when the provider has no entry at all
#[test]
fn test_get_model_withMissingProviderEntry_shouldFallBackToDefault() {
    let config = TranslationConfig {
        provider: TranslationProvider::Ollama,
        available_providers: Vec::new(),
        ..TranslationConfig::default()
    };

    assert_eq!(config.get_model(), "llama2");
}

/// Test endpoint resolution for a local provider
#[test]
fn test_get_endpoint_withLocalProvider_shouldFallBackToDefault() {
    let mut config = TranslationConfig {
        provider: TranslationProvider::Ollama,
        available_providers: Vec::new(),
        ..TranslationConfig::default()
    };

    assert_eq!(config.get_endpoint(), "http://localhost:11434");

    config.available_providers.push(ProviderConfig {
        provider_type: "ollama".to_string(),
        model: String::new(),
        api_key: String::new(),
        endpoint: "http://gpu-box:11434".to_string(),
        timeout_secs: 30,
    });
    assert_eq!(config.get_endpoint(), "http://gpu-box:11434");
}

/// Test timeout resolution, including the zero sentinel
#[test]
fn test_get_timeout_secs_withZeroConfigured_shouldFallBackToDefault() {
    let mut config = TranslationConfig {
        provider: TranslationProvider::Ollama,
        ..TranslationConfig::default()
    };

    if let Some(provider) = config
        .available_providers
        .iter_mut()
        .find(|p| p.provider_type == "ollama")
    {
        provider.timeout_secs = 0;
    }
    assert_eq!(config.get_timeout_secs(), 30);

    if let Some(provider) = config
        .available_providers
        .iter_mut()
        .find(|p| p.provider_type == "ollama")
    {
        provider.timeout_secs = 120;
    }
    assert_eq!(config.get_timeout_secs(), 120);
}

/// Test looking up a provider entry other than the active one
#[test]
fn test_get_provider_config_withInactiveProvider_shouldReturnItsEntry() {
    let config = Config::default();
    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);

    let ollama_config = config.translation.get_provider_config(&TranslationProvider::Ollama)
        .expect("Ollama provider config should exist");

    assert_eq!(ollama_config.provider_type, "ollama");
    assert_eq!(ollama_config.model, "llama2");
    assert_eq!(ollama_config.endpoint, "http://localhost:11434");
    assert_eq!(ollama_config.timeout_secs, 30);

    let mut emptied = config.translation.clone();
    emptied.available_providers.clear();
    assert!(emptied.get_provider_config(&TranslationProvider::Ollama).is_none());
}

/// Test the log level mapping to the log facade
#[test]
fn test_log_level_to_level_filter_shouldMapAllVariants() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::Info.to_level_filter(), log::LevelFilter::Info);
    assert_eq!(LogLevel::Debug.to_level_filter(), log::LevelFilter::Debug);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}

/// Test the on-disk JSON shape of provider fields
#[test]
fn test_config_serialization_withDefaults_shouldUseLowercaseTags() -> Result<()> {
    let json = serde_json::to_string_pretty(&Config::default())?;

    assert!(json.contains(r#""provider": "openai""#));
    assert!(json.contains(r#""type": "ollama""#));
    assert!(json.contains(r#""target_language": "Chinese""#));
    Ok(())
}
