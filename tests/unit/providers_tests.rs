/*!
 * Tests for provider reply parsing, the mock provider and the factory
 */

use dialoc::app_config::{ProviderConfig, TranslationConfig, TranslationProvider};
use dialoc::errors::ProviderError;
use dialoc::providers::{create_provider, parse_translation_payload, MockProvider, Provider, TranslationRequest};

fn request(text: &str) -> TranslationRequest {
    TranslationRequest {
        text: text.to_string(),
        system_prompt: "Translate".to_string(),
        source_language: "en".to_string(),
        target_language: "fr".to_string(),
        temperature: 0.0,
    }
}

#[test]
fn test_parseTranslationPayload_withChatter_shouldExtractObject() {
    let raw = "Sure! Here it is:\n```json\n{\"translation\": \"Bienvenue à [Location_a1]\"}\n```";
    assert_eq!(parse_translation_payload(raw).unwrap(), "Bienvenue à [Location_a1]");
}

#[test]
fn test_parseTranslationPayload_withPlainText_shouldFail() {
    let err = parse_translation_payload("Bienvenue").unwrap_err();
    assert!(matches!(err, ProviderError::ParseError(_)));
}

#[test]
fn test_parseTranslationPayload_withWrongField_shouldFail() {
    assert!(parse_translation_payload(r#"{"text": "Bienvenue"}"#).is_err());
}

#[tokio::test]
async fn test_mockProvider_intermittent_shouldFailOnSchedule() {
    let provider = MockProvider::from_model_name("intermittent:2").unwrap();

    assert!(provider.complete(request("one")).await.is_ok());
    assert!(provider.complete(request("two")).await.is_err());
    assert!(provider.complete(request("three")).await.is_ok());
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn test_mockProvider_uppercase_shouldKeepPlaceholders() {
    let provider = MockProvider::uppercase();
    let response = provider.complete(request("go to [Location_a1] now")).await.unwrap();
    assert_eq!(response.text, "GO TO [Location_a1] NOW");
}

#[test]
fn test_mockProvider_fromModelName_withUnknownBehavior_shouldFail() {
    assert!(MockProvider::from_model_name("sometimes").is_err());
    assert!(MockProvider::from_model_name("intermittent:x").is_err());
}

#[test]
fn test_createProvider_shouldFollowActiveProvider() {
    let mut config = TranslationConfig::default();
    config.provider = TranslationProvider::LMStudio;
    assert_eq!(create_provider(&config).unwrap().name(), "LM Studio");

    config.provider = TranslationProvider::Mock;
    let mut mock = ProviderConfig::new(TranslationProvider::Mock);
    mock.model = "prefix:FR ".to_string();
    config.available_providers.push(mock);
    assert_eq!(create_provider(&config).unwrap().name(), "mock");
}
