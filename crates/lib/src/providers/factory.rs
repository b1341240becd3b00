//! # AI Provider Factory
//!
//! Creates the configured AI provider so every front end (CLI, tests, embedding
//! applications) builds providers the same way.

use crate::{
    errors::PromptError,
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
    types::ProviderConfig,
};
use tracing::info;

/// Creates an AI provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn AiProvider>, PromptError> {
    match config.provider.as_str() {
        "gemini" => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                PromptError::MissingAiProvider(
                    "an api_key is required for the gemini provider".to_string(),
                )
            })?;
            let api_url = match (&config.api_url, &config.model_name) {
                (Some(url), _) => url.clone(),
                (None, Some(model)) => format!(
                    "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent"
                ),
                (None, None) => {
                    return Err(PromptError::MissingAiProvider(
                        "either api_url or model_name must be set for the gemini provider"
                            .to_string(),
                    ))
                }
            };
            info!("Configuring Gemini provider with URL: {}", api_url);
            Ok(Box::new(GeminiProvider::new(api_url, api_key)?))
        }
        "local" => {
            let api_url = config.api_url.clone().ok_or_else(|| {
                PromptError::MissingAiProvider(
                    "api_url is not set for the local provider".to_string(),
                )
            })?;
            info!("Configuring Local AI provider with URL: {}", api_url);
            Ok(Box::new(LocalAiProvider::new(
                api_url,
                config.api_key.clone(),
                config.model_name.clone(),
            )?))
        }
        other => Err(PromptError::MissingAiProvider(format!(
            "unknown provider type '{other}'"
        ))),
    }
}
