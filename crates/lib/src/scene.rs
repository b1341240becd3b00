//! # Chat Scenes
//!
//! A scene pairs a prompt composer with the parser for its replies and the inference
//! parameters the model should be called with. Building an adapter has no side
//! effects; registering it is up to the application that owns the `SceneRegistry`.

use crate::{
    composer::PromptComposer,
    errors::ComposeError,
    locale::Locale,
    parser::DbChatOutputParser,
    schema::{DisplayTypes, ResponseSchema},
};
use serde::{Deserialize, Serialize};

/// The scene identifier of database chat with automatic SQL execution.
pub const CHAT_WITH_DB_EXECUTE: &str = "chat_with_db_execute";

/// The sampling temperature of the auto-execute scene.
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// The reply length cap sent with each request.
pub const DEFAULT_MAX_NEW_TOKENS: i32 = 1024;

/// Parameters forwarded to the model call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferenceParams {
    pub temperature: f32,
    pub max_new_tokens: i32,
    /// Whether partial output is requested. The parser needs the whole reply, so the
    /// auto-execute scene never streams.
    pub stream_out: bool,
}

impl Default for InferenceParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            stream_out: false,
        }
    }
}

/// Settings that shape the auto-execute adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    pub locale: Locale,
    pub display_types: DisplayTypes,
    pub temperature: f32,
    pub max_new_tokens: i32,
    /// Replaces the built-in system template of the locale when set.
    pub system_template: Option<String>,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            display_types: DisplayTypes::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            system_template: None,
        }
    }
}

/// A composer/parser pair bound to one scene.
#[derive(Debug, Clone)]
pub struct PromptAdapter {
    pub scene: String,
    pub composer: PromptComposer,
    pub parser: DbChatOutputParser,
    pub params: InferenceParams,
    /// Whether the scene wants the application to load stored history for it. History
    /// supplied with a request is always passed through.
    pub need_historical_messages: bool,
}

/// Builds the adapter for `chat_with_db_execute`.
pub fn auto_execute_adapter(settings: &SceneSettings) -> Result<PromptAdapter, ComposeError> {
    let schema = ResponseSchema::simple();
    let composer = match &settings.system_template {
        Some(template) => PromptComposer::with_system_template(
            settings.locale,
            template.clone(),
            schema,
            settings.display_types.clone(),
        )?,
        None => PromptComposer::new(settings.locale, schema, settings.display_types.clone())?,
    };
    Ok(PromptAdapter {
        scene: CHAT_WITH_DB_EXECUTE.to_string(),
        composer,
        parser: DbChatOutputParser::new(settings.display_types.clone()),
        params: InferenceParams {
            temperature: settings.temperature,
            max_new_tokens: settings.max_new_tokens,
            stream_out: false,
        },
        need_historical_messages: false,
    })
}
