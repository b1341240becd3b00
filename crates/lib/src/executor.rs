//! # The Turn Executor
//!
//! This module defines the `ChatDbExecutor`, which runs one database chat turn:
//! compose the prompt, call the model, and parse the reply. It does not execute the
//! resulting SQL; that belongs to the caller.

use crate::{
    composer::ComposeRequest,
    errors::ExecuteError,
    message::Message,
    parser::SqlAction,
    providers::ai::AiProvider,
    scene::PromptAdapter,
};
use std::sync::Arc;
use tracing::{error, info};

/// Holds the scene adapter and the AI provider a turn needs.
#[derive(Debug, Clone)]
pub struct ChatDbExecutor {
    pub adapter: Arc<PromptAdapter>,
    pub ai_provider: Arc<dyn AiProvider>,
}

impl ChatDbExecutor {
    /// Creates a new `ChatDbExecutor`.
    pub fn new(adapter: Arc<PromptAdapter>, ai_provider: Arc<dyn AiProvider>) -> Self {
        Self {
            adapter,
            ai_provider,
        }
    }

    /// Renders the messages of a turn without calling the model.
    pub fn compose(&self, request: &ComposeRequest) -> Result<Vec<Message>, ExecuteError> {
        Ok(self.adapter.composer.compose(request)?)
    }

    /// Runs one turn. Composition errors are returned before the model is called.
    pub async fn run_turn(&self, request: &ComposeRequest) -> Result<SqlAction, ExecuteError> {
        info!(
            scene = %self.adapter.scene,
            locale = %self.adapter.composer.locale(),
            "Running turn for question: '{}'",
            request.user_input
        );
        let messages = self.compose(request)?;

        let raw_reply = self
            .ai_provider
            .generate(&messages, &self.adapter.params)
            .await
            .inspect_err(|e| error!("Model call failed: {e}"))?;

        let action = self.adapter.parser.parse(&raw_reply).inspect_err(|failure| {
            error!(kind = %failure.kind, "Could not parse model reply: {}", failure.raw_text)
        })?;
        info!(
            has_sql = action.sql.is_some(),
            display_type = %action.display_type,
            "Turn produced a SQL action"
        );
        Ok(action)
    }
}
