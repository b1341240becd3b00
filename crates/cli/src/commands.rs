//! # Command Handlers
//!
//! Each handler takes already-loaded inputs and returns the text to print, so the
//! binary only deals with argument parsing, file reading and exit codes.

use crate::config::AppConfig;
use anyhow::{Context, Result};
use dbchat::{
    ChatDbExecutor, ComposeRequest, HistoryTurn, ParseFailure, PromptAdapter, SqlAction,
};
use std::fs;
use std::path::Path;
use tracing::info;

/// Reads a JSON list of `{speaker, text}` turns.
pub fn load_history(path: &Path) -> Result<Vec<HistoryTurn>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file '{}'", path.display()))?;
    let history: Vec<HistoryTurn> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid history file '{}'", path.display()))?;
    info!("Loaded {} history turns from '{}'.", history.len(), path.display());
    Ok(history)
}

/// Reads the schema text supplied to the prompt, as-is.
pub fn load_schema(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file '{}'", path.display()))
}

/// Builds the request of one turn from the configuration and the loaded inputs.
pub fn build_request(
    config: &AppConfig,
    question: &str,
    schema_context: String,
    history: Vec<HistoryTurn>,
) -> ComposeRequest {
    ComposeRequest {
        user_input: question.to_string(),
        schema_context,
        history,
        db_name: Some(config.db_name.clone()),
        dialect: Some(config.dialect.clone()),
        top_k: Some(config.top_k),
    }
}

/// Renders the messages of a turn as pretty JSON.
pub fn compose(adapter: &PromptAdapter, request: &ComposeRequest) -> Result<String> {
    let messages = adapter.composer.compose(request)?;
    Ok(serde_json::to_string_pretty(&messages)?)
}

/// Parses a raw model reply. The failure is returned as-is so the caller can report
/// its kind.
pub fn parse(adapter: &PromptAdapter, raw_reply: &str) -> Result<SqlAction, ParseFailure> {
    adapter.parser.parse(raw_reply)
}

/// Runs a full turn against the configured model.
pub async fn ask(executor: &ChatDbExecutor, request: &ComposeRequest) -> Result<SqlAction> {
    Ok(executor.run_turn(request).await?)
}
