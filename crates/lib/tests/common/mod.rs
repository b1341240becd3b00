#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared helpers for the `dbchat` integration tests: tracing setup and a scripted
//! AI provider that records every call.

use async_trait::async_trait;
use dbchat::{providers::ai::AiProvider, InferenceParams, Message, PromptError};
use dotenvy::dotenv;
use std::sync::{Arc, Once, RwLock};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// --- Mock AI Provider for Logic Testing ---
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    pub call_history: Arc<RwLock<Vec<(Vec<Message>, InferenceParams)>>>,
    pub responses: Arc<RwLock<Vec<String>>>,
}

impl MockAiProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            call_history: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(responses.into_iter().rev().collect())),
        }
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        messages: &[Message],
        params: &InferenceParams,
    ) -> Result<String, PromptError> {
        self.call_history
            .write()
            .unwrap()
            .push((messages.to_vec(), *params));

        if let Some(response) = self.responses.write().unwrap().pop() {
            Ok(response)
        } else {
            Err(PromptError::AiApi("MockAiProvider: no response left".to_string()))
        }
    }
}
