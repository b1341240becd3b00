pub mod gemini;
pub mod local;

use crate::{errors::PromptError, message::Message, scene::InferenceParams};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with an AI provider.
///
/// The model call is an opaque text-in/text-out step: a provider receives the composed
/// messages and the scene's inference parameters and returns the raw reply text.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a reply for the given messages.
    async fn generate(
        &self,
        messages: &[Message],
        params: &InferenceParams,
    ) -> Result<String, PromptError>;
}

dyn_clone::clone_trait_object!(AiProvider);
