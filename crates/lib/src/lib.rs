//! # Database Chat Prompting
//!
//! This crate builds the prompt for a natural-language database question and turns the
//! model's free-text reply into a structured SQL action.
//!
//! 1.  **Composition**: `PromptComposer` renders a localized system message with the
//!     schema and the response format, the caller's history, and the question.
//! 2.  **Parsing**: `DbChatOutputParser` recovers `{thoughts, sql, display_type}` from the
//!     reply or returns a typed `ParseFailure`.
//!
//! Both are pure. The model call sits behind the `AiProvider` trait and
//! `ChatDbExecutor` wires the three steps together for one turn.

pub mod composer;
pub mod errors;
pub mod executor;
pub mod locale;
pub mod message;
pub mod parser;
pub mod prompts;
pub mod providers;
pub mod registry;
pub mod scene;
pub mod schema;
pub mod types;

pub use composer::{ComposeRequest, PromptComposer};
pub use errors::{
    ComposeError, ExecuteError, ParseFailure, ParseFailureKind, PromptError, RegistryError,
};
pub use executor::ChatDbExecutor;
pub use locale::Locale;
pub use message::{HistoryTurn, Message, Role, Speaker};
pub use parser::{DbChatOutputParser, ParseResult, SqlAction};
pub use registry::SceneRegistry;
pub use scene::{auto_execute_adapter, InferenceParams, PromptAdapter, SceneSettings};
pub use schema::{DisplayTypes, ResponseSchema};
