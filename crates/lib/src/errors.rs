use std::fmt;
use thiserror::Error;

/// Errors raised while rendering a prompt, before any model call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// A template slot has no value, or a value the template requires is empty.
    #[error("Missing context for `{0}`")]
    MissingContext(String),
    #[error("Unknown locale: '{0}'")]
    UnknownLocale(String),
    /// The message template does not have the system / history / human shape.
    #[error("Invalid prompt template: {0}")]
    InvalidTemplate(String),
    #[error("Failed to render the response schema: {0}")]
    InvalidSchema(String),
}

/// Errors from the AI provider seam.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI API: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI API response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI API returned an error: {0}")]
    AiApi(String),
    #[error("AI provider is not configured: {0}")]
    MissingAiProvider(String),
}

/// Errors from the application-owned scene table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("A default prompt is already registered for scene '{0}'")]
    DefaultAlreadyRegistered(String),
}

/// The reason a model reply could not be turned into a `SqlAction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailureKind {
    /// Neither a structured payload nor a SQL statement was found.
    NoSqlFound,
    /// A payload was found but it is not a usable mapping.
    MalformedPayload,
}

impl fmt::Display for ParseFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFailureKind::NoSqlFound => write!(f, "NoSqlFound"),
            ParseFailureKind::MalformedPayload => write!(f, "MalformedPayload"),
        }
    }
}

/// A typed parse failure. Always carries the untouched model reply so the caller
/// can log it or feed it into a re-prompt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {detail}")]
pub struct ParseFailure {
    pub kind: ParseFailureKind,
    pub detail: String,
    pub raw_text: String,
}

impl ParseFailure {
    pub(crate) fn new(kind: ParseFailureKind, detail: impl Into<String>, raw_text: &str) -> Self {
        Self {
            kind,
            detail: detail.into(),
            raw_text: raw_text.to_string(),
        }
    }
}

/// Errors from a full compose -> generate -> parse turn.
#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("Prompt composition failed: {0}")]
    Compose(#[from] ComposeError),
    #[error("Model call failed: {0}")]
    Model(#[from] PromptError),
    #[error("Model reply could not be parsed: {0}")]
    Parse(#[from] ParseFailure),
}
