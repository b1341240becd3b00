//! # Prompt Composer
//!
//! Renders the ordered message list for one database chat turn: a system message with
//! the localized instructions, schema and response format, then the caller's history,
//! then the user's question. Composition is a pure function of the request and the
//! composer's immutable settings, and it fails before any model call is made.

use crate::{
    errors::ComposeError,
    locale::Locale,
    message::{ChatPromptTemplate, HistoryTurn, Message, MessageTemplate},
    prompts::chat_db::{
        CHAT_HISTORY_VAR, DEFAULT_TEMPLATE_EN, DEFAULT_TEMPLATE_ZH, HUMAN_TEMPLATE,
        SCENE_DEFINE_EN, SCENE_DEFINE_ZH, WORKLOAD_DDL,
    },
    schema::{DisplayTypes, ResponseSchema},
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// The caller-supplied inputs of one turn.
///
/// `db_name`, `dialect` and `top_k` are only read by templates that reference them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeRequest {
    pub user_input: String,
    #[serde(default)]
    pub schema_context: String,
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
    #[serde(default)]
    pub db_name: Option<String>,
    #[serde(default)]
    pub dialect: Option<String>,
    #[serde(default)]
    pub top_k: Option<u32>,
}

/// Builds the message list for the auto-execute database chat scene.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    locale: Locale,
    template: ChatPromptTemplate,
    response_schema: ResponseSchema,
    display_types: DisplayTypes,
    /// Rendered once; the schema never changes after construction.
    response_json: String,
}

impl PromptComposer {
    /// Creates a composer with the built-in template for `locale`.
    pub fn new(
        locale: Locale,
        response_schema: ResponseSchema,
        display_types: DisplayTypes,
    ) -> Result<Self, ComposeError> {
        let system_template = match locale {
            Locale::En => DEFAULT_TEMPLATE_EN,
            Locale::Zh => DEFAULT_TEMPLATE_ZH,
        };
        Self::with_system_template(locale, system_template, response_schema, display_types)
    }

    /// Creates a composer whose system message uses a caller-provided template, for
    /// deployments that override the built-in prompt text.
    pub fn with_system_template(
        locale: Locale,
        system_template: impl Into<String>,
        response_schema: ResponseSchema,
        display_types: DisplayTypes,
    ) -> Result<Self, ComposeError> {
        let scene_define = match locale {
            Locale::En => SCENE_DEFINE_EN,
            Locale::Zh => SCENE_DEFINE_ZH,
        };
        let template = ChatPromptTemplate::new(vec![
            MessageTemplate::System(format!("{scene_define}{}", system_template.into())),
            MessageTemplate::Placeholder(CHAT_HISTORY_VAR.to_string()),
            MessageTemplate::Human(HUMAN_TEMPLATE.to_string()),
        ])?;
        let response_json = response_schema
            .to_prompt_json()
            .map_err(|e| ComposeError::InvalidSchema(e.to_string()))?;
        Ok(Self {
            locale,
            template,
            response_schema,
            display_types,
            response_json,
        })
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn response_schema(&self) -> &ResponseSchema {
        &self.response_schema
    }

    pub fn display_types(&self) -> &DisplayTypes {
        &self.display_types
    }

    /// The response schema exactly as it appears in the system message.
    pub fn response_json(&self) -> &str {
        &self.response_json
    }

    /// Renders the messages for one turn.
    pub fn compose(&self, request: &ComposeRequest) -> Result<Vec<Message>, ComposeError> {
        if request.user_input.trim().is_empty() {
            return Err(ComposeError::MissingContext("user_input".to_string()));
        }
        let vars = self.variables(request)?;

        let mut messages = Vec::with_capacity(request.history.len() + 2);
        for slot in self.template.messages() {
            match slot {
                MessageTemplate::System(text) => {
                    messages.push(Message::system(render(text, &vars)?));
                }
                MessageTemplate::Placeholder(_) => {
                    messages.extend(request.history.iter().map(Message::from));
                }
                MessageTemplate::Human(text) => {
                    messages.push(Message::human(render(text, &vars)?));
                }
            }
        }

        debug!(
            locale = %self.locale,
            history = request.history.len(),
            system_prompt = %messages.first().map(|m| m.content.as_str()).unwrap_or_default(),
            "Composed database chat prompt"
        );
        Ok(messages)
    }

    fn variables(
        &self,
        request: &ComposeRequest,
    ) -> Result<HashMap<&'static str, String>, ComposeError> {
        let mut vars = HashMap::new();
        vars.insert("user_input", request.user_input.clone());
        vars.insert("response", self.response_json.clone());

        let schema_context = request.schema_context.trim();
        let table_info = match (self.locale, schema_context.is_empty()) {
            (_, false) => schema_context.to_string(),
            (Locale::En, true) => WORKLOAD_DDL.to_string(),
            (Locale::Zh, true) => {
                return Err(ComposeError::MissingContext("schema_context".to_string()))
            }
        };
        vars.insert("table_info", table_info);

        if let Some(db_name) = non_empty(request.db_name.as_deref()) {
            vars.insert("db_name", db_name.to_string());
        }
        if let Some(dialect) = non_empty(request.dialect.as_deref()) {
            vars.insert("dialect", dialect.to_string());
        }
        if let Some(top_k) = request.top_k {
            vars.insert("top_k", top_k.to_string());
        }
        vars.insert("display_type", self.display_types.prompt_list());
        Ok(vars)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Substitutes every `{name}` token in one pass. Substituted text is not re-scanned.
fn render(template: &str, vars: &HashMap<&'static str, String>) -> Result<String, ComposeError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = vars
            .get(name.as_str())
            .ok_or_else(|| ComposeError::MissingContext(name.as_str().to_string()))?;
        out.push_str(&template[last..whole.start()]);
        out.push_str(value);
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}
