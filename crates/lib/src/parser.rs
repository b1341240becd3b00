//! # Output Parser
//!
//! Recovers a `SqlAction` from the model's free-text reply. Model output is routinely
//! loose, so a bad reply is an expected input: the parser never panics and never
//! returns an empty success. It either resolves the fields or returns a typed
//! `ParseFailure` carrying the raw reply.
//!
//! Extraction runs an ordered list of strategies and stops at the first one that finds
//! a payload. The defaults are:
//! 1.  **JSON block**: a fenced ```json block, or the first bare `{...}` object outside
//!     non-JSON fences. A mapping carrying none of the recognized keys is not a payload.
//! 2.  **SQL statement**: a fenced ```sql block, or an upper-case SQL keyword at the start
//!     of a line running to a closing fence, an unquoted `;`, a blank line or the end of
//!     the reply.
//!
//! When several candidates exist the first one in the reply wins.

use crate::{
    errors::{ParseFailure, ParseFailureKind},
    schema::{DisplayTypes, FIELD_DISPLAY_TYPE, FIELD_SQL, FIELD_THOUGHTS},
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;
use std::ops::Range;
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

/// The reply keys the parser reads.
pub const RECOGNIZED_KEYS: [&str; 3] = [FIELD_THOUGHTS, FIELD_SQL, FIELD_DISPLAY_TYPE];

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"```(?:(?i:(json|sqlite|sql|mysql|postgresql|postgres|pgsql|tsql|plsql|query))\b)?[ \t]*\r?\n?([\s\S]*?)```",
    )
    .unwrap()
});

static SQL_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(SELECT|WITH|INSERT|UPDATE|DELETE|SHOW|DESCRIBE|EXPLAIN)\b").unwrap()
});

static BARE_SQL_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:SELECT|WITH|INSERT|UPDATE|DELETE|SHOW|DESCRIBE|EXPLAIN)\b").unwrap()
});

static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").unwrap());

/// The structured result of a successful parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlAction {
    /// Explanation for the user. Empty when the model gave none.
    pub thoughts: String,
    /// `None` when the model answered without a query, e.g. because the schema is
    /// insufficient.
    pub sql: Option<String>,
    pub display_type: String,
}

pub type ParseResult = Result<SqlAction, ParseFailure>;

/// What a strategy recovered from the reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Mapping(Map<String, Value>),
    Sql(String),
}

/// The outcome of one extraction strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Found(Payload),
    /// A candidate was present but could not be read.
    Malformed(String),
    NotFound,
}

/// One way of locating a payload in a model reply.
pub trait ExtractionStrategy: Send + Sync + Debug {
    fn name(&self) -> &'static str;
    fn extract(&self, text: &str) -> Extraction;
}

/// Finds a fenced JSON block, falling back to the first bare JSON object.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonBlockStrategy;

impl ExtractionStrategy for JsonBlockStrategy {
    fn name(&self) -> &'static str {
        "json_block"
    }

    fn extract(&self, text: &str) -> Extraction {
        let fenced = FENCE_RE.captures_iter(text).find_map(|caps| {
            let body = caps.get(2).map_or("", |m| m.as_str()).trim();
            is_json_fence(&caps).then_some(body)
        });
        if let Some(body) = fenced {
            return recognized_mapping(parse_mapping(body));
        }

        // Braces inside SQL or other fences belong to that code, not to a payload.
        let skipped: Vec<Range<usize>> = FENCE_RE
            .captures_iter(text)
            .filter(|caps| !is_json_fence(caps))
            .filter_map(|caps| caps.get(0).map(|m| m.range()))
            .collect();

        let mut malformed = None;
        let mut from = 0;
        loop {
            match find_bare_object(text, from, &skipped) {
                BareObject::Found(range) => {
                    match recognized_mapping(parse_mapping(&text[range.clone()])) {
                        found @ Extraction::Found(_) => return found,
                        Extraction::Malformed(detail) => {
                            malformed.get_or_insert(detail);
                        }
                        Extraction::NotFound => {}
                    }
                    from = range.end;
                }
                BareObject::Unterminated => {
                    return Extraction::Malformed(
                        malformed.unwrap_or_else(|| "unterminated JSON object".to_string()),
                    )
                }
                BareObject::None => {
                    return malformed.map_or(Extraction::NotFound, Extraction::Malformed)
                }
            }
        }
    }
}

/// Finds a SQL statement, first in a code fence and then bare in the text.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlStatementStrategy;

impl ExtractionStrategy for SqlStatementStrategy {
    fn name(&self) -> &'static str {
        "sql_statement"
    }

    fn extract(&self, text: &str) -> Extraction {
        let fenced = FENCE_RE.captures_iter(text).find_map(|caps| {
            let lang = caps.get(1).map(|m| m.as_str().to_ascii_lowercase());
            let body = caps.get(2).map_or("", |m| m.as_str()).trim();
            let is_sql = match lang.as_deref() {
                Some("json") => false,
                Some(_) => true,
                None => SQL_START_RE.is_match(body),
            };
            (is_sql && !body.is_empty()).then_some(body)
        });

        let statement = fenced.or_else(|| bare_statement(text));

        match statement.map(clean_statement).filter(|s| !s.is_empty()) {
            Some(sql) => Extraction::Found(Payload::Sql(sql)),
            None => Extraction::NotFound,
        }
    }
}

/// Turns a model reply into a `SqlAction`.
#[derive(Debug, Clone)]
pub struct DbChatOutputParser {
    strategies: Vec<Arc<dyn ExtractionStrategy>>,
    display_types: DisplayTypes,
}

impl DbChatOutputParser {
    /// Creates a parser with the JSON block and SQL statement strategies, in that order.
    pub fn new(display_types: DisplayTypes) -> Self {
        Self {
            strategies: vec![Arc::new(JsonBlockStrategy), Arc::new(SqlStatementStrategy)],
            display_types,
        }
    }

    /// Appends a strategy that runs after the existing ones.
    pub fn with_strategy(mut self, strategy: Arc<dyn ExtractionStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn display_types(&self) -> &DisplayTypes {
        &self.display_types
    }

    /// Parses one model reply. Calling it again on the same text yields the same result.
    pub fn parse(&self, raw_text: &str) -> ParseResult {
        debug!(state = "RAW", len = raw_text.len(), "Parsing model reply");
        if raw_text.trim().is_empty() {
            return Err(ParseFailure::new(
                ParseFailureKind::NoSqlFound,
                "the reply is empty",
                raw_text,
            ));
        }

        let mut malformed: Option<String> = None;
        let mut payload = None;
        for strategy in &self.strategies {
            debug!(state = "EXTRACTING", strategy = strategy.name());
            match strategy.extract(raw_text) {
                Extraction::Found(found) => {
                    debug!(strategy = strategy.name(), "Payload located");
                    payload = Some(found);
                    break;
                }
                Extraction::Malformed(detail) => {
                    warn!(
                        strategy = strategy.name(),
                        "Found an unreadable payload, trying the next strategy: {detail}"
                    );
                    malformed.get_or_insert(detail);
                }
                Extraction::NotFound => {}
            }
        }

        let Some(payload) = payload else {
            let failure = match malformed {
                Some(detail) => {
                    ParseFailure::new(ParseFailureKind::MalformedPayload, detail, raw_text)
                }
                None => ParseFailure::new(
                    ParseFailureKind::NoSqlFound,
                    "no JSON payload or SQL statement in the reply",
                    raw_text,
                ),
            };
            debug!(state = "FAILED", kind = %failure.kind);
            return Err(failure);
        };

        debug!(state = "VALIDATING");
        let result = self.validate(payload, raw_text);
        match &result {
            Ok(_) => debug!(state = "SUCCEEDED"),
            Err(failure) => debug!(state = "FAILED", kind = %failure.kind),
        }
        result
    }

    fn validate(&self, payload: Payload, raw_text: &str) -> ParseResult {
        match payload {
            Payload::Sql(sql) => Ok(SqlAction {
                thoughts: String::new(),
                sql: Some(sql),
                display_type: self.display_types.resolve(None),
            }),
            Payload::Mapping(map) => {
                let sql = match map.get(FIELD_SQL) {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s.trim().to_string()),
                    Some(other) => {
                        return Err(ParseFailure::new(
                            ParseFailureKind::MalformedPayload,
                            format!("`{FIELD_SQL}` must be a string, got {other}"),
                            raw_text,
                        ))
                    }
                };
                let thoughts = match map.get(FIELD_THOUGHTS) {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(other) => Some(other.to_string()),
                };
                if sql.is_none() && thoughts.is_none() {
                    return Err(ParseFailure::new(
                        ParseFailureKind::MalformedPayload,
                        format!("the payload has neither `{FIELD_SQL}` nor `{FIELD_THOUGHTS}`"),
                        raw_text,
                    ));
                }
                let display_type = self
                    .display_types
                    .resolve(map.get(FIELD_DISPLAY_TYPE).and_then(Value::as_str));
                Ok(SqlAction {
                    thoughts: thoughts.unwrap_or_default(),
                    sql,
                    display_type,
                })
            }
        }
    }
}

impl Default for DbChatOutputParser {
    fn default() -> Self {
        Self::new(DisplayTypes::default())
    }
}

fn parse_mapping(candidate: &str) -> Extraction {
    let parsed = serde_json::from_str::<Value>(candidate).or_else(|first_err| {
        let relaxed = TRAILING_COMMA_RE.replace_all(candidate, "$1");
        serde_json::from_str::<Value>(&relaxed).map_err(|_| first_err)
    });
    match parsed {
        Ok(Value::Object(map)) => Extraction::Found(Payload::Mapping(map)),
        Ok(_) => Extraction::Malformed("the JSON payload is not an object".to_string()),
        Err(e) => Extraction::Malformed(format!("invalid JSON: {e}")),
    }
}

/// Strips surrounding whitespace and one terminating semicolon.
fn clean_statement(statement: &str) -> String {
    let trimmed = statement.trim();
    trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end().to_string()
}

/// A fence the JSON strategy reads: labelled `json`, or unlabelled with an object body.
fn is_json_fence(caps: &regex::Captures<'_>) -> bool {
    let lang = caps.get(1).map(|m| m.as_str().to_ascii_lowercase());
    let body = caps.get(2).map_or("", |m| m.as_str()).trim();
    match lang.as_deref() {
        Some(lang) => lang == "json",
        None => body.starts_with('{'),
    }
}

/// Keeps a mapping only when it carries at least one of the recognized keys.
fn recognized_mapping(extraction: Extraction) -> Extraction {
    match extraction {
        Extraction::Found(Payload::Mapping(map))
            if !RECOGNIZED_KEYS.iter().any(|key| map.contains_key(*key)) =>
        {
            Extraction::Malformed(format!(
                "the JSON object has none of the keys {}",
                RECOGNIZED_KEYS.join(", ")
            ))
        }
        other => other,
    }
}

/// Finds an unfenced statement. It runs from an upper-case keyword at the start of a
/// line to the first `;` outside a quoted literal, a fence, a blank line or the end.
fn bare_statement(text: &str) -> Option<&str> {
    let start = BARE_SQL_START_RE.find(text)?.start();
    let rest = &text[start..];
    let mut quote: Option<char> = None;
    for (i, c) in rest.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, ';') => return Some(&rest[..i]),
            _ => {}
        }
        if c == '`' && rest[i..].starts_with("```") {
            return Some(&rest[..i]);
        }
        if c == '\n' && rest[i + 1..].trim_start_matches([' ', '\t', '\r']).starts_with('\n') {
            return Some(&rest[..i]);
        }
    }
    Some(rest)
}

enum BareObject {
    Found(Range<usize>),
    Unterminated,
    None,
}

/// Locates the first `{` at or after `from` that opens a mapping (`{"` or `{}`) and
/// lies outside `skipped`, and returns the byte range of the balanced object. String
/// literals and escapes are honoured.
fn find_bare_object(text: &str, from: usize, skipped: &[Range<usize>]) -> BareObject {
    let start = text[from..].char_indices().find_map(|(offset, c)| {
        let i = from + offset;
        if c != '{' || skipped.iter().any(|r| r.contains(&i)) {
            return None;
        }
        let next = text[i + 1..].trim_start().chars().next();
        matches!(next, Some('"') | Some('}')).then_some(i)
    });
    let Some(start) = start else {
        return BareObject::None;
    };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return BareObject::Found(start..start + offset + 1);
                }
            }
            _ => {}
        }
    }
    BareObject::Unterminated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_object_respects_strings() {
        let text = r#"Answer: {"sql": "SELECT '}' FROM t", "thoughts": "x"} trailing"#;
        match find_bare_object(text, 0, &[]) {
            BareObject::Found(range) => {
                assert_eq!(&text[range], r#"{"sql": "SELECT '}' FROM t", "thoughts": "x"}"#)
            }
            _ => panic!("expected a balanced object"),
        }
    }

    #[test]
    fn test_prose_braces_are_not_a_payload() {
        assert!(matches!(
            find_bare_object("use {placeholders} here", 0, &[]),
            BareObject::None
        ));
    }

    #[test]
    fn test_skipped_regions_hide_objects() {
        let text = r#"x {"a": 1} y"#;
        assert!(matches!(find_bare_object(text, 0, &[0..text.len()]), BareObject::None));
    }

    #[test]
    fn test_unrelated_mapping_is_not_a_payload() {
        let extraction = JsonBlockStrategy.extract(r#"{"platform": "SPR"}"#);
        assert!(matches!(extraction, Extraction::Malformed(_)));
    }

    #[test]
    fn test_bare_statement_stops_at_unquoted_semicolon() {
        let text = "SELECT 'a;b', \"c;d\" FROM t; then prose";
        assert_eq!(bare_statement(text), Some("SELECT 'a;b', \"c;d\" FROM t"));
    }

    #[test]
    fn test_fence_language_does_not_swallow_keyword() {
        let extraction = SqlStatementStrategy.extract("```SELECT 1```");
        assert_eq!(extraction, Extraction::Found(Payload::Sql("SELECT 1".to_string())));
    }

    #[test]
    fn test_sqlite_fence_is_sql() {
        let extraction = SqlStatementStrategy.extract("```sqlite\nSELECT 1;\n```");
        assert_eq!(extraction, Extraction::Found(Payload::Sql("SELECT 1".to_string())));
    }

    #[test]
    fn test_trailing_comma_is_tolerated() {
        let extraction = JsonBlockStrategy.extract("```json\n{\"sql\": \"SELECT 1\",}\n```");
        assert!(matches!(extraction, Extraction::Found(Payload::Mapping(_))));
    }

    #[test]
    fn test_clean_statement() {
        assert_eq!(clean_statement("  SELECT 1 ;\n"), "SELECT 1");
    }
}
