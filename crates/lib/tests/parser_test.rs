//! # Output Parser Tests
//!
//! This file checks how `DbChatOutputParser` reads real-world model replies: JSON
//! payloads, fenced and bare SQL, loosely formatted text, and the typed failures.

use dbchat::{
    parser::{Extraction, ExtractionStrategy, Payload},
    DbChatOutputParser, DisplayTypes, ParseFailureKind, SqlAction,
};
use std::sync::Arc;

fn parser() -> DbChatOutputParser {
    DbChatOutputParser::default()
}

/// A fenced SQL block on a single line becomes the `sql` field.
#[test]
fn test_fenced_sql_on_one_line() {
    let action = parser()
        .parse("```sql SELECT platform FROM workload_runs LIMIT 5```")
        .unwrap();
    assert_eq!(
        action,
        SqlAction {
            thoughts: String::new(),
            sql: Some("SELECT platform FROM workload_runs LIMIT 5".to_string()),
            display_type: "Table".to_string(),
        }
    );
}

/// A bare JSON payload with an empty query is still a success.
#[test]
fn test_json_payload_with_empty_sql() {
    let action = parser()
        .parse(r#"{"thoughts":"no matching column","sql":"","display_type":"Table"}"#)
        .unwrap();
    assert_eq!(action.thoughts, "no matching column");
    assert_eq!(action.sql.as_deref(), Some(""));
    assert_eq!(action.display_type, "Table");
}

/// Plain prose has nothing to extract.
#[test]
fn test_plain_prose_is_no_sql_found() {
    let raw = "I'm sorry, I could not figure out which table holds that information.";
    let failure = parser().parse(raw).unwrap_err();
    assert_eq!(failure.kind, ParseFailureKind::NoSqlFound);
    assert_eq!(failure.raw_text, raw);
}

/// An empty reply is a failure, not an empty success.
#[test]
fn test_empty_reply_is_no_sql_found() {
    let failure = parser().parse("  \n ").unwrap_err();
    assert_eq!(failure.kind, ParseFailureKind::NoSqlFound);
}

/// A reply that only explains why no query can be written is a success without SQL.
#[test]
fn test_thoughts_without_sql_is_success() {
    let raw = "```json\n{\n    \"thoughts\": \"提供的表结构信息不足以生成 sql 查询。\"\n}\n```";
    let action = parser().parse(raw).unwrap();
    assert_eq!(action.sql, None);
    assert_eq!(action.thoughts, "提供的表结构信息不足以生成 sql 查询。");
    assert_eq!(action.display_type, "Table");
}

/// The JSON payload is found even when surrounded by chatter.
#[test]
fn test_json_payload_inside_prose() {
    let raw = r#"Sure! Here is the answer:
{"thoughts": "Count users per city", "sql": "SELECT city, COUNT(*) FROM users GROUP BY city", "display_type": "barchart"}
Let me know if you need anything else."#;
    let action = parser().parse(raw).unwrap();
    assert_eq!(
        action.sql.as_deref(),
        Some("SELECT city, COUNT(*) FROM users GROUP BY city")
    );
    assert_eq!(action.display_type, "BarChart");
}

/// Unknown display types fall back to `Table`.
#[test]
fn test_unknown_display_type_defaults_to_table() {
    let raw = r#"{"thoughts": "t", "sql": "SELECT 1", "display_type": "RadarChart"}"#;
    assert_eq!(parser().parse(raw).unwrap().display_type, "Table");
}

/// The parser only accepts display types from its own set.
#[test]
fn test_caller_defined_display_types() {
    let parser = DbChatOutputParser::new(DisplayTypes::new(["Table", "RadarChart"]));
    let raw = r#"{"thoughts": "t", "sql": "SELECT 1", "display_type": "RadarChart"}"#;
    assert_eq!(parser.parse(raw).unwrap().display_type, "RadarChart");
    let raw = r#"{"thoughts": "t", "sql": "SELECT 1", "display_type": "PieChart"}"#;
    assert_eq!(parser.parse(raw).unwrap().display_type, "Table");
}

/// Non-string thoughts are kept as compact JSON.
#[test]
fn test_structured_thoughts_are_stringified() {
    let raw = r#"{"thoughts": {"plan": "count"}, "sql": "SELECT COUNT(*) FROM users"}"#;
    let action = parser().parse(raw).unwrap();
    assert_eq!(action.thoughts, r#"{"plan":"count"}"#);
}

/// The English prompt primes an open ```sql fence, so replies often carry only the
/// statement and a closing fence.
#[test]
fn test_primed_reply_with_closing_fence_only() {
    let raw = "SELECT workload_name, primary_kpi_value\nFROM workload_runs\nWHERE platform ILIKE '%spr%'\nLIMIT 10;\n```\nThis query lists the KPIs.";
    let action = parser().parse(raw).unwrap();
    assert_eq!(
        action.sql.as_deref(),
        Some("SELECT workload_name, primary_kpi_value\nFROM workload_runs\nWHERE platform ILIKE '%spr%'\nLIMIT 10")
    );
}

/// A bare statement after an introduction stops at the first blank line.
#[test]
fn test_bare_statement_after_prose() {
    let raw = "Here is the query you asked for:\n\nSELECT name FROM users WHERE city = 'Bangkok'\n\nIt filters by city.";
    let action = parser().parse(raw).unwrap();
    assert_eq!(
        action.sql.as_deref(),
        Some("SELECT name FROM users WHERE city = 'Bangkok'")
    );
}

/// When several SQL blocks are present, the first one wins.
#[test]
fn test_first_sql_block_wins() {
    let raw = "```sql\nSELECT 1\n```\nor alternatively\n```sql\nSELECT 2\n```";
    assert_eq!(parser().parse(raw).unwrap().sql.as_deref(), Some("SELECT 1"));
}

/// A JSON block takes priority over a SQL block elsewhere in the reply.
#[test]
fn test_json_block_takes_priority() {
    let raw = "```sql\nSELECT 2\n```\n```json\n{\"thoughts\": \"t\", \"sql\": \"SELECT 1\"}\n```";
    assert_eq!(parser().parse(raw).unwrap().sql.as_deref(), Some("SELECT 1"));
}

/// A broken JSON block with no SQL to fall back on is a malformed payload.
#[test]
fn test_broken_json_is_malformed_payload() {
    let raw = "```json\n{\"thoughts\": \"count users\", \"sql\": \"SELECT COUNT(*) FROM users\n```";
    let failure = parser().parse(raw).unwrap_err();
    assert_eq!(failure.kind, ParseFailureKind::MalformedPayload);
    assert_eq!(failure.raw_text, raw);
}

/// A broken JSON block still yields SQL when a fenced statement follows it.
#[test]
fn test_broken_json_falls_back_to_sql() {
    let raw = "{\"thoughts\": \"oops\"\n```sql\nSELECT 3\n```";
    let action = parser().parse(raw).unwrap();
    assert_eq!(action.sql.as_deref(), Some("SELECT 3"));
}

/// A mapping without any recognized field is malformed.
#[test]
fn test_mapping_without_known_keys_is_malformed() {
    let failure = parser().parse(r#"{"query": "SELECT 1"}"#).unwrap_err();
    assert_eq!(failure.kind, ParseFailureKind::MalformedPayload);
}

/// A JSON literal inside a SQL fence is part of the statement, not a payload.
#[test]
fn test_json_literal_inside_sql_fence() {
    let raw = "```sql\nSELECT * FROM workload_runs WHERE meta @> '{\"platform\": \"SPR\"}' LIMIT 5\n```";
    let action = parser().parse(raw).unwrap();
    assert_eq!(
        action.sql.as_deref(),
        Some(r#"SELECT * FROM workload_runs WHERE meta @> '{"platform": "SPR"}' LIMIT 5"#)
    );
    assert_eq!(action.display_type, "Table");
}

/// Braces in the prose do not hide the SQL block that follows.
#[test]
fn test_empty_object_in_prose_falls_through_to_sql() {
    let raw = "An empty filter {} matches everything:\n```sql\nSELECT 1\n```";
    let action = parser().parse(raw).unwrap();
    assert_eq!(action.sql.as_deref(), Some("SELECT 1"));
}

/// An unrelated object is passed over in favour of a later payload.
#[test]
fn test_unrelated_object_before_payload() {
    let raw = r#"Use a filter like {"platform": "SPR"}. Answer: {"thoughts": "t", "sql": "SELECT 1"}"#;
    let action = parser().parse(raw).unwrap();
    assert_eq!(action.thoughts, "t");
    assert_eq!(action.sql.as_deref(), Some("SELECT 1"));
}

/// A semicolon inside a quoted literal does not end a bare statement.
#[test]
fn test_bare_statement_keeps_quoted_semicolon() {
    let action = parser()
        .parse("SELECT * FROM edp WHERE metric_name ILIKE 'a;b'")
        .unwrap();
    assert_eq!(
        action.sql.as_deref(),
        Some("SELECT * FROM edp WHERE metric_name ILIKE 'a;b'")
    );
}

/// A bare statement ends at the first unquoted semicolon.
#[test]
fn test_bare_statement_ends_at_semicolon() {
    let action = parser()
        .parse("SELECT name FROM t WHERE note = 'x;y'; followed by commentary")
        .unwrap();
    assert_eq!(action.sql.as_deref(), Some("SELECT name FROM t WHERE note = 'x;y'"));
}

/// A non-string `sql` value is malformed.
#[test]
fn test_non_string_sql_is_malformed() {
    let failure = parser()
        .parse(r#"{"thoughts": "t", "sql": 42}"#)
        .unwrap_err();
    assert_eq!(failure.kind, ParseFailureKind::MalformedPayload);
}

/// A fenced JSON value that is not an object is malformed.
#[test]
fn test_json_array_is_malformed() {
    let failure = parser().parse("```json\n[\"SELECT 1\"]\n```").unwrap_err();
    assert_eq!(failure.kind, ParseFailureKind::MalformedPayload);
}

/// Parsing the same reply twice gives the same result.
#[test]
fn test_parsing_is_idempotent() {
    let parser = parser();
    for raw in [
        "```sql SELECT 1```",
        r#"{"thoughts": "x", "sql": "SELECT 2"}"#,
        "nothing here",
        "```json\n{broken\n```",
    ] {
        assert_eq!(parser.parse(raw), parser.parse(raw));
    }
}

#[derive(Debug)]
struct XmlTagStrategy;

impl ExtractionStrategy for XmlTagStrategy {
    fn name(&self) -> &'static str {
        "xml_tag"
    }

    fn extract(&self, text: &str) -> Extraction {
        let start = text.find("<sql>");
        let end = text.find("</sql>");
        match (start, end) {
            (Some(s), Some(e)) if s + 5 <= e => {
                Extraction::Found(Payload::Sql(text[s + 5..e].trim().to_string()))
            }
            _ => Extraction::NotFound,
        }
    }
}

/// Appending a strategy extends the parser without changing earlier strategies.
#[test]
fn test_appended_strategy_runs_last() {
    let parser = parser().with_strategy(Arc::new(XmlTagStrategy));
    assert_eq!(
        parser.strategy_names(),
        vec!["json_block", "sql_statement", "xml_tag"]
    );

    let action = parser.parse("The answer is <sql>select 1</sql>").unwrap();
    assert_eq!(action.sql.as_deref(), Some("select 1"));

    let action = parser.parse("```sql\nSELECT 9\n```<sql>select 1</sql>").unwrap();
    assert_eq!(action.sql.as_deref(), Some("SELECT 9"));
}
