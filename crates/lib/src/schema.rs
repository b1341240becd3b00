//! # Response Schema
//!
//! The response schema tells the model what shape of reply is expected. It is rendered
//! into the prompt by the composer and its field names are the keys the parser reads,
//! so both sides share the constants below.

use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use serde_json::ser::PrettyFormatter;

pub const FIELD_THOUGHTS: &str = "thoughts";
pub const FIELD_SQL: &str = "sql";
pub const FIELD_DISPLAY_TYPE: &str = "display_type";

/// The display type used when the model omits one or names an unknown one.
pub const DEFAULT_DISPLAY_TYPE: &str = "Table";

/// One advertised reply field and the description shown to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseField {
    pub name: String,
    pub description: String,
}

/// An ordered mapping from field name to description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSchema {
    fields: Vec<ResponseField>,
}

impl ResponseSchema {
    pub fn new(fields: Vec<ResponseField>) -> Self {
        Self { fields }
    }

    /// The `{thoughts, sql, display_type}` schema of the auto-execute scene.
    pub fn simple() -> Self {
        Self::new(vec![
            ResponseField {
                name: FIELD_THOUGHTS.to_string(),
                description: "thoughts summary to say to user".to_string(),
            },
            ResponseField {
                name: FIELD_SQL.to_string(),
                description: "SQL Query to run".to_string(),
            },
            ResponseField {
                name: FIELD_DISPLAY_TYPE.to_string(),
                description: "Data display method".to_string(),
            },
        ])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn fields(&self) -> &[ResponseField] {
        &self.fields
    }

    /// Renders the schema as a pretty JSON object with a four-space indent, keeping
    /// declaration order. Non-ASCII text is written as-is.
    pub fn to_prompt_json(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl Serialize for ResponseSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, &field.description)?;
        }
        map.end()
    }
}

impl Default for ResponseSchema {
    fn default() -> Self {
        Self::simple()
    }
}

/// The caller-defined set of rendering modes the model may choose from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayTypes(Vec<String>);

impl DisplayTypes {
    /// Builds a set from the given names. `Table` is always a member.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        if !names
            .iter()
            .any(|n| n.eq_ignore_ascii_case(DEFAULT_DISPLAY_TYPE))
        {
            names.insert(0, DEFAULT_DISPLAY_TYPE.to_string());
        }
        Self(names)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// The comma separated list rendered into the prompt.
    pub fn prompt_list(&self) -> String {
        self.0.join(", ")
    }

    /// Maps a model-provided name onto the canonical spelling in the set, ignoring
    /// case. Missing or unknown names become `Table`.
    pub fn resolve(&self, candidate: Option<&str>) -> String {
        candidate
            .map(str::trim)
            .and_then(|c| self.0.iter().find(|n| n.eq_ignore_ascii_case(c)))
            .cloned()
            .unwrap_or_else(|| DEFAULT_DISPLAY_TYPE.to_string())
    }
}

impl Default for DisplayTypes {
    fn default() -> Self {
        Self::new([
            "Table",
            "Text",
            "LineChart",
            "BarChart",
            "PieChart",
            "ScatterChart",
            "AreaChart",
            "HeatMap",
        ])
    }
}
