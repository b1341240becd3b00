//! # Locale Selection
//!
//! The locale picks which prompt template and scene definition the composer renders.
//! It is resolved once from configuration and passed explicitly to the composer.

use crate::errors::ComposeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    /// English. Minimal template with a built-in DDL block.
    #[default]
    En,
    /// Chinese. Template with the numbered constraint list.
    Zh,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Zh];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = ComposeError;

    /// Accepts bare language codes and the common region forms (`en_US`, `zh-CN`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "en" | "en_us" | "en_gb" => Ok(Locale::En),
            "zh" | "zh_cn" | "zh_hans" => Ok(Locale::Zh),
            _ => Err(ComposeError::UnknownLocale(s.to_string())),
        }
    }
}
