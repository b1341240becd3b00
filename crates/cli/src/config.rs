//! # Application Configuration
//!
//! This module defines the configuration of the `dbchat` CLI and loads it in layers:
//! built-in defaults, an optional YAML file with `${VAR}` substitution, and `DBCHAT_`
//! environment variables (nested keys use `__`, e.g. `DBCHAT_AI__API_URL`).

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use dbchat::{types::ProviderConfig, DisplayTypes, Locale, SceneSettings};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::info;

/// The file loaded from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "dbchat.yml";

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
    /// The configured language is not a supported locale.
    UnknownLocale(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
            ConfigError::UnknownLocale(value) => {
                write!(f, "Unsupported language '{value}', expected 'en' or 'zh'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `dbchat.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The prompt language, "en" or "zh".
    #[serde(default = "default_language")]
    pub language: String,
    /// The SQL dialect named in the Chinese template.
    #[serde(default = "default_dialect")]
    pub dialect: String,
    /// The default row limit named in the Chinese template.
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_db_name")]
    pub db_name: String,
    /// Rendering modes the model may pick from. Uses the built-in set when unset.
    #[serde(default)]
    pub display_types: Option<Vec<String>>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: i32,
    /// Overrides the built-in system template of the selected language.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// The model provider used by `ask`.
    #[serde(default)]
    pub ai: ProviderConfig,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_dialect() -> String {
    "sqlite".to_string()
}

fn default_top_k() -> u32 {
    50
}

fn default_db_name() -> String {
    "default".to_string()
}

fn default_temperature() -> f32 {
    dbchat::scene::DEFAULT_TEMPERATURE
}

fn default_max_new_tokens() -> i32 {
    dbchat::scene::DEFAULT_MAX_NEW_TOKENS
}

impl AppConfig {
    /// Resolves the configured language. Done once at startup.
    pub fn locale(&self) -> Result<Locale, ConfigError> {
        self.language
            .parse()
            .map_err(|_| ConfigError::UnknownLocale(self.language.clone()))
    }

    pub fn scene_settings(&self) -> Result<SceneSettings, ConfigError> {
        let display_types = match &self.display_types {
            Some(names) if !names.is_empty() => DisplayTypes::new(names.clone()),
            _ => DisplayTypes::default(),
        };
        Ok(SceneSettings {
            locale: self.locale()?,
            display_types,
            temperature: self.temperature,
            max_new_tokens: self.max_new_tokens,
            system_template: self.system_prompt.clone(),
        })
    }
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}").unwrap();
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the configuration from a file and environment variables.
///
/// An explicit `config_path_override` must exist. Without one, `dbchat.yml` in the
/// working directory is used when present, and the built-in defaults otherwise.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    match config_path_override {
        Some(path) => {
            let content = read_and_substitute(path)?.ok_or_else(|| {
                ConfigError::NotFound(format!("Config file not found at '{path}'."))
            })?;
            info!("Loading configuration from '{path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None => {
            if let Some(content) = read_and_substitute(DEFAULT_CONFIG_FILE)? {
                info!("Loading configuration from '{DEFAULT_CONFIG_FILE}'.");
                builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
            } else {
                info!("'{DEFAULT_CONFIG_FILE}' not found. Using built-in defaults.");
            }
        }
    }

    let settings = builder
        .add_source(
            Environment::with_prefix("DBCHAT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("display_types"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    // Fail at startup rather than on the first turn.
    config.locale()?;
    Ok(config)
}
