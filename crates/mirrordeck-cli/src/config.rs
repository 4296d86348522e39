//! Configuration settings
//!
//! Settings come from an optional TOML file, then `MIRRORDECK_*`
//! environment variables, then command-line flags. Every table is
//! optional and every key has a default.
//!
//! ```toml
//! log_level = "debug"
//!
//! [render]
//! target_font = "Tahoma"
//! layout_policy = "text-only"
//!
//! [translation]
//! provider = "glossary"
//! glossary = "terms.toml"
//!
//! [workflow]
//! workers = 5
//! on_element_error = "keep-source"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use mirrordeck_pptx::constants::DEFAULT_TARGET_FONT;
use mirrordeck_pptx::LayoutPolicy;
use mirrordeck_translate::{ChatConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};

/// Prefix of the environment variables read by [`Settings::apply_env`]
pub const ENV_PREFIX: &str = "MIRRORDECK_";

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default tracing directive when `RUST_LOG` is unset
    pub log_level: String,
    /// Output rendering
    pub render: RenderSettings,
    /// Translation provider
    pub translation: TranslationSettings,
    /// Batch behaviour
    pub workflow: WorkflowSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            render: RenderSettings::default(),
            translation: TranslationSettings::default(),
            workflow: WorkflowSettings::default(),
        }
    }
}

/// Rendering of the right-to-left output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Font for translated runs, Latin and complex script alike
    pub target_font: String,
    /// Whether slide layouts are mirrored as well as marked
    pub layout_policy: LayoutPolicy,
    /// Word wrap, shrink on overflow and tight insets on replaced text
    pub autofit: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            target_font: DEFAULT_TARGET_FONT.to_string(),
            layout_policy: LayoutPolicy::TextOnly,
            autofit: true,
        }
    }
}

/// Translation provider kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Offline glossary file
    #[default]
    Glossary,
    /// OpenAI-compatible chat-completions API
    Chat,
}

/// Translation provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    /// Language of the input deck
    pub source_language: String,
    /// Language of the output deck
    pub target_language: String,
    /// Which provider to use
    pub provider: ProviderKind,
    /// Glossary file for the glossary provider
    pub glossary: Option<PathBuf>,
    /// API base URL for the chat provider
    pub endpoint: String,
    /// Model for the chat provider
    pub model: String,
    /// API key; only ever read from the environment
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token limit
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            source_language: "English".to_string(),
            target_language: "Arabic".to_string(),
            provider: ProviderKind::Glossary,
            glossary: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            temperature: 0.3,
            max_tokens: 2000,
            timeout_secs: 60,
        }
    }
}

impl TranslationSettings {
    /// Connection settings for the chat provider
    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout_secs),
            source_language: self.source_language.clone(),
            target_language: self.target_language.clone(),
        }
    }
}

/// What to do when an element or slide cannot be translated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Leave the source text in place, report, carry on
    #[default]
    KeepSource,
    /// Stop and write nothing
    Abort,
}

/// Batch settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    /// Slides translated concurrently
    pub workers: usize,
    /// Extra attempts for a slide whose translation failed transiently
    pub retries: u32,
    /// Pause before the first retry, doubled for each further one
    pub retry_backoff_ms: u64,
    /// Failure policy
    pub on_element_error: ErrorPolicy,
    /// Translate static text on slide layouts
    pub translate_layouts: bool,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            workers: 5,
            retries: 2,
            retry_backoff_ms: 500,
            on_element_error: ErrorPolicy::KeepSource,
            translate_layouts: true,
        }
    }
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings: the file when given, then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                Self::from_toml_str(&content)
                    .with_context(|| format!("Invalid config file: {}", path.display()))?
            }
            None => Self::default(),
        };
        settings.apply_env(std::env::vars())?;
        Ok(settings)
    }

    /// Apply `MIRRORDECK_*` overrides from `(name, value)` pairs.
    ///
    /// Unknown names are ignored; malformed values are an error.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match key {
                "LOG_LEVEL" => self.log_level = value,
                "TARGET_FONT" => self.render.target_font = value,
                "LAYOUT_POLICY" => {
                    self.render.layout_policy = parse_enum(&value).with_context(|| {
                        format!("{}LAYOUT_POLICY must be text-only or mirror", ENV_PREFIX)
                    })?
                }
                "PROVIDER" => {
                    self.translation.provider = parse_enum(&value).with_context(|| {
                        format!("{}PROVIDER must be glossary or chat", ENV_PREFIX)
                    })?
                }
                "GLOSSARY" => self.translation.glossary = Some(PathBuf::from(value)),
                "ENDPOINT" => self.translation.endpoint = value,
                "MODEL" => self.translation.model = value,
                "API_KEY" => self.translation.api_key = Some(value),
                "SOURCE_LANGUAGE" => self.translation.source_language = value,
                "TARGET_LANGUAGE" => self.translation.target_language = value,
                "WORKERS" => {
                    self.workflow.workers = value
                        .parse()
                        .with_context(|| format!("{}WORKERS must be a number", ENV_PREFIX))?
                }
                "RETRIES" => {
                    self.workflow.retries = value
                        .parse()
                        .with_context(|| format!("{}RETRIES must be a number", ENV_PREFIX))?
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Parse a kebab/lowercase enum value the way the TOML file spells it
fn parse_enum<T: serde::de::DeserializeOwned>(value: &str) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::String(
        value.trim().to_string(),
    ))?)
}
