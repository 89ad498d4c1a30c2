//! Configuration loading, validation, and management for RustedPrompt.
//!
//! Loads configuration from `~/.rustedprompt/config.toml` with environment
//! variable overrides. Validates all settings before they reach the
//! assembler.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Template used when none is configured. Prints each non-empty turn
/// field followed by a single space.
pub const DEFAULT_TEMPLATE: &str = "{{- if .System }}{{ .System }} {{ end }}
{{- if .Prompt }}{{ .Prompt }} {{ end }}
{{- if .Response }}{{ .Response }} {{ end }}";

/// The root configuration structure.
///
/// Maps directly to `~/.rustedprompt/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Context window settings
    #[serde(default)]
    pub context: ContextConfig,

    /// Vision projector settings
    #[serde(default)]
    pub vision: VisionConfig,

    /// Which tokenizer counts tokens
    #[serde(default)]
    pub tokenizer: TokenizerConfig,

    /// Turn template
    #[serde(default)]
    pub template: TemplateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Model context window, in tokens
    #[serde(default = "default_num_ctx")]
    pub num_ctx: usize,

    /// Tokens held back from the prompt for the model's reply
    #[serde(default)]
    pub response_reserve: usize,
}

fn default_num_ctx() -> usize {
    2048
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            num_ctx: default_num_ctx(),
            response_reserve: 0,
        }
    }
}

/// Per-image token charge. Left unset unless the model has a projector;
/// there is deliberately no built-in value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_token_weight: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    /// One token per whitespace-delimited word
    #[default]
    Words,
    /// ~4 characters per token
    Heuristic,
    /// A Hugging Face `tokenizer.json`
    HuggingFace,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenizerConfig {
    #[serde(default)]
    pub kind: TokenizerKind,

    /// Path to `tokenizer.json` (required for `huggingface`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(default = "default_template")]
    pub source: String,
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.into()
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            source: default_template(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.rustedprompt/config.toml).
    ///
    /// Also checks environment variables:
    /// - `RUSTEDPROMPT_NUM_CTX`
    /// - `RUSTEDPROMPT_IMAGE_TOKEN_WEIGHT`
    /// - `RUSTEDPROMPT_TEMPLATE`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with(&config_path)
    }

    /// Load from `path`, then apply environment overrides and validate.
    pub fn load_with(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup (highest priority).
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup("RUSTEDPROMPT_NUM_CTX") {
            self.context.num_ctx = parse_env("RUSTEDPROMPT_NUM_CTX", &raw)?;
        }

        if let Some(raw) = lookup("RUSTEDPROMPT_IMAGE_TOKEN_WEIGHT") {
            self.vision.image_token_weight =
                Some(parse_env("RUSTEDPROMPT_IMAGE_TOKEN_WEIGHT", &raw)?);
        }

        if let Some(source) = lookup("RUSTEDPROMPT_TEMPLATE") {
            self.template.source = source;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".rustedprompt")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.context.num_ctx == 0 {
            return Err(ConfigError::ValidationError(
                "context.num_ctx must be > 0".into(),
            ));
        }

        if self.context.response_reserve >= self.context.num_ctx {
            return Err(ConfigError::ValidationError(
                "context.response_reserve must be smaller than context.num_ctx".into(),
            ));
        }

        if self.vision.image_token_weight == Some(0) {
            return Err(ConfigError::ValidationError(
                "vision.image_token_weight must be > 0 when set".into(),
            ));
        }

        if self.tokenizer.kind == TokenizerKind::HuggingFace && self.tokenizer.path.is_none() {
            return Err(ConfigError::ValidationError(
                "tokenizer.path is required for kind = \"huggingface\"".into(),
            ));
        }

        if self.template.source.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "template.source must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Token budget handed to the assembler.
    pub fn token_limit(&self) -> usize {
        self.context
            .num_ctx
            .saturating_sub(self.context.response_reserve)
            .max(1)
    }

    /// Generate a default config TOML string (for `config init`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn parse_env(key: &str, raw: &str) -> Result<usize, ConfigError> {
    raw.trim().parse().map_err(|_| {
        ConfigError::ValidationError(format!("{key} must be a non-negative integer, got {raw:?}"))
    })
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
