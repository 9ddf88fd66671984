use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub records: RecordStoreConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Completion backend (OpenAI-compatible)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Base URL of the OpenAI-compatible API (no trailing slash needed).
    #[serde(default = "d_openai_url")]
    pub base_url: String,
    /// Environment variable holding the API key.
    #[serde(default = "d_openai_key_env")]
    pub api_key_env: String,
    /// Chat model used for the general fallback and doc answering.
    #[serde(default = "d_chat_model")]
    pub model: String,
    /// Embedding model used by the document index.
    #[serde(default = "d_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "d_20000")]
    pub timeout_ms: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: d_openai_url(),
            api_key_env: d_openai_key_env(),
            model: d_chat_model(),
            embedding_model: d_embedding_model(),
            timeout_ms: 20_000,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Customer record store (Airtable-style REST)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordStoreConfig {
    #[serde(default = "d_airtable_url")]
    pub base_url: String,
    /// Environment variable holding the record store API key.
    #[serde(default = "d_airtable_key_env")]
    pub api_key_env: String,
    /// Base identifier (workspace) containing the customer table.
    #[serde(default)]
    pub base_id: String,
    #[serde(default = "d_customers")]
    pub table: String,
    #[serde(default = "d_20000")]
    pub timeout_ms: u64,
}

impl Default for RecordStoreConfig {
    fn default() -> Self {
        Self {
            base_url: d_airtable_url(),
            api_key_env: d_airtable_key_env(),
            base_id: String::new(),
            table: d_customers(),
            timeout_ms: 20_000,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Notification webhook
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Environment variable holding the incoming-webhook URL.
    #[serde(default = "d_webhook_env")]
    pub webhook_url_env: String,
    #[serde(default = "d_10000")]
    pub timeout_ms: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url_env: d_webhook_env(),
            timeout_ms: 10_000,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Document index
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Target chunk size in characters. The 500/50 ratio is kept for
    /// answer-quality parity with the reference chunking.
    #[serde(default = "d_500")]
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    #[serde(default = "d_50")]
    pub chunk_overlap: usize,
    /// Number of top-matching chunks passed to the answering prompt.
    #[serde(default = "d_4")]
    pub top_k: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 4,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Assistant behaviour
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// System preamble prepended before every general-completion call.
    #[serde(default = "d_persona")]
    pub system_prompt: String,
    /// Link included in the "not registered" record-lookup reply.
    #[serde(default = "d_register_link")]
    pub registration_link: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            system_prompt: d_persona(),
            registration_link: d_register_link(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Structural checks only; credential presence is checked separately
    /// at startup via [`resolve_env`] so that `config validate` works
    /// without secrets in the environment.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.completion.base_url.is_empty() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "completion.base_url".into(),
                message: "base_url must not be empty".into(),
            });
        }
        if self.completion.model.is_empty() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "completion.model".into(),
                message: "model must not be empty".into(),
            });
        }

        if self.records.base_id.is_empty() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                field: "records.base_id".into(),
                message: "no base_id configured; record lookups will fail".into(),
            });
        }

        if self.index.chunk_size == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "index.chunk_size".into(),
                message: "chunk_size must be greater than 0".into(),
            });
        }
        if self.index.chunk_overlap >= self.index.chunk_size {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "index.chunk_overlap".into(),
                message: "chunk_overlap must be smaller than chunk_size".into(),
            });
        }
        if self.index.top_k == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "index.top_k".into(),
                message: "top_k must be greater than 0".into(),
            });
        }

        issues
    }
}

/// Resolve a credential from the environment variable named in config.
///
/// Missing credentials are the sole fatal error class: callers surface
/// this once at startup and refuse to accept input.
pub fn resolve_env(var: &str) -> Result<String> {
    std::env::var(var).map_err(|_| {
        Error::Config(format!(
            "environment variable '{var}' not set or not valid UTF-8"
        ))
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Default value helpers (serde)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn d_openai_url() -> String {
    "https://api.openai.com/v1".into()
}
fn d_openai_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn d_chat_model() -> String {
    "gpt-4o".into()
}
fn d_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn d_airtable_url() -> String {
    "https://api.airtable.com/v0".into()
}
fn d_airtable_key_env() -> String {
    "AIRTABLE_API_KEY".into()
}
fn d_webhook_env() -> String {
    "SUPPORT_WEBHOOK_URL".into()
}
fn d_customers() -> String {
    "Customers".into()
}
fn d_persona() -> String {
    "You are a helpful AI customer support assistant.".into()
}
fn d_register_link() -> String {
    "https://example.com/register".into()
}
fn d_500() -> usize {
    500
}
fn d_50() -> usize {
    50
}
fn d_4() -> usize {
    4
}
fn d_20000() -> u64 {
    20_000
}
fn d_10000() -> u64 {
    10_000
}
