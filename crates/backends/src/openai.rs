//! OpenAI-compatible completion and embedding client.
//!
//! Works with OpenAI, Azure-hosted deployments behind a compatible
//! proxy, Ollama, vLLM, and any other endpoint that follows the OpenAI
//! chat completions contract.

use serde_json::Value;
use std::time::Duration;

use sd_domain::chat::{Message, Role};
use sd_domain::config::CompletionConfig;
use sd_domain::error::{Error, Result};

use crate::traits::{CompletionClient, EmbeddingClient};
use crate::util::from_reqwest;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Client for an OpenAI-compatible chat completions + embeddings API.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    model: String,
    embedding_model: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Build a client from the completion config and a resolved API key.
    ///
    /// Credential resolution happens at startup; by the time this is
    /// called a missing key has already been rejected as fatal.
    pub fn from_config(cfg: &CompletionConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: cfg.model.clone(),
            embedding_model: cfg.embedding_model.clone(),
            client,
        })
    }

    fn authed_post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire format helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn build_chat_body(model: &str, messages: &[Message]) -> Value {
    let messages: Vec<Value> = messages
        .iter()
        .map(|m| {
            serde_json::json!({
                "role": role_to_str(m.role),
                "content": m.content,
            })
        })
        .collect();

    serde_json::json!({
        "model": model,
        "messages": messages,
    })
}

fn parse_chat_content(body: &Value) -> Result<String> {
    let content = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            Error::Completion("no message content in completion response".into())
        })?;

    Ok(content.trim().to_string())
}

fn parse_embeddings(body: &Value) -> Result<Vec<Vec<f32>>> {
    let data = body
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| Error::Completion("missing 'data' array in embeddings response".into()))?;

    let embeddings = data
        .iter()
        .filter_map(|item| {
            let embedding = item.get("embedding")?.as_array()?;
            Some(
                embedding
                    .iter()
                    .filter_map(|v| v.as_f64().map(|f| f as f32))
                    .collect(),
            )
        })
        .collect();

    Ok(embeddings)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementations
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = build_chat_body(&self.model, messages);

        tracing::debug!(url = %url, model = %self.model, "completion request");

        let resp = self
            .authed_post(&url)
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(Error::Completion(format!(
                "HTTP {} - {}",
                status.as_u16(),
                resp_text
            )));
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        parse_chat_content(&resp_json)
    }
}

#[async_trait::async_trait]
impl EmbeddingClient for OpenAiClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url);
        let body = serde_json::json!({
            "model": self.embedding_model,
            "input": texts,
        });

        tracing::debug!(url = %url, inputs = texts.len(), "embeddings request");

        let resp = self
            .authed_post(&url)
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(Error::Completion(format!(
                "embeddings HTTP {} - {}",
                status.as_u16(),
                resp_text
            )));
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        parse_embeddings(&resp_json)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
