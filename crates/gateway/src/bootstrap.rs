//! Startup wiring: resolve credentials, build backend clients, and
//! assemble the shared [`AppState`].
//!
//! Credential resolution happens here and nowhere else. A missing
//! environment variable is fatal: the process refuses to accept input
//! rather than failing per-message later.

use std::sync::Arc;

use anyhow::Context;

use sd_backends::airtable::AirtableRecordStore;
use sd_backends::openai::OpenAiClient;
use sd_backends::webhook::WebhookNotifier;
use sd_domain::config::{resolve_env, Config, ConfigSeverity};
use sd_router::{Router, SessionStore};

use crate::state::AppState;

/// Build the full application state from a loaded configuration.
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // Error-severity issues never reach the backends or the chunker.
    let errors: Vec<String> = config
        .validate()
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .map(|i| i.to_string())
        .collect();
    if !errors.is_empty() {
        anyhow::bail!("invalid configuration: {}", errors.join("; "));
    }

    let completion_key = resolve_env(&config.completion.api_key_env)
        .context("completion backend credential")?;
    let records_key = resolve_env(&config.records.api_key_env)
        .context("record store credential")?;
    let webhook_url = resolve_env(&config.notify.webhook_url_env)
        .context("notification webhook URL")?;

    let openai = Arc::new(
        OpenAiClient::from_config(&config.completion, completion_key)
            .context("building completion client")?,
    );
    let records = Arc::new(
        AirtableRecordStore::from_config(&config.records, records_key)
            .context("building record store client")?,
    );
    let notifier = Arc::new(
        WebhookNotifier::from_config(&config.notify, webhook_url)
            .context("building webhook notifier")?,
    );

    // One client serves both completion and embedding roles.
    let router = Arc::new(Router::new(
        openai.clone(),
        openai,
        records,
        notifier,
        config.index.clone(),
        config.assistant.clone(),
    ));

    tracing::info!(
        model = %config.completion.model,
        embedding_model = %config.completion.embedding_model,
        "backends wired"
    );

    Ok(AppState {
        config,
        router,
        sessions: Arc::new(SessionStore::new()),
    })
}
