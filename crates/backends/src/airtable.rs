//! Airtable-style customer record store client.
//!
//! Looks up customers by email with a case-insensitive `filterByFormula`
//! query against `{base_url}/{base_id}/{table}` and maps the returned
//! `fields` object onto [`CustomerRecord`], filling documented
//! placeholders for missing fields.

use serde_json::Value;
use std::time::Duration;

use sd_domain::config::RecordStoreConfig;
use sd_domain::error::{Error, Result};

use crate::record::CustomerRecord;
use crate::traits::RecordStore;
use crate::util::from_reqwest;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug)]
pub struct AirtableRecordStore {
    base_url: String,
    api_key: String,
    base_id: String,
    table: String,
    client: reqwest::Client,
}

impl AirtableRecordStore {
    pub fn from_config(cfg: &RecordStoreConfig, api_key: String) -> Result<Self> {
        if cfg.base_id.is_empty() {
            return Err(Error::Config("records.base_id is not configured".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            base_id: cfg.base_id.clone(),
            table: cfg.table.clone(),
            client,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/{}/{}", self.base_url, self.base_id, self.table)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response mapping
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Build the case-insensitive email match formula.
///
/// Single quotes in the email are doubled so they cannot terminate the
/// formula string early.
fn email_filter_formula(email: &str) -> String {
    let escaped = email.to_lowercase().replace('\'', "''");
    format!("LOWER({{Email}}) = '{escaped}'")
}

/// Map the first matching record's `fields` object to a [`CustomerRecord`].
fn parse_first_record(body: &Value) -> Option<CustomerRecord> {
    let fields = body
        .get("records")
        .and_then(|r| r.as_array())
        .and_then(|a| a.first())
        .and_then(|record| record.get("fields"))?;

    Some(CustomerRecord {
        name: str_field(fields, "Name").unwrap_or_else(|| "N/A".into()),
        plan: str_field(fields, "SubscriptionPlan").unwrap_or_else(|| "Unknown".into()),
        last_order_status: str_field(fields, "LastOrderStatus")
            .unwrap_or_else(|| "Unknown".into()),
        open_ticket_count: fields
            .get("SupportTickets")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32,
    })
}

fn str_field(fields: &Value, key: &str) -> Option<String> {
    fields.get(key).and_then(|v| v.as_str()).map(String::from)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl RecordStore for AirtableRecordStore {
    async fn lookup(&self, email: &str) -> Result<Option<CustomerRecord>> {
        let url = self.table_url();
        let formula = email_filter_formula(email);

        tracing::debug!(table = %self.table, "record store lookup");

        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .query(&[("filterByFormula", formula.as_str()), ("maxRecords", "1")])
            .send()
            .await
            .map_err(|e| Error::Lookup(from_reqwest(e).to_string()))?;

        let status = resp.status();
        let resp_text = resp
            .text()
            .await
            .map_err(|e| Error::Lookup(from_reqwest(e).to_string()))?;

        if !status.is_success() {
            return Err(Error::Lookup(format!(
                "HTTP {} - {}",
                status.as_u16(),
                resp_text
            )));
        }

        let body: Value = serde_json::from_str(&resp_text)
            .map_err(|e| Error::Lookup(format!("malformed response: {e}")))?;

        Ok(parse_first_record(&body))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
