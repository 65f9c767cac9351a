//! Webhook request pipeline
//!
//! Method and secret checks run first and answer with their own status codes.
//! Everything after the body parse sits behind one error boundary that turns
//! any failure into a 400.

use std::time::Duration;

use hyper::{Method, StatusCode};
use serde_json::{json, Value};

use super::error::{RelayError, Result};
use super::lead::{InboundLead, OutboundLead};
use super::mapping::fetch_mapping;
use super::normalize::normalize_campaign_name;
use crate::config::RelayConfig;
use crate::logger;

/// Query parameter carrying the shared secret
const SECRET_PARAM: &str = "secret";

/// Status and JSON body produced for one webhook call
#[derive(Debug, Clone, PartialEq)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl RelayResponse {
    fn forwarded(upstream_status: u16, client_listing_id: &str) -> Self {
        Self {
            status: StatusCode::CREATED,
            body: json!({
                "success": true,
                "message": "Forwarded to Lastro",
                "lastroStatus": upstream_status,
                "clientListingIdResolved": client_listing_id,
            }),
        }
    }
}

impl From<RelayError> for RelayResponse {
    fn from(err: RelayError) -> Self {
        Self {
            status: err.status_code(),
            body: err.to_json(),
        }
    }
}

/// Relays popup leads to the CRM
pub struct Relay {
    config: RelayConfig,
    client: reqwest::Client,
}

impl Relay {
    pub const fn new(config: RelayConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Run the whole pipeline for one inbound request
    pub async fn handle(&self, method: &Method, query: Option<&str>, body: &[u8]) -> RelayResponse {
        match self.process(method, query, body).await {
            Ok(response) => response,
            Err(err) => {
                match &err {
                    RelayError::ServerMisconfigured { .. } => logger::log_error(&err.to_string()),
                    RelayError::UpstreamRejected { status, .. } => {
                        logger::log_warning(&format!("[Relay] Lastro rejected lead with HTTP {status}"));
                    }
                    _ => logger::log_warning(&format!("[Relay] {err}")),
                }
                err.into()
            }
        }
    }

    async fn process(&self, method: &Method, query: Option<&str>, body: &[u8]) -> Result<RelayResponse> {
        if method != Method::POST {
            return Err(RelayError::MethodNotAllowed);
        }
        self.authorize(query)?;

        let lead = parse_body(body)?;

        let lastro_url = required(self.config.lastro_url.as_deref(), "LASTRO_URL")?;
        let sheet_url = required(self.config.sheet_csv_url.as_deref(), "SHEET_CSV_URL")?;

        let campaign = normalize_campaign_name(lead.campaign_key());
        let mapping = fetch_mapping(&self.client, sheet_url, self.upstream_timeout()).await?;
        let client_listing_id = mapping
            .get(&campaign)
            .cloned()
            .unwrap_or_else(|| self.config.default_client_listing_id.clone());
        logger::log_debug(&format!(
            "[Relay] campaign '{campaign}' resolved to '{client_listing_id}'"
        ));

        let outbound = OutboundLead::build(&lead, client_listing_id.clone(), &self.config.origin);
        let (status, text) = self.forward(lastro_url, &outbound).await?;

        if status == 200 || status == 201 {
            logger::log_info(&format!(
                "[Relay] Lead forwarded (HTTP {status}, clientListingId={client_listing_id})"
            ));
            Ok(RelayResponse::forwarded(status, &client_listing_id))
        } else {
            Err(RelayError::upstream(status, &text))
        }
    }

    /// Compare the `secret` query parameter against the configured one
    fn authorize(&self, query: Option<&str>) -> Result<()> {
        let expected = required(self.config.webhook_secret.as_deref(), "WEBHOOK_SECRET")?;

        let supplied: Vec<String> = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
            .filter(|(key, _)| key == SECRET_PARAM)
            .map(|(_, value)| value.into_owned())
            .collect();

        // A repeated parameter is never a match
        match supplied.as_slice() {
            [secret] if secret == expected => Ok(()),
            _ => Err(RelayError::Forbidden),
        }
    }

    /// POST the lead to the CRM, returning its status and body text
    async fn forward(&self, url: &str, lead: &OutboundLead) -> Result<(u16, String)> {
        let mut request = self.client.post(url).json(lead);
        if let Some(timeout) = self.upstream_timeout() {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RelayError::invalid(format!("Failed to reach Lastro: {e}")))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| RelayError::invalid(format!("Failed to read Lastro response: {e}")))?;
        Ok((status, text))
    }

    fn upstream_timeout(&self) -> Option<Duration> {
        self.config.upstream_timeout.map(Duration::from_secs)
    }
}

fn required<'a>(value: Option<&'a str>, var: &'static str) -> Result<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(RelayError::ServerMisconfigured { var })
}

/// Parse the body as JSON, unwrapping one level of JSON-encoded string
///
/// Only objects carry lead fields. Arrays and other scalars yield an empty
/// lead, `null` is rejected.
fn parse_body(body: &[u8]) -> Result<InboundLead> {
    let invalid = |e: serde_json::Error| RelayError::invalid(e.to_string());

    let mut value: Value = serde_json::from_slice(body).map_err(invalid)?;
    if let Value::String(inner) = value {
        value = serde_json::from_str(&inner).map_err(invalid)?;
    }
    match value {
        Value::Object(_) => serde_json::from_value(value).map_err(invalid),
        Value::Null => Err(RelayError::invalid("Request body is null")),
        _ => Ok(InboundLead::default()),
    }
}
