//! Lead payloads
//!
//! `InboundLead` is what the popup provider posts, `OutboundLead` is what the
//! CRM accepts. Every inbound field is optional and falls back to a default.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Name used when the form carried no name at all
pub const ANONYMOUS_NAME: &str = "Lead sem nome";

const NO_CAMPAIGN: &str = "(sem nome)";
const NO_URL: &str = "(sem url)";
const NO_MESSAGE: &str = "(sem mensagem)";

/// Brazil country calling code
const COUNTRY_CODE: &str = "55";

/// Lead event as posted by the popup provider
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundLead {
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub referrer: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub poptin_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: Option<String>,
}

/// Accept strings, non-zero numbers and `true`; treat `null`, `false`, `0`, `""` and containers as absent
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) if n.as_f64().is_some_and(|f| f.abs() > 0.0) => Some(n.to_string()),
        Some(Value::Bool(true)) => Some("true".to_string()),
        _ => None,
    })
}

impl InboundLead {
    /// `full_name`, then first + last name, then [`ANONYMOUS_NAME`]
    pub fn display_name(&self) -> String {
        if let Some(full) = &self.full_name {
            return full.clone();
        }
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let joined = joined.trim();
        if joined.is_empty() {
            ANONYMOUS_NAME.to_string()
        } else {
            joined.to_string()
        }
    }

    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    pub fn raw_phone(&self) -> &str {
        self.phone.as_deref().unwrap_or_default()
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default().trim()
    }

    /// Page the form was submitted from: `url`, then `referrer`
    pub fn page_url(&self) -> &str {
        self.url
            .as_deref()
            .or(self.referrer.as_deref())
            .unwrap_or_default()
    }

    /// Raw campaign name used for routing: `poptin_name`, then `source`
    pub fn campaign_key(&self) -> &str {
        self.poptin_name
            .as_deref()
            .or(self.source.as_deref())
            .unwrap_or_default()
    }

    /// Human readable summary for the CRM, never empty
    pub fn form_text(&self) -> String {
        let campaign = self.poptin_name.as_deref().unwrap_or(NO_CAMPAIGN);
        let url = non_empty_or(self.page_url(), NO_URL);
        let message = non_empty_or(self.message(), NO_MESSAGE);
        format!("Lead via Poptin | Poptin: {campaign} | Página: {url} | Mensagem: {message}")
    }
}

fn non_empty_or<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

/// Phone number split into area code (DDD) and subscriber number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneParts {
    pub area_code: Option<String>,
    pub number: String,
}

impl PhoneParts {
    /// Split a free-form phone string
    ///
    /// Non-digits are dropped. `55` + at least 10 more digits is read as
    /// country code, area code, number; 10+ digits as area code, number;
    /// anything shorter is kept whole with no area code.
    pub fn split(raw: &str) -> Self {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

        let (area_code, number) = if digits.starts_with(COUNTRY_CODE) && digits.len() >= 12 {
            (&digits[2..4], &digits[4..])
        } else if digits.len() >= 10 {
            (&digits[..2], &digits[2..])
        } else {
            ("", digits.as_str())
        };

        Self {
            area_code: (!area_code.is_empty()).then(|| area_code.to_string()),
            number: number.to_string(),
        }
    }
}

/// Lead in the CRM's schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundLead {
    pub name: String,
    pub phone: String,
    pub form_text: String,
    pub client_listing_id: String,
    pub origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ddd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl OutboundLead {
    pub fn build(lead: &InboundLead, client_listing_id: String, origin: &str) -> Self {
        let phone = PhoneParts::split(lead.raw_phone());
        let optional = |value: &str| (!value.is_empty()).then(|| value.to_string());

        Self {
            name: lead.display_name(),
            phone: phone.number,
            form_text: lead.form_text(),
            client_listing_id,
            origin: origin.to_string(),
            ddd: phone.area_code,
            email: optional(lead.email()),
            link: optional(lead.page_url()),
        }
    }
}
