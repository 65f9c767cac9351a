//! Relay error types
//!
//! Every failure is terminal for the request. Each variant knows the HTTP
//! status and JSON body it is reported with.

use hyper::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Largest upstream body excerpt echoed back to the caller, in characters
pub const UPSTREAM_BODY_LIMIT: usize = 2000;

#[derive(Debug, Error)]
pub enum RelayError {
    /// Anything but POST on the webhook endpoint
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// A required setting is absent
    #[error("Missing {var} env var")]
    ServerMisconfigured { var: &'static str },

    /// Secret query parameter missing or wrong
    #[error("Forbidden")]
    Forbidden,

    /// Lookup table could not be retrieved
    #[error("Failed to fetch CSV: {reason}")]
    FetchError { reason: String },

    /// Body parse failure or any other failure inside the request pipeline
    #[error("{message}")]
    InvalidRequest { message: String },

    /// CRM answered with something other than 200/201
    #[error("Lastro returned non-success status")]
    UpstreamRejected { status: u16, body: String },
}

impl RelayError {
    pub fn fetch(reason: impl Into<String>) -> Self {
        Self::FetchError {
            reason: reason.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Build an upstream rejection, keeping at most [`UPSTREAM_BODY_LIMIT`] characters of the body
    pub fn upstream(status: u16, body: &str) -> Self {
        Self::UpstreamRejected {
            status,
            body: body.chars().take(UPSTREAM_BODY_LIMIT).collect(),
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::ServerMisconfigured { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::FetchError { .. } | Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::UpstreamRejected { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// JSON body reported to the caller
    pub fn to_json(&self) -> Value {
        match self {
            Self::FetchError { .. } | Self::InvalidRequest { .. } => json!({
                "success": false,
                "message": "Invalid request body",
                "error": self.to_string(),
            }),
            Self::UpstreamRejected { status, body } => json!({
                "success": false,
                "message": self.to_string(),
                "lastroStatus": status,
                "lastroBody": body,
            }),
            _ => json!({
                "success": false,
                "message": self.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(RelayError::MethodNotAllowed.status_code(), 405);
        assert_eq!(
            RelayError::ServerMisconfigured { var: "LASTRO_URL" }.status_code(),
            500
        );
        assert_eq!(RelayError::Forbidden.status_code(), 403);
        assert_eq!(RelayError::fetch("404").status_code(), 400);
        assert_eq!(RelayError::invalid("bad json").status_code(), 400);
        assert_eq!(RelayError::upstream(500, "boom").status_code(), 502);
    }

    #[test]
    fn test_misconfigured_message_names_variable() {
        let body = RelayError::ServerMisconfigured {
            var: "WEBHOOK_SECRET",
        }
        .to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Missing WEBHOOK_SECRET env var");
    }

    #[test]
    fn test_pipeline_errors_share_invalid_request_body() {
        let body = RelayError::fetch("404").to_json();
        assert_eq!(body["message"], "Invalid request body");
        assert_eq!(body["error"], "Failed to fetch CSV: 404");
    }

    #[test]
    fn test_upstream_body_is_truncated_by_chars() {
        let long = "é".repeat(UPSTREAM_BODY_LIMIT + 500);
        let RelayError::UpstreamRejected { body, .. } = RelayError::upstream(500, &long) else {
            panic!("expected upstream rejection");
        };
        assert_eq!(body.chars().count(), UPSTREAM_BODY_LIMIT);
    }
}
