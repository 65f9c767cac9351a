//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: health checks, the webhook
//! endpoint, body size enforcement and access logging.

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::relay::{RelayError, RelayResponse};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_LENGTH, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let access_log = state.access_log_enabled();

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.http_version = version_label(req.version()).to_string();
    entry.user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let response = route_request(req, &state).await;

    if access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on path and configuration
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let server_name = &state.config.http.server_name;
    let path = req.uri().path();
    let health = &state.config.routes.health;

    // Health check endpoints (highest priority, always fast)
    if health.enabled && (path == health.liveness_path || path == health.readiness_path) {
        return http::build_health_response("ok", server_name);
    }

    if path != state.config.http.webhook_path {
        return http::build_404_response(server_name);
    }

    serve_webhook(req, state).await
}

/// Collect the body and run the relay pipeline
async fn serve_webhook<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let server_name = &state.config.http.server_name;
    let max_body_size = state.config.http.max_body_size;

    if exceeds_declared_length(&req, max_body_size) {
        return http::build_413_response(server_name);
    }

    let (parts, body) = req.into_parts();

    // Other methods are rejected by the relay without reading the body
    let body = if parts.method == Method::POST {
        let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
        match Limited::new(body, limit).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                logger::log_warning(&format!("Request body exceeded {max_body_size} bytes"));
                return http::build_413_response(server_name);
            }
            Err(e) => {
                let outcome = RelayResponse::from(RelayError::invalid(format!(
                    "Failed to read request body: {e}"
                )));
                return http::json_response(outcome.status, &outcome.body, server_name);
            }
        }
    } else {
        Bytes::new()
    };

    let outcome = state
        .relay
        .handle(&parts.method, parts.uri.query(), &body)
        .await;
    http::json_response(outcome.status, &outcome.body, server_name)
}

/// Whether Content-Length announces a body above the limit
fn exceeds_declared_length<B>(req: &Request<B>, max_body_size: u64) -> bool {
    let Some(content_length) = req.headers().get(CONTENT_LENGTH) else {
        return false;
    };
    match content_length.to_str().ok().map(str::parse::<u64>) {
        Some(Ok(size)) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            true
        }
        Some(Ok(_)) => false,
        _ => {
            logger::log_warning("Invalid Content-Length header, skipping size check");
            false
        }
    }
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use hyper::StatusCode;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().expect("valid addr")
    }

    fn state_for(server: &MockServer) -> Arc<AppState> {
        let mut config = Config::default();
        config.logging.access_log = false;
        config.http.max_body_size = 256;
        config.relay.webhook_secret = Some("s3cret".to_string());
        config.relay.lastro_url = Some(format!("{}/leads", server.uri()));
        config.relay.sheet_csv_url = Some(format!("{}/sheet.csv", server.uri()));
        Arc::new(AppState::new(&config, reqwest::Client::new()))
    }

    fn request(method: &str, uri: &str, body: impl Into<Bytes>) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(body.into()))
            .expect("valid request")
    }

    async fn send(req: Request<Full<Bytes>>, state: Arc<AppState>) -> (StatusCode, Value) {
        let response = handle_request(req, state, peer()).await.expect("infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("infallible body")
            .to_bytes();
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let server = MockServer::start().await;
        let state = state_for(&server);
        for path in ["/healthz", "/readyz"] {
            let (status, body) = send(request("GET", path, ""), Arc::clone(&state)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "ok");
        }
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let server = MockServer::start().await;
        let (status, body) = send(request("POST", "/other?secret=s3cret", "{}"), state_for(&server)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_webhook_get_is_method_not_allowed() {
        let server = MockServer::start().await;
        let (status, body) = send(request("GET", "/api/poptin?secret=s3cret", ""), state_for(&server)).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let server = MockServer::start().await;
        let big = format!("{{\"message\":\"{}\"}}", "x".repeat(1000));
        let (status, _) = send(request("POST", "/api/poptin?secret=s3cret", big), state_for(&server)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_declared_length_over_limit_rejected() {
        let server = MockServer::start().await;
        let req = Request::builder()
            .method("POST")
            .uri("/api/poptin?secret=s3cret")
            .header(CONTENT_LENGTH, "100000")
            .body(Full::new(Bytes::from_static(b"{}")))
            .expect("valid request");
        let (status, _) = send(req, state_for(&server)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_webhook_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sheet.csv"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("poptin_name,clientListingId\nTorre A,123\n"),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/leads"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let body = json!({"full_name": "Ana", "poptin_name": "Torre A"}).to_string();
        let (status, body) = send(request("POST", "/api/poptin?secret=s3cret", body), state_for(&server)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["clientListingIdResolved"], "123");
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_2), "2");
    }
}
