// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

use crate::logger::LogLevel;

pub const DEFAULT_CLIENT_LISTING_ID: &str = "site-poptin";
pub const DEFAULT_ORIGIN: &str = "PropWebsiteLais";

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            workers: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub access_log: bool,
    /// Access log format (combined, common or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            access_log: true,
            access_log_format: default_access_log_format(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 30,
            max_connections: None,
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Path the popup provider posts leads to
    pub webhook_path: String,
    pub server_name: String,
    pub max_body_size: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            webhook_path: "/api/poptin".to_string(),
            server_name: "lead-relay/0.1".to_string(),
            max_body_size: 1_048_576,
        }
    }
}

/// Routes configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RoutesConfig {
    /// Health check configuration
    #[serde(default)]
    pub health: HealthConfig,
}

/// Health check configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Liveness check path (default: /healthz)
    #[serde(default = "default_healthz_path")]
    pub liveness_path: String,
    /// Readiness check path (default: /readyz)
    #[serde(default = "default_readyz_path")]
    pub readiness_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_enabled() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_healthz_path() -> String {
    "/healthz".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_readyz_path() -> String {
    "/readyz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            liveness_path: default_healthz_path(),
            readiness_path: default_readyz_path(),
        }
    }
}

/// Lead relay configuration
///
/// The three endpoints are optional here so a half-configured deployment
/// still starts; the webhook reports what is missing per request.
#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    /// Shared secret expected in the `secret` query parameter
    #[serde(default)]
    pub webhook_secret: Option<String>,
    /// CRM endpoint leads are forwarded to
    #[serde(default)]
    pub lastro_url: Option<String>,
    /// Lookup sheet export (CSV)
    #[serde(default)]
    pub sheet_csv_url: Option<String>,
    #[serde(default = "default_client_listing_id")]
    pub default_client_listing_id: String,
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Timeout in seconds for outbound calls; none when unset
    #[serde(default)]
    pub upstream_timeout: Option<u64>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_client_listing_id() -> String {
    DEFAULT_CLIENT_LISTING_ID.to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_origin() -> String {
    DEFAULT_ORIGIN.to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            webhook_secret: None,
            lastro_url: None,
            sheet_csv_url: None,
            default_client_listing_id: default_client_listing_id(),
            origin: default_origin(),
            upstream_timeout: None,
        }
    }
}
