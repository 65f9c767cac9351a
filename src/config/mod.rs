// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{Config, RelayConfig};

/// Unprefixed environment variables read into the `relay` section
const RELAY_ENV_VARS: [(&str, &str); 5] = [
    ("WEBHOOK_SECRET", "relay.webhook_secret"),
    ("LASTRO_URL", "relay.lastro_url"),
    ("SHEET_CSV_URL", "relay.sheet_csv_url"),
    ("DEFAULT_CLIENT_LISTING_ID", "relay.default_client_listing_id"),
    ("ORIGIN", "relay.origin"),
];

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("LEAD_RELAY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.webhook_path", "/api/poptin")?
            .set_default("http.server_name", "lead-relay/0.1")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("relay.default_client_listing_id", types::DEFAULT_CLIENT_LISTING_ID)?
            .set_default("relay.origin", types::DEFAULT_ORIGIN)?;

        // Empty variables count as unset
        for (var, key) in RELAY_ENV_VARS {
            let value = std::env::var(var).ok().filter(|v| !v.is_empty());
            builder = builder.set_override_option(key, value)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
