// Application state module
// Shared runtime state handed to every connection

use super::types::Config;
use crate::relay::Relay;

/// Application state
pub struct AppState {
    pub config: Config,
    pub relay: Relay,
}

impl AppState {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            config: config.clone(),
            relay: Relay::new(config.relay.clone(), client),
        }
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
