use crate::client::{ClientConfig, DEFAULT_HOST, DEFAULT_PORT};
use std::time::Duration;

/// Process-level connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub timeout_secs: u64,
    pub suggest_max: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout_secs: 30,
            suggest_max: 25,
        }
    }
}

impl Settings {
    /// Reads `TSDB_HOST`, `TSDB_PORT`, `TSDB_TIMEOUT_SECS` and
    /// `TSDB_SUGGEST_MAX`, keeping defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(host) = lookup("TSDB_HOST") {
            let host = host.trim();
            if !host.is_empty() {
                settings.host = host.to_string();
            }
        }

        if let Some(port) = lookup("TSDB_PORT") {
            settings.port = port.trim().parse().unwrap_or(settings.port);
        }

        if let Some(timeout) = lookup("TSDB_TIMEOUT_SECS") {
            settings.timeout_secs = timeout.trim().parse().unwrap_or(settings.timeout_secs);
        }

        if let Some(max) = lookup("TSDB_SUGGEST_MAX") {
            settings.suggest_max = max.trim().parse().unwrap_or(settings.suggest_max);
        }

        settings
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// A query config pointed at the configured server.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::default();
        config.set_host(self.host.clone()).set_port(self.port);
        config
    }
}
