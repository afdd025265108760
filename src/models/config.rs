//! Configuration model loaded from external sources.

use std::env;
use std::time::Duration;

use config::{Config, ConfigError};
use serde::Deserialize;

use crate::domain::scan_buffer::DEFAULT_KEY_GAP;

/// Grace period, in milliseconds, the lot-completion notice stays on screen
/// before the next lot is shown.
pub const DEFAULT_LOT_ADVANCE_NOTICE_MS: u64 = 1000;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub templates_dir: String,
    pub secret: String,
    pub auth_service_url: String,
    #[serde(default = "default_lot_advance_notice_ms")]
    pub lot_advance_notice_ms: u64,
    #[serde(default = "default_scan_key_gap_ms")]
    pub scan_key_gap_ms: u64,
}

impl ServerConfig {
    /// Loads `config/default.yaml`, the optional `config/{APP_ENV}.yaml`
    /// profile (defaults to `local`) and `APP_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

        Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(config::Environment::with_prefix("APP"))
            .build()?
            .try_deserialize()
    }

    pub fn lot_advance_notice(&self) -> Duration {
        Duration::from_millis(self.lot_advance_notice_ms)
    }

    pub fn scan_key_gap(&self) -> Duration {
        Duration::from_millis(self.scan_key_gap_ms)
    }
}

fn default_lot_advance_notice_ms() -> u64 {
    DEFAULT_LOT_ADVANCE_NOTICE_MS
}

fn default_scan_key_gap_ms() -> u64 {
    DEFAULT_KEY_GAP.as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_settings_fall_back_to_defaults() {
        let config: ServerConfig = Config::builder()
            .set_override("domain", "localhost")
            .unwrap()
            .set_override("address", "127.0.0.1")
            .unwrap()
            .set_override("port", 8080)
            .unwrap()
            .set_override("database_url", "app.db")
            .unwrap()
            .set_override("templates_dir", "templates/**/*")
            .unwrap()
            .set_override("secret", "secret")
            .unwrap()
            .set_override("auth_service_url", "http://localhost:8000")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.lot_advance_notice(), Duration::from_millis(1000));
        assert_eq!(config.scan_key_gap(), DEFAULT_KEY_GAP);
    }
}
