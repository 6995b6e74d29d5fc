use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConferenceError, Result};

/// Environment variable prefix, e.g. `CONFERENCE__API__LISTEN_ADDR`
pub const ENV_PREFIX: &str = "CONFERENCE";

/// Conference service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Telephony engine connection settings
    pub ari: AriConfig,

    /// Conference behaviour
    pub conference: ConferenceConfig,

    /// Sibling services
    pub peers: PeersConfig,

    /// Record retention
    pub database: DatabaseConfig,

    /// Inbound RPC surface
    pub api: ApiConfig,

    /// Logging
    pub logging: LoggingConfig,
}

/// Telephony engine connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AriConfig {
    /// Stasis application name
    pub application: String,

    /// ARI user
    pub username: String,

    /// ARI password
    pub password: String,

    /// One entry per engine instance
    pub instances: Vec<AriInstanceConfig>,

    /// Delay between reconnect attempts (milliseconds)
    pub reconnect_delay_ms: u64,

    /// REST command timeout (milliseconds)
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AriInstanceConfig {
    pub asterisk_id: String,
    /// Events websocket, e.g. `ws://10.164.0.5:8088/ari/events`
    pub websocket_url: String,
    /// REST root, e.g. `http://10.164.0.5:8088/ari`
    pub rest_url: String,
}

/// Conference behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConferenceConfig {
    /// Timeout applied when a requested timeout is too short (seconds)
    pub default_timeout_secs: u32,

    /// Shortest accepted non-zero timeout (seconds)
    pub min_timeout_secs: u32,

    /// How long to wait for a referenced channel/bridge to show up (milliseconds)
    pub existence_check_timeout_ms: u64,

    /// Recording file format
    pub recording_format: String,

    /// Recording length cap (seconds)
    pub recording_max_duration_secs: u32,
}

/// Sibling services
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PeersConfig {
    pub call_manager_url: String,
    pub flow_manager_url: String,
    /// Peer request timeout (milliseconds)
    pub request_timeout_ms: u64,
}

/// Record retention
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// How long ended channels, bridges, conferences and recordings stay readable (seconds)
    pub retention_secs: u64,

    /// Interval between retention sweeps (seconds)
    pub sweep_interval_secs: u64,
}

/// Inbound RPC surface
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub listen_addr: String,
    pub default_page_size: usize,
}

/// Logging
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub file_info: bool,
}

impl ServiceConfig {
    /// Defaults, then the optional file, then `CONFERENCE__*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| ConferenceError::config(format!("Failed to load configuration: {}", e)))?;
        let config: ServiceConfig = settings
            .try_deserialize()
            .map_err(|e| ConferenceError::config(format!("Invalid configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> Result<()> {
        if self.ari.application.is_empty() {
            return Err(ConferenceError::config("ari.application cannot be empty"));
        }

        for instance in &self.ari.instances {
            if instance.asterisk_id.is_empty() {
                return Err(ConferenceError::config("ari instance asterisk_id cannot be empty"));
            }
            if instance.websocket_url.is_empty() || instance.rest_url.is_empty() {
                return Err(ConferenceError::config(format!(
                    "ari instance {} needs both websocket_url and rest_url",
                    instance.asterisk_id
                )));
            }
        }

        if self.conference.min_timeout_secs == 0 {
            return Err(ConferenceError::config("conference.min_timeout_secs must be greater than 0"));
        }

        if self.conference.default_timeout_secs < self.conference.min_timeout_secs {
            return Err(ConferenceError::config(
                "conference.default_timeout_secs cannot be below min_timeout_secs",
            ));
        }

        if self.api.listen_addr.parse::<SocketAddr>().is_err() {
            return Err(ConferenceError::config(format!(
                "Invalid api.listen_addr: {}",
                self.api.listen_addr
            )));
        }

        if self.database.sweep_interval_secs == 0 {
            return Err(ConferenceError::config("database.sweep_interval_secs must be greater than 0"));
        }

        if self.api.default_page_size == 0 {
            return Err(ConferenceError::config("api.default_page_size must be greater than 0"));
        }

        Ok(())
    }
}

impl AriConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Events url of an instance with the application and credentials attached
    pub fn websocket_url_for(&self, instance: &AriInstanceConfig) -> String {
        let separator = if instance.websocket_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}app={}&api_key={}:{}&subscribeAll=true",
            instance.websocket_url, separator, self.application, self.username, self.password
        )
    }
}

impl ConferenceConfig {
    pub fn existence_check_timeout(&self) -> Duration {
        Duration::from_millis(self.existence_check_timeout_ms)
    }

    /// Timeouts in `(0, min_timeout_secs)` become the default; others pass through
    pub fn clamp_timeout(&self, timeout: u32) -> u32 {
        if timeout > 0 && timeout < self.min_timeout_secs {
            self.default_timeout_secs
        } else {
            timeout
        }
    }
}

impl PeersConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl DatabaseConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for AriConfig {
    fn default() -> Self {
        Self {
            application: "voipbin".to_string(),
            username: "asterisk".to_string(),
            password: "asterisk".to_string(),
            instances: Vec::new(),
            reconnect_delay_ms: 1000,
            request_timeout_ms: 3000,
        }
    }
}

impl Default for ConferenceConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: 86400, // 24 hours
            min_timeout_secs: 60,
            existence_check_timeout_ms: 3000,
            recording_format: "wav".to_string(),
            recording_max_duration_secs: 10800, // 3 hours
        }
    }
}

impl Default for PeersConfig {
    fn default() -> Self {
        Self {
            call_manager_url: "http://127.0.0.1:8081".to_string(),
            flow_manager_url: "http://127.0.0.1:8082".to_string(),
            request_timeout_ms: 5000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            retention_secs: 3600,
            sweep_interval_secs: 60,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8090".to_string(),
            default_page_size: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_info: false,
        }
    }
}
