use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 18790;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const MAX_PAYLOAD_BYTES: usize = 16 * 1024; // viewer frames are tiny: an event name and an id
pub const DEFAULT_OUTBOUND_BUFFER: usize = 256; // per-connection frames queued before drops
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30; // tick event cadence

/// Top-level config (pitchside.toml + PITCHSIDE_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PitchsideConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub hub: HubConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// Fan-out tuning for the broadcast hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Capacity of each connection's outbound queue. Frames published while
    /// the queue is full are dropped for that connection only.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,
    /// Seconds between `tick` heartbeats. 0 disables the heartbeat.
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
            heartbeat_secs: HEARTBEAT_INTERVAL_SECS,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_outbound_buffer() -> usize {
    DEFAULT_OUTBOUND_BUFFER
}
fn default_heartbeat_secs() -> u64 {
    HEARTBEAT_INTERVAL_SECS
}

impl PitchsideConfig {
    /// Load config from a TOML file with PITCHSIDE_* env var overrides.
    ///
    /// Reads `config_path` when given, otherwise ~/.pitchside/pitchside.toml.
    /// Env vars win over the file; nested keys use `__`
    /// (`PITCHSIDE_HUB__OUTBOUND_BUFFER`).
    ///
    /// A missing file is not an error: figment skips it and the serde
    /// defaults fill every section.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Self::from_figment(
            Figment::new()
                .merge(Toml::file(&path))
                .merge(Env::prefixed("PITCHSIDE_").split("__")),
        )
    }

    /// Parse config from an in-memory TOML document (no env overrides).
    pub fn from_toml_str(toml: &str) -> crate::error::Result<Self> {
        Self::from_figment(Figment::new().merge(Toml::string(toml)))
    }

    fn from_figment(figment: Figment) -> crate::error::Result<Self> {
        let config: PitchsideConfig = figment
            .extract()
            .map_err(|e| crate::error::PitchsideError::Config(e.to_string()))?;

        if config.hub.outbound_buffer == 0 {
            return Err(crate::error::PitchsideError::Config(
                "hub.outbound_buffer must be at least 1".to_string(),
            ));
        }

        tracing::debug!(
            bind = %config.gateway.bind,
            port = config.gateway.port,
            outbound_buffer = config.hub.outbound_buffer,
            "config loaded"
        );
        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.pitchside/pitchside.toml", home)
}
