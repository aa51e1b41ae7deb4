//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all, see [`Config::load_or_default`]) yields a working configuration that
//! points at a local broker.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::{DashboardError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub broker: BrokerConfig,
    #[serde(default)]
    pub topics: TopicConfig,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Broker connection configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_client_id_prefix")]
    pub client_id_prefix: String,

    #[serde(default = "default_keep_alive_s")]
    pub keep_alive_s: u64,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

/// Subscribed topic names
#[derive(Debug, Deserialize, Clone)]
pub struct TopicConfig {
    #[serde(default = "default_temperature_topic")]
    pub temperature: String,

    #[serde(default = "default_rotation_topic")]
    pub rotation: String,
}

/// Reconnect policy
#[derive(Debug, Deserialize, Clone)]
pub struct ReconnectConfig {
    #[serde(default = "default_reconnect_interval_ms")]
    pub interval_ms: u64,

    /// Also retry after an established link drops, not only after a failed connect
    #[serde(default = "default_reconnect_on_link_loss")]
    pub on_link_loss: bool,
}

/// In-memory history sizes and trend threshold
#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "default_temperature_capacity")]
    pub temperature_capacity: usize,

    #[serde(default = "default_rotation_capacity")]
    pub rotation_capacity: usize,

    #[serde(default = "default_event_log_size")]
    pub event_log_size: usize,

    #[serde(default = "default_trend_deadband")]
    pub trend_deadband: f64,
}

/// Offline simulated feed
#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_simulation_interval_ms")]
    pub interval_ms: u64,
}

// Default value functions
fn default_host() -> String { "localhost".to_string() }
fn default_port() -> u16 { 1883 }
fn default_client_id_prefix() -> String { "dashboard_".to_string() }
fn default_keep_alive_s() -> u64 { 60 }
fn default_connect_timeout_ms() -> u64 { 5000 }

fn default_temperature_topic() -> String { "sensors/temperature".to_string() }
fn default_rotation_topic() -> String { "sensors/rotation".to_string() }

fn default_reconnect_interval_ms() -> u64 { 5000 }
fn default_reconnect_on_link_loss() -> bool { true }

fn default_temperature_capacity() -> usize { 100 }
fn default_rotation_capacity() -> usize { 50 }
fn default_event_log_size() -> usize { 10 }
fn default_trend_deadband() -> f64 { 0.1 }

fn default_simulation_interval_ms() -> u64 { 5000 }

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            client_id_prefix: default_client_id_prefix(),
            keep_alive_s: default_keep_alive_s(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature_topic(),
            rotation: default_rotation_topic(),
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_reconnect_interval_ms(),
            on_link_loss: default_reconnect_on_link_loss(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            temperature_capacity: default_temperature_capacity(),
            rotation_capacity: default_rotation_capacity(),
            event_log_size: default_event_log_size(),
            trend_deadband: default_trend_deadband(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: default_simulation_interval_ms(),
        }
    }
}

impl BrokerConfig {
    /// Broker address as shown on the dashboard (`host:port`)
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use telemetry_dashboard::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load configuration, falling back to defaults when the file does not exist
    ///
    /// A file that exists but is invalid is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            let config = Config::default();
            config.validate()?;
            return Ok(config);
        }
        Self::load(path)
    }

    /// Parse and validate configuration from a TOML string
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.broker.host.is_empty() {
            return Err(invalid("broker host cannot be empty"));
        }

        if self.broker.port == 0 {
            return Err(invalid("broker port must be greater than 0"));
        }

        if self.broker.keep_alive_s < 5 || self.broker.keep_alive_s > 3600 {
            return Err(invalid("keep_alive_s must be between 5 and 3600"));
        }

        if self.broker.connect_timeout_ms == 0 || self.broker.connect_timeout_ms > 60000 {
            return Err(invalid("connect_timeout_ms must be between 1 and 60000"));
        }

        if self.topics.temperature.is_empty() || self.topics.rotation.is_empty() {
            return Err(invalid("topic names cannot be empty"));
        }

        if self.topics.temperature == self.topics.rotation {
            return Err(invalid("temperature and rotation topics must differ"));
        }

        if self.reconnect.interval_ms == 0 || self.reconnect.interval_ms > 60000 {
            return Err(invalid("reconnect interval_ms must be between 1 and 60000"));
        }

        for (name, value) in [
            ("temperature_capacity", self.history.temperature_capacity),
            ("rotation_capacity", self.history.rotation_capacity),
            ("event_log_size", self.history.event_log_size),
        ] {
            if value == 0 {
                return Err(invalid(&format!("{} must be greater than 0", name)));
            }
        }

        if !self.history.trend_deadband.is_finite() || self.history.trend_deadband < 0.0 {
            return Err(invalid("trend_deadband must be a non-negative number"));
        }

        if self.simulation.interval_ms == 0 || self.simulation.interval_ms > 60000 {
            return Err(invalid("simulation interval_ms must be between 1 and 60000"));
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> DashboardError {
    DashboardError::Config(toml::de::Error::custom(msg))
}
