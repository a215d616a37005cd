//! Relay configuration, loaded from a single TOML file.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RelayConfig {
    pub mqtt: MqttConfig,
    pub influx: InfluxConfig,
    pub serial: SerialConfig,
    pub network: NetworkConfig,
    pub ota: OtaConfig,
}

impl RelayConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_content = fs::read_to_string(&path)?;
        let config: RelayConfig =
            toml::from_str(&config_content).map_err(|e| Error::Config(e.to_string()))?;
        Ok(config)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MqttConfig {
    pub broker: String,
    pub port: u16,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_keep_alive")]
    pub keep_alive: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_reconnect_backoff")]
    pub reconnect_backoff_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InfluxConfig {
    pub url: String,
    pub org: String,
    pub bucket: String,
    pub token: String,
    #[serde(default = "default_measurement")]
    pub measurement: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SerialConfig {
    /// Serial port path (e.g. "/dev/ttyS2")
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NetworkConfig {
    #[serde(default = "default_interface")]
    pub interface: String,
    /// Shell command run to request a wireless reassociation, e.g.
    /// "wpa_cli -i wlan0 reassociate". Logged and skipped when unset.
    pub reassociate_cmd: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OtaConfig {
    pub url: String,
    pub token: String,
    #[serde(default = "default_firmware_version")]
    pub firmware_version: String,
    #[serde(default = "default_sync_interval")]
    pub sync_interval_secs: u64,
}

fn default_client_id() -> String {
    "indobot-relay".to_string()
}

fn default_topic() -> String {
    "indobot/data".to_string()
}

fn default_keep_alive() -> u16 {
    15
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_reconnect_backoff() -> u64 {
    5
}

fn default_measurement() -> String {
    "sensor_data".to_string()
}

fn default_baud_rate() -> u32 {
    115_200
}

fn default_interface() -> String {
    "wlan0".to_string()
}

fn default_firmware_version() -> String {
    "1.0.4".to_string()
}

fn default_sync_interval() -> u64 {
    60
}
