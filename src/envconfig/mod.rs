use crate::core::Device;
use serde::Deserialize;
use std::env;
use tracing::Level;

pub const DEVICE_VAR: &str = "DLR_DEFAULT_DEVICE";
pub const LOG_LEVEL_VAR: &str = "DLR_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default = "DlrConfig::new")]
pub struct DlrConfig {
    /// Device of the root manager, inherited by managers created from it.
    pub default_device: Device,
    #[serde(with = "level_name")]
    pub log_level: Level,
}

impl DlrConfig {
    /// Built-in defaults, ignoring the environment.
    pub fn new() -> Self {
        Self {
            default_device: Device::Cpu,
            log_level: Level::INFO,
        }
    }

    /// Defaults overridden by `DLR_DEFAULT_DEVICE` and `DLR_LOG_LEVEL`.
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Ok(device) = env::var(DEVICE_VAR) {
            if let Ok(device) = device.parse() {
                config.default_device = device;
            }
        }

        if let Ok(level) = env::var(LOG_LEVEL_VAR) {
            if let Ok(level) = level.parse() {
                config.log_level = level;
            }
        }

        config
    }

    pub fn with_default_device(mut self, device: Device) -> Self {
        self.default_device = device;
        self
    }

    pub fn with_log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }
}

impl Default for DlrConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

mod level_name {
    use serde::{Deserialize, Deserializer};
    use tracing::Level;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
