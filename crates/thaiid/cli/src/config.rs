use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::OptionExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use thaiid_bridge::BridgeConfig;
use thaiid_relay::RelayConfig;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) server_url: String,
    pub(crate) device_id: String,
    pub(crate) api_key: String,
    pub(crate) reader: Option<String>,
    pub(crate) auto_read: bool,
    pub(crate) poll_interval_ms: u64,
    pub(crate) request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://192.168.1.139:8080".to_string(),
            device_id: "thaiid-relay".to_string(),
            api_key: String::new(),
            reader: None,
            auto_read: false,
            poll_interval_ms: 500,
            request_timeout_secs: 10,
        }
    }
}

/// Values given on the command line; unset ones leave the config alone
#[derive(Serialize, Debug, Default)]
pub(crate) struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) server_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reader: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) auto_read: Option<bool>,
}

impl Config {
    pub(crate) const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub(crate) const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub(crate) fn bridge_config(&self) -> eyre::Result<BridgeConfig> {
        Ok(
            BridgeConfig::new(&self.server_url, self.device_id.clone(), self.api_key.clone())?
                .with_poll_interval(self.poll_interval())
                .with_request_timeout(self.request_timeout()),
        )
    }

    pub(crate) fn relay_config(&self) -> RelayConfig {
        RelayConfig::new(self.device_id.clone(), self.api_key.clone())
            .with_poll_interval(self.poll_interval())
            .with_request_timeout(self.request_timeout())
            .with_auto_read(self.auto_read)
    }
}

/// Returns the base config directory for thaiid
pub(crate) fn config_dir() -> eyre::Result<PathBuf> {
    Ok(std::env::home_dir()
        .ok_or_eyre("home directory not found")?
        .join(".thaiid"))
}

/// Merge defaults, the TOML file, `THAIID_` variables and `overrides`
pub(crate) fn load_config(path: Option<&Path>, overrides: &Overrides) -> eyre::Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config_dir()?.join("thaiid.toml"),
    };

    Ok(Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("THAIID_"))
        .merge(Serialized::defaults(overrides))
        .extract()?)
}
