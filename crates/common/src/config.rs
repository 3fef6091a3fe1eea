use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use url::Url;

use crate::{error::LookupError, network::NetworkClient, station::TransportFailurePolicy};

pub const DEFAULT_CONFIG_FILE: &str = "scan-station.toml";
const ENV_PREFIX: &str = "SCAN_STATION__";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: Url,
    pub request_timeout_secs: Option<u64>,
    pub on_transport_failure: TransportFailurePolicy,
    pub log_filter: String,
    pub show_all_fields: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: Url::parse(crate::network::PRODUCTION_URL).expect("valid production url"),
            request_timeout_secs: None,
            on_transport_failure: TransportFailurePolicy::default(),
            log_filter: "info".into(),
            show_all_fields: false,
        }
    }
}

impl Settings {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("invalid settings")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))
    }

    /// Defaults, then the settings file, then `SCAN_STATION__*` variables.
    ///
    /// Without an explicit path, `scan-station.toml` in the working directory
    /// is read when it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()));

        let mut settings = match path {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |name: &str| var(&format!("{ENV_PREFIX}{name}"));

        if let Some(v) = get("BASE_URL") {
            self.base_url = Url::parse(&v)
                .with_context(|| format!("{ENV_PREFIX}BASE_URL is not a url: '{v}'"))?;
        }
        if let Some(v) = get("REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = Some(v.trim().parse().with_context(|| {
                format!("{ENV_PREFIX}REQUEST_TIMEOUT_SECS is not a number: '{v}'")
            })?);
        }
        if let Some(v) = get("ON_TRANSPORT_FAILURE") {
            self.on_transport_failure = v
                .parse()
                .map_err(|e: String| anyhow!(e))
                .with_context(|| format!("invalid {ENV_PREFIX}ON_TRANSPORT_FAILURE"))?;
        }
        if let Some(v) = get("LOG_FILTER") {
            self.log_filter = v;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn network_client(&self) -> Result<NetworkClient, LookupError> {
        NetworkClient::new(self.base_url.clone(), self.request_timeout())
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
