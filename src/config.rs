//! Configuration for the wallet sync client.
//!
//! The only required setting is the base URL of the wallet service. It can come from the
//! `--api-url` flag or the `WALLET_API_URL` environment variable, or from a JSON config file
//! which can also carry the optional settings.

use crate::error::{ErrorType, IntoResult, Res};
use crate::sync::LoadOrdering;
use crate::{utils, Result};
use anyhow::{anyhow, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "wallet";
const CONFIG_VERSION: u8 = 1;

/// Where the wallet service listens during local development.
pub const DEFAULT_API_URL: &str = "http://localhost:5001/api";

/// The `Config` object represents the configuration of the client: where the wallet service is
/// and how the sync layer should behave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    api_url: Url,
    request_timeout: Option<Duration>,
    load_ordering: LoadOrdering,
}

impl Config {
    /// Creates a `Config` for the wallet service at `api_url`, with default settings otherwise.
    ///
    /// # Errors
    /// - Returns an `ErrorType::Config` error if `api_url` is not an absolute `http` or `https`
    ///   URL.
    pub fn new(api_url: &str) -> Result<Self> {
        let api_url = parse_api_url(api_url).pub_result(ErrorType::Config)?;
        Ok(Self {
            api_url,
            request_timeout: None,
            load_ordering: LoadOrdering::default(),
        })
    }

    /// Writes this `Config` to a config file at `path`, creating missing parent directories.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            utils::make_dir(parent).await.pub_result(ErrorType::Config)?;
        }
        ConfigFile::from(self)
            .save(path)
            .await
            .pub_result(ErrorType::Config)
    }

    /// Loads the config file at `path`.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = ConfigFile::load(path.as_ref())
            .await
            .pub_result(ErrorType::Config)?;
        let mut config = Self::new(&file.api_url)?;
        config.request_timeout = file.request_timeout_secs.map(Duration::from_secs);
        config.load_ordering = file.load_ordering;
        Ok(config)
    }

    /// Replaces the base URL of the wallet service.
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self> {
        self.api_url = parse_api_url(api_url).pub_result(ErrorType::Config)?;
        Ok(self)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_load_ordering(mut self, load_ordering: LoadOrdering) -> Self {
        self.load_ordering = load_ordering;
        self
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// The timeout handed to the HTTP client. `None` means the client's own default applies.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    pub fn load_ordering(&self) -> LoadOrdering {
        self.load_ordering
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("DEFAULT_API_URL is a valid URL"),
            request_timeout: None,
            load_ordering: LoadOrdering::default(),
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "wallet",
///   "config_version": 1,
///   "api_url": "https://wallet.example.com/api",
///   "request_timeout_secs": 30,
///   "load_ordering": "latest_started"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "wallet"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the wallet service, e.g. `https://wallet.example.com/api`
    api_url: String,

    /// Request timeout in seconds. When absent the HTTP client's default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_timeout_secs: Option<u64>,

    /// What to do when loads overlap
    #[serde(default)]
    load_ordering: LoadOrdering,
}

impl From<&Config> for ConfigFile {
    fn from(config: &Config) -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url: config.api_url.to_string(),
            request_timeout_secs: config.request_timeout.map(|d| d.as_secs()),
            load_ordering: config.load_ordering,
        }
    }
}

impl ConfigFile {
    async fn load(path: &Path) -> Res<Self> {
        let config: ConfigFile = utils::deserialize(path).await?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    async fn save(&self, path: &Path) -> Res<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }
}

fn parse_api_url(api_url: &str) -> Res<Url> {
    let url = Url::parse(api_url.trim())
        .with_context(|| format!("Invalid API URL '{api_url}'"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow!(
            "Invalid API URL '{api_url}': expected an http or https URL, found scheme '{other}'"
        )),
    }
}
