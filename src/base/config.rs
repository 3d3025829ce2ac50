//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default host for the downloader instance the download buttons point at.
fn default_download_host() -> String {
    "https://wpd.my".to_string()
}

/// Configuration for the wpd-bot application.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Shared inner configuration values.
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// The concrete configuration values backing [`Config`].
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack app token (`SLACK_APP_TOKEN`).
    pub slack_app_token: String,
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Slack signing secret (`SLACK_SIGNING_SECRET`).
    pub slack_signing_secret: String,
    /// Base URL of the downloader instance (`DOWNLOAD_HOST`).
    ///
    /// Point this at your own instance if you are self-hosting one.
    #[serde(default = "default_download_host")]
    pub download_host: String,
}

impl Config {
    /// Loads configuration from the environment and an optional TOML file.
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("WPD_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let mut inner: ConfigInner = cfg.build()?.try_deserialize()?;

        if inner.download_host.is_empty() {
            return Err(anyhow::anyhow!("Download host must not be empty."));
        }

        // Download URLs are built by appending paths, so a trailing slash would double up.
        inner.download_host = inner.download_host.trim_end_matches('/').to_string();

        Ok(Config { inner: Arc::new(inner) })
    }
}
