//! Configuration
//!
//! 設定ファイルと環境変数から構成を読み込む

use std::fs;
use std::path::Path;
use std::time::Duration;

use log::info;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::services::progress::ProgressConfig;

/// API のベースURLを上書きする環境変数
pub const API_URL_ENV: &str = "SYMPTOSCAN_API_URL";

/// 既定の設定ファイルパス
pub const DEFAULT_CONFIG_PATH: &str = "./.symptoscan/config.json";

/// ビルド時に埋め込まれたベースURL（存在する場合）
const BUILD_TIME_API_URL: Option<&str> = option_env!("SYMPTOSCAN_API_URL");

/// 起動時の構成エラー（実行時には回復しない）
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("API base URL is not configured; set SYMPTOSCAN_API_URL or api_base_url in the config file")]
    MissingBaseUrl,

    #[error("Invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("progress_step and progress_interval_ms must be greater than zero")]
    InvalidProgress,

    #[error("Failed to read config file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub user_id: String,
    pub request_timeout_secs: u64,
    pub progress_step: u8,
    pub progress_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: None,
            user_id: "test123".to_string(),
            request_timeout_secs: 30,
            progress_step: 10,
            progress_interval_ms: 300,
        }
    }
}

impl Config {
    /// 設定を読み込んで検証する
    ///
    /// ファイルが存在しなければ既定値を使う。ベースURLは
    /// 環境変数 > 設定ファイル > ビルド時の値 の順で決まる。
    pub fn load(path: &str) -> Result<Self, ConfigurationError> {
        let expanded = shellexpand::tilde(path);
        let file = Path::new(expanded.as_ref());

        let mut config = if file.exists() {
            let content = fs::read_to_string(file).map_err(|source| ConfigurationError::Read {
                path: file.display().to_string(),
                source,
            })?;
            let config: Config =
                serde_json::from_str(&content).map_err(|source| ConfigurationError::Parse {
                    path: file.display().to_string(),
                    source,
                })?;
            info!("Loaded configuration from {}", file.display());
            config
        } else {
            info!("No config file at {}, using defaults", file.display());
            Config::default()
        };

        config.apply_api_url_override(std::env::var(API_URL_ENV).ok());
        if config.api_base_url.is_none() {
            config.api_base_url = BUILD_TIME_API_URL.map(str::to_string);
        }

        config.validate()?;
        Ok(config)
    }

    /// 空でない値でベースURLを上書きする
    pub fn apply_api_url_override(&mut self, value: Option<String>) {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            self.api_base_url = Some(url);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.base_url()?;
        if self.progress_step == 0 || self.progress_interval_ms == 0 {
            return Err(ConfigurationError::InvalidProgress);
        }
        Ok(())
    }

    /// 検証済みのベースURL
    pub fn base_url(&self) -> Result<Url, ConfigurationError> {
        let raw = self
            .api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigurationError::MissingBaseUrl)?;

        let url = Url::parse(raw).map_err(|e| ConfigurationError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(ConfigurationError::InvalidBaseUrl {
                url: raw.to_string(),
                reason: "expected an http(s) URL".to_string(),
            });
        }

        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn progress_config(&self) -> ProgressConfig {
        ProgressConfig {
            step: self.progress_step,
            interval: Duration::from_millis(self.progress_interval_ms),
        }
    }
}
