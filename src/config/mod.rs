mod file_config;

pub use file_config::FileConfig;

use crate::feed::FeedConfig;
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub base_url: Option<String>,
    pub media_root: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        let server = ServerConfig::default();
        CliConfig {
            base_url: None,
            media_root: None,
            host: server.host,
            port: server.port,
            logging_level: server.requests_logging_level,
            content_cache_age_sec: server.content_cache_age_sec,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub media_root: PathBuf,
    pub host: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let base_url = file
            .base_url
            .or_else(|| cli.base_url.clone())
            .map(|url| url.trim_end_matches('/').to_string())
            .ok_or_else(|| {
                anyhow::anyhow!("base_url must be specified via --external or in config file")
            })?;
        if base_url.is_empty() {
            bail!("base_url must not be empty");
        }

        let media_root = file
            .media_root
            .map(PathBuf::from)
            .or_else(|| cli.media_root.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("media_root must be specified via --directory or in config file")
            })?;

        if !media_root.exists() {
            bail!("Media root does not exist: {:?}", media_root);
        }
        if !media_root.is_dir() {
            bail!("Media root is not a directory: {:?}", media_root);
        }

        let host = file.host.unwrap_or_else(|| cli.host.clone());
        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let content_cache_age_sec = file
            .content_cache_age_sec
            .unwrap_or(cli.content_cache_age_sec);

        Ok(Self {
            base_url,
            media_root,
            host,
            port,
            logging_level,
            content_cache_age_sec,
        })
    }

    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig::new(self.base_url.clone(), self.media_root.clone())
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            host: self.host.clone(),
            port: self.port,
            content_cache_age_sec: self.content_cache_age_sec,
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
