// src/config.rs
// =============================================================================
// This module loads the application configuration.
//
// File format (INI-like):
//
//   ; comment            # also a comment
//   [spider]
//   start_url = https://example.com
//   recursion_depth = 2
//
// - A `[section]` header prefixes every following key as `section.key`
// - Keys and values are trimmed; the last duplicate key wins
// - Lines that are neither a header nor `key = value` are skipped silently
//
// The raw key/value map (`Config`) is turned into typed `Settings` once at
// startup. A missing required key is fatal: the process never starts with a
// half-valid configuration.
// =============================================================================

use std::collections::HashMap;
use std::fmt::Display;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading configuration. All of them are startup-fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config key not found: {0}")]
    MissingKey(String),

    #[error("invalid value for config key {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

// The flat `section.key -> value` map read from a config file
#[derive(Debug, Clone, Default)]
pub struct Config {
    settings: HashMap<String, String>,
}

impl Config {
    /// Reads and parses a config file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Parses config text. Never fails: malformed lines are ignored.
    pub fn parse(text: &str) -> Self {
        let mut settings = HashMap::new();
        let mut section = String::new();

        for line in text.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
                section = line[1..line.len() - 1].trim().to_string();
                continue;
            }

            // `key = value`; anything without '=' or with an empty key is skipped
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }

            let key = if section.is_empty() {
                key.to_string()
            } else {
                format!("{}.{}", section, key)
            };
            settings.insert(key, value.trim().to_string());
        }

        Self { settings }
    }

    /// Returns the value of a required key.
    pub fn get(&self, key: &str) -> Result<&str, ConfigError> {
        match self.settings.get(key) {
            Some(value) => {
                debug!(key, value = %value, "accessing config");
                Ok(value)
            }
            None => Err(ConfigError::MissingKey(key.to_string())),
        }
    }

    /// Returns the value of an optional key.
    pub fn get_opt(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// Parses a required key into any `FromStr` type.
    pub fn get_parsed<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        parse_value(key, self.get(key)?)
    }

    /// Parses an optional key, falling back to `default` when it is absent.
    pub fn get_parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get_opt(key) {
            Some(raw) => parse_value(key, raw),
            None => Ok(default),
        }
    }

    fn has_section(&self, section: &str) -> bool {
        let prefix = format!("{}.", section);
        self.settings.keys().any(|key| key.starts_with(&prefix))
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Crawl scheduler settings (`[spider]` section).
#[derive(Debug, Clone)]
pub struct SpiderSettings {
    pub start_url: String,
    /// Tasks at this depth or deeper are never processed. The seed is depth 0.
    pub max_depth: usize,
    pub workers: usize,
    pub fetch_timeout: Duration,
    pub user_agent: String,
}

/// HTTP search surface settings (`[server]` section).
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub port: u16,
    pub request_timeout: Duration,
}

/// PostgreSQL connection settings (`[database]` section).
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl DatabaseSettings {
    /// Builds a libpq-style connection string for tokio-postgres.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} password={}",
            self.host, self.port, self.name, self.user, self.password
        )
    }
}

/// Everything the application needs, validated.
#[derive(Debug, Clone)]
pub struct Settings {
    pub spider: SpiderSettings,
    pub server: ServerSettings,
    /// `None` means the in-memory store is used.
    pub database: Option<DatabaseSettings>,
}

impl Settings {
    /// Loads and validates settings from a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_config(&Config::from_file(path)?)
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let default_workers = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(4);

        let workers: usize = config.get_parsed_or("spider.workers", default_workers)?;
        if workers == 0 {
            return Err(ConfigError::InvalidValue {
                key: "spider.workers".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let spider = SpiderSettings {
            start_url: config.get("spider.start_url")?.to_string(),
            max_depth: config.get_parsed("spider.recursion_depth")?,
            workers,
            fetch_timeout: Duration::from_secs(
                config.get_parsed_or("spider.fetch_timeout_secs", 10)?,
            ),
            user_agent: config
                .get_opt("spider.user_agent")
                .map(str::to_string)
                .unwrap_or_else(|| {
                    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
                }),
        };

        let server = ServerSettings {
            port: config.get_parsed("server.server_port")?,
            request_timeout: Duration::from_secs(
                config.get_parsed_or("server.request_timeout_secs", 5)?,
            ),
        };

        // The database section is all-or-nothing: once it exists, every key is required
        let database = if config.has_section("database") {
            Some(DatabaseSettings {
                host: config.get("database.db_host")?.to_string(),
                port: config.get_parsed("database.db_port")?,
                name: config.get("database.db_name")?.to_string(),
                user: config.get("database.db_user")?.to_string(),
                password: config.get("database.db_password")?.to_string(),
            })
        } else {
            None
        };

        Ok(Self {
            spider,
            server,
            database,
        })
    }
}
