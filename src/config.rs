//! Configuration manager for the training API.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PREFIX: &str = "/api/training";
const DEFAULT_UPSTREAM_URL: &str = "https://training-server.com/api";
const DEFAULT_UPSTREAM_TIMEOUT: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Listening port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path every API route is nested under.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Game-server API being proxied.
    #[serde(default)]
    pub upstream: Upstream,
    /// Related to PostgreSQL configuration.
    #[serde(skip_serializing)]
    pub postgres: Option<Postgres>,
    #[serde(default)]
    pub telemetry: Telemetry,
    #[serde(skip)]
    path: PathBuf,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            prefix: DEFAULT_PREFIX.to_owned(),
            upstream: Upstream::default(),
            postgres: None,
            telemetry: Telemetry::default(),
            path: PathBuf::default(),
        }
    }
}

/// Upstream game-server API.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Upstream {
    /// Base URL every upstream path is appended to.
    pub url: String,
    /// Per-call timeout, in seconds.
    pub timeout: u64,
}

impl Default for Upstream {
    fn default() -> Self {
        Self {
            url: DEFAULT_UPSTREAM_URL.to_owned(),
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }
}

impl Upstream {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// PostgreSQL configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Postgres {
    /// Hostname:(?port) for PostgreSQL instance.
    pub address: String,
    /// Database name.
    pub database: Option<String>,
    /// Username credential to connect.
    pub username: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

/// Metrics export.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Telemetry {
    /// Expose `GET /metrics` in Prometheus format.
    #[serde(default)]
    pub metrics: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_owned()
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Normalizes a URL string by ensuring it starts with a valid scheme
    /// (`http` or `https`).
    fn normalize_url(&self, url: &str) -> Result<String, url::ParseError> {
        let url_with_scheme =
            if url.starts_with("http://") || url.starts_with("https://") {
                url.to_string()
            } else {
                format!("https://{url}")
            };

        let parsed_url = Url::parse(&url_with_scheme)?;
        Ok(parsed_url.as_str().trim_end_matches('/').to_owned())
    }

    /// Ensures the prefix starts with `/` and has no trailing slash.
    fn normalize_prefix(prefix: &str) -> String {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            String::default()
        } else {
            format!("/{prefix}")
        }
    }

    /// Reads the configuration from the specified path, or `config.yaml`
    /// when none is set.
    pub fn read(self) -> Result<Arc<Self>, url::ParseError> {
        let file_path = if self.path.as_os_str().is_empty() {
            Path::new(DEFAULT_CONFIG_PATH)
        } else {
            self.path.as_path()
        };

        match File::open(file_path) {
            Ok(file) => {
                let config: Configuration = match serde_yaml::from_reader(file)
                {
                    Ok(config) => config,
                    Err(err) => {
                        return Ok(Arc::new(self.error(err)));
                    },
                };

                Ok(Arc::new(config.normalize()?))
            },
            Err(err) => Ok(Arc::new(self.error(err))),
        }
    }

    fn normalize(mut self) -> Result<Self, url::ParseError> {
        self.upstream.url = self.normalize_url(&self.upstream.url)?;
        self.prefix = Self::normalize_prefix(&self.prefix);
        Ok(self)
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(
            error = %err,
            path = ?self.path,
            "configuration file cannot be read"
        );
        Self::default()
    }
}
