//! Configuration loading for bocha-search-mcp
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. A TOML file given by `--config` or `CONFIG_FILE` (must live under the
//!    current working directory)
//! 3. Environment variables, which take precedence over the file

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::search::limiter::{DEFAULT_BURST, DEFAULT_REQUESTS_PER_SECOND};
use crate::search::ClientConfig;

pub const ENV_API_KEY: &str = "BOCHA_API_KEY";
pub const ENV_API_BASE_URL: &str = "BOCHA_API_BASE_URL";
pub const ENV_HTTP_TIMEOUT: &str = "HTTP_TIMEOUT";
pub const ENV_SERVER_NAME: &str = "SERVER_NAME";
pub const ENV_SERVER_VERSION: &str = "SERVER_VERSION";
pub const ENV_RATE_LIMIT: &str = "BOCHA_RATE_LIMIT";
pub const ENV_RATE_BURST: &str = "BOCHA_RATE_BURST";

const MIN_HTTP_TIMEOUT: Duration = Duration::from_secs(1);
const LONG_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Main configuration structure
#[derive(Clone, PartialEq)]
pub struct Config {
    /// Bocha API key, sent as a bearer token
    pub api_key: String,
    /// Full URL of the web search endpoint
    pub api_base_url: String,
    /// Timeout for a whole provider request
    pub http_timeout: Duration,
    /// Name reported to MCP clients
    pub server_name: String,
    /// Version reported to MCP clients
    pub server_version: String,
    /// Outbound request rate limit
    pub rate_limit: RateLimitConfig,
}

/// Token bucket settings for outbound requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    /// Requests allowed in a burst
    #[serde(default = "default_burst")]
    pub burst: u32,
}

// Default value functions
fn default_api_base_url() -> String {
    "https://api.bochaai.com/v1/web-search".to_string()
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_server_name() -> String {
    "Bocha AI Search Server".to_string()
}

fn default_server_version() -> String {
    "1.0.0".to_string()
}

fn default_requests_per_second() -> u32 {
    DEFAULT_REQUESTS_PER_SECOND
}

fn default_burst() -> u32 {
    DEFAULT_BURST
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: default_api_base_url(),
            http_timeout: default_http_timeout(),
            server_name: default_server_name(),
            server_version: default_server_version(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.masked_api_key())
            .field("api_base_url", &self.api_base_url)
            .field("http_timeout", &self.http_timeout)
            .field("server_name", &self.server_name)
            .field("server_version", &self.server_version)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

/// On-disk layout; every field is optional and only overrides when set
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    api_base_url: Option<String>,
    #[serde(default)]
    http_timeout: Option<TimeoutValue>,
    #[serde(default)]
    server_name: Option<String>,
    #[serde(default)]
    server_version: Option<String>,
    #[serde(default)]
    rate_limit: Option<RateLimitConfig>,
}

/// `http_timeout = 15` or `http_timeout = "1m30s"`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TimeoutValue {
    Seconds(u64),
    Text(String),
}

impl Config {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path {
            let allowed_dir =
                std::env::current_dir().context("failed to get current working directory")?;
            match config.merge_file(path, &allowed_dir) {
                Ok(()) => {
                    tracing::info!("Loaded config from: {}", path.display());
                    tracing::warn!(
                        "Keeping API keys in a config file is not recommended; prefer {}",
                        ENV_API_KEY
                    );
                }
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                }
            }
        } else {
            tracing::info!("No config file specified, using defaults and environment");
        }

        config.apply_env(|key| std::env::var(key).ok());
        config.normalize_timeout();

        if config.api_key.is_empty() {
            tracing::warn!(
                "{} not set. The search tool will not work without an API key.",
                ENV_API_KEY
            );
        }

        Ok(config)
    }

    /// Merge a TOML file, refusing paths that resolve outside `allowed_dir`
    pub fn merge_file(&mut self, path: &Path, allowed_dir: &Path) -> Result<()> {
        let allowed = allowed_dir
            .canonicalize()
            .with_context(|| format!("failed to resolve directory {}", allowed_dir.display()))?;
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            allowed.join(path)
        };
        let resolved = joined
            .canonicalize()
            .with_context(|| format!("failed to resolve config path {}", joined.display()))?;

        if !resolved.starts_with(&allowed) {
            bail!(
                "security error: config file '{}' is outside of allowed directory '{}'",
                resolved.display(),
                allowed.display()
            );
        }

        let content = std::fs::read_to_string(&resolved)
            .with_context(|| format!("failed to read config file {}", resolved.display()))?;
        let file: FileConfig = toml::from_str(&content).context("failed to parse config file")?;

        self.apply_file(file);
        Ok(())
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(key) = file.api_key.filter(|v| !v.is_empty()) {
            self.api_key = key;
        }
        if let Some(url) = file.api_base_url.filter(|v| !v.is_empty()) {
            self.api_base_url = url;
        }
        match file.http_timeout {
            Some(TimeoutValue::Seconds(secs)) => self.http_timeout = Duration::from_secs(secs),
            Some(TimeoutValue::Text(text)) => match parse_duration(&text) {
                Some(timeout) => self.http_timeout = timeout,
                None => tracing::warn!("Invalid http_timeout in config file: {}", text),
            },
            None => {}
        }
        if let Some(name) = file.server_name.filter(|v| !v.is_empty()) {
            self.server_name = name;
        }
        if let Some(version) = file.server_version.filter(|v| !v.is_empty()) {
            self.server_version = version;
        }
        if let Some(rate_limit) = file.rate_limit {
            self.rate_limit = rate_limit;
        }
    }

    /// Override fields from environment variables looked up through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = key;
        }
        if let Some(url) = get(ENV_API_BASE_URL) {
            self.api_base_url = url;
        }
        if let Some(raw) = get(ENV_HTTP_TIMEOUT) {
            match parse_duration(&raw) {
                Some(timeout) => self.http_timeout = timeout,
                None => tracing::warn!(
                    "Could not parse {} as duration, keeping {:?}",
                    ENV_HTTP_TIMEOUT,
                    self.http_timeout
                ),
            }
        }
        if let Some(name) = get(ENV_SERVER_NAME) {
            self.server_name = name;
        }
        if let Some(version) = get(ENV_SERVER_VERSION) {
            self.server_version = version;
        }
        if let Some(raw) = get(ENV_RATE_LIMIT) {
            match raw.parse() {
                Ok(rate) => self.rate_limit.requests_per_second = rate,
                Err(_) => tracing::warn!("Ignoring invalid {}: {}", ENV_RATE_LIMIT, raw),
            }
        }
        if let Some(raw) = get(ENV_RATE_BURST) {
            match raw.parse() {
                Ok(burst) => self.rate_limit.burst = burst,
                Err(_) => tracing::warn!("Ignoring invalid {}: {}", ENV_RATE_BURST, raw),
            }
        }
    }

    /// Raise very short timeouts to one second and warn about long ones
    pub fn normalize_timeout(&mut self) {
        if self.http_timeout < MIN_HTTP_TIMEOUT {
            tracing::warn!(
                "HTTP timeout is very short ({:?}). Setting to minimum of 1 second.",
                self.http_timeout
            );
            self.http_timeout = MIN_HTTP_TIMEOUT;
        } else if self.http_timeout > LONG_HTTP_TIMEOUT {
            tracing::warn!(
                "HTTP timeout is very long ({:?}). This may cause requests to hang.",
                self.http_timeout
            );
        }
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            bail!("{} environment variable is required", ENV_API_KEY);
        }
        if self.api_base_url.is_empty() {
            bail!("{} cannot be empty", ENV_API_BASE_URL);
        }

        let url = url::Url::parse(&self.api_base_url)
            .with_context(|| format!("{} is not a valid URL", ENV_API_BASE_URL))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("{} must use http or https", ENV_API_BASE_URL);
        }

        if self.rate_limit.requests_per_second == 0 || self.rate_limit.burst == 0 {
            bail!("rate limit and burst must be greater than zero");
        }

        tracing::info!("Using Bocha API key: {}", self.masked_api_key());
        Ok(())
    }

    /// API key with everything but the first and last four characters hidden
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() > 8 {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{}...{}", head, tail)
        } else {
            "****".to_string()
        }
    }

    /// The connection settings handed to the search client
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_key: self.api_key.clone(),
            api_base_url: self.api_base_url.clone(),
            http_timeout: self.http_timeout,
            requests_per_second: self.rate_limit.requests_per_second,
            burst: self.rate_limit.burst,
        }
    }
}

/// Parse plain seconds (`15`) or a duration made of `h`, `m`, `s` and `ms`
/// components (`1m30s`, `500ms`, `1.5s`)
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = value;
    while !rest.is_empty() {
        let number_end = rest.find(|c: char| !(c.is_ascii_digit() || c == '.'))?;
        if number_end == 0 {
            return None;
        }
        let amount: f64 = rest[..number_end].parse().ok()?;
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_end] {
            "ms" => 0.001,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return None,
        };
        let part = Duration::try_from_secs_f64(amount * scale).ok()?;
        total = total.checked_add(part)?;
        rest = &rest[unit_end..];
    }

    Some(total)
}
