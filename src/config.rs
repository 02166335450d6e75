//! Configuration management for the relay
//!
//! Handles loading configuration from an optional TOML file, environment
//! variables and command-line overrides, and validates the merged result
//! before the server starts.

use anyhow::{Context, Result, bail};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream Open-Meteo endpoints
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Cross-origin policy
    #[serde(default)]
    pub cors: CorsConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port to bind
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the geocoding API, `/search` is appended
    #[serde(default = "default_geocoding_base_url")]
    pub geocoding_base_url: String,
    /// Base URL of the forecast API, `/forecast` is appended
    #[serde(default = "default_forecast_base_url")]
    pub forecast_base_url: String,
    /// User agent sent with every outbound request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Cross-origin settings handed to the server once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; empty means any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Whether `Access-Control-Allow-Credentials` is sent
    #[serde(default = "default_allow_credentials")]
    pub allow_credentials: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_forecast_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_user_agent() -> String {
    concat!("weather-relay/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_allow_credentials() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            geocoding_base_url: default_geocoding_base_url(),
            forecast_base_url: default_forecast_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_credentials: default_allow_credentials(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

const ENV_PREFIX: &str = "WEATHER_RELAY";

/// Values given on the command line; they win over file and environment
#[derive(Debug, Clone, Default)]
pub struct ServerOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl RelayConfig {
    /// Load file and environment configuration, apply overrides, then validate.
    ///
    /// An explicit `config_path` must exist; the default location is optional.
    pub fn load(config_path: Option<PathBuf>, overrides: ServerOverrides) -> Result<Self> {
        Self::load_with_environment(config_path, Self::environment(), overrides)
    }

    /// Same as [`RelayConfig::load`] with a caller-supplied environment source
    pub fn load_with_environment(
        config_path: Option<PathBuf>,
        environment: Environment,
        overrides: ServerOverrides,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        match config_path {
            Some(path) => {
                if !path.exists() {
                    bail!("Configuration file not found: {}", path.display());
                }
                builder = builder.add_source(
                    File::from(path).required(true).format(FileFormat::Toml),
                );
            }
            None => {
                builder = builder.add_source(
                    File::from(Self::default_config_file())
                        .required(false)
                        .format(FileFormat::Toml),
                );
            }
        }

        let settings = builder
            .add_source(environment)
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config = Self::from_settings(settings)?;
        config.apply_overrides(overrides);
        config.validate()?;

        Ok(config)
    }

    /// `WEATHER_RELAY_SERVER__PORT=9000`, `WEATHER_RELAY_CORS__ALLOWED_ORIGINS=a,b`
    #[must_use]
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("cors.allowed_origins")
            .try_parsing(true)
    }

    fn from_settings(settings: Config) -> Result<Self> {
        let mut config: RelayConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: ServerOverrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weather-relay").join("config.toml"))
    }

    /// File read when no explicit path is given; it may be absent
    #[must_use]
    pub fn default_config_file() -> PathBuf {
        Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.upstream.geocoding_base_url.is_empty() {
            self.upstream.geocoding_base_url = default_geocoding_base_url();
        }
        if self.upstream.forecast_base_url.is_empty() {
            self.upstream.forecast_base_url = default_forecast_base_url();
        }
        if self.upstream.user_agent.is_empty() {
            self.upstream.user_agent = default_user_agent();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_server()?;
        self.validate_urls()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("Server port must be between 1 and 65535");
        }
        Ok(())
    }

    fn validate_urls(&self) -> Result<()> {
        for (name, url) in [
            ("Geocoding", &self.upstream.geocoding_base_url),
            ("Forecast", &self.upstream.forecast_base_url),
        ] {
            if !is_http_url(url) {
                bail!("{name} base URL must be a valid HTTP or HTTPS URL, got '{url}'");
            }
        }

        for origin in &self.cors.allowed_origins {
            if !is_http_url(origin) {
                bail!("CORS origin '{origin}' must start with http:// or https://");
            }
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            );
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            );
        }

        Ok(())
    }

    /// Address string the listener binds to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
