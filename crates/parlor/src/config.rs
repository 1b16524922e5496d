//! Server configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `PARLOR_*` environment variables (`__` separates nested keys, e.g.
//! `PARLOR_SERVER__PORT=8080`). Command-line flags are applied on top by the
//! binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "parlor";

const ENV_PREFIX: &str = "PARLOR";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
    /// Origins allowed by CORS. `"*"` allows any origin; an empty list
    /// disables cross-origin access.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 7000,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl ServerConfig {
    /// `bind:port` as a socket address string.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when neither `RUST_LOG` nor a verbosity flag is given.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` (if it exists) and the process
    /// environment.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_env(path, environment())
    }

    /// Same as [`AppConfig::load`] with an explicit environment source.
    pub fn load_with_env(path: &Path, env: Environment) -> Result<Self> {
        let defaults = ServerConfig::default();
        let built = Config::builder()
            .set_default("server.bind", defaults.bind)?
            .set_default("server.port", i64::from(defaults.port))?
            .set_default("server.cors_origins", defaults.cors_origins)?
            .set_default("logging.level", "info")?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(env)
            .build()
            .with_context(|| format!("loading config from {}", path.display()))?;

        built
            .try_deserialize()
            .context("deserializing configuration")
    }

    /// Render as TOML, with a header naming the source file.
    pub fn to_toml(&self, path: &Path) -> Result<String> {
        let body = toml::to_string_pretty(self).context("serializing config to TOML")?;
        Ok(format!(
            "# Configuration for {APP_NAME}\n# File: {}\n\n{body}",
            path.display()
        ))
    }
}

/// Environment source with the `PARLOR_` prefix.
///
/// List values are comma separated, e.g.
/// `PARLOR_SERVER__CORS_ORIGINS=http://a.test,http://b.test`.
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("server.cors_origins")
        .try_parsing(true)
}

/// Default config file location, e.g. `~/.config/parlor/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().ok_or_else(|| anyhow!("unable to resolve config directory"))?;
    Ok(dir.join(APP_NAME).join("config.toml"))
}

/// Resolve a `--config` override: a directory means `<dir>/config.toml`.
pub fn resolve_config_path(override_path: Option<PathBuf>) -> Result<PathBuf> {
    match override_path {
        Some(path) if path.is_dir() => Ok(path.join("config.toml")),
        Some(path) => Ok(path),
        None => default_config_path(),
    }
}
