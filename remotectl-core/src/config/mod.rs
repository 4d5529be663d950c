//! Session parameters and configuration loading
//!
//! [`SessionParams`] is what a [`crate::session::Session`] connects with.
//! [`SessionConfig`] is the on-disk / environment mapping that produces it:
//! environment variables win, then `.remotectl.yml` / `.remotectl.toml` in
//! the working directory, the home directory and the platform config
//! directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

/// Default SSH port
pub const DEFAULT_PORT: u16 = 22;

/// Default timeout for connection establishment and each command (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 3;

/// Base name of the configuration file, without extension
pub const CONFIG_FILE_STEM: &str = ".remotectl";

/// Environment variables read by [`SessionConfig::from_env`]
pub mod env_vars {
    /// Remote hostname (required when any other variable is set)
    pub const HOSTNAME: &str = "REMOTECTL_HOSTNAME";
    /// Remote SSH port
    pub const PORT: &str = "REMOTECTL_PORT";
    /// Login name
    pub const USERNAME: &str = "REMOTECTL_USERNAME";
    /// Password for password authentication
    pub const PASSWORD: &str = "REMOTECTL_PASSWORD";
    /// Timeout in seconds
    pub const TIMEOUT: &str = "REMOTECTL_TIMEOUT";
    /// Private key used for public key authentication
    pub const IDENTITY_FILE: &str = "REMOTECTL_IDENTITY_FILE";

    /// All variables, in lookup order
    pub const ALL: [&str; 6] = [HOSTNAME, PORT, USERNAME, PASSWORD, TIMEOUT, IDENTITY_FILE];
}

/// Parameters of one connection attempt
///
/// Replaced wholesale by [`crate::session::Session::connect`]; never
/// mutated while a transport built from it is live.
#[derive(Debug, Clone)]
pub struct SessionParams {
    /// Remote host, `None` means "not configured"
    pub hostname: Option<String>,
    /// Remote SSH port
    pub port: u16,
    /// Login name
    pub username: Option<String>,
    /// Password (kept out of `Debug` output)
    pub password: Option<SecretString>,
    /// Applies to connection establishment and to every command
    pub timeout: Duration,
    /// Private key for public key authentication
    pub identity_file: Option<PathBuf>,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            hostname: None,
            port: DEFAULT_PORT,
            username: None,
            password: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            identity_file: None,
        }
    }
}

impl SessionParams {
    /// Creates parameters for the given host with default port and timeout
    #[must_use]
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: Some(hostname.into()),
            ..Self::default()
        }
    }

    /// Sets the port
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the login name
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the password
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Sets the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the private key path
    #[must_use]
    pub fn with_identity_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_file = Some(path.into());
        self
    }

    /// Returns `host:port`, or `None` when no host is configured
    #[must_use]
    pub fn address(&self) -> Option<String> {
        self.hostname
            .as_deref()
            .map(|host| format!("{host}:{}", self.port))
    }
}

/// Raw mapping as written in YAML/TOML files
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    hostname: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    timeout: Option<f64>,
    identity_file: Option<String>,
}

/// A validated configuration mapping
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Remote host
    pub hostname: String,
    /// Remote SSH port
    pub port: u16,
    /// Login name
    pub username: Option<String>,
    /// Password
    pub password: Option<SecretString>,
    /// Timeout, `None` keeps [`DEFAULT_TIMEOUT_SECS`]
    pub timeout: Option<Duration>,
    /// Private key path, tilde-expanded
    pub identity_file: Option<PathBuf>,
}

impl SessionConfig {
    /// Creates a configuration with only a hostname
    #[must_use]
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            timeout: None,
            identity_file: None,
        }
    }

    /// Loads the configuration from the process environment.
    ///
    /// Returns `Ok(None)` when none of [`env_vars::ALL`] is set.
    pub fn from_env() -> ConfigResult<Option<Self>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Option<Self>> {
        if env_vars::ALL.iter().all(|key| lookup(key).is_none()) {
            return Ok(None);
        }

        let port = lookup(env_vars::PORT)
            .map(|value| {
                value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                    key: env_vars::PORT.to_string(),
                    expected: "a port number",
                })
            })
            .transpose()?;

        let timeout = lookup(env_vars::TIMEOUT)
            .map(|value| {
                value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidValue {
                    key: env_vars::TIMEOUT.to_string(),
                    expected: "a number",
                })
            })
            .transpose()?;

        let raw = RawConfig {
            hostname: lookup(env_vars::HOSTNAME),
            port,
            username: lookup(env_vars::USERNAME),
            password: lookup(env_vars::PASSWORD),
            timeout,
            identity_file: lookup(env_vars::IDENTITY_FILE),
        };
        Self::from_raw(raw, env_vars::HOSTNAME, env_vars::TIMEOUT).map(Some)
    }

    /// Loads a YAML or TOML file, chosen by extension (`.toml` is TOML,
    /// anything else YAML).
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml_str(&content, path)
        } else {
            Self::from_yaml_str(&content, path)
        }
    }

    /// Parses a YAML mapping; `origin` is used in error messages only
    pub fn from_yaml_str(content: &str, origin: &Path) -> ConfigResult<Self> {
        let raw: RawConfig = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_raw(raw, "hostname", "timeout")
    }

    /// Parses a TOML table; `origin` is used in error messages only
    pub fn from_toml_str(content: &str, origin: &Path) -> ConfigResult<Self> {
        let raw: RawConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_raw(raw, "hostname", "timeout")
    }

    fn from_raw(raw: RawConfig, hostname_key: &str, timeout_key: &str) -> ConfigResult<Self> {
        let hostname = raw
            .hostname
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingKey(hostname_key.to_string()))?;

        let timeout = raw
            .timeout
            .map(|secs| {
                Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidValue {
                    key: timeout_key.to_string(),
                    expected: "a positive number of seconds",
                })
            })
            .transpose()?;

        Ok(Self {
            hostname,
            port: raw.port.unwrap_or(DEFAULT_PORT),
            username: raw.username,
            password: raw.password.map(SecretString::from),
            timeout,
            identity_file: raw
                .identity_file
                .map(|p| PathBuf::from(shellexpand::tilde(&p).into_owned())),
        })
    }

    /// Candidate configuration files, in search order
    #[must_use]
    pub fn search_paths() -> Vec<PathBuf> {
        let mut dirs_to_search = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            dirs_to_search.push(cwd);
        }
        if let Some(home) = dirs::home_dir() {
            dirs_to_search.push(home);
        }

        let mut paths: Vec<PathBuf> = dirs_to_search
            .iter()
            .flat_map(|dir| {
                ["yml", "toml"]
                    .iter()
                    .map(move |ext| dir.join(format!("{CONFIG_FILE_STEM}.{ext}")))
            })
            .collect();

        if let Some(config_dir) = dirs::config_dir() {
            let app_dir = config_dir.join("remotectl");
            paths.push(app_dir.join("config.yml"));
            paths.push(app_dir.join("config.toml"));
        }
        paths
    }

    /// Loads the environment configuration, falling back to the first
    /// existing file of [`Self::search_paths`].
    pub fn load_default() -> ConfigResult<Self> {
        if let Some(config) = Self::from_env()? {
            tracing::debug!("Loaded session config from environment");
            return Ok(config);
        }

        let paths = Self::search_paths();
        for path in &paths {
            if path.is_file() {
                tracing::debug!(path = %path.display(), "Loading session config file");
                return Self::from_file(path);
            }
        }

        let searched: String = paths
            .iter()
            .map(|p| format!("\n - {}", p.display()))
            .collect();
        Err(ConfigError::NotFound { searched })
    }

    /// Converts into connection parameters
    #[must_use]
    pub fn into_params(self) -> SessionParams {
        SessionParams {
            hostname: Some(self.hostname),
            port: self.port,
            username: self.username,
            password: self.password,
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            identity_file: self.identity_file,
        }
    }
}
