//! Top-level application configuration.
//!
//! Configuration is stored in `.vitrine/config.yaml` and includes:
//! - The admin API base URL and bearer token
//! - List page size
//! - Search and validation debounce delays
//! - The request timeout

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VitrineError};
use crate::paths::{config_path, vitrine_root};

/// Environment variable that overrides `auth.token`.
pub const TOKEN_ENV_VAR: &str = "VITRINE_API_TOKEN";

/// Keys accepted by `config get` and `config set`.
pub const CONFIG_KEYS: &[&str] = &[
    "api_url",
    "auth.token",
    "page_size",
    "search_debounce_ms",
    "validation_debounce_ms",
    "request_timeout",
];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the admin REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Authentication
    #[serde(default, skip_serializing_if = "AuthConfig::is_default")]
    pub auth: AuthConfig,

    /// Rows per list page (default: 10)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Delay before a typed search is applied (default: 400)
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Delay before a form re-validates after an edit (default: 300)
    #[serde(default = "default_validation_debounce_ms")]
    pub validation_debounce_ms: u64,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

fn default_api_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_search_debounce_ms() -> u64 {
    400
}

fn default_validation_debounce_ms() -> u64 {
    300
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            auth: AuthConfig::default(),
            page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
            validation_debounce_ms: default_validation_debounce_ms(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Authentication configuration
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AuthConfig {
    /// Check if this config is the default (for serialization skip)
    pub fn is_default(&self) -> bool {
        self.token.is_none()
    }
}

impl Config {
    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            VitrineError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                VitrineError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create directory for config at {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content).map_err(|e| {
            VitrineError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        // Owner read/write only: the file may hold the API token
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, permissions).map_err(|e| {
                VitrineError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to set permissions on config at {}: {}",
                        path.display(),
                        e
                    ),
                ))
            })?;
        }

        ensure_gitignore(&vitrine_root())?;

        Ok(())
    }

    /// API token from the environment or the config file
    pub fn api_token(&self) -> Option<String> {
        if let Ok(token) = env::var(TOKEN_ENV_VAR)
            && !token.is_empty()
        {
            return Some(token);
        }

        self.auth.token.clone().filter(|t| !t.is_empty())
    }

    /// Never zero, even when the file was edited by hand.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.max(1))
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn validation_debounce(&self) -> Duration {
        Duration::from_millis(self.validation_debounce_ms)
    }

    /// Set a value by its dotted key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "api_url" => {
                url::Url::parse(value)?;
                self.api_url = value.to_string();
            }
            "auth.token" => {
                self.auth.token = Some(value.to_string()).filter(|t| !t.is_empty());
            }
            "page_size" => {
                let size: u32 = parse_number(key, value)?;
                if size == 0 {
                    return Err(VitrineError::Config(
                        "page_size must be at least 1".to_string(),
                    ));
                }
                self.page_size = size;
            }
            "search_debounce_ms" => self.search_debounce_ms = parse_number(key, value)?,
            "validation_debounce_ms" => self.validation_debounce_ms = parse_number(key, value)?,
            "request_timeout" => {
                let seconds: u64 = parse_number(key, value)?;
                if seconds == 0 {
                    return Err(VitrineError::Config(
                        "request_timeout must be at least 1 second".to_string(),
                    ));
                }
                self.request_timeout = seconds;
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Read a value by its dotted key. `None` when the key is unset.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = match key {
            "api_url" => Some(self.api_url.clone()),
            "auth.token" => self.api_token(),
            "page_size" => Some(self.page_size.to_string()),
            "search_debounce_ms" => Some(self.search_debounce_ms.to_string()),
            "validation_debounce_ms" => Some(self.validation_debounce_ms.to_string()),
            "request_timeout" => Some(self.request_timeout.to_string()),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }
}

fn parse_number<N: std::str::FromStr>(key: &str, value: &str) -> Result<N> {
    value
        .parse()
        .map_err(|_| VitrineError::Config(format!("{key} expects a whole number, got '{value}'")))
}

fn unknown_key(key: &str) -> VitrineError {
    VitrineError::Config(format!(
        "unknown config key '{key}'. Valid keys: {}",
        CONFIG_KEYS.join(", ")
    ))
}

/// Keep the config file (and its token) out of version control.
fn ensure_gitignore(root: &Path) -> Result<()> {
    let gitignore = root.join(".gitignore");
    if !gitignore.exists() {
        fs::write(&gitignore, "config.yaml\n")?;
    }
    Ok(())
}
