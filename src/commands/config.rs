//! Configuration commands.
//!
//! - `config show`: display the effective configuration
//! - `config set`: set a value and save
//! - `config get`: print one value

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::config::{CONFIG_KEYS, Config, TOKEN_ENV_VAR};
use crate::error::{Result, VitrineError};
use crate::paths::config_path;

const SECRET_KEYS: &[&str] = &["auth.token"];

/// Suggest the dotted spelling for `auth_token` and similar.
fn validate_config_key(key: &str) -> Result<&str> {
    if CONFIG_KEYS.contains(&key) {
        return Ok(key);
    }
    if let Some(dotted) = CONFIG_KEYS
        .iter()
        .find(|valid| valid.contains('.') && valid.replace('.', "_") == key)
    {
        return Err(VitrineError::Config(format!(
            "invalid config key '{key}'. Use dot notation: '{dotted}'"
        )));
    }
    Err(VitrineError::Config(format!(
        "unknown config key '{key}'. Valid keys: {}",
        CONFIG_KEYS.join(", ")
    )))
}

/// Show only the first 2 and last 2 characters of a secret.
fn mask_sensitive_value(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}

fn token_source(config: &Config) -> &'static str {
    match std::env::var(TOKEN_ENV_VAR) {
        Ok(token) if !token.is_empty() => "environment",
        _ if config.auth.token.is_some() => "config file",
        _ => "not configured",
    }
}

pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let token_configured = config.api_token().is_some();

    let json_output = json!({
        "api_url": config.api_url,
        "auth": {
            "token_configured": token_configured,
            "token_source": token_source(&config),
        },
        "page_size": config.page_size,
        "search_debounce_ms": config.search_debounce_ms,
        "validation_debounce_ms": config.validation_debounce_ms,
        "request_timeout": config.request_timeout,
        "config_file": config_path().to_string_lossy(),
    });

    let mut text = String::new();
    text.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));
    text.push_str(&format!("{}: {}\n", "api_url".cyan(), config.api_url));

    let token_status = if token_configured {
        format!("configured ({})", token_source(&config)).green().to_string()
    } else {
        "not configured".dimmed().to_string()
    };
    text.push_str(&format!("{}:\n  token: {token_status}\n", "auth".cyan()));

    text.push_str(&format!("{}: {}\n", "page_size".cyan(), config.page_size));
    text.push_str(&format!(
        "{}: {}\n",
        "search_debounce_ms".cyan(),
        config.search_debounce_ms
    ));
    text.push_str(&format!(
        "{}: {}\n",
        "validation_debounce_ms".cyan(),
        config.validation_debounce_ms
    ));
    text.push_str(&format!(
        "{}: {}s\n\n",
        "request_timeout".cyan(),
        config.request_timeout
    ));
    text.push_str(&format!(
        "{}",
        format!("Config file: {}", config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output).with_text(text).print(output)
}

pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    validate_config_key(key)?;

    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    let secret = SECRET_KEYS.contains(&key);
    let shown = if secret {
        mask_sensitive_value(value.trim())
    } else {
        config.get(key)?.unwrap_or_default()
    };

    let json_output = json!({
        "action": "config_set",
        "key": key,
        "value": shown,
        "masked": secret,
        "success": true,
    });
    let text = if secret {
        format!("Set {}", key.cyan())
    } else {
        format!("Set {} to {shown}", key.cyan())
    };

    CommandOutput::new(json_output).with_text(text).print(output)
}

pub fn cmd_config_get(key: &str, output: OutputOptions) -> Result<()> {
    validate_config_key(key)?;

    let config = Config::load()?;
    let Some(value) = config.get(key)? else {
        return Err(VitrineError::Config(format!("{key} not set")));
    };

    let (json_output, text) = if SECRET_KEYS.contains(&key) {
        let masked = mask_sensitive_value(&value);
        (
            json!({"key": key, "value": masked, "configured": true, "masked": true}),
            format!("{masked} (masked - showing first 2 and last 2 characters)"),
        )
    } else {
        (
            json!({"key": key, "value": value, "configured": true}),
            value,
        )
    };

    CommandOutput::new(json_output).with_text(text).print(output)
}
