mod config;
mod edit;
mod list;
mod url;

pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use edit::{cmd_create, cmd_delete, cmd_show, cmd_update};
pub use list::{ListOptions, cmd_list};
pub use url::cmd_url;

use std::sync::Arc;

use serde_json::Value;

use crate::api::RestClient;
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::error::Result;

/// Result of a command, printable as JSON or as text.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Print JSON when requested, otherwise the text (falling back to JSON
    /// when there is none).
    pub fn print(self, output: OutputOptions) -> Result<()> {
        match self.text {
            Some(text) if !output.json => {
                println!("{text}");
                Ok(())
            }
            _ => print_json(&self.json),
        }
    }
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn api_client(config: &Config) -> Result<Arc<RestClient>> {
    Ok(Arc::new(RestClient::from_config(config)?))
}
