use clap::{Parser, Subcommand};

use crate::entities::Resource;
use crate::query::SortSpec;

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(about = "Storefront admin console: list, filter and edit catalog resources")]
#[command(version)]
pub struct Cli {
    /// Log engine activity (state changes, requests, URL rewrites) to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load one page of a resource list
    #[command(visible_alias = "ls")]
    List {
        /// sections, categories, products, promo-codes or users
        #[arg(value_parser = parse_resource)]
        resource: Resource,

        /// Search text
        #[arg(short, long)]
        search: Option<String>,

        /// Filter as key=value (repeatable), e.g. --filter active=true
        #[arg(short, long = "filter", value_parser = parse_key_value)]
        filters: Vec<(String, String)>,

        /// Sort as field or field:asc|desc; a bare field uses the list's default direction
        #[arg(long, value_parser = parse_sort)]
        sort: Option<SortSpec>,

        /// Page number (1-based)
        #[arg(short, long)]
        page: Option<u32>,

        /// Start from a list URL query string, e.g. "page=2&search=lamp"
        #[arg(long)]
        url: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Normalize a list URL query string for a resource
    Url {
        #[arg(value_parser = parse_resource)]
        resource: Resource,

        /// Query string, with or without the leading '?'
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch one entity
    Show {
        #[arg(value_parser = parse_resource)]
        resource: Resource,

        id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create an entity through its validated form
    #[command(visible_alias = "c")]
    Create {
        #[arg(value_parser = parse_resource)]
        resource: Resource,

        /// Field value as field=value (repeatable), e.g. --set title=Garden
        #[arg(long = "set", value_parser = parse_key_value, required = true)]
        fields: Vec<(String, String)>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update an entity through its validated form
    Update {
        #[arg(value_parser = parse_resource)]
        resource: Resource,

        id: i64,

        /// Field value as field=value (repeatable)
        #[arg(long = "set", value_parser = parse_key_value, required = true)]
        fields: Vec<(String, String)>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete an entity
    Delete {
        #[arg(value_parser = parse_resource)]
        resource: Resource,

        id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a configuration value
    Set {
        /// Key: api_url, auth.token, page_size, search_debounce_ms,
        /// validation_debounce_ms or request_timeout
        key: String,
        value: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one configuration value
    Get {
        key: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// How a command prints its result.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}

impl OutputOptions {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

fn parse_resource(s: &str) -> Result<Resource, String> {
    s.parse().map_err(|e: crate::error::VitrineError| e.to_string())
}

fn parse_sort(s: &str) -> Result<SortSpec, String> {
    s.parse().map_err(|e: crate::error::VitrineError| e.to_string())
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
