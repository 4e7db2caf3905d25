use thiserror::Error;

use crate::api::ApiFailure;

#[derive(Error, Debug)]
pub enum VitrineError {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("invalid value for field '{field}': {reason}")]
    InvalidFieldValue { field: String, reason: String },

    #[error("unknown filter '{0}'")]
    UnknownFilter(String),

    #[error("invalid value '{value}' for filter '{key}'")]
    InvalidFilterValue { key: String, value: String },

    #[error("field '{0}' is not sortable")]
    UnsortableField(String),

    #[error("unknown resource '{0}', expected one of: sections, categories, products, promo-codes, users")]
    UnknownResource(String),

    #[error("{0} are read-only in the console")]
    ReadOnlyResource(String),

    #[error("no form is open")]
    FormClosed,

    #[error("{resource} not saved:\n{details}")]
    NotSaved { resource: String, details: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Api(#[from] ApiFailure),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, VitrineError>;
