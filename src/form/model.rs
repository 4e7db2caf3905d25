//! The contract between the form controller and an entity's form.

use std::fmt;

use serde::Serialize;

use super::errors::FieldErrors;
use crate::error::{Result, VitrineError};

/// A value typed into (or picked in) one form control.
///
/// Hosts that only deal in strings (a CLI, a query string) send `Text`;
/// models coerce it to what the field holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    Id(Option<i64>),
    List(Vec<String>),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Id(Some(value))
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl FieldValue {
    pub fn into_text(self, field: &str) -> Result<String> {
        match self {
            FieldValue::Text(s) => Ok(s),
            FieldValue::Id(Some(id)) => Ok(id.to_string()),
            FieldValue::Id(None) => Ok(String::new()),
            other => Err(mismatch(field, "text", &other)),
        }
    }

    pub fn into_bool(self, field: &str) -> Result<bool> {
        match self {
            FieldValue::Bool(b) => Ok(b),
            FieldValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(mismatch(field, "true or false", &FieldValue::Text(s))),
            },
            other => Err(mismatch(field, "true or false", &other)),
        }
    }

    /// A selected entity id. Empty text clears the selection.
    pub fn into_id(self, field: &str) -> Result<Option<i64>> {
        match self {
            FieldValue::Id(id) => Ok(id),
            FieldValue::Text(s) if s.trim().is_empty() => Ok(None),
            FieldValue::Text(s) => match s.trim().parse::<i64>() {
                Ok(id) => Ok(Some(id)),
                Err(_) => Err(mismatch(field, "a numeric id", &FieldValue::Text(s))),
            },
            other => Err(mismatch(field, "a numeric id", &other)),
        }
    }

    /// A list of strings. Text is split on commas.
    pub fn into_list(self, field: &str) -> Result<Vec<String>> {
        match self {
            FieldValue::List(items) => Ok(items),
            FieldValue::Text(s) => Ok(s
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()),
            other => Err(mismatch(field, "a list", &other)),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Id(Some(id)) => write!(f, "{id}"),
            FieldValue::Id(None) => Ok(()),
            FieldValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

fn mismatch(field: &str, expected: &str, got: &FieldValue) -> VitrineError {
    VitrineError::InvalidFieldValue {
        field: field.to_string(),
        reason: format!("expected {expected}, got '{got}'"),
    }
}

/// The values of one entity form.
///
/// `validate` is pure: it looks only at the values and never at controller
/// state, so it can run on every keystroke.
pub trait FormModel: Clone + PartialEq + fmt::Debug + Send + Sync {
    /// Body sent to the create and update endpoints.
    type Payload: Serialize + Send + Sync;

    /// Every editable field, in display order.
    const FIELDS: &'static [&'static str];

    /// Field that collects backend errors for nested keys nobody else owns
    /// (e.g. `images`).
    const COMPOSITE_FIELD: Option<&'static str> = None;

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<()>;

    fn validate(&self) -> FieldErrors;

    fn to_payload(&self) -> Self::Payload;
}

/// Error for a field name the model does not have.
pub fn unknown_field(field: &str) -> VitrineError {
    VitrineError::UnknownField(field.to_string())
}
