//! Per-field error messages and the mapping of backend validation payloads
//! onto form fields.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::api::GENERIC_FAILURE_MESSAGE;

/// Key for errors that belong to no single field.
pub const GLOBAL_KEY: &str = "global";

/// Field name (or [`GLOBAL_KEY`]) to its messages. Empty lists are never
/// stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single global message.
    pub fn global_message(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(GLOBAL_KEY, message);
        errors
    }

    /// Append a message. Blank messages are skipped.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        if message.trim().is_empty() {
            return;
        }
        self.0.entry(field.to_string()).or_default().push(message);
    }

    /// Replace a field's messages; an empty list removes the field.
    pub fn set(&mut self, field: &str, messages: Vec<String>) {
        if messages.is_empty() {
            self.0.remove(field);
        } else {
            self.0.insert(field.to_string(), messages);
        }
    }

    pub fn remove(&mut self, field: &str) -> Option<Vec<String>> {
        self.0.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn global(&self) -> Option<&[String]> {
        self.get(GLOBAL_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any key other than [`GLOBAL_KEY`] has messages.
    pub fn has_field_errors(&self) -> bool {
        self.0.keys().any(|key| key != GLOBAL_KEY)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut errors = FieldErrors::new();
        for (field, message) in iter {
            errors.push(field, message);
        }
        errors
    }
}

/// Routes a backend validation payload onto the fields of one form.
///
/// Keys of the payload's `errors` object are matched against the form's
/// field names:
/// - an exact match goes to that field
/// - a nested key (`images[0]`, `images.0.path`) goes to its root field
/// - other nested keys, and the composite name itself, go to the composite
///   field when there is one
/// - everything else is global
#[derive(Debug, Clone)]
pub struct ErrorDistributor {
    fields: Vec<String>,
    composite: Option<String>,
}

impl ErrorDistributor {
    pub fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            composite: None,
        }
    }

    pub fn with_composite(mut self, composite: Option<&str>) -> Self {
        self.composite = composite.map(str::to_string);
        self
    }

    pub fn distribute(&self, payload: &Value) -> FieldErrors {
        let mut errors = FieldErrors::new();

        match payload {
            Value::String(message) => errors.push(GLOBAL_KEY, message.trim()),
            Value::Object(map) => {
                match map.get("errors") {
                    Some(Value::Object(by_key)) => {
                        for (key, value) in by_key {
                            let target = self.route(key);
                            for message in collect_messages(value) {
                                errors.push(target, message);
                            }
                        }
                    }
                    Some(other) => {
                        for message in collect_messages(other) {
                            errors.push(GLOBAL_KEY, message);
                        }
                    }
                    None => {}
                }

                if errors.global().is_none()
                    && let Some(message) = crate::api::error::flat_message(payload)
                {
                    errors.push(GLOBAL_KEY, message);
                }
            }
            _ => {}
        }

        if errors.is_empty() {
            errors.push(GLOBAL_KEY, GENERIC_FAILURE_MESSAGE);
        }
        errors
    }

    fn route<'a>(&'a self, key: &'a str) -> &'a str {
        if self.is_field(key) {
            return key;
        }

        let root = key
            .split(['.', '['])
            .next()
            .unwrap_or(key);
        let nested = root.len() < key.len();
        if nested && self.is_field(root) {
            return root;
        }

        match &self.composite {
            Some(composite) if nested || key == composite => composite,
            _ => GLOBAL_KEY,
        }
    }

    fn is_field(&self, key: &str) -> bool {
        self.fields.iter().any(|field| field == key)
    }
}

/// Route `payload` onto `known_fields` with no composite field.
pub fn distribute(payload: &Value, known_fields: &[&str]) -> FieldErrors {
    ErrorDistributor::new(known_fields).distribute(payload)
}

fn collect_messages(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::String(s) => vec![s.trim().to_string()],
        Value::Bool(_) | Value::Number(_) => vec![value.to_string()],
        Value::Array(items) => items.iter().flat_map(collect_messages).collect(),
        Value::Object(map) => map.values().flat_map(collect_messages).collect(),
    }
}
