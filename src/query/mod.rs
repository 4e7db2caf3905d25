//! List query state and the schema that constrains it.
//!
//! A [`Query`] is the complete description of what a list page shows:
//! search text, filters, sort and page. A [`ListSchema`] names the filters
//! and sortable fields a given list accepts; everything outside it is
//! rejected by the controller and ignored by the codec.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

pub mod codec;
pub mod sort;

pub use codec::{decode, encode, normalize, request_params};
pub use sort::{Sort, SortDirection, SortSpec};

/// Value of a single list filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Enum(String),
    Bool(bool),
}

impl FilterValue {
    /// Spelling used in the browser URL.
    pub fn url_value(&self) -> String {
        match self {
            FilterValue::Text(s) | FilterValue::Enum(s) => s.clone(),
            FilterValue::Integer(n) => n.to_string(),
            FilterValue::Bool(b) => b.to_string(),
        }
    }

    /// Spelling sent to the list endpoint. Booleans go out as `1`/`0`.
    pub fn wire_value(&self) -> String {
        match self {
            FilterValue::Bool(true) => "1".to_string(),
            FilterValue::Bool(false) => "0".to_string(),
            other => other.url_value(),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url_value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Text,
    Integer,
    Enum(&'static [&'static str]),
    Bool,
}

impl FilterKind {
    /// Parse a raw string into a value of this kind. `None` when the text
    /// does not fit (empty, not a number, not an allowed option).
    pub fn parse(&self, raw: &str) -> Option<FilterValue> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match self {
            FilterKind::Text => Some(FilterValue::Text(raw.to_string())),
            FilterKind::Integer => raw.parse().ok().map(FilterValue::Integer),
            FilterKind::Enum(allowed) => allowed
                .iter()
                .find(|option| option.eq_ignore_ascii_case(raw))
                .map(|option| FilterValue::Enum((*option).to_string())),
            FilterKind::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" => Some(FilterValue::Bool(true)),
                "false" | "0" => Some(FilterValue::Bool(false)),
                _ => None,
            },
        }
    }

    pub fn accepts(&self, value: &FilterValue) -> bool {
        match (self, value) {
            (FilterKind::Text, FilterValue::Text(s)) => !s.trim().is_empty(),
            (FilterKind::Integer, FilterValue::Integer(_)) => true,
            (FilterKind::Enum(allowed), FilterValue::Enum(s)) => allowed.contains(&s.as_str()),
            (FilterKind::Bool, FilterValue::Bool(_)) => true,
            _ => false,
        }
    }
}

/// One filter a list understands.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDef {
    /// Name in the browser URL and in the controller API.
    pub key: &'static str,
    /// Name of the list-endpoint parameter.
    pub wire_key: &'static str,
    pub kind: FilterKind,
    pub default: Option<FilterValue>,
    /// Endpoint spelling of individual URL values, e.g. `not-verified` → `0`.
    pub wire_values: &'static [(&'static str, &'static str)],
}

impl FilterDef {
    pub fn new(key: &'static str, kind: FilterKind) -> Self {
        Self {
            key,
            wire_key: key,
            kind,
            default: None,
            wire_values: &[],
        }
    }

    pub fn with_wire_key(mut self, wire_key: &'static str) -> Self {
        self.wire_key = wire_key;
        self
    }

    pub fn with_default(mut self, default: FilterValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_wire_values(mut self, wire_values: &'static [(&'static str, &'static str)]) -> Self {
        self.wire_values = wire_values;
        self
    }

    /// Spelling of `value` sent under [`Self::wire_key`].
    pub fn wire_value(&self, value: &FilterValue) -> String {
        let url_value = value.url_value();
        self.wire_values
            .iter()
            .find(|(url, _)| *url == url_value)
            .map(|(_, wire)| (*wire).to_string())
            .unwrap_or_else(|| value.wire_value())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListSchema {
    pub filters: Vec<FilterDef>,
    pub sortable: Vec<&'static str>,
    pub default_sort: Option<Sort>,
}

impl ListSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, def: FilterDef) -> Self {
        self.filters.push(def);
        self
    }

    pub fn sortable(mut self, fields: &[&'static str]) -> Self {
        self.sortable.extend_from_slice(fields);
        self
    }

    pub fn default_sort(mut self, sort: Sort) -> Self {
        self.default_sort = Some(sort);
        self
    }

    pub fn filter_def(&self, key: &str) -> Option<&FilterDef> {
        self.filters.iter().find(|def| def.key == key)
    }

    pub fn is_sortable(&self, field: &str) -> bool {
        self.sortable.contains(&field)
    }

    /// Direction applied when a sort field is given without one.
    pub fn default_direction(&self) -> SortDirection {
        self.default_sort
            .as_ref()
            .map(|sort| sort.direction)
            .unwrap_or_default()
    }

    /// Filter map holding only the schema defaults.
    pub fn default_filters(&self) -> BTreeMap<String, FilterValue> {
        self.filters
            .iter()
            .filter_map(|def| def.default.clone().map(|v| (def.key.to_string(), v)))
            .collect()
    }

    /// The query a list shows before the user touches anything.
    pub fn default_query(&self) -> Query {
        Query {
            search: String::new(),
            filters: self.default_filters(),
            sort: self.default_sort.clone(),
            page: 1,
        }
    }
}

/// Search, filters, sort and page of one list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    pub search: String,
    pub filters: BTreeMap<String, FilterValue>,
    pub sort: Option<Sort>,
    pub page: u32,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            search: String::new(),
            filters: BTreeMap::new(),
            sort: None,
            page: 1,
        }
    }
}

impl Query {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: FilterValue) -> Self {
        self.filters.insert(key.into(), value);
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn filter(&self, key: &str) -> Option<&FilterValue> {
        self.filters.get(key)
    }
}

/// Ordered key/value parameters for a list request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ListParams(Vec<(String, String)>);

impl ListParams {
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
