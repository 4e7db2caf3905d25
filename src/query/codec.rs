//! Two-way mapping between a [`Query`] and the browser query string.
//!
//! Decoding never fails: anything malformed falls back to the schema
//! default. Encoding omits every value equal to its default, so a pristine
//! list has an empty query string.

use std::collections::HashMap;

use url::form_urlencoded;

use super::{FilterValue, ListParams, ListSchema, Query, Sort, SortDirection};

pub const PAGE_KEY: &str = "page";
pub const SEARCH_KEY: &str = "search";
pub const SORT_BY_KEY: &str = "sortBy";
pub const SORT_DIR_KEY: &str = "sortDir";

/// Coerce a query into the shape the schema allows.
///
/// Filters outside the schema are dropped, filters with a value of the
/// wrong kind revert to their default, an unsortable sort reverts to the
/// default sort, the search is trimmed and the page is at least 1.
pub fn normalize(query: &Query, schema: &ListSchema) -> Query {
    let filters = schema
        .filters
        .iter()
        .filter_map(|def| {
            let value = query
                .filters
                .get(def.key)
                .filter(|value| def.kind.accepts(value))
                .map(trim_text)
                .or_else(|| def.default.clone())?;
            Some((def.key.to_string(), value))
        })
        .collect();

    let sort = match &query.sort {
        Some(sort) if schema.is_sortable(&sort.field) => Some(sort.clone()),
        _ => schema.default_sort.clone(),
    };

    Query {
        search: query.search.trim().to_string(),
        filters,
        sort,
        page: query.page.max(1),
    }
}

/// Serialize a query to a query string (without the leading `?`).
pub fn encode(query: &Query, schema: &ListSchema) -> String {
    let query = normalize(query, schema);
    let mut out = form_urlencoded::Serializer::new(String::new());

    if query.page != 1 {
        out.append_pair(PAGE_KEY, &query.page.to_string());
    }
    if !query.search.is_empty() {
        out.append_pair(SEARCH_KEY, &query.search);
    }
    for def in &schema.filters {
        if let Some(value) = query.filters.get(def.key)
            && def.default.as_ref() != Some(value)
        {
            out.append_pair(def.key, &value.url_value());
        }
    }
    if let Some(sort) = &query.sort {
        let default_field = schema.default_sort.as_ref().map(|s| s.field.as_str());
        if default_field != Some(sort.field.as_str()) {
            out.append_pair(SORT_BY_KEY, &sort.field);
        }
        if sort.direction != schema.default_direction() {
            out.append_pair(SORT_DIR_KEY, &sort.direction.to_string());
        }
    }

    out.finish()
}

/// Parse a query string into a normalized query. A leading `?` is accepted
/// and the first occurrence of a repeated key wins.
pub fn decode(query_string: &str, schema: &ListSchema) -> Query {
    let query_string = query_string.strip_prefix('?').unwrap_or(query_string);

    let mut raw: HashMap<String, String> = HashMap::new();
    for (key, value) in form_urlencoded::parse(query_string.as_bytes()) {
        raw.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    let get = |key: &str| raw.get(key).map(String::as_str);

    let page = get(PAGE_KEY)
        .and_then(|p| p.trim().parse::<u32>().ok())
        .filter(|&p| p >= 1)
        .unwrap_or(1);

    let search = get(SEARCH_KEY).map(str::trim).unwrap_or_default().to_string();

    let filters = schema
        .filters
        .iter()
        .filter_map(|def| {
            let value = get(def.key)
                .and_then(|raw| def.kind.parse(raw))
                .or_else(|| def.default.clone())?;
            Some((def.key.to_string(), value))
        })
        .collect();

    let field = get(SORT_BY_KEY)
        .map(str::trim)
        .filter(|field| schema.is_sortable(field))
        .map(str::to_string)
        .or_else(|| schema.default_sort.as_ref().map(|s| s.field.clone()));
    let direction = get(SORT_DIR_KEY)
        .and_then(|dir| dir.parse::<SortDirection>().ok())
        .unwrap_or_else(|| schema.default_direction());
    let sort = field.map(|field| Sort::new(field, direction));

    Query {
        search,
        filters,
        sort,
        page,
    }
}

/// Parameters for the list endpoint: `page`, `limit`, `search`, `sortBy`,
/// `sortDir` and each active filter under its wire key.
pub fn request_params(query: &Query, schema: &ListSchema, page_size: u32) -> ListParams {
    let query = normalize(query, schema);
    let mut params = ListParams::default();

    params.push("page", query.page.to_string());
    params.push("limit", page_size.to_string());
    if !query.search.is_empty() {
        params.push(SEARCH_KEY, query.search.as_str());
    }
    if let Some(sort) = &query.sort {
        params.push(SORT_BY_KEY, sort.field.as_str());
        params.push(SORT_DIR_KEY, sort.direction.to_string());
    }
    for def in &schema.filters {
        if let Some(value) = query.filters.get(def.key) {
            params.push(def.wire_key, def.wire_value(value));
        }
    }

    params
}

fn trim_text(value: &FilterValue) -> FilterValue {
    match value {
        FilterValue::Text(s) => FilterValue::Text(s.trim().to_string()),
        other => other.clone(),
    }
}
