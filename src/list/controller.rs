//! Search, filters, sort and pagination of one list page.
//!
//! The controller owns the [`Query`] and the [`ListDataSource`]. It never
//! performs IO: every transition that changes the query returns a
//! [`LoadRequest`] for the host to execute, and the host reports back with
//! [`ListQueryController::complete`]. After issuing a load the controller
//! mirrors the query into its [`Location`].

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use super::location::Location;
use super::source::{Completion, ListDataSource, LoadRequest, RequestToken};
use crate::api::{ApiFailure, ListResponse};
use crate::context::ConsoleContext;
use crate::debounce::Debouncer;
use crate::error::{Result, VitrineError};
use crate::query::{FilterValue, ListSchema, Query, Sort, SortDirection, codec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListState {
    Idle,
    PendingFetch,
    Error,
}

pub struct ListQueryController<T, L> {
    schema: ListSchema,
    location: L,
    source: ListDataSource<T>,
    query: Query,
    search_text: String,
    search_delay: Duration,
    search_debounce: Debouncer<String>,
    mounted: bool,
}

impl<T, L: Location> ListQueryController<T, L> {
    /// Read the current URL into a query and issue the first load. The URL
    /// is not rewritten on mount, even if it held malformed values.
    pub fn mount(ctx: &ConsoleContext, schema: ListSchema, location: L) -> (Self, LoadRequest) {
        let query = codec::decode(&location.query_string(), &schema);
        let mut source = ListDataSource::new(ctx.page_size());
        let request = source.issue(&query, &schema);
        debug!(query = %codec::encode(&query, &schema), "list mounted");

        let controller = Self {
            search_text: query.search.clone(),
            schema,
            location,
            source,
            query,
            search_delay: ctx.search_delay(),
            search_debounce: Debouncer::new(),
            mounted: true,
        };
        (controller, request)
    }

    /// Store the raw search box text and schedule it to be applied.
    pub fn set_search_text(&mut self, raw: &str, now: Instant) {
        self.search_text = raw.to_string();
        self.search_debounce
            .schedule(raw.trim().to_string(), self.search_delay, now);
    }

    /// Apply a pending search whose delay has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<LoadRequest> {
        let search = self.search_debounce.poll(now)?;
        self.apply_search(search)
    }

    /// Apply the search box text right away.
    pub fn submit_search(&mut self) -> Option<LoadRequest> {
        self.search_debounce.cancel();
        let search = self.search_text.trim().to_string();
        self.apply_search(search)
    }

    pub fn set_filter(&mut self, key: &str, value: FilterValue) -> Result<Option<LoadRequest>> {
        let def = self
            .schema
            .filter_def(key)
            .ok_or_else(|| VitrineError::UnknownFilter(key.to_string()))?;
        if !def.kind.accepts(&value) {
            return Err(VitrineError::InvalidFilterValue {
                key: key.to_string(),
                value: value.url_value(),
            });
        }

        let mut next = self.query.clone();
        next.filters.insert(key.to_string(), value);
        next.page = 1;
        Ok(self.publish(next))
    }

    /// Parse `raw` with the filter's kind, then [`Self::set_filter`].
    pub fn set_filter_str(&mut self, key: &str, raw: &str) -> Result<Option<LoadRequest>> {
        let def = self
            .schema
            .filter_def(key)
            .ok_or_else(|| VitrineError::UnknownFilter(key.to_string()))?;
        let value = def
            .kind
            .parse(raw)
            .ok_or_else(|| VitrineError::InvalidFilterValue {
                key: key.to_string(),
                value: raw.to_string(),
            })?;
        self.set_filter(key, value)
    }

    /// Remove a filter (or put it back to its default).
    pub fn clear_filter(&mut self, key: &str) -> Result<Option<LoadRequest>> {
        if self.schema.filter_def(key).is_none() {
            return Err(VitrineError::UnknownFilter(key.to_string()));
        }

        let mut next = self.query.clone();
        next.filters.remove(key);
        next.page = 1;
        Ok(self.publish(next))
    }

    pub fn set_sort(
        &mut self,
        field: &str,
        direction: SortDirection,
    ) -> Result<Option<LoadRequest>> {
        if !self.schema.is_sortable(field) {
            return Err(VitrineError::UnsortableField(field.to_string()));
        }

        let mut next = self.query.clone();
        next.sort = Some(Sort::new(field, direction));
        next.page = 1;
        Ok(self.publish(next))
    }

    pub fn set_page(&mut self, page: u32) -> Option<LoadRequest> {
        let mut next = self.query.clone();
        next.page = page.max(1);
        self.publish(next)
    }

    /// Filters and sort back to the schema defaults. The search is kept.
    pub fn clear_filters(&mut self) -> Option<LoadRequest> {
        let mut next = self.query.clone();
        next.filters = self.schema.default_filters();
        next.sort = self.schema.default_sort.clone();
        next.page = 1;
        self.publish(next)
    }

    /// Reload the current query, e.g. after a save or delete.
    pub fn refresh(&mut self) -> Option<LoadRequest> {
        if !self.mounted {
            return None;
        }
        Some(self.source.issue(&self.query, &self.schema))
    }

    /// Adopt the location's query after it changed underneath us. The URL is
    /// not written back.
    pub fn sync_from_location(&mut self) -> Option<LoadRequest> {
        if !self.mounted {
            return None;
        }
        let decoded = codec::decode(&self.location.query_string(), &self.schema);
        if decoded == self.query {
            return None;
        }

        debug!("list query changed outside the controller");
        self.search_debounce.cancel();
        self.search_text = decoded.search.clone();
        self.query = decoded;
        Some(self.source.issue(&self.query, &self.schema))
    }

    /// Hand a finished load to the data source. When the applied result has
    /// fewer pages than the current page, moves to the last page and returns
    /// the follow-up load.
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: std::result::Result<ListResponse<T>, ApiFailure>,
    ) -> (Completion, Option<LoadRequest>) {
        let completion = self.source.complete(token, outcome);
        if completion != Completion::Loaded || !self.mounted {
            return (completion, None);
        }

        let last_page = self.source.page_count();
        if self.query.page > last_page {
            debug!(page = self.query.page, last_page, "page out of range, moving to last page");
            return (completion, self.set_page(last_page));
        }
        (completion, None)
    }

    /// Stop reacting: cancel the pending search and drop in-flight loads.
    pub fn unmount(&mut self) {
        self.search_debounce.cancel();
        self.source.detach();
        self.mounted = false;
    }

    fn apply_search(&mut self, search: String) -> Option<LoadRequest> {
        if search == self.query.search {
            return None;
        }
        let mut next = self.query.clone();
        next.search = search;
        next.page = 1;
        self.publish(next)
    }

    /// Load `next` first, then mirror it into the URL. Nothing happens when
    /// the normalized query is unchanged.
    fn publish(&mut self, next: Query) -> Option<LoadRequest> {
        if !self.mounted {
            return None;
        }
        let next = codec::normalize(&next, &self.schema);
        if next == self.query {
            return None;
        }

        self.query = next;
        let request = self.source.issue(&self.query, &self.schema);

        let encoded = codec::encode(&self.query, &self.schema);
        if encoded != self.location.query_string() {
            debug!(query = %encoded, "rewriting location");
            self.location.replace_query(&encoded);
        }
        Some(request)
    }

    pub fn state(&self) -> ListState {
        if self.source.loading() {
            ListState::PendingFetch
        } else if self.source.error().is_some() {
            ListState::Error
        } else {
            ListState::Idle
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn search_deadline(&self) -> Option<Instant> {
        self.search_debounce.deadline()
    }

    pub fn schema(&self) -> &ListSchema {
        &self.schema
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn source(&self) -> &ListDataSource<T> {
        &self.source
    }

    pub fn items(&self) -> &[T] {
        self.source.items()
    }

    pub fn total(&self) -> u64 {
        self.source.total()
    }

    pub fn page_count(&self) -> u32 {
        self.source.page_count()
    }

    pub fn error(&self) -> Option<&ApiFailure> {
        self.source.error()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// The current query as a query string.
    pub fn query_string(&self) -> String {
        codec::encode(&self.query, &self.schema)
    }
}
