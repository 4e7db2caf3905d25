//! Last-applied list result and the race guard for in-flight loads.
//!
//! Every load is identified by a [`RequestToken`]. Only the most recently
//! issued token may change state; anything older that completes afterwards
//! is dropped without touching `items`, `error` or `loading`.

use std::fmt;

use tracing::{debug, warn};

use crate::api::{ApiFailure, FailureKind, ListResponse};
use crate::query::{ListParams, ListSchema, Query, request_params};

/// Identity of one issued list request. Tokens increase monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// `max(1, ceil(total / page_size))`
pub fn page_count(total: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    let pages = total.div_ceil(page_size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page_count: u32,
}

impl<T> ListResult<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page_count: 1,
        }
    }

    /// Build the visible page from a response.
    ///
    /// An envelope is trusted for `items` and `total`; `page_count` is always
    /// derived from `total`. A bare array is the whole collection and the
    /// requested page is sliced out of it.
    pub fn from_response(response: ListResponse<T>, page: u32, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        match response {
            ListResponse::Paged {
                mut items, total, ..
            } => {
                items.truncate(page_size as usize);
                Self {
                    items,
                    total,
                    page_count: page_count(total, page_size),
                }
            }
            ListResponse::Bare(all) => {
                let total = all.len() as u64;
                let start = (page.max(1) as usize - 1).saturating_mul(page_size as usize);
                let items = all
                    .into_iter()
                    .skip(start)
                    .take(page_size as usize)
                    .collect();
                Self {
                    items,
                    total,
                    page_count: page_count(total, page_size),
                }
            }
        }
    }
}

/// A load the host must perform: call the list endpoint with `params` and
/// hand the outcome back with `token`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub token: RequestToken,
    pub query: Query,
    pub params: ListParams,
}

/// What `complete` did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Loaded,
    Failed(FailureKind),
    Stale,
}

impl Completion {
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Completion::Loaded => None,
            Completion::Failed(kind) => Some(*kind),
            Completion::Stale => Some(FailureKind::StaleResponse),
        }
    }
}

#[derive(Debug)]
pub struct ListDataSource<T> {
    page_size: u32,
    last_token: u64,
    pending: Option<(RequestToken, Query)>,
    result: ListResult<T>,
    error: Option<ApiFailure>,
}

impl<T> ListDataSource<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            last_token: 0,
            pending: None,
            result: ListResult::empty(),
            error: None,
        }
    }

    /// Start a load for `query`. Any earlier in-flight load becomes stale.
    pub fn issue(&mut self, query: &Query, schema: &ListSchema) -> LoadRequest {
        self.last_token += 1;
        let token = RequestToken(self.last_token);
        let params = request_params(query, schema, self.page_size);
        debug!(%token, page = query.page, "issuing list load");

        self.pending = Some((token, query.clone()));
        LoadRequest {
            token,
            query: query.clone(),
            params,
        }
    }

    /// Apply the outcome of the load identified by `token`.
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: Result<ListResponse<T>, ApiFailure>,
    ) -> Completion {
        let query = match self.pending.take() {
            Some((pending, query)) if pending == token => query,
            other => {
                self.pending = other;
                debug!(%token, "discarding stale list response");
                return Completion::Stale;
            }
        };

        match outcome {
            Ok(response) => {
                self.result = ListResult::from_response(response, query.page, self.page_size);
                self.error = None;
                debug!(%token, total = self.result.total, "list load applied");
                Completion::Loaded
            }
            Err(failure) => {
                warn!(%token, error = %failure, "list load failed");
                let kind = failure.kind();
                self.error = Some(failure);
                Completion::Failed(kind)
            }
        }
    }

    /// Invalidate every in-flight load.
    pub fn detach(&mut self) {
        self.pending = None;
    }

    pub fn loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_token(&self) -> Option<RequestToken> {
        self.pending.as_ref().map(|(token, _)| *token)
    }

    pub fn items(&self) -> &[T] {
        &self.result.items
    }

    pub fn total(&self) -> u64 {
        self.result.total
    }

    pub fn page_count(&self) -> u32 {
        self.result.page_count
    }

    pub fn result(&self) -> &ListResult<T> {
        &self.result
    }

    pub fn error(&self) -> Option<&ApiFailure> {
        self.error.as_ref()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}
