//! Collaborator endpoints the engine talks to.
//!
//! Controllers never perform IO themselves. A list view calls a
//! [`ListEndpoint`]; a form submit calls an [`EntityEndpoint`]. The REST
//! transport in [`http`] implements both; tests substitute in-memory fakes.

use std::future::Future;

use serde::{Deserialize, Serialize};

pub mod error;
pub mod http;

pub use error::{ApiFailure, FailureKind, GENERIC_FAILURE_MESSAGE};
pub use http::{RestClient, RestResource};

pub use crate::query::ListParams;

/// Body of a list response: either a page envelope or a bare array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Paged {
        items: Vec<T>,
        total: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pages: Option<u32>,
    },
    Bare(Vec<T>),
}

impl<T> ListResponse<T> {
    pub fn paged(items: Vec<T>, total: u64) -> Self {
        ListResponse::Paged {
            items,
            total,
            pages: None,
        }
    }
}

/// Source of list pages.
pub trait ListEndpoint<T>: Send + Sync {
    fn list(
        &self,
        params: &ListParams,
    ) -> impl Future<Output = Result<ListResponse<T>, ApiFailure>> + Send;
}

/// Create, read, update and delete for one entity type.
///
/// `P` is the write payload produced by a form model.
pub trait EntityEndpoint<P>: Send + Sync {
    type Entity: Send;

    fn fetch(&self, id: i64) -> impl Future<Output = Result<Self::Entity, ApiFailure>> + Send;

    fn create(&self, payload: &P)
    -> impl Future<Output = Result<Self::Entity, ApiFailure>> + Send;

    /// Partial update (PATCH).
    fn update(
        &self,
        id: i64,
        payload: &P,
    ) -> impl Future<Output = Result<Self::Entity, ApiFailure>> + Send;

    fn delete(&self, id: i64) -> impl Future<Output = Result<(), ApiFailure>> + Send;
}
