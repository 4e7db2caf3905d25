#[macro_use]
mod macros;

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod debounce;
pub mod entities;
pub mod error;
pub mod form;
pub mod list;
pub mod paths;
pub mod query;

pub use api::{ApiFailure, EntityEndpoint, FailureKind, ListEndpoint, ListResponse, RestClient};
pub use config::Config;
pub use context::ConsoleContext;
pub use debounce::Debouncer;
pub use entities::{Editable, Entity, Resource};
pub use error::{Result, VitrineError};
pub use form::{
    ErrorDistributor, FieldErrors, FieldValue, FormMode, FormModel, FormState, SubmitAttempt,
    SubmitResult, ValidatedFormController,
};
pub use list::{
    ListDataSource, ListEvent, ListQueryController, ListSnapshot, ListView, Location,
    MemoryLocation, RequestToken,
};
pub use query::{FilterValue, ListSchema, Query, Sort, SortDirection};
