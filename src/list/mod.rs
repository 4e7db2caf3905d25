//! List pages: query controller, data source, URL mirror and async driver.

pub mod controller;
pub mod location;
pub mod source;
pub mod view;

pub use controller::{ListQueryController, ListState};
pub use location::{Location, MemoryLocation};
pub use source::{
    Completion, ListDataSource, ListResult, LoadRequest, RequestToken, page_count,
};
pub use view::{ListEvent, ListSnapshot, ListView};
