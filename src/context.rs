//! Settings shared by every controller of one console session.
//!
//! There are no process-wide singletons: hosts build a [`ConsoleContext`]
//! (usually from [`Config`]) and hand it to each controller they mount.

use std::time::Duration;

use crate::config::Config;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_SEARCH_DELAY: Duration = Duration::from_millis(400);
pub const DEFAULT_VALIDATION_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleContext {
    page_size: u32,
    search_delay: Duration,
    validation_delay: Duration,
}

impl Default for ConsoleContext {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_delay: DEFAULT_SEARCH_DELAY,
            validation_delay: DEFAULT_VALIDATION_DELAY,
        }
    }
}

impl ConsoleContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        Self::default()
            .with_page_size(config.page_size)
            .with_search_delay(config.search_debounce())
            .with_validation_delay(config.validation_debounce())
    }

    /// Page size, never below 1.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = delay;
        self
    }

    pub fn with_validation_delay(mut self, delay: Duration) -> Self {
        self.validation_delay = delay;
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn search_delay(&self) -> Duration {
        self.search_delay
    }

    pub fn validation_delay(&self) -> Duration {
        self.validation_delay
    }
}
