//! The URL query string a list page mirrors its state into.

use std::sync::Arc;

use parking_lot::Mutex;

/// Read and replace the current location's query string.
///
/// `replace_query` must replace the history entry rather than push a new
/// one, so filter tweaks do not flood the back button.
pub trait Location {
    fn query_string(&self) -> String;
    fn replace_query(&mut self, query_string: &str);
}

/// In-memory location. Clones share the same state, so a host (or test) can
/// keep a handle while the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryLocation {
    inner: Arc<Mutex<LocationState>>,
}

#[derive(Debug, Default)]
struct LocationState {
    query: String,
    writes: usize,
}

impl MemoryLocation {
    pub fn new(initial: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LocationState {
                query: initial.trim_start_matches('?').to_string(),
                writes: 0,
            })),
        }
    }

    /// Number of `replace_query` calls so far.
    pub fn writes(&self) -> usize {
        self.inner.lock().writes
    }

    /// Simulate navigation outside the controller (back button, pasted URL).
    pub fn navigate(&self, query_string: &str) {
        self.inner.lock().query = query_string.trim_start_matches('?').to_string();
    }
}

impl Location for MemoryLocation {
    fn query_string(&self) -> String {
        self.inner.lock().query.clone()
    }

    fn replace_query(&mut self, query_string: &str) {
        let mut state = self.inner.lock();
        state.query = query_string.to_string();
        state.writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let handle = MemoryLocation::new("?page=2");
        let mut owned = handle.clone();
        assert_eq!(owned.query_string(), "page=2");

        owned.replace_query("page=3");
        assert_eq!(handle.query_string(), "page=3");
        assert_eq!(handle.writes(), 1);

        handle.navigate("search=x");
        assert_eq!(owned.query_string(), "search=x");
        assert_eq!(handle.writes(), 1);
    }
}
