//! Async host for a list controller.
//!
//! [`ListView`] runs one [`ListQueryController`] on a tokio task. The loop
//! waits on three things at once: UI events from an mpsc channel, the
//! search debounce deadline, and the in-flight list requests. After every
//! wake-up it publishes a [`ListSnapshot`] on a watch channel.

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant as TokioInstant;
use tracing::{debug, warn};

use super::controller::{ListQueryController, ListState};
use super::location::Location;
use super::source::{LoadRequest, RequestToken};
use crate::api::{ApiFailure, ListEndpoint, ListResponse};
use crate::context::ConsoleContext;
use crate::error::Result;
use crate::query::{FilterValue, ListSchema, Query, SortDirection};

/// Something the user did on a list page.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent {
    SearchText(String),
    SubmitSearch,
    SetFilter(String, FilterValue),
    ClearFilter(String),
    SetSort(String, SortDirection),
    SetPage(u32),
    ClearFilters,
    Refresh,
    /// The location changed outside the controller (back button, forwarded
    /// reset from another tab).
    LocationChanged,
}

/// What a list page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListSnapshot<T> {
    pub query: Query,
    pub search_text: String,
    pub state: ListState,
    pub items: Vec<T>,
    pub total: u64,
    pub page_count: u32,
    pub error: Option<String>,
}

impl<T> ListSnapshot<T> {
    pub fn is_loading(&self) -> bool {
        self.state == ListState::PendingFetch
    }
}

type Outcome<T> = (RequestToken, std::result::Result<ListResponse<T>, ApiFailure>);

pub struct ListView<T, E, L> {
    controller: ListQueryController<T, L>,
    endpoint: Arc<E>,
    in_flight: FuturesUnordered<BoxFuture<'static, Outcome<T>>>,
}

impl<T, E, L> ListView<T, E, L>
where
    T: Clone + Send + 'static,
    E: ListEndpoint<T> + 'static,
    L: Location,
{
    /// Mount the controller and start its first load.
    pub fn mount(ctx: &ConsoleContext, schema: ListSchema, location: L, endpoint: Arc<E>) -> Self {
        let (controller, request) = ListQueryController::mount(ctx, schema, location);
        let mut view = Self {
            controller,
            endpoint,
            in_flight: FuturesUnordered::new(),
        };
        view.dispatch(Some(request));
        view
    }

    pub fn controller(&self) -> &ListQueryController<T, L> {
        &self.controller
    }

    /// Apply one event. Rejected changes (unknown filter, unsortable field)
    /// return an error and leave everything as it was.
    pub fn handle(&mut self, event: ListEvent, now: Instant) -> Result<()> {
        let request = match event {
            ListEvent::SearchText(text) => {
                self.controller.set_search_text(&text, now);
                None
            }
            ListEvent::SubmitSearch => self.controller.submit_search(),
            ListEvent::SetFilter(key, value) => self.controller.set_filter(&key, value)?,
            ListEvent::ClearFilter(key) => self.controller.clear_filter(&key)?,
            ListEvent::SetSort(field, direction) => self.controller.set_sort(&field, direction)?,
            ListEvent::SetPage(page) => self.controller.set_page(page),
            ListEvent::ClearFilters => self.controller.clear_filters(),
            ListEvent::Refresh => self.controller.refresh(),
            ListEvent::LocationChanged => self.controller.sync_from_location(),
        };
        self.dispatch(request);
        Ok(())
    }

    pub fn snapshot(&self) -> ListSnapshot<T> {
        ListSnapshot {
            query: self.controller.query().clone(),
            search_text: self.controller.search_text().to_string(),
            state: self.controller.state(),
            items: self.controller.items().to_vec(),
            total: self.controller.total(),
            page_count: self.controller.page_count(),
            error: self.controller.error().map(ApiFailure::user_message),
        }
    }

    /// Run until the event channel closes, then unmount.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<ListEvent>,
        snapshots: watch::Sender<ListSnapshot<T>>,
    ) {
        snapshots.send_replace(self.snapshot());

        loop {
            let debounce = self.controller.search_deadline();
            // select! builds every branch future, so a disabled timer still
            // needs some instant to sleep until.
            let deadline = debounce
                .map(TokioInstant::from_std)
                .unwrap_or_else(|| TokioInstant::now() + FAR_FUTURE);

            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        if let Err(e) = self.handle(event, TokioInstant::now().into_std()) {
                            warn!(error = %e, "list event rejected");
                        }
                    }
                    None => break,
                },
                _ = tokio::time::sleep_until(deadline), if debounce.is_some() => {
                    let request = self.controller.tick(TokioInstant::now().into_std());
                    self.dispatch(request);
                }
                Some((token, outcome)) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    let (completion, follow_up) = self.controller.complete(token, outcome);
                    debug!(%token, ?completion, "list load finished");
                    self.dispatch(follow_up);
                }
            }

            snapshots.send_replace(self.snapshot());
        }

        self.controller.unmount();
        snapshots.send_replace(self.snapshot());
        debug!("list view stopped");
    }

    fn dispatch(&mut self, request: Option<LoadRequest>) {
        let Some(request) = request else {
            return;
        };
        let endpoint = Arc::clone(&self.endpoint);
        self.in_flight.push(Box::pin(async move {
            let outcome = endpoint.list(&request.params).await;
            (request.token, outcome)
        }));
    }
}

const FAR_FUTURE: std::time::Duration = std::time::Duration::from_secs(60 * 60 * 24);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::MemoryLocation;
    use crate::query::{FilterDef, FilterKind, ListParams};

    struct Fixed;

    impl ListEndpoint<u32> for Fixed {
        async fn list(
            &self,
            params: &ListParams,
        ) -> std::result::Result<ListResponse<u32>, ApiFailure> {
            let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
            Ok(ListResponse::paged(vec![page * 100], 35))
        }
    }

    fn schema() -> ListSchema {
        ListSchema::new()
            .filter(FilterDef::new("active", FilterKind::Bool).with_wire_key("isActive"))
            .sortable(&["title"])
    }

    #[test]
    fn test_handle_rejects_unknown_filter() {
        let mut view: ListView<u32, _, _> = ListView::mount(
            &ConsoleContext::new(),
            schema(),
            MemoryLocation::new(""),
            Arc::new(Fixed),
        );
        let result = view.handle(
            ListEvent::SetFilter("colour".into(), FilterValue::Text("red".into())),
            Instant::now(),
        );
        assert!(result.is_err());
        assert_eq!(view.snapshot().query, Query::default());
    }

    #[tokio::test]
    async fn test_run_applies_loads_and_stops_on_close() {
        let location = MemoryLocation::new("");
        let view: ListView<u32, _, _> = ListView::mount(
            &ConsoleContext::new(),
            schema(),
            location.clone(),
            Arc::new(Fixed),
        );
        let (tx, mut rx) = watch::channel(view.snapshot());
        let (events, events_rx) = mpsc::channel(8);
        let task = tokio::spawn(view.run(events_rx, tx));

        rx.wait_for(|s| s.items == vec![100]).await.unwrap();

        events.send(ListEvent::SetPage(3)).await.unwrap();
        let snapshot = rx
            .wait_for(|s| s.items == vec![300] && !s.is_loading())
            .await
            .unwrap()
            .clone();
        assert_eq!(snapshot.total, 35);
        assert_eq!(snapshot.page_count, 4);
        assert_eq!(location.query_string(), "page=3");

        drop(events);
        task.await.unwrap();
    }
}
