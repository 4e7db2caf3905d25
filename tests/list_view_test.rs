//! Timing behavior of a running list view: search debounce, stale
//! responses and failed loads, on tokio's paused clock.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};

use vitrine::api::ListParams;
use vitrine::query::{FilterDef, FilterKind};
use vitrine::{
    ApiFailure, ConsoleContext, ListEndpoint, ListEvent, ListResponse, ListSchema, ListSnapshot,
    ListView, Location, MemoryLocation, SortDirection,
};

/// Echoes the requested search and page back as the only item. Searches for
/// `slow` take a second to answer; page 9 always fails.
#[derive(Default)]
struct Recording {
    calls: Mutex<Vec<ListParams>>,
}

impl Recording {
    fn searches(&self) -> Vec<Option<String>> {
        self.calls
            .lock()
            .iter()
            .map(|params| params.get("search").map(str::to_string))
            .collect()
    }
}

impl ListEndpoint<String> for Recording {
    async fn list(&self, params: &ListParams) -> Result<ListResponse<String>, ApiFailure> {
        self.calls.lock().push(params.clone());
        let search = params.get("search").unwrap_or_default().to_string();
        let page = params.get("page").unwrap_or("1").to_string();

        if search == "slow" {
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        if page == "9" {
            return Err(ApiFailure::Server {
                status: 500,
                message: "Database unavailable".into(),
            });
        }
        Ok(ListResponse::paged(vec![format!("{search}@{page}")], 95))
    }
}

fn schema() -> ListSchema {
    ListSchema::new()
        .filter(FilterDef::new("active", FilterKind::Bool).with_wire_key("isActive"))
        .sortable(&["title"])
}

struct Harness {
    endpoint: Arc<Recording>,
    location: MemoryLocation,
    events: mpsc::Sender<ListEvent>,
    snapshots: watch::Receiver<ListSnapshot<String>>,
    task: tokio::task::JoinHandle<()>,
}

impl Harness {
    fn start(url: &str) -> Self {
        let endpoint = Arc::new(Recording::default());
        let location = MemoryLocation::new(url);
        let view = ListView::mount(
            &ConsoleContext::new(),
            schema(),
            location.clone(),
            Arc::clone(&endpoint),
        );
        let (tx, snapshots) = watch::channel(view.snapshot());
        let (events, events_rx) = mpsc::channel(16);
        let task = tokio::spawn(view.run(events_rx, tx));
        Self {
            endpoint,
            location,
            events,
            snapshots,
            task,
        }
    }

    async fn send(&self, event: ListEvent) {
        self.events.send(event).await.unwrap();
    }

    async fn settled_on(&mut self, item: &str) -> ListSnapshot<String> {
        self.snapshots
            .wait_for(|s| !s.is_loading() && s.items.first().map(String::as_str) == Some(item))
            .await
            .unwrap()
            .clone()
    }

    async fn stop(self) {
        drop(self.events);
        self.task.await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn test_typing_issues_one_request_after_the_pause() {
    let mut harness = Harness::start("");
    harness.settled_on("@1").await;

    for text in ["s", "sh", "sho", "shoe"] {
        harness.send(ListEvent::SearchText(text.into())).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(harness.endpoint.searches(), vec![None]);

    let snapshot = harness.settled_on("shoe@1").await;
    assert_eq!(snapshot.query.search, "shoe");
    assert_eq!(snapshot.search_text, "shoe");
    assert_eq!(
        harness.endpoint.searches(),
        vec![None, Some("shoe".to_string())]
    );
    assert_eq!(harness.location.query_string(), "search=shoe");

    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_sort_change_does_not_restart_the_search_delay() {
    let mut harness = Harness::start("?page=4");
    harness.settled_on("@4").await;

    harness.send(ListEvent::SearchText("shoe".into())).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    harness
        .send(ListEvent::SetSort("title".into(), SortDirection::Desc))
        .await;

    let snapshot = harness.settled_on("@1").await;
    assert_eq!(snapshot.query.page, 1);
    assert_eq!(snapshot.query.search, "");

    // 400ms after the keystroke, not after the sort change.
    tokio::time::sleep(Duration::from_millis(210)).await;
    let snapshot = harness.settled_on("shoe@1").await;
    assert_eq!(snapshot.query.sort.map(|s| s.direction), Some(SortDirection::Desc));

    let calls = harness.endpoint.calls.lock().clone();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1].get("sortDir"), Some("desc"));
    assert_eq!(calls[1].get("search"), None);
    assert_eq!(calls[2].get("search"), Some("shoe"));
    assert_eq!(calls[2].get("page"), Some("1"));
    drop(calls);

    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_submit_skips_the_debounce() {
    let mut harness = Harness::start("?page=2");
    harness.settled_on("@2").await;

    harness.send(ListEvent::SearchText("  lamp ".into())).await;
    harness.send(ListEvent::SubmitSearch).await;

    let snapshot = harness.settled_on("lamp@1").await;
    assert_eq!(snapshot.query.page, 1);
    assert_eq!(snapshot.search_text, "  lamp ");

    // The cancelled debounce must not fire a second identical load.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(harness.endpoint.calls.lock().len(), 2);

    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_slow_response_for_an_older_query_is_dropped() {
    let mut harness = Harness::start("");
    harness.settled_on("@1").await;

    harness.send(ListEvent::SearchText("slow".into())).await;
    harness.send(ListEvent::SubmitSearch).await;
    harness.send(ListEvent::SearchText("fast".into())).await;
    harness.send(ListEvent::SubmitSearch).await;

    harness.settled_on("fast@1").await;

    // Let the slow answer arrive; it must not replace the newer page.
    tokio::time::sleep(Duration::from_secs(3)).await;
    let snapshot = harness.snapshots.borrow().clone();
    assert_eq!(snapshot.items, vec!["fast@1".to_string()]);
    assert_eq!(snapshot.query.search, "fast");
    assert!(snapshot.error.is_none());
    let searches = harness.endpoint.searches();
    assert_eq!(searches.len(), 3);
    assert!(searches.contains(&Some("slow".to_string())));

    harness.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_load_keeps_the_previous_page() {
    let mut harness = Harness::start("");
    harness.settled_on("@1").await;

    harness.send(ListEvent::SetPage(9)).await;
    let snapshot = harness
        .snapshots
        .wait_for(|s| s.error.is_some())
        .await
        .unwrap()
        .clone();

    assert_eq!(snapshot.items, vec!["@1".to_string()]);
    assert_eq!(snapshot.total, 95);
    assert_eq!(snapshot.query.page, 9);
    assert_eq!(snapshot.error.as_deref(), Some("Database unavailable"));

    // A later successful load clears the error.
    harness.send(ListEvent::SetPage(3)).await;
    let snapshot = harness.settled_on("@3").await;
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.page_count, 10);

    harness.stop().await;
}
