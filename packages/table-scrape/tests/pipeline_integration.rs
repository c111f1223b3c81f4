//! End-to-end tests for a full invocation.
//!
//! These tests verify the whole flow against mock collaborators:
//! 1. Resolve configuration
//! 2. Fetch the document
//! 3. Extract rows
//! 4. Replace the collection
//! 5. Report the outcome

use std::collections::{HashMap, HashSet};

use serde_json::{json, Value};
use table_scrape::{
    stores::StoreOp, EventKind, InvocationResult, MemorySink, MemoryStore, MockFetcher, Record,
    ScrapeJob,
};

const URL: &str = "https://quakes.example.com/24h";
const COLLECTION: &str = "sismos";

const QUAKE_PAGE: &str = r#"
<!DOCTYPE html>
<html>
  <head><title>Últimas 24 horas</title></head>
  <body>
    <table class="table table-hover table-bordered">
      <tr><th>Ubicación</th><th>Fecha y hora</th><th>Magnitud</th></tr>
      <tr><td>Lima</td><td>2024-01-01 10:00</td><td>4.5</td></tr>
      <tr><td>Cusco</td><td>2024-01-01 11:00</td><td>3.2</td></tr>
    </table>
  </body>
</html>
"#;

/// Environment with the collection, URL and field names set.
fn env_with(extra: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let mut vars: HashMap<String, String> = [
        ("TARGET_COLLECTION_NAME", COLLECTION),
        ("SOURCE_URL", URL),
        ("FIELD_NAMES", "location,timestamp,magnitude"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    move |key| vars.get(key).cloned()
}

/// Helper to set up a job over a quake page and shared store/sink handles.
fn setup(page: &str) -> (ScrapeJob<MockFetcher, MemoryStore, MemorySink>, MockFetcher, MemoryStore, MemorySink) {
    let fetcher = MockFetcher::new().with_document(URL, page);
    let store = MemoryStore::new();
    let sink = MemorySink::new();
    let job = ScrapeJob::new(fetcher.clone(), store.clone(), sink.clone());
    (job, fetcher, store, sink)
}

fn values(records: &[Record]) -> Vec<Vec<(String, String)>> {
    let mut rows: Vec<Vec<(String, String)>> = records
        .iter()
        .map(|r| r.fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .collect();
    rows.sort();
    rows
}

fn ids(records: &[Record]) -> HashSet<String> {
    records.iter().map(|r| r.id.clone()).collect()
}

#[tokio::test]
async fn test_end_to_end_replaces_collection_with_table_rows() {
    let (job, _fetcher, store, sink) = setup(QUAKE_PAGE);
    let stale = Record::from_cells(&["location".to_string()], vec!["Arequipa".to_string()]);
    store.seed(COLLECTION, vec![stale.clone()]);

    let result = job.invoke_with_env(&json!({"source": "timer"}), env_with(&[])).await;

    assert_eq!(result.status_code(), 200);
    let body = result.records().unwrap();
    assert_eq!(body.len(), 2);
    assert_eq!(body[0].get("location"), Some("Lima"));
    assert_eq!(body[0].get("timestamp"), Some("2024-01-01 10:00"));
    assert_eq!(body[0].get("magnitude"), Some("4.5"));
    assert_eq!(body[1].get("location"), Some("Cusco"));
    assert_eq!(body[1].get("timestamp"), Some("2024-01-01 11:00"));
    assert_eq!(body[1].get("magnitude"), Some("3.2"));
    assert_ne!(body[0].id, body[1].id);

    // Collection holds exactly the two new items.
    let stored = store.records(COLLECTION);
    assert_eq!(ids(&stored), ids(body));
    assert!(!ids(&stored).contains(&stale.id));

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Info);
    assert_eq!(events[0].data["total_filas"], 2);
}

#[tokio::test]
async fn test_result_serializes_for_trigger() {
    let (job, _fetcher, _store, _sink) = setup(QUAKE_PAGE);

    let result = job.invoke_with_env(&Value::Null, env_with(&[])).await;
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["statusCode"], 200);
    let first = &value["body"][0];
    assert_eq!(first["location"], "Lima");
    assert!(first["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn test_rerun_keeps_values_but_never_ids() {
    let (job, fetcher, store, _sink) = setup(QUAKE_PAGE);

    let first = job.invoke_with_env(&Value::Null, env_with(&[])).await;
    let after_first = store.records(COLLECTION);
    let second = job.invoke_with_env(&Value::Null, env_with(&[])).await;
    let after_second = store.records(COLLECTION);

    assert!(first.is_success() && second.is_success());
    assert_eq!(fetcher.call_count(), 2);
    assert_eq!(values(&after_first), values(&after_second));
    assert!(ids(&after_first).is_disjoint(&ids(&after_second)));
    assert_eq!(after_second.len(), 2);
}

#[tokio::test]
async fn test_missing_collection_fails_before_fetch() {
    let (job, fetcher, store, sink) = setup(QUAKE_PAGE);
    let existing = Record::from_cells(&["location".to_string()], vec!["Puno".to_string()]);
    store.seed(COLLECTION, vec![existing.clone()]);

    let env = |key: &str| match key {
        "SOURCE_URL" => Some(URL.to_string()),
        _ => None,
    };
    let result = job.invoke_with_env(&Value::Null, env).await;

    assert_eq!(result.status_code(), 500);
    assert!(result.error().unwrap().contains("TARGET_COLLECTION_NAME"));
    assert_eq!(fetcher.call_count(), 0);
    assert!(store.calls().is_empty());
    assert_eq!(store.records(COLLECTION), vec![existing]);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Error);
}

#[tokio::test]
async fn test_header_only_table_never_reaches_store() {
    let page = r#"
        <table class="table table-hover table-bordered">
          <tr><th>Ubicación</th><th>Fecha y hora</th><th>Magnitud</th></tr>
        </table>
    "#;
    let (job, _fetcher, store, _sink) = setup(page);
    store.seed(
        COLLECTION,
        vec![Record::from_cells(&["location".to_string()], vec!["Ica".to_string()])],
    );

    let result = job.invoke_with_env(&Value::Null, env_with(&[])).await;

    assert!(matches!(result, InvocationResult::Failure { status_code: 500, .. }));
    assert!(result.error().unwrap().contains("no data rows"));
    assert!(store.calls().is_empty());
    assert_eq!(store.len(COLLECTION), 1);
}

#[tokio::test]
async fn test_storage_failure_mid_load_is_reported_without_rollback() {
    let (job, _fetcher, store, sink) = setup(QUAKE_PAGE);
    store.seed(
        COLLECTION,
        vec![Record::from_cells(&["location".to_string()], vec!["Tacna".to_string()])],
    );
    store.fail_after(StoreOp::Put, 0);

    let result = job.invoke_with_env(&Value::Null, env_with(&[])).await;

    assert_eq!(result.status_code(), 500);
    assert!(result.error().unwrap().starts_with("writing 2 items to sismos failed"));
    // Drained, nothing loaded: the gap is visible.
    assert!(store.is_empty(COLLECTION));

    let events = sink.events();
    assert_eq!(events.len(), 1);
    let traceback = events[0].data["traceback"].as_str().unwrap();
    assert_eq!(traceback.matches("injected Put failure").count(), 1);
}

#[tokio::test]
async fn test_load_then_prune_strategy_from_env() {
    let (job, _fetcher, store, _sink) = setup(QUAKE_PAGE);
    store.seed(
        COLLECTION,
        vec![Record::from_cells(&["location".to_string()], vec!["Piura".to_string()])],
    );

    let result = job
        .invoke_with_env(
            &Value::Null,
            env_with(&[("REPLACE_STRATEGY", "load-then-prune"), ("BATCH_SIZE", "1")]),
        )
        .await;

    assert!(result.is_success());
    assert_eq!(ids(&store.records(COLLECTION)), ids(result.records().unwrap()));
    assert!(store.calls().iter().all(|c| c.size_after > 0));
    assert_eq!(store.call_count(StoreOp::Put), 2);
}

#[tokio::test]
async fn test_fields_follow_configured_names() {
    let (job, _fetcher, _store, _sink) = setup(QUAKE_PAGE);

    let result = job
        .invoke_with_env(&Value::Null, env_with(&[("FIELD_NAMES", "lugar")]))
        .await;

    let body = result.records().unwrap();
    assert!(body.iter().all(|r| r.field_count() == 1));
    assert_eq!(body[0].get("lugar"), Some("Lima"));
}

#[tokio::test]
async fn test_field_named_id_fails_before_fetch() {
    let (job, fetcher, store, _sink) = setup(QUAKE_PAGE);

    let result = job
        .invoke_with_env(&Value::Null, env_with(&[("FIELD_NAMES", "id,location")]))
        .await;

    assert_eq!(result.status_code(), 500);
    assert!(result.error().unwrap().contains("FIELD_NAMES"));
    assert_eq!(fetcher.call_count(), 0);
    assert!(store.calls().is_empty());
}
