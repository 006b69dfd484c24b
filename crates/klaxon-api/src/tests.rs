//! End-to-end tests for the incident API over an in-memory store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use klaxon_core::{
  incident::{NewIncident, Severity},
  store::IncidentStore,
};
use klaxon_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  api_router(Arc::new(store))
}

/// Fire one request and decode the response body as JSON (or `Null` when
/// the body is empty or not JSON).
async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(v) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(v.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, value)
}

async fn create_incident(app: &Router, body: Value) -> Value {
  let (status, body) = send(app, "POST", "/incidents", Some(body)).await;
  assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
  body
}

fn sample() -> Value {
  json!({
    "title": "DB timeout",
    "service": "payments-service",
    "severity": "SEV2"
  })
}

fn ts(v: &Value, key: &str) -> DateTime<FixedOffset> {
  DateTime::parse_from_rfc3339(v[key].as_str().expect(key)).unwrap()
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_returns_201_with_defaults() {
  let app = app().await;
  let body = create_incident(&app, sample()).await;

  assert!(body["id"].as_i64().unwrap() >= 1);
  assert_eq!(body["title"], "DB timeout");
  assert_eq!(body["service"], "payments-service");
  assert_eq!(body["severity"], "SEV2");
  assert_eq!(body["status"], "OPEN");
  assert!(body["owner"].is_null());
  assert!(body["summary"].is_null());
  assert_eq!(body["createdAt"], body["updatedAt"]);
}

#[tokio::test]
async fn create_honours_optional_fields() {
  let app = app().await;
  let body = create_incident(
    &app,
    json!({
      "title": "Disk usage critical",
      "service": "search",
      "severity": "SEV1",
      "status": "MITIGATED",
      "owner": "maya",
      "summary": "replica lag on the primary"
    }),
  )
  .await;

  assert_eq!(body["status"], "MITIGATED");
  assert_eq!(body["owner"], "maya");
  assert_eq!(body["summary"], "replica lag on the primary");
}

#[tokio::test]
async fn create_with_short_title_is_400() {
  let app = app().await;
  let (status, body) = send(
    &app,
    "POST",
    "/incidents",
    Some(json!({ "title": "ab", "service": "search", "severity": "SEV3" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("title"), "{body}");
}

#[tokio::test]
async fn create_with_missing_severity_is_400() {
  let app = app().await;
  let (status, body) = send(
    &app,
    "POST",
    "/incidents",
    Some(json!({ "title": "DB timeout", "service": "payments-service" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(
    body["error"].as_str().unwrap().contains("severity"),
    "{body}"
  );
}

#[tokio::test]
async fn create_with_unknown_severity_is_400() {
  let app = app().await;
  let mut body = sample();
  body["severity"] = json!("SEV5");
  let (status, _) = send(&app, "POST", "/incidents", Some(body)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_with_explicit_null_status_is_400() {
  // Leaving status out selects the OPEN default; null is not a synonym
  // for leaving it out.
  let app = app().await;
  let mut body = sample();
  body["status"] = json!(null);
  let (status, body) = send(&app, "POST", "/incidents", Some(body)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(
    body["error"].as_str().unwrap().contains("status cannot be null"),
    "{body}"
  );
}

// ─── Get one ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_returns_the_stored_row() {
  let app = app().await;
  let created = create_incident(&app, sample()).await;
  let id = created["id"].as_i64().unwrap();

  let (status, body) =
    send(&app, "GET", &format!("/incidents/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, created);
}

#[tokio::test]
async fn get_missing_id_is_404() {
  let app = app().await;
  let (status, body) = send(&app, "GET", "/incidents/4242", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("not found"), "{body}");
}

#[tokio::test]
async fn get_malformed_id_is_400() {
  let app = app().await;
  let (status, _) = send(&app, "GET", "/incidents/abc", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Patch ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn patch_updates_scalars_and_refreshes_updated_at() {
  let app = app().await;
  let created = create_incident(&app, sample()).await;
  let id = created["id"].as_i64().unwrap();

  let (status, body) = send(
    &app,
    "PATCH",
    &format!("/incidents/{id}"),
    Some(json!({ "status": "MITIGATED" })),
  )
  .await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "MITIGATED");
  assert_eq!(body["title"], created["title"]);
  assert_eq!(body["createdAt"], created["createdAt"]);
  assert!(ts(&body, "updatedAt") > ts(&created, "updatedAt"));
}

#[tokio::test]
async fn patch_null_clears_owner() {
  let app = app().await;
  let mut seed = sample();
  seed["owner"] = json!("maya");
  let created = create_incident(&app, seed).await;
  let id = created["id"].as_i64().unwrap();

  let (status, body) = send(
    &app,
    "PATCH",
    &format!("/incidents/{id}"),
    Some(json!({ "owner": null })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["owner"].is_null());
}

#[tokio::test]
async fn patch_value_replaces_owner() {
  let app = app().await;
  let created = create_incident(&app, sample()).await;
  let id = created["id"].as_i64().unwrap();

  let (status, body) = send(
    &app,
    "PATCH",
    &format!("/incidents/{id}"),
    Some(json!({ "owner": "jun" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["owner"], "jun");
}

#[tokio::test]
async fn patch_without_owner_key_keeps_the_stored_owner() {
  let app = app().await;
  let mut seed = sample();
  seed["owner"] = json!("maya");
  let created = create_incident(&app, seed).await;
  let id = created["id"].as_i64().unwrap();

  let (status, body) = send(
    &app,
    "PATCH",
    &format!("/incidents/{id}"),
    Some(json!({ "severity": "SEV1" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["severity"], "SEV1");
  assert_eq!(body["owner"], "maya");
}

#[tokio::test]
async fn patch_null_title_is_400() {
  let app = app().await;
  let created = create_incident(&app, sample()).await;
  let id = created["id"].as_i64().unwrap();

  let (status, body) = send(
    &app,
    "PATCH",
    &format!("/incidents/{id}"),
    Some(json!({ "title": null })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(
    body["error"].as_str().unwrap().contains("cannot be null"),
    "{body}"
  );
}

#[tokio::test]
async fn patch_empty_body_is_400() {
  let app = app().await;
  let created = create_incident(&app, sample()).await;
  let id = created["id"].as_i64().unwrap();

  let (status, body) =
    send(&app, "PATCH", &format!("/incidents/{id}"), Some(json!({}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(
    body["error"].as_str().unwrap().contains("no recognised"),
    "{body}"
  );
}

#[tokio::test]
async fn patch_empty_body_on_missing_id_is_still_400() {
  // Validation precedes the existence check.
  let app = app().await;
  let (status, _) =
    send(&app, "PATCH", "/incidents/4242", Some(json!({}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_valid_body_on_missing_id_is_404() {
  let app = app().await;
  let (status, _) = send(
    &app,
    "PATCH",
    "/incidents/4242",
    Some(json!({ "status": "RESOLVED" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_unknown_status_is_400() {
  let app = app().await;
  let created = create_incident(&app, sample()).await;
  let id = created["id"].as_i64().unwrap();

  let (status, body) = send(
    &app,
    "PATCH",
    &format!("/incidents/{id}"),
    Some(json!({ "status": "CLOSED" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("status"), "{body}");
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// App over a store holding five incidents, oldest first. Creation times
/// are pinned one hour apart; inserting through the API would leave the
/// ordering at the mercy of the wall clock.
async fn seeded_app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let base = Utc::now() - Duration::hours(5);
  let rows = [
    ("DB timeout", "payments-service", Severity::Sev1),
    ("Cache miss storm", "checkout", Severity::Sev2),
    ("Queue backlog", "payments-service", Severity::Sev2),
    ("Network flap", "search", Severity::Sev3),
    ("Disk usage warning", "search", Severity::Sev4),
  ];
  for (i, (title, service, severity)) in rows.into_iter().enumerate() {
    let draft = NewIncident {
      title:    title.to_owned(),
      service:  service.to_owned(),
      severity,
      status:   None,
      owner:    None,
      summary:  None,
    }
    .into_draft(base + Duration::hours(i as i64));
    store.insert(&draft).await.unwrap();
  }
  api_router(Arc::new(store))
}

fn titles(body: &Value) -> Vec<String> {
  body["items"]
    .as_array()
    .unwrap()
    .iter()
    .map(|i| i["title"].as_str().unwrap().to_owned())
    .collect()
}

#[tokio::test]
async fn list_empty_store_returns_an_empty_envelope() {
  let app = app().await;
  let (status, body) = send(&app, "GET", "/incidents", None).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["items"], json!([]));
  assert_eq!(body["total"], 0);
  assert_eq!(body["page"], 1);
  assert_eq!(body["pageSize"], 20);
  assert!(body.get("page_size").is_none());
}

#[tokio::test]
async fn list_returns_newest_first_by_default() {
  let app = seeded_app().await;

  let (status, body) = send(&app, "GET", "/incidents", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total"], 5);
  assert_eq!(titles(&body)[0], "Disk usage warning");
  assert_eq!(titles(&body)[4], "DB timeout");
}

#[tokio::test]
async fn list_clamps_page_size_and_floors_page() {
  let app = app().await;
  let (status, body) =
    send(&app, "GET", "/incidents?page=0&pageSize=500", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["page"], 1);
  assert_eq!(body["pageSize"], 100);
}

#[tokio::test]
async fn list_non_numeric_paging_falls_back_to_defaults() {
  let app = app().await;
  let (status, body) =
    send(&app, "GET", "/incidents?page=abc&pageSize=xyz", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["page"], 1);
  assert_eq!(body["pageSize"], 20);
}

#[tokio::test]
async fn list_repeated_query_keys_use_the_last_value() {
  let app = app().await;
  let (status, body) =
    send(&app, "GET", "/incidents?page=1&page=2", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["page"], 2);
}

#[tokio::test]
async fn list_slices_pages_and_reports_the_full_total() {
  let app = seeded_app().await;

  let (status, body) =
    send(&app, "GET", "/incidents?pageSize=2&page=3", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total"], 5);
  assert_eq!(body["page"], 3);
  assert_eq!(body["pageSize"], 2);
  assert_eq!(titles(&body), vec!["DB timeout"]);
}

#[tokio::test]
async fn list_search_is_case_insensitive() {
  let app = seeded_app().await;

  let (status, body) =
    send(&app, "GET", "/incidents?search=TIMEOUT", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total"], 1);
  assert_eq!(titles(&body), vec!["DB timeout"]);
}

#[tokio::test]
async fn list_filters_compose_with_and() {
  let app = seeded_app().await;

  let (status, body) = send(
    &app,
    "GET",
    "/incidents?service=payments-service&severity=SEV2",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total"], 1);
  assert_eq!(titles(&body), vec!["Queue backlog"]);
}

#[tokio::test]
async fn list_unknown_sort_key_falls_back_to_created_at() {
  let app = seeded_app().await;

  let (status, body) = send(&app, "GET", "/incidents?sortBy=owner", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(titles(&body)[0], "Disk usage warning");
}

#[tokio::test]
async fn list_sorts_by_title_ascending_on_request() {
  let app = seeded_app().await;

  let (status, body) =
    send(&app, "GET", "/incidents?sortBy=title&sortOrder=asc", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    titles(&body),
    vec![
      "Cache miss storm",
      "DB timeout",
      "Disk usage warning",
      "Network flap",
      "Queue backlog",
    ]
  );
}
