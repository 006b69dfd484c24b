//! HTTP server assembly for Klaxon.
//!
//! Wires the incident API, a health endpoint, and request tracing into one
//! axum [`Router`], and carries the runtime configuration type.

use std::{path::PathBuf, sync::Arc};

use axum::{Json, Router, routing::get};
use klaxon_core::store::IncidentStore;
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 4000 }
fn default_db_path() -> PathBuf { PathBuf::from("data/incidents.db") }

/// Runtime server configuration, deserialised from `config.toml` and
/// `KLAXON_*` environment variables.
///
/// Every field has a default, so the server starts with no configuration
/// file at all.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:    String,
  #[serde(default = "default_port")]
  pub port:    u16,
  #[serde(default = "default_db_path")]
  pub db_path: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:    default_host(),
      port:    default_port(),
      db_path: default_db_path(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application router: health endpoint plus the incident API
/// under `/api`.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: IncidentStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", klaxon_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

/// `GET /health` — liveness check.
async fn health() -> Json<serde_json::Value> { Json(json!({ "status": "ok" })) }

// ─── Tests ────────────────────────────────────────────────────────────────────
