//! Handlers for `/incidents` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/incidents` | Paged listing; filters, search, and sorting via the query string |
//! | `POST`  | `/incidents` | Body: [`CreateIncidentBody`]; returns 201 + stored incident |
//! | `GET`   | `/incidents/:id` | 404 if not found |
//! | `PATCH` | `/incidents/:id` | Body: [`UpdateIncidentBody`]; partial update |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use klaxon_core::{
  incident::Incident, patch::FieldPatch, query::ListParams,
  store::IncidentStore,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, validate};

// ─── List ─────────────────────────────────────────────────────────────────────

/// Paged response envelope for `GET /incidents`.
///
/// `page` and `pageSize` echo the values the listing actually ran with,
/// after defaulting and clamping. `total` counts every match, not just the
/// returned window.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
  pub items:     Vec<Incident>,
  pub total:     i64,
  pub page:      i64,
  pub page_size: i64,
}

/// `GET /incidents` — unrecognised or malformed query parameters fall back
/// to defaults rather than erroring.
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError>
where
  S: IncidentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let plan = params.into_plan();
  let page = store
    .list(&plan)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(ListResponse {
    items:     page.items,
    total:     page.total,
    page:      plan.page,
    page_size: plan.page_size,
  }))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /incidents`.
///
/// Every field is loosely typed on purpose: [`validate::create_body`] checks
/// required fields, lengths, and enum membership itself so that each failure
/// is a 400 with a field-specific message instead of a deserialization
/// rejection. `status` is a [`FieldPatch`] because it is the one field with
/// a default: an absent key means OPEN, while an explicit `null` must be
/// distinguishable so it can be rejected.
#[derive(Debug, Default, Deserialize)]
pub struct CreateIncidentBody {
  pub title:    Option<String>,
  pub service:  Option<String>,
  pub severity: Option<String>,
  #[serde(default)]
  pub status:   FieldPatch<String>,
  pub owner:    Option<String>,
  pub summary:  Option<String>,
}

/// `POST /incidents` — returns 201 + the row as stored.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateIncidentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: IncidentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let draft = validate::create_body(body)?.into_draft(Utc::now());
  let id = store
    .insert(&draft)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  // Echo the stored row, not the draft we sent.
  let incident = store
    .get(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::Internal(format!("incident {id} missing after insert"))
    })?;
  Ok((StatusCode::CREATED, Json(incident)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /incidents/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Incident>, ApiError>
where
  S: IncidentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let incident = store
    .get(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("incident {id} not found")))?;
  Ok(Json(incident))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PATCH /incidents/:id`.
///
/// Every field is optional; an absent key leaves the stored value untouched.
/// All six fields use [`FieldPatch`] so an explicit `null` is visible:
/// it clears `owner` and `summary`, and is rejected for the rest.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateIncidentBody {
  #[serde(default)]
  pub title:    FieldPatch<String>,
  #[serde(default)]
  pub service:  FieldPatch<String>,
  #[serde(default)]
  pub severity: FieldPatch<String>,
  #[serde(default)]
  pub status:   FieldPatch<String>,
  #[serde(default)]
  pub owner:    FieldPatch<String>,
  #[serde(default)]
  pub summary:  FieldPatch<String>,
}

/// `PATCH /incidents/:id` — merge the patch into the stored row and return
/// the result.
///
/// Body validation runs first, so a bad or empty patch is a 400 even when
/// the id does not exist; only then does a missing row become a 404.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<UpdateIncidentBody>,
) -> Result<Json<Incident>, ApiError>
where
  S: IncidentStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let patch = validate::update_body(body)?;

  let existing = store
    .get(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("incident {id} not found")))?;

  let updated = patch
    .apply(&existing, Utc::now())
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let replaced = store
    .replace(&updated)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !replaced {
    return Err(ApiError::NotFound(format!("incident {id} not found")));
  }

  let fresh = store
    .get(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::Internal(format!("incident {id} missing after update"))
    })?;
  Ok(Json(fresh))
}
