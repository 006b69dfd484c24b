//! Request-body validation for the incident endpoints.
//!
//! Everything here maps failures to [`ApiError::BadRequest`] with a
//! field-specific message, so handlers can simply `?` their way through.
//! Limits are counted in characters, not bytes.

use std::str::FromStr;

use klaxon_core::{
  incident::NewIncident,
  patch::{FieldPatch, IncidentPatch},
};

use crate::{
  error::ApiError,
  incidents::{CreateIncidentBody, UpdateIncidentBody},
};

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 200;
pub const SERVICE_MIN: usize = 1;
pub const SERVICE_MAX: usize = 100;
pub const OWNER_MAX: usize = 100;
pub const SUMMARY_MAX: usize = 1000;

fn check_len(
  field: &'static str,
  value: &str,
  min: usize,
  max: usize,
) -> Result<(), ApiError> {
  let n = value.chars().count();
  if n < min || n > max {
    return Err(ApiError::BadRequest(format!(
      "{field} must be between {min} and {max} characters"
    )));
  }
  Ok(())
}

fn check_max(
  field: &'static str,
  value: &str,
  max: usize,
) -> Result<(), ApiError> {
  if value.chars().count() > max {
    return Err(ApiError::BadRequest(format!(
      "{field} must be at most {max} characters"
    )));
  }
  Ok(())
}

/// Parse a closed-enum field (`severity`, `status`) from its wire string.
///
/// These arrive as plain strings rather than typed enums so that a value
/// outside the allowed set surfaces as a 400, not a deserialization
/// rejection.
fn parse_enum<T>(value: &str) -> Result<T, ApiError>
where
  T: FromStr<Err = klaxon_core::Error>,
{
  value
    .parse()
    .map_err(|e: klaxon_core::Error| ApiError::BadRequest(e.to_string()))
}

/// A scalar field sent as value / absent / explicit `null`. `null` is
/// rejected; only `owner` and `summary` are clearable.
fn scalar(
  field: &'static str,
  patch: FieldPatch<String>,
) -> Result<Option<String>, ApiError> {
  match patch {
    FieldPatch::Keep => Ok(None),
    FieldPatch::Clear => {
      Err(ApiError::BadRequest(format!("{field} cannot be null")))
    }
    FieldPatch::Set(v) => Ok(Some(v)),
  }
}

fn require(
  field: &'static str,
  value: Option<String>,
) -> Result<String, ApiError> {
  value.ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// Validate a `POST /incidents` body into a [`NewIncident`].
pub fn create_body(body: CreateIncidentBody) -> Result<NewIncident, ApiError> {
  let title = require("title", body.title)?;
  check_len("title", &title, TITLE_MIN, TITLE_MAX)?;
  let service = require("service", body.service)?;
  check_len("service", &service, SERVICE_MIN, SERVICE_MAX)?;
  let severity = parse_enum(&require("severity", body.severity)?)?;
  // Absent means the OPEN default; an explicit null is not a way to ask
  // for it.
  let status = scalar("status", body.status)?
    .as_deref()
    .map(parse_enum)
    .transpose()?;
  if let Some(owner) = &body.owner {
    check_max("owner", owner, OWNER_MAX)?;
  }
  if let Some(summary) = &body.summary {
    check_max("summary", summary, SUMMARY_MAX)?;
  }

  Ok(NewIncident {
    title,
    service,
    severity,
    status,
    owner: body.owner,
    summary: body.summary,
  })
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// Validate a `PATCH /incidents/:id` body into an [`IncidentPatch`].
///
/// Runs before the row's existence is checked, so an invalid or empty body
/// is a 400 even when the id does not exist.
pub fn update_body(
  body: UpdateIncidentBody,
) -> Result<IncidentPatch, ApiError> {
  let title = scalar("title", body.title)?;
  if let Some(t) = &title {
    check_len("title", t, TITLE_MIN, TITLE_MAX)?;
  }
  let service = scalar("service", body.service)?;
  if let Some(s) = &service {
    check_len("service", s, SERVICE_MIN, SERVICE_MAX)?;
  }
  let severity = scalar("severity", body.severity)?
    .as_deref()
    .map(parse_enum)
    .transpose()?;
  let status = scalar("status", body.status)?
    .as_deref()
    .map(parse_enum)
    .transpose()?;

  let owner = match body.owner {
    FieldPatch::Set(v) => {
      check_max("owner", &v, OWNER_MAX)?;
      FieldPatch::Set(v)
    }
    other => other,
  };
  let summary = match body.summary {
    FieldPatch::Set(v) => {
      check_max("summary", &v, SUMMARY_MAX)?;
      FieldPatch::Set(v)
    }
    other => other,
  };

  let patch = IncidentPatch {
    title,
    service,
    severity,
    status,
    owner,
    summary,
  };
  if patch.is_empty() {
    return Err(ApiError::BadRequest(
      klaxon_core::Error::EmptyPatch.to_string(),
    ));
  }
  Ok(patch)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
