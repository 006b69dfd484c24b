//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Severity and status are stored
//! as their uppercase wire strings, matching the CHECK constraints in the
//! schema. The SQL identifiers for sortable and filterable fields also live
//! here, so column names never leave this crate.

use chrono::{DateTime, Utc};
use klaxon_core::{
  incident::{Incident, Severity, Status},
  query::{FilterField, SortKey, SortOrder},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::TimestampParse(e.to_string()))
}

// ─── Severity / Status ───────────────────────────────────────────────────────

pub fn decode_severity(s: &str) -> Result<Severity> { Ok(s.parse()?) }

pub fn decode_status(s: &str) -> Result<Status> { Ok(s.parse()?) }

// ─── SQL identifiers ─────────────────────────────────────────────────────────

/// Column backing a sort key. The exhaustive match over the closed enum is
/// the injection guard: sort SQL can only ever name these identifiers.
pub fn sort_column(key: SortKey) -> &'static str {
  match key {
    SortKey::CreatedAt => "created_at",
    SortKey::UpdatedAt => "updated_at",
    SortKey::Severity => "severity",
    SortKey::Status => "status",
    SortKey::Service => "service",
    SortKey::Title => "title",
  }
}

pub fn sort_direction(order: SortOrder) -> &'static str {
  match order {
    SortOrder::Asc => "ASC",
    SortOrder::Desc => "DESC",
  }
}

/// Column backing a filter field.
pub fn filter_column(field: FilterField) -> &'static str {
  match field {
    FilterField::Title => "title",
    FilterField::Service => "service",
    FilterField::Severity => "severity",
    FilterField::Status => "status",
    FilterField::Owner => "owner",
    FilterField::Summary => "summary",
  }
}

/// LIKE pattern for a containment predicate. `%` and `_` inside the term keep
/// their wildcard meaning.
pub fn like_pattern(term: &str) -> String { format!("%{term}%") }

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw values read directly from an `incidents` row.
pub struct RawIncident {
  pub id:         i64,
  pub title:      String,
  pub service:    String,
  pub severity:   String,
  pub status:     String,
  pub owner:      Option<String>,
  pub summary:    Option<String>,
  pub created_at: String,
  pub updated_at: String,
}

impl RawIncident {
  /// Read one row of the canonical column list
  /// (`id, title, service, severity, status, owner, summary, created_at,
  /// updated_at`).
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      title:      row.get(1)?,
      service:    row.get(2)?,
      severity:   row.get(3)?,
      status:     row.get(4)?,
      owner:      row.get(5)?,
      summary:    row.get(6)?,
      created_at: row.get(7)?,
      updated_at: row.get(8)?,
    })
  }

  pub fn into_incident(self) -> Result<Incident> {
    Ok(Incident {
      id:         self.id,
      title:      self.title,
      service:    self.service,
      severity:   decode_severity(&self.severity)?,
      status:     decode_status(&self.status)?,
      owner:      self.owner,
      summary:    self.summary,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
