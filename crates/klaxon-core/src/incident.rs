//! Incident — the tracked record of an operational issue.
//!
//! An incident carries its lifecycle fields (severity, status, timestamps)
//! directly on the record. Mutation happens only through sparse patches; the
//! merge rules live in [`crate::patch`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ─── Enums ───────────────────────────────────────────────────────────────────

/// Impact level, SEV1 (worst) through SEV4 (least severe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
  Sev1,
  Sev2,
  Sev3,
  Sev4,
}

impl Severity {
  /// The string stored in the `severity` column and sent on the wire.
  /// Must match the `rename_all = "UPPERCASE"` serde tags above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Sev1 => "SEV1",
      Self::Sev2 => "SEV2",
      Self::Sev3 => "SEV3",
      Self::Sev4 => "SEV4",
    }
  }
}

impl std::str::FromStr for Severity {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    match s {
      "SEV1" => Ok(Self::Sev1),
      "SEV2" => Ok(Self::Sev2),
      "SEV3" => Ok(Self::Sev3),
      "SEV4" => Ok(Self::Sev4),
      other => Err(Error::UnknownSeverity(other.to_owned())),
    }
  }
}

/// Where an incident sits in its lifecycle. Any transition between any two
/// states is permitted; no ordering is enforced.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
  #[default]
  Open,
  Mitigated,
  Resolved,
}

impl Status {
  /// The string stored in the `status` column and sent on the wire.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Open => "OPEN",
      Self::Mitigated => "MITIGATED",
      Self::Resolved => "RESOLVED",
    }
  }
}

impl std::str::FromStr for Status {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    match s {
      "OPEN" => Ok(Self::Open),
      "MITIGATED" => Ok(Self::Mitigated),
      "RESOLVED" => Ok(Self::Resolved),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}

// ─── Incident ────────────────────────────────────────────────────────────────

/// A persisted incident record.
///
/// `id` is assigned by the store on insert and never changes. `created_at` is
/// set once; `updated_at` moves on every successful mutation, so
/// `created_at <= updated_at` always holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
  pub id:         i64,
  pub title:      String,
  pub service:    String,
  pub severity:   Severity,
  pub status:     Status,
  pub owner:      Option<String>,
  pub summary:    Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

// ─── NewIncident ─────────────────────────────────────────────────────────────

/// A creation request before defaults are applied. `status`, `owner` and
/// `summary` are optional at creation; the caller has already validated types
/// and bounds.
#[derive(Debug, Clone)]
pub struct NewIncident {
  pub title:    String,
  pub service:  String,
  pub severity: Severity,
  pub status:   Option<Status>,
  pub owner:    Option<String>,
  pub summary:  Option<String>,
}

impl NewIncident {
  /// Apply creation defaults (status → OPEN, owner/summary → null) and stamp
  /// both timestamps with the same `now`.
  pub fn into_draft(self, now: DateTime<Utc>) -> IncidentDraft {
    IncidentDraft {
      title:      self.title,
      service:    self.service,
      severity:   self.severity,
      status:     self.status.unwrap_or_default(),
      owner:      self.owner,
      summary:    self.summary,
      created_at: now,
      updated_at: now,
    }
  }
}

/// A complete record minus the store-assigned id — the input to
/// [`crate::store::IncidentStore::insert`].
#[derive(Debug, Clone)]
pub struct IncidentDraft {
  pub title:      String,
  pub service:    String,
  pub severity:   Severity,
  pub status:     Status,
  pub owner:      Option<String>,
  pub summary:    Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
