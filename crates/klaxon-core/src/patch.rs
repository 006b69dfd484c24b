//! Partial-update semantics for incidents.
//!
//! A patch distinguishes three states per nullable field: key absent (keep
//! the stored value), explicit JSON `null` (clear it), and a value (replace
//! it). [`FieldPatch`] encodes that trichotomy; serde's two-state `Option`
//! cannot tell the first two apart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::{
  Result,
  error::Error,
  incident::{Incident, Severity, Status},
};

// ─── FieldPatch ──────────────────────────────────────────────────────────────

/// One field of a patch: keep, clear, or set.
///
/// `#[serde(default)]` on the containing struct field yields [`Keep`] when
/// the key is absent; the `Deserialize` impl below maps JSON `null` to
/// [`Clear`] and any other value to [`Set`].
///
/// [`Keep`]: FieldPatch::Keep
/// [`Clear`]: FieldPatch::Clear
/// [`Set`]: FieldPatch::Set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldPatch<T> {
  #[default]
  Keep,
  Clear,
  Set(T),
}

impl<'de, T> Deserialize<'de> for FieldPatch<T>
where
  T: Deserialize<'de>,
{
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    Ok(match Option::<T>::deserialize(deserializer)? {
      Some(value) => Self::Set(value),
      None => Self::Clear,
    })
  }
}

impl<T> FieldPatch<T> {
  pub fn is_keep(&self) -> bool { matches!(self, Self::Keep) }

  /// Resolve against the stored value.
  pub fn apply(self, current: Option<T>) -> Option<T> {
    match self {
      Self::Keep => current,
      Self::Clear => None,
      Self::Set(value) => Some(value),
    }
  }
}

// ─── IncidentPatch ───────────────────────────────────────────────────────────

/// A sparse update.
///
/// Required fields use `Option` (present → replace, absent → keep); the
/// nullable `owner` and `summary` use [`FieldPatch`] so an explicit `null`
/// can clear them.
#[derive(Debug, Clone, Default)]
pub struct IncidentPatch {
  pub title:    Option<String>,
  pub service:  Option<String>,
  pub severity: Option<Severity>,
  pub status:   Option<Status>,
  pub owner:    FieldPatch<String>,
  pub summary:  FieldPatch<String>,
}

impl IncidentPatch {
  /// True when no field was named at all.
  ///
  /// The guard is presence-based: a patch that names a field with its current
  /// value still counts as an update and refreshes `updated_at`.
  pub fn is_empty(&self) -> bool {
    self.title.is_none()
      && self.service.is_none()
      && self.severity.is_none()
      && self.status.is_none()
      && self.owner.is_keep()
      && self.summary.is_keep()
  }

  /// Merge onto `existing`, refreshing `updated_at` to `now`.
  ///
  /// The id and `created_at` always carry over unchanged. An empty patch is
  /// rejected before any merging happens.
  pub fn apply(
    self,
    existing: &Incident,
    now: DateTime<Utc>,
  ) -> Result<Incident> {
    if self.is_empty() {
      return Err(Error::EmptyPatch);
    }

    Ok(Incident {
      id:         existing.id,
      title:      self.title.unwrap_or_else(|| existing.title.clone()),
      service:    self.service.unwrap_or_else(|| existing.service.clone()),
      severity:   self.severity.unwrap_or(existing.severity),
      status:     self.status.unwrap_or(existing.status),
      owner:      self.owner.apply(existing.owner.clone()),
      summary:    self.summary.apply(existing.summary.clone()),
      created_at: existing.created_at,
      updated_at: now,
    })
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
