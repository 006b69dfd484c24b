//! The [`IncidentStore`] trait and the page envelope it returns.
//!
//! The trait is implemented by storage backends (e.g. `klaxon-store-sqlite`).
//! Higher layers (`klaxon-api`, `klaxon-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use crate::{
  incident::{Incident, IncidentDraft},
  query::QueryPlan,
};

// ─── Page envelope ───────────────────────────────────────────────────────────

/// One page of listing results plus the filter-wide total.
///
/// `total` counts every record matching the plan's predicates, independent of
/// the page window, so callers can render correct pagination controls.
#[derive(Debug, Clone)]
pub struct Page {
  pub items: Vec<Incident>,
  pub total: i64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an incident store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`). Every operation is
/// atomic with respect to a single record; there are no multi-record
/// transactions.
pub trait IncidentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Execute a listing plan: the filter-wide total plus the requested page
  /// window, sorted by the plan's resolved column and direction.
  fn list<'a>(
    &'a self,
    plan: &'a QueryPlan,
  ) -> impl Future<Output = Result<Page, Self::Error>> + Send + 'a;

  /// Retrieve an incident by id. Returns `None` if not found.
  fn get(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Incident>, Self::Error>> + Send + '_;

  /// Persist a new record and return the store-assigned id.
  fn insert<'a>(
    &'a self,
    draft: &'a IncidentDraft,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + 'a;

  /// Overwrite the mutable fields and `updated_at` of the row with
  /// `incident.id`. `created_at` is never written. Returns `false` if no such
  /// row exists.
  fn replace<'a>(
    &'a self,
    incident: &'a Incident,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
