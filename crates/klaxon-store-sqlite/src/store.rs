//! [`SqliteStore`] — the SQLite implementation of [`IncidentStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use klaxon_core::{
  incident::{Incident, IncidentDraft},
  query::{Filter, FilterOp, QueryPlan},
  store::{IncidentStore, Page},
};

use crate::{
  Error, Result,
  encode::{
    RawIncident, encode_dt, filter_column, like_pattern, sort_column,
    sort_direction,
  },
  schema::SCHEMA,
};

/// A bind argument for a dynamically assembled query.
type SqlArg = Box<dyn rusqlite::ToSql + Send>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// An incident store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Delete every incident. Not part of [`IncidentStore`]; exists for the
  /// seed tool.
  pub async fn wipe(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute("DELETE FROM incidents", [])?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── WHERE assembly ──────────────────────────────────────────────────────────

/// Render one predicate as a `?`-placeholder condition plus its bind arg.
fn predicate(filter: &Filter) -> (String, SqlArg) {
  let column = filter_column(filter.field);
  match filter.op {
    FilterOp::Eq => (format!("{column} = ?"), Box::new(filter.value.clone())),
    FilterOp::Contains => {
      // SQLite LIKE is case-insensitive for ASCII by default.
      (format!("{column} LIKE ?"), Box::new(like_pattern(&filter.value)))
    }
  }
}

/// Render a plan's predicates as a WHERE clause plus bind args, in placeholder
/// order. The search group ORs within itself and ANDs with the rest.
fn build_where(plan: &QueryPlan) -> (String, Vec<SqlArg>) {
  let mut conds: Vec<String> = Vec::new();
  let mut args: Vec<SqlArg> = Vec::new();

  for filter in &plan.filters {
    let (sql, arg) = predicate(filter);
    conds.push(sql);
    args.push(arg);
  }

  if !plan.search.is_empty() {
    let mut group: Vec<String> = Vec::new();
    for filter in &plan.search {
      let (sql, arg) = predicate(filter);
      group.push(sql);
      args.push(arg);
    }
    conds.push(format!("({})", group.join(" OR ")));
  }

  let clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };

  (clause, args)
}

// ─── IncidentStore impl ──────────────────────────────────────────────────────

impl IncidentStore for SqliteStore {
  type Error = Error;

  async fn list(&self, plan: &QueryPlan) -> Result<Page> {
    let (where_clause, args) = build_where(plan);
    let order_col = sort_column(plan.sort_by);
    let order_dir = sort_direction(plan.sort_order);
    let limit = plan.limit();
    let offset = plan.offset();

    let (total, raws): (i64, Vec<RawIncident>) = self
      .conn
      .call(move |conn| {
        let mut args = args;

        // Total first, over the same predicates but without the window.
        let count_sql =
          format!("SELECT COUNT(*) FROM incidents {where_clause}");
        let total: i64 = conn.query_row(
          &count_sql,
          rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())),
          |row| row.get(0),
        )?;

        let page_sql = format!(
          "SELECT id, title, service, severity, status, owner, summary,
                  created_at, updated_at
           FROM incidents
           {where_clause}
           ORDER BY {order_col} {order_dir}
           LIMIT ? OFFSET ?"
        );
        args.push(Box::new(limit));
        args.push(Box::new(offset));

        let mut stmt = conn.prepare(&page_sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())),
            RawIncident::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawIncident::into_incident)
      .collect::<Result<Vec<_>>>()?;

    Ok(Page { items, total })
  }

  async fn get(&self, id: i64) -> Result<Option<Incident>> {
    let raw: Option<RawIncident> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, title, service, severity, status, owner, summary,
                      created_at, updated_at
               FROM incidents WHERE id = ?1",
              rusqlite::params![id],
              RawIncident::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawIncident::into_incident).transpose()
  }

  async fn insert(&self, draft: &IncidentDraft) -> Result<i64> {
    let title = draft.title.clone();
    let service = draft.service.clone();
    let severity = draft.severity.as_str();
    let status = draft.status.as_str();
    let owner = draft.owner.clone();
    let summary = draft.summary.clone();
    let created_at = encode_dt(draft.created_at);
    let updated_at = encode_dt(draft.updated_at);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO incidents
             (title, service, severity, status, owner, summary,
              created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            title, service, severity, status, owner, summary, created_at,
            updated_at,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(id)
  }

  async fn replace(&self, incident: &Incident) -> Result<bool> {
    let id = incident.id;
    let title = incident.title.clone();
    let service = incident.service.clone();
    let severity = incident.severity.as_str();
    let status = incident.status.as_str();
    let owner = incident.owner.clone();
    let summary = incident.summary.clone();
    let updated_at = encode_dt(incident.updated_at);

    let changed = self
      .conn
      .call(move |conn| {
        // created_at is deliberately absent from the SET list.
        let n = conn.execute(
          "UPDATE incidents
           SET title = ?1, service = ?2, severity = ?3, status = ?4,
               owner = ?5, summary = ?6, updated_at = ?7
           WHERE id = ?8",
          rusqlite::params![
            title, service, severity, status, owner, summary, updated_at, id,
          ],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(changed)
  }
}
