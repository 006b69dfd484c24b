//! Listing-query construction — untrusted parameters in, bounded plan out.
//!
//! [`ListParams`] is the raw, all-optional shape a caller supplies.
//! [`ListParams::into_plan`] normalises it into a [`QueryPlan`]: page numbers
//! are clamped, unknown sort keys fall back to the default, filters become
//! field/operator/value triples. Building a plan never fails; malformed input
//! degrades to safe defaults rather than erroring.

use std::fmt;

use serde::{
  Deserialize,
  de::{self, IgnoredAny, MapAccess},
};

// ─── Defaults & bounds ───────────────────────────────────────────────────────

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

// ─── Raw parameters ──────────────────────────────────────────────────────────

/// Listing parameters exactly as received — every field optional, every value
/// a raw string. Wire names are camelCase.
///
/// Deserialisation is as lenient as the normalisation that follows it:
/// unknown keys are skipped and a repeated key keeps its last value, so a
/// hand-built query string (`?page=1&page=2`) still yields params instead of
/// a rejection.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
  pub page:       Option<String>,
  pub page_size:  Option<String>,
  pub search:     Option<String>,
  pub severity:   Option<String>,
  pub status:     Option<String>,
  pub service:    Option<String>,
  pub owner:      Option<String>,
  pub sort_by:    Option<String>,
  pub sort_order: Option<String>,
}

impl<'de> Deserialize<'de> for ListParams {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: de::Deserializer<'de>,
  {
    struct ParamsVisitor;

    impl<'de> de::Visitor<'de> for ParamsVisitor {
      type Value = ListParams;

      fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of listing parameters")
      }

      fn visit_map<A>(self, mut map: A) -> Result<ListParams, A::Error>
      where
        A: MapAccess<'de>,
      {
        let mut params = ListParams::default();
        while let Some(key) = map.next_key::<String>()? {
          let slot = match key.as_str() {
            "page" => &mut params.page,
            "pageSize" => &mut params.page_size,
            "search" => &mut params.search,
            "severity" => &mut params.severity,
            "status" => &mut params.status,
            "service" => &mut params.service,
            "owner" => &mut params.owner,
            "sortBy" => &mut params.sort_by,
            "sortOrder" => &mut params.sort_order,
            _ => {
              map.next_value::<IgnoredAny>()?;
              continue;
            }
          };
          *slot = map.next_value()?;
        }
        Ok(params)
      }
    }

    deserializer.deserialize_map(ParamsVisitor)
  }
}

// ─── Sorting ─────────────────────────────────────────────────────────────────

/// The closed set of sortable fields.
///
/// Anything outside this list falls back to [`SortKey::CreatedAt`], so a sort
/// key can never carry caller input into SQL. The storage layer maps each
/// variant to a column identifier with an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
  #[default]
  CreatedAt,
  UpdatedAt,
  Severity,
  Status,
  Service,
  Title,
}

impl SortKey {
  /// Parse a wire name (`createdAt`, `severity`, ...). Unknown names map to
  /// the default rather than erroring.
  fn parse(s: Option<&str>) -> Self {
    match s {
      Some("createdAt") => Self::CreatedAt,
      Some("updatedAt") => Self::UpdatedAt,
      Some("severity") => Self::Severity,
      Some("status") => Self::Status,
      Some("service") => Self::Service,
      Some("title") => Self::Title,
      _ => Self::CreatedAt,
    }
  }
}

/// Sort direction. Only an exact case-insensitive `asc` sorts ascending;
/// everything else (including absence) is descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
  Asc,
  #[default]
  Desc,
}

impl SortOrder {
  fn parse(s: Option<&str>) -> Self {
    match s {
      Some(s) if s.eq_ignore_ascii_case("asc") => Self::Asc,
      _ => Self::Desc,
    }
  }
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// A field a predicate may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
  Title,
  Service,
  Severity,
  Status,
  Owner,
  Summary,
}

/// Predicate operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
  /// Exact string equality.
  Eq,
  /// Case-insensitive substring containment.
  Contains,
}

/// One predicate of a plan.
///
/// Values are carried verbatim; an exact-match filter for a value no record
/// holds (e.g. a misspelled severity) builds a legal plan that matches
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
  pub field: FilterField,
  pub op:    FilterOp,
  pub value: String,
}

/// Fields the free-text search term is matched against.
const SEARCH_FIELDS: [FilterField; 4] = [
  FilterField::Title,
  FilterField::Service,
  FilterField::Owner,
  FilterField::Summary,
];

// ─── Plan ────────────────────────────────────────────────────────────────────

/// A normalised, bounded listing query. Immutable once built.
#[derive(Debug, Clone)]
pub struct QueryPlan {
  /// Equality predicates, ANDed together.
  pub filters:    Vec<Filter>,
  /// Containment predicates expanded from the search term, ORed together and
  /// then ANDed with `filters`. Empty when no term was given.
  pub search:     Vec<Filter>,
  pub sort_by:    SortKey,
  pub sort_order: SortOrder,
  /// 1-based page number, already clamped to >= 1.
  pub page:       i64,
  /// Page size, already clamped to `[1, MAX_PAGE_SIZE]`.
  pub page_size:  i64,
}

impl QueryPlan {
  /// Number of rows to skip for the requested page.
  pub fn offset(&self) -> i64 {
    (self.page - 1).saturating_mul(self.page_size)
  }

  /// Maximum number of rows the page may hold.
  pub fn limit(&self) -> i64 { self.page_size }
}

impl Default for QueryPlan {
  fn default() -> Self { ListParams::default().into_plan() }
}

impl ListParams {
  /// Normalise into a [`QueryPlan`].
  ///
  /// Never fails: unparseable numbers become the defaults, out-of-range
  /// values are clamped, unknown sort fields fall back to `createdAt`, and
  /// empty filter values are dropped.
  pub fn into_plan(self) -> QueryPlan {
    let page = parse_clamped(self.page.as_deref(), DEFAULT_PAGE, 1, i64::MAX);
    let page_size = parse_clamped(
      self.page_size.as_deref(),
      DEFAULT_PAGE_SIZE,
      1,
      MAX_PAGE_SIZE,
    );

    let mut filters = Vec::new();
    for (field, value) in [
      (FilterField::Severity, self.severity),
      (FilterField::Status, self.status),
      (FilterField::Service, self.service),
      (FilterField::Owner, self.owner),
    ] {
      if let Some(value) = value.filter(|v| !v.is_empty()) {
        filters.push(Filter { field, op: FilterOp::Eq, value });
      }
    }

    let search = match self.search.filter(|s| !s.is_empty()) {
      Some(term) => SEARCH_FIELDS
        .iter()
        .map(|&field| Filter {
          field,
          op: FilterOp::Contains,
          value: term.clone(),
        })
        .collect(),
      None => Vec::new(),
    };

    QueryPlan {
      filters,
      search,
      sort_by: SortKey::parse(self.sort_by.as_deref()),
      sort_order: SortOrder::parse(self.sort_order.as_deref()),
      page,
      page_size,
    }
  }
}

fn parse_clamped(raw: Option<&str>, default: i64, min: i64, max: i64) -> i64 {
  raw
    .and_then(|s| s.parse::<i64>().ok())
    .unwrap_or(default)
    .clamp(min, max)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
