//! JSON REST API for Klaxon.
//!
//! Exposes an axum [`Router`] backed by any [`klaxon_core::store::IncidentStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", klaxon_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod incidents;
pub mod validate;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{Router, routing::get};
use klaxon_core::store::IncidentStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: IncidentStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route(
      "/incidents",
      get(incidents::list::<S>).post(incidents::create::<S>),
    )
    .route(
      "/incidents/{id}",
      get(incidents::get_one::<S>).patch(incidents::update::<S>),
    )
    .with_state(store)
}
