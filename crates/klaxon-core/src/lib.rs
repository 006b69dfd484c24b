//! Core types and rules for the Klaxon incident tracker.
//!
//! Holds the domain model: the incident record and its enums, patch-merge
//! semantics, listing-query normalisation, and the storage abstraction.
//! Deliberately free of HTTP and database dependencies; every other crate
//! in the workspace depends on this one.

pub mod error;
pub mod incident;
pub mod patch;
pub mod query;
pub mod store;

pub use error::{Error, Result};
