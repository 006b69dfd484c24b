//! Error types for `klaxon-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("update payload contains no recognised fields")]
  EmptyPatch,

  #[error("unknown severity: {0:?}")]
  UnknownSeverity(String),

  #[error("unknown status: {0:?}")]
  UnknownStatus(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
