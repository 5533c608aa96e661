//! Error types for `finwise-core`.

use thiserror::Error;

use crate::RecordId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("username already registered: {0:?}")]
  DuplicateUsername(String),

  #[error("user not found: {0}")]
  UserNotFound(RecordId),

  #[error("{entity} not found: {id}")]
  RecordNotFound { entity: &'static str, id: RecordId },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
