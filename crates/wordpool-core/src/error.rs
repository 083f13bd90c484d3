//! Error types for `wordpool-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid draw policy: {0}")]
  InvalidPolicy(String),

  #[error("iteration count must be at least 1")]
  InvalidIterations,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
