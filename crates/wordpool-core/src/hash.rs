//! Iterated SHA-256, used to pseudonymise visitor addresses.
//!
//! Each round hashes the raw 32-byte digest of the previous one; only the
//! final digest is hex-encoded.

use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Rounds applied when none are configured.
pub const DEFAULT_ITERATIONS: u32 = 1000;

/// Hash `source` with SHA-256 `iterations` times and return lowercase hex.
pub fn sha256_iterate(source: &[u8], iterations: u32) -> Result<String> {
  if iterations == 0 {
    return Err(Error::InvalidIterations);
  }

  let mut digest = Sha256::digest(source);
  for _ in 1..iterations {
    digest = Sha256::digest(digest);
  }
  Ok(hex::encode(digest))
}
