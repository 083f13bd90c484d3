//! Visitor identification: who is asking, as a stable string key.
//!
//! The key is the client's network address: the TCP peer, or the first
//! `X-Forwarded-For` hop when the service sits behind a trusted proxy. When
//! hashing is enabled the address is replaced by its iterated SHA-256 so raw
//! addresses never reach the store.

use std::{net::SocketAddr, sync::Arc};

use axum::{
  extract::{ConnectInfo, FromRef, FromRequestParts},
  http::{HeaderMap, request::Parts},
};
use wordpool_core::hash::sha256_iterate;

use crate::{ApiState, error::ApiError};

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// How request metadata maps to a visitor key.
#[derive(Debug, Clone, Default)]
pub struct VisitorIdentity {
  /// Take the client address from `X-Forwarded-For` instead of the peer.
  pub trust_forwarded_for: bool,
  /// Replace the address by `sha256_iterate(address, n)`.
  pub hash_iterations:     Option<u32>,
}

impl VisitorIdentity {
  /// Resolve the visitor key for a request.
  pub fn resolve(
    &self,
    headers: &HeaderMap,
    peer:    Option<SocketAddr>,
  ) -> Result<String, ApiError> {
    let forwarded = self
      .trust_forwarded_for
      .then(|| forwarded_client(headers))
      .flatten();

    let address = forwarded
      .or_else(|| peer.map(|p| p.ip().to_string()))
      .ok_or_else(|| ApiError::BadRequest("cannot determine client address".into()))?;

    match self.hash_iterations {
      Some(n) => Ok(sha256_iterate(address.as_bytes(), n)?),
      None => Ok(address),
    }
  }
}

/// First non-empty hop of `X-Forwarded-For`.
fn forwarded_client(headers: &HeaderMap) -> Option<String> {
  headers
    .get(X_FORWARDED_FOR)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.split(',').next())
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

/// Extractor yielding the resolved visitor key.
///
/// Needs `ConnectInfo<SocketAddr>` in the request extensions unless
/// forwarded addresses are trusted and present.
pub struct VisitorId(pub String);

impl<St> FromRequestParts<St> for VisitorId
where
  St: Send + Sync,
  Arc<VisitorIdentity>: FromRef<St>,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &St) -> Result<Self, Self::Rejection> {
    let identity = Arc::<VisitorIdentity>::from_ref(state);
    let peer = parts
      .extensions
      .get::<ConnectInfo<SocketAddr>>()
      .map(|ConnectInfo(addr)| *addr);
    identity.resolve(&parts.headers, peer).map(VisitorId)
  }
}

impl<S> FromRef<ApiState<S>> for Arc<VisitorIdentity> {
  fn from_ref(state: &ApiState<S>) -> Self { state.identity.clone() }
}
