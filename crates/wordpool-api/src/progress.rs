//! Read-only endpoints: pool progress and the caller's own record.

use axum::{Json, extract::State};
use serde::Serialize;
use wordpool_core::{store::WordStore, visitor::Visitor};

use crate::{ApiState, error::ApiError, visitor::VisitorId};

#[derive(Debug, Serialize)]
pub struct ProgressBody {
  pub total:     u64,
  pub used:      u64,
  pub remaining: u64,
  pub fraction:  f64,
}

/// `GET /progress`
pub async fn progress<S>(State(state): State<ApiState<S>>) -> Result<Json<ProgressBody>, ApiError>
where
  S: WordStore,
{
  let p = state.store.progress().await.map_err(ApiError::store)?;
  Ok(Json(ProgressBody {
    total:     p.total,
    used:      p.used,
    remaining: p.remaining(),
    fraction:  p.fraction(),
  }))
}

/// `GET /visitor`: 404 until the caller's first successful draw.
pub async fn visitor<S>(
  State(state): State<ApiState<S>>,
  VisitorId(visitor): VisitorId,
) -> Result<Json<Visitor>, ApiError>
where
  S: WordStore,
{
  state
    .store
    .get_visitor(&visitor)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("no record for this visitor".into()))
}
