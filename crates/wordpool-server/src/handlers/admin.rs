//! Maintenance routes behind HTTP Basic auth.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/admin/reset` | `?used=true` marks every word used instead |
//! | `GET`  | `/admin/recent` | `?limit=` (default 10) |
//! | `GET`  | `/admin/longest` | `?limit=` (default 10) |

use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use wordpool_core::{pool::PoolEntry, store::WordStore, visitor::Visitor};

use crate::{AppState, auth::Authenticated, error::Error};

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 1000;

#[derive(Debug, Default, Deserialize)]
pub struct ResetParams {
  #[serde(default)]
  pub used: bool,
}

#[derive(Debug, Serialize)]
pub struct ResetBody {
  pub touched: u64,
  pub used:    bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
  pub limit: Option<usize>,
}

impl LimitParams {
  fn limit(&self) -> usize { self.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) }
}

/// `POST /admin/reset[?used=true]`
pub async fn reset<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
  Query(params): Query<ResetParams>,
) -> Result<Json<ResetBody>, Error>
where
  S: WordStore + 'static,
{
  let touched = state
    .store
    .reset_progress(params.used)
    .await
    .map_err(Error::store)?;
  tracing::warn!(touched, used = params.used, "pool progress reset");
  Ok(Json(ResetBody { touched, used: params.used }))
}

/// `GET /admin/recent[?limit=N]`
pub async fn recent<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
  Query(params): Query<LimitParams>,
) -> Result<Json<Vec<Visitor>>, Error>
where
  S: WordStore + 'static,
{
  let visitors = state
    .store
    .recent_visitors(params.limit())
    .await
    .map_err(Error::store)?;
  Ok(Json(visitors))
}

/// `GET /admin/longest[?limit=N]`
pub async fn longest<S>(
  _: Authenticated,
  State(state): State<AppState<S>>,
  Query(params): Query<LimitParams>,
) -> Result<Json<Vec<PoolEntry>>, Error>
where
  S: WordStore + 'static,
{
  let entries = state
    .store
    .longest_words(params.limit())
    .await
    .map_err(Error::store)?;
  Ok(Json(entries))
}
