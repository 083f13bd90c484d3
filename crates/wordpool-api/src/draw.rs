//! Handlers for the visitor-facing endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/draw` | Optional `?tz_offset=<minutes east of UTC>`; 429 + `Retry-After` while cooling down; 410 once exhausted |
//! | `POST` | `/undo` | 409 if there is nothing to undo |

use axum::{
  Json,
  extract::{Query, State},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use wordpool_core::{
  store::WordStore,
  visitor::{Draw, Undo, Visit},
};

use crate::{ApiState, error::ApiError, visitor::VisitorId};

// ─── Draw ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct DrawParams {
  /// Timezone hint, minutes east of UTC.
  pub tz_offset: Option<i32>,
}

/// JSON body of a `/draw` response that is not an error.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DrawBody {
  Drawn {
    text:            String,
    word_ids:        Vec<i64>,
    next_allowed_at: DateTime<Utc>,
  },
  Cooldown {
    retry_after_secs: i64,
    next_allowed_at:  DateTime<Utc>,
    previous:         Option<Draw>,
  },
}

/// Whole seconds to wait, rounded up so clients never retry early.
pub fn retry_after_secs(remaining: Duration) -> i64 {
  (remaining.num_milliseconds() + 999).div_euclid(1000).max(0)
}

/// `POST /draw[?tz_offset=<minutes>]`
pub async fn draw<S>(
  State(state): State<ApiState<S>>,
  VisitorId(visitor): VisitorId,
  Query(params): Query<DrawParams>,
) -> Result<Response, ApiError>
where
  S: WordStore,
{
  let visit = state
    .store
    .visit(&visitor, state.policy, Utc::now(), params.tz_offset)
    .await
    .map_err(ApiError::store)?;

  match visit {
    Visit::Drawn { draw, next_allowed_at } => {
      tracing::info!(%visitor, words = draw.word_ids.len(), "issued draw");
      let body = DrawBody::Drawn { text: draw.text, word_ids: draw.word_ids, next_allowed_at };
      Ok(Json(body).into_response())
    }
    Visit::Cooldown { remaining, next_allowed_at, previous } => {
      let secs = retry_after_secs(remaining);
      let body = DrawBody::Cooldown { retry_after_secs: secs, next_allowed_at, previous };
      let mut res = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
      res.headers_mut().insert(header::RETRY_AFTER, HeaderValue::from(secs));
      Ok(res)
    }
    Visit::Exhausted => {
      tracing::warn!(%visitor, "word pool exhausted");
      Err(ApiError::Gone("word pool exhausted".into()))
    }
  }
}

// ─── Undo ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UndoBody {
  pub restored: usize,
  pub text:     String,
  pub word_ids: Vec<i64>,
}

/// `POST /undo`
pub async fn undo<S>(
  State(state): State<ApiState<S>>,
  VisitorId(visitor): VisitorId,
) -> Result<Json<UndoBody>, ApiError>
where
  S: WordStore,
{
  match state.store.undo(&visitor).await.map_err(ApiError::store)? {
    Undo::Restored { draw } => {
      tracing::info!(%visitor, words = draw.word_ids.len(), "undid draw");
      Ok(Json(UndoBody {
        restored: draw.word_ids.len(),
        text:     draw.text,
        word_ids: draw.word_ids,
      }))
    }
    Undo::NothingToUndo => Err(ApiError::Conflict("nothing to undo".into())),
  }
}
