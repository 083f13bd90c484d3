//! Visitor-facing plain-text routes.
//!
//! `GET /` draws, mirroring `POST /api/draw`: the page a visitor opens is the
//! draw itself.

use axum::{
  extract::{Query, State},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use chrono::Utc;
use wordpool_api::{VisitorId, draw::{DrawParams, retry_after_secs}};
use wordpool_core::{
  store::WordStore,
  visitor::{Undo, Visit},
};

use crate::{AppState, error::Error, handlers::text_response, render};

/// The request's hint if given, else the one stored for the visitor.
async fn timezone_hint<S>(
  state:   &AppState<S>,
  visitor: &str,
  given:   Option<i32>,
) -> Result<Option<i32>, Error>
where
  S: WordStore,
{
  if given.is_some() {
    return Ok(given);
  }
  Ok(
    state
      .store
      .get_visitor(visitor)
      .await
      .map_err(Error::store)?
      .and_then(|v| v.tz_offset),
  )
}

/// `GET /[?tz_offset=<minutes>]`
pub async fn index<S>(
  State(state): State<AppState<S>>,
  VisitorId(visitor): VisitorId,
  Query(params): Query<DrawParams>,
) -> Result<Response, Error>
where
  S: WordStore,
{
  let visit = state
    .store
    .visit(&visitor, state.policy, Utc::now(), params.tz_offset)
    .await
    .map_err(Error::store)?;

  let res = match visit {
    Visit::Drawn { draw, next_allowed_at } => {
      tracing::info!(%visitor, words = draw.word_ids.len(), "issued draw");
      let tz = timezone_hint(&state, &visitor, params.tz_offset).await?;
      text_response(StatusCode::OK, render::drawn(&draw, next_allowed_at, tz))
    }
    Visit::Cooldown { remaining, next_allowed_at, previous } => {
      tracing::debug!(%visitor, "visitor cooling down");
      let tz   = timezone_hint(&state, &visitor, params.tz_offset).await?;
      let body = render::cooldown(remaining, next_allowed_at, previous.as_ref(), tz);
      let mut res = text_response(StatusCode::TOO_MANY_REQUESTS, body);
      res
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs(remaining)));
      res
    }
    Visit::Exhausted => {
      tracing::warn!(%visitor, "word pool exhausted");
      text_response(StatusCode::GONE, render::EXHAUSTED.to_owned())
    }
  };
  Ok(res)
}

/// `POST /undo`
pub async fn undo<S>(
  State(state): State<AppState<S>>,
  VisitorId(visitor): VisitorId,
) -> Result<Response, Error>
where
  S: WordStore,
{
  match state.store.undo(&visitor).await.map_err(Error::store)? {
    Undo::Restored { draw } => {
      tracing::info!(%visitor, words = draw.word_ids.len(), "undid draw");
      Ok(text_response(StatusCode::OK, render::restored(&draw)))
    }
    Undo::NothingToUndo => Err(Error::Conflict(render::NOTHING_TO_UNDO.to_owned())),
  }
}

/// `GET /progress`
pub async fn progress<S>(State(state): State<AppState<S>>) -> Result<Response, Error>
where
  S: WordStore,
{
  let p = state.store.progress().await.map_err(Error::store)?;
  Ok(text_response(StatusCode::OK, render::progress(p)))
}

/// `GET /favicon.ico`: there is no icon.
pub async fn favicon() -> impl IntoResponse { StatusCode::NO_CONTENT }
