//! JSON REST API for wordpool.
//!
//! Exposes an axum [`Router`] backed by any [`WordStore`]. TLS and transport
//! concerns are the caller's responsibility; the caller must serve the router
//! with `ConnectInfo<SocketAddr>` so visitors can be identified.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", wordpool_api::api_router(api_state))
//! ```

pub mod draw;
pub mod error;
pub mod progress;
pub mod visitor;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use wordpool_core::{admission::DrawPolicy, store::WordStore};

pub use error::ApiError;
pub use visitor::{VisitorId, VisitorIdentity};

/// State shared by the API handlers.
pub struct ApiState<S> {
  pub store:    Arc<S>,
  pub policy:   DrawPolicy,
  pub identity: Arc<VisitorIdentity>,
}

// Manual impl: cloning the `Arc`s never needs `S: Clone`.
impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      policy:   self.policy,
      identity: self.identity.clone(),
    }
  }
}

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: WordStore + 'static,
{
  Router::new()
    .route("/draw", post(draw::draw::<S>))
    .route("/undo", post(draw::undo::<S>))
    .route("/progress", get(progress::progress::<S>))
    .route("/visitor", get(progress::visitor::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::net::SocketAddr;

  use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use chrono::Duration;
  use serde_json::Value;
  use tower::ServiceExt as _;
  use wordpool_store_sqlite::SqliteStore;

  use super::*;

  async fn make_state(identity: VisitorIdentity, words: &[&str]) -> ApiState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store
      .import_words(words.iter().map(|w| (*w).to_owned()).collect())
      .await
      .unwrap();
    ApiState {
      store:    Arc::new(store),
      policy:   DrawPolicy::new(Duration::hours(1), 20).unwrap(),
      identity: Arc::new(identity),
    }
  }

  async fn seeded() -> ApiState<SqliteStore> {
    make_state(VisitorIdentity::default(), &["amber", "basil", "cedar", "delta", "ember"]).await
  }

  async fn call(
    state:   ApiState<SqliteStore>,
    method:  &str,
    uri:     &str,
    peer:    Option<&str>,
    headers: Vec<(&str, &str)>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(peer) = peer {
      let addr: SocketAddr = peer.parse().unwrap();
      builder = builder.extension(ConnectInfo(addr));
    }
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = builder.body(Body::empty()).unwrap();
    api_router(state).oneshot(req).await.unwrap()
  }

  async fn json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  const PEER: Option<&str> = Some("192.0.2.10:40000");

  // ── Draw ─────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn draw_returns_words() {
    let state = seeded().await;
    let resp  = call(state, "POST", "/draw", PEER, vec![]).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json(resp).await;
    assert_eq!(body["status"], "drawn");
    let text = body["text"].as_str().unwrap();
    assert!(!text.is_empty() && text.chars().count() <= 20, "text: {text}");
    assert!(!body["word_ids"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn second_draw_is_throttled_with_previous_text() {
    let state = seeded().await;
    let first = json(call(state.clone(), "POST", "/draw", PEER, vec![]).await).await;

    let resp = call(state, "POST", "/draw", Some("192.0.2.10:40001"), vec![]).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry: i64 = resp
      .headers()
      .get(header::RETRY_AFTER)
      .unwrap()
      .to_str()
      .unwrap()
      .parse()
      .unwrap();
    assert!(retry > 3_500 && retry <= 3_600, "Retry-After: {retry}");

    let body = json(resp).await;
    assert_eq!(body["status"], "cooldown");
    assert_eq!(body["previous"]["text"], first["text"]);
  }

  #[tokio::test]
  async fn exhausted_pool_returns_410() {
    let state = make_state(VisitorIdentity::default(), &[]).await;
    let resp  = call(state, "POST", "/draw", PEER, vec![]).await;
    assert_eq!(resp.status(), StatusCode::GONE);
    assert_eq!(json(resp).await["error"], "word pool exhausted");
  }

  #[tokio::test]
  async fn missing_client_address_returns_400() {
    let state = seeded().await;
    let resp  = call(state, "POST", "/draw", None, vec![]).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn trusted_forwarded_for_separates_clients_behind_proxy() {
    let identity = VisitorIdentity { trust_forwarded_for: true, ..Default::default() };
    let state    = make_state(identity, &["amber", "basil", "cedar", "delta"]).await;

    let a = call(state.clone(), "POST", "/draw", PEER, vec![("x-forwarded-for", "203.0.113.1")]).await;
    let b = call(state, "POST", "/draw", PEER, vec![("x-forwarded-for", "203.0.113.2")]).await;
    assert_eq!(a.status(), StatusCode::OK);
    assert_eq!(b.status(), StatusCode::OK);
  }

  // ── Undo ─────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn undo_restores_then_conflicts() {
    let state = seeded().await;
    let drawn = json(call(state.clone(), "POST", "/draw", PEER, vec![]).await).await;

    let resp = call(state.clone(), "POST", "/undo", PEER, vec![]).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json(resp).await;
    assert_eq!(body["text"], drawn["text"]);
    assert_eq!(body["restored"], drawn["word_ids"].as_array().unwrap().len());

    let progress = json(call(state.clone(), "GET", "/progress", None, vec![]).await).await;
    assert_eq!(progress["used"], 0);

    let again = call(state, "POST", "/undo", PEER, vec![]).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
  }

  // ── Reads ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn progress_reports_fraction() {
    let state = seeded().await;
    let drawn = json(call(state.clone(), "POST", "/draw", PEER, vec![]).await).await;
    let used  = drawn["word_ids"].as_array().unwrap().len() as u64;

    let body = json(call(state, "GET", "/progress", None, vec![]).await).await;
    assert_eq!(body["total"], 5);
    assert_eq!(body["used"], used);
    assert_eq!(body["remaining"], 5 - used);
    let fraction = body["fraction"].as_f64().unwrap();
    assert!((fraction - used as f64 / 5.0).abs() < 1e-9);
  }

  #[tokio::test]
  async fn visitor_record_is_404_before_first_draw() {
    let state = seeded().await;
    let resp  = call(state, "GET", "/visitor", PEER, vec![]).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn hashed_visitor_ids_are_stored() {
    let identity = VisitorIdentity { hash_iterations: Some(10), ..Default::default() };
    let state    = make_state(identity, &["amber", "basil"]).await;

    call(state.clone(), "POST", "/draw?tz_offset=120", PEER, vec![]).await;
    let body = json(call(state, "GET", "/visitor", PEER, vec![]).await).await;

    let key = body["visitor"].as_str().unwrap();
    assert_eq!(key.len(), 64);
    assert!(!key.contains("192.0.2.10"));
    assert_eq!(body["tz_offset"], 120);
  }
}
