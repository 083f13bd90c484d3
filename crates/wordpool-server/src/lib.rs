//! HTTP front end for wordpool.
//!
//! Serves the plain-text visitor routes and the Basic-auth admin routes, and
//! nests the JSON API from `wordpool-api` under `/api`. Everything is backed
//! by any [`WordStore`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod render;
pub mod words;

pub use error::Error;

use std::{path::{Path, PathBuf}, sync::Arc};

use axum::{
  Router,
  extract::FromRef,
  routing::{get, post},
};
use config::{ConfigBuilder, ConfigError, builder::DefaultState};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use wordpool_api::{ApiState, VisitorIdentity};
use wordpool_core::{admission::DrawPolicy, hash::DEFAULT_ITERATIONS, store::WordStore};

use auth::AuthConfig;
use handlers::{admin, front};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `wordpool.toml` and
/// `WORDPOOL_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  /// Seconds a visitor waits between allowed draws.
  pub interval_secs:       u64,
  /// Maximum characters per draw.
  pub char_budget:         usize,
  pub trust_forwarded_for: bool,
  pub hash_visitor_ids:    bool,
  pub hash_iterations:     u32,
  pub admin_username:      String,
  pub admin_password_hash: String,
}

impl ServerConfig {
  /// Built-in defaults, before any file or environment source.
  pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080_i64)?
      .set_default("store_path", "wordpool.db")?
      .set_default("interval_secs", 3600_i64)?
      .set_default("char_budget", 2000_i64)?
      .set_default("trust_forwarded_for", false)?
      .set_default("hash_visitor_ids", false)?
      .set_default("hash_iterations", i64::from(DEFAULT_ITERATIONS))?
      .set_default("admin_username", "admin")?
      .set_default("admin_password_hash", "")
  }

  /// Defaults, overlaid by the TOML file at `path` (if present), overlaid by
  /// `WORDPOOL_*` environment variables.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::defaults()?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("WORDPOOL"))
      .build()?
      .try_deserialize()
  }

  pub fn policy(&self) -> wordpool_core::Result<DrawPolicy> {
    DrawPolicy::from_secs(self.interval_secs, self.char_budget)
  }

  pub fn identity(&self) -> wordpool_core::Result<VisitorIdentity> {
    if self.hash_visitor_ids && self.hash_iterations == 0 {
      return Err(wordpool_core::Error::InvalidIterations);
    }
    Ok(VisitorIdentity {
      trust_forwarded_for: self.trust_forwarded_for,
      hash_iterations:     self.hash_visitor_ids.then_some(self.hash_iterations),
    })
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub auth:     Arc<AuthConfig>,
  pub policy:   DrawPolicy,
  pub identity: Arc<VisitorIdentity>,
}

impl<S> AppState<S> {
  /// Validate `config` and assemble the state around `store`.
  pub fn new(store: S, config: &ServerConfig) -> wordpool_core::Result<Self> {
    let policy   = config.policy()?;
    let identity = config.identity()?;
    let auth     = AuthConfig {
      username:      config.admin_username.clone(),
      password_hash: config.admin_password_hash.clone(),
    };
    Ok(Self {
      store: Arc::new(store),
      auth: Arc::new(auth),
      policy,
      identity: Arc::new(identity),
    })
  }

  pub fn api_state(&self) -> ApiState<S> {
    ApiState {
      store:    self.store.clone(),
      policy:   self.policy,
      identity: self.identity.clone(),
    }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      auth:     self.auth.clone(),
      policy:   self.policy,
      identity: self.identity.clone(),
    }
  }
}

impl<S> FromRef<AppState<S>> for Arc<VisitorIdentity> {
  fn from_ref(state: &AppState<S>) -> Self { state.identity.clone() }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full axum [`Router`]. Serve it with
/// `into_make_service_with_connect_info::<SocketAddr>()` so visitors can be
/// identified by address.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: WordStore + 'static,
{
  let admin = Router::new()
    .route("/reset",   post(admin::reset::<S>))
    .route("/recent",  get(admin::recent::<S>))
    .route("/longest", get(admin::longest::<S>));

  let api = wordpool_api::api_router(state.api_state());

  Router::new()
    .route("/",            get(front::index::<S>))
    .route("/undo",        post(front::undo::<S>))
    .route("/progress",    get(front::progress::<S>))
    .route("/favicon.ico", get(front::favicon))
    .nest("/admin", admin)
    .with_state(state)
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
