//! The `WordStore` trait.
//!
//! Implemented by storage backends (e.g. `wordpool-store-sqlite`). The HTTP
//! layers depend on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  admission::DrawPolicy,
  pool::{PoolEntry, Progress},
  visitor::{Undo, Visit, Visitor},
};

/// Abstraction over a wordpool backend.
///
/// `visit` and `undo` must each be atomic: the admission check, the pool
/// update and the visitor update either all happen or none do.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait WordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Visitor operations ────────────────────────────────────────────────

  /// Admit `visitor` at `now` under `policy` and, if admitted, draw and mark
  /// a batch of unused words.
  ///
  /// While cooling down only `tz_offset` is refreshed (when given). When the
  /// pool has nothing left that fits, nothing is written.
  fn visit<'a>(
    &'a self,
    visitor: &'a str,
    policy: DrawPolicy,
    now: DateTime<Utc>,
    tz_offset: Option<i32>,
  ) -> impl Future<Output = Result<Visit, Self::Error>> + Send + 'a;

  /// Release the visitor's last draw back into the pool.
  fn undo<'a>(
    &'a self,
    visitor: &'a str,
  ) -> impl Future<Output = Result<Undo, Self::Error>> + Send + 'a;

  /// Fetch a visitor record. Returns `None` if the visitor never drew.
  fn get_visitor<'a>(
    &'a self,
    visitor: &'a str,
  ) -> impl Future<Output = Result<Option<Visitor>, Self::Error>> + Send + 'a;

  // ── Reports ───────────────────────────────────────────────────────────

  fn progress(&self) -> impl Future<Output = Result<Progress, Self::Error>> + Send + '_;

  /// Visitors ordered by most recent allowed draw first.
  fn recent_visitors(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Visitor>, Self::Error>> + Send + '_;

  /// Longest words first; ties broken by id.
  fn longest_words(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<PoolEntry>, Self::Error>> + Send + '_;

  // ── Maintenance ───────────────────────────────────────────────────────

  /// Add words to the pool as unused. Blank words and words already present
  /// are skipped. Returns the number of entries created.
  fn import_words(
    &self,
    words: Vec<String>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Set every entry's used flag to `used` and clear every recorded draw.
  /// Returns the number of pool entries touched.
  fn reset_progress(
    &self,
    used: bool,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
