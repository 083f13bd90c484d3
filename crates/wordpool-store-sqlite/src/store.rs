//! [`SqliteStore`]: the SQLite implementation of [`WordStore`].

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};

use wordpool_core::{
  admission::{self, Admission, DrawPolicy},
  pool::{PoolEntry, Progress, fit_to_budget, join_words, max_candidates},
  store::WordStore,
  visitor::{Draw, Undo, Visit, Visitor},
};

use crate::{
  Result,
  encode::{RawVisitor, call_error, decode_draw, decode_dt, encode_dt, encode_word_ids},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A wordpool store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// What a visit did, before the previous draw has been decoded.
enum RawVisit {
  Drawn(Draw),
  Cooldown {
    remaining:       Duration,
    next_allowed_at: DateTime<Utc>,
    last_message:    Option<String>,
    last_words:      Option<String>,
  },
  Exhausted,
}

fn sql_limit(limit: usize) -> i64 { i64::try_from(limit).unwrap_or(i64::MAX) }

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── WordStore impl ──────────────────────────────────────────────────────────

impl WordStore for SqliteStore {
  type Error = crate::Error;

  // ── Visitor operations ────────────────────────────────────────────────────

  async fn visit(
    &self,
    visitor:   &str,
    policy:    DrawPolicy,
    now:       DateTime<Utc>,
    tz_offset: Option<i32>,
  ) -> Result<Visit> {
    let visitor_key = visitor.to_owned();
    let now_str     = encode_dt(now);
    let limit       = sql_limit(max_candidates(policy.char_budget));
    let budget      = sql_limit(policy.char_budget);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: Option<(String, Option<String>, Option<String>)> = tx
          .query_row(
            "SELECT last_access, last_message, last_words FROM visitors WHERE visitor = ?1",
            rusqlite::params![visitor_key],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
          )
          .optional()?;

        if let Some((last_access, last_message, last_words)) = existing {
          let last_access = decode_dt(&last_access).map_err(call_error)?;

          if let Admission::Wait { remaining, next_allowed_at } =
            admission::check(Some(last_access), now, policy.interval)
          {
            if tz_offset.is_some() {
              tx.execute(
                "UPDATE visitors SET tz_offset = ?2 WHERE visitor = ?1",
                rusqlite::params![visitor_key, tz_offset],
              )?;
              tx.commit()?;
            }
            return Ok(RawVisit::Cooldown {
              remaining,
              next_allowed_at,
              last_message,
              last_words,
            });
          }
        }

        // Only words that fit on their own are sampled, so an empty sample
        // means the pool is exhausted for this budget.
        let candidates = {
          let mut stmt = tx.prepare(
            "SELECT id, word FROM wordlist
             WHERE used = 0 AND LENGTH(word) <= ?2
             ORDER BY RANDOM() LIMIT ?1",
          )?;
          let rows = stmt
            .query_map(rusqlite::params![limit, budget], |row| {
              Ok(PoolEntry { id: row.get(0)?, word: row.get(1)?, used: false })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          rows
        };

        let chosen = fit_to_budget(candidates, policy.char_budget);
        if chosen.is_empty() {
          // Dropping `tx` rolls back; nothing was written.
          return Ok(RawVisit::Exhausted);
        }

        {
          let mut mark = tx.prepare("UPDATE wordlist SET used = 1 WHERE id = ?1")?;
          for entry in &chosen {
            mark.execute(rusqlite::params![entry.id])?;
          }
        }

        let draw = Draw {
          text:     join_words(&chosen),
          word_ids: chosen.iter().map(|e| e.id).collect(),
        };
        let words_json = encode_word_ids(&draw.word_ids).map_err(call_error)?;

        tx.execute(
          "INSERT INTO visitors (visitor, last_access, last_message, last_words, tz_offset)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (visitor) DO UPDATE SET
             last_access  = excluded.last_access,
             last_message = excluded.last_message,
             last_words   = excluded.last_words,
             tz_offset    = COALESCE(excluded.tz_offset, visitors.tz_offset)",
          rusqlite::params![visitor_key, now_str, draw.text, words_json, tz_offset],
        )?;

        tx.commit()?;
        Ok(RawVisit::Drawn(draw))
      })
      .await?;

    Ok(match raw {
      RawVisit::Drawn(draw) => Visit::Drawn { draw, next_allowed_at: now + policy.interval },
      RawVisit::Cooldown { remaining, next_allowed_at, last_message, last_words } => {
        Visit::Cooldown {
          remaining,
          next_allowed_at,
          previous: decode_draw(last_message, last_words)?,
        }
      }
      RawVisit::Exhausted => Visit::Exhausted,
    })
  }

  async fn undo(&self, visitor: &str) -> Result<Undo> {
    let visitor_key = visitor.to_owned();

    let restored: Option<Draw> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let row: Option<(Option<String>, Option<String>)> = tx
          .query_row(
            "SELECT last_message, last_words FROM visitors WHERE visitor = ?1",
            rusqlite::params![visitor_key],
            |row| Ok((row.get(0)?, row.get(1)?)),
          )
          .optional()?;

        let Some((last_message, last_words)) = row else {
          return Ok(None);
        };
        let Some(draw) = decode_draw(last_message, last_words).map_err(call_error)? else {
          return Ok(None);
        };

        {
          let mut release = tx.prepare("UPDATE wordlist SET used = 0 WHERE id = ?1")?;
          for id in &draw.word_ids {
            release.execute(rusqlite::params![id])?;
          }
        }

        tx.execute(
          "UPDATE visitors SET last_message = NULL, last_words = NULL WHERE visitor = ?1",
          rusqlite::params![visitor_key],
        )?;

        tx.commit()?;
        Ok(Some(draw))
      })
      .await?;

    Ok(match restored {
      Some(draw) => Undo::Restored { draw },
      None       => Undo::NothingToUndo,
    })
  }

  async fn get_visitor(&self, visitor: &str) -> Result<Option<Visitor>> {
    let visitor_key = visitor.to_owned();

    let raw: Option<RawVisitor> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM visitors WHERE visitor = ?1", RawVisitor::COLUMNS);
        Ok(
          conn
            .query_row(&sql, rusqlite::params![visitor_key], RawVisitor::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVisitor::into_visitor).transpose()
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  async fn progress(&self) -> Result<Progress> {
    let (total, used): (i64, i64) = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*), COALESCE(SUM(used), 0) FROM wordlist",
          [],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )?)
      })
      .await?;

    Ok(Progress {
      total: u64::try_from(total).unwrap_or_default(),
      used:  u64::try_from(used).unwrap_or_default(),
    })
  }

  async fn recent_visitors(&self, limit: usize) -> Result<Vec<Visitor>> {
    let limit = sql_limit(limit);

    let raws: Vec<RawVisitor> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM visitors ORDER BY last_access DESC LIMIT ?1",
          RawVisitor::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![limit], RawVisitor::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVisitor::into_visitor).collect()
  }

  async fn longest_words(&self, limit: usize) -> Result<Vec<PoolEntry>> {
    let limit = sql_limit(limit);

    let entries = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, word, used FROM wordlist ORDER BY LENGTH(word) DESC, id ASC LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok(PoolEntry { id: row.get(0)?, word: row.get(1)?, used: row.get(2)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(entries)
  }

  // ── Maintenance ───────────────────────────────────────────────────────────

  async fn import_words(&self, words: Vec<String>) -> Result<usize> {
    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
          let mut insert =
            tx.prepare("INSERT OR IGNORE INTO wordlist (word, used) VALUES (?1, 0)")?;
          for word in &words {
            let word = word.trim();
            if word.is_empty() {
              continue;
            }
            inserted += insert.execute(rusqlite::params![word])?;
          }
        }
        tx.commit()?;
        Ok(inserted)
      })
      .await?;

    Ok(inserted)
  }

  async fn reset_progress(&self, used: bool) -> Result<u64> {
    let touched = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let touched = tx.execute("UPDATE wordlist SET used = ?1", rusqlite::params![used])?;
        tx.execute("UPDATE visitors SET last_message = NULL, last_words = NULL", [])?;
        tx.commit()?;
        Ok(touched)
      })
      .await?;

    Ok(touched as u64)
  }
}
