//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 UTC strings with a fixed microsecond width, so
//! lexical order in SQL matches chronological order. Draw compositions are
//! compact JSON arrays of ids.

use chrono::{DateTime, SecondsFormat, Utc};
use wordpool_core::visitor::{Draw, Visitor};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Word ids ────────────────────────────────────────────────────────────────

pub fn encode_word_ids(ids: &[i64]) -> Result<String> {
  Ok(serde_json::to_string(ids)?)
}

pub fn decode_word_ids(s: &str) -> Result<Vec<i64>> {
  Ok(serde_json::from_str(s)?)
}

/// Rebuild a recorded draw; both columns are cleared together on undo.
pub fn decode_draw(text: Option<String>, words: Option<String>) -> Result<Option<Draw>> {
  match (text, words) {
    (Some(text), Some(words)) => Ok(Some(Draw { text, word_ids: decode_word_ids(&words)? })),
    _ => Ok(None),
  }
}

// ─── Inside `Connection::call` ───────────────────────────────────────────────

/// Carry a store error out of a `tokio_rusqlite` closure.
pub fn call_error(e: Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `visitors` row.
pub struct RawVisitor {
  pub visitor:      String,
  pub last_access:  String,
  pub last_message: Option<String>,
  pub last_words:   Option<String>,
  pub tz_offset:    Option<i32>,
}

impl RawVisitor {
  pub const COLUMNS: &'static str =
    "visitor, last_access, last_message, last_words, tz_offset";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      visitor:      row.get(0)?,
      last_access:  row.get(1)?,
      last_message: row.get(2)?,
      last_words:   row.get(3)?,
      tz_offset:    row.get(4)?,
    })
  }

  pub fn into_visitor(self) -> Result<Visitor> {
    Ok(Visitor {
      visitor:     self.visitor,
      last_access: decode_dt(&self.last_access)?,
      last_draw:   decode_draw(self.last_message, self.last_words)?,
      tz_offset:   self.tz_offset,
    })
  }
}
