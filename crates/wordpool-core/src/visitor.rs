//! Visitor records and the outcomes of the two visitor-facing operations.

use chrono::{DateTime, Duration, FixedOffset, Offset as _, Utc};
use serde::{Deserialize, Serialize};

/// Largest accepted timezone hint, in minutes east of UTC.
pub const MAX_TZ_OFFSET_MINUTES: i32 = 14 * 60;

/// The words issued to a visitor in one successful request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
  pub text:     String,
  /// Pool entry ids composing `text`, in draw order.
  pub word_ids: Vec<i64>,
}

/// Per-visitor rate-limit and last-draw state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visitor {
  /// Network address, or its iterated digest when identifiers are hashed.
  pub visitor:     String,
  /// Time of the last allowed draw.
  pub last_access: DateTime<Utc>,
  /// `None` once the draw has been undone.
  pub last_draw:   Option<Draw>,
  /// Client-supplied timezone hint, minutes east of UTC.
  pub tz_offset:   Option<i32>,
}

impl Visitor {
  /// Render `dt` in the visitor's hinted timezone, falling back to UTC.
  pub fn local_time(&self, dt: DateTime<Utc>) -> DateTime<FixedOffset> {
    local_time(dt, self.tz_offset)
  }
}

/// Render `dt` at `tz_offset` minutes east of UTC, or in UTC when the hint is
/// absent or out of range.
pub fn local_time(dt: DateTime<Utc>, tz_offset: Option<i32>) -> DateTime<FixedOffset> {
  let offset = tz_offset
    .filter(|m| m.abs() <= MAX_TZ_OFFSET_MINUTES)
    .and_then(|m| FixedOffset::east_opt(m * 60))
    .unwrap_or_else(|| Utc.fix());
  dt.with_timezone(&offset)
}

/// Outcome of a visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit {
  /// Admitted; these words are now marked used.
  Drawn {
    draw:            Draw,
    next_allowed_at: DateTime<Utc>,
  },
  /// Refused; the visitor must wait `remaining`.
  Cooldown {
    remaining:       Duration,
    next_allowed_at: DateTime<Utc>,
    /// The last draw issued to this visitor, unless undone.
    previous:        Option<Draw>,
  },
  /// Admitted, but no unused word fits the budget.
  Exhausted,
}

/// Outcome of an undo request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Undo {
  /// These words are unused again and the recorded draw is cleared.
  Restored { draw: Draw },
  /// No record, or the last draw was already undone.
  NothingToUndo,
}
