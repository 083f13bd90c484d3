//! Plain-text rendering for the front-end routes.

use chrono::{DateTime, Duration, Utc};
use wordpool_core::{
  pool::Progress,
  visitor::{Draw, Visitor, local_time},
};

/// Cells in the progress bar.
const BAR_WIDTH: usize = 40;

pub const EXHAUSTED: &str = "Every word has been handed out. Nothing left to draw.\n";
pub const NOTHING_TO_UNDO: &str = "Nothing to undo.\n";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";

/// `2024-03-01 07:00:00 -05:00` in the visitor's hinted timezone.
pub fn format_time(dt: DateTime<Utc>, tz_offset: Option<i32>) -> String {
  local_time(dt, tz_offset).format(TIME_FORMAT).to_string()
}

/// One entry of the recent-visitors report.
pub fn recent_visitor(visitor: &Visitor) -> String {
  let message = visitor
    .last_draw
    .as_ref()
    .map_or("(undone)", |d| d.text.as_str());
  format!(
    "{} at {}:\n{message}\n",
    visitor.visitor,
    visitor.local_time(visitor.last_access).format(TIME_FORMAT),
  )
}

/// `1h 02m 03s`, `4m 05s` or `6s`; partial seconds round up.
pub fn format_wait(remaining: Duration) -> String {
  let total = (remaining.num_milliseconds() + 999).div_euclid(1000).max(0);
  let (h, m, s) = (total / 3600, total % 3600 / 60, total % 60);
  match (h, m) {
    (0, 0) => format!("{s}s"),
    (0, _) => format!("{m}m {s:02}s"),
    _      => format!("{h}h {m:02}m {s:02}s"),
  }
}

pub fn drawn(draw: &Draw, next_allowed_at: DateTime<Utc>, tz_offset: Option<i32>) -> String {
  format!(
    "{}\n\n{} words. Come back after {}.\n",
    draw.text,
    draw.word_ids.len(),
    format_time(next_allowed_at, tz_offset),
  )
}

pub fn cooldown(
  remaining:       Duration,
  next_allowed_at: DateTime<Utc>,
  previous:        Option<&Draw>,
  tz_offset:       Option<i32>,
) -> String {
  let mut out = format!(
    "Too soon. Try again in {} (after {}).\n",
    format_wait(remaining),
    format_time(next_allowed_at, tz_offset),
  );
  if let Some(draw) = previous {
    out.push_str("\nYour last words were:\n\n");
    out.push_str(&draw.text);
    out.push('\n');
  }
  out
}

pub fn restored(draw: &Draw) -> String {
  format!("Put {} words back into the pool:\n\n{}\n", draw.word_ids.len(), draw.text)
}

pub fn progress(p: Progress) -> String {
  let filled = ((p.fraction() * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
  format!(
    "{} of {} words used ({:.2}%), {} left\n[{}{}]\n",
    p.used,
    p.total,
    p.fraction() * 100.0,
    p.remaining(),
    "#".repeat(filled),
    ".".repeat(BAR_WIDTH - filled),
  )
}
